//! Error types for the approval state machine.

use super::ApprovalStatus;

/// Error type for approval ledger operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApprovalError {
    /// A ticket was resolved from a state other than `pending`.
    #[error("ticket '{ticket_id}' cannot be resolved from state '{from}'")]
    InvalidTransition {
        /// The ticket in question.
        ticket_id: String,
        /// Its state at the time of the attempt, unchanged.
        from: ApprovalStatus,
    },

    /// No ticket with this id exists.
    #[error("unknown ticket: {0}")]
    UnknownTicket(String),

    /// `pending` was supplied where a terminal decision is required.
    #[error("'pending' is not a decision")]
    NotADecision,
}
