//! Human-in-the-loop approval: ticket ledger and the reimbursement pipeline.
//!
//! Approval is an explicit two-phase operation. `start` opens a `pending`
//! ticket and returns; the caller persists the ticket id and re-enters the
//! pipeline with `resume` once a decision exists. No call stack blocks while
//! a human thinks, and nothing in the pipeline can move a ticket out of
//! `pending`; only the external approver path ([`ApprovalLedger::resolve`])
//! does that.

mod error;

pub use error::ApprovalError;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::pipeline::PipelineState;

/// State keys written by the reimbursement pipeline.
pub mod keys {
    /// Purpose of the request, written by the prepare step.
    pub const PURPOSE: &str = "purpose";
    /// Amount requested, written by the prepare step.
    pub const AMOUNT: &str = "amount";
    /// The opened approval ticket, written by the request step.
    pub const APPROVAL: &str = "approval";
    /// The decision message, written by the process step once resolved.
    pub const DECISION: &str = "decision";
}

/// Lifecycle state of an approval ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for the approver.
    Pending,
    /// Approved by the approver.
    Approved,
    /// Rejected by the approver.
    Rejected,
}

impl ApprovalStatus {
    /// Whether this status is a terminal decision.
    #[must_use]
    pub const fn is_decision(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// An approval ticket, serialized per the external ticket contract
/// (note the literal `ticket-id` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalTicket {
    /// Current lifecycle state.
    pub status: ApprovalStatus,
    /// Identity of the human asked to decide.
    pub approver: String,
    /// What the money is for.
    pub purpose: String,
    /// Amount requested.
    pub amount: f64,
    /// Unique ticket identifier.
    #[serde(rename = "ticket-id")]
    pub ticket_id: String,
}

/// In-process store of approval tickets keyed by ticket id.
///
/// Shared between the pipeline (which opens and reads tickets) and the
/// approver surface (which resolves them).
#[derive(Debug)]
pub struct ApprovalLedger {
    approver: String,
    tickets: RwLock<HashMap<String, ApprovalTicket>>,
}

impl ApprovalLedger {
    /// Create a ledger whose tickets are addressed to `approver`.
    #[must_use]
    pub fn new(approver: impl Into<String>) -> Self {
        Self {
            approver: approver.into(),
            tickets: RwLock::new(HashMap::new()),
        }
    }

    /// Open a `pending` ticket and notify the approver.
    pub async fn open(&self, purpose: impl Into<String>, amount: f64) -> ApprovalTicket {
        let ticket = ApprovalTicket {
            status: ApprovalStatus::Pending,
            approver: self.approver.clone(),
            purpose: purpose.into(),
            amount,
            ticket_id: format!("approval-{}", Uuid::new_v4()),
        };
        info!(
            ticket = %ticket.ticket_id,
            approver = %ticket.approver,
            "approval requested"
        );
        self.tickets
            .write()
            .await
            .insert(ticket.ticket_id.clone(), ticket.clone());
        ticket
    }

    /// Look up a ticket by id.
    pub async fn get(&self, ticket_id: &str) -> Option<ApprovalTicket> {
        self.tickets.read().await.get(ticket_id).cloned()
    }

    /// Record the approver's decision on a `pending` ticket.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotADecision`] when `decision` is `Pending`,
    /// [`ApprovalError::UnknownTicket`] for an unknown id, and
    /// [`ApprovalError::InvalidTransition`] when the ticket has already been
    /// resolved, in which case it is left unchanged.
    pub async fn resolve(
        &self,
        ticket_id: &str,
        decision: ApprovalStatus,
    ) -> Result<ApprovalTicket, ApprovalError> {
        if !decision.is_decision() {
            return Err(ApprovalError::NotADecision);
        }

        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| ApprovalError::UnknownTicket(ticket_id.to_string()))?;

        if ticket.status != ApprovalStatus::Pending {
            return Err(ApprovalError::InvalidTransition {
                ticket_id: ticket_id.to_string(),
                from: ticket.status,
            });
        }

        ticket.status = decision;
        info!(ticket = %ticket_id, %decision, "approval resolved");
        Ok(ticket.clone())
    }
}

/// The human-in-the-loop pipeline:
/// prepare request → request approval (suspend) → process decision.
#[derive(Debug, Clone)]
pub struct ReimbursementPipeline {
    ledger: Arc<ApprovalLedger>,
}

impl ReimbursementPipeline {
    /// Create a pipeline over a shared ledger.
    #[must_use]
    pub fn new(ledger: Arc<ApprovalLedger>) -> Self {
        Self { ledger }
    }

    /// The shared ledger, for the approver surface.
    #[must_use]
    pub fn ledger(&self) -> &Arc<ApprovalLedger> {
        &self.ledger
    }

    /// Phase one: prepare the request and open a `pending` ticket.
    ///
    /// The caller holds on to the returned ticket id and re-enters with
    /// [`resume`](Self::resume) once the approver has decided.
    pub async fn start(
        &self,
        purpose: &str,
        amount: f64,
        state: &mut PipelineState,
    ) -> ApprovalTicket {
        state.insert(keys::PURPOSE, serde_json::Value::String(purpose.to_string()));
        state.insert(keys::AMOUNT, serde_json::json!(amount));

        let ticket = self.ledger.open(purpose, amount).await;
        state.insert(
            keys::APPROVAL,
            serde_json::to_value(&ticket).unwrap_or_default(),
        );
        ticket
    }

    /// Phase two: process the decision, if there is one.
    ///
    /// Returns `Ok(None)` while the ticket is still `pending`: the pipeline
    /// produces no decision output until the approver has spoken. Once
    /// resolved, writes and returns the decision message referencing the
    /// original purpose and amount.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::UnknownTicket`] for an id this ledger never
    /// issued.
    pub async fn resume(
        &self,
        ticket_id: &str,
        state: &mut PipelineState,
    ) -> Result<Option<String>, ApprovalError> {
        let ticket = self
            .ledger
            .get(ticket_id)
            .await
            .ok_or_else(|| ApprovalError::UnknownTicket(ticket_id.to_string()))?;

        match ticket.status {
            ApprovalStatus::Pending => {
                debug!(ticket = %ticket_id, "still pending, nothing to process");
                Ok(None)
            }
            ApprovalStatus::Approved | ApprovalStatus::Rejected => {
                let message = format!(
                    "Reimbursement request for '{}' ({:.2}) was {} by {}.",
                    ticket.purpose, ticket.amount, ticket.status, ticket.approver
                );
                state.insert(keys::DECISION, serde_json::Value::String(message.clone()));
                Ok(Some(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_a_pending_ticket() {
        let ledger = ApprovalLedger::new("Sean Zhou");
        let ticket = ledger.open("travel", 120.0).await;

        assert_eq!(ticket.status, ApprovalStatus::Pending);
        assert_eq!(ticket.approver, "Sean Zhou");
        assert_eq!(ticket.purpose, "travel");
        assert!((ticket.amount - 120.0).abs() < f64::EPSILON);
        assert!(ticket.ticket_id.starts_with("approval-"));
    }

    #[tokio::test]
    async fn resolve_succeeds_only_from_pending() {
        let ledger = ApprovalLedger::new("approver");
        let ticket = ledger.open("travel", 120.0).await;

        let resolved = ledger
            .resolve(&ticket.ticket_id, ApprovalStatus::Approved)
            .await
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Approved);

        // A second resolve is an invalid transition and changes nothing.
        let err = ledger
            .resolve(&ticket.ticket_id, ApprovalStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidTransition { .. }));
        assert_eq!(
            ledger.get(&ticket.ticket_id).await.unwrap().status,
            ApprovalStatus::Approved
        );
    }

    #[tokio::test]
    async fn pending_is_not_a_decision() {
        let ledger = ApprovalLedger::new("approver");
        let ticket = ledger.open("travel", 120.0).await;
        let err = ledger
            .resolve(&ticket.ticket_id, ApprovalStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::NotADecision));
    }

    #[tokio::test]
    async fn unknown_tickets_are_rejected() {
        let ledger = ApprovalLedger::new("approver");
        let err = ledger
            .resolve("approval-nope", ApprovalStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::UnknownTicket(_)));
    }

    #[tokio::test]
    async fn scenario_c_suspend_then_resume() {
        let ledger = Arc::new(ApprovalLedger::new("Sean Zhou"));
        let pipeline = ReimbursementPipeline::new(Arc::clone(&ledger));
        let mut state = PipelineState::new();

        let ticket = pipeline.start("travel", 120.0, &mut state).await;
        assert_eq!(ticket.status, ApprovalStatus::Pending);
        assert_eq!(state.get_str(keys::PURPOSE), Some("travel"));

        // Downstream before any decision: no output, no decision key.
        let out = pipeline.resume(&ticket.ticket_id, &mut state).await.unwrap();
        assert!(out.is_none());
        assert!(!state.contains(keys::DECISION));

        ledger
            .resolve(&ticket.ticket_id, ApprovalStatus::Approved)
            .await
            .unwrap();

        let message = pipeline
            .resume(&ticket.ticket_id, &mut state)
            .await
            .unwrap()
            .unwrap();
        assert!(message.contains("approved"));
        assert!(message.contains("travel"));
        assert!(message.contains("120"));
        assert_eq!(state.get_str(keys::DECISION), Some(message.as_str()));
    }

    #[tokio::test]
    async fn rejection_is_reported_too() {
        let ledger = Arc::new(ApprovalLedger::new("approver"));
        let pipeline = ReimbursementPipeline::new(Arc::clone(&ledger));
        let mut state = PipelineState::new();

        let ticket = pipeline.start("new laptop", 2500.0, &mut state).await;
        ledger
            .resolve(&ticket.ticket_id, ApprovalStatus::Rejected)
            .await
            .unwrap();

        let message = pipeline
            .resume(&ticket.ticket_id, &mut state)
            .await
            .unwrap()
            .unwrap();
        assert!(message.contains("rejected"));
        assert!(message.contains("new laptop"));
    }

    #[test]
    fn tickets_serialize_per_the_wire_contract() {
        let ticket = ApprovalTicket {
            status: ApprovalStatus::Pending,
            approver: "Sean Zhou".into(),
            purpose: "travel".into(),
            amount: 120.0,
            ticket_id: "approval-ticket-1".into(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["approver"], "Sean Zhou");
        assert_eq!(json["purpose"], "travel");
        assert_eq!(json["amount"], 120.0);
        assert_eq!(json["ticket-id"], "approval-ticket-1");
    }
}
