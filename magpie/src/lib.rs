#![cfg_attr(docsrs, feature(doc_cfg))]
//! Magpie is a Rust library for small, sequential LLM agent pipelines.
//!
//! It implements two pipelines over a shared set of parts:
//!
//! - **Research**: plan → execute → summarize. A planning call decides
//!   whether a remote tool is needed, the tool is invoked over a blocking or
//!   event-stream transport, and a final structured answer is produced.
//! - **Reimbursement**: prepare request → request approval (suspend) →
//!   process decision. The pipeline cannot complete without an out-of-band
//!   decision from a human approver.
//!
//! Pipelines thread a [`pipeline::PipelineState`] between steps and record
//! every LLM exchange in a caller-owned [`memory::ConversationMemory`].

pub mod approval;
pub mod config;
pub mod error;
pub mod json_utils;
pub mod memory;
pub mod message;
pub mod pipeline;
pub mod providers;
pub mod tool;

pub use approval::{ApprovalLedger, ApprovalStatus, ApprovalTicket, ReimbursementPipeline};
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use memory::{ConversationMemory, MemoryTurn};
pub use message::{ChatMessage, MessageRole};
pub use pipeline::{PipelineState, ResearchPipeline};
pub use providers::{ChatModel, SharedModel};
pub use tool::{ToolCatalog, ToolInvoker, ToolOutput, ToolTransport};
