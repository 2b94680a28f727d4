//! Magpie CLI - research and reimbursement pipelines from the terminal.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use magpie::approval::{ApprovalLedger, ApprovalStatus, ReimbursementPipeline};
use magpie::pipeline::keys;
use magpie::providers::OpenAiCompatModel;
use magpie::{Config, ConversationMemory, PipelineState, ResearchPipeline};
use magpie::{ToolCatalog, ToolInvoker, ToolTransport};

/// Magpie - sequential agent pipelines with tool calling and human approval
#[derive(Parser)]
#[command(name = "magpie")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the research pipeline for a topic
    Research {
        /// Topic to research
        topic: String,

        /// Transport used to reach the tool host
        #[arg(long, value_enum, default_value_t = Transport::Sse)]
        transport: Transport,
    },

    /// Open a reimbursement request and walk it through approval
    Reimburse {
        /// What the money is for
        #[arg(long)]
        purpose: String,

        /// Amount requested
        #[arg(long)]
        amount: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Single blocking request/response call
    Blocking,
    /// Event-stream response (`tool_result`/`done` events)
    Sse,
}

impl From<Transport> for ToolTransport {
    fn from(value: Transport) -> Self {
        match value {
            Transport::Blocking => Self::Blocking,
            Transport::Sse => Self::EventStream,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("magpie={level},magpie_cli={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env();
    match cli.command {
        Commands::Research { topic, transport } => research(&config, &topic, transport).await,
        Commands::Reimburse { purpose, amount } => reimburse(&config, &purpose, amount).await,
    }
}

async fn research(config: &Config, topic: &str, transport: Transport) -> anyhow::Result<()> {
    let model = OpenAiCompatModel::from_config(config).context("configuring chat model")?;
    let catalog = ToolCatalog::research_tools();

    let pipeline = if config.tool_host_url.is_some() {
        let invoker = ToolInvoker::from_config(config, transport.into())
            .context("configuring tool invoker")?;
        ResearchPipeline::new(Arc::new(model), catalog, invoker)
    } else {
        tracing::info!("no tool host configured, running tool-less");
        ResearchPipeline::without_tools(Arc::new(model), catalog)
    };

    let mut memory = ConversationMemory::new();
    let state = pipeline.run(topic, &mut memory).await?;

    let answer = state
        .get_str(keys::FINAL_ANSWER)
        .context("pipeline produced no final answer")?;
    println!("\nResearch Output:\n");
    println!("{answer}");
    Ok(())
}

async fn reimburse(config: &Config, purpose: &str, amount: f64) -> anyhow::Result<()> {
    let ledger = Arc::new(ApprovalLedger::new(config.approver.clone()));
    let pipeline = ReimbursementPipeline::new(Arc::clone(&ledger));
    let mut state = PipelineState::new();

    let ticket = pipeline.start(purpose, amount, &mut state).await;
    println!(
        "Ticket {} opened: '{}' for {:.2}, awaiting {}.",
        ticket.ticket_id, ticket.purpose, ticket.amount, ticket.approver
    );

    // Nothing downstream can run yet; the ticket is pending.
    if pipeline
        .resume(&ticket.ticket_id, &mut state)
        .await?
        .is_some()
    {
        anyhow::bail!("ticket produced a decision before the approver was asked");
    }

    let decision = prompt_for_decision(&ticket.ticket_id).await?;
    ledger.resolve(&ticket.ticket_id, decision).await?;

    let message = pipeline
        .resume(&ticket.ticket_id, &mut state)
        .await?
        .context("resolved ticket produced no decision message")?;
    println!("{message}");
    Ok(())
}

/// Ask the approver on stdin, blocking off the async runtime.
async fn prompt_for_decision(ticket_id: &str) -> anyhow::Result<ApprovalStatus> {
    println!("Approve ticket {ticket_id}? [y]es / [n]o");

    let input = tokio::task::spawn_blocking(|| {
        use std::io::BufRead;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await
    .context("reading approver decision")??;

    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(ApprovalStatus::Approved),
        _ => Ok(ApprovalStatus::Rejected),
    }
}
