use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sealchain",
    about = "SealChain: tamper-evident, append-only payment ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Chain file (overrides the config file)
    #[arg(long, global = true)]
    pub chain: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Required leading hex zeros in block hashes
    #[arg(long, global = true)]
    pub difficulty: Option<u32>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the chain file with a genesis block
    Init(InitArgs),
    /// Record a payment with a masked payer identifier
    Record(RecordArgs),
    /// Append an arbitrary JSON payload as a block
    Append(AppendArgs),
    /// Show the block with the given hash
    Show(ShowArgs),
    /// Show recent blocks, newest first
    Log(LogArgs),
    /// Show the audit view of the chain
    Audit(AuditArgs),
    /// Verify chain integrity
    Verify(VerifyArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Move a corrupted chain file aside and start over
    #[arg(long)]
    pub reinitialize: bool,
}

#[derive(Args)]
pub struct RecordArgs {
    #[arg(long)]
    pub amount: String,
    /// Raw payer identifier; only its masked form is stored
    #[arg(long)]
    pub vpa: Option<String>,
    /// Identifier that is already masked
    #[arg(long)]
    pub masked_vpa: Option<String>,
    #[arg(long)]
    pub reference: Option<String>,
    #[arg(long)]
    pub payer: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct AppendArgs {
    /// Block payload as JSON
    pub data: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub hash: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct AuditArgs {}

#[derive(Args)]
pub struct VerifyArgs {
    /// Report every violation instead of stopping at the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
