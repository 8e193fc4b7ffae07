use anyhow::Context;
use colored::Colorize;
use seal_crypto::Difficulty;
use seal_ledger::{Ledger, PaymentEvent};
use seal_server::{SealServer, ServerConfig};
use seal_store::{FileChainStore, Initialization, RecoveryPolicy};
use seal_types::Block;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

/// Run `cli`. Returns `false` when the command completed but reported a
/// failure the exit status should reflect.
pub fn run_command(cli: Cli) -> anyhow::Result<bool> {
    let mut config = resolve_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Command::Init(args) => {
            if args.reinitialize {
                config.ledger.store.recovery = RecoveryPolicy::Reinitialize;
            }
            cmd_init(&Ledger::open(config.ledger), format)
        }
        Command::Record(args) => cmd_record(&Ledger::open(config.ledger), args, format),
        Command::Append(args) => cmd_append(&Ledger::open(config.ledger), args, format),
        Command::Show(args) => cmd_show(&Ledger::open(config.ledger), args, format),
        Command::Log(args) => cmd_log(&Ledger::open(config.ledger), args, format),
        Command::Audit(_) => cmd_audit(&Ledger::open(config.ledger), format),
        Command::Verify(args) => cmd_verify(&Ledger::open(config.ledger), args, format),
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config.bind_addr = bind;
            }
            cmd_serve(config)
        }
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(chain) = &cli.chain {
        config.ledger.store.path = chain.clone();
    }
    if let Some(zeros) = cli.difficulty {
        config.ledger.difficulty = Difficulty::new(zeros)?;
    }
    debug!(
        chain = %config.ledger.store.path.display(),
        difficulty = config.ledger.difficulty.zeros(),
        max_iters = config.ledger.max_iters,
        "configuration resolved"
    );
    Ok(config)
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(ledger: &Ledger<FileChainStore>, format: OutputFormat) -> anyhow::Result<bool> {
    let initialization = ledger.initialize()?;
    let genesis = ledger
        .chain()?
        .into_iter()
        .next()
        .context("chain has no genesis block")?;
    let path = ledger.store().path().display().to_string();

    if format == OutputFormat::Json {
        print_json(&json!({
            "path": path,
            "created": initialization != Initialization::Existing,
            "genesis": genesis,
        }))?;
        return Ok(true);
    }

    match initialization {
        Initialization::Existing => {
            println!("Chain already initialized in {}", path.bold());
        }
        Initialization::Created => {
            println!("{} Initialized chain in {}", "✓".green().bold(), path.bold());
        }
        Initialization::Reinitialized { quarantined } => {
            println!("{} Reinitialized chain in {}", "!".yellow().bold(), path.bold());
            if let Some(moved) = quarantined {
                println!("  Corrupted file moved to {}", moved.display().to_string().yellow());
            }
        }
    }
    println!("  Genesis: {}", genesis.hash.to_hex().cyan());
    Ok(true)
}

fn cmd_record(
    ledger: &Ledger<FileChainStore>,
    args: RecordArgs,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    // "100" stays an integer; anything that is not a JSON number is validated as text.
    let amount = match serde_json::from_str::<Value>(&args.amount) {
        Ok(n @ Value::Number(_)) => n,
        _ => Value::String(args.amount),
    };
    let event = PaymentEvent {
        amount: Some(amount),
        vpa: args.vpa,
        masked_vpa: args.masked_vpa,
        masked_meta: None,
        reference: args.reference,
        payer: args.payer,
        note: args.note,
    };
    let block = ledger.record_payment(&event)?;

    if format == OutputFormat::Json {
        print_json(&json!({
            "ok": true,
            "txHash": block.hash,
            "index": block.index,
            "timestamp": block.timestamp,
        }))?;
    } else {
        println!("{} Payment recorded", "✓".green().bold());
        print_summary(&block);
    }
    Ok(true)
}

fn cmd_append(
    ledger: &Ledger<FileChainStore>,
    args: AppendArgs,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let data: Value = serde_json::from_str(&args.data).context("block payload is not valid JSON")?;
    let block = ledger.add_block(data)?;

    if format == OutputFormat::Json {
        print_json(&json!(block))?;
    } else {
        println!("{} Block appended", "✓".green().bold());
        print_summary(&block);
    }
    Ok(true)
}

fn cmd_show(
    ledger: &Ledger<FileChainStore>,
    args: ShowArgs,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let block = ledger.get_block(&args.hash)?;

    if format == OutputFormat::Json {
        print_json(&json!(block))?;
        return Ok(true);
    }
    println!("Block {}", format!("#{}", block.index).yellow().bold());
    println!("  Hash:      {}", block.hash.to_hex().cyan());
    println!("  Prev:      {}", block.prev_hash.to_hex().dimmed());
    println!("  Timestamp: {}", block.timestamp);
    println!("  Nonce:     {}", block.nonce);
    println!("  Data:      {}", serde_json::to_string_pretty(&block.data)?);
    Ok(true)
}

fn cmd_log(
    ledger: &Ledger<FileChainStore>,
    args: LogArgs,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let chain = ledger.chain()?;
    let recent: Vec<&Block> = chain.iter().rev().take(args.limit).collect();

    if format == OutputFormat::Json {
        print_json(&json!(recent))?;
        return Ok(true);
    }
    for block in recent {
        let kind = block.meta_type().unwrap_or("-");
        if args.oneline {
            println!(
                "{} {} {}",
                format!("#{}", block.index).yellow(),
                block.hash.short_hex().dimmed(),
                kind
            );
        } else {
            println!(
                "{}  {}  {}",
                format!("#{}", block.index).yellow().bold(),
                block.hash.to_hex().dimmed(),
                block.timestamp
            );
            println!("  Type: {kind}");
            if let Some(amount) = block.amount() {
                println!("  Amount: {amount}");
            }
        }
    }
    Ok(true)
}

fn cmd_audit(ledger: &Ledger<FileChainStore>, format: OutputFormat) -> anyhow::Result<bool> {
    let view = ledger.audit()?;

    if format == OutputFormat::Json {
        print_json(&json!({ "ok": true, "audit": view.entries, "length": view.length }))?;
        return Ok(true);
    }
    for entry in &view.entries {
        let amount = entry
            .amount
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        println!(
            "{:>5}  {}  {}  {:<16} {}",
            entry.index,
            entry.hash.short_hex().cyan(),
            entry.timestamp,
            entry.kind.as_deref().unwrap_or("-"),
            amount
        );
    }
    println!("{} blocks, total amount {}", view.length, view.total_amount());
    Ok(true)
}

fn cmd_verify(
    ledger: &Ledger<FileChainStore>,
    args: VerifyArgs,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    if args.all {
        let report = ledger.verify_chain_full()?;
        if format == OutputFormat::Json {
            print_json(&json!({
                "ok": report.is_valid(),
                "violations": report.violations,
                "length": report.length,
            }))?;
        } else if report.is_valid() {
            println!("{} Chain integrity verified ({} blocks)", "✓".green().bold(), report.length);
        } else {
            println!(
                "{} {} violation(s) in {} blocks",
                "✗".red().bold(),
                report.violations.len(),
                report.length
            );
            for v in &report.violations {
                println!("  {:>5}  {:?}: {}", v.position, v.kind, v.description);
            }
        }
        return Ok(report.is_valid());
    }

    let result = ledger.verify_chain()?;
    if format == OutputFormat::Json {
        print_json(&json!({ "ok": result.ok, "error": result.error, "length": result.length }))?;
    } else if result.ok {
        println!("{} Chain integrity verified ({} blocks)", "✓".green().bold(), result.length);
    } else {
        println!(
            "{} {} ({} blocks)",
            "✗".red().bold(),
            result.error.as_deref().unwrap_or("verification failed").red(),
            result.length
        );
    }
    Ok(result.ok)
}

fn cmd_serve(config: ServerConfig) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(SealServer::new(config).serve())?;
    Ok(true)
}

fn print_summary(block: &Block) {
    println!("  Index: {}", block.index.to_string().yellow());
    println!("  Hash:  {}", block.hash.to_hex().cyan());
    println!("  Nonce: {}", block.nonce);
}
