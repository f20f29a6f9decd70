use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use attest_gateway::{
    Gateway, GatewayConfig, GatewayError, ListResponse, RegisterRequest, RegisterResponse,
    RevokeRequest, RevokeResponse, VerifyResponse,
};
use attest_ledger::{AuditReport, LedgerEvent, LedgerEventKind};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    if let Command::Hash(args) = &cli.command {
        return cmd_hash(args, format);
    }

    let gateway = open_gateway(cli.config.as_deref(), cli.log.as_deref())?;
    let result = match cli.command {
        Command::Hash(_) => Ok(()),
        Command::Register(args) => cmd_register(&gateway, args, format).await,
        Command::Revoke(args) => cmd_revoke(&gateway, args, format).await,
        Command::Verify(args) => cmd_verify(&gateway, args, format),
        Command::List(args) => cmd_list(&gateway, args, format),
        Command::History(args) => cmd_history(&gateway, args, format),
        Command::Audit(_) => cmd_audit(&gateway, format),
    };

    match result {
        Err(e) if format == OutputFormat::Json => {
            if let Some(gw) = e.downcast_ref::<GatewayError>() {
                println!("{}", serde_json::to_string_pretty(&gw.to_body())?);
            }
            Err(e)
        }
        other => other,
    }
}

fn open_gateway(config: Option<&Path>, log: Option<&Path>) -> anyhow::Result<Gateway> {
    let mut config = match config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(log) = log {
        config.log_path = log.to_path_buf();
    }
    tracing::debug!(path = %config.log_path.display(), "opening ledger");
    Ok(Gateway::open(config)?)
}

fn cmd_hash(args: &HashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let fingerprint = attest_crypto::fingerprint_file(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "file": args.file.display().to_string(),
            "fingerprint": fingerprint,
        })),
        OutputFormat::Text => {
            println!("{}  {}", fingerprint.as_str().yellow(), args.file.display());
            Ok(())
        }
    }
}

async fn cmd_register(
    gateway: &Gateway,
    args: RegisterArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (fingerprint, name) = match (&args.file, args.hash) {
        (Some(file), _) => {
            let fingerprint = attest_crypto::fingerprint_file(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let name = match args.name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("--name is required when the file has no name")?,
            };
            (fingerprint.to_string(), name)
        }
        (None, Some(hash)) => (hash, args.name.unwrap_or_default()),
        (None, None) => anyhow::bail!("one of --file or --hash is required"),
    };

    let request = RegisterRequest {
        caller: args.wallet,
        fingerprint,
        name,
        external_pointer: args.cid,
    };
    let response = gateway.register(&request).await?;
    if !response.confirms(&request) {
        anyhow::bail!("ledger stored different values than were submitted");
    }

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            print_registered(&response);
            Ok(())
        }
    }
}

fn print_registered(response: &RegisterResponse) {
    println!("{} Document registered", "✓".green().bold());
    println!("  Fingerprint: {}", response.fingerprint.yellow());
    println!("  Name: {}", response.name);
    println!("  Owner: {}", response.owner.cyan());
    if let Some(pointer) = &response.external_pointer {
        println!("  Pointer: {}", pointer.blue());
    }
    println!("  Registered: {}", timestamp(response.registered_at));
    println!("  Commit: c#{} {}", response.commit_index, response.commit_ref.dimmed());
}

async fn cmd_revoke(gateway: &Gateway, args: RevokeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = RevokeRequest {
        caller: args.wallet,
        fingerprint: args.hash,
    };
    let response: RevokeResponse = gateway.revoke(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            println!("{} Registration revoked", "✓".green().bold());
            println!("  Fingerprint: {}", response.fingerprint.yellow());
            println!("  Revoked: {}", timestamp(response.revoked_at));
            println!("  Commit: c#{} {}", response.commit_index, response.commit_ref.dimmed());
            Ok(())
        }
    }
}

fn cmd_verify(gateway: &Gateway, args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let fingerprint = match (args.hash, &args.file) {
        (Some(hash), _) => hash,
        (None, Some(file)) => attest_crypto::fingerprint_file(file)
            .with_context(|| format!("reading {}", file.display()))?
            .to_string(),
        (None, None) => anyhow::bail!("one of --hash or --file is required"),
    };
    let response = gateway.verify(&fingerprint)?;

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            print_verified(&fingerprint, &response);
            Ok(())
        }
    }
}

fn print_verified(fingerprint: &str, response: &VerifyResponse) {
    if !response.exists {
        println!("{} {} is not registered", "✗".red().bold(), fingerprint.yellow());
        return;
    }

    let status = if response.revoked {
        "revoked".red().bold()
    } else {
        "valid".green().bold()
    };
    println!("{} {} is registered ({status})", "✓".green().bold(), fingerprint.yellow());
    if let Some(name) = &response.name {
        println!("  Name: {name}");
    }
    if let Some(owner) = &response.owner {
        println!("  Owner: {}", owner.cyan());
    }
    if let Some(at) = response.registered_at {
        println!("  Registered: {}", timestamp(at));
    }
    if let Some(pointer) = &response.external_pointer {
        println!("  Pointer: {}", pointer.blue());
    }
}

fn cmd_list(gateway: &Gateway, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let response: ListResponse = gateway.list(&args.wallet)?;

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            if response.documents.is_empty() {
                println!("No documents registered by {}.", response.owner.cyan());
                return Ok(());
            }
            println!("Documents registered by {}:", response.owner.cyan());
            for doc in &response.documents {
                let marker = if doc.revoked {
                    " (revoked)".red().to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {}  {}  {}{marker}",
                    timestamp(doc.registered_at).dimmed(),
                    doc.fingerprint.yellow(),
                    doc.name
                );
            }
            Ok(())
        }
    }
}

fn cmd_history(gateway: &Gateway, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let events: Vec<LedgerEvent> = gateway.history(&args.hash)?;

    match format {
        OutputFormat::Json => print_json(&events),
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No events for {}.", args.hash.yellow());
            }
            for event in &events {
                let kind = match event.kind {
                    LedgerEventKind::Registered => event.kind.to_string().green(),
                    LedgerEventKind::Revoked => event.kind.to_string().red(),
                };
                println!(
                    "{}  {kind}  by {}  {}",
                    timestamp(event.timestamp).dimmed(),
                    event.owner.to_string().cyan(),
                    event.commit.to_string().dimmed()
                );
            }
            Ok(())
        }
    }
}

fn cmd_audit(gateway: &Gateway, format: OutputFormat) -> anyhow::Result<()> {
    let report: AuditReport = gateway.audit()?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!("{} Commit log integrity verified", "✓".green().bold());
            println!("  Entries: {}", report.entries.to_string().bold());
            println!("  Registrations: {}", report.registrations);
            println!("  Revocations: {}", report.revocations);
            println!("  Owners: {}", report.owners);
            match report.head {
                Some(head) => println!("  Head: {}", head.to_string().yellow()),
                None => println!("  Head: {}", "empty".dimmed()),
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render milliseconds since the epoch as UTC.
fn timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{ms} ms"))
}
