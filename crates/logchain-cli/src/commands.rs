use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use logchain_crypto::{BatchTree, FingerprintBuilder};
use logchain_server::dto::CreateBatchRequest;
use logchain_server::{LogChainServer, NodeConfig};
use serde_json::json;
use tracing::{info, warn};

use crate::cli::*;
use crate::client::ApiClient;
use crate::logs;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Fingerprint(args) => cmd_fingerprint(args, format),
        Command::Prove(args) => cmd_prove(args, format),
        Command::Push(args) => cmd_push(args, format).await,
        Command::Verify(args) => cmd_verify(args, format).await,
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs, format: OutputFormat) -> anyhow::Result<()> {
    let lines = logs::read_batch(&args.paths)?;
    let mut builder = FingerprintBuilder::new();
    builder.extend(&lines);
    let Some(fingerprint) = builder.finish() else {
        anyhow::bail!("no fingerprint: the input has no log lines");
    };

    match format {
        OutputFormat::Json => print_json(&json!({
            "fingerprint": fingerprint,
            "lines": builder.line_count(),
        })),
        OutputFormat::Text => {
            println!("{} {}", "Fingerprint:".bold(), fingerprint.to_string().cyan());
            println!("  Lines: {}", builder.line_count());
            Ok(())
        }
    }
}

fn cmd_prove(args: ProveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let lines = logs::read_batch(&args.paths)?;
    let tree = BatchTree::from_lines(&lines).context("no fingerprint: the input has no log lines")?;
    let proof = tree.proof(args.line).with_context(|| {
        format!("line {} is out of range (batch has {} lines)", args.line, tree.line_count())
    })?;
    let verified = proof.verify(&lines[args.line]);

    match format {
        OutputFormat::Json => print_json(&json!({ "proof": proof, "verified": verified })),
        OutputFormat::Text => {
            println!("{} {}", "Fingerprint:".bold(), proof.fingerprint.to_string().cyan());
            println!("  Line {}: {}", args.line, String::from_utf8_lossy(&lines[args.line]).trim_end());
            println!("  Path length: {}", proof.path.len());
            for (sibling, side) in &proof.path {
                println!("    {:?} {}", side, hex::encode(sibling).dimmed());
            }
            if verified {
                println!("{} Line is included in the batch", "✓".green().bold());
            } else {
                println!("{} Proof does not verify", "✗".red().bold());
            }
            Ok(())
        }
    }
}

async fn cmd_push(args: PushArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&args.server);
    info!(server = %args.server, device = %args.device, dir = %args.log_dir.display(), "log agent started");

    loop {
        let round = push_once(&client, &args, format).await;
        match (round, args.interval) {
            (Err(err), None) => return Err(err),
            (Err(err), Some(_)) => warn!(error = %format!("{err:#}"), "push failed, retrying next round"),
            (Ok(()), _) => {}
        }
        match args.interval {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => return Ok(()),
        }
    }
}

async fn push_once(client: &ApiClient, args: &PushArgs, format: OutputFormat) -> anyhow::Result<()> {
    let lines = logs::read_batch(std::slice::from_ref(&args.log_dir))?;
    let mut builder = FingerprintBuilder::new();
    builder.extend(&lines);
    let Some(fingerprint) = builder.finish() else {
        info!("no logs found, waiting");
        return Ok(());
    };
    info!(%fingerprint, lines = lines.len(), "computed batch fingerprint");

    let request = CreateBatchRequest {
        batch_id: Some(format!("{:08x}", rand::random::<u32>())),
        device_id: Some(args.device.clone()),
        user_id: args.user.clone(),
        merkle_root: fingerprint.to_hex(),
        ipfs_cid: args.content_ref.clone(),
        size: Some(lines.len() as u64),
    };
    let batch = client.create_batch(&request).await?;
    info!(id = %batch.id, "batch submitted");

    let anchor = if args.no_anchor {
        None
    } else {
        Some(client.anchor(&batch.id).await?)
    };

    match format {
        OutputFormat::Json => print_json(&json!({ "batch": batch, "anchor": anchor })),
        OutputFormat::Text => {
            println!("{} Batch {} sent ({} lines)", "✓".green().bold(), batch.id.yellow(), lines.len());
            println!("  Fingerprint: {}", batch.merkle_root.cyan());
            if let Some(anchor) = anchor {
                println!("  Anchor: {} {}", anchor.status.green(), anchor.tx_hash.dimmed());
            }
            Ok(())
        }
    }
}

async fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&args.server);
    let result = client.verify(&args.batch_id).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            match result.matched_index {
                Some(index) => println!(
                    "{} Batch {} is on the ledger at index {}",
                    "✓".green().bold(),
                    result.id.yellow(),
                    index
                ),
                None => println!("{} Batch {} is not on the ledger", "✗".red().bold(), result.id.yellow()),
            }
            println!("  Recorded as anchored: {}", result.anchored);
            if let Some(discrepancy) = result.discrepancy {
                println!("  {} {:?}", "Discrepancy:".red().bold(), discrepancy);
            }
            Ok(())
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    let mut config = config.finalize()?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    LogChainServer::new(config)?.serve().await?;
    Ok(())
}
