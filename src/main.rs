use anyhow::Context;
use clap::Parser;
use network_replicator::utils::{logger, validation::Validate};
use network_replicator::{CliConfig, LocalHost, NetworkConfig, ReplicationReport};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if let Err(e) = args.validate() {
        eprintln!("❌ Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config = match NetworkConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::debug!("CLI arguments: {:?}", args);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let host = LocalHost::from_config(&config);
    let member = LocalHost::resolve_member(&config, &args.member)?;

    if args.dry_run {
        let targets = host.targets_for(member).await?;
        println!("Would copy '{}' from member {} to:", args.file, member);
        for target in targets {
            println!("  - member {}", target.id);
        }
        return Ok(());
    }

    let path = Path::new(&args.file);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' has no usable file name", args.file))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", args.file))?;

    let upload = host
        .upload(member, file_name, bytes, args.parent, args.mime_type.as_deref())
        .await
        .context("replication failed")?;

    let Some(outcomes) = upload.outcomes else {
        println!("Upload event suppressed; no replication performed");
        return Ok(());
    };

    let report = ReplicationReport::from_outcomes(&outcomes);
    if args.json {
        let body = serde_json::json!({
            "source": { "member": member, "object": upload.source.id },
            "report": report,
            "outcomes": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!(
            "📁 '{}' uploaded as object {} on member {}",
            upload.source.file_name, upload.source.id, member
        );
        for outcome in &outcomes {
            match (&outcome.created_object_id, &outcome.error) {
                (Some(id), _) if outcome.degraded() => {
                    println!("⚠️  member {}: object {} (degraded)", outcome.target_member_id, id);
                    for warning in &outcome.warnings {
                        println!("      {:?}: {}", warning.kind, warning.message);
                    }
                }
                (Some(id), _) => println!("✅ member {}: object {}", outcome.target_member_id, id),
                (None, Some(error)) => println!(
                    "❌ member {}: {:?}: {}",
                    outcome.target_member_id, error.kind, error.message
                ),
                (None, None) => println!("❌ member {}: failed", outcome.target_member_id),
            }
        }
        println!(
            "{} of {} member(s) received the file",
            report.succeeded, report.total
        );
    }

    if !report.all_succeeded() {
        std::process::exit(2);
    }
    Ok(())
}
