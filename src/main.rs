mod artifacts;
mod cli;
mod collector;
mod config;
mod filter;
mod kubernetes;
mod report;
mod types;
mod utils;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use tracing::{info, warn};

use artifacts::ArtifactWriter;
use cli::{Cli, ClusterArgs, Command};
use collector::{collect_filtered_logs, collect_logs, logs_to_artifacts, store_controllers_logs};
use config::ArtifactConfig;
use kubernetes::{KubePodSource, PodSource, connect, store_pods_yaml};
use report::{build_failure_report, render_report, report_artifacts};
use types::{LogNamespace, TestRun, default_namespaces};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ArtifactConfig::from_env().context("Failed to resolve artifact configuration")?;
    info!(
        "Run mode: {:?}, artifact root: {}",
        config.run_mode,
        config.artifact_root.display()
    );

    match cli.command {
        Command::Collect {
            cluster,
            since,
            output_dir,
            test_name,
        } => {
            let source = pod_source(&cluster).await?;
            let namespaces = namespaces_or_default(&cluster);
            let logs = match since {
                Some(since) => collect_filtered_logs(&source, &namespaces, since).await,
                None => collect_logs(&source, &namespaces).await,
            };

            let mut writer = ArtifactWriter::new(config);
            if let Some(name) = &test_name {
                writer = writer.for_test(name);
            }
            let dir = writer.write(&logs_to_artifacts(&logs), output_dir.as_deref())?;
            info!("Stored logs of {} namespaces in {}", logs.len(), dir.display());
        }
        Command::Filter { since, file } => {
            let logs = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
            };
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(filter::filter_logs(&logs, since).as_bytes())?;
            stdout.flush()?;
        }
        Command::Report {
            cluster,
            test_name,
            started_at,
            ended_at,
            passed,
            skip_logs,
            write,
        } => {
            let run = TestRun {
                name: test_name,
                started_at,
                ended_at: ended_at.unwrap_or_else(Utc::now),
                failed: !passed,
            };
            let namespaces = namespaces_or_default(&cluster);
            let source = if skip_logs {
                None
            } else {
                Some(pod_source(&cluster).await?)
            };

            let entries = build_failure_report(
                source.as_ref().map(|s| s as &dyn PodSource),
                &namespaces,
                &config,
                &run,
            )
            .await;
            if entries.is_empty() {
                info!("Test '{}' did not fail, nothing to report", run.name);
                return Ok(());
            }
            println!("{}", render_report(&entries));

            if write {
                let writer = ArtifactWriter::new(config).for_test(&run.name);
                let dir = writer.write(&report_artifacts(&entries), None)?;
                info!("Failure report stored in {}", dir.display());
            }
        }
        Command::StoreControllerLogs { cluster } => {
            let source = pod_source(&cluster).await?;
            let writer = ArtifactWriter::new(config);
            // best effort, the failure is already logged
            if let Err(e) = store_controllers_logs(&source, &namespaces_or_default(&cluster), &writer).await {
                warn!("Controller logs were not stored: {}", e);
            }
        }
        Command::DumpPods {
            namespace,
            context,
            test_name,
        } => {
            let client = connect(context.as_deref()).await?;
            let mut writer = ArtifactWriter::new(config);
            if let Some(name) = &test_name {
                writer = writer.for_test(name);
            }
            let dir = store_pods_yaml(&client, &namespace, &writer).await?;
            info!("Pods of {} stored in {}", namespace, dir.display());
        }
    }

    Ok(())
}

async fn pod_source(cluster: &ClusterArgs) -> anyhow::Result<KubePodSource> {
    let client = connect(cluster.context.as_deref()).await?;
    Ok(KubePodSource::new(client))
}

fn namespaces_or_default(cluster: &ClusterArgs) -> Vec<LogNamespace> {
    if cluster.namespaces.is_empty() {
        default_namespaces()
    } else {
        cluster.namespaces.clone()
    }
}
