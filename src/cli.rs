use crate::types::LogNamespace;
use crate::utils::{parse_namespace, parse_timestamp};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "controller-logs")]
#[command(about = "Collect controller logs and artifacts for failed e2e tests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Collect controller logs and write one file per namespace
    Collect {
        #[command(flatten)]
        cluster: ClusterArgs,

        /// Only keep lines logged at or after this RFC 3339 timestamp
        #[arg(long, value_parser = parse_timestamp)]
        since: Option<DateTime<Utc>>,

        /// Output directory (defaults to the test's artifact directory)
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Name of the test the logs belong to
        #[arg(long)]
        test_name: Option<String>,
    },

    /// Filter a log file (or stdin) to lines since a timestamp
    Filter {
        /// Window start, RFC 3339
        #[arg(long, value_parser = parse_timestamp)]
        since: DateTime<Utc>,

        /// Log file, stdin if omitted
        file: Option<PathBuf>,
    },

    /// Print the failure report of a test
    Report {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[arg(long)]
        test_name: String,

        /// When the test started, RFC 3339
        #[arg(long, value_parser = parse_timestamp)]
        started_at: DateTime<Utc>,

        /// When the test ended, RFC 3339 (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        ended_at: Option<DateTime<Utc>>,

        /// The test passed, nothing is reported
        #[arg(long)]
        passed: bool,

        /// Do not read controller logs from the cluster
        #[arg(long)]
        skip_logs: bool,

        /// Also store the report in the test's artifact directory
        #[arg(long)]
        write: bool,
    },

    /// Store raw controller logs in the controller logs directory
    StoreControllerLogs {
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Store the pods of a namespace as YAML
    DumpPods {
        /// Namespace to dump
        #[arg(short = 'N', long = "pods-namespace")]
        namespace: String,

        /// Kubeconfig context
        #[arg(long)]
        context: Option<String>,

        #[arg(long)]
        test_name: Option<String>,
    },
}

#[derive(Args, Clone)]
pub struct ClusterArgs {
    /// Controller namespace as `Label=namespace`, repeatable
    #[arg(short = 'n', long = "namespace", value_parser = parse_namespace)]
    pub namespaces: Vec<LogNamespace>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,
}
