use crate::artifacts::Artifacts;
use crate::collector::collect_filtered_logs;
use crate::config::ArtifactConfig;
use crate::kubernetes::PodSource;
use crate::types::{LogNamespace, TestRun};

pub const REPORT_FILE: &str = "failure-report.txt";

/// A named section attached to a failed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub name: String,
    pub body: String,
}

impl ReportEntry {
    fn new(name: &str, body: String) -> Self {
        Self {
            name: name.to_string(),
            body,
        }
    }
}

/// Entries describing a failed test: timing, controller logs narrowed to the
/// test's run, and where the rest of the evidence was archived.
///
/// Nothing is reported for a passing test. Without a pod source only the
/// timing and location entries are produced.
pub async fn build_failure_report(
    source: Option<&dyn PodSource>,
    namespaces: &[LogNamespace],
    config: &ArtifactConfig,
    run: &TestRun,
) -> Vec<ReportEntry> {
    if !run.failed {
        return Vec::new();
    }

    let mut entries = vec![ReportEntry::new(
        "timing",
        format!(
            "Test started at {}\nTest ended at {}",
            run.started_at, run.ended_at
        ),
    )];

    if let Some(source) = source {
        for logs in collect_filtered_logs(source, namespaces, run.started_at).await {
            entries.push(ReportEntry::new(&logs.namespace.namespace, logs.logs));
        }
    }

    entries.push(ReportEntry::new("DEBUG", locations_message(config, run)));
    entries
}

fn locations_message(config: &ArtifactConfig, run: &TestRun) -> String {
    let rule = "*".repeat(20);
    let mut msg = rule.clone();
    msg.push_str(&format!(
        "\nTest started at {}\nTest ended at {}",
        run.started_at, run.ended_at
    ));
    msg.push_str(&format!(
        "\nControllers logs are stored here: {}\n",
        config.controller_logs_location()
    ));
    if config.is_ci() {
        let location = config.final_artifacts_location();
        msg.push_str(&format!(
            "\nRHTAP custom resources are archived here: {}/redhat-appstudio-gather/artifacts/\n",
            location
        ));
        msg.push_str(&format!(
            "\nLogs from all OpenShift pods are archived here: {}/redhat-appstudio-hypershift-gather/artifacts/pods/\n",
            location
        ));
    }
    msg.push_str(&rule);
    msg
}

pub fn render_report(entries: &[ReportEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("[{}]\n{}\n", e.name, e.body))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn report_artifacts(entries: &[ReportEntry]) -> Artifacts {
    let mut artifacts = Artifacts::new();
    artifacts.insert(REPORT_FILE.to_string(), render_report(entries).into_bytes());
    artifacts
}
