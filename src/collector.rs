use crate::artifacts::{ArtifactError, ArtifactWriter, Artifacts};
use crate::filter::filter_logs;
use crate::kubernetes::PodSource;
use crate::types::{LogNamespace, NamespaceLogs};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy)]
enum Capture {
    /// Whole logs, concatenated as is.
    Raw,
    /// Each container log cut to the window starting at the given instant.
    Since(DateTime<Utc>),
}

/// Gather the full logs of every pod in each namespace.
///
/// Failures are written into the affected namespace's logs and never abort
/// the collection.
pub async fn collect_logs(source: &dyn PodSource, namespaces: &[LogNamespace]) -> Vec<NamespaceLogs> {
    collect(source, namespaces, Capture::Raw).await
}

/// Like [`collect_logs`], keeping only what was logged since `since`, with a
/// header naming the service.
pub async fn collect_filtered_logs(
    source: &dyn PodSource,
    namespaces: &[LogNamespace],
    since: DateTime<Utc>,
) -> Vec<NamespaceLogs> {
    collect(source, namespaces, Capture::Since(since)).await
}

async fn collect(source: &dyn PodSource, namespaces: &[LogNamespace], capture: Capture) -> Vec<NamespaceLogs> {
    let mut result = Vec::with_capacity(namespaces.len());
    for ns in namespaces {
        let logs = collect_namespace(source, ns, capture).await;
        result.push(NamespaceLogs {
            namespace: ns.clone(),
            logs,
        });
    }
    result
}

async fn collect_namespace(source: &dyn PodSource, ns: &LogNamespace, capture: Capture) -> String {
    let mut logs = String::new();
    if let Capture::Since(_) = capture {
        logs.push_str(&format!("\n========= {} =========\n\n", ns.label));
    }

    let pods = match source.list_pods(&ns.namespace).await {
        Ok(pods) => pods,
        Err(e) => {
            warn!("Failed to list pods in namespace {}: {}", ns.namespace, e);
            logs.push_str(&format!("Error listing pods: {}\n", e));
            return logs;
        }
    };
    debug!("[{}] Found {} pods", ns.namespace, pods.len());

    for pod in &pods {
        for container in pod.all_containers() {
            match source
                .container_logs(&ns.namespace, &pod.pod_name, container)
                .await
            {
                Ok(log) => match capture {
                    Capture::Raw => logs.push_str(&log),
                    Capture::Since(since) => {
                        logs.push_str(&filter_logs(&log, since));
                        logs.push('\n');
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to get logs for pod {}/{} in namespace {}: {}",
                        pod.pod_name, container, ns.namespace, e
                    );
                    logs.push_str(&format!("Error getting logs: {}\n", e));
                }
            }
        }
    }
    logs
}

/// One `<namespace>.log` artifact per namespace.
pub fn logs_to_artifacts(logs: &[NamespaceLogs]) -> Artifacts {
    logs.iter()
        .map(|l| {
            (
                format!("{}.log", l.namespace.namespace),
                l.logs.clone().into_bytes(),
            )
        })
        .collect()
}

/// Store raw controller logs under the controller logs directory.
pub async fn store_controllers_logs(
    source: &dyn PodSource,
    namespaces: &[LogNamespace],
    writer: &ArtifactWriter,
) -> Result<PathBuf, ArtifactError> {
    let logs = collect_logs(source, namespaces).await;
    let dir = writer.config().controller_logs_dir();
    match writer.write(&logs_to_artifacts(&logs), Some(&dir)) {
        Ok(dir) => {
            info!("Controller logs stored in {}", dir.display());
            Ok(dir)
        }
        Err(e) => {
            error!("error storing artifacts: {}", e);
            Err(e)
        }
    }
}
