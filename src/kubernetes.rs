use crate::artifacts::ArtifactWriter;
use crate::types::PodContainers;
use async_trait::async_trait;
use futures::io::AsyncReadExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::{Api, Client, ResourceExt, config};
use std::path::PathBuf;
use tracing::{debug, info};

/// Lists pods and reads their container logs.
///
/// The collector only talks to the cluster through this trait so it can be
/// exercised against canned pods in tests.
#[async_trait]
pub trait PodSource: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<PodContainers>>;

    /// Full log of one container, no tailing.
    async fn container_logs(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
    ) -> anyhow::Result<String>;
}

pub struct KubePodSource {
    client: Client,
}

impl KubePodSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn pod_containers(pod: &Pod) -> PodContainers {
    let mut containers = PodContainers {
        pod_name: pod.name_any(),
        ..Default::default()
    };
    if let Some(spec) = &pod.spec {
        if let Some(init) = &spec.init_containers {
            containers.init_containers = init.iter().map(|c| c.name.clone()).collect();
        }
        containers.containers = spec.containers.iter().map(|c| c.name.clone()).collect();
    }
    containers
}

#[async_trait]
impl PodSource for KubePodSource {
    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<PodContainers>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await?;
        Ok(pods.items.iter().map(pod_containers).collect())
    }

    async fn container_logs(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
    ) -> anyhow::Result<String> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = LogParams {
            follow: false,
            container: Some(container_name.to_string()),
            ..Default::default()
        };
        debug!(
            "Reading logs for pod {}/{} in namespace {}",
            pod_name, container_name, namespace
        );
        let stream = api.log_stream(pod_name, &lp).await?;
        futures::pin_mut!(stream);
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Client for the given kubeconfig context, or the current one.
pub async fn connect(context: Option<&str>) -> anyhow::Result<Client> {
    let config = match context {
        Some(ctx) => config::Config::from_kubeconfig(&config::KubeConfigOptions {
            context: Some(ctx.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
        None => config::Config::infer().await?,
    };
    let client = Client::try_from(config)?;
    info!(
        "Initialized client for context: {}",
        context.unwrap_or("current")
    );
    Ok(client)
}

/// Dump all pods of `namespace` as `pods-<namespace>.yaml`.
pub async fn store_pods_yaml(
    client: &Client,
    namespace: &str,
    writer: &ArtifactWriter,
) -> anyhow::Result<PathBuf> {
    let api: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pods = api.list(&ListParams::default()).await?;
    info!("Storing {} pods from namespace {}", pods.items.len(), namespace);
    let dir = writer.store_resource_yaml(&pods.items, &format!("pods-{}", namespace))?;
    Ok(dir)
}
