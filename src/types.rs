use chrono::{DateTime, Utc};

/// A controller namespace, labelled with the service it hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNamespace {
    pub label: String,
    pub namespace: String,
}

impl LogNamespace {
    pub fn new(label: &str, namespace: &str) -> Self {
        Self {
            label: label.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// Controllers whose logs are gathered when a test fails.
pub fn default_namespaces() -> Vec<LogNamespace> {
    vec![
        LogNamespace::new("Build Service", "build-service"),
        LogNamespace::new("JVM Build Service", "jvm-build-service"),
        LogNamespace::new("Application Service", "application-service"),
        LogNamespace::new("Image Controller", "image-controller"),
    ]
}

/// Container names of a pod, in the order the API server reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodContainers {
    pub pod_name: String,
    pub init_containers: Vec<String>,
    pub containers: Vec<String>,
}

impl PodContainers {
    /// Init containers first, they run before the main ones.
    pub fn all_containers(&self) -> impl Iterator<Item = &str> {
        self.init_containers
            .iter()
            .chain(self.containers.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct NamespaceLogs {
    pub namespace: LogNamespace,
    pub logs: String,
}

#[derive(Debug, Clone)]
pub struct TestRun {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub failed: bool,
}
