use crate::config::ArtifactConfig;
use crate::utils::test_dir_name;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact file name to content.
pub type Artifacts = BTreeMap<String, Vec<u8>>;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to create artifact directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error getting resource yaml for {name}: {source}")]
    Yaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Persists named blobs to the artifact directory of the current test.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    config: ArtifactConfig,
    test_name: Option<String>,
}

impl ArtifactWriter {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            config,
            test_name: None,
        }
    }

    /// Scope artifacts to a per-test subdirectory.
    pub fn for_test(mut self, test_name: &str) -> Self {
        self.test_name = Some(test_name.to_string());
        self
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    /// Directory artifacts land in when no explicit one is given.
    pub fn default_dir(&self) -> PathBuf {
        match &self.test_name {
            Some(name) => self.config.artifact_root.join(test_dir_name(name)),
            None => self.config.artifact_root.clone(),
        }
    }

    /// Write every artifact under `base_dir`, or the per-test directory.
    ///
    /// Existing files are overwritten. Stops at the first failure, artifacts
    /// already written stay on disk.
    pub fn write(&self, artifacts: &Artifacts, base_dir: Option<&Path>) -> Result<PathBuf, ArtifactError> {
        let dir = base_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_dir());
        create_artifact_dir(&dir)?;

        for (name, content) in artifacts {
            let path = dir.join(name);
            write_artifact(&path, content).map_err(|source| ArtifactError::Write {
                path: path.clone(),
                source,
            })?;
            debug!("Stored artifact {} ({} bytes)", path.display(), content.len());
        }

        Ok(dir)
    }

    /// Store `resource` as `<name>.yaml` in the per-test directory.
    pub fn store_resource_yaml<T: Serialize>(&self, resource: &T, name: &str) -> Result<PathBuf, ArtifactError> {
        let yaml = serde_yaml::to_string(resource).map_err(|source| ArtifactError::Yaml {
            name: name.to_string(),
            source,
        })?;

        let mut artifacts = Artifacts::new();
        artifacts.insert(format!("{}.yaml", name), yaml.into_bytes());
        self.write(&artifacts, None)
    }
}

/// Create `dir` and its parents. An existing directory is not an error.
pub fn create_artifact_dir(dir: &Path) -> Result<(), ArtifactError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o775);
    }
    builder.create(dir).map_err(|source| ArtifactError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_artifact(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    file.write_all(content)
}
