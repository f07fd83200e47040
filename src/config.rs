use std::path::{Path, PathBuf};
use tracing::warn;

const CI_ARTIFACTS_URL: &str = "https://gcsweb-ci.apps.ci.l2s4.p1.openshiftapps.com/gcs/origin-ci-test";
const CI_ARTIFACTS_SUFFIX: &str = "artifacts/redhat-appstudio-e2e/redhat-appstudio-e2e/artifacts";
pub const CONTROLLER_LOGS_DIR: &str = "rhtap-controllers-logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Local,
    Ci,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub owner: String,
    pub repo: String,
    pub number: String,
}

/// Identity of the CI job, used to point at its published artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiJob {
    pub job_name: String,
    pub build_id: String,
    pub pull_request: Option<PullRequest>,
}

impl CiJob {
    pub fn artifacts_url(&self) -> String {
        let mut url = CI_ARTIFACTS_URL.to_string();
        if let Some(pr) = &self.pull_request {
            url.push_str(&format!("/pr-logs/pull/{}_{}/{}", pr.owner, pr.repo, pr.number));
        }
        url.push_str(&format!(
            "/{}/{}/{}",
            self.job_name, self.build_id, CI_ARTIFACTS_SUFFIX
        ));
        url
    }
}

/// Where artifacts go, resolved once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub run_mode: RunMode,
    /// Root for per-test artifact directories, `ARTIFACT_DIR` when set.
    pub artifact_root: PathBuf,
    /// Local runs keep cluster-wide artifacts here.
    pub local_artifacts_dir: PathBuf,
    pub ci_job: Option<CiJob>,
}

impl ArtifactConfig {
    /// Local run rooted at `cwd`.
    pub fn local(cwd: &Path) -> Self {
        Self {
            run_mode: RunMode::Local,
            artifact_root: cwd.join("tmp"),
            local_artifacts_dir: cwd.join("tmp").join("artifacts"),
            ci_job: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::from_vars(|key| std::env::var(key).ok(), &cwd))
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F, cwd: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::local(cwd);
        let artifact_dir = lookup("ARTIFACT_DIR").filter(|dir| !dir.is_empty());
        if let Some(dir) = &artifact_dir {
            config.artifact_root = PathBuf::from(dir);
        }
        if lookup("CI").as_deref() != Some("true") {
            return config;
        }

        config.run_mode = RunMode::Ci;
        if artifact_dir.is_none() {
            warn!(
                "CI=true but ARTIFACT_DIR is not set, using {}",
                config.artifact_root.display()
            );
        }

        let pull_request = lookup("PULL_NUMBER")
            .filter(|n| !n.is_empty())
            .map(|number| PullRequest {
                owner: lookup("REPO_OWNER").unwrap_or_default(),
                repo: lookup("REPO_NAME").unwrap_or_default(),
                number,
            });
        config.ci_job = Some(CiJob {
            job_name: lookup("JOB_NAME").unwrap_or_default(),
            build_id: lookup("BUILD_ID").unwrap_or_default(),
            pull_request,
        });
        config
    }

    pub fn is_ci(&self) -> bool {
        self.run_mode == RunMode::Ci
    }

    /// Directory holding artifacts that are not tied to a single test.
    pub fn artifacts_dir(&self) -> &Path {
        match self.run_mode {
            RunMode::Ci => &self.artifact_root,
            RunMode::Local => &self.local_artifacts_dir,
        }
    }

    pub fn controller_logs_dir(&self) -> PathBuf {
        self.artifacts_dir().join(CONTROLLER_LOGS_DIR)
    }

    /// Location a human can browse to, the published URL when running in CI.
    pub fn final_artifacts_location(&self) -> String {
        match (&self.run_mode, &self.ci_job) {
            (RunMode::Ci, Some(job)) => job.artifacts_url(),
            _ => self.local_artifacts_dir.display().to_string(),
        }
    }

    pub fn controller_logs_location(&self) -> String {
        format!("{}/{}", self.final_artifacts_location(), CONTROLLER_LOGS_DIR)
    }
}
