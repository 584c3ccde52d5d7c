use crate::error::{ArtifactError, ArtifactResult};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Public mirror of the patched host-resolver builds.
pub const DEFAULT_MIRROR: &str = "https://github.com/nulastudio/HostFXRPatcher";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on a single download.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Remote distributor of artifacts and RID tables.
///
/// `rel` is a path relative to the mirror root, see [`paths`].
pub trait Mirror {
    fn base_url(&self) -> &str;

    fn fetch(&self, rel: &str) -> ArtifactResult<Vec<u8>>;

    fn url_for(&self, rel: &str) -> String {
        format!("{}/{}", self.base_url().trim_end_matches('/'), rel)
    }
}

/// Layout of files on the mirror.
pub mod paths {
    /// Current provenance tag of the published artifacts.
    pub const PROVENANCE: &str = "raw/master/ArtifactsVersion.txt";

    pub fn artifact(fxr_version: &str, rid: &str, file_name: &str) -> String {
        format!("raw/master/patches/{fxr_version}/{rid}/{file_name}")
    }

    pub fn table(name: &str) -> String {
        format!("raw/master/{name}")
    }
}

/// Blocking HTTPS mirror client.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpMirror {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(concat!("pubtidy/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }
}

impl Mirror for HttpMirror {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, rel: &str) -> ArtifactResult<Vec<u8>> {
        let url = self.url_for(rel);
        debug!(url = %url, "fetching from mirror");

        let response = self.agent.get(&url).call().map_err(|e| ArtifactError::Fetch {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| ArtifactError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;

        debug!(url = %url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
