use anyhow::{Context, Result};
use url::Url;

/// Path of the artifact collection, relative to the registry base URL.
const ARTIFACT_PATH: &str = "v1/artifact";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoint {
    /// Base URL with scheme, e.g. `https://api.codenotary.io/foundation`.
    pub base_url: Url,
}

impl RegistryEndpoint {
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("invalid registry URL (expected https://...): {base_url}"))?;
        url.host_str().context("registry URL missing host")?;

        Ok(Self {
            base_url: strip_trailing_slash(url)?,
        })
    }

    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Root of the artifact collection.
    pub fn artifacts(&self) -> String {
        format!("{}/{ARTIFACT_PATH}", self.base())
    }

    /// Collection of artifacts submitted under `wallet_address`.
    ///
    /// Inputs are not validated; the registry rejects malformed addresses.
    pub fn artifacts_for_wallet(&self, wallet_address: &str) -> String {
        format!("{}/wallet/{wallet_address}", self.artifacts())
    }

    /// A single artifact identified by its content hash and metahash.
    pub fn artifact_for_hash(&self, hash: &str, meta_hash: &str) -> String {
        format!("{}/{hash}/{meta_hash}", self.artifacts())
    }
}

fn strip_trailing_slash(url: Url) -> Result<Url> {
    let s = url.as_str();
    if s.ends_with('/') && url.path() != "/" {
        Url::parse(s.trim_end_matches('/')).context("failed to normalize registry URL")
    } else {
        Ok(url)
    }
}
