use crate::auth::{AuthContext, MetaHasher};
use crate::config::ClientConfig;
use crate::endpoint::RegistryEndpoint;
use crate::error::RegistryError;
use crate::mapping::{Status, Visibility};
use crate::types::{ArtifactRequest, ArtifactResponse, ErrorBody, PagedArtifactResponse};
use reqwest::{Response, StatusCode};
use std::sync::Arc;

/// Client for the artifact registry.
///
/// Submitting and listing prove wallet ownership with a bearer token from the
/// [`AuthContext`]. Lookups by hash never send credentials, so anyone can
/// verify an attestation. No operation retries on its own.
#[derive(Clone)]
pub struct RegistryClient {
    endpoint: RegistryEndpoint,
    http: reqwest::Client,
    auth: Arc<dyn AuthContext>,
    hasher: Arc<dyn MetaHasher>,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    pub fn new(
        config: &ClientConfig,
        auth: Arc<dyn AuthContext>,
        hasher: Arc<dyn MetaHasher>,
    ) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(RegistryError::Client)?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http,
            auth,
            hasher,
        })
    }

    /// The metahash for `hash`, as sent on submit and used by lookups.
    pub fn meta_hash(&self, hash: &str) -> Result<String, RegistryError> {
        self.hasher
            .hash_asset(hash)
            .map_err(|e| RegistryError::Hash {
                operation: "hash asset",
                target: hash.to_string(),
                source: e.into(),
            })
    }

    /// Submit an attestation for `hash` under `wallet_address`.
    ///
    /// Fails with [`RegistryError::AuthMissing`] before any network I/O when
    /// no token is available. Only HTTP 200 counts as success.
    pub async fn submit(
        &self,
        wallet_address: &str,
        name: &str,
        hash: &str,
        file_size: i64,
        visibility: Visibility,
        status: Status,
    ) -> Result<(), RegistryError> {
        const OP: &str = "submit artifact";

        let token = self.token(OP)?;
        let body = self.artifact_request(name, hash, file_size, visibility, status)?;
        self.post_artifact(OP, &token, wallet_address, &body).await
    }

    /// Like [`submit`](Self::submit) under the local wallet.
    ///
    /// The token is checked first, so a user who has neither a session nor a
    /// wallet gets [`RegistryError::AuthMissing`].
    pub async fn submit_for_current_wallet(
        &self,
        name: &str,
        hash: &str,
        file_size: i64,
        visibility: Visibility,
        status: Status,
    ) -> Result<(), RegistryError> {
        const OP: &str = "submit artifact";

        let token = self.token(OP)?;
        let wallet = self.current_wallet(OP)?;
        let body = self.artifact_request(name, hash, file_size, visibility, status)?;
        self.post_artifact(OP, &token, &wallet, &body).await
    }

    fn artifact_request(
        &self,
        name: &str,
        hash: &str,
        file_size: i64,
        visibility: Visibility,
        status: Status,
    ) -> Result<ArtifactRequest, RegistryError> {
        Ok(ArtifactRequest {
            name: name.to_string(),
            hash: hash.to_string(),
            filename: name.to_string(),
            file_size,
            url: String::new(),
            license: String::new(),
            visibility: visibility.name().to_string(),
            status: status.name().to_string(),
            meta_hash: self.meta_hash(hash)?,
        })
    }

    async fn post_artifact(
        &self,
        operation: &'static str,
        token: &str,
        wallet_address: &str,
        body: &ArtifactRequest,
    ) -> Result<(), RegistryError> {
        let hash = body.hash.as_str();
        let url = self.endpoint.artifacts_for_wallet(wallet_address);
        tracing::debug!(%url, hash, status = %body.status, "submitting artifact");

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(operation, hash, e))?;

        if resp.status() != StatusCode::OK {
            return Err(rejected(operation, hash, resp).await);
        }

        tracing::info!(hash, status = %body.status, "artifact submitted");
        Ok(())
    }

    /// Artifacts submitted under `wallet_address`, in the order the registry
    /// returns them.
    pub async fn list_for_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<ArtifactResponse>, RegistryError> {
        const OP: &str = "list artifacts";

        let token = self.token(OP)?;
        self.get_artifacts(OP, &token, wallet_address).await
    }

    /// Like [`list_for_wallet`](Self::list_for_wallet) for the local wallet.
    pub async fn list_for_current_wallet(&self) -> Result<Vec<ArtifactResponse>, RegistryError> {
        const OP: &str = "list artifacts";

        let token = self.token(OP)?;
        let wallet = self.current_wallet(OP)?;
        self.get_artifacts(OP, &token, &wallet).await
    }

    async fn get_artifacts(
        &self,
        operation: &'static str,
        token: &str,
        wallet_address: &str,
    ) -> Result<Vec<ArtifactResponse>, RegistryError> {
        let url = self.endpoint.artifacts_for_wallet(wallet_address);
        tracing::debug!(%url, "listing artifacts");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport(operation, wallet_address, e))?;

        if resp.status() != StatusCode::OK {
            return Err(rejected(operation, wallet_address, resp).await);
        }

        let page: PagedArtifactResponse = resp.json().await.map_err(|e| RegistryError::Decode {
            operation,
            target: wallet_address.to_string(),
            source: e,
        })?;
        Ok(page.content)
    }

    fn token(&self, operation: &'static str) -> Result<String, RegistryError> {
        self.auth
            .load_token()
            .map_err(|e| RegistryError::AuthMissing {
                operation,
                source: e.into(),
            })
    }

    fn current_wallet(&self, operation: &'static str) -> Result<String, RegistryError> {
        self.auth
            .public_key_for_local_wallet()
            .map_err(|e| RegistryError::Wallet {
                operation,
                source: e.into(),
            })
    }

    /// Look up a single artifact. `Ok(None)` means the registry has no such
    /// artifact (HTTP 404).
    pub async fn lookup_by_hash(
        &self,
        hash: &str,
        meta_hash: &str,
    ) -> Result<Option<ArtifactResponse>, RegistryError> {
        const OP: &str = "lookup artifact";

        let url = self.endpoint.artifact_for_hash(hash, meta_hash);
        tracing::debug!(%url, "looking up artifact");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport(OP, hash, e))?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(hash, "artifact not found");
                Ok(None)
            }
            StatusCode::OK => resp
                .json()
                .await
                .map(Some)
                .map_err(|e| RegistryError::Decode {
                    operation: OP,
                    target: hash.to_string(),
                    source: e,
                }),
            _ => Err(rejected(OP, hash, resp).await),
        }
    }

    /// Derive the metahash for a content hash and look the artifact up.
    pub async fn lookup_content_hash(
        &self,
        hash: &str,
    ) -> Result<Option<ArtifactResponse>, RegistryError> {
        let meta_hash = self.meta_hash(hash)?;
        self.lookup_by_hash(hash, &meta_hash).await
    }
}

fn transport(operation: &'static str, target: &str, source: reqwest::Error) -> RegistryError {
    RegistryError::Transport {
        operation,
        target: target.to_string(),
        source,
    }
}

/// Translate an unexpected response into [`RegistryError::Rejected`], using
/// the registry's error body when it decodes and the raw status otherwise.
async fn rejected(operation: &'static str, target: &str, resp: Response) -> RegistryError {
    let http_status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    let (message, status) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) if !err.message.is_empty() || err.status != 0 => {
            let status = if err.status != 0 {
                err.status
            } else {
                i64::from(http_status.as_u16())
            };
            (err.message, status)
        }
        _ => {
            tracing::warn!(%http_status, "registry error body did not decode");
            let message = match body.trim() {
                "" => http_status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string(),
                text => text.to_string(),
            };
            (message, i64::from(http_status.as_u16()))
        }
    };

    RegistryError::Rejected {
        operation,
        target: target.to_string(),
        message,
        status,
        http_status: http_status.as_u16(),
    }
}
