use anyhow::{Context, Result};
use std::sync::Arc;
use vcn_registry_client::{ClientConfig, RegistryClient, Sha256MetaHasher};

use crate::session::{LocalSession, VcnHome};

/// Everything a command needs, built once at process start.
#[derive(Debug)]
pub struct AppContext {
    pub config: ClientConfig,
    pub session: Arc<LocalSession>,
    pub client: RegistryClient,
}

impl AppContext {
    pub fn from_env() -> Result<Self> {
        let home = VcnHome::from_env()?;
        home.create_dirs()?;
        tracing::debug!(home = %home.root().display(), "using vcn home");

        let config = ClientConfig::from_env().context("invalid registry configuration")?;
        let session = Arc::new(LocalSession::from_env(home.clone()));
        let client = RegistryClient::new(&config, session.clone(), Arc::new(Sha256MetaHasher))?;

        Ok(Self {
            config,
            session,
            client,
        })
    }
}
