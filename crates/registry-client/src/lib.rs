//! Client for the vcn artifact trust registry.
//!
//! An artifact is a file hash bound to a wallet identity together with the
//! attestor's trust verdict. This crate:
//! - resolves registry endpoints for wallets and `(hash, metahash)` pairs,
//! - maps [`Visibility`], [`Status`] and [`Level`] onto their wire names,
//! - submits, lists and looks up artifacts, translating registry error bodies
//!   into [`RegistryError`].
//!
//! Credentials and the metahash primitive come from the caller through the
//! [`AuthContext`] and [`MetaHasher`] traits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vcn_registry_client::{AuthContext, ClientConfig, RegistryClient, Sha256MetaHasher};
//!
//! # async fn run(session: Arc<dyn AuthContext>) -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let client = RegistryClient::new(&config, session, Arc::new(Sha256MetaHasher))?;
//!
//! match client.lookup_content_hash("e3b0c442...").await? {
//!     Some(artifact) => print!("{artifact}"),
//!     None => println!("not found"),
//! }
//! # Ok(()) }
//! ```

mod auth;
mod client;
mod config;
mod endpoint;
mod error;
mod mapping;
mod types;

pub use auth::{AuthContext, MetaHasher, Sha256MetaHasher};
pub use client::RegistryClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Stage};
pub use endpoint::RegistryEndpoint;
pub use error::{BoxError, RegistryError};
pub use mapping::{Level, Status, UnknownName, Visibility};
pub use types::{ArtifactRequest, ArtifactResponse, ErrorBody, PagedArtifactResponse};
