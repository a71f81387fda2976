use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use vcn_registry_client::AuthContext;

pub const TOKEN_FILE_NAME: &str = "t";
pub const KEYSTORE_DIR_NAME: &str = "keystore";

/// The local vcn directory (`~/.vcn` unless `VCN_HOME` is set).
#[derive(Debug, Clone)]
pub struct VcnHome {
    root: PathBuf,
}

impl VcnHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Result<Self> {
        if let Ok(root) = std::env::var("VCN_HOME")
            && !root.trim().is_empty()
        {
            return Ok(Self::new(root.trim()));
        }
        let home = dirs::home_dir().context("cannot determine the home directory; set VCN_HOME")?;
        Ok(Self::new(home.join(".vcn")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn token_path(&self) -> PathBuf {
        self.root.join(TOKEN_FILE_NAME)
    }

    pub fn keystore_dir(&self) -> PathBuf {
        self.root.join(KEYSTORE_DIR_NAME)
    }

    pub fn create_dirs(&self) -> Result<()> {
        let keystore = self.keystore_dir();
        fs::create_dir_all(&keystore)
            .with_context(|| format!("failed to create directory: {}", keystore.display()))
    }
}

/// Session backed by the token file and keystore under [`VcnHome`].
#[derive(Clone)]
pub struct LocalSession {
    home: VcnHome,
    /// Token from `VCN_TOKEN`, which takes precedence over the token file.
    env_token: Option<String>,
}

impl std::fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSession")
            .field("home", &self.home)
            .field("env_token", &self.env_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl LocalSession {
    pub fn new(home: VcnHome, env_token: Option<String>) -> Self {
        let env_token = env_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self { home, env_token }
    }

    pub fn from_env(home: VcnHome) -> Self {
        Self::new(home, std::env::var("VCN_TOKEN").ok())
    }

    pub fn store_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            bail!("token must not be empty");
        }

        let path = self.home.token_path();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, format!("{token}\n"))
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to move {} into place", path.display()))?;
        tracing::debug!(path = %path.display(), "stored session token");
        Ok(())
    }
}

impl AuthContext for LocalSession {
    fn load_token(&self) -> Result<String> {
        if let Some(token) = &self.env_token {
            return Ok(token.clone());
        }

        let path = self.home.token_path();
        if !path.exists() {
            bail!("no valid session");
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read token file: {}", path.display()))?;
        let token = contents.trim();
        if token.is_empty() {
            bail!("no valid session");
        }
        Ok(token.to_string())
    }

    fn public_key_for_local_wallet(&self) -> Result<String> {
        let dir = self.home.keystore_dir();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("failed to read keystore: {}", dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        for file in &files {
            let Ok(contents) = fs::read_to_string(file) else {
                continue;
            };
            let Ok(key) = serde_json::from_str::<serde_json::Value>(&contents) else {
                tracing::debug!(file = %file.display(), "skipping non-JSON keystore entry");
                continue;
            };
            if let Some(address) = key.get("address").and_then(|v| v.as_str())
                && !address.trim().is_empty()
            {
                return Ok(normalize_address(address));
            }
        }

        bail!("no wallet found in keystore {}", dir.display())
    }
}

fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.starts_with("0x") || address.starts_with("0X") {
        address.to_string()
    } else {
        format!("0x{address}")
    }
}
