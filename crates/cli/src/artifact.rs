use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A local file ready to be attested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub name: String,
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the contents.
    pub hash: String,
    pub size: u64,
}

impl LocalArtifact {
    /// Resolve a `sign`/`verify` argument: a file path or `file://<path>`.
    pub fn resolve(reference: &str) -> Result<Self> {
        let path = artifact_path(reference)?;
        let (hash, size) = hash_file(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("not a file: {}", path.display()))?;

        Ok(Self {
            name,
            path,
            hash,
            size,
        })
    }
}

fn artifact_path(reference: &str) -> Result<PathBuf> {
    let path = Path::new(reference);
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    if let Some((scheme, rest)) = reference.split_once(':')
        && scheme.len() > 1
        && scheme.chars().all(|c| c.is_ascii_alphanumeric())
    {
        if scheme != "file" {
            bail!("unsupported artifact type '{scheme}' in {reference}");
        }
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        return Ok(PathBuf::from(rest));
    }

    Ok(path.to_path_buf())
}

fn hash_file(path: &Path) -> Result<(String, u64)> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if !file.metadata()?.is_file() {
        bail!("not a file: {}", path.display());
    }

    let mut hasher = Sha256::new();
    let size = std::io::copy(&mut BufReader::new(file), &mut hasher)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((format!("{:x}", hasher.finalize()), size))
}
