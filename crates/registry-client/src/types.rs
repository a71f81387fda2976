//! Request and response bodies exchanged with the registry.

use crate::mapping::{Level, Status, Visibility};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attestation submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRequest {
    pub name: String,
    pub hash: String,
    pub filename: String,
    pub file_size: i64,
    pub url: String,
    pub license: String,
    pub visibility: String,
    pub status: String,
    pub meta_hash: String,
}

/// The registry's view of a submitted artifact.
///
/// Every field defaults so a partially populated body still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactResponse {
    pub name: String,
    pub hash: String,
    pub filename: String,
    pub file_size: u64,
    pub url: String,
    pub license: String,
    pub level: i64,
    pub visibility: String,
    pub status: String,
    pub publisher: String,
    pub count_verifications: u64,
    pub count_conflicts: u64,
    pub created_at: String,
}

impl ArtifactResponse {
    pub fn status(&self) -> Option<Status> {
        Status::from_name(&self.status)
    }

    pub fn visibility(&self) -> Option<Visibility> {
        Visibility::from_name(&self.visibility)
    }

    pub fn level(&self) -> Level {
        Level::from_value(self.level)
    }

    pub fn is_trusted(&self) -> bool {
        self.status() == Some(Status::Trusted)
    }
}

impl fmt::Display for ArtifactResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File:\t{}\nHash:\t{}\nStatus:\t{}\n\n",
            self.name, self.hash, self.status
        )
    }
}

/// List envelope. Pagination fields beyond `content` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagedArtifactResponse {
    #[serde(default)]
    pub content: Vec<ArtifactResponse>,
}

/// Structured error body returned on non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: i64,
}
