//! Parsed contract artifact.

use alloy::json_abi::{Function, JsonAbi};
use thiserror::Error;

/// Why an artifact document was rejected.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("document is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("document has no `abi` field")]
    MissingAbi,

    #[error("`abi` field is not an array")]
    AbiNotArray,

    #[error("`abi` array is empty")]
    EmptyAbi,
}

/// A validated contract interface together with the location it was loaded
/// from. Once constructed it never changes; a fresh load attempt produces a
/// new descriptor rather than mutating this one.
#[derive(Debug, Clone)]
pub struct AbiDescriptor {
    abi: JsonAbi,
    source: String,
    contract_name: Option<String>,
    entries: usize,
}

impl AbiDescriptor {
    /// Parses a build artifact document, the JSON a compiler emits with the
    /// interface under an `abi` key. Rejects documents with a missing,
    /// malformed, or empty `abi` array.
    pub fn from_artifact_json(source: &str, body: &str) -> Result<Self, ArtifactError> {
        let document: serde_json::Value = serde_json::from_str(body)?;
        let raw = document.get("abi").ok_or(ArtifactError::MissingAbi)?;
        let entries = raw.as_array().ok_or(ArtifactError::AbiNotArray)?.len();
        if entries == 0 {
            return Err(ArtifactError::EmptyAbi);
        }
        let abi: JsonAbi = serde_json::from_value(raw.clone())?;
        let contract_name = document
            .get("contractName")
            .and_then(|name| name.as_str())
            .map(str::to_owned);

        Ok(Self {
            abi,
            source: source.to_owned(),
            contract_name,
            entries,
        })
    }

    /// The candidate location this descriptor was accepted from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    /// Number of interface entries in the artifact, counting functions,
    /// events, and the constructor alike.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn json_abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Looks up a function by name, disambiguating overloads by input count.
    pub fn function(&self, name: &str, input_count: usize) -> Option<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == input_count))
    }
}
