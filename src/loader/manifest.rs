use super::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const BUNDLE_FORMAT: u32 = 1;
pub const PROVIDER_CAPABILITY: &str = "server_provider";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactManifest {
    pub format: u32,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub requires_api: Option<u32>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl ClassDecl {
    pub fn implements_provider(&self) -> bool {
        self.implements.iter().any(|cap| cap == PROVIDER_CAPABILITY)
    }
}

pub fn read_manifest(path: &Path) -> Result<ArtifactManifest, LoadError> {
    let raw = fs::read(path).map_err(|source| LoadError::ReadArtifact {
        path: path.display().to_string(),
        source,
    })?;
    let manifest: ArtifactManifest =
        serde_json::from_slice(&raw).map_err(|source| LoadError::ParseArtifact {
            path: path.display().to_string(),
            source,
        })?;
    if manifest.format != BUNDLE_FORMAT {
        return Err(LoadError::UnsupportedFormat {
            path: path.display().to_string(),
            found: manifest.format,
            expected: BUNDLE_FORMAT,
        });
    }
    Ok(manifest)
}
