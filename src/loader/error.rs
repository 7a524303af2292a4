#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no artifact files given to the loader")]
    NoArtifacts,
    #[error("failed to read artifact {path}: {source}")]
    ReadArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {path} is not a provider bundle: {source}")]
    ParseArtifact {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {path} uses bundle format {found}, expected {expected}")]
    UnsupportedFormat {
        path: String,
        found: u32,
        expected: u32,
    },
    #[error("class `{name}` could not be resolved: {reason}")]
    ClassNotFound { name: String, reason: String },
    #[error("class `{name}` requires host api {required}, host provides {host}")]
    IncompatibleVersion {
        name: String,
        required: u32,
        host: u32,
    },
    #[error("failed to instantiate `{name}`: {detail}")]
    InstantiationFailure { name: String, detail: String },
}
