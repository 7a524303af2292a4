use crate::fetch::FetchError;
use crate::loader::LoadError;
use crate::provider::ResolveError;
use std::error::Error as _;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("server description has no `provider` detail")]
    MissingProvider,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    Network,
    FileSystem,
    InvalidArtifact,
    NoProviderFound,
    AmbiguousProvider,
    IncompatibleVersion,
    InstantiationFailure,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Network => "network",
            Self::FileSystem => "file_system",
            Self::InvalidArtifact => "invalid_artifact",
            Self::NoProviderFound => "no_provider_found",
            Self::AmbiguousProvider => "ambiguous_provider",
            Self::IncompatibleVersion => "incompatible_version",
            Self::InstantiationFailure => "instantiation_failure",
        }
    }

    /// Categories whose user message hides the cause; the full diagnostic goes to the log.
    pub fn needs_support_diagnostic(self) -> bool {
        matches!(self, Self::InvalidArtifact | Self::InstantiationFailure)
    }
}

impl ExecutorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingProvider => ErrorCategory::InvalidRequest,
            Self::Fetch(err) if err.is_network() => ErrorCategory::Network,
            Self::Fetch(_) => ErrorCategory::FileSystem,
            Self::Load(LoadError::ReadArtifact { .. }) => ErrorCategory::FileSystem,
            Self::Load(LoadError::ClassNotFound { .. })
            | Self::Load(LoadError::IncompatibleVersion { .. }) => {
                ErrorCategory::IncompatibleVersion
            }
            Self::Load(LoadError::InstantiationFailure { .. }) => {
                ErrorCategory::InstantiationFailure
            }
            Self::Load(_) => ErrorCategory::InvalidArtifact,
            Self::Resolve(ResolveError::NoProviderFound) => ErrorCategory::NoProviderFound,
            Self::Resolve(ResolveError::AmbiguousProvider { .. }) => {
                ErrorCategory::AmbiguousProvider
            }
        }
    }

    pub fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::InvalidRequest => {
                "Failed to load server provider, error: [Server description names no provider.]"
                    .to_string()
            }
            ErrorCategory::Network => {
                format!("Failed to download server provider, error: [{self}]")
            }
            ErrorCategory::FileSystem => {
                format!("Failed to store server provider, error: [{self}]")
            }
            ErrorCategory::NoProviderFound => {
                "Failed to load server provider, error: [No provider found in artifact.]"
                    .to_string()
            }
            ErrorCategory::AmbiguousProvider => {
                "Failed to load server provider, error: [Multiple providers found in artifact.]"
                    .to_string()
            }
            ErrorCategory::IncompatibleVersion => {
                "Failed to load server provider, error: [This server provider is not compatible with this version of bothost.]"
                    .to_string()
            }
            ErrorCategory::InvalidArtifact | ErrorCategory::InstantiationFailure => {
                "Failed to load server provider, report the diagnostic in logs/runtime.log to support."
                    .to_string()
            }
        }
    }

    /// The error and every `source()` below it, joined for the runtime log.
    pub fn diagnostic(&self) -> String {
        let mut out = format!("{self}");
        let mut source = self.source();
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
