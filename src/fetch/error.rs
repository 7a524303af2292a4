#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download {url}: {message}")]
    Network { url: String, message: String },
    #[error("failed to download {url}: unexpected status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to download {url}: response body was empty")]
    EmptyBody { url: String },
    #[error("failed to write artifact {path}: {source}")]
    FileSystem {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("download of {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        !matches!(self, Self::FileSystem { .. })
    }
}

pub(crate) fn fs_error(path: &std::path::Path, source: std::io::Error) -> FetchError {
    FetchError::FileSystem {
        path: path.display().to_string(),
        source,
    }
}
