use std::path::Path;

pub mod endpoint;
pub mod error;
pub mod http;

pub use endpoint::render_endpoint;
pub use error::FetchError;
pub use http::HttpFetcher;

pub trait ProgressObserver: Send + Sync {
    /// `total_bytes` is `None` when the server sent no content length.
    fn on_progress(&self, bytes_so_far: u64, total_bytes: Option<u64>);
}

/// Downloads a remote artifact to `destination`.
///
/// Implementations must publish `destination` only after the whole body has been
/// written; on failure nothing is left at `destination`.
pub trait ArtifactFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<u64, FetchError>;
}
