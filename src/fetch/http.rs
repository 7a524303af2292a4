use super::error::fs_error;
use super::{ArtifactFetcher, FetchError, ProgressObserver};
use crate::config::Settings;
use crate::shared::fs_atomic::{publish_file, temp_sibling_path};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CHUNK_SIZE: usize = 16 * 1024;

pub struct HttpFetcher {
    agent: ureq::Agent,
    cancel: Arc<AtomicBool>,
}

impl HttpFetcher {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .user_agent(concat!("bothost/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.connect_timeout(), settings.read_timeout())
    }

    /// Shares `flag` as the cancellation signal; setting it abandons any transfer in flight.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn request(&self, url: &str) -> Result<ureq::Response, FetchError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(err) => {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: err.to_string(),
                })
            }
        };
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    fn stream_to(
        &self,
        url: &str,
        mut reader: impl Read,
        tmp_path: &Path,
        total: Option<u64>,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<u64, FetchError> {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(tmp_path)
            .map_err(|e| fs_error(tmp_path, e))?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            if self.cancelled() {
                return Err(FetchError::Cancelled {
                    url: url.to_string(),
                });
            }
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(FetchError::Network {
                        url: url.to_string(),
                        message: format!("transfer interrupted after {written} bytes: {err}"),
                    })
                }
            };
            file.write_all(&buf[..read])
                .map_err(|e| fs_error(tmp_path, e))?;
            written += read as u64;
            if let Some(observer) = progress {
                observer.on_progress(written, total);
            }
        }

        if written == 0 {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        if let Some(expected) = total {
            if written != expected {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: format!("transfer truncated at {written} of {expected} bytes"),
                });
            }
        }
        file.sync_all().map_err(|e| fs_error(tmp_path, e))?;
        Ok(written)
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<u64, FetchError> {
        if self.cancelled() {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error(parent, e))?;
        }

        let response = self.request(url)?;
        let total = response
            .header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok());
        let tmp_path = temp_sibling_path(destination).map_err(|e| fs_error(destination, e))?;

        match self.stream_to(url, response.into_reader(), &tmp_path, total, progress) {
            Ok(written) => {
                publish_file(&tmp_path, destination).map_err(|e| fs_error(destination, e))?;
                Ok(written)
            }
            Err(err) => {
                let _ = fs::remove_file(&tmp_path);
                Err(err)
            }
        }
    }
}
