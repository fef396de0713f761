//! Artifact retrieval.

use crate::error::FetchError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Retrieves a named artifact into a destination file.
///
/// Implementations must either leave a complete, non-empty file at `dest`
/// or return an error; callers re-verify on disk after the call.
pub trait ArtifactFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Blocking HTTP fetcher used in production.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent("relayctl")
            .build()
            .map_err(|e| FetchError::Transfer(e.to_string()))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Transfer(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Transfer(e.to_string()))?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyPayload(dest.to_path_buf()));
        }

        let mut file =
            fs::File::create(dest).map_err(|e| FetchError::Transfer(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| FetchError::Transfer(e.to_string()))?;
        file.sync_all()
            .map_err(|e| FetchError::Transfer(e.to_string()))?;

        tracing::debug!(url, bytes = bytes.len(), "artifact fetched");
        Ok(())
    }
}
