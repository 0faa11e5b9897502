use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::error::ChemblError;

/// Transport used to retrieve the raw database file.
pub trait RemoteSource {
    fn download(&self, url: &str, destination: &Path) -> Result<(), ChemblError>;
}

#[derive(Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, ChemblError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("chembl-ds/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ChemblError::DownloadFailed(err.to_string()))?,
        );
        // The chemreps dump is several hundred megabytes.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60 * 60))
            .build()
            .map_err(|err| ChemblError::DownloadFailed(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn normalize_url(url: &str) -> String {
        if let Some(rest) = url.strip_prefix("ftp://ftp.ebi.ac.uk/") {
            return format!("https://ftp.ebi.ac.uk/{}", rest);
        }
        url.to_string()
    }

    fn write_response_to_file(
        &self,
        mut response: reqwest::blocking::Response,
        destination: &Path,
    ) -> Result<(), ChemblError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "download request failed".to_string());
            return Err(ChemblError::DownloadStatus { status, message });
        }
        let parent = destination
            .parent()
            .ok_or_else(|| ChemblError::Filesystem("invalid destination path".to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("chembl-ds-download")
            .tempfile_in(parent)
            .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut temp)
            .map_err(|err| ChemblError::DownloadFailed(err.to_string()))?;
        temp.flush()
            .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
        temp.persist(destination)
            .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

impl RemoteSource for HttpSource {
    fn download(&self, url: &str, destination: &Path) -> Result<(), ChemblError> {
        let url = Self::normalize_url(url);
        debug!(%url, "requesting raw dataset");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ChemblError::DownloadFailed(err.to_string()))?;
        self.write_response_to_file(response, destination)
    }
}

/// Makes sure `destination` exists, downloading it from `url` if it does not.
///
/// Returns `true` when a download happened.
pub fn ensure_local<S: RemoteSource + ?Sized>(
    source: &S,
    url: &str,
    destination: &Path,
) -> Result<bool, ChemblError> {
    if destination.exists() {
        debug!(path = %destination.display(), "raw dataset already present");
        return Ok(false);
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| ChemblError::Filesystem(err.to_string()))?;
    }
    info!(%url, path = %destination.display(), "downloading raw dataset");
    source.download(url, destination)?;
    Ok(true)
}
