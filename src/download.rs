//! Archive location and retrieval.
//!
//! Builds the archive URL for a module and opens the archive as a byte
//! stream. The installer only sees the [`ArchiveSource`] trait, so the
//! network can be swapped out in tests.

use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Normalize a manifest version into the archive file name.
///
/// A trailing `.tar.gz` is stripped once and appended once, so versions that
/// already carry the suffix map to the same file.
pub fn archive_file_name(version: &str) -> String {
    let stem = version.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(version);
    format!("{}{}", stem, ARCHIVE_SUFFIX)
}

/// Join the normalized archive name onto the path of `source`.
///
/// Scheme, host, port, query and the existing path prefix are kept.
pub fn archive_url(source: &str, version: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(source).map_err(|e| FetchError::InvalidUrl {
        url: source.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidUrl {
            url: source.to_string(),
            reason: "url has no path to join onto".to_string(),
        });
    }

    let file_name = archive_file_name(version);
    let path = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        file_name.trim_start_matches('/')
    );
    url.set_path(&path);

    Ok(url)
}

/// Something that can open a module archive as a byte stream.
pub trait ArchiveSource {
    fn open(&self, url: &Url) -> Result<Box<dyn Read + '_>, FetchError>;
}

/// Streams archives over HTTP(S).
pub struct HttpSource {
    client: Client,
    show_progress: bool,
}

impl HttpSource {
    pub fn new(timeout: Option<Duration>, show_progress: bool) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("terratar/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            show_progress,
        })
    }

    fn progress_bar(&self, url: &Url, total_size: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = match total_size {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        };

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        pb.set_message(format!("Downloading {}", file_name));
        pb.with_finish(ProgressFinish::AndClear)
    }
}

impl ArchiveSource for HttpSource {
    fn open(&self, url: &Url) -> Result<Box<dyn Read + '_>, FetchError> {
        let response = self.client.get(url.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        tracing::debug!(
            "Response {} with content length {:?}",
            status,
            response.content_length()
        );

        let pb = self.progress_bar(url, response.content_length());
        Ok(Box::new(pb.wrap_read(response)))
    }
}
