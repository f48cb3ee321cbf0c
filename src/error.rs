// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the Captivate API
#[derive(Error, Debug)]
pub enum CaptivateError {
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to read upload file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Coarse classification of a [`CaptivateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (DNS, connect, timeout, ...)
    Transport,
    /// The API answered with a non-2xx status
    HttpStatus,
    /// The local upload source could not be opened
    Filesystem,
    /// The API answered 2xx but the body did not have the expected shape
    Decode,
    /// The client was configured with an unusable value
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::Filesystem => "filesystem",
            Self::Decode => "decode",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

impl CaptivateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::FileReadFailed { .. } => ErrorKind::Filesystem,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidBaseUrl(_) => ErrorKind::Configuration,
        }
    }

    /// The remote status code, if the API answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Captivate API operations
pub type Result<T> = std::result::Result<T, CaptivateError>;
