// src/checker/mod.rs
// =============================================================================
// This module answers one question per site: "does this URL return 200?"
//
// Submodules:
// - http: The real checker, one GET request per URL with reqwest
//
// The `Checker` trait is the seam between the dispatcher and the network.
// The dispatcher only ever talks to `dyn Checker`, so tests can swap in a
// checker that never touches the network and counts how many checks run
// at the same time.
// =============================================================================

mod http;

use std::fmt;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::sites::Site;

pub use http::HttpChecker;

/// The only status code that counts as "the profile exists".
pub const STATUS_OK: u16 = 200;

// Anything that can check a resolved URL and report its HTTP status code.
//
// A response with any status is `Ok(status)`. `Err` is reserved for
// requests that could not be built or never got an answer.
pub trait Checker: Send + Sync {
    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16, CheckError>>;
}

#[derive(Error, Debug)]
pub enum CheckError {
    /// The URL could not be turned into a valid GET request
    #[error("cannot build request for '{url}': {reason}")]
    RequestConstruction { url: String, reason: String },

    /// The request was sent but no response came back
    #[error("request to '{url}' failed ({kind}): {source}")]
    Transport {
        url: String,
        kind: TransportKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The checker itself panicked; the site still gets a "NO" line
    #[error("checker panicked while checking '{url}'")]
    Panicked { url: String },
}

/// Rough reason a request got no response, for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    TooManyRedirects,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Timeout => write!(f, "timed out"),
            TransportKind::Connect => write!(f, "connection failed"),
            TransportKind::TooManyRedirects => write!(f, "too many redirects"),
            TransportKind::Other => write!(f, "transport error"),
        }
    }
}

// The result of checking one site.
//
// Created by the dispatcher task right after the check, rendered into one
// output line, then dropped.
#[derive(Debug)]
pub struct CheckOutcome {
    pub site: Site,
    pub result: Result<u16, CheckError>,
}

impl CheckOutcome {
    pub fn new(site: Site, result: Result<u16, CheckError>) -> Self {
        Self { site, result }
    }

    /// True only for a received 200. Errors and every other code are "NO".
    pub fn is_ok(&self) -> bool {
        matches!(self.result, Ok(STATUS_OK))
    }

    pub fn status_code(&self) -> Option<u16> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&CheckError> {
        self.result.as_ref().err()
    }
}
