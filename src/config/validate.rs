use log::debug;

use crate::constants::PING_ENDPOINT;
use crate::error::ValidationError;

/// Normalize a storage URL candidate to end in exactly one trailing `/`.
///
/// Older versions of the upload script persisted the URL with the
/// `/upload` path baked in; that suffix is stripped so the base URL can
/// serve both the ping and upload endpoints.
pub fn normalize_storage_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();
    loop {
        while url.ends_with('/') {
            url.pop();
        }
        match url.strip_suffix("/upload") {
            Some(stripped) => url = stripped.to_string(),
            None => break,
        }
    }
    format!("{url}/")
}

/// Issues the liveness request against a candidate URL.
///
/// Abstracted behind a trait so the resolver can be exercised without a
/// network; the production implementation is [`HttpProbe`].
pub trait StorageProbe {
    /// Returns the HTTP status code, or a transport-level error message
    /// when no response was obtained at all.
    fn ping(&self, ping_url: &str) -> Result<u16, String>;
}

/// Liveness probe backed by a blocking HTTP client.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(HttpProbe { client })
    }
}

impl StorageProbe for HttpProbe {
    fn ping(&self, ping_url: &str) -> Result<u16, String> {
        match self.client.get(ping_url).send() {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Check that a normalized storage URL answers the liveness request.
///
/// Accepted only on HTTP 200 exactly. Failures are classified so the
/// operator guidance can distinguish a credentials problem from a bad
/// URL, but callers react identically to every class: discard the
/// candidate and re-prompt (or abort when non-interactive).
pub fn check_storage_url(url: &str, probe: &dyn StorageProbe) -> Result<(), ValidationError> {
    let ping_url = format!("{url}{PING_ENDPOINT}");
    debug!("Checking storage URL via {}", ping_url);
    match probe.ping(&ping_url) {
        Ok(200) => Ok(()),
        Ok(status @ (401 | 403)) => Err(ValidationError::Forbidden {
            url: url.to_string(),
            status,
        }),
        Ok(404) => Err(ValidationError::NotFound {
            url: url.to_string(),
        }),
        Ok(status) => Err(ValidationError::UnexpectedStatus {
            url: url.to_string(),
            status,
        }),
        Err(reason) => Err(ValidationError::Unreachable {
            url: url.to_string(),
            reason,
        }),
    }
}
