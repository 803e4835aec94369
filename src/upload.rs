use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use reqwest::blocking::{multipart, Client};

use crate::config::Config;
use crate::constants::UPLOAD_ENDPOINT;
use crate::error::UploadError;

/// Endpoint receiving the multipart upload for a given base URL.
pub fn upload_url(storage_url: &str) -> String {
    format!("{storage_url}{UPLOAD_ENDPOINT}")
}

/// Upload the archive to the map-storage endpoint.
///
/// Sends one multipart request with the `apiKey` and `directory` text
/// fields and the archive as the `file` part, authenticated with a
/// bearer header. Single attempt: any transport error or non-success
/// status aborts the run, nothing is retried.
pub fn upload_archive(archive_path: &Path, config: &Config) -> Result<(), UploadError> {
    let url = upload_url(&config.storage_url);
    let file = fs::File::open(archive_path).map_err(|e| UploadError::Archive {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("map.zip")
        .to_string();
    let transport = |source: reqwest::Error| UploadError::Transport {
        url: url.clone(),
        source,
    };
    let part = multipart::Part::reader(file)
        .file_name(file_name)
        .mime_str("application/zip")
        .map_err(transport)?;
    let form = multipart::Form::new()
        .text("apiKey", config.api_key.clone())
        .text("directory", config.directory.clone())
        .part("file", part);

    info!("Uploading {} to {}", archive_path.display(), url);
    let start = Instant::now();
    let client = Client::builder().build().map_err(transport)?;
    let response = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .multipart(form)
        .send()
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(UploadError::Rejected {
            url,
            status: status.as_u16(),
            body,
        });
    }

    debug!("Upload answered HTTP {} in {:?}", status, start.elapsed());
    info!("Upload done successfully");
    Ok(())
}
