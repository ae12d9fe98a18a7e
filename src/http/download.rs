use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::error::{AppError, AppResult, HttpError};

/// Streams `url` into a new file at `dest`, returning the bytes written.
///
/// # Errors
///
/// Returns an error when the request fails, the response is not 2xx, or the
/// file cannot be written.
pub async fn download_to_file(client: &Client, url: &str, dest: &Path) -> AppResult<u64> {
    let download_failed = |err: reqwest::Error| {
        AppError::http(HttpError::DownloadFailed {
            url: url.to_owned(),
            source: err,
        })
    };
    let write_failed = |err: std::io::Error| {
        AppError::http(HttpError::DownloadWrite {
            path: dest.to_path_buf(),
            source: err,
        })
    };

    let response = client.get(url).send().await.map_err(download_failed)?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::http(HttpError::DownloadStatus {
            url: url.to_owned(),
            status: status.as_u16(),
        }));
    }

    let file = tokio::fs::File::create(dest).await.map_err(write_failed)?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(download_failed)?;
        writer.write_all(&bytes).await.map_err(write_failed)?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    writer.flush().await.map_err(write_failed)?;
    info!("Downloaded {} bytes from {} to {}", total_bytes, url, dest.display());
    Ok(total_bytes)
}
