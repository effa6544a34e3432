use std::path::{Path, PathBuf};

use reqwest::Client as HttpClient;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AppError, AppResult};

/// Downloads `url` to `dest`
///
/// The body is streamed through a write buffer of `chunk_size` bytes into a
/// sibling `.part` file which is renamed onto `dest` once complete, so `dest`
/// only ever holds a full download. Returns the number of bytes written.
pub async fn download_to_file(
    http_client: &HttpClient,
    url: &str,
    dest: &Path,
    chunk_size: usize,
) -> AppResult<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::ArtifactUnavailable(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let part_path = part_path(dest);

    match stream_body(http_client, url, &part_path, chunk_size).await {
        Ok(bytes) => {
            fs::rename(&part_path, dest).await.map_err(|e| {
                AppError::ArtifactUnavailable(format!(
                    "Failed to move download into {}: {}",
                    dest.display(),
                    e
                ))
            })?;
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_file(&part_path).await;
            Err(e)
        }
    }
}

async fn stream_body(
    http_client: &HttpClient,
    url: &str,
    part_path: &Path,
    chunk_size: usize,
) -> AppResult<u64> {
    let mut response = http_client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::ArtifactUnavailable(format!("Download of {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(AppError::ArtifactUnavailable(format!(
            "Download of {} returned status {}",
            url,
            response.status()
        )));
    }

    let file = fs::File::create(part_path).await.map_err(|e| {
        AppError::ArtifactUnavailable(format!(
            "Failed to create {}: {}",
            part_path.display(),
            e
        ))
    })?;
    let mut writer = BufWriter::with_capacity(chunk_size.max(1), file);
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| AppError::ArtifactUnavailable(format!("Download of {} failed: {}", url, e)))?
    {
        writer.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(write_error)?;
    writer.into_inner().sync_all().await.map_err(write_error)?;

    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn write_error(e: std::io::Error) -> AppError {
    AppError::ArtifactUnavailable(format!("Failed to write download: {}", e))
}
