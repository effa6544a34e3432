use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::{
    artifacts::download::download_to_file,
    error::{AppError, AppResult},
    models::{SimilarityMatrix, TitleCatalog},
};

/// Where the artifacts live
#[derive(Debug, Clone)]
pub struct ArtifactSources {
    pub catalog_path: PathBuf,
    pub similarity_path: PathBuf,
    /// Fetched into `similarity_path` when that file does not exist
    pub similarity_url: Option<String>,
    pub download_chunk_size: usize,
    /// Upper bound on the whole download, headers and body
    pub download_timeout: Duration,
}

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The title catalog and its similarity matrix, validated against each other
#[derive(Debug)]
pub struct Artifacts {
    pub catalog: TitleCatalog,
    pub similarity: SimilarityMatrix,
    pub loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Pairs a catalog with a matrix, rejecting mismatched dimensions
    pub fn new(catalog: TitleCatalog, similarity: SimilarityMatrix) -> AppResult<Self> {
        if catalog.is_empty() {
            return Err(AppError::ArtifactUnavailable(
                "Title catalog is empty".to_string(),
            ));
        }
        if similarity.size() != catalog.len() {
            return Err(AppError::ArtifactUnavailable(format!(
                "Similarity matrix is {0}x{0} but the catalog has {1} titles",
                similarity.size(),
                catalog.len()
            )));
        }

        Ok(Self {
            catalog,
            similarity,
            loaded_at: Utc::now(),
        })
    }
}

/// Loads the artifacts once per process
///
/// The first successful `load` is memoized; later calls hand back the same
/// `Arc` without reading disk or network. Failed loads are not cached.
pub struct ArtifactLoader {
    sources: ArtifactSources,
    http_client: HttpClient,
    artifacts: OnceCell<Arc<Artifacts>>,
}

impl ArtifactLoader {
    pub fn new(sources: ArtifactSources) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT.min(sources.download_timeout))
            .timeout(sources.download_timeout)
            .build()?;

        Ok(Self {
            sources,
            http_client,
            artifacts: OnceCell::new(),
        })
    }

    pub async fn load(&self) -> AppResult<Arc<Artifacts>> {
        self.artifacts
            .get_or_try_init(|| async { self.load_from_sources().await.map(Arc::new) })
            .await
            .cloned()
    }

    async fn load_from_sources(&self) -> AppResult<Artifacts> {
        self.ensure_similarity_present().await?;

        let catalog: TitleCatalog = read_json(self.sources.catalog_path.clone()).await?;
        let similarity: SimilarityMatrix =
            read_json(self.sources.similarity_path.clone()).await?;

        if catalog.duplicate_count() > 0 {
            tracing::warn!(
                duplicates = catalog.duplicate_count(),
                "Catalog contains duplicate titles, lookups use the first occurrence"
            );
        }

        let artifacts = Artifacts::new(catalog, similarity)?;

        tracing::info!(
            titles = artifacts.catalog.len(),
            catalog = %self.sources.catalog_path.display(),
            similarity = %self.sources.similarity_path.display(),
            "Loaded recommendation artifacts"
        );

        Ok(artifacts)
    }

    async fn ensure_similarity_present(&self) -> AppResult<()> {
        let path = &self.sources.similarity_path;
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }

        let url = self.sources.similarity_url.as_deref().ok_or_else(|| {
            AppError::ArtifactUnavailable(format!(
                "{} not found and no remote location configured",
                path.display()
            ))
        })?;

        tracing::info!(url = %url, path = %path.display(), "Fetching similarity artifact");

        let bytes = download_to_file(
            &self.http_client,
            url,
            path,
            self.sources.download_chunk_size,
        )
        .await?;

        tracing::info!(bytes, path = %path.display(), "Similarity artifact downloaded");
        Ok(())
    }
}

/// Reads and deserializes a JSON artifact off the async runtime
async fn read_json<T>(path: PathBuf) -> AppResult<T>
where
    T: DeserializeOwned + Send + 'static,
{
    tokio::task::spawn_blocking(move || parse_file(&path))
        .await
        .map_err(|e| AppError::Internal(format!("Artifact reader task failed: {}", e)))?
}

/// Parses a JSON artifact, gunzipping it first when the path ends in `.gz`
fn parse_file<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let file = std::fs::File::open(path).map_err(|e| {
        AppError::ArtifactUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(file)
    };

    serde_json::from_reader(BufReader::new(reader)).map_err(|e| {
        AppError::ArtifactUnavailable(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;
    use axum::{http::StatusCode, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CATALOG_JSON: &str = r#"[
        {"movie_id": 1, "title": "A"},
        {"movie_id": 2, "title": "B"},
        {"movie_id": 3, "title": "C"}
    ]"#;

    const SIMILARITY_JSON: &str = "[[1.0, 0.5, 0.2], [0.5, 1.0, 0.3], [0.2, 0.3, 1.0]]";

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path =
                std::env::temp_dir().join(format!("movie-recommender-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn join(&self, name: &str) -> PathBuf {
            self.0.join(name)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn sources(dir: &TempDir, similarity_url: Option<String>) -> ArtifactSources {
        ArtifactSources {
            catalog_path: dir.join("movie_list.json"),
            similarity_path: dir.join("nested/similarity.json"),
            similarity_url,
            download_chunk_size: 16,
            download_timeout: Duration::from_secs(5),
        }
    }

    fn write_catalog(dir: &TempDir) {
        std::fs::write(dir.join("movie_list.json"), CATALOG_JSON).unwrap();
    }

    fn write_similarity(dir: &TempDir, body: &str) {
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/similarity.json"), body).unwrap();
    }

    /// Serves `body` at `/similarity.json` with `status`, counting hits
    async fn serve_artifact(body: &'static str, status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/similarity.json",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/similarity.json", addr), hits)
    }

    #[tokio::test]
    async fn test_load_local_artifacts() {
        let dir = TempDir::new();
        write_catalog(&dir);
        write_similarity(&dir, SIMILARITY_JSON);

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let artifacts = loader.load().await.unwrap();

        assert_eq!(artifacts.catalog.len(), 3);
        assert_eq!(artifacts.catalog.get(2), Some(&CatalogEntry::new(3, "C")));
        assert_eq!(artifacts.similarity.row(1), Some(&[0.5, 1.0, 0.3][..]));
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let dir = TempDir::new();
        write_catalog(&dir);
        write_similarity(&dir, SIMILARITY_JSON);

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let first = loader.load().await.unwrap();

        std::fs::remove_file(dir.join("movie_list.json")).unwrap();
        std::fs::remove_file(dir.join("nested/similarity.json")).unwrap();

        let second = loader.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_missing_similarity_without_url() {
        let dir = TempDir::new();
        write_catalog(&dir);

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let result = loader.load().await;
        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_catalog() {
        let dir = TempDir::new();
        write_similarity(&dir, SIMILARITY_JSON);

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let result = loader.load().await;
        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
    }

    #[tokio::test]
    async fn test_truncated_similarity() {
        let dir = TempDir::new();
        write_catalog(&dir);
        write_similarity(&dir, "[[1.0, 0.5, 0.2], [0.5, 1.0");

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let result = loader.load().await;
        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let dir = TempDir::new();
        write_catalog(&dir);
        write_similarity(&dir, "[[1.0, 0.5], [0.5, 1.0]]");

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, AppError::ArtifactUnavailable(_)));
        assert!(err.to_string().contains("3 titles"));
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let dir = TempDir::new();
        write_catalog(&dir);

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        assert!(loader.load().await.is_err());

        write_similarity(&dir, SIMILARITY_JSON);
        let artifacts = loader.load().await.unwrap();
        assert_eq!(artifacts.similarity.size(), 3);
    }

    #[tokio::test]
    async fn test_remote_fetch_when_missing() {
        let dir = TempDir::new();
        write_catalog(&dir);
        let (url, hits) = serve_artifact(SIMILARITY_JSON, StatusCode::OK).await;

        let loader = ArtifactLoader::new(sources(&dir, Some(url))).unwrap();
        let first = loader.load().await.unwrap();

        let on_disk = std::fs::read_to_string(dir.join("nested/similarity.json")).unwrap();
        assert_eq!(on_disk, SIMILARITY_JSON);
        assert!(!dir.join("nested/similarity.json.part").exists());
        assert_eq!(first.similarity.size(), 3);

        let second = loader.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_local_file_skips_remote_fetch() {
        let dir = TempDir::new();
        write_catalog(&dir);
        write_similarity(&dir, SIMILARITY_JSON);
        let (url, hits) = serve_artifact(SIMILARITY_JSON, StatusCode::OK).await;

        let loader = ArtifactLoader::new(sources(&dir, Some(url))).unwrap();
        loader.load().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_fetch_error_status() {
        let dir = TempDir::new();
        write_catalog(&dir);
        let (url, _hits) = serve_artifact("gone", StatusCode::NOT_FOUND).await;

        let loader = ArtifactLoader::new(sources(&dir, Some(url))).unwrap();
        let result = loader.load().await;

        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
        assert!(!dir.join("nested/similarity.json").exists());
        assert!(!dir.join("nested/similarity.json.part").exists());
    }

    #[tokio::test]
    async fn test_remote_fetch_unreachable() {
        let dir = TempDir::new();
        write_catalog(&dir);

        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let loader = ArtifactLoader::new(sources(
            &dir,
            Some(format!("http://{}/similarity.json", addr)),
        ))
        .unwrap();
        let result = loader.load().await;
        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
    }

    #[tokio::test]
    async fn test_stalled_remote_times_out() {
        let dir = TempDir::new();
        write_catalog(&dir);

        let app = Router::new().route(
            "/similarity.json",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                SIMILARITY_JSON
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut sources = sources(&dir, Some(format!("http://{}/similarity.json", addr)));
        sources.download_timeout = Duration::from_millis(200);
        let loader = ArtifactLoader::new(sources).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(10), loader.load())
            .await
            .expect("download should give up on its own");

        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
        assert!(!dir.join("nested/similarity.json").exists());
        assert!(!dir.join("nested/similarity.json.part").exists());
    }

    #[tokio::test]
    async fn test_empty_catalog_rejected() {
        let dir = TempDir::new();
        std::fs::write(dir.join("movie_list.json"), "[]").unwrap();
        write_similarity(&dir, "[]");

        let loader = ArtifactLoader::new(sources(&dir, None)).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    fn gzip(body: &[u8]) -> Vec<u8> {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap()
    }

    fn gzip_sources(dir: &TempDir) -> ArtifactSources {
        let mut sources = sources(dir, None);
        sources.similarity_path = dir.join("similarity.json.gz");
        sources
    }

    #[tokio::test]
    async fn test_load_gzipped_similarity() {
        let dir = TempDir::new();
        write_catalog(&dir);
        std::fs::write(
            dir.join("similarity.json.gz"),
            gzip(SIMILARITY_JSON.as_bytes()),
        )
        .unwrap();

        let loader = ArtifactLoader::new(gzip_sources(&dir)).unwrap();
        let artifacts = loader.load().await.unwrap();
        assert_eq!(artifacts.similarity.row(2), Some(&[0.2, 0.3, 1.0][..]));
    }

    #[tokio::test]
    async fn test_truncated_gzip_rejected() {
        let dir = TempDir::new();
        write_catalog(&dir);
        let compressed = gzip(SIMILARITY_JSON.as_bytes());
        std::fs::write(
            dir.join("similarity.json.gz"),
            &compressed[..compressed.len() / 2],
        )
        .unwrap();

        let loader = ArtifactLoader::new(gzip_sources(&dir)).unwrap();
        let result = loader.load().await;
        assert!(matches!(result, Err(AppError::ArtifactUnavailable(_))));
    }

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(Path::new("similarity.json.gz")));
        assert!(is_gzip(Path::new("data/similarity.GZ")));
        assert!(!is_gzip(Path::new("similarity.json")));
    }
}
