use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::artifacts::ArtifactSources;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Local path of the title catalog artifact
    #[serde(default = "default_movie_list_path")]
    pub movie_list_path: PathBuf,

    /// Local path of the similarity matrix artifact
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// Remote location of the similarity artifact, fetched when the local file is missing
    #[serde(default)]
    pub similarity_url: Option<String>,

    /// Write buffer size used while streaming the similarity download
    #[serde(default = "default_download_chunk_size")]
    pub download_chunk_size: usize,

    /// Give up on the similarity download after this long
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with TMDB poster paths
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Per-request timeout for TMDB calls
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Pause between successive poster lookups in one batch
    #[serde(default = "default_poster_delay_ms")]
    pub poster_delay_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_movie_list_path() -> PathBuf {
    PathBuf::from("movie_list.json")
}

fn default_similarity_path() -> PathBuf {
    PathBuf::from("similarity.json")
}

fn default_download_chunk_size() -> usize {
    8192
}

fn default_download_timeout_secs() -> u64 {
    300
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_poster_timeout_secs() -> u64 {
    10
}

fn default_poster_delay_ms() -> u64 {
    200
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn artifact_sources(&self) -> ArtifactSources {
        ArtifactSources {
            catalog_path: self.movie_list_path.clone(),
            similarity_path: self.similarity_path.clone(),
            similarity_url: self.similarity_url.clone(),
            download_chunk_size: self.download_chunk_size,
            download_timeout: Duration::from_secs(self.download_timeout_secs),
        }
    }

    pub fn poster_timeout(&self) -> Duration {
        Duration::from_secs(self.poster_timeout_secs)
    }

    pub fn poster_delay(&self) -> Duration {
        Duration::from_millis(self.poster_delay_ms)
    }
}
