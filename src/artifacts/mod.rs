pub mod download;
pub mod loader;

pub use download::download_to_file;
pub use loader::{ArtifactLoader, ArtifactSources, Artifacts};
