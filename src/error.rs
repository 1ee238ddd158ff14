use std::path::PathBuf;

use thiserror::Error;

/// Library error type for the I/O edges of the viewer (manifests, config).
///
/// Animation and session code never surfaces these; it degrades instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The gallery manifest could not be read.
    #[error("failed to read gallery manifest {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest was read but is not a JSON array of file names.
    #[error("gallery manifest {path} is not a JSON array of file names")]
    ManifestFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML configuration or replay script error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
