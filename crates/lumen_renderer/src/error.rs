//! Errors that can stop a render.

use std::path::PathBuf;

use lumen_core::{ImageIoError, SceneError, TextureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Image(#[from] ImageIoError),

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("monitor address {address} could not be resolved")]
    MonitorAddress { address: String },

    #[error("failed to set up monitor socket for {address}: {source}")]
    MonitorSocket {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid render config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
