use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "model_random_forest_alzheimer.json";
pub const DEFAULT_SCALER_PATH: &str = "scaler.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Runtime settings. Artifact paths are relative to the working directory
/// unless given absolutely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub bind: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
        }
    }
}

impl AppConfig {
    pub fn with_overrides(
        model: Option<PathBuf>,
        scaler: Option<PathBuf>,
        bind: Option<SocketAddr>,
    ) -> Self {
        let base = Self::default();
        Self {
            model_path: model.unwrap_or(base.model_path),
            scaler_path: scaler.unwrap_or(base.scaler_path),
            bind: bind.unwrap_or(base.bind),
        }
    }
}
