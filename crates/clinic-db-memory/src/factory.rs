use std::path::PathBuf;
use std::sync::Arc;

use clinic_storage::{DynGateway, StorageResult};

use crate::InMemoryGateway;

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Contents live only as long as the process.
    #[default]
    Volatile,
    /// Contents are written through to a JSON snapshot file.
    Snapshot(PathBuf),
}

/// Factory configuration to construct a gateway instance.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub backend: StorageBackend,
}

impl GatewayConfig {
    pub fn volatile() -> Self {
        Self {
            backend: StorageBackend::Volatile,
        }
    }

    pub fn snapshot(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Snapshot(path.into()),
        }
    }
}

/// Create a gateway based on the provided configuration.
///
/// A snapshot-backed gateway loads the existing file, if any.
pub async fn create_gateway(config: &GatewayConfig) -> StorageResult<DynGateway> {
    match &config.backend {
        StorageBackend::Volatile => Ok(Arc::new(InMemoryGateway::new())),
        StorageBackend::Snapshot(path) => {
            let gateway = InMemoryGateway::open(path.clone()).await?;
            Ok(Arc::new(gateway))
        }
    }
}
