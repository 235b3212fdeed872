// Registry port for resolving datasource references
use crate::domain::datasource::DataSourceRef;
use async_trait::async_trait;

/// A configured data backend as known to the originating environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceDescriptor {
    pub uid: String,
    pub name: String,
    pub plugin_id: String,
    pub plugin_version: Option<String>,
}

#[async_trait]
pub trait DataSourceRegistry: Send + Sync {
    /// Resolve a dashboard datasource reference to its configured backend.
    /// `Ok(None)` means the reference points at nothing in this
    /// environment; `Err` is a lookup failure. The exporter recovers from
    /// both with a degraded placeholder.
    async fn resolve(&self, reference: &DataSourceRef)
    -> anyhow::Result<Option<DataSourceDescriptor>>;
}
