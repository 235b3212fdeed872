// HTTP datasource registry implementation
use crate::application::datasource_registry::{DataSourceDescriptor, DataSourceRegistry};
use crate::domain::datasource::DataSourceRef;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct HttpDataSourceRegistry {
    host: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DataSourcePayload {
    uid: String,
    name: String,
    #[serde(rename = "type")]
    plugin_id: String,
    #[serde(rename = "typeVersion", default)]
    plugin_version: Option<String>,
}

impl HttpDataSourceRegistry {
    pub fn new(host: String, token: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn lookup_url(&self, reference: &DataSourceRef) -> Option<String> {
        match reference {
            DataSourceRef::Name(name) if !name.is_empty() => Some(format!(
                "{}/api/datasources/name/{}",
                self.host,
                urlencoding::encode(name)
            )),
            DataSourceRef::Name(_) => None,
            DataSourceRef::Uid { uid, .. } => uid.as_deref().filter(|u| !u.is_empty()).map(|uid| {
                format!(
                    "{}/api/datasources/uid/{}",
                    self.host,
                    urlencoding::encode(uid)
                )
            }),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<DataSourcePayload>> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to datasource registry")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Registry lookup failed with status {}: {}", status, body);
        }

        let payload = response
            .json::<DataSourcePayload>()
            .await
            .context("Failed to parse registry response")?;

        Ok(Some(payload))
    }
}

#[async_trait]
impl DataSourceRegistry for HttpDataSourceRegistry {
    async fn resolve(
        &self,
        reference: &DataSourceRef,
    ) -> Result<Option<DataSourceDescriptor>> {
        let Some(url) = self.lookup_url(reference) else {
            return Ok(None);
        };

        Ok(self.fetch(&url).await?.map(|payload| DataSourceDescriptor {
            uid: payload.uid,
            name: payload.name,
            plugin_id: payload.plugin_id,
            plugin_version: payload.plugin_version,
        }))
    }
}
