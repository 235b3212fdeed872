// Export document domain types
use super::dashboard::Dashboard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INPUT_TYPE_DATASOURCE: &str = "datasource";
pub const INPUT_TYPE_CONSTANT: &str = "constant";
pub const REQUIREMENT_TYPE_DATASOURCE: &str = "datasource";

/// How an export is produced: a clone valid only inside the originating
/// environment, or a portable document with identifiers rewritten to
/// placeholder inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Local,
    External,
}

impl ExportMode {
    pub fn from_external_flag(external: bool) -> Self {
        if external { Self::External } else { Self::Local }
    }
}

/// A named input the importer must supply in place of a concrete
/// identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInput {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(rename = "pluginId")]
    pub plugin_id: String,
    pub value: String,
}

/// A plugin the importing environment must have installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRequirement {
    #[serde(rename = "type")]
    pub requirement_type: String,
    pub id: String,
    pub name: String,
    pub version: String,
}

/// A dashboard rewritten for sharing across environments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableDashboard {
    #[serde(rename = "__inputs", default)]
    pub inputs: Vec<ExportInput>,
    #[serde(rename = "__requires", default)]
    pub requires: Vec<ExternalRequirement>,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// The result of an export request under either mode. Serializes untagged
/// so a local export is shaped exactly like the save model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportDocument {
    Local(Dashboard),
    External(ExportableDashboard),
}

impl ExportDocument {
    pub fn title(&self) -> &str {
        match self {
            Self::Local(dashboard) => &dashboard.title,
            Self::External(exportable) => &exportable.dashboard.title,
        }
    }

    /// Pretty-printed 2-space-indented JSON, the on-disk format.
    pub fn to_pretty_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Download name: `{title-slug}-{epoch-millis}.json`.
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!("{}-{}.json", file_name_slug(self.title()), at.timestamp_millis())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export document is not serializable: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whitespace runs become a single `-`; path separators and NUL are
/// dropped; an empty result falls back to `dashboard`.
pub fn file_name_slug(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect();
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        "dashboard".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_slug() {
        assert_eq!(file_name_slug("Server Overview"), "Server-Overview");
        assert_eq!(file_name_slug("  padded \t title "), "padded-title");
        assert_eq!(file_name_slug("a/b\\c"), "abc");
        assert_eq!(file_name_slug(""), "dashboard");
        assert_eq!(file_name_slug(" / "), "dashboard");
    }

    #[test]
    fn test_file_name_uses_epoch_millis() {
        let dashboard = Dashboard {
            title: "Server Overview".to_string(),
            ..Dashboard::default()
        };
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let document = ExportDocument::Local(dashboard);
        assert_eq!(document.file_name(at), "Server-Overview-1700000000123.json");
    }

    #[test]
    fn test_local_document_serializes_as_save_model() {
        let dashboard = Dashboard {
            title: "Latency".to_string(),
            ..Dashboard::default()
        };
        let value = serde_json::to_value(ExportDocument::Local(dashboard.clone())).unwrap();
        assert_eq!(value, serde_json::to_value(&dashboard).unwrap());
        assert!(value.get("__inputs").is_none());
    }

    #[test]
    fn test_external_document_carries_inputs_and_requires() {
        let exportable = ExportableDashboard {
            inputs: vec![ExportInput {
                name: "DS_PROMETHEUS".to_string(),
                input_type: INPUT_TYPE_DATASOURCE.to_string(),
                plugin_id: "prometheus".to_string(),
                value: "prom-uid".to_string(),
            }],
            requires: vec![ExternalRequirement {
                requirement_type: REQUIREMENT_TYPE_DATASOURCE.to_string(),
                id: "prometheus".to_string(),
                name: "Prometheus".to_string(),
                version: "1.0.0".to_string(),
            }],
            dashboard: Dashboard {
                title: "Latency".to_string(),
                ..Dashboard::default()
            },
        };
        let value = serde_json::to_value(ExportDocument::External(exportable)).unwrap();
        assert_eq!(value["__inputs"][0]["pluginId"], "prometheus");
        assert_eq!(value["__requires"][0]["type"], "datasource");
        assert_eq!(value["title"], "Latency");
    }
}
