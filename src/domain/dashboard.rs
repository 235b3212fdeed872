// Dashboard save-model domain types
//
// The save model is an open JSON document: the fields the exporter cares
// about are typed, everything else rides along untouched in `rest` so a
// round trip through serde preserves the full document.
use super::datasource::DataSourceRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub templating: Templating,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A single visualization unit. Row panels carry their children in
/// `panels`, making the document a tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<Panel>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Templating {
    #[serde(default)]
    pub list: Vec<TemplateVariable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub var_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl TemplateVariable {
    pub fn is_constant(&self) -> bool {
        self.var_type == "constant"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub list: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "uid": "srv-overview",
            "title": "Server Overview",
            "schemaVersion": 36,
            "tags": ["prod", "infra"],
            "panels": [
                {
                    "id": 1,
                    "title": "CPU",
                    "type": "timeseries",
                    "datasource": "Prometheus",
                    "gridPos": {"h": 8, "w": 12, "x": 0, "y": 0}
                },
                {
                    "id": 2,
                    "title": "Errors",
                    "type": "row",
                    "panels": [
                        {
                            "id": 3,
                            "type": "stat",
                            "datasource": {"uid": "loki-1", "type": "loki"}
                        }
                    ]
                }
            ],
            "templating": {
                "list": [
                    {"name": "host", "type": "query", "datasource": "Prometheus", "query": "label_values(host)"}
                ]
            },
            "annotations": {"list": []}
        })
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let document = sample_document();
        let dashboard: Dashboard = serde_json::from_value(document.clone()).unwrap();
        let serialized = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(serialized, document);
    }

    #[test]
    fn test_unknown_fields_survive_in_rest() {
        let dashboard: Dashboard = serde_json::from_value(sample_document()).unwrap();
        assert_eq!(dashboard.rest["schemaVersion"], json!(36));
        assert_eq!(dashboard.rest["tags"], json!(["prod", "infra"]));
        assert_eq!(
            dashboard.panels[0].rest["gridPos"],
            json!({"h": 8, "w": 12, "x": 0, "y": 0})
        );
    }

    #[test]
    fn test_nested_row_panels_parse() {
        let dashboard: Dashboard = serde_json::from_value(sample_document()).unwrap();
        assert_eq!(dashboard.panels[1].panels.len(), 1);
        assert_eq!(
            dashboard.panels[1].panels[0].datasource,
            Some(DataSourceRef::by_uid("loki-1", Some("loki".to_string())))
        );
    }
}
