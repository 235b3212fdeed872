// HTTP request handlers
use crate::domain::dashboard::Dashboard;
use crate::domain::export::{ExportDocument, ExportMode};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{Response, StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ExportQuery {
    pub external: Option<bool>,
}

impl ExportQuery {
    fn mode(&self) -> ExportMode {
        ExportMode::from_external_flag(self.external.unwrap_or(false))
    }
}

/// Read-only viewer payload for an export document.
#[derive(Debug, Serialize)]
pub struct JsonView {
    pub object: ExportDocument,
    #[serde(rename = "enableCopy")]
    pub enable_copy: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Export a dashboard as a downloadable JSON file
pub async fn export_file(
    Query(query): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
    Json(dashboard): Json<Dashboard>,
) -> Response<Body> {
    match state.export_service.export(&dashboard, query.mode()).await {
        Ok(document) => match file_download_response(&document, Utc::now()) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            eprintln!("Error exporting dashboard: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Export a dashboard for the read-only JSON viewer
pub async fn view_json(
    Query(query): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
    Json(dashboard): Json<Dashboard>,
) -> Response<Body> {
    match state.export_service.export(&dashboard, query.mode()).await {
        Ok(document) => Json(JsonView {
            object: document,
            enable_copy: true,
        })
        .into_response(),
        Err(e) => {
            eprintln!("Error exporting dashboard: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build an attachment response carrying the pretty-printed document
fn file_download_response(
    document: &ExportDocument,
    at: DateTime<Utc>,
) -> Result<Response<Body>, StatusCode> {
    let body = document.to_pretty_json().map_err(|e| {
        eprintln!("Export serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.file_name(at)),
        )
        .body(Body::from(body))
        .map_err(|e| {
            eprintln!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::datasource_registry::{DataSourceDescriptor, DataSourceRegistry};
    use crate::application::exporter::ExportService;
    use crate::domain::datasource::DataSourceRef;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct SingleBackendRegistry;

    #[async_trait]
    impl DataSourceRegistry for SingleBackendRegistry {
        async fn resolve(
            &self,
            _reference: &DataSourceRef,
        ) -> anyhow::Result<Option<DataSourceDescriptor>> {
            Ok(Some(DataSourceDescriptor {
                uid: "prom-1".to_string(),
                name: "Prometheus".to_string(),
                plugin_id: "prometheus".to_string(),
                plugin_version: Some("1.0.0".to_string()),
            }))
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            export_service: ExportService::new(Arc::new(SingleBackendRegistry)),
        })
    }

    fn sample_dashboard() -> Dashboard {
        serde_json::from_value(json!({
            "title": "Server Overview",
            "panels": [
                {"id": 1, "type": "timeseries", "datasource": "Prometheus"}
            ],
            "templating": {"list": []},
            "annotations": {"list": []}
        }))
        .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_export_file_local_is_attachment_of_save_model() {
        let response = export_file(
            Query(ExportQuery { external: None }),
            State(state()),
            Json(sample_dashboard()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Server-Overview-"));
        assert!(disposition.ends_with(".json\""));

        let body = body_json(response).await;
        assert_eq!(body, serde_json::to_value(sample_dashboard()).unwrap());
        assert!(body.get("__inputs").is_none());
    }

    #[tokio::test]
    async fn test_export_file_external_rewrites_references() {
        let response = export_file(
            Query(ExportQuery {
                external: Some(true),
            }),
            State(state()),
            Json(sample_dashboard()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["__inputs"][0]["name"], "DS_PROMETHEUS");
        assert_eq!(body["panels"][0]["datasource"], "${DS_PROMETHEUS}");
    }

    #[tokio::test]
    async fn test_view_json_returns_copyable_view_model() {
        let response = view_json(
            Query(ExportQuery { external: None }),
            State(state()),
            Json(sample_dashboard()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["enableCopy"], json!(true));
        assert_eq!(body["object"]["title"], "Server Overview");
    }

    #[test]
    fn test_file_download_response_sets_exact_filename() {
        use chrono::TimeZone;

        let document = ExportDocument::Local(sample_dashboard());
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let response = file_download_response(&document, at).unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap(),
            "attachment; filename=\"Server-Overview-1700000000123.json\""
        );
    }
}
