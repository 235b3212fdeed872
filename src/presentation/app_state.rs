// Application state for HTTP handlers
use crate::application::exporter::ExportService;

#[derive(Clone)]
pub struct AppState {
    pub export_service: ExportService,
}
