// Application layer - Export use cases and registry port
pub mod datasource_registry;
pub mod exporter;
