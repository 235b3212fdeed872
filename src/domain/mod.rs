// Domain layer - Dashboard save model and export documents
pub mod dashboard;
pub mod datasource;
pub mod export;
