// report-pdf: Error types

use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid chart geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("Render backend failed: {0}")]
    RenderBackend(String),
    #[error("Failed to read dataset: {0}")]
    Dataset(String),
    #[error("Invalid theme: {0}")]
    Theme(String),
    #[error("Invalid date format: {0}")]
    Date(String),
    #[error("Failed to load logo: {0}")]
    Logo(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
