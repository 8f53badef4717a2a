use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown format: {name} (valid options: {valid})")]
    UnknownFormat { name: String, valid: String },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
