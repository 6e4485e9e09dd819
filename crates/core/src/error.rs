use thiserror::Error;

#[derive(Error, Debug)]
pub enum AegirError {
    #[error("Configuration error: {0}")]
    Config(String),
}
