use thiserror::Error;

#[derive(Debug, Error)]
pub enum DogearError {
    #[error("Database driver error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Error deserializing document: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Generic flagged error: {0}")]
    Generic(String),
}

pub type DogearResult<T> = std::result::Result<T, DogearError>;
