use thiserror::Error;

use crate::domain::station::station::SlotKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse line configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid line configuration: {0}")]
    InvalidConfig(String),

    #[error("Protocol violation on {slot:?} slot: expected occupied = {expected}")]
    ProtocolViolation { slot: SlotKind, expected: bool },

    #[error("Failed to spawn thread '{0}'")]
    ThreadSpawn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
