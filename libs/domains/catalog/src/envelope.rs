use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"message": "..."}` body returned by deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
