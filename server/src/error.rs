//! Error types for the FaultTree server.

use crate::mcp::protocol::JsonRpcError;
use thiserror::Error;

/// Errors that can occur while serving fault tree requests.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing '{0}' parameter")]
    MissingArgument(&'static str),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        match &err {
            ServerError::UnknownTool(_)
            | ServerError::MissingArgument(_)
            | ServerError::NodeNotFound(_)
            | ServerError::ResourceNotFound(_) => JsonRpcError::invalid_params(err.to_string()),
            _ => JsonRpcError::internal_error(err.to_string()),
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_display() {
        let err = ServerError::MissingArgument("id");
        assert_eq!(err.to_string(), "Missing 'id' parameter");
    }

    #[test]
    fn test_node_not_found_is_invalid_params() {
        let err: JsonRpcError = ServerError::NodeNotFound("root-9".to_string()).into();
        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
        assert!(err.message.contains("root-9"));
    }

    #[test]
    fn test_json_error_is_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: JsonRpcError = ServerError::from(json_err).into();
        assert_eq!(err.code, JsonRpcError::INTERNAL_ERROR);
    }
}
