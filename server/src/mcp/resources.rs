//! MCP Resource Definitions
//!
//! Read-only views of the loaded fault tree.

use super::protocol::{Resource, ResourceContent, ResourceReadResult};
use crate::error::{ServerError, ServerResult};
use crate::render::outline_entries;
use faulttree_core::{Fetcher, ViewerSession};

pub const TREE_URI: &str = "faulttree://tree";
pub const VIEW_URI: &str = "faulttree://view";

/// Get all available resources
pub fn get_all_resources() -> Vec<Resource> {
    vec![
        Resource {
            uri: TREE_URI.to_string(),
            name: "Fault tree".to_string(),
            description: "Every node in document order with its id, kind and note".to_string(),
            mime_type: "application/json".to_string(),
        },
        Resource {
            uri: VIEW_URI.to_string(),
            name: "Current view".to_string(),
            description: "Visible outline rows, current selection and content panel".to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}

/// Read a resource by URI
pub fn read_resource<F: Fetcher>(
    uri: &str,
    session: &ViewerSession<F>,
) -> ServerResult<ResourceReadResult> {
    let value = match uri {
        TREE_URI => serde_json::to_value(session.tree().walk())?,
        VIEW_URI => {
            let view = session.view();
            serde_json::json!({
                "query": view.query,
                "noResults": view.no_results,
                "outline": outline_entries(session.tree(), &view),
                "display": session.display(),
            })
        }
        _ => return Err(ServerError::ResourceNotFound(uri.to_string())),
    };

    Ok(ResourceReadResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::to_string_pretty(&value)?,
        }],
    })
}
