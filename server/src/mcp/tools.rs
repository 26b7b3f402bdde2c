//! MCP Tool Definitions
//!
//! Defines the fault tree tools exposed over MCP.

use super::protocol::{PropertySchema, Tool, ToolInputSchema};
use std::collections::HashMap;

pub const OUTLINE: &str = "fault_tree_outline";
pub const NODE: &str = "fault_tree_node";
pub const SELECT: &str = "fault_tree_select";
pub const TOGGLE: &str = "fault_tree_toggle";
pub const SEARCH: &str = "fault_tree_search";

/// Get all available fault tree tools
pub fn get_all_tools() -> Vec<Tool> {
    vec![
        outline_tool(),
        node_tool(),
        select_tool(),
        toggle_tool(),
        search_tool(),
    ]
}

// Helper to create property schema
fn string_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "string".to_string(),
        description: description.to_string(),
    }
}

fn boolean_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "boolean".to_string(),
        description: description.to_string(),
    }
}

fn object_schema(properties: Vec<(&str, PropertySchema)>, required: &[&str]) -> ToolInputSchema {
    ToolInputSchema {
        schema_type: "object".to_string(),
        properties: properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect::<HashMap<_, _>>(),
        required: required.iter().map(|s| s.to_string()).collect(),
    }
}

fn node_id_prop() -> PropertySchema {
    string_prop("Node identifier from the outline, e.g. 'root-0-2'")
}

fn outline_tool() -> Tool {
    Tool {
        name: OUTLINE.to_string(),
        description: "Render the fault tree as it is currently filtered and expanded. \
                      Categories are marked '+' (collapsed) or '-' (expanded), external \
                      detail leaves '>' and inline leaves '*'."
            .to_string(),
        input_schema: object_schema(
            vec![(
                "expandAll",
                boolean_prop("Show every node regardless of the current view"),
            )],
            &[],
        ),
    }
}

fn node_tool() -> Tool {
    Tool {
        name: NODE.to_string(),
        description: "Look up one node: title, kind, children and its effective \
                      (possibly inherited) note. Does not load detail files."
            .to_string(),
        input_schema: object_schema(vec![("id", node_id_prop())], &["id"]),
    }
}

fn select_tool() -> Tool {
    Tool {
        name: SELECT.to_string(),
        description: "Select a node and resolve its repair measures, root cause and \
                      images, loading its detail file if it has one. Selecting a \
                      category toggles it open or closed."
            .to_string(),
        input_schema: object_schema(vec![("id", node_id_prop())], &["id"]),
    }
}

fn toggle_tool() -> Tool {
    Tool {
        name: TOGGLE.to_string(),
        description: "Expand or collapse a category without changing the selection.".to_string(),
        input_schema: object_schema(vec![("id", node_id_prop())], &["id"]),
    }
}

fn search_tool() -> Tool {
    Tool {
        name: SEARCH.to_string(),
        description: "Filter the tree by case-insensitive title substring. Matches stay \
                      visible with their ancestors expanded; an empty query resets the view."
            .to_string(),
        input_schema: object_schema(vec![("query", string_prop("Search text"))], &["query"]),
    }
}
