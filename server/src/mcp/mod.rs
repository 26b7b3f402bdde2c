//! MCP (Model Context Protocol) Server Module
//!
//! Exposes a fault tree session to AI clients: outline, node lookup,
//! selection, expand/collapse and search as tools, plus the tree and the
//! current view as resources.
//!
//! ## Usage
//!
//! ```bash
//! faulttree --data ./data serve
//! ```
//!
//! The MCP server communicates via stdio using JSON-RPC 2.0.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::McpServer;
pub use transport::{Incoming, LineTransport};
