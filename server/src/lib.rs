//! FaultTree Server Library
//!
//! Command line front end and MCP server for the fault tree viewer. The tree
//! model and the loading, resolving and filtering engines live in
//! `faulttree-core`; this crate renders them as text and serves them over
//! stdio.

pub mod cli;
pub mod error;
pub mod mcp;
pub mod render;

pub use error::{ServerError, ServerResult};
pub use mcp::McpServer;
