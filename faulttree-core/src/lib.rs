//! FaultTree Core
//!
//! Model and engines behind the fault-diagnosis tree viewer: builds the tree
//! from `main.json`, lazily loads per-node detail documents, resolves
//! inherited notes and filters the tree by title.
//!
//! ## Features
//!
//! - **Typed tree model** - Category / external leaf / inline leaf nodes keyed by path ids
//! - **Memoized data store** - One fetch per canonical path, failures are retried
//! - **Content resolution** - Inline or external details with note inheritance
//! - **Filtering** - Visible/expanded sets that keep every match reachable
//!
//! ## Example
//!
//! ```ignore
//! use faulttree_core::{NodeId, ViewerConfig, ViewerSession};
//!
//! let session = ViewerSession::open(&ViewerConfig::new("data/")).await?;
//! session.apply_filter("seal");
//! session.select(&NodeId::from("root-0-0")).await;
//! println!("{:?}", session.display().panel);
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod node;
pub mod resolve;
pub mod search;
pub mod session;
pub mod store;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::ViewerConfig;
pub use error::{ContentLoadError, Error, LoadError, Result};
pub use fetch::{DirFetcher, Fetcher, HttpFetcher, Source};
pub use node::{Detail, ImageRef, NodeId, NodeKind, RawNode, TreeNode};
pub use resolve::{effective_note, normalize_breaks, Content, ContentResolver, Resolution};
pub use search::{filter, FilterResult, SearchIndex};
pub use session::{DisplayState, Panel, Phase, SelectOutcome, ViewState, ViewerSession};
pub use store::{canonical_key, DataStore, StoreStats};
pub use tree::FaultTree;
