//! Selection session
//!
//! Holds what the presentation layer shows: the selected node, its note,
//! the content panel and the expand/visibility state of the tree. Each
//! selection takes a new generation; a resolution that finishes after a newer
//! selection started is discarded instead of overwriting the display.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, Source};
use crate::node::{NodeId, RawNode};
use crate::resolve::{Content, ContentResolver};
use crate::search::{FilterResult, SearchIndex};
use crate::store::DataStore;
use crate::tree::FaultTree;

/// Per-selection state machine: `Idle -> Resolving -> {Resolved | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Resolving,
    Resolved,
    Failed,
}

/// What the content area shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel {
    /// "Select an item" placeholder
    #[default]
    Placeholder,
    Detail { content: Content },
    Failed { node_id: NodeId, message: String },
}

/// Everything the note box and content area display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub selected: Option<NodeId>,
    pub generation: u64,
    pub phase: Phase,
    /// Effective note; `None` hides the note box
    pub note: Option<String>,
    pub panel: Panel,
}

/// Which nodes are shown and which categories are open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub query: String,
    pub visible: HashSet<NodeId>,
    pub expanded: HashSet<NodeId>,
    pub no_results: bool,
}

impl ViewState {
    fn from_filter(result: FilterResult) -> Self {
        Self {
            no_results: result.no_results(),
            query: result.query,
            visible: result.visible,
            expanded: result.expanded,
        }
    }
}

/// Result of one `select` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOutcome {
    Resolved,
    Failed,
    /// A newer selection started before this one finished
    Superseded,
    /// Unknown node id
    Ignored,
}

/// One independent viewer over a tree and its data store
pub struct ViewerSession<F> {
    resolver: ContentResolver<F>,
    index: SearchIndex,
    generation: AtomicU64,
    display: Mutex<DisplayState>,
    view: Mutex<ViewState>,
}

impl ViewerSession<Source> {
    /// Fetch the main document described by `config` and build a session
    pub async fn open(config: &ViewerConfig) -> Result<Self> {
        let source = Source::from_location(&config.data, config.timeout)?;
        Self::load(source, &config.main_file).await
    }
}

impl<F: Fetcher> ViewerSession<F> {
    /// Load `main_file` through `fetcher` and build the tree
    pub async fn load(fetcher: F, main_file: &str) -> Result<Self> {
        let store = Arc::new(DataStore::new(fetcher));
        let value = store.load(main_file).await?;
        let items = Vec::<RawNode>::deserialize(&*value).map_err(Error::Schema)?;
        let tree = FaultTree::build(items);
        log::info!("Loaded {} with {} nodes", main_file, tree.len());

        Ok(Self::new(Arc::new(tree), store))
    }

    pub fn new(tree: Arc<FaultTree>, store: Arc<DataStore<F>>) -> Self {
        let index = SearchIndex::new(&tree);
        let view = ViewState::from_filter(index.filter(""));

        Self {
            resolver: ContentResolver::new(tree, store),
            index,
            generation: AtomicU64::new(0),
            display: Mutex::new(DisplayState::default()),
            view: Mutex::new(view),
        }
    }

    pub fn tree(&self) -> &FaultTree {
        self.resolver.tree()
    }

    pub fn resolver(&self) -> &ContentResolver<F> {
        &self.resolver
    }

    pub fn store(&self) -> &DataStore<F> {
        self.resolver.store()
    }

    /// Snapshot of the note box and content area
    pub fn display(&self) -> DisplayState {
        self.display.lock().clone()
    }

    /// Snapshot of visibility and expansion
    pub fn view(&self) -> ViewState {
        self.view.lock().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Select a node: update the note right away, then resolve its content.
    ///
    /// Selecting a category also toggles its expansion. The previous content
    /// stays on screen while the new one resolves.
    pub async fn select(&self, id: &NodeId) -> SelectOutcome {
        let tree = Arc::clone(self.resolver.tree());
        let Some(node) = tree.get(id) else {
            log::debug!("Ignoring selection of unknown node {}", id);
            return SelectOutcome::Ignored;
        };

        let generation = {
            let mut display = self.display.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            display.selected = Some(id.clone());
            display.generation = generation;
            display.phase = Phase::Resolving;
            display.note = self.resolver.effective_note(id);
            generation
        };
        if node.is_category() {
            self.toggle(id);
        }

        let content = self.resolver.content(node).await;

        let mut display = self.display.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("Discarding stale content for {} (generation {})", id, generation);
            return SelectOutcome::Superseded;
        }

        match content {
            Ok(content) => {
                display.phase = Phase::Resolved;
                display.panel = if content.is_empty() {
                    Panel::Placeholder
                } else {
                    Panel::Detail { content }
                };
                SelectOutcome::Resolved
            }
            Err(e) => {
                log::warn!("{}", e);
                display.phase = Phase::Failed;
                display.panel = Panel::Failed {
                    node_id: id.clone(),
                    message: e.to_string(),
                };
                SelectOutcome::Failed
            }
        }
    }

    /// Flip a category between open and closed; returns whether it is now open
    pub fn toggle(&self, id: &NodeId) -> bool {
        let is_category = self.tree().get(id).is_some_and(|n| n.is_category());
        if !is_category {
            return false;
        }

        let mut view = self.view.lock();
        if view.expanded.remove(id) {
            false
        } else {
            view.expanded.insert(id.clone());
            true
        }
    }

    /// Filter the tree by title and make the result the current view
    pub fn apply_filter(&self, query: &str) -> FilterResult {
        let result = self.index.filter(query);
        *self.view.lock() = ViewState::from_filter(result.clone());
        result
    }
}
