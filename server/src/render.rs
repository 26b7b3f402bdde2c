//! Plain-text rendering of the tree and the detail panel.

use faulttree_core::resolve::LINE_BREAK;
use faulttree_core::{Content, DisplayState, FaultTree, NodeId, NodeKind, Panel, ViewState};
use serde::Serialize;
use std::fmt::Write;

pub const PLACEHOLDER: &str = "Select a specific fault item to view its details.";
pub const NO_RESULTS: &str = "No matching faults found.";

/// One visible row of the outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub id: NodeId,
    pub title: String,
    pub depth: usize,
    pub marker: char,
}

/// View with every node visible and every category open
pub fn expand_all(tree: &FaultTree) -> ViewState {
    ViewState {
        visible: tree.nodes().map(|n| n.id.clone()).collect(),
        expanded: tree
            .nodes()
            .filter(|n| n.is_category())
            .map(|n| n.id.clone())
            .collect(),
        ..Default::default()
    }
}

/// Visible rows in tree order; children of collapsed categories are skipped
pub fn outline_entries(tree: &FaultTree, view: &ViewState) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    push_entries(tree, view, tree.roots(), 0, &mut entries);
    entries
}

fn push_entries(
    tree: &FaultTree,
    view: &ViewState,
    ids: &[NodeId],
    depth: usize,
    out: &mut Vec<OutlineEntry>,
) {
    for id in ids {
        let Some(node) = tree.get(id) else { continue };
        if !view.visible.contains(id) {
            continue;
        }

        let open = view.expanded.contains(id);
        let marker = match node.kind {
            NodeKind::Category { .. } if open => '-',
            NodeKind::Category { .. } => '+',
            NodeKind::ExternalLeaf { .. } => '>',
            NodeKind::InlineLeaf { .. } => '*',
        };
        out.push(OutlineEntry {
            id: id.clone(),
            title: node.title.clone(),
            depth,
            marker,
        });

        if open {
            push_entries(tree, view, node.children(), depth + 1, out);
        }
    }
}

/// Indented outline, or the no-results line when a query matched nothing
pub fn render_outline(tree: &FaultTree, view: &ViewState) -> String {
    if view.no_results {
        return format!("{NO_RESULTS}\n");
    }

    let mut out = String::new();
    for entry in outline_entries(tree, view) {
        let _ = writeln!(
            out,
            "{}{} {}  [{}]",
            "  ".repeat(entry.depth),
            entry.marker,
            entry.title,
            entry.id
        );
    }
    out
}

fn to_text(markup: &str) -> String {
    markup.replace(LINE_BREAK, "\n")
}

fn render_content(out: &mut String, content: &Content) {
    let _ = writeln!(out, "Repair measures:");
    let _ = writeln!(out, "{}", to_text(content.measures.as_deref().unwrap_or("")));

    if !content.images.is_empty() {
        let _ = writeln!(out, "\nImages:");
        for image in &content.images {
            match &image.caption {
                Some(caption) => {
                    let _ = writeln!(out, "  {} ({})", image.url, caption);
                }
                None => {
                    let _ = writeln!(out, "  {}", image.url);
                }
            }
        }
    }

    let _ = writeln!(out, "\nRoot cause:");
    let _ = writeln!(out, "{}", to_text(content.root_cause.as_deref().unwrap_or("")));
}

/// Selected title, note box and content panel
pub fn render_display(tree: &FaultTree, display: &DisplayState) -> String {
    let mut out = String::new();

    if let Some(node) = display.selected.as_ref().and_then(|id| tree.get(id)) {
        let _ = writeln!(out, "{}\n", node.title);
    }
    if let Some(note) = &display.note {
        let _ = writeln!(out, "Note: {}\n", note);
    }

    match &display.panel {
        Panel::Placeholder => {
            let _ = writeln!(out, "{PLACEHOLDER}");
        }
        Panel::Detail { content } => render_content(&mut out, content),
        Panel::Failed { .. } => {
            let _ = writeln!(out, "Failed to load fault details.");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use faulttree_core::{filter, ImageRef, RawNode};

    fn tree() -> FaultTree {
        FaultTree::build(vec![RawNode::new("Pump").with_children(vec![
            RawNode::new("Seal").with_file("seal.json"),
            RawNode::new("Valve").with_measures("Replace"),
        ])])
    }

    fn view_from(result: faulttree_core::FilterResult) -> ViewState {
        ViewState {
            no_results: result.no_results(),
            query: result.query,
            visible: result.visible,
            expanded: result.expanded,
        }
    }

    #[test]
    fn test_reset_view_shows_collapsed_top_level() {
        let tree = tree();
        let out = render_outline(&tree, &view_from(filter(&tree, "")));
        assert_eq!(out, "+ Pump  [root-0]\n");
    }

    #[test]
    fn test_expand_all() {
        let tree = tree();
        let out = render_outline(&tree, &expand_all(&tree));
        assert_eq!(
            out,
            "- Pump  [root-0]\n  > Seal  [root-0-0]\n  * Valve  [root-0-1]\n"
        );
    }

    #[test]
    fn test_filtered_outline() {
        let tree = tree();
        let entries = outline_entries(&tree, &view_from(filter(&tree, "valve")));
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Pump", "Valve"]);
        assert_eq!(entries[1].depth, 1);
    }

    #[test]
    fn test_no_results_line() {
        let tree = tree();
        let out = render_outline(&tree, &view_from(filter(&tree, "zzz")));
        assert_eq!(out, format!("{NO_RESULTS}\n"));
    }

    #[test]
    fn test_render_display_with_content() {
        let tree = tree();
        let display = DisplayState {
            selected: Some(NodeId::from("root-0-1")),
            note: Some("Depressurize first".to_string()),
            panel: Panel::Detail {
                content: Content {
                    measures: Some("Step 1<br>Step 2".to_string()),
                    root_cause: Some("Wear".to_string()),
                    images: vec![ImageRef {
                        url: "img/v.png".to_string(),
                        caption: Some("Valve".to_string()),
                    }],
                },
            },
            ..Default::default()
        };

        let out = render_display(&tree, &display);
        assert!(out.starts_with("Valve\n"));
        assert!(out.contains("Note: Depressurize first"));
        assert!(out.contains("Step 1\nStep 2"));
        assert!(out.contains("img/v.png (Valve)"));
        assert!(out.contains("Root cause:\nWear"));
    }

    #[test]
    fn test_render_placeholder_and_failure() {
        let tree = tree();
        let out = render_display(&tree, &DisplayState::default());
        assert!(out.contains(PLACEHOLDER));

        let failed = DisplayState {
            panel: Panel::Failed {
                node_id: NodeId::from("root-0-0"),
                message: "HTTP 404".to_string(),
            },
            ..Default::default()
        };
        assert!(render_display(&tree, &failed).contains("Failed to load fault details."));
    }
}
