//! Conversion between rule tables and their graph form in the editor.

use crate::editor::{StateNode, TransitionEdge};
use crate::geometry::{Point, Viewport};
use crate::rules::Rule;
use std::collections::{BTreeSet, HashSet};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Space kept between the layout circle and the canvas border, node radius included.
const LAYOUT_MARGIN: f64 = 30.0;

/// A rule table laid out for the editor.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleGraph {
    pub nodes: Vec<StateNode>,
    pub edges: Vec<TransitionEdge>,
    /// Number of palette colors needed to draw every node.
    pub color_count: usize,
}

/// Lays out `rules` as a graph: one node per state mentioned, one edge per rule.
///
/// Nodes are sorted by state and spread evenly on a circle centered in `viewport`,
/// starting at the top and going clockwise. A single node sits at the center.
/// An empty table still produces the node for state 0.
pub fn table_to_graph(rules: &[Rule], viewport: Viewport) -> RuleGraph {
    let mut ids: BTreeSet<u32> = rules
        .iter()
        .flat_map(|rule| [rule.current_state, rule.next_cell_state])
        .collect();
    if ids.is_empty() {
        ids.insert(0);
    }

    let center = viewport.center();
    let count = ids.len();
    let radius = (viewport.width.min(viewport.height) / 2.0 - LAYOUT_MARGIN).max(0.0);

    let nodes: Vec<StateNode> = ids
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            if count == 1 {
                return StateNode::new(id, center);
            }

            let angle = index as f64 / count as f64 * 2.0 * PI - PI / 2.0;
            let position = Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            StateNode::new(id, position)
        })
        .collect();

    let edges: Vec<TransitionEdge> = rules.iter().copied().map(TransitionEdge::new).collect();
    warn_on_dangling_edges(&nodes, &edges);

    let color_count = ids.last().map_or(1, |&max| (max as usize).saturating_add(1));
    debug!(nodes = nodes.len(), edges = edges.len(), "laid out rule graph");

    RuleGraph {
        nodes,
        edges,
        color_count,
    }
}

/// Reads the rule table back from a graph: one rule per edge, in edge order.
///
/// Rules are not deduplicated. Edges pointing at missing nodes are kept.
pub fn graph_to_table(nodes: &[StateNode], edges: &[TransitionEdge]) -> Vec<Rule> {
    warn_on_dangling_edges(nodes, edges);

    edges.iter().map(|edge| edge.rule).collect()
}

fn warn_on_dangling_edges(nodes: &[StateNode], edges: &[TransitionEdge]) {
    let present: HashSet<u32> = nodes.iter().map(|node| node.id).collect();

    for edge in edges {
        if !present.contains(&edge.from()) || !present.contains(&edge.to()) {
            warn!(
                edge = %edge.id,
                from = edge.from(),
                to = edge.to(),
                "transition references a state that is not in the editor"
            );
        }
    }
}
