//! State of the visual rule editor.
//!
//! Cell states are drawn as circular nodes and transitions as edges between them.
//! The editor only keeps the model and reacts to abstract pointer events; drawing it
//! is left to the host.

use crate::error::EditorError;
use crate::geometry::{is_point_on_circle, is_point_on_segment, Point, Viewport};
use crate::rules::{Rule, Turn};
use crate::translator::{graph_to_table, table_to_graph};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Radius of a state node.
pub const NODE_RADIUS: f64 = 20.0;

/// Horizontal distance between a new node and the previous one.
pub const NODE_SPACING: f64 = 80.0;

/// Horizontal position of the first node of an empty editor.
pub const FIRST_NODE_X: f64 = 50.0;

/// How far from an edge a pointer may be and still hit it.
pub const EDGE_HIT_TOLERANCE: f64 = 8.0;

/// A cell state, drawn as a circle. The id is the cell state it stands for.
#[derive(Clone, Debug, PartialEq)]
pub struct StateNode {
    pub id: u32,
    pub position: Point,
    pub radius: f64,
}

impl StateNode {
    pub fn new(id: u32, position: Point) -> StateNode {
        StateNode {
            id,
            position,
            radius: NODE_RADIUS,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.distance(self.position) < self.radius
    }
}

/// A rule, drawn as an arrow from its current state to its next state.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionEdge {
    pub id: String,
    pub rule: Rule,
}

impl TransitionEdge {
    /// Creates an edge with a fresh unique id.
    pub fn new(rule: Rule) -> TransitionEdge {
        TransitionEdge {
            id: Uuid::new_v4().to_string(),
            rule,
        }
    }

    pub fn from(&self) -> u32 {
        self.rule.current_state
    }

    pub fn to(&self) -> u32 {
        self.rule.next_cell_state
    }

    pub fn is_self_loop(&self) -> bool {
        self.from() == self.to()
    }
}

/// What is currently selected. Nodes and edges are never selected together.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Node(u32),
    Edge(String),
}

/// A transition that has been drawn but still needs a turn and next state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingEdge {
    pub from: u32,
    pub to: u32,
}

/// The pointer interaction in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// A node follows the pointer, keeping the offset it was grabbed at.
    DraggingNode { id: u32, offset: Point },
    /// An arrow is drawn from a node to the pointer.
    DrawingEdge { from: u32, cursor: Point },
}

#[derive(Debug, Default)]
pub struct RuleGraphEditor {
    nodes: Vec<StateNode>,
    edges: Vec<TransitionEdge>,
    selection: Selection,
    pending: Option<PendingEdge>,
    interaction: Interaction,
}

impl RuleGraphEditor {
    pub fn new() -> RuleGraphEditor {
        RuleGraphEditor::default()
    }

    /// Replaces the whole graph with the layout of `rules` on a canvas of size `viewport`.
    ///
    /// Returns how many colors the palette needs to draw every node.
    pub fn load_rules(&mut self, rules: &[Rule], viewport: Viewport) -> usize {
        let graph = table_to_graph(rules, viewport);

        self.nodes = graph.nodes;
        self.edges = graph.edges;
        self.selection = Selection::None;
        self.pending = None;
        self.interaction = Interaction::Idle;
        info!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "loaded rules into the editor"
        );

        graph.color_count
    }

    /// The rule table described by the edges, in edge order.
    pub fn rules(&self) -> Vec<Rule> {
        graph_to_table(&self.nodes, &self.edges)
    }

    pub fn nodes(&self) -> &[StateNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }

    pub fn node(&self, id: u32) -> Option<&StateNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&TransitionEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending_edge(&self) -> Option<PendingEdge> {
        self.pending
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Number of palette colors needed for the largest state in the graph.
    pub fn required_color_count(&self) -> usize {
        let nodes = self.nodes.iter().map(|node| node.id);
        let edges = self.edges.iter().flat_map(|edge| [edge.from(), edge.to()]);

        nodes.chain(edges).max().map_or(1, |max| (max as usize).saturating_add(1))
    }

    /// The topmost node under `point`. Later nodes are drawn on top, so they are checked first.
    pub fn node_at(&self, point: Point) -> Option<&StateNode> {
        self.nodes.iter().rev().find(|node| node.contains(point))
    }

    /// The first edge passing within [`EDGE_HIT_TOLERANCE`] of `point`.
    pub fn edge_at(&self, point: Point) -> Option<&TransitionEdge> {
        self.edges.iter().find(|edge| self.edge_hit(edge, point))
    }

    fn edge_hit(&self, edge: &TransitionEdge, point: Point) -> bool {
        let (from, to) = match (self.node(edge.from()), self.node(edge.to())) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        if edge.is_self_loop() {
            let (center, radius) = self_loop_arc(from);
            return is_point_on_circle(point, center, radius, EDGE_HIT_TOLERANCE);
        }

        let (start, end) = edge_segment(from, to);
        is_point_on_segment(point, start, end, EDGE_HIT_TOLERANCE)
    }

    /// Handles a press on the canvas.
    ///
    /// # Arguments
    /// * `point` - The pointer position in canvas coordinates.
    /// * `create_edge` - Whether the create-edge modifier is held.
    pub fn pointer_down(&mut self, point: Point, create_edge: bool) {
        self.selection = Selection::None;
        self.pending = None;

        if let Some(node) = self.node_at(point) {
            let id = node.id;
            let offset = Point::new(point.x - node.position.x, point.y - node.position.y);

            self.selection = Selection::Node(id);
            self.interaction = if create_edge {
                Interaction::DrawingEdge {
                    from: id,
                    cursor: point,
                }
            } else {
                Interaction::DraggingNode { id, offset }
            };
            return;
        }

        if let Some(edge) = self.edge_at(point) {
            self.selection = Selection::Edge(edge.id.clone());
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        match self.interaction {
            Interaction::DraggingNode { id, offset } => {
                if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
                    node.position = Point::new(point.x - offset.x, point.y - offset.y);
                }
            }
            Interaction::DrawingEdge { from, .. } => {
                self.interaction = Interaction::DrawingEdge {
                    from,
                    cursor: point,
                };
            }
            Interaction::Idle => {}
        }
    }

    /// Handles a release, ending any drag and capturing a drawn edge.
    pub fn pointer_up(&mut self, point: Point) {
        if let Interaction::DrawingEdge { from, .. } = self.interaction {
            let target = self
                .nodes
                .iter()
                .find(|node| node.id != from && node.contains(point))
                .map(|node| node.id);

            match target {
                Some(to) => {
                    debug!(from, to, "captured pending transition");
                    self.pending = Some(PendingEdge { from, to });
                    self.selection = Selection::None;
                }
                None => self.pending = None,
            }
        }

        self.interaction = Interaction::Idle;
    }

    /// The pointer left the canvas. Ends a drag where the node currently is.
    pub fn pointer_leave(&mut self) {
        if let Interaction::DraggingNode { .. } = self.interaction {
            self.interaction = Interaction::Idle;
        }
    }

    /// Adds the next state to the right of the last node.
    ///
    /// Returns the id of the new node, or an error if it would not fit on the canvas
    /// or the last node already has the largest possible id.
    pub fn add_node(&mut self, viewport: Viewport) -> Result<u32, EditorError> {
        let (id, x) = match self.nodes.last() {
            Some(last) => {
                let id = last
                    .id
                    .checked_add(1)
                    .ok_or(EditorError::StateLimit { last: last.id })?;
                (id, last.position.x + NODE_SPACING)
            }
            None => (0, FIRST_NODE_X),
        };

        if x + NODE_RADIUS > viewport.width {
            warn!(id, x, width = viewport.width, "new state would be off canvas");
            return Err(EditorError::OffCanvas { id });
        }

        self.nodes
            .push(StateNode::new(id, Point::new(x, viewport.height / 2.0)));
        info!(id, "added state");

        Ok(id)
    }

    /// Removes the selected node. Edges touching it are kept and become dangling.
    pub fn remove_selected_node(&mut self) -> Result<u32, EditorError> {
        let id = match self.selection {
            Selection::Node(id) => id,
            _ => return Err(EditorError::NoSelection),
        };
        self.selection = Selection::None;

        let index = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or(EditorError::NodeNotFound(id))?;
        self.nodes.remove(index);

        let dangling = self
            .edges
            .iter()
            .filter(|edge| edge.from() == id || edge.to() == id)
            .count();
        if dangling > 0 {
            warn!(id, dangling, "removed state is still referenced by transitions");
        }
        info!(id, "removed state");

        Ok(id)
    }

    /// Turns the pending edge into a transition.
    ///
    /// Returns the id of the new edge, or `None` when an identical transition already exists.
    /// The pending edge is cleared in both cases.
    pub fn confirm_pending_edge(
        &mut self,
        turn: Turn,
        next_cell_state: u32,
    ) -> Result<Option<String>, EditorError> {
        let pending = self.pending.ok_or(EditorError::NoPendingEdge)?;
        if next_cell_state != pending.to {
            return Err(EditorError::EndpointMismatch {
                expected: pending.to,
                got: next_cell_state,
            });
        }
        self.pending = None;

        let rule = Rule::new(pending.from, turn, next_cell_state);
        if self.edges.iter().any(|edge| edge.rule == rule) {
            debug!(from = pending.from, to = pending.to, "transition already exists");
            return Ok(None);
        }

        let edge = TransitionEdge::new(rule);
        let id = edge.id.clone();
        self.edges.push(edge);
        info!(from = pending.from, to = pending.to, %id, "added transition");

        Ok(Some(id))
    }

    pub fn cancel_pending_edge(&mut self) {
        self.pending = None;
    }

    /// Changes the turn of a transition. Its endpoints, and so its next cell state, never change.
    pub fn update_edge_turn(&mut self, id: &str, turn: Turn) -> Result<(), EditorError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|edge| edge.id == id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.to_string()))?;

        edge.rule.turn = turn;
        debug!(id, ?turn, "updated transition");

        Ok(())
    }

    pub fn delete_edge(&mut self, id: &str) -> Result<(), EditorError> {
        let index = self
            .edges
            .iter()
            .position(|edge| edge.id == id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.to_string()))?;

        self.edges.remove(index);
        self.selection = Selection::None;
        info!(id, "deleted transition");

        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.selection = Selection::None;
        self.pending = None;
    }
}

/// Center and radius of the arc drawn above a node for a transition back to itself.
pub fn self_loop_arc(node: &StateNode) -> (Point, f64) {
    let radius = node.radius * 0.8;
    let center = Point::new(node.position.x, node.position.y - node.radius - radius * 0.5);

    (center, radius)
}

/// The visible part of an edge between two distinct nodes, from border to border.
pub fn edge_segment(from: &StateNode, to: &StateNode) -> (Point, Point) {
    let angle = (to.position.y - from.position.y).atan2(to.position.x - from.position.x);
    let (sin, cos) = angle.sin_cos();

    let start = Point::new(
        from.position.x + from.radius * cos,
        from.position.y + from.radius * sin,
    );
    let end = Point::new(
        to.position.x - to.radius * cos,
        to.position.y - to.radius * sin,
    );

    (start, end)
}
