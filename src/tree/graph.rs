//! Child-to-parent relation graph over note identifiers.
//!
//! Edge direction follows the ownership convention used throughout the
//! crate: the child is the source and the parent is the sink, with the
//! branch id as edge weight. Note identifiers are interned into petgraph
//! node indices via a side map, which is repaired in place on removal
//! (petgraph swap-removes the last node into the vacated slot).

use std::collections::BTreeMap;

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};

use super::{BranchId, NoteId};

#[derive(Debug, Default, Clone)]
pub struct NoteGraph {
    graph: DiGraph<NoteId, BranchId>,
    index: BTreeMap<NoteId, NodeIndex>,
}

impl NoteGraph {
    fn ensure_node(&mut self, note_id: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(note_id) {
            return *idx;
        }
        let idx = self.graph.add_node(note_id.to_string());
        self.index.insert(note_id.to_string(), idx);
        idx
    }

    pub fn contains(&self, note_id: &str) -> bool {
        self.index.contains_key(note_id)
    }

    /// Insert or replace the child→parent edge for one branch placement.
    pub fn link(&mut self, child: &str, parent: &str, branch_id: &str) {
        let child_idx = self.ensure_node(child);
        let parent_idx = self.ensure_node(parent);
        if let Some(edge) = self.graph.find_edge(child_idx, parent_idx) {
            self.graph[edge] = branch_id.to_string();
        } else {
            self.graph
                .add_edge(child_idx, parent_idx, branch_id.to_string());
        }
    }

    pub fn unlink(&mut self, child: &str, parent: &str) {
        let (Some(child_idx), Some(parent_idx)) =
            (self.index.get(child), self.index.get(parent))
        else {
            return;
        };
        if let Some(edge) = self.graph.find_edge(*child_idx, *parent_idx) {
            self.graph.remove_edge(edge);
        }
    }

    /// Drop the note's node together with all edges touching it.
    pub fn remove_note(&mut self, note_id: &str) {
        let Some(idx) = self.index.remove(note_id) else {
            return;
        };
        self.graph.remove_node(idx);
        // The last node was swapped into the vacated index; repair its entry.
        if let Some(moved) = self.graph.node_weight(idx) {
            self.index.insert(moved.clone(), idx);
        }
    }

    /// Current parents of a note as `(parent_note_id, branch_id)` pairs, in
    /// graph order. Callers wanting a user-facing order sort by branch
    /// position themselves.
    pub fn parents(&self, child: &str) -> Vec<(NoteId, BranchId)> {
        let Some(child_idx) = self.index.get(child) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(*child_idx, Direction::Outgoing)
            .map(|edge| (self.graph[edge.target()].clone(), edge.weight().clone()))
            .collect()
    }

    pub fn children(&self, parent: &str) -> Vec<(NoteId, BranchId)> {
        let Some(parent_idx) = self.index.get(parent) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(*parent_idx, Direction::Incoming)
            .map(|edge| (self.graph[edge.source()].clone(), edge.weight().clone()))
            .collect()
    }

    /// The branch id of the `parent`→`child` placement, if that edge is live.
    pub fn branch_id(&self, parent: &str, child: &str) -> Option<BranchId> {
        let (child_idx, parent_idx) = (self.index.get(child)?, self.index.get(parent)?);
        let edge = self.graph.find_edge(*child_idx, *parent_idx)?;
        Some(self.graph[edge].clone())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
