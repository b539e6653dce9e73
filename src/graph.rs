//! The operation graph: an append-only node list plus a labeled edge list.
//!
//! Node ids are list indices (0-based, insertion order). The graph performs
//! no validation of its own; the builder preserves the structural invariants
//! by construction.

use serde_json::{Value, json};

use crate::{error::FramewiseResult, steps::Step};

/// Which input a graph edge supplies to its target node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The primary (or only) operand of a node.
    Input,
    /// The base image of a two-input compositing node.
    Canvas,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Step>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn append_node(&mut self, step: Step) -> u32 {
        self.nodes.push(step);
        (self.nodes.len() - 1) as u32
    }

    pub fn add_edge(&mut self, from: u32, to: u32, kind: EdgeKind) {
        self.edges.push(Edge { from, to, kind });
    }

    pub fn nodes(&self) -> &[Step] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Renders `{"nodes": {"<id>": <tagged step>}, "edges": [...]}`.
    pub fn to_value(&self) -> FramewiseResult<Value> {
        let mut nodes = serde_json::Map::new();
        for (id, step) in self.nodes.iter().enumerate() {
            nodes.insert(id.to_string(), step.to_value()?);
        }
        Ok(json!({
            "nodes": nodes,
            "edges": self.edges,
        }))
    }
}
