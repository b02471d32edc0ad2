//! Alt-spelling graph over root senses.
//!
//! Nodes are keyed by (root word, part of speech) and live in an arena ordered
//! by key. Alt-spelling declarations become undirected edges.
//!
//! # Invariants
//!
//! 1. **Symmetric:** if `b` is a neighbor of `a`, then `a` is a neighbor of `b`.
//! 2. **No dead edges:** edges whose endpoint has no node are dropped at build time.
//! 3. **Sorted adjacency:** neighbor lists are sorted and deduplicated, so
//!    traversal order depends only on the keys.

use std::collections::BTreeMap;

use crate::model::{NodeKey, WordRecord};

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub key: NodeKey,
    /// Definition of the first root sense seen for this key.
    pub definition: String,
    pub origin: Option<String>,
    neighbors: Vec<usize>,
    visited: bool,
}

impl GraphNode {
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }
}

/// Collects nodes and directed edges before the arena is frozen.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeKey, (String, Option<String>)>,
    edges: Vec<(NodeKey, NodeKey)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. The first definition registered for a key is kept.
    pub fn add_node(&mut self, key: NodeKey, definition: &str, origin: Option<&str>) {
        self.nodes
            .entry(key)
            .or_insert_with(|| (definition.to_string(), origin.map(str::to_string)));
    }

    pub fn add_edge(&mut self, from: NodeKey, to: NodeKey) {
        if from != to {
            self.edges.push((from, to));
        }
    }

    pub fn build(self) -> AltGraph {
        let mut index = BTreeMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, (key, (definition, origin))) in self.nodes.into_iter().enumerate() {
            index.insert(key.clone(), i);
            nodes.push(GraphNode {
                key,
                definition,
                origin,
                neighbors: Vec::new(),
                visited: false,
            });
        }

        let mut dropped = 0usize;
        for (from, to) in &self.edges {
            match (index.get(from), index.get(to)) {
                (Some(&a), Some(&b)) => {
                    nodes[a].neighbors.push(b);
                    nodes[b].neighbors.push(a);
                }
                _ => dropped += 1,
            }
        }
        for node in &mut nodes {
            node.neighbors.sort_unstable();
            node.neighbors.dedup();
        }

        if dropped > 0 {
            log::debug!("dropped {dropped} alt-spelling edge(s) with no target node");
        }

        AltGraph { nodes, index }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AltGraph {
    nodes: Vec<GraphNode>,
    index: BTreeMap<NodeKey, usize>,
}

impl AltGraph {
    /// Build the graph from parsed words.
    ///
    /// Root senses create nodes first. A derived entry whose root has no root
    /// sense of that part of speech (only exempt words get this far) creates a
    /// node from its own definition so it still belongs to a group.
    pub fn from_words(words: &[WordRecord]) -> Self {
        let mut builder = GraphBuilder::new();

        for record in words {
            for entry in record.entries.iter().filter(|e| e.is_root_sense()) {
                builder.add_node(
                    entry.node_key(&record.word),
                    &entry.definition,
                    entry.origin.as_deref(),
                );
            }
        }

        for record in words {
            for entry in &record.entries {
                let key = entry.node_key(&record.word);
                if !entry.is_root_sense() {
                    builder.add_node(key.clone(), &entry.definition, entry.origin.as_deref());
                }
                for alt in &entry.alts {
                    builder.add_edge(key.clone(), NodeKey::new(alt.as_str(), entry.pos));
                }
            }
        }

        builder.build()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Collect the unvisited component containing `start`, marking every
    /// member visited. Returns an empty list if `start` was already visited.
    ///
    /// Iterative DFS; neighbors are pushed in reverse so the lowest key is
    /// explored first.
    pub fn take_component(&mut self, start: usize) -> Vec<usize> {
        if self.nodes[start].visited {
            return Vec::new();
        }

        let mut members = Vec::new();
        let mut stack = vec![start];
        self.nodes[start].visited = true;

        while let Some(current) = stack.pop() {
            members.push(current);
            for i in (0..self.nodes[current].neighbors.len()).rev() {
                let next = self.nodes[current].neighbors[i];
                if !self.nodes[next].visited {
                    self.nodes[next].visited = true;
                    stack.push(next);
                }
            }
        }

        members
    }

    pub fn reset_visits(&mut self) {
        for node in &mut self.nodes {
            node.visited = false;
        }
    }

    /// Check the symmetry invariant. Used by tests.
    pub fn is_symmetric(&self) -> bool {
        self.nodes.iter().enumerate().all(|(a, node)| {
            node.neighbors
                .iter()
                .all(|&b| self.nodes[b].neighbors.binary_search(&a).is_ok())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PartOfSpeech;

    fn key(root: &str) -> NodeKey {
        NodeKey::new(root, PartOfSpeech::Noun)
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> AltGraph {
        let mut builder = GraphBuilder::new();
        for n in nodes {
            builder.add_node(key(n), &format!("def of {n}"), None);
        }
        for (a, b) in edges {
            builder.add_edge(key(a), key(b));
        }
        builder.build()
    }

    #[test]
    fn edges_are_symmetrized() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("C", "B")]);
        assert!(g.is_symmetric());
        let b = g.index_of(&key("B")).unwrap();
        assert_eq!(g.node(b).neighbors().len(), 2);
    }

    #[test]
    fn dead_edges_are_dropped() {
        let g = graph(&["A"], &[("A", "MISSING"), ("MISSING", "A")]);
        assert!(g.node(0).neighbors().is_empty());
    }

    #[test]
    fn self_edges_are_ignored() {
        let g = graph(&["A"], &[("A", "A")]);
        assert!(g.node(0).neighbors().is_empty());
    }

    #[test]
    fn first_definition_wins() {
        let mut builder = GraphBuilder::new();
        builder.add_node(key("A"), "first", Some("French"));
        builder.add_node(key("A"), "second", None);
        let g = builder.build();
        assert_eq!(g.len(), 1);
        assert_eq!(g.node(0).definition, "first");
        assert_eq!(g.node(0).origin.as_deref(), Some("French"));
    }

    #[test]
    fn components_are_disjoint_and_cover_all_nodes() {
        let mut g = graph(&["A", "B", "C", "D", "E"], &[("A", "C"), ("C", "E"), ("B", "D")]);
        let mut seen = Vec::new();
        let mut components = Vec::new();
        for i in 0..g.len() {
            let c = g.take_component(i);
            if !c.is_empty() {
                seen.extend(c.iter().copied());
                components.push(c);
            }
        }
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec![0, 2, 4]);
        assert_eq!(components[1], vec![1, 3]);
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn visited_component_is_not_revisited() {
        let mut g = graph(&["A", "B"], &[("A", "B")]);
        assert!(g.nodes().iter().all(|n| !n.is_visited()));
        assert_eq!(g.take_component(1).len(), 2);
        assert!(g.nodes().iter().all(GraphNode::is_visited));
        assert!(g.take_component(0).is_empty());
        g.reset_visits();
        assert!(!g.node(0).is_visited());
        assert_eq!(g.take_component(0).len(), 2);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..50_000).map(|i| format!("W{i:06}")).collect();
        let mut builder = GraphBuilder::new();
        for n in &names {
            builder.add_node(key(n), "x", None);
        }
        for pair in names.windows(2) {
            builder.add_edge(key(&pair[0]), key(&pair[1]));
        }
        let mut g = builder.build();
        assert_eq!(g.take_component(0).len(), names.len());
    }

    #[test]
    fn parts_of_speech_do_not_connect() {
        let mut builder = GraphBuilder::new();
        builder.add_node(NodeKey::new("A", PartOfSpeech::Noun), "x", None);
        builder.add_node(NodeKey::new("B", PartOfSpeech::Verb), "x", None);
        builder.add_edge(NodeKey::new("A", PartOfSpeech::Noun), NodeKey::new("B", PartOfSpeech::Noun));
        let g = builder.build();
        assert!(g.nodes().iter().all(|n| n.neighbors().is_empty()));
    }
}
