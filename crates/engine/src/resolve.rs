//! Plurality resolution over alt-spelling equivalence groups.
//!
//! Every connected component of the [`AltGraph`] resolves to one canonical
//! definition, one canonical origin and a sorted member list. Components
//! reachable from a reserved node are left as authored.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::PluralityConfig;
use crate::error::LexiconError;
use crate::graph::{AltGraph, GraphNode};
use crate::model::{NodeKey, PartOfSpeech, WordRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceGroup {
    pub pos: PartOfSpeech,
    pub definition: String,
    pub origin: Option<String>,
    /// Member root words, sorted.
    pub members: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub groups: Vec<EquivalenceGroup>,
    by_key: FxHashMap<NodeKey, usize>,
    reserved: BTreeSet<NodeKey>,
}

impl Resolution {
    pub fn group_for(&self, key: &NodeKey) -> Option<&EquivalenceGroup> {
        self.by_key.get(key).map(|&i| &self.groups[i])
    }

    pub fn is_reserved(&self, key: &NodeKey) -> bool {
        self.reserved.contains(key)
    }

    pub fn reserved(&self) -> &BTreeSet<NodeKey> {
        &self.reserved
    }

    /// Root words of every reserved node.
    pub fn reserved_words(&self) -> BTreeSet<&str> {
        self.reserved.iter().map(|k| k.root.as_str()).collect()
    }
}

/// Partition the graph into reserved nodes and equivalence groups.
pub fn resolve(
    graph: &mut AltGraph,
    seeds: &BTreeSet<NodeKey>,
    plurality: &PluralityConfig,
) -> Resolution {
    graph.reset_visits();
    let mut resolution = Resolution::default();

    // Reserved nodes first; everything they reach is reserved too
    for seed in seeds {
        resolution.reserved.insert(seed.clone());
        if let Some(start) = graph.index_of(seed) {
            for idx in graph.take_component(start) {
                resolution.reserved.insert(graph.node(idx).key.clone());
            }
        }
    }

    for start in 0..graph.len() {
        let component = graph.take_component(start);
        if component.is_empty() {
            continue;
        }

        let members: Vec<&GraphNode> = component.iter().map(|&i| graph.node(i)).collect();
        let definition = choose_definition(&members, plurality);
        let origin = choose_origin(&members, plurality);
        let mut words: Vec<String> = members.iter().map(|n| n.key.root.clone()).collect();
        words.sort();
        words.dedup();

        let group_idx = resolution.groups.len();
        for node in &members {
            resolution.by_key.insert(node.key.clone(), group_idx);
        }
        resolution.groups.push(EquivalenceGroup {
            pos: members[0].key.pos,
            definition,
            origin,
            members: words,
        });
    }

    log::debug!(
        "resolved {} group(s), {} reserved node(s)",
        resolution.groups.len(),
        resolution.reserved.len()
    );

    resolution
}

/// Highest-scoring distinct definition; first seen wins exact ties.
///
/// Score is `origin_weight * has_origin + length_weight * char_len`, where
/// `has_origin` is true if any node carrying that text has an origin.
pub fn choose_definition(members: &[&GraphNode], plurality: &PluralityConfig) -> String {
    let mut candidates: Vec<(&str, bool)> = Vec::new();
    for node in members {
        let has_origin = node.origin.is_some();
        match candidates.iter_mut().find(|(text, _)| *text == node.definition) {
            Some((_, flag)) => *flag |= has_origin,
            None => candidates.push((node.definition.as_str(), has_origin)),
        }
    }

    let score = |text: &str, has_origin: bool| -> u64 {
        let origin = if has_origin { plurality.origin_weight } else { 0 };
        origin.saturating_add(plurality.length_weight.saturating_mul(text.chars().count() as u64))
    };

    let mut best: Option<(&str, u64)> = None;
    for (text, has_origin) in candidates {
        let s = score(text, has_origin);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((text, s));
        }
    }
    best.map(|(text, _)| text.to_string()).unwrap_or_default()
}

/// Most common non-special origin; first seen wins ties.
pub fn choose_origin(members: &[&GraphNode], plurality: &PluralityConfig) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for origin in members.iter().filter_map(|n| n.origin.as_deref()) {
        if plurality.is_special_origin(origin) {
            continue;
        }
        match counts.iter_mut().find(|(o, _)| *o == origin) {
            Some((_, n)) => *n += 1,
            None => counts.push((origin, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (origin, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((origin, n));
        }
    }
    best.map(|(o, _)| o.to_string())
}

/// Write each group's canonical definition, origin and alt list back onto
/// every non-reserved entry.
///
/// An entry whose own origin is special keeps it. An entry whose key has no
/// group is an internal error.
pub fn apply(
    words: &mut [WordRecord],
    resolution: &Resolution,
    plurality: &PluralityConfig,
) -> Result<usize, LexiconError> {
    let mut updated = 0;
    for record in words.iter_mut() {
        let word = record.word.as_str();
        for entry in record.entries.iter_mut() {
            let key = entry.node_key(word);
            if resolution.is_reserved(&key) {
                continue;
            }
            let group = resolution.group_for(&key).ok_or_else(|| {
                LexiconError::Internal(format!("no equivalence group for {key} (word {word})"))
            })?;

            entry.definition = group.definition.clone();
            entry.alts = group.members.iter().filter(|m| **m != key.root).cloned().collect();
            if let Some(origin) = &group.origin {
                let keeps_own = entry
                    .origin
                    .as_deref()
                    .is_some_and(|o| plurality.is_special_origin(o));
                if !keeps_own {
                    entry.origin = Some(origin.clone());
                }
            }
            updated += 1;
        }
    }
    Ok(updated)
}
