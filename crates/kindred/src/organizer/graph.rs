//! Relationship graph builder
//!
//! Turns a flat list of typed edges into directional adjacency maps.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use crate::core::{PersonId, RelationshipEdge, RelationshipType};

type Adjacency = BTreeMap<PersonId, Vec<PersonId>>;

/// Directional adjacency maps built from active relationship edges
///
/// Keys are ordered so every traversal over the graph is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipGraph {
    parent_children: Adjacency,
    child_parents: Adjacency,
    spouses: Adjacency,
    grandparent_grandchildren: Adjacency,
    grandchild_grandparents: Adjacency,
    /// Active edges that were dropped because an endpoint is unknown
    #[serde(skip)]
    ignored_edges: usize,
}

fn link(map: &mut Adjacency, from: PersonId, to: PersonId) {
    let targets = map.entry(from).or_default();
    if !targets.contains(&to) {
        targets.push(to);
    }
}

impl RelationshipGraph {
    /// Build the maps from every active edge whose endpoints are both in
    /// `known`. Edges referencing unknown ids and self-edges are ignored.
    pub fn build(edges: &[RelationshipEdge], known: &HashSet<PersonId>) -> Self {
        let mut graph = Self::default();

        for edge in edges.iter().filter(|e| e.is_active) {
            let (a, b) = (edge.person_a, edge.person_b);
            if !known.contains(&a) || !known.contains(&b) || a == b {
                trace!(%a, %b, kind = %edge.relationship_type, "Ignoring edge");
                graph.ignored_edges += 1;
                continue;
            }
            let kind = edge.relationship_type;
            if kind.is_structural() {
                graph.add_structural(a, b, kind);
            } else if kind == RelationshipType::Spouse {
                link(&mut graph.spouses, a, b);
                link(&mut graph.spouses, b, a);
            } else {
                // Accepted but not used for generation inference
                trace!(%a, %b, %kind, "Skipping non-generational edge");
            }
        }

        debug!(
            parents = graph.parent_children.len(),
            spouses = graph.spouses.len(),
            grandparents = graph.grandparent_grandchildren.len(),
            ignored = graph.ignored_edges,
            "Built relationship graph"
        );
        graph
    }

    fn add_structural(&mut self, a: PersonId, b: PersonId, kind: RelationshipType) {
        match kind {
            RelationshipType::Parent => self.add_parent(a, b),
            RelationshipType::Child => self.add_parent(b, a),
            RelationshipType::Grandparent => self.add_grandparent(a, b),
            RelationshipType::Grandchild => self.add_grandparent(b, a),
            _ => {}
        }
    }

    /// Record `parent` as a parent of `child`
    pub fn add_parent(&mut self, parent: PersonId, child: PersonId) {
        link(&mut self.parent_children, parent, child);
        link(&mut self.child_parents, child, parent);
    }

    /// Record `grandparent` as a grandparent of `grandchild`
    pub fn add_grandparent(&mut self, grandparent: PersonId, grandchild: PersonId) {
        link(&mut self.grandparent_grandchildren, grandparent, grandchild);
        link(&mut self.grandchild_grandparents, grandchild, grandparent);
    }

    pub fn parent_children(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        &self.parent_children
    }

    pub fn child_parents(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        &self.child_parents
    }

    pub fn spouse_map(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        &self.spouses
    }

    pub fn grandparent_grandchildren(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        &self.grandparent_grandchildren
    }

    pub fn grandchild_grandparents(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        &self.grandchild_grandparents
    }

    pub fn children_of(&self, id: PersonId) -> &[PersonId] {
        self.parent_children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents_of(&self, id: PersonId) -> &[PersonId] {
        self.child_parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn spouses_of(&self, id: PersonId) -> &[PersonId] {
        self.spouses.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, id: PersonId) -> bool {
        !self.children_of(id).is_empty()
    }

    pub fn is_parent_of(&self, parent: PersonId, child: PersonId) -> bool {
        self.children_of(parent).contains(&child)
    }

    /// People with recorded children but no recorded parents
    pub fn roots(&self) -> Vec<PersonId> {
        self.parent_children
            .keys()
            .filter(|id| !self.child_parents.contains_key(id))
            .copied()
            .collect()
    }

    /// Unordered spouse pairs, each reported once as (smaller, larger)
    pub fn spouse_pairs(&self) -> Vec<(PersonId, PersonId)> {
        self.spouses
            .iter()
            .flat_map(|(&a, spouses)| {
                spouses
                    .iter()
                    .filter(move |&&b| b > a)
                    .map(move |&b| (a, b))
            })
            .collect()
    }

    /// Returns true if any parent or grandparent link was recorded
    pub fn has_structure(&self) -> bool {
        !self.parent_children.is_empty() || !self.grandparent_grandchildren.is_empty()
    }

    /// Returns true if nothing at all was recorded
    pub fn is_empty(&self) -> bool {
        self.parent_children.is_empty()
            && self.spouses.is_empty()
            && self.grandparent_grandchildren.is_empty()
    }

    pub fn ignored_edge_count(&self) -> usize {
        self.ignored_edges
    }
}
