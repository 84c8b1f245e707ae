//! The organized family structure
//!
//! Output of the organizer: four disjoint generation tiers, the adjacency
//! maps they were derived from, and the per-person generation mapping.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::RelationshipGraph;
use crate::core::{Generation, KindredError, Person, PersonId};

/// Which path produced an organized family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// No usable people
    Empty,
    /// Generation levels resolved from relationship edges
    Relationships,
    /// Age/gender heuristic, because no structural edges exist
    Heuristic,
    /// Age/gender heuristic, because edges put same-gender people in the
    /// parent tier
    GenderConflictFallback,
    /// Editor-assigned roles layered over automatic resolution
    ManualRoles,
}

impl std::fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationSource::Empty => write!(f, "empty"),
            ClassificationSource::Relationships => write!(f, "relationships"),
            ClassificationSource::Heuristic => write!(f, "heuristic"),
            ClassificationSource::GenderConflictFallback => write!(f, "gender conflict fallback"),
            ClassificationSource::ManualRoles => write!(f, "manual roles"),
        }
    }
}

/// A family organized into generation tiers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizedFamily {
    grandparents: Vec<Person>,
    parents: Vec<Person>,
    children: Vec<Person>,
    grandchildren: Vec<Person>,
    generation_levels: BTreeMap<PersonId, Generation>,
    #[serde(flatten)]
    graph: RelationshipGraph,
    source: ClassificationSource,
}

impl OrganizedFamily {
    /// A family with no members
    pub fn empty() -> Self {
        Self {
            grandparents: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            grandchildren: Vec::new(),
            generation_levels: BTreeMap::new(),
            graph: RelationshipGraph::default(),
            source: ClassificationSource::Empty,
        }
    }

    /// Distribute `members` into tiers by `levels`, keeping member order
    /// within each tier. Members without a level are left out.
    pub(crate) fn assemble<'a>(
        members: impl IntoIterator<Item = &'a Person>,
        levels: BTreeMap<PersonId, Generation>,
        graph: RelationshipGraph,
        source: ClassificationSource,
    ) -> Self {
        let mut family = Self {
            graph,
            source,
            ..Self::empty()
        };

        for person in members {
            let Some(&generation) = levels.get(&person.id) else {
                continue;
            };
            family.tier_mut(generation).push(person.clone());
        }
        family.generation_levels = levels;
        family
    }

    fn tier_mut(&mut self, generation: Generation) -> &mut Vec<Person> {
        match generation {
            Generation::Grandparent => &mut self.grandparents,
            Generation::Parent => &mut self.parents,
            Generation::Child => &mut self.children,
            Generation::Grandchild => &mut self.grandchildren,
        }
    }

    pub fn grandparents(&self) -> &[Person] {
        &self.grandparents
    }

    pub fn parents(&self) -> &[Person] {
        &self.parents
    }

    pub fn children(&self) -> &[Person] {
        &self.children
    }

    pub fn grandchildren(&self) -> &[Person] {
        &self.grandchildren
    }

    /// Members of one tier, in order
    pub fn tier(&self, generation: Generation) -> &[Person] {
        match generation {
            Generation::Grandparent => &self.grandparents,
            Generation::Parent => &self.parents,
            Generation::Child => &self.children,
            Generation::Grandchild => &self.grandchildren,
        }
    }

    /// Non-empty tiers, shallowest first
    pub fn tiers(&self) -> impl Iterator<Item = (Generation, &[Person])> {
        Generation::ALL
            .into_iter()
            .map(move |generation| (generation, self.tier(generation)))
            .filter(|(_, members)| !members.is_empty())
    }

    /// All members, shallowest tier first
    pub fn members(&self) -> impl Iterator<Item = &Person> {
        Generation::ALL
            .into_iter()
            .flat_map(move |generation| self.tier(generation).iter())
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.members().find(|p| p.id == id)
    }

    pub fn generation_of(&self, id: PersonId) -> Option<Generation> {
        self.generation_levels.get(&id).copied()
    }

    /// Integer level (0 grandparent through 3 grandchild)
    pub fn level_of(&self, id: PersonId) -> Option<u8> {
        self.generation_of(id).map(|g| g.level())
    }

    pub fn generation_levels(&self) -> &BTreeMap<PersonId, Generation> {
        &self.generation_levels
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    pub fn parent_child_map(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        self.graph.parent_children()
    }

    pub fn child_parent_map(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        self.graph.child_parents()
    }

    pub fn spouse_map(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        self.graph.spouse_map()
    }

    pub fn grandparent_map(&self) -> &BTreeMap<PersonId, Vec<PersonId>> {
        self.graph.grandparent_grandchildren()
    }

    pub fn source(&self) -> ClassificationSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.grandparents.len() + self.parents.len() + self.children.len() + self.grandchildren.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted member ids; changes whenever someone joins or leaves
    pub fn composition(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self.members().map(|p| p.id).collect();
        ids.sort();
        ids
    }

    /// Check that no person sits in two tiers and that every tier agrees
    /// with the generation mapping.
    pub fn verify_disjoint(&self) -> Result<(), KindredError> {
        let mut seen = HashSet::new();
        for (generation, members) in self.tiers() {
            for person in members {
                if !seen.insert(person.id) {
                    return Err(KindredError::invariant_violation(format!(
                        "person {} appears in more than one generation tier",
                        person.id
                    )));
                }
                if self.generation_of(person.id) != Some(generation) {
                    return Err(KindredError::invariant_violation(format!(
                        "person {} is in the {} tier but mapped to {:?}",
                        person.id,
                        generation,
                        self.generation_of(person.id)
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for OrganizedFamily {
    fn default() -> Self {
        Self::empty()
    }
}
