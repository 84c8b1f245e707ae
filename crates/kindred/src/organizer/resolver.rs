//! Generation level resolver
//!
//! Assigns every person a generation level (0 grandparent through 3
//! grandchild). Relationship edges are preferred: levels spread breadth-first
//! from root ancestors, unreached people are placed from their neighbours,
//! and two-generation families that were seeded one tier too high are
//! shifted down. When the edges carry no generational structure, or put two
//! same-gender people in the parent tier, the age/gender heuristic takes
//! over.

use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, error, info, span, trace, Level};

use super::{
    same_gender_parents, ClassificationSource, HeuristicClassifier, OrganizedFamily,
    RelationshipGraph,
};
use crate::core::{
    Diagnostics, Generation, OrganizerConfig, Person, PersonId, RelationshipEdge,
};

const ROOT_LEVEL: u8 = 0;
const PARENT_LEVEL: u8 = 1;
const CHILD_LEVEL: u8 = 2;
const MAX_LEVEL: u8 = 3;

/// Entry point for organizing a family group
#[derive(Debug, Clone, Default)]
pub struct Organizer {
    config: OrganizerConfig,
}

impl Organizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OrganizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    /// Organize people into generation tiers, discarding diagnostics
    pub fn organize(&self, people: &[Person], relationships: &[RelationshipEdge]) -> OrganizedFamily {
        self.organize_with_diagnostics(people, relationships, &mut Diagnostics::new())
    }

    /// Organize people into generation tiers, recording every fallback and
    /// correction into `diagnostics`
    ///
    /// # Panics
    ///
    /// Panics if the resolver places one person in two tiers. That is a bug
    /// in the resolver, never a consequence of input data.
    pub fn organize_with_diagnostics(
        &self,
        people: &[Person],
        relationships: &[RelationshipEdge],
        diagnostics: &mut Diagnostics,
    ) -> OrganizedFamily {
        let organize_span = span!(
            Level::INFO,
            "organize",
            people = people.len(),
            relationships = relationships.len()
        );
        let _enter = organize_span.enter();

        let members = Self::usable_members(people, diagnostics);
        if members.is_empty() {
            debug!("No usable members");
            return OrganizedFamily::empty();
        }

        let known: HashSet<PersonId> = members.iter().map(|p| p.id).collect();
        let graph = RelationshipGraph::build(relationships, &known);
        if graph.ignored_edge_count() > 0 {
            diagnostics.debug(
                "ignored_edges",
                format!(
                    "{} active relationships reference unknown people or themselves",
                    graph.ignored_edge_count()
                ),
            );
        }

        let family = if graph.has_structure() {
            self.organize_from_relationships(&members, graph, diagnostics)
        } else {
            diagnostics.info(
                "heuristic_classification",
                if graph.is_empty() {
                    "no relationship data, classifying by age and gender"
                } else {
                    "relationships carry no generations, classifying by age and gender"
                },
            );
            self.organize_by_heuristic(&members, graph, ClassificationSource::Heuristic)
        };

        Self::assert_disjoint(&family);
        info!(
            source = %family.source(),
            grandparents = family.grandparents().len(),
            parents = family.parents().len(),
            children = family.children().len(),
            grandchildren = family.grandchildren().len(),
            "Family organized"
        );
        family
    }

    fn organize_from_relationships(
        &self,
        members: &[Person],
        graph: RelationshipGraph,
        diagnostics: &mut Diagnostics,
    ) -> OrganizedFamily {
        let levels = resolve_levels(members, &graph, diagnostics);

        let parent_tier: Vec<&Person> = members
            .iter()
            .filter(|p| levels.get(&p.id) == Some(&PARENT_LEVEL))
            .collect();
        if let Some(conflict) = same_gender_parents(&parent_tier) {
            diagnostics.warn(
                "gender_conflict_fallback",
                format!("{}; classifying by age and gender instead", conflict.message),
                conflict.person_ids,
            );
            return self.organize_by_heuristic(
                members,
                graph,
                ClassificationSource::GenderConflictFallback,
            );
        }

        let generations = levels
            .into_iter()
            .map(|(id, level)| (id, Generation::from_level(level)))
            .collect();
        OrganizedFamily::assemble(members, generations, graph, ClassificationSource::Relationships)
    }

    fn organize_by_heuristic(
        &self,
        members: &[Person],
        graph: RelationshipGraph,
        source: ClassificationSource,
    ) -> OrganizedFamily {
        let classification = HeuristicClassifier::with_config(self.config.clone()).classify(members);

        let mut levels = BTreeMap::new();
        let mut ordered = Vec::with_capacity(members.len());
        let placements = classification
            .parents
            .iter()
            .map(|&id| (id, Generation::Parent))
            .chain(classification.children.iter().map(|&id| (id, Generation::Child)));
        for (id, generation) in placements {
            levels.insert(id, generation);
            if let Some(person) = members.iter().find(|p| p.id == id) {
                ordered.push(person);
            }
        }

        OrganizedFamily::assemble(ordered, levels, graph, source)
    }

    /// Drop records without a usable id and repeated ids, keeping the first.
    /// Blank names are kept and only noted.
    pub(crate) fn usable_members(people: &[Person], diagnostics: &mut Diagnostics) -> Vec<Person> {
        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(people.len());

        for person in people {
            if !person.id.is_usable() {
                diagnostics.debug(
                    "filtered_person",
                    format!("skipping '{}' without a usable id", person.name),
                );
                continue;
            }
            if !seen.insert(person.id) {
                diagnostics.warn(
                    "duplicate_person",
                    format!("person {} listed more than once, keeping the first", person.id),
                    vec![person.id],
                );
                continue;
            }
            if person.name.trim().is_empty() {
                diagnostics.debug("blank_name", format!("person {} has no name", person.id));
            }
            members.push(person.clone());
        }
        members
    }

    pub(crate) fn assert_disjoint(family: &OrganizedFamily) {
        if let Err(e) = family.verify_disjoint() {
            error!(error = %e, "Organizer produced overlapping generation tiers");
            panic!("{}", e);
        }
    }
}

/// Resolve raw generation levels from relationship structure
///
/// Every member ends up with a level in `0..=3`.
pub fn resolve_levels(
    members: &[Person],
    graph: &RelationshipGraph,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<PersonId, u8> {
    let resolve_span = span!(Level::DEBUG, "resolve_levels", members = members.len());
    let _enter = resolve_span.enter();

    let order: Vec<PersonId> = members.iter().map(|p| p.id).collect();
    let mut levels = seed_levels(graph, diagnostics);
    traverse(graph, &mut levels);
    trace!(reached = levels.len(), "Traversal finished");

    let deferred = place_unreached(&order, graph, &mut levels, diagnostics);
    collapse_two_generations(&mut levels, graph, diagnostics);

    // Grandparents of the shifted tiers can only be placed now
    for id in deferred {
        let level = graph
            .grandparent_grandchildren()
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|kid| levels.get(kid))
            .min()
            .map(|&l| l.saturating_sub(2))
            .unwrap_or(PARENT_LEVEL);
        levels.insert(id, level);
    }

    levels
}

/// Roots (children but no recorded parents) start at level 0. Without any
/// root, everyone with children starts at level 1.
fn seed_levels(graph: &RelationshipGraph, diagnostics: &mut Diagnostics) -> BTreeMap<PersonId, u8> {
    let roots = graph.roots();
    if !roots.is_empty() {
        return roots.into_iter().map(|id| (id, ROOT_LEVEL)).collect();
    }

    if !graph.parent_children().is_empty() {
        diagnostics.info(
            "no_root_found",
            "every parent also has recorded parents, seeding parents at level 1",
        );
    }
    graph
        .parent_children()
        .keys()
        .map(|&id| (id, PARENT_LEVEL))
        .collect()
}

/// Breadth-first from the seeds; each person is visited once and takes
/// the level of the parent it was discovered from plus one.
fn traverse(graph: &RelationshipGraph, levels: &mut BTreeMap<PersonId, u8>) {
    let mut visited: HashSet<PersonId> = levels.keys().copied().collect();
    let mut queue: VecDeque<PersonId> = levels.keys().copied().collect();

    while let Some(current) = queue.pop_front() {
        let Some(&level) = levels.get(&current) else {
            continue;
        };
        let next = (level + 1).min(MAX_LEVEL);
        for &child in graph.children_of(current) {
            if visited.insert(child) {
                levels.insert(child, next);
                queue.push_back(child);
            }
        }
    }
}

/// Place people the traversal never reached. Returns grandparents whose
/// level depends on tiers that may still shift.
fn place_unreached(
    order: &[PersonId],
    graph: &RelationshipGraph,
    levels: &mut BTreeMap<PersonId, u8>,
    diagnostics: &mut Diagnostics,
) -> Vec<PersonId> {
    loop {
        propagate(order, graph, levels);
        let next_parent = order
            .iter()
            .copied()
            .find(|id| !levels.contains_key(id) && graph.has_children(*id));
        match next_parent {
            Some(id) => {
                trace!(%id, "Unreached person with children placed as parent");
                levels.insert(id, PARENT_LEVEL);
            }
            None => break,
        }
    }

    let mut deferred = Vec::new();
    let mut defaulted = Vec::new();
    for &id in order {
        if levels.contains_key(&id) {
            continue;
        }
        if graph.grandparent_grandchildren().contains_key(&id) {
            deferred.push(id);
        } else {
            levels.insert(id, PARENT_LEVEL);
            defaulted.push(id);
        }
    }

    if !defaulted.is_empty() {
        diagnostics.debug(
            "default_level",
            format!(
                "{} people without structural relationships default to the parent tier",
                defaulted.len()
            ),
        );
    }
    deferred
}

/// Repeatedly place unresolved people from already placed neighbours until
/// nothing changes.
fn propagate(order: &[PersonId], graph: &RelationshipGraph, levels: &mut BTreeMap<PersonId, u8>) {
    loop {
        let mut changed = false;
        for &id in order {
            if levels.contains_key(&id) {
                continue;
            }
            if let Some(level) = inferred_level(id, graph, levels) {
                levels.insert(id, level);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

fn inferred_level(
    id: PersonId,
    graph: &RelationshipGraph,
    levels: &BTreeMap<PersonId, u8>,
) -> Option<u8> {
    let known = |ids: &[PersonId]| -> Vec<u8> {
        ids.iter().filter_map(|other| levels.get(other).copied()).collect()
    };
    let related = |map: &BTreeMap<PersonId, Vec<PersonId>>| -> Vec<u8> {
        map.get(&id).map(|ids| known(ids)).unwrap_or_default()
    };

    if let Some(level) = known(graph.parents_of(id)).into_iter().max() {
        return Some((level + 1).min(MAX_LEVEL));
    }
    if let Some(level) = related(graph.grandchild_grandparents()).into_iter().max() {
        return Some((level + 2).min(MAX_LEVEL));
    }
    if let Some(level) = known(graph.spouses_of(id)).into_iter().min() {
        return Some(level);
    }
    related(graph.grandparent_grandchildren())
        .into_iter()
        .filter(|&level| level >= CHILD_LEVEL)
        .min()
        .map(|level| level - 2)
}

/// If nobody sits in the child tier and none of the parent tier has
/// children, the roots were seeded one generation too high: shift
/// everyone above the child tier down by one.
fn collapse_two_generations(
    levels: &mut BTreeMap<PersonId, u8>,
    graph: &RelationshipGraph,
    diagnostics: &mut Diagnostics,
) -> bool {
    if levels.values().any(|&level| level == CHILD_LEVEL) {
        return false;
    }
    let parent_tier: Vec<PersonId> = levels
        .iter()
        .filter(|(_, level)| **level == PARENT_LEVEL)
        .map(|(&id, _)| id)
        .collect();
    if parent_tier.is_empty() || parent_tier.iter().any(|&id| graph.has_children(id)) {
        return false;
    }

    for level in levels.values_mut() {
        if *level < CHILD_LEVEL {
            *level += 1;
        }
    }
    diagnostics.info(
        "two_generation_collapse",
        format!(
            "two-generation family: {} people moved from the parent to the child tier",
            parent_tier.len()
        ),
    );
    true
}
