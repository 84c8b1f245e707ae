//! Structure validator
//!
//! Detects impossible or suspicious configurations in an organized family
//! or in a set of editor-assigned roles. Findings are advisory values for
//! the caller to display; nothing here mutates a family. The one finding
//! with teeth is [`same_gender_parents`], which the resolver uses to
//! abandon relationship-based tiers.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{FamilyRole, OrganizedFamily, RelationshipGraph, RoleAssignments};
use crate::core::{Gender, Generation, Person, PersonId, RelationshipEdge, RelationshipType};

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    DuplicateRole,
    AgeConflict,
    GenderMismatch,
    ImpossibleRelationship,
    MissingRequired,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::DuplicateRole => write!(f, "duplicate_role"),
            ValidationErrorKind::AgeConflict => write!(f, "age_conflict"),
            ValidationErrorKind::GenderMismatch => write!(f, "gender_mismatch"),
            ValidationErrorKind::ImpossibleRelationship => write!(f, "impossible_relationship"),
            ValidationErrorKind::MissingRequired => write!(f, "missing_required"),
        }
    }
}

/// An advisory finding about a family structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub person_ids: Vec<PersonId>,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        message: impl Into<String>,
        person_ids: Vec<PersonId>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            person_ids,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

const UNIQUE_ROLE_HINT: &str = "only one person may hold this role";

fn role_name(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "father",
        Gender::Female => "mother",
        Gender::Other => "parent",
    }
}

/// Two or more parent-tier people who all share the same known gender
///
/// This is the one configuration that forces the resolver to discard
/// relationship-based tiers.
pub fn same_gender_parents(parents: &[&Person]) -> Option<ValidationError> {
    if parents.len() < 2 {
        return None;
    }
    let first = parents[0].gender?;
    if !parents.iter().all(|p| p.gender == Some(first)) {
        return None;
    }

    let ids = parents.iter().map(|p| p.id).collect();
    Some(
        ValidationError::new(
            ValidationErrorKind::DuplicateRole,
            format!(
                "{} people share the {} role in the parent generation",
                parents.len(),
                role_name(first)
            ),
            ids,
        )
        .with_suggestion(UNIQUE_ROLE_HINT),
    )
}

/// Validate a computed or edited family
pub fn validate(family: &OrganizedFamily) -> Vec<ValidationError> {
    let mut errors = duplicate_parent_genders(family.parents());
    for generation in Generation::ALL {
        if let Some(deeper) = generation.deeper() {
            errors.extend(age_conflicts(family.tier(generation), family.tier(deeper)));
        }
    }
    errors
}

fn duplicate_parent_genders(parents: &[Person]) -> Vec<ValidationError> {
    let mut by_gender: BTreeMap<u8, (Gender, Vec<PersonId>)> = BTreeMap::new();
    for person in parents {
        let Some(gender) = person.gender else {
            continue;
        };
        if gender == Gender::Other {
            continue;
        }
        let key = match gender {
            Gender::Male => 0,
            _ => 1,
        };
        by_gender
            .entry(key)
            .or_insert_with(|| (gender, Vec::new()))
            .1
            .push(person.id);
    }

    by_gender
        .into_values()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(gender, ids)| {
            ValidationError::new(
                ValidationErrorKind::DuplicateRole,
                format!("more than one {} in the parent generation", role_name(gender)),
                ids,
            )
            .with_suggestion(UNIQUE_ROLE_HINT)
        })
        .collect()
}

/// Members of the deeper tier who are not younger than members of the
/// shallower one. Unknown ages never conflict.
fn age_conflicts(shallower: &[Person], deeper: &[Person]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for elder in shallower.iter().filter(|p| p.has_positive_age()) {
        for younger in deeper {
            let Some(age) = younger.age else {
                continue;
            };
            if age >= elder.effective_age() {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::AgeConflict,
                        format!(
                            "{} (age {}) is not younger than {} (age {})",
                            younger.name,
                            age,
                            elder.name,
                            elder.effective_age()
                        ),
                        vec![elder.id, younger.id],
                    )
                    .with_suggestion("check both ages or move one of them to another generation"),
                );
            }
        }
    }
    errors
}

/// Validate editor-assigned roles against the people and their edges
///
/// Assignments for ids that are not among `people` are ignored.
pub fn validate_roles(
    people: &[Person],
    relationships: &[RelationshipEdge],
    roles: &RoleAssignments,
) -> Vec<ValidationError> {
    let by_id: HashMap<PersonId, &Person> = people.iter().map(|p| (p.id, p)).collect();
    let assigned: BTreeMap<PersonId, FamilyRole> = roles
        .iter()
        .filter(|(id, _)| by_id.contains_key(id))
        .collect();

    let mut errors = Vec::new();

    for role in [FamilyRole::Father, FamilyRole::Mother] {
        let holders: Vec<PersonId> = assigned
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(&id, _)| id)
            .collect();
        if holders.len() > 1 {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::DuplicateRole,
                    format!("{} people are assigned as {}", holders.len(), role),
                    holders,
                )
                .with_suggestion(UNIQUE_ROLE_HINT),
            );
        }
    }

    for (&id, &role) in &assigned {
        let (Some(required), Some(actual)) = (role.required_gender(), by_id[&id].gender) else {
            continue;
        };
        if required != actual {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::GenderMismatch,
                    format!(
                        "{} is recorded as {} but assigned as {}",
                        by_id[&id].name, actual, role
                    ),
                    vec![id],
                )
                .with_suggestion(format!("use the {} role instead", role.neutral())),
            );
        }
    }

    errors.extend(impossible_relationships(relationships, &assigned, &by_id));
    errors.extend(missing_required(&assigned));

    let tiers = |generation: Generation| -> Vec<Person> {
        assigned
            .iter()
            .filter(|(_, role)| role.generation() == generation)
            .map(|(id, _)| by_id[id].clone())
            .collect()
    };
    for generation in Generation::ALL {
        if let Some(deeper) = generation.deeper() {
            errors.extend(age_conflicts(&tiers(generation), &tiers(deeper)));
        }
    }

    errors
}

fn impossible_relationships(
    relationships: &[RelationshipEdge],
    assigned: &BTreeMap<PersonId, FamilyRole>,
    by_id: &HashMap<PersonId, &Person>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for edge in relationships.iter().filter(|e| e.is_active) {
        if edge.person_a == edge.person_b && by_id.contains_key(&edge.person_a) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::ImpossibleRelationship,
                    format!(
                        "person {} has a {} relationship with themselves",
                        edge.person_a, edge.relationship_type
                    ),
                    vec![edge.person_a],
                )
                .with_suggestion("remove the relationship"),
            );
        }
    }

    let known = by_id.keys().copied().collect();
    let graph = RelationshipGraph::build(relationships, &known);
    let links = graph
        .parent_children()
        .iter()
        .flat_map(|(&elder, kids)| kids.iter().map(move |&kid| (elder, kid, RelationshipType::Parent)))
        .chain(graph.grandparent_grandchildren().iter().flat_map(|(&elder, kids)| {
            kids.iter()
                .map(move |&kid| (elder, kid, RelationshipType::Grandparent))
        }));

    for (elder, younger, kind) in links {
        let (Some(elder_role), Some(younger_role)) = (assigned.get(&elder), assigned.get(&younger))
        else {
            continue;
        };
        if elder_role.generation() >= younger_role.generation() {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::ImpossibleRelationship,
                    format!(
                        "{} is recorded as {} of {} but assigned as {} while they are {}",
                        by_id[&elder].name,
                        kind,
                        by_id[&younger].name,
                        elder_role,
                        younger_role
                    ),
                    vec![elder, younger],
                )
                .with_suggestion("assign the older person to a higher generation"),
            );
        }
    }

    errors
}

fn missing_required(assigned: &BTreeMap<PersonId, FamilyRole>) -> Vec<ValidationError> {
    let in_generation = |generation: Generation| -> Vec<PersonId> {
        assigned
            .iter()
            .filter(|(_, role)| role.generation() == generation)
            .map(|(&id, _)| id)
            .collect()
    };

    let mut errors = Vec::new();
    let children = in_generation(Generation::Child);
    if !children.is_empty() && in_generation(Generation::Parent).is_empty() {
        errors.push(
            ValidationError::new(
                ValidationErrorKind::MissingRequired,
                "children are assigned but nobody is assigned as a parent",
                children.clone(),
            )
            .with_suggestion("assign a father, mother or parent"),
        );
    }

    let grandchildren = in_generation(Generation::Grandchild);
    if !grandchildren.is_empty() && children.is_empty() {
        errors.push(
            ValidationError::new(
                ValidationErrorKind::MissingRequired,
                "grandchildren are assigned but nobody is assigned as a child",
                grandchildren,
            )
            .with_suggestion("assign the grandchildren's parents as children"),
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organizer::Organizer;

    fn person(id: i64, age: u32, gender: Gender) -> Person {
        Person::new(id, format!("P{}", id))
            .with_age(age)
            .with_gender(gender)
    }

    #[test]
    fn test_same_gender_parents_detected() {
        let a = person(1, 40, Gender::Male);
        let b = person(2, 38, Gender::Male);
        let error = same_gender_parents(&[&a, &b]).unwrap();
        assert_eq!(error.kind, ValidationErrorKind::DuplicateRole);
        assert_eq!(error.person_ids, vec![PersonId(1), PersonId(2)]);
        assert_eq!(error.suggestion.as_deref(), Some(UNIQUE_ROLE_HINT));
    }

    #[test]
    fn test_same_gender_parents_needs_known_genders() {
        let a = person(1, 40, Gender::Male);
        let b = Person::new(2, "Unknown").with_age(38);
        assert!(same_gender_parents(&[&a, &b]).is_none());
        assert!(same_gender_parents(&[&a]).is_none());

        let c = person(3, 37, Gender::Female);
        assert!(same_gender_parents(&[&a, &c]).is_none());
    }

    #[test]
    fn test_validate_reports_age_conflict() {
        let people = vec![
            person(1, 30, Gender::Female),
            person(2, 35, Gender::Male),
        ];
        let edges = vec![RelationshipEdge::parent(1, 2)];
        let family = Organizer::new().organize(&people, &edges);

        let errors = validate(&family);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::AgeConflict);
        assert_eq!(errors[0].person_ids, vec![PersonId(1), PersonId(2)]);
    }

    #[test]
    fn test_validate_clean_family() {
        let people = vec![
            person(1, 45, Gender::Male),
            person(2, 42, Gender::Female),
            person(3, 15, Gender::Male),
        ];
        let family = Organizer::new().organize(&people, &[]);
        assert!(validate(&family).is_empty());
    }

    #[test]
    fn test_role_duplicate_and_gender_mismatch() {
        let people = vec![
            person(1, 45, Gender::Male),
            person(2, 44, Gender::Female),
        ];
        let roles = RoleAssignments::new()
            .with(1, FamilyRole::Father)
            .with(2, FamilyRole::Father);

        let errors = validate_roles(&people, &[], &roles);
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateRole));
        assert!(kinds.contains(&ValidationErrorKind::GenderMismatch));

        let mismatch = errors
            .iter()
            .find(|e| e.kind == ValidationErrorKind::GenderMismatch)
            .unwrap();
        assert_eq!(mismatch.person_ids, vec![PersonId(2)]);
    }

    #[test]
    fn test_role_contradicting_edge_is_impossible() {
        let people = vec![person(1, 60, Gender::Female), person(2, 30, Gender::Male)];
        let edges = vec![RelationshipEdge::parent(1, 2)];
        let roles = RoleAssignments::new()
            .with(1, FamilyRole::Child)
            .with(2, FamilyRole::Father);

        let errors = validate_roles(&people, &edges, &roles);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ImpossibleRelationship
                && e.person_ids == vec![PersonId(1), PersonId(2)]));
    }

    #[test]
    fn test_self_edge_is_impossible() {
        let people = vec![person(1, 60, Gender::Female)];
        let edges = vec![RelationshipEdge::parent(1, 1)];
        let errors = validate_roles(&people, &edges, &RoleAssignments::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ImpossibleRelationship);
    }

    #[test]
    fn test_children_without_parents_missing_required() {
        let people = vec![person(1, 10, Gender::Female), person(2, 8, Gender::Male)];
        let roles = RoleAssignments::new()
            .with(1, FamilyRole::Child)
            .with(2, FamilyRole::Grandchild);

        let errors = validate_roles(&people, &[], &roles);
        let missing: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::MissingRequired)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].person_ids, vec![PersonId(1)]);
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::new(
            ValidationErrorKind::AgeConflict,
            "too old",
            vec![PersonId(1)],
        )
        .with_suggestion("fix it");
        assert_eq!(error.to_string(), "age_conflict: too old (fix it)");
    }
}
