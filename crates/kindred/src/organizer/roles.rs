//! Editor-assigned family roles
//!
//! Grandparent and grandchild tiers are never inferred from age alone. They
//! come from explicit relationship edges or from an editor assigning roles
//! by hand, which this module models. It also produces role suggestions to
//! pre-fill such an editor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, span, Level};

use super::{ClassificationSource, OrganizedFamily, Organizer};
use crate::core::{
    Diagnostics, Gender, Generation, KindredError, OrganizerConfig, Person, PersonId,
    RelationshipEdge,
};

/// A role an editor can assign to a family member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyRole {
    Grandfather,
    Grandmother,
    Grandparent,
    Father,
    Mother,
    Parent,
    Child,
    Grandchild,
}

impl FamilyRole {
    /// Tier this role places a person in
    pub fn generation(&self) -> Generation {
        match self {
            FamilyRole::Grandfather | FamilyRole::Grandmother | FamilyRole::Grandparent => {
                Generation::Grandparent
            }
            FamilyRole::Father | FamilyRole::Mother | FamilyRole::Parent => Generation::Parent,
            FamilyRole::Child => Generation::Child,
            FamilyRole::Grandchild => Generation::Grandchild,
        }
    }

    /// Gender the role implies, if any
    pub fn required_gender(&self) -> Option<Gender> {
        match self {
            FamilyRole::Grandfather | FamilyRole::Father => Some(Gender::Male),
            FamilyRole::Grandmother | FamilyRole::Mother => Some(Gender::Female),
            _ => None,
        }
    }

    /// The gender-neutral role of the same tier
    pub fn neutral(&self) -> FamilyRole {
        match self.generation() {
            Generation::Grandparent => FamilyRole::Grandparent,
            Generation::Parent => FamilyRole::Parent,
            Generation::Child => FamilyRole::Child,
            Generation::Grandchild => FamilyRole::Grandchild,
        }
    }
}

impl fmt::Display for FamilyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FamilyRole::Grandfather => "grandfather",
            FamilyRole::Grandmother => "grandmother",
            FamilyRole::Grandparent => "grandparent",
            FamilyRole::Father => "father",
            FamilyRole::Mother => "mother",
            FamilyRole::Parent => "parent",
            FamilyRole::Child => "child",
            FamilyRole::Grandchild => "grandchild",
        };
        write!(f, "{}", name)
    }
}

/// Sparse map of person id to assigned role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAssignments {
    roles: BTreeMap<PersonId, FamilyRole>,
}

impl RoleAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment
    pub fn with(mut self, id: impl Into<PersonId>, role: FamilyRole) -> Self {
        self.assign(id, role);
        self
    }

    /// Assign a role, replacing any previous one
    pub fn assign(&mut self, id: impl Into<PersonId>, role: FamilyRole) -> Option<FamilyRole> {
        self.roles.insert(id.into(), role)
    }

    pub fn remove(&mut self, id: PersonId) -> Option<FamilyRole> {
        self.roles.remove(&id)
    }

    pub fn get(&self, id: PersonId) -> Option<FamilyRole> {
        self.roles.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonId, FamilyRole)> + '_ {
        self.roles.iter().map(|(&id, &role)| (id, role))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Parse assignments from a JSON object keyed by person id
    pub fn from_json(input: &str) -> Result<Self, KindredError> {
        serde_json::from_str(input).map_err(|e| KindredError::input_error(e.to_string()))
    }
}

impl FromIterator<(PersonId, FamilyRole)> for RoleAssignments {
    fn from_iter<I: IntoIterator<Item = (PersonId, FamilyRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

impl Organizer {
    /// Organize, then let assigned roles override the resolved tiers
    ///
    /// People without an assignment keep their automatic tier. The result is
    /// not validated; pass the same roles to
    /// [`validate_roles`](super::validate_roles) to show issues.
    pub fn organize_with_roles(
        &self,
        people: &[Person],
        relationships: &[RelationshipEdge],
        roles: &RoleAssignments,
        diagnostics: &mut Diagnostics,
    ) -> OrganizedFamily {
        let roles_span = span!(Level::INFO, "organize_with_roles", assigned = roles.len());
        let _enter = roles_span.enter();

        let automatic = self.organize_with_diagnostics(people, relationships, diagnostics);
        if roles.is_empty() {
            return automatic;
        }

        let mut levels = automatic.generation_levels().clone();
        let mut applied = 0;
        for (id, role) in roles.iter() {
            if let Some(level) = levels.get_mut(&id) {
                *level = role.generation();
                applied += 1;
            }
        }
        debug!(applied, "Applied manual roles");
        diagnostics.info(
            "manual_roles",
            format!("{} of {} assigned roles applied", applied, roles.len()),
        );

        let members = Self::usable_members(people, &mut Diagnostics::new());
        let family = OrganizedFamily::assemble(
            &members,
            levels,
            automatic.graph().clone(),
            ClassificationSource::ManualRoles,
        );
        Self::assert_disjoint(&family);
        family
    }
}

/// A proposed role for one person, with the reason behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSuggestion {
    pub person_id: PersonId,
    pub role: FamilyRole,
    pub reason: String,
}

/// Suggest roles from ages and genders alone
///
/// Anyone at or above `suggestion_parent_min_age` is suggested as a parent:
/// the first man as father, the first woman as mother, everyone else as a
/// plain parent. Younger people and people of unknown age are suggested as
/// children.
pub fn suggest_roles(people: &[Person], config: &OrganizerConfig) -> Vec<RoleSuggestion> {
    let mut has_father = false;
    let mut has_mother = false;

    people
        .iter()
        .filter(|p| p.id.is_usable())
        .map(|person| {
            let (role, reason) = match person.age {
                Some(age) if age >= config.suggestion_parent_min_age => {
                    let role = match person.gender {
                        Some(Gender::Male) if !has_father => {
                            has_father = true;
                            FamilyRole::Father
                        }
                        Some(Gender::Female) if !has_mother => {
                            has_mother = true;
                            FamilyRole::Mother
                        }
                        _ => FamilyRole::Parent,
                    };
                    (
                        role,
                        format!("age {} is at least {}", age, config.suggestion_parent_min_age),
                    )
                }
                Some(age) => (
                    FamilyRole::Child,
                    format!("age {} is below {}", age, config.suggestion_parent_min_age),
                ),
                None => (FamilyRole::Child, "age unknown".to_string()),
            };
            RoleSuggestion {
                person_id: person.id,
                role,
                reason,
            }
        })
        .collect()
}

/// Turn accepted suggestions into assignments
pub fn assignments_from_suggestions(suggestions: &[RoleSuggestion]) -> RoleAssignments {
    suggestions.iter().map(|s| (s.person_id, s.role)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_generations() {
        assert_eq!(FamilyRole::Grandmother.generation(), Generation::Grandparent);
        assert_eq!(FamilyRole::Father.generation(), Generation::Parent);
        assert_eq!(FamilyRole::Grandchild.generation(), Generation::Grandchild);
        assert_eq!(FamilyRole::Mother.neutral(), FamilyRole::Parent);
        assert_eq!(FamilyRole::Father.required_gender(), Some(Gender::Male));
        assert_eq!(FamilyRole::Child.required_gender(), None);
    }

    #[test]
    fn test_assignments_from_json() {
        let roles = RoleAssignments::from_json(r#"{"1": "grandfather", "4": "child"}"#).unwrap();
        assert_eq!(roles.get(PersonId(1)), Some(FamilyRole::Grandfather));
        assert_eq!(roles.get(PersonId(4)), Some(FamilyRole::Child));
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn test_assign_replaces() {
        let mut roles = RoleAssignments::new();
        assert_eq!(roles.assign(1, FamilyRole::Child), None);
        assert_eq!(roles.assign(1, FamilyRole::Parent), Some(FamilyRole::Child));
        assert_eq!(roles.remove(PersonId(1)), Some(FamilyRole::Parent));
        assert!(roles.is_empty());
    }

    #[test]
    fn test_manual_roles_place_grandparents() {
        let people = vec![
            Person::new(1, "Grandma").with_age(70).with_gender(Gender::Female),
            Person::new(2, "Dad").with_age(40).with_gender(Gender::Male),
            Person::new(3, "Kid").with_age(10),
        ];
        let roles = RoleAssignments::new().with(1, FamilyRole::Grandmother);
        let mut diagnostics = Diagnostics::new();

        let family =
            Organizer::new().organize_with_roles(&people, &[], &roles, &mut diagnostics);

        assert_eq!(family.source(), ClassificationSource::ManualRoles);
        assert_eq!(family.grandparents()[0].id, PersonId(1));
        assert_eq!(family.parents()[0].id, PersonId(2));
        assert_eq!(family.children()[0].id, PersonId(3));
        assert!(diagnostics.has_code("manual_roles"));
    }

    #[test]
    fn test_roles_for_unknown_people_are_ignored() {
        let people = vec![Person::new(1, "Solo").with_age(30)];
        let roles = RoleAssignments::new().with(42, FamilyRole::Grandchild);
        let family = Organizer::new().organize_with_roles(
            &people,
            &[],
            &roles,
            &mut Diagnostics::new(),
        );
        assert_eq!(family.len(), 1);
        assert_eq!(family.parents().len(), 1);
    }

    #[test]
    fn test_suggestions() {
        let people = vec![
            Person::new(1, "A").with_age(50).with_gender(Gender::Male),
            Person::new(2, "B").with_age(48).with_gender(Gender::Male),
            Person::new(3, "C").with_age(47).with_gender(Gender::Female),
            Person::new(4, "D").with_age(24),
            Person::new(5, "E"),
        ];
        let suggestions = suggest_roles(&people, &OrganizerConfig::default());
        let roles: Vec<_> = suggestions.iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                FamilyRole::Father,
                FamilyRole::Parent,
                FamilyRole::Mother,
                FamilyRole::Child,
                FamilyRole::Child,
            ]
        );
        assert_eq!(suggestions[4].reason, "age unknown");

        let assignments = assignments_from_suggestions(&suggestions);
        assert_eq!(assignments.get(PersonId(3)), Some(FamilyRole::Mother));
    }
}
