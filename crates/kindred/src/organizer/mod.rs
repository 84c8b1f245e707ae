//! Family organizer
//!
//! Classifies a family group into grandparent, parent, child and grandchild
//! tiers from explicit relationship edges, falling back to an age/gender
//! heuristic when the edges carry no generations.

mod family;
mod graph;
mod heuristic;
mod resolver;
mod roles;
mod validator;

pub use family::{ClassificationSource, OrganizedFamily};
pub use graph::RelationshipGraph;
pub use heuristic::{HeuristicClassification, HeuristicClassifier};
pub use resolver::{resolve_levels, Organizer};
pub use roles::{
    assignments_from_suggestions, suggest_roles, FamilyRole, RoleAssignments, RoleSuggestion,
};
pub use validator::{
    same_gender_parents, validate, validate_roles, ValidationError, ValidationErrorKind,
};
