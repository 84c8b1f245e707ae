//! Kindred - organize a family group into generations and lay it out as a tree
//!
//! Given people loosely associated with a family group plus optional typed
//! relationships between them, Kindred infers a consistent grandparent /
//! parent / child / grandchild structure and turns it into node positions and
//! connections ready for drawing.
//!
//! # Quick Start
//!
//! ```rust
//! use kindred::{layout, organize, DragOffsets, Gender, Person, RelationshipEdge};
//!
//! let people = vec![
//!     Person::new(1, "Ada").with_age(44).with_gender(Gender::Female),
//!     Person::new(2, "Ben").with_age(46).with_gender(Gender::Male),
//!     Person::new(3, "Cal").with_age(12),
//! ];
//! let relationships = vec![
//!     RelationshipEdge::parent(1, 3),
//!     RelationshipEdge::parent(2, 3),
//!     RelationshipEdge::spouse(1, 2),
//! ];
//!
//! let family = organize(&people, &relationships);
//! assert_eq!(family.parents().len(), 2);
//! assert_eq!(family.children().len(), 1);
//!
//! let tree = layout(&family, 800.0, false, &DragOffsets::new());
//! assert_eq!(tree.positions.len(), 3);
//! assert_eq!(tree.connections.len(), 3);
//! ```
//!
//! # Advanced Usage
//!
//! Thresholds, diagnostics and manual roles go through the components:
//!
//! ```rust
//! use kindred::prelude::*;
//!
//! let people = vec![
//!     Person::new(1, "Gran").with_age(71),
//!     Person::new(2, "Dee").with_age(40),
//! ];
//! let roles = RoleAssignments::new().with(1, FamilyRole::Grandparent);
//!
//! let mut diagnostics = Diagnostics::new();
//! let family = Organizer::with_config(OrganizerConfig::default())
//!     .organize_with_roles(&people, &[], &roles, &mut diagnostics);
//!
//! assert_eq!(family.grandparents().len(), 1);
//! assert!(validate(&family).is_empty());
//! ```

pub mod core;
pub mod organizer;
pub mod tree;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use crate::core::*;
pub use organizer::{
    validate, validate_roles, ClassificationSource, FamilyRole, OrganizedFamily, Organizer,
    RoleAssignments, ValidationError, ValidationErrorKind,
};
pub use tree::{
    Connection, ConnectionKind, DragOffset, DragOffsets, Point, PositionedNode, TreeLayout,
    TreeLayoutAlgorithm,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Diagnostics, FamilyInput, Gender, Generation, KindredConfig, LayoutConfig,
        OrganizerConfig, Person, PersonId, RelationshipEdge, RelationshipType,
    };
    pub use crate::organizer::{
        suggest_roles, validate, validate_roles, FamilyRole, OrganizedFamily, Organizer,
        RoleAssignments,
    };
    pub use crate::tree::{DragOffset, DragOffsets, TreeLayout, TreeLayoutAlgorithm};
}

/// Organize people into generation tiers with the default thresholds
///
/// People without a usable id are left out and relationships that reference
/// unknown people are ignored. This never fails: inconsistent data produces
/// a best-effort structure which [`validate`] can report on.
///
/// # Example
/// ```rust
/// use kindred::{organize, Gender, Person};
///
/// let family = organize(
///     &[
///         Person::new(1, "Ann").with_age(40).with_gender(Gender::Female),
///         Person::new(2, "Bo").with_age(10).with_gender(Gender::Male),
///     ],
///     &[],
/// );
/// assert_eq!(family.parents()[0].name, "Ann");
/// assert_eq!(family.children()[0].name, "Bo");
/// ```
pub fn organize(people: &[Person], relationships: &[RelationshipEdge]) -> OrganizedFamily {
    Organizer::new().organize(people, relationships)
}

/// Lay out an organized family with the default layout constants
///
/// `drag_offsets` is only read: the returned base positions never depend on
/// it, while each node's current position and every connection do.
pub fn layout(
    organized: &OrganizedFamily,
    container_width: f64,
    multi_row: bool,
    drag_offsets: &DragOffsets,
) -> TreeLayout {
    TreeLayoutAlgorithm::new().layout(organized, container_width, multi_row, drag_offsets)
}
