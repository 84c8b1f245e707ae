//! Core type definitions for family organization
//!
//! This module contains the fundamental types used throughout Kindred:
//! people, typed relationship edges, generation tiers, and the input
//! document exchanged with the CLI and WASM surfaces.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::KindredError;

/// Stable identifier of a person supplied by the directory service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl PersonId {
    /// Returns true if this id can take part in classification.
    ///
    /// Directory records without a real id arrive as zero or negative
    /// placeholders and are filtered out before organizing.
    pub fn is_usable(&self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for PersonId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recorded gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

/// A person as supplied by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable identifier
    pub id: PersonId,
    /// Display name
    pub name: String,
    /// Age in years; `None` means unknown and sorts as youngest
    #[serde(default)]
    pub age: Option<u32>,
    /// Recorded gender, if any
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Person {
    /// Create a person with unknown age and gender
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Age used for comparisons, with unknown ages counted as zero
    pub fn effective_age(&self) -> u32 {
        self.age.unwrap_or(0)
    }

    /// Returns true if the person has a known, positive age
    pub fn has_positive_age(&self) -> bool {
        self.effective_age() > 0
    }

    /// Returns true if both genders are recorded and they differ
    pub fn differs_in_gender(&self, other: &Person) -> bool {
        matches!((self.gender, other.gender), (Some(a), Some(b)) if a != b)
    }
}

/// Kind of pairwise relationship between two people
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// A is a parent of B
    Parent,
    /// A is a child of B
    Child,
    Spouse,
    Sibling,
    /// A is a grandparent of B
    Grandparent,
    /// A is a grandchild of B
    Grandchild,
    AuntUncle,
    NieceNephew,
    Cousin,
    Other,
}

impl RelationshipType {
    /// Returns true if this type carries generational structure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RelationshipType::Parent
                | RelationshipType::Child
                | RelationshipType::Grandparent
                | RelationshipType::Grandchild
        )
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipType::Parent => "parent",
            RelationshipType::Child => "child",
            RelationshipType::Spouse => "spouse",
            RelationshipType::Sibling => "sibling",
            RelationshipType::Grandparent => "grandparent",
            RelationshipType::Grandchild => "grandchild",
            RelationshipType::AuntUncle => "aunt_uncle",
            RelationshipType::NieceNephew => "niece_nephew",
            RelationshipType::Cousin => "cousin",
            RelationshipType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

fn default_active() -> bool {
    true
}

/// A typed, ordered relationship between two people
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub relationship_type: RelationshipType,
    /// Inactive edges are kept by the directory but ignored here
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RelationshipEdge {
    /// Create an active edge
    pub fn new(
        person_a: impl Into<PersonId>,
        person_b: impl Into<PersonId>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            person_a: person_a.into(),
            person_b: person_b.into(),
            relationship_type,
            is_active: true,
            notes: None,
        }
    }

    /// `parent` is a parent of `child`
    pub fn parent(parent: impl Into<PersonId>, child: impl Into<PersonId>) -> Self {
        Self::new(parent, child, RelationshipType::Parent)
    }

    pub fn spouse(a: impl Into<PersonId>, b: impl Into<PersonId>) -> Self {
        Self::new(a, b, RelationshipType::Spouse)
    }

    /// `grandparent` is a grandparent of `grandchild`
    pub fn grandparent(
        grandparent: impl Into<PersonId>,
        grandchild: impl Into<PersonId>,
    ) -> Self {
        Self::new(grandparent, grandchild, RelationshipType::Grandparent)
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Generation tier of a person within an organized family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    Grandparent,
    Parent,
    Child,
    Grandchild,
}

impl Generation {
    /// All tiers, shallowest first
    pub const ALL: [Generation; 4] = [
        Generation::Grandparent,
        Generation::Parent,
        Generation::Child,
        Generation::Grandchild,
    ];

    /// Integer level: 0 grandparent through 3 grandchild
    pub fn level(&self) -> u8 {
        match self {
            Generation::Grandparent => 0,
            Generation::Parent => 1,
            Generation::Child => 2,
            Generation::Grandchild => 3,
        }
    }

    /// Tier for a level; levels past the deepest tier clamp to grandchild
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Generation::Grandparent,
            1 => Generation::Parent,
            2 => Generation::Child,
            _ => Generation::Grandchild,
        }
    }

    /// The next deeper tier, if any
    pub fn deeper(&self) -> Option<Self> {
        match self {
            Generation::Grandparent => Some(Generation::Parent),
            Generation::Parent => Some(Generation::Child),
            Generation::Child => Some(Generation::Grandchild),
            Generation::Grandchild => None,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Grandparent => write!(f, "grandparent"),
            Generation::Parent => write!(f, "parent"),
            Generation::Child => write!(f, "child"),
            Generation::Grandchild => write!(f, "grandchild"),
        }
    }
}

/// People and relationships of one family group, as exchanged in JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyInput {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<RelationshipEdge>,
}

impl FamilyInput {
    pub fn new(people: Vec<Person>, relationships: Vec<RelationshipEdge>) -> Self {
        Self {
            people,
            relationships,
        }
    }

    /// Parse a family document from JSON
    pub fn from_json(input: &str) -> Result<Self, KindredError> {
        serde_json::from_str(input).map_err(|e| KindredError::input_error(e.to_string()))
    }
}
