//! Connection deriver
//!
//! Turns the organized family's adjacency maps into renderable lines between
//! the current (dragged) node positions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

use super::layout::{Point, PositionedNode};
use crate::core::{LayoutConfig, PersonId};
use crate::organizer::OrganizedFamily;

/// Rendering style of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionKind {
    ParentChild,
    Spouse,
    /// Synthesized between the two parents when no edges were recorded
    SpouseConnection,
    GrandparentGrandchild,
}

impl ConnectionKind {
    /// Drawn side by side rather than top to bottom
    pub fn is_horizontal(&self) -> bool {
        matches!(self, ConnectionKind::Spouse | ConnectionKind::SpouseConnection)
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionKind::ParentChild => "parent-child",
            ConnectionKind::Spouse => "spouse",
            ConnectionKind::SpouseConnection => "spouse-connection",
            ConnectionKind::GrandparentGrandchild => "grandparent-grandchild",
        };
        write!(f, "{}", name)
    }
}

/// A line between two positioned people
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: PersonId,
    pub to: PersonId,
    pub from_point: Point,
    pub to_point: Point,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
}

struct Anchors<'a> {
    positions: HashMap<PersonId, Point>,
    config: &'a LayoutConfig,
}

impl Anchors<'_> {
    /// End points for a connection, or None if either side is not positioned
    fn connect(&self, from: PersonId, to: PersonId, kind: ConnectionKind) -> Option<Connection> {
        let (a, b) = (*self.positions.get(&from)?, *self.positions.get(&to)?);
        let (w, h) = (self.config.node_width, self.config.node_height);

        let (from_point, to_point) = if kind.is_horizontal() {
            let mid_a = a.y + h / 2.0;
            let mid_b = b.y + h / 2.0;
            if a.x <= b.x {
                (Point::new(a.x + w, mid_a), Point::new(b.x, mid_b))
            } else {
                (Point::new(a.x, mid_a), Point::new(b.x + w, mid_b))
            }
        } else {
            // Elder's bottom edge to the younger's top edge
            (Point::new(a.x + w / 2.0, a.y + h), Point::new(b.x + w / 2.0, b.y))
        };

        Some(Connection {
            from,
            to,
            from_point,
            to_point,
            kind,
        })
    }
}

/// Derive every connection for a laid-out family
///
/// Connections with an unpositioned end are skipped. When no parent-child
/// pair could be drawn but both a parent and a child tier exist, every
/// parent is connected to every child so the tree is never visually
/// disconnected.
pub fn derive_connections(
    family: &OrganizedFamily,
    positions: &[PositionedNode],
    config: &LayoutConfig,
) -> Vec<Connection> {
    let anchors = Anchors {
        positions: positions
            .iter()
            .map(|node| (node.person_id, node.position()))
            .collect(),
        config,
    };
    let mut connections = Vec::new();

    for (&parent, children) in family.parent_child_map() {
        connections.extend(
            children
                .iter()
                .filter_map(|&child| anchors.connect(parent, child, ConnectionKind::ParentChild)),
        );
    }
    let has_parent_child = !connections.is_empty();

    for (a, b) in family.graph().spouse_pairs() {
        connections.extend(anchors.connect(a, b, ConnectionKind::Spouse));
    }

    for (&grandparent, grandchildren) in family.grandparent_map() {
        connections.extend(grandchildren.iter().filter_map(|&grandchild| {
            anchors.connect(grandparent, grandchild, ConnectionKind::GrandparentGrandchild)
        }));
    }

    if !has_parent_child && !family.parents().is_empty() && !family.children().is_empty() {
        trace!("No recorded parent-child links, connecting the parent tier to the child tier");
        for parent in family.parents() {
            connections.extend(family.children().iter().filter_map(|child| {
                anchors.connect(parent.id, child.id, ConnectionKind::ParentChild)
            }));
        }

        if let [first, second] = family.parents() {
            let already_spouses = family.graph().spouses_of(first.id).contains(&second.id);
            if !already_spouses {
                connections.extend(anchors.connect(
                    first.id,
                    second.id,
                    ConnectionKind::SpouseConnection,
                ));
            }
        }
    }

    debug!(count = connections.len(), "Derived connections");
    connections
}
