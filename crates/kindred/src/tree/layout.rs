//! Tree layout engine
//!
//! Places each generation tier on its own horizontally centered row, top
//! down from grandparents to grandchildren. A large child tier can be packed
//! into a near-square grid. Manual drag offsets are kept in a separate
//! overlay and only added when positions are read, so the base layout is
//! always a pure function of the family, the width and the multi-row flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, span, trace, Level};

use super::connections::{derive_connections, Connection};
use crate::core::{Generation, KindredError, LayoutConfig, PersonId};
use crate::organizer::OrganizedFamily;

/// A 2-D coordinate in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This point moved by a drag offset
    pub fn offset_by(self, offset: DragOffset) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }
}

/// Manual adjustment of one node's rendered position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DragOffset {
    pub dx: f64,
    pub dy: f64,
}

impl DragOffset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Session-local drag offsets, layered over the base layout
///
/// The overlay remembers the family composition it was last synced with and
/// forgets every offset once someone joins or leaves, since all rows are
/// re-centered at that point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<PersonId, DragOffset>",
    into = "BTreeMap<PersonId, DragOffset>"
)]
pub struct DragOffsets {
    offsets: BTreeMap<PersonId, DragOffset>,
    composition: Option<Vec<PersonId>>,
}

impl DragOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse offsets from a JSON object keyed by person id
    pub fn from_json(input: &str) -> Result<Self, KindredError> {
        serde_json::from_str(input).map_err(|e| KindredError::input_error(e.to_string()))
    }

    /// Set the offset of one person, replacing any previous one
    pub fn set(&mut self, id: impl Into<PersonId>, offset: DragOffset) {
        self.offsets.insert(id.into(), offset);
    }

    /// Add a drag delta to whatever offset the person already has
    pub fn nudge(&mut self, id: impl Into<PersonId>, dx: f64, dy: f64) {
        let offset = self.offsets.entry(id.into()).or_default();
        offset.dx += dx;
        offset.dy += dy;
    }

    pub fn get(&self, id: PersonId) -> Option<DragOffset> {
        self.offsets.get(&id).copied()
    }

    pub fn remove(&mut self, id: PersonId) -> Option<DragOffset> {
        self.offsets.remove(&id)
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonId, DragOffset)> + '_ {
        self.offsets.iter().map(|(&id, &offset)| (id, offset))
    }

    /// Track the family composition, dropping all offsets when it changed
    /// since the previous sync. Returns true if offsets were dropped.
    pub fn sync_composition(&mut self, family: &OrganizedFamily) -> bool {
        let composition = family.composition();
        let changed = self
            .composition
            .as_ref()
            .is_some_and(|previous| *previous != composition);

        if changed && !self.offsets.is_empty() {
            debug!(dropped = self.offsets.len(), "Family composition changed, resetting drag offsets");
            self.offsets.clear();
        }
        self.composition = Some(composition);
        changed
    }
}

impl From<BTreeMap<PersonId, DragOffset>> for DragOffsets {
    fn from(offsets: BTreeMap<PersonId, DragOffset>) -> Self {
        Self {
            offsets,
            composition: None,
        }
    }
}

impl From<DragOffsets> for BTreeMap<PersonId, DragOffset> {
    fn from(overlay: DragOffsets) -> Self {
        overlay.offsets
    }
}

/// A person's place in the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub person_id: PersonId,
    pub generation: Generation,
    /// Visual row, counted from the top
    pub row: usize,
    /// Computed position of the node's top-left corner
    pub base: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<DragOffset>,
}

impl PositionedNode {
    /// Current position: base plus any drag offset
    pub fn position(&self) -> Point {
        match self.offset {
            Some(offset) => self.base.offset_by(offset),
            None => self.base,
        }
    }
}

/// Complete layout of one family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    pub positions: Vec<PositionedNode>,
    pub connections: Vec<Connection>,
    pub container_width: f64,
    pub container_height: f64,
}

impl TreeLayout {
    pub fn node(&self, id: PersonId) -> Option<&PositionedNode> {
        self.positions.iter().find(|node| node.person_id == id)
    }

    /// Current (dragged) position of a person
    pub fn position_of(&self, id: PersonId) -> Option<Point> {
        self.node(id).map(PositionedNode::position)
    }
}

/// Base layout before drag offsets and connections
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayout {
    pub nodes: Vec<PositionedNode>,
    pub container_width: f64,
    pub container_height: f64,
}

/// Generation-row layout algorithm
#[derive(Debug, Clone, Default)]
pub struct TreeLayoutAlgorithm {
    config: LayoutConfig,
}

impl TreeLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the family, overlay drag offsets and derive connections
    pub fn layout(
        &self,
        family: &OrganizedFamily,
        container_width: f64,
        multi_row: bool,
        drag_offsets: &DragOffsets,
    ) -> TreeLayout {
        let layout_span = span!(
            Level::INFO,
            "layout_tree",
            members = family.len(),
            container_width,
            multi_row,
            dragged = drag_offsets.len()
        );
        let _enter = layout_span.enter();

        let base = self.compute_base(family, container_width, multi_row);
        let positions: Vec<PositionedNode> = base
            .nodes
            .into_iter()
            .map(|node| PositionedNode {
                offset: drag_offsets.get(node.person_id),
                ..node
            })
            .collect();
        let connections = derive_connections(family, &positions, &self.config);

        debug!(
            nodes = positions.len(),
            connections = connections.len(),
            height = base.container_height,
            "Tree layout complete"
        );
        TreeLayout {
            positions,
            connections,
            container_width: base.container_width,
            container_height: base.container_height,
        }
    }

    /// Compute base positions only; drag offsets never influence this
    pub fn compute_base(
        &self,
        family: &OrganizedFamily,
        container_width: f64,
        multi_row: bool,
    ) -> BaseLayout {
        let container_width = container_width.max(0.0);
        let mut nodes = Vec::with_capacity(family.len());
        let mut widest_row: f64 = 0.0;
        let mut row = 0;
        let mut y = self.config.padding;
        let mut last_row_y = None;

        for (generation, members) in family.tiers() {
            let rows = self.pack_rows(generation, members.len(), multi_row);
            trace!(%generation, members = members.len(), rows = rows.len(), "Placing tier");

            let mut members = members.iter();
            for (tier_row, &count) in rows.iter().enumerate() {
                let row_y = y + tier_row as f64 * self.config.child_row_spacing;
                let start = self.row_start(count, container_width);
                widest_row = widest_row.max(self.row_width(count));

                for (i, person) in members.by_ref().take(count).enumerate() {
                    nodes.push(PositionedNode {
                        person_id: person.id,
                        generation,
                        row,
                        base: Point::new(start + i as f64 * self.column_step(), row_y),
                        offset: None,
                    });
                }
                row += 1;
                last_row_y = Some(row_y);
            }

            if let Some(last) = last_row_y {
                y = last + self.config.tier_spacing;
            }
        }

        let container_height = match last_row_y {
            Some(last) => last + self.config.node_height + self.config.padding,
            None => 0.0,
        };

        BaseLayout {
            nodes,
            container_width: container_width.max(widest_row),
            container_height,
        }
    }

    /// Member count of each visual row of a tier
    fn pack_rows(&self, generation: Generation, count: usize, multi_row: bool) -> Vec<usize> {
        if generation != Generation::Child || !multi_row || count <= self.config.multi_row_threshold {
            return vec![count];
        }

        let columns = (count as f64).sqrt().ceil() as usize;
        let row_count = count.div_ceil(columns);
        (0..row_count)
            .map(|r| columns.min(count - r * columns))
            .collect()
    }

    fn column_step(&self) -> f64 {
        self.config.node_width + self.config.node_spacing
    }

    fn row_width(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.config.node_width + (count - 1) as f64 * self.config.node_spacing
    }

    /// Left edge of a centered row; rows wider than the container start at 0
    fn row_start(&self, count: usize, container_width: f64) -> f64 {
        ((container_width - self.row_width(count)) / 2.0).max(0.0)
    }
}
