//! Tree layout and connection derivation

mod connections;
mod layout;

pub use connections::{derive_connections, Connection, ConnectionKind};
pub use layout::{
    BaseLayout, DragOffset, DragOffsets, Point, PositionedNode, TreeLayout, TreeLayoutAlgorithm,
};
