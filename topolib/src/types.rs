//! Primitive data types.

/// Data type for node indices in a [`crate::Graph`].
pub type NodeIndex = usize;
/// Data type for edge indices in a [`crate::Graph`].
pub type EdgeIndex = usize;
/// A path given as the sequence of visited node indices.
pub type NodePath = Vec<NodeIndex>;
