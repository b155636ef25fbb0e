//! Change notifications emitted by the scene graph.
//!
//! Nodes keep a list of [`ListenerId`]s. Every mutation pushes a
//! [`SceneEvent`] into the queue of each listener attached to the node, and
//! the listener drains its queue once per frame.

use super::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u32);

/// What part of a node changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChange {
    Name,
    Transform,
    Hierarchy,
    Meshes,
    Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    NodeChanged { node: NodeId, change: NodeChange },
    SelectionChanged { node: NodeId, selected: bool },
}

impl SceneEvent {
    pub fn node(&self) -> NodeId {
        match *self {
            SceneEvent::NodeChanged { node, .. } | SceneEvent::SelectionChanged { node, .. } => node,
        }
    }
}
