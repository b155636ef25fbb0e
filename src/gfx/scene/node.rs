//! A single transform node of the scene graph.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Matrix4, One, Quaternion, SquareMatrix, Vector3, Zero};

use super::{events::ListenerId, mesh::MeshId};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a node stands for besides its transform. Lights carry their color
/// and intensity for the host renderer; the editor treats them like any
/// other node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NodeKind {
    #[default]
    Default,
    Light { color: Vector3<f32>, intensity: f32 },
}

impl NodeKind {
    /// A white light of intensity 1.
    pub fn light() -> Self {
        NodeKind::Light {
            color: Vector3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, NodeKind::Light { .. })
    }
}

/// Position, rotation and scale plus the cached matrices derived from them.
///
/// Nodes are created and mutated through [`SceneGraph`](super::SceneGraph),
/// which keeps parent links, child lists and listener notifications in sync.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) position: Vector3<f32>,
    pub(crate) rotation: Quaternion<f32>,
    pub(crate) scale: Vector3<f32>,
    pub(crate) local: Matrix4<f32>,
    pub(crate) local_dirty: bool,
    pub(crate) world: Matrix4<f32>,
    pub(crate) selected: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) meshes: Vec<MeshId>,
    pub(crate) listeners: Vec<ListenerId>,
}

impl SceneNode {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            kind: NodeKind::Default,
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            local: Matrix4::identity(),
            local_dirty: false,
            world: Matrix4::identity(),
            selected: false,
            parent: None,
            children: Vec::new(),
            meshes: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }

    pub fn has_meshes(&self) -> bool {
        !self.meshes.is_empty()
    }

    /// T * R * S from the current attributes, ignoring the cache.
    pub fn compose_local(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Local matrix, fresh even if the update pass has not run since the last edit.
    pub fn local_matrix(&self) -> Matrix4<f32> {
        if self.local_dirty {
            self.compose_local()
        } else {
            self.local
        }
    }

    /// World matrix as of the last update pass.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    /// Translation column of the cached world matrix.
    pub fn world_position(&self) -> Vector3<f32> {
        self.world.w.truncate()
    }

    pub(crate) fn refresh_local(&mut self) {
        if self.local_dirty {
            self.local = self.compose_local();
            self.local_dirty = false;
        }
    }
}
