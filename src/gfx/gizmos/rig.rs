//! Handle geometry for one transform mode.
//!
//! A rig is a small subtree: an empty root node that the gizmo moves onto
//! the selected object, with one mesh-bearing child per handle. Each child
//! maps to the axis it manipulates. Hidden rigs keep their nodes and their
//! pick registration and are simply scaled to zero.

use cgmath::Vector3;

use super::{GizmoAxis, TransformMode};
use crate::gfx::{
    geometry::{generate_arrow, generate_box, generate_ring, generate_scale_handle, Axis, GeometryData},
    scene::{NodeId, Scene},
};

const SEGMENTS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigPart {
    pub node: NodeId,
    pub axis: GizmoAxis,
}

#[derive(Debug, Clone)]
pub struct AxisRig {
    mode: TransformMode,
    root: NodeId,
    parts: Vec<RigPart>,
}

impl AxisRig {
    /// Creates the rig's nodes and meshes in `scene`, detached and hidden.
    pub fn build(scene: &mut Scene, mode: TransformMode) -> Self {
        let root = scene.graph.create_node(format!("gizmo.{}", mode.name()));

        let mut handles: Vec<(GizmoAxis, String, GeometryData)> = Axis::ALL
            .iter()
            .map(|&axis| {
                let geometry = match mode {
                    TransformMode::Translate => generate_arrow(axis, 1.0, SEGMENTS),
                    TransformMode::Rotate => generate_ring(axis, 1.0, 0.02, SEGMENTS * 2),
                    TransformMode::Scale => generate_scale_handle(axis, 1.0, SEGMENTS),
                };
                (GizmoAxis::from(axis), handle_name(mode, axis), geometry)
            })
            .collect();

        if mode != TransformMode::Rotate {
            handles.push((
                GizmoAxis::Composite,
                format!("gizmo.{}.center", mode.name()),
                generate_box(Vector3::new(0.08, 0.08, 0.08)),
            ));
        }

        let parts = handles
            .into_iter()
            .map(|(axis, name, geometry)| RigPart {
                node: scene.add_geometry(root, name, &geometry),
                axis,
            })
            .collect();

        let mut rig = Self { mode, root, parts };
        rig.hide(scene);
        rig
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parts(&self) -> &[RigPart] {
        &self.parts
    }

    /// Axis driven by the handle `node`, if it belongs to this rig.
    pub fn axis_of(&self, node: NodeId) -> Option<GizmoAxis> {
        self.parts.iter().find(|part| part.node == node).map(|part| part.axis)
    }

    /// Places the rig root (in its parent's space) and gives it a uniform size.
    pub fn show(&mut self, scene: &mut Scene, position: Vector3<f32>, size: f32) {
        if let Some(mut root) = scene.graph.node_mut(self.root) {
            root.set_position(position).set_scale(Vector3::new(size, size, size));
        }
    }

    pub fn hide(&mut self, scene: &mut Scene) {
        if let Some(mut root) = scene.graph.node_mut(self.root) {
            root.set_scale(Vector3::new(0.0, 0.0, 0.0));
        }
    }

    pub fn is_hidden(&self, scene: &Scene) -> bool {
        scene
            .graph
            .node(self.root)
            .map_or(true, |node| node.scale() == Vector3::new(0.0, 0.0, 0.0))
    }
}

fn handle_name(mode: TransformMode, axis: Axis) -> String {
    let suffix = match (mode, axis) {
        (TransformMode::Rotate, Axis::X) => "pitch",
        (TransformMode::Rotate, Axis::Y) => "yaw",
        (TransformMode::Rotate, Axis::Z) => "roll",
        (_, Axis::X) => "x",
        (_, Axis::Y) => "y",
        (_, Axis::Z) => "z",
    };
    format!("gizmo.{}.{}", mode.name(), suffix)
}
