//! Drag state machine for the transform gizmo.
//!
//! ```text
//!            select node               press on active handle
//!   Idle ──────────────────► Visible ─────────────────────────► Dragging
//!    ▲                        │   ▲                                │
//!    └──── selection cleared ─┘   └── button released (commit) ────┤
//!                                 └── Escape (cancel, restore) ────┘
//! ```
//!
//! Translate and scale are absolute: every frame recomputes the transform
//! from the snapshot taken when the drag started and the total mouse delta.
//! Rotate is incremental: each frame composes a small rotation from the
//! mouse movement since the previous frame.

use cgmath::{InnerSpace, Matrix4, Point3, Quaternion, Rad, Rotation3, SquareMatrix, Transform, Vector3};
use winit::{event::MouseButton, keyboard::KeyCode};

use super::{rig::AxisRig, GizmoAxis, TransformMode};
use crate::{
    config::GizmoConfig,
    error::{EditorError, Result},
    gfx::{
        camera::CameraView,
        picking::registry::{PickRegistry, PickRole},
        scene::{NodeId, Scene},
    },
    input::InputState,
};

/// Local transform attributes of a node at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl TransformSnapshot {
    pub fn capture(scene: &Scene, node: NodeId) -> Option<Self> {
        let node = scene.graph.node(node)?;
        Some(Self {
            position: node.position(),
            rotation: node.rotation(),
            scale: node.scale(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub axis: GizmoAxis,
    /// Target transform when the handle was pressed.
    pub snapshot: TransformSnapshot,
    pub start_mouse: (f32, f32),
    pub last_mouse: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GizmoState {
    #[default]
    Idle,
    Visible {
        target: NodeId,
        snapshot: TransformSnapshot,
    },
    Dragging {
        target: NodeId,
        session: DragSession,
    },
}

#[derive(Debug)]
pub struct TransformGizmo {
    config: GizmoConfig,
    mode: TransformMode,
    state: GizmoState,
    rigs: [AxisRig; 3],
}

impl TransformGizmo {
    /// Builds the three rigs inside `scene`, detached and hidden.
    pub fn new(scene: &mut Scene, config: GizmoConfig) -> Self {
        let rigs = TransformMode::ALL.map(|mode| AxisRig::build(scene, mode));
        let gizmo = Self {
            config,
            mode: TransformMode::default(),
            state: GizmoState::Idle,
            rigs,
        };
        gizmo.collapse_detached(scene);
        gizmo
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn state(&self) -> &GizmoState {
        &self.state
    }

    pub fn target(&self) -> Option<NodeId> {
        match self.state {
            GizmoState::Idle => None,
            GizmoState::Visible { target, .. } | GizmoState::Dragging { target, .. } => Some(target),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GizmoState::Dragging { .. })
    }

    pub fn active_axis(&self) -> Option<GizmoAxis> {
        match self.state {
            GizmoState::Dragging { session, .. } => Some(session.axis),
            _ => None,
        }
    }

    pub fn rig(&self, mode: TransformMode) -> &AxisRig {
        &self.rigs[mode.index()]
    }

    pub fn rig_roots(&self) -> [NodeId; 3] {
        self.rigs.each_ref().map(|rig| rig.root())
    }

    /// Gives every handle of every rig a pick id with its mode's gizmo role.
    pub fn register_parts(&self, scene: &Scene, registry: &mut PickRegistry) {
        for rig in &self.rigs {
            for part in rig.parts() {
                registry.register(&scene.graph, part.node, PickRole::Gizmo(rig.mode()));
            }
        }
    }

    // ---- transitions -----------------------------------------------------

    /// Shows the active rig on `node`. A running drag is committed first.
    pub fn on_node_selected(&mut self, scene: &mut Scene, registry: &mut PickRegistry, node: NodeId) {
        if self.is_dragging() {
            self.commit(scene);
        }
        let Some(snapshot) = TransformSnapshot::capture(scene, node) else {
            return;
        };
        self.state = GizmoState::Visible { target: node, snapshot };

        let root = scene.root();
        for rig in &self.rigs {
            if scene.graph.node(rig.root()).and_then(|n| n.parent()) != Some(root) {
                scene.graph.add_child(root, rig.root());
            }
        }
        self.register_parts(scene, registry);
        self.refresh_rigs(scene);
        log::debug!("Gizmo attached to {} in {} mode", node, self.mode.name());
    }

    /// Hides and detaches every rig. The target keeps its current transform.
    pub fn on_selection_cleared(&mut self, scene: &mut Scene) {
        if self.state == GizmoState::Idle {
            return;
        }
        self.state = GizmoState::Idle;
        for rig in &mut self.rigs {
            rig.hide(scene);
            if let Some(parent) = scene.graph.node(rig.root()).and_then(|n| n.parent()) {
                scene.graph.remove_child(parent, rig.root());
            }
        }
        self.collapse_detached(scene);
        log::debug!("Gizmo detached");
    }

    /// Starts a drag if `part` is a handle of the active rig.
    ///
    /// # Returns
    /// `true` if a drag session started
    pub fn begin_drag(&mut self, scene: &Scene, part: NodeId, mouse: (f32, f32)) -> bool {
        let GizmoState::Visible { target, .. } = self.state else {
            return false;
        };
        let Some(axis) = self.rigs[self.mode.index()].axis_of(part) else {
            log::debug!("{} is not a handle of the {} rig", part, self.mode.name());
            return false;
        };
        let Some(snapshot) = TransformSnapshot::capture(scene, target) else {
            return false;
        };

        self.state = GizmoState::Dragging {
            target,
            session: DragSession {
                axis,
                snapshot,
                start_mouse: mouse,
                last_mouse: mouse,
            },
        };
        log::debug!("Begin {} drag on {} along {:?}", self.mode.name(), target, axis);
        true
    }

    /// Advances a running drag: Escape cancels, otherwise the mouse is
    /// applied and releasing the left button commits.
    pub fn update(&mut self, scene: &mut Scene, input: &InputState, camera: &dyn CameraView) {
        if self.is_dragging() {
            if input.was_key_pressed(KeyCode::Escape) {
                self.cancel(scene);
            } else {
                self.apply_drag(scene, camera, input.mouse_position());
                if !input.is_button_held(MouseButton::Left) {
                    self.commit(scene);
                }
            }
        }
        self.refresh_rigs(scene);
    }

    /// Keeps the target's current transform and returns to `Visible`.
    pub fn commit(&mut self, scene: &Scene) {
        let GizmoState::Dragging { target, session } = self.state else {
            return;
        };
        let snapshot = TransformSnapshot::capture(scene, target).unwrap_or(session.snapshot);
        self.state = GizmoState::Visible { target, snapshot };
        log::info!("Committed {} of {}", self.mode.name(), target);
    }

    /// Restores the snapshot taken at drag start and returns to `Visible`.
    ///
    /// Position is always restored; rotation only in rotate mode and scale
    /// only in scale mode.
    pub fn cancel(&mut self, scene: &mut Scene) {
        let GizmoState::Dragging { target, session } = self.state else {
            return;
        };
        let snapshot = session.snapshot;
        if let Some(mut node) = scene.graph.node_mut(target) {
            node.set_position(snapshot.position);
            match self.mode {
                TransformMode::Rotate => {
                    node.set_rotation(snapshot.rotation);
                }
                TransformMode::Scale => {
                    node.set_scale(snapshot.scale);
                }
                TransformMode::Translate => {}
            }
        }
        self.state = GizmoState::Visible { target, snapshot };
        log::info!("Cancelled {} of {}", self.mode.name(), target);
    }

    /// Switches the visible rig. Rejected while a drag is running.
    pub fn set_mode(&mut self, scene: &mut Scene, mode: TransformMode) -> Result<()> {
        if self.is_dragging() {
            log::warn!("Ignoring switch to {} mode during a drag", mode.name());
            return Err(EditorError::DragInProgress);
        }
        self.mode = mode;
        self.refresh_rigs(scene);
        Ok(())
    }

    // ---- drag math -------------------------------------------------------

    fn apply_drag(&mut self, scene: &mut Scene, camera: &dyn CameraView, mouse: (f32, f32)) {
        let mode = self.mode;
        let config = self.config.clone();
        let GizmoState::Dragging { target, session } = &mut self.state else {
            return;
        };
        let target = *target;
        let dx = mouse.0 - session.start_mouse.0;
        let dy = mouse.1 - session.start_mouse.1;

        match mode {
            TransformMode::Translate => {
                let world_offset = translate_offset(
                    session.axis,
                    dx * config.translate_sensitivity,
                    dy * config.translate_sensitivity,
                    camera.right(),
                    camera.up(),
                );
                let to_parent = parent_inverse(scene, target);
                let position = session.snapshot.position + to_parent.transform_vector(world_offset);
                if let Some(mut node) = scene.graph.node_mut(target) {
                    node.set_position(position);
                }
            }
            TransformMode::Rotate => {
                let frame_dx = mouse.0 - session.last_mouse.0;
                let frame_dy = mouse.1 - session.last_mouse.1;
                if let Some(axis) = session.axis.direction() {
                    let angle = rotation_angle(axis, frame_dx, frame_dy, camera) * config.rotate_sensitivity;
                    let current = scene.graph.node(target).map(|n| n.rotation());
                    if let (Some(current), Some(mut node)) = (current, scene.graph.node_mut(target)) {
                        node.set_rotation((current * Quaternion::from_axis_angle(axis, Rad(angle))).normalize());
                    }
                }
            }
            TransformMode::Scale => {
                let factor = 1.0 + (dx + dy) * config.scale_sensitivity;
                let scale = scaled(session.snapshot.scale, session.axis, factor, config.min_scale);
                if let Some(mut node) = scene.graph.node_mut(target) {
                    node.set_scale(scale);
                }
            }
        }

        session.last_mouse = mouse;
    }

    /// Detached rigs are outside the scene root's transform pass; refresh
    /// their cached matrices so pickers see them at zero scale.
    fn collapse_detached(&self, scene: &mut Scene) {
        for rig in &self.rigs {
            if scene.graph.node(rig.root()).is_some_and(|n| n.parent().is_none()) {
                scene.graph.update_world_transformation(rig.root(), &mut scene.meshes);
            }
        }
    }

    /// Puts the active rig on the target and hides the others.
    fn refresh_rigs(&mut self, scene: &mut Scene) {
        let Some(target) = self.target() else {
            return;
        };
        let Some(world) = scene.graph.compute_world_matrix(target) else {
            return;
        };
        let Some(target_node) = scene.graph.node(target) else {
            return;
        };

        let s = target_node.scale();
        let size = (s.x + s.y + s.z) / 3.0 * self.config.rig_size;
        // Rig roots live under the scene root, so place them in its space
        let world_position = Point3::new(world.w.x, world.w.y, world.w.z);
        let position = scene
            .graph
            .compute_world_matrix(scene.root())
            .and_then(|m| m.invert())
            .map(|inv| inv.transform_point(world_position))
            .unwrap_or(world_position);
        let position = Vector3::new(position.x, position.y, position.z);

        for rig in &mut self.rigs {
            if rig.mode() == self.mode {
                rig.show(scene, position, size);
            } else {
                rig.hide(scene);
            }
        }
    }
}

/// Inverse of the parent's world matrix, identity for parentless nodes.
fn parent_inverse(scene: &Scene, node: NodeId) -> Matrix4<f32> {
    scene
        .graph
        .node(node)
        .and_then(|n| n.parent())
        .and_then(|p| scene.graph.compute_world_matrix(p))
        .and_then(|m| m.invert())
        .unwrap_or_else(Matrix4::identity)
}

/// World-space offset for a translate drag.
///
/// Single axes move by the mouse delta projected onto the axis as it appears
/// on screen; the composite handle moves in the camera plane. Screen `dy`
/// grows downward, hence the sign flip against `up`.
pub fn translate_offset(axis: GizmoAxis, dx: f32, dy: f32, right: Vector3<f32>, up: Vector3<f32>) -> Vector3<f32> {
    match axis.direction() {
        Some(a) => a * (dx * right.dot(a) - dy * up.dot(a)),
        None => right * dx - up * dy,
    }
}

/// Signed rotation (before sensitivity) for a frame's mouse movement.
///
/// Combines the drag component perpendicular to the axis' screen projection
/// with a horizontal term that dominates when the axis faces the camera.
pub fn rotation_angle(axis: Vector3<f32>, frame_dx: f32, frame_dy: f32, camera: &dyn CameraView) -> f32 {
    let screen_x = camera.right().dot(axis);
    let screen_y = camera.up().dot(axis);
    let facing = -camera.front().dot(axis);
    let up_dy = -frame_dy;
    screen_x * up_dy - screen_y * frame_dx + facing * frame_dx
}

/// Scale after applying `factor` along `axis` (all axes for composite),
/// with every component clamped to at least `min_scale`.
pub fn scaled(start: Vector3<f32>, axis: GizmoAxis, factor: f32, min_scale: f32) -> Vector3<f32> {
    let mut scale = start;
    match axis {
        GizmoAxis::X => scale.x *= factor,
        GizmoAxis::Y => scale.y *= factor,
        GizmoAxis::Z => scale.z *= factor,
        GizmoAxis::Composite => scale *= factor,
    }
    Vector3::new(scale.x.max(min_scale), scale.y.max(min_scale), scale.z.max(min_scale))
}
