//! # Editor
//!
//! Ties the scene, the two pickers and the transform gizmo together and owns
//! the single selection.
//!
//! The editor holds no reference to the scene. Hosts keep the [`Scene`] and
//! pass it to [`Editor::update`] once per frame, after feeding window events
//! into their [`InputState`] and before rendering:
//!
//! 1. world transforms are refreshed so picking sees current geometry
//! 2. a left-button press (cursor unlocked, no drag running) is picked and routed
//! 3. scene events are drained: selection changes drive the gizmo and new
//!    meshes are registered for color picking
//! 4. the gizmo applies, commits or cancels its drag
//! 5. world transforms are refreshed again for the render pass
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Vector3;
//! use kelpie::{
//!     config::{EditorConfig, PickMode},
//!     gfx::{camera::OrbitCamera, geometry::generate_cube, scene::Scene, viewport::Viewport},
//!     input::InputState,
//!     Editor,
//! };
//!
//! let mut scene = Scene::new("main");
//! let root = scene.root();
//! scene.add_geometry(root, "cube", &generate_cube());
//!
//! let mut editor = Editor::new(&mut scene, EditorConfig::default());
//! editor.set_pick_mode(PickMode::Ray);
//!
//! let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));
//! let viewport = Viewport::new(1280, 720);
//! let mut input = InputState::new();
//! loop {
//!     // input.process_window_event(&event) for each winit event...
//!     editor.update(&mut scene, &mut input, &camera, &viewport).unwrap();
//!     input.end_frame();
//! }
//! ```

use winit::event::MouseButton;

use crate::{
    config::{EditorConfig, PickMode},
    error::Result,
    gfx::{
        camera::CameraView,
        gizmos::{TransformGizmo, TransformMode},
        gpu::GpuContext,
        picking::{ColorPicker, PickHit, PickOutcome, PickRole, RayPicker},
        scene::{ListenerId, NodeChange, NodeId, Scene, SceneEvent},
        viewport::Viewport,
    },
    input::InputState,
};

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    listener: ListenerId,
    color_picker: ColorPicker,
    ray_picker: RayPicker,
    gizmo: TransformGizmo,
    pick_mode: PickMode,
    selected: Option<NodeId>,
}

impl Editor {
    /// Creates an editor without GPU picking. Color mode picks fail until a
    /// GPU-backed editor is used, so pair this with [`PickMode::Ray`].
    pub fn new(scene: &mut Scene, config: EditorConfig) -> Self {
        Self::with_color_picker(scene, config, ColorPicker::new())
    }

    /// Creates an editor whose color picker renders into a `width` x `height` target.
    pub fn with_gpu(scene: &mut Scene, config: EditorConfig, gpu: GpuContext, width: u32, height: u32) -> Result<Self> {
        let picker = ColorPicker::with_gpu(gpu, width, height)?;
        Ok(Self::with_color_picker(scene, config, picker))
    }

    fn with_color_picker(scene: &mut Scene, config: EditorConfig, mut color_picker: ColorPicker) -> Self {
        let root = scene.root();
        let listener = scene.graph.add_listener();
        scene.graph.watch_subtree(listener, root);

        let registered = color_picker
            .registry_mut()
            .register_subtree(&scene.graph, root, PickRole::SceneObject);

        let gizmo = TransformGizmo::new(scene, config.gizmo.clone());
        gizmo.register_parts(scene, color_picker.registry_mut());

        log::info!(
            "Editor ready on scene '{}': {} pickable node(s), {} pick mode",
            scene.name,
            registered,
            match config.picking.mode {
                PickMode::Color => "color",
                PickMode::Ray => "ray",
            }
        );

        Self {
            ray_picker: RayPicker::new(config.picking.det_epsilon),
            pick_mode: config.picking.mode,
            config,
            listener,
            color_picker,
            gizmo,
            selected: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn color_picker(&self) -> &ColorPicker {
        &self.color_picker
    }

    pub fn ray_picker(&self) -> &RayPicker {
        &self.ray_picker
    }

    pub fn pick_mode(&self) -> PickMode {
        self.pick_mode
    }

    pub fn set_pick_mode(&mut self, mode: PickMode) {
        if mode == PickMode::Color && !self.color_picker.has_gpu() {
            log::warn!("Color picking selected without a GPU context; picks will fail");
        }
        self.pick_mode = mode;
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn mode(&self) -> TransformMode {
        self.gizmo.mode()
    }

    /// Switches the gizmo mode. Fails while a drag is running.
    pub fn set_mode(&mut self, scene: &mut Scene, mode: TransformMode) -> Result<()> {
        self.gizmo.set_mode(scene, mode)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.color_picker.resize(width, height)
    }

    /// Roots the pickers search: the scene root and every rig root.
    pub fn pickable_roots(&self, scene: &Scene) -> Vec<NodeId> {
        std::iter::once(scene.root()).chain(self.gizmo.rig_roots()).collect()
    }

    /// Makes `node` pickable as a scene object.
    pub fn register_node(&mut self, scene: &Scene, node: NodeId) -> Option<u32> {
        self.color_picker.register_node(scene, node, PickRole::SceneObject)
    }

    fn is_gizmo_node(&self, scene: &Scene, node: NodeId) -> bool {
        self.gizmo
            .rig_roots()
            .iter()
            .any(|&root| scene.graph.is_ancestor(root, node))
    }

    // ---- selection -------------------------------------------------------

    /// Selects `node`, deselecting the previous node. Gizmo handles and
    /// unknown nodes are ignored.
    ///
    /// The gizmo follows once events are processed, at the latest on the
    /// next [`update`](Self::update).
    pub fn select_node(&mut self, scene: &mut Scene, node: NodeId) {
        if !scene.graph.contains(node) || self.is_gizmo_node(scene, node) {
            log::debug!("Ignoring selection of {}", node);
            return;
        }
        if self.selected == Some(node) {
            return;
        }
        if let Some(previous) = self.selected.take() {
            if let Some(mut prev) = scene.graph.node_mut(previous) {
                prev.set_selected(false);
            }
        }
        scene.graph.watch(self.listener, node);
        if let Some(mut next) = scene.graph.node_mut(node) {
            next.set_selected(true);
        }
        self.selected = Some(node);
        log::debug!("Selected {}", node);
    }

    pub fn clear_selection(&mut self, scene: &mut Scene) {
        let Some(previous) = self.selected.take() else {
            return;
        };
        if let Some(mut node) = scene.graph.node_mut(previous) {
            node.set_selected(false);
        }
        log::debug!("Selection cleared");
    }

    /// Destroys `node`'s subtree and forgets its pick ids. Clears the
    /// selection if it lived in the subtree. Gizmo nodes and the scene root
    /// are refused.
    pub fn destroy_node(&mut self, scene: &mut Scene, node: NodeId) -> Vec<NodeId> {
        if node == scene.root() || self.is_gizmo_node(scene, node) {
            log::warn!("Refusing to destroy {}", node);
            return Vec::new();
        }
        if self
            .selected
            .is_some_and(|selected| scene.graph.is_ancestor(node, selected))
        {
            self.clear_selection(scene);
            self.gizmo.on_selection_cleared(scene);
        }

        let removed = scene.destroy(node);
        let registry = self.color_picker.registry_mut();
        for id in &removed {
            registry.unregister(*id);
        }
        removed
    }

    // ---- frame -----------------------------------------------------------

    /// Runs one editor frame. See the module docs for the order of steps.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        input: &mut InputState,
        camera: &dyn CameraView,
        viewport: &Viewport,
    ) -> Result<()> {
        scene.update_transforms();

        if input.was_button_pressed(MouseButton::Left) && !input.is_cursor_locked() && !self.gizmo.is_dragging() {
            let (x, y) = input.mouse_position();
            let outcome = self.pick(scene, camera, viewport, x, y)?;
            self.handle_pick(scene, input, outcome);
        }

        self.process_events(scene);
        self.gizmo.update(scene, input, camera);
        scene.update_transforms();
        Ok(())
    }

    /// Picks at `(x, y)` with the current [`PickMode`] without acting on it.
    pub fn pick(
        &mut self,
        scene: &mut Scene,
        camera: &dyn CameraView,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) -> Result<PickOutcome> {
        let roots = self.pickable_roots(scene);
        match self.pick_mode {
            PickMode::Color => self.color_picker.pick(scene, &roots, camera, viewport, x, y),
            PickMode::Ray => {
                let outcome = match self.ray_picker.pick(scene, &roots, camera, viewport, x, y) {
                    Some(hit) => {
                        let role = self
                            .color_picker
                            .registry()
                            .role(hit.node)
                            .unwrap_or(PickRole::SceneObject);
                        PickOutcome::Hit(PickHit { node: hit.node, role })
                    }
                    None => PickOutcome::Nothing,
                };
                Ok(outcome)
            }
        }
    }

    /// Acts on a pick: scene objects become the selection, handles of the
    /// active rig start a drag, background clears the selection.
    pub fn handle_pick(&mut self, scene: &mut Scene, input: &mut InputState, outcome: PickOutcome) {
        match outcome {
            PickOutcome::Hit(PickHit {
                node,
                role: PickRole::SceneObject,
            }) => self.select_node(scene, node),
            PickOutcome::Hit(PickHit {
                node,
                role: PickRole::Gizmo(mode),
            }) => {
                if mode == self.gizmo.mode() && self.gizmo.begin_drag(scene, node, input.mouse_position()) {
                    input.set_cursor_locked(false);
                }
            }
            PickOutcome::Background => self.clear_selection(scene),
            PickOutcome::Nothing => {}
        }
    }

    /// Drains the editor's event queue and reacts to it.
    pub fn process_events(&mut self, scene: &mut Scene) {
        for event in scene.graph.drain_events(self.listener) {
            match event {
                SceneEvent::SelectionChanged { node, selected: true } => {
                    if self.selected == Some(node) {
                        self.gizmo
                            .on_node_selected(scene, self.color_picker.registry_mut(), node);
                    }
                }
                SceneEvent::SelectionChanged { selected: false, .. } => {
                    if self.selected.is_none() {
                        self.gizmo.on_selection_cleared(scene);
                    }
                }
                SceneEvent::NodeChanged {
                    node,
                    change: NodeChange::Meshes | NodeChange::Hierarchy,
                } => {
                    self.color_picker
                        .registry_mut()
                        .register_subtree(&scene.graph, node, PickRole::SceneObject);
                }
                SceneEvent::NodeChanged { .. } => {}
            }
        }
    }
}
