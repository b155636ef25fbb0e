//! End-to-end editor frames driven through `InputState`, using ray picking
//! so no GPU is needed.

use cgmath::{InnerSpace, Vector3};
use kelpie::{
    config::{EditorConfig, PickMode},
    gfx::{
        camera::OrbitCamera,
        geometry::generate_cube,
        gizmos::{GizmoAxis, GizmoState, TransformMode},
        picking::PickRole,
        scene::{NodeId, Scene},
        viewport::Viewport,
    },
    input::InputState,
    Editor, EditorError,
};
use winit::{event::MouseButton, keyboard::KeyCode};

// Screen point over the middle of the +X translate arrow for a unit rig at
// the origin, seen from the default camera in an 800x600 viewport.
const ARROW_X_PIXEL: (f32, f32) = (494.0, 299.9);
const CUBE_PIXEL: (f32, f32) = (390.0, 320.0);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Harness {
    scene: Scene,
    editor: Editor,
    input: InputState,
    camera: OrbitCamera,
    viewport: Viewport,
    cube: NodeId,
}

impl Harness {
    fn new() -> Self {
        init_logger();
        let mut scene = Scene::new("flow");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());

        let mut config = EditorConfig::default();
        config.picking.mode = PickMode::Ray;
        let editor = Editor::new(&mut scene, config);

        Self {
            scene,
            editor,
            input: InputState::new(),
            camera: OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0)),
            viewport: Viewport::new(800, 600),
            cube,
        }
    }

    fn frame(&mut self) -> Result<(), EditorError> {
        let result = self
            .editor
            .update(&mut self.scene, &mut self.input, &self.camera, &self.viewport);
        self.input.end_frame();
        result
    }

    fn press_at(&mut self, (x, y): (f32, f32)) {
        self.input.set_mouse_position(x, y);
        self.input.press_button(MouseButton::Left);
        self.frame().unwrap();
    }

    fn move_to(&mut self, (x, y): (f32, f32)) {
        self.input.set_mouse_position(x, y);
        self.frame().unwrap();
    }

    fn release(&mut self) {
        self.input.release_button(MouseButton::Left);
        self.frame().unwrap();
    }

    fn cube_position(&self) -> Vector3<f32> {
        self.scene.graph.node(self.cube).unwrap().position()
    }
}

#[test]
fn test_click_selects_and_shows_translate_rig() {
    let mut h = Harness::new();
    h.press_at(CUBE_PIXEL);
    h.release();

    assert_eq!(h.editor.selected(), Some(h.cube));
    assert!(matches!(h.editor.gizmo().state(), GizmoState::Visible { target, .. } if *target == h.cube));
    assert!(!h.editor.gizmo().rig(TransformMode::Translate).is_hidden(&h.scene));
    assert!(h.editor.gizmo().rig(TransformMode::Rotate).is_hidden(&h.scene));
}

#[test]
fn test_drag_x_arrow_moves_selection() {
    let mut h = Harness::new();
    h.press_at(CUBE_PIXEL);
    h.release();

    h.press_at(ARROW_X_PIXEL);
    assert!(h.editor.gizmo().is_dragging());
    assert_eq!(h.editor.gizmo().active_axis(), Some(GizmoAxis::X));

    h.move_to((ARROW_X_PIXEL.0 + 100.0, ARROW_X_PIXEL.1 + 40.0));
    assert!((h.cube_position() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-4);

    h.release();
    assert!(!h.editor.gizmo().is_dragging());
    assert!((h.cube_position() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-4);

    // The rig followed the cube
    let rig_root = h.editor.gizmo().rig(TransformMode::Translate).root();
    let rig_position = h.scene.graph.node(rig_root).unwrap().position();
    assert!((rig_position - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-4);
}

#[test]
fn test_escape_restores_position() {
    let mut h = Harness::new();
    h.press_at(CUBE_PIXEL);
    h.release();

    h.press_at(ARROW_X_PIXEL);
    h.move_to((ARROW_X_PIXEL.0 + 50.0, ARROW_X_PIXEL.1));
    assert!(h.cube_position().x > 0.4);

    h.input.press_key(KeyCode::Escape);
    h.frame().unwrap();
    assert!(!h.editor.gizmo().is_dragging());
    assert_eq!(h.cube_position(), Vector3::new(0.0, 0.0, 0.0));

    // Further mouse motion with the button still held does nothing
    h.move_to((ARROW_X_PIXEL.0 + 150.0, ARROW_X_PIXEL.1));
    assert_eq!(h.cube_position(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_mode_switch_blocked_during_drag() {
    let mut h = Harness::new();
    h.press_at(CUBE_PIXEL);
    h.release();
    h.press_at(ARROW_X_PIXEL);

    let result = h.editor.set_mode(&mut h.scene, TransformMode::Rotate);
    assert!(matches!(result, Err(EditorError::DragInProgress)));

    h.release();
    h.editor.set_mode(&mut h.scene, TransformMode::Rotate).unwrap();
    h.frame().unwrap();
    assert!(h.editor.gizmo().rig(TransformMode::Translate).is_hidden(&h.scene));
    assert!(!h.editor.gizmo().rig(TransformMode::Rotate).is_hidden(&h.scene));
}

#[test]
fn test_miss_keeps_selection_and_destroy_clears_it() {
    let mut h = Harness::new();
    h.press_at(CUBE_PIXEL);
    h.release();

    h.press_at((5.0, 5.0));
    h.release();
    assert_eq!(h.editor.selected(), Some(h.cube));

    let removed = h.editor.destroy_node(&mut h.scene, h.cube);
    assert_eq!(removed, vec![h.cube]);
    h.frame().unwrap();
    assert_eq!(h.editor.selected(), None);
    assert_eq!(*h.editor.gizmo().state(), GizmoState::Idle);
    assert!(h.editor.color_picker().registry().role(h.cube).is_none());
}

#[test]
fn test_nodes_added_later_become_pickable() {
    let mut h = Harness::new();
    let root = h.scene.root();
    let extra = h.scene.add_geometry(root, "extra", &generate_cube());
    h.frame().unwrap();
    assert_eq!(h.editor.color_picker().registry().role(extra), Some(PickRole::SceneObject));
}
