use texture_scene::{
    panel::{Binding, Control, ControlKind, ControlValue, DebugPanel},
    scene::build_scene,
};
use winit::keyboard::KeyCode;

use crate::common::test_utils::small_config;

mod common;

#[test]
fn should_expose_three_controls() {
    let (_, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    let names: Vec<&str> = panel.controls().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["visible", "Wireframe", "Ambient Occlusion"]);
    assert_eq!(panel.controls()[0].binding, Binding::Visible(handles.sphere));
    assert_eq!(
        panel.controls()[1].binding,
        Binding::Wireframe(handles.material)
    );
    assert_eq!(
        panel.controls()[2].kind,
        ControlKind::Slider {
            min: 0.0,
            max: 1.0,
            step: 0.01
        }
    );
}

#[test]
fn should_write_ao_intensity_exactly() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    let stored = panel
        .set(&mut scene, "Ambient Occlusion", ControlValue::Number(0.73))
        .unwrap();

    assert_eq!(stored, ControlValue::Number(0.73));
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 0.73);
}

#[test]
fn should_clamp_ao_intensity_to_range() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    panel
        .set(&mut scene, "Ambient Occlusion", ControlValue::Number(1.5))
        .unwrap();
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 1.0);

    panel
        .set(&mut scene, "Ambient Occlusion", ControlValue::Number(-1.0))
        .unwrap();
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 0.0);
}

#[test]
fn should_snap_slider_to_step() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    let stored = panel
        .set(&mut scene, "Ambient Occlusion", ControlValue::Number(0.734))
        .unwrap();

    assert_eq!(stored, ControlValue::Number(0.73));
}

#[test]
fn should_toggle_sphere_visibility_only() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    let stored = panel.toggle(&mut scene, "visible").unwrap();

    assert_eq!(stored, ControlValue::Bool(false));
    assert!(!scene.mesh(handles.sphere).visible);
    assert!(scene.mesh(handles.plane).visible);
    assert!(scene.mesh(handles.torus).visible);
}

#[test]
fn should_toggle_wireframe_on_shared_material() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    panel
        .set(&mut scene, "Wireframe", ControlValue::Bool(true))
        .unwrap();

    assert!(scene.material(handles.material).wireframe);
    assert_eq!(
        panel.get(&scene, "Wireframe").unwrap(),
        ControlValue::Bool(true)
    );
}

#[test]
fn should_reject_unknown_controls_and_mismatched_values() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    assert!(panel.get(&scene, "Metalness").is_err());
    assert!(
        panel
            .set(&mut scene, "visible", ControlValue::Number(1.0))
            .is_err()
    );
    assert!(
        panel
            .set(&mut scene, "Ambient Occlusion", ControlValue::Bool(true))
            .is_err()
    );
    assert!(panel.nudge(&mut scene, "visible", 1).is_err());
    // Failed writes leave the scene untouched
    assert!(scene.mesh(handles.sphere).visible);
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 0.5);
}

#[test]
fn should_drive_controls_from_keyboard() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    assert_eq!(
        panel.handle_key(&mut scene, KeyCode::KeyV),
        Some(ControlValue::Bool(false))
    );
    assert_eq!(
        panel.handle_key(&mut scene, KeyCode::KeyW),
        Some(ControlValue::Bool(true))
    );
    assert_eq!(
        panel.handle_key(&mut scene, KeyCode::BracketRight),
        Some(ControlValue::Number(0.51))
    );
    assert_eq!(
        panel.handle_key(&mut scene, KeyCode::BracketLeft),
        Some(ControlValue::Number(0.5))
    );
    assert_eq!(panel.handle_key(&mut scene, KeyCode::KeyQ), None);

    assert!(!scene.mesh(handles.sphere).visible);
    assert!(scene.material(handles.material).wireframe);
}

#[test]
fn should_support_custom_controls() {
    let (mut scene, handles) = build_scene(&small_config());
    let mut panel = DebugPanel::new();
    panel.add(Control::toggle("torus", Binding::Visible(handles.torus)));

    panel.toggle(&mut scene, "torus").unwrap();

    assert!(!scene.mesh(handles.torus).visible);
    assert!(scene.mesh(handles.sphere).visible);
}

#[test]
fn should_reject_control_bound_to_wrong_value_type() {
    let (mut scene, handles) = build_scene(&small_config());
    let mut panel = DebugPanel::new();
    panel.add(Control::toggle("ao", Binding::AoMapIntensity(handles.material)));

    let result = panel.set(&mut scene, "ao", ControlValue::Bool(true));

    assert!(result.is_err());
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 0.5);
    assert!(panel.toggle(&mut scene, "ao").is_err());
}

#[test]
fn should_store_slider_minimum_for_nan() {
    let (mut scene, handles) = build_scene(&small_config());
    let panel = DebugPanel::for_scene(&handles);

    let stored = panel
        .set(&mut scene, "Ambient Occlusion", ControlValue::Number(f64::NAN))
        .unwrap();

    assert_eq!(stored, ControlValue::Number(0.0));
    assert_eq!(scene.material(handles.material).ao_map_intensity(), 0.0);
    assert_eq!(
        panel.get(&scene, "Ambient Occlusion").unwrap(),
        ControlValue::Number(0.0)
    );
}
