use texture_scene::{
    frame::{LoopState, RenderLoop},
    state::AppContext,
    viewport::Sizes,
};

use crate::common::test_utils::{ManualStepper, RecordingRenderer, small_config};

mod common;

fn setup() -> (AppContext, RenderLoop<ManualStepper>, RecordingRenderer) {
    let ctx = AppContext::new(&small_config(), Sizes::new(800, 600));
    let render_loop = RenderLoop::start(ManualStepper::new());
    (ctx, render_loop, RecordingRenderer::new())
}

#[test]
fn should_request_first_frame_on_start() {
    let (_, render_loop, _) = setup();

    assert_eq!(render_loop.state(), LoopState::Running);
    assert_eq!(render_loop.scheduler().requests(), 1);
    assert_eq!(render_loop.frames(), 0);
}

#[test]
fn should_rotate_meshes_each_tick() {
    let (mut ctx, mut render_loop, mut renderer) = setup();
    let handles = ctx.handles;
    let rotation = |ctx: &AppContext, id| ctx.scene.mesh(id).transform.rotation;
    let sphere = rotation(&ctx, handles.sphere);
    let torus = rotation(&ctx, handles.torus);
    let plane = rotation(&ctx, handles.plane);

    render_loop.tick(&mut ctx, &mut renderer).unwrap();

    assert_eq!(rotation(&ctx, handles.sphere).x, sphere.x - 0.003);
    assert_eq!(rotation(&ctx, handles.torus).x, torus.x - 0.003);
    assert_eq!(rotation(&ctx, handles.plane).x, plane.x - 0.003);
    assert_eq!(rotation(&ctx, handles.torus).y, torus.y + 0.003);
    assert_eq!(rotation(&ctx, handles.plane).y, plane.y + 0.003);
    // The sphere only turns around x
    assert_eq!(rotation(&ctx, handles.sphere).y, sphere.y);
    assert_eq!(rotation(&ctx, handles.sphere).z, sphere.z);
}

#[test]
fn should_accumulate_rotation_over_ticks() {
    let (mut ctx, mut render_loop, mut renderer) = setup();
    let handles = ctx.handles;

    for _ in 0..10 {
        render_loop.tick(&mut ctx, &mut renderer).unwrap();
    }

    let torus = ctx.scene.mesh(handles.torus).transform.rotation;
    assert!((torus.x + 0.03).abs() < 1e-6);
    assert!((torus.y - 0.03).abs() < 1e-6);
    assert_eq!(render_loop.frames(), 10);
    assert_eq!(renderer.renders(), 10);
}

#[test]
fn should_request_next_frame_every_tick() {
    let (mut ctx, mut render_loop, mut renderer) = setup();

    for _ in 0..3 {
        render_loop.tick(&mut ctx, &mut renderer).unwrap();
    }

    // One request on start plus one per tick
    assert_eq!(render_loop.scheduler().requests(), 4);
}

#[test]
fn should_pass_current_size_to_renderer() {
    let (mut ctx, mut render_loop, mut renderer) = setup();

    render_loop.tick(&mut ctx, &mut renderer).unwrap();
    ctx.resize(1024, 768);
    render_loop.tick(&mut ctx, &mut renderer).unwrap();

    assert_eq!(
        renderer.sizes(),
        &[Sizes::new(800, 600), Sizes::new(1024, 768)]
    );
}

#[test]
fn should_keep_running_after_render_error() {
    let (mut ctx, mut render_loop, _) = setup();
    let mut renderer = RecordingRenderer::failing();

    assert!(render_loop.tick(&mut ctx, &mut renderer).is_err());
    assert!(render_loop.tick(&mut ctx, &mut renderer).is_err());

    assert_eq!(render_loop.state(), LoopState::Running);
    assert_eq!(render_loop.scheduler().requests(), 3);
    assert_eq!(renderer.renders(), 2);
}

#[test]
fn should_render_hidden_sphere_change_next_frame() {
    let (mut ctx, mut render_loop, mut renderer) = setup();

    render_loop.tick(&mut ctx, &mut renderer).unwrap();
    ctx.scene.mesh_mut(ctx.handles.sphere).visible = false;
    render_loop.tick(&mut ctx, &mut renderer).unwrap();

    assert_eq!(renderer.visible_meshes(), &[3, 2]);
}
