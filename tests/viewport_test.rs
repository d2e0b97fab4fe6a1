use cgmath::Point3;
use texture_scene::{state::AppContext, viewport::Sizes};

use crate::common::test_utils::small_config;

mod common;

#[test]
fn should_start_with_window_aspect() {
    let ctx = AppContext::new(&small_config(), Sizes::new(800, 600));

    assert_eq!(ctx.camera.aspect, 800.0 / 600.0);
    assert_eq!(ctx.camera.fovy, cgmath::Deg(75.0));
    assert_eq!(ctx.camera.near, 0.1);
    assert_eq!(ctx.camera.far, 2000.0);
    assert_eq!(ctx.camera.position, Point3::new(-1.25, 0.0, 0.0));
    assert_eq!(ctx.sizes, Sizes::new(800, 600));
}

#[test]
fn should_update_camera_on_resize() {
    let mut ctx = AppContext::new(&small_config(), Sizes::new(800, 600));
    let before = ctx.camera.projection_matrix();

    assert!(ctx.resize(1024, 768));

    assert_eq!(ctx.camera.aspect, 1024.0 / 768.0);
    assert_eq!(ctx.sizes, Sizes::new(1024, 768));
    assert_ne!(ctx.camera.projection_matrix(), before);
}

#[test]
fn should_recompute_projection_for_new_aspect() {
    let mut ctx = AppContext::new(&small_config(), Sizes::new(800, 600));

    ctx.resize(1600, 600);
    let wide = ctx.camera.projection_matrix();
    ctx.resize(600, 600);
    let square = ctx.camera.projection_matrix();

    // Only the horizontal scale depends on the aspect ratio
    assert!(wide.x.x < square.x.x);
    assert_eq!(wide.y.y, square.y.y);
}

#[test]
fn repeated_resize_is_idempotent() {
    let mut ctx = AppContext::new(&small_config(), Sizes::new(800, 600));
    ctx.resize(1024, 768);
    let projection = ctx.camera.projection_matrix();

    assert!(!ctx.resize(1024, 768));

    assert_eq!(ctx.camera.aspect, 1024.0 / 768.0);
    assert_eq!(ctx.camera.projection_matrix(), projection);
    assert_eq!(ctx.sizes, Sizes::new(1024, 768));
}

#[test]
fn should_ignore_minimized_window() {
    let mut ctx = AppContext::new(&small_config(), Sizes::new(800, 600));

    assert!(!ctx.resize(0, 0));
    assert!(!ctx.resize(1024, 0));

    assert_eq!(ctx.camera.aspect, 800.0 / 600.0);
    assert_eq!(ctx.sizes, Sizes::new(800, 600));
}
