//! The render loop.
//!
//! A loop is entered once and stays [`LoopState::Running`] for the lifetime of
//! the application. Each [`RenderLoop::tick`] asks its [`FrameScheduler`] for
//! the next frame before doing any work, so a failing frame never stops the
//! loop. The scheduler and the renderer are injected, which lets tests step
//! the loop by hand.

use std::sync::Arc;

use winit::window::Window;

use crate::{camera::PerspectiveCamera, scene::Scene, state::AppContext, viewport::Sizes};

/// Host primitive that runs the loop again before the next paint.
pub trait FrameScheduler {
    fn request_next_frame(&mut self);
}

/// Schedules frames through winit redraw requests.
#[derive(Debug, Clone)]
pub struct WindowScheduler(pub Arc<Window>);

impl FrameScheduler for WindowScheduler {
    fn request_next_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Draws a scene as seen by a camera.
pub trait Renderer {
    /// Matches the output to the viewport. Cheap when nothing changed.
    fn set_size(&mut self, sizes: Sizes);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
}

#[derive(Debug)]
pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState,
    frames: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    /// Enters the running state and requests the first frame.
    pub fn start(mut scheduler: S) -> Self {
        scheduler.request_next_frame();
        Self {
            scheduler,
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Runs one frame: schedule the next one, animate, advance the controls,
    /// size the output and render.
    pub fn tick<R: Renderer>(&mut self, ctx: &mut AppContext, renderer: &mut R) -> anyhow::Result<()> {
        self.scheduler.request_next_frame();
        self.frames += 1;

        ctx.animate();
        ctx.controls.update(&mut ctx.camera);

        renderer.set_size(ctx.sizes);
        renderer.render(&ctx.scene, &ctx.camera)
    }
}
