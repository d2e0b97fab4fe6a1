//! Damped orbit controls.
//!
//! The camera circles a target point. Pointer input only accumulates deltas;
//! [`OrbitControls::update`] applies a fraction of them each frame and decays
//! the rest, which gives the motion its inertia.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::{camera::PerspectiveCamera, viewport::Sizes};

const EPS: f32 = 0.000001;

/// Spherical coordinates with the polar angle measured from +y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_vector(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    gesture: Gesture,
    pointer: Option<PhysicalPosition<f64>>,
    last_position: Point3<f32>,
    last_target: Point3<f32>,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical::default(),
            pan_offset: Vector3::zero(),
            scale: 1.0,
            gesture: Gesture::None,
            pointer: None,
            last_position: Point3::origin(),
            last_target: target,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// Turns the camera around the target's vertical axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Tilts the camera over the target.
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Moves the camera towards the target by `scale` (< 1 zooms in).
    pub fn dolly(&mut self, scale: f32) {
        self.scale *= scale;
    }

    /// Shifts target and camera in the view plane by pixel deltas.
    pub fn pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32, client_height: f32) {
        let offset = camera.position - self.target;
        let target_distance = offset.magnitude() * (Rad::from(camera.fovy).0 / 2.0).tan();
        let view = Matrix4::look_at_rh(camera.position, self.target, camera.up);
        // Rows of the view rotation are the camera's right and up axes in world space
        let right = Vector3::new(view.x.x, view.y.x, view.z.x);
        let up = Vector3::new(view.x.y, view.y.y, view.z.y);
        let scale = 2.0 * target_distance / client_height.max(1.0);
        self.pan_offset += right * (-dx * scale) + up * (dy * scale);
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::None
    }

    /// Feeds pointer events. Returns `true` if the event was consumed.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &PerspectiveCamera,
        sizes: Sizes,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.gesture = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Gesture::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Gesture::Pan,
                    (ElementState::Released, _) => Gesture::None,
                    _ => self.gesture,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.pointer.replace(*position);
                let Some(previous) = previous else {
                    return false;
                };
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                let client_height = sizes.height.max(1) as f32;
                match self.gesture {
                    Gesture::Rotate => {
                        self.rotate_left(2.0 * PI * dx * self.rotate_speed / client_height);
                        self.rotate_up(2.0 * PI * dy * self.rotate_speed / client_height);
                        true
                    }
                    Gesture::Pan => {
                        self.pan(
                            camera,
                            dx * self.pan_speed,
                            dy * self.pan_speed,
                            client_height,
                        );
                        true
                    }
                    Gesture::None => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                self.gesture = Gesture::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                let zoom = 0.95_f32.powf(self.zoom_speed);
                // Scrolling up moves closer
                if dy > 0.0 {
                    self.dolly(zoom);
                } else if dy < 0.0 {
                    self.dolly(1.0 / zoom);
                }
                dy != 0.0
            }
            _ => false,
        }
    }

    /// Advances the controls by one step and places the camera. Returns `true`
    /// if the camera moved noticeably.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vector(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.make_safe();
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_vector();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        let moved = (camera.position - self.last_position).magnitude2() > EPS
            || (self.target - self.last_target).magnitude2() > EPS;
        if moved {
            self.last_position = camera.position;
            self.last_target = self.target;
        }
        moved
    }
}
