//! Debug panel: named controls bound to scene properties.
//!
//! A control reads and writes one property of the [`Scene`]. Toggles hold a
//! boolean, sliders a number that is clamped to their range and snapped to
//! their step. In the native build the controls are driven from the keyboard.

use anyhow::bail;
use winit::keyboard::KeyCode;

use crate::scene::{MaterialId, MeshId, Scene, SceneHandles};

/// Scene property a control is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    Visible(MeshId),
    Wireframe(MaterialId),
    AoMapIntensity(MaterialId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    Toggle,
    Slider { min: f64, max: f64, step: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f64),
}

#[derive(Clone, Debug)]
pub struct Control {
    pub name: String,
    pub binding: Binding,
    pub kind: ControlKind,
}

impl Control {
    pub fn toggle(name: &str, binding: Binding) -> Self {
        Self {
            name: name.to_string(),
            binding,
            kind: ControlKind::Toggle,
        }
    }

    pub fn slider(name: &str, binding: Binding, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.to_string(),
            binding,
            kind: ControlKind::Slider { min, max, step },
        }
    }

    /// Clamps to the slider range and snaps to its step.
    fn normalize(&self, value: f64) -> f64 {
        match self.kind {
            ControlKind::Slider { min, max, step } => {
                if value.is_nan() {
                    return min;
                }
                let value = value.clamp(min, max);
                let snapped = if step > 0.0 {
                    min + ((value - min) / step).round() * step
                } else {
                    value
                };
                // Strip the binary noise left by multiplying with the step
                let snapped = (snapped * 1e9).round() / 1e9;
                snapped.clamp(min, max)
            }
            ControlKind::Toggle => value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DebugPanel {
    controls: Vec<Control>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            controls: Vec::new(),
        }
    }

    /// The three showcase controls: sphere visibility, wireframe and ambient occlusion.
    pub fn for_scene(handles: &SceneHandles) -> Self {
        let mut panel = Self::new();
        panel.add(Control::toggle("visible", Binding::Visible(handles.sphere)));
        panel.add(Control::toggle(
            "Wireframe",
            Binding::Wireframe(handles.material),
        ));
        panel.add(Control::slider(
            "Ambient Occlusion",
            Binding::AoMapIntensity(handles.material),
            0.0,
            1.0,
            0.01,
        ));
        panel
    }

    pub fn add(&mut self, control: Control) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    fn control(&self, name: &str) -> anyhow::Result<&Control> {
        match self.controls.iter().find(|c| c.name == name) {
            Some(control) => Ok(control),
            None => bail!("no control named {name:?}"),
        }
    }

    pub fn get(&self, scene: &Scene, name: &str) -> anyhow::Result<ControlValue> {
        let control = self.control(name)?;
        Ok(read(scene, control.binding))
    }

    /// Writes `value` through the named control and returns what was stored.
    pub fn set(
        &self,
        scene: &mut Scene,
        name: &str,
        value: ControlValue,
    ) -> anyhow::Result<ControlValue> {
        let control = self.control(name)?;
        let stored = match (control.kind, value) {
            (ControlKind::Toggle, ControlValue::Bool(b)) => ControlValue::Bool(b),
            (ControlKind::Slider { .. }, ControlValue::Number(n)) => {
                ControlValue::Number(control.normalize(n))
            }
            (kind, value) => bail!("control {name:?} ({kind:?}) cannot take {value:?}"),
        };
        write(scene, control.binding, stored)?;
        log::info!("{} = {:?}", control.name, stored);
        Ok(stored)
    }

    /// Flips a toggle.
    pub fn toggle(&self, scene: &mut Scene, name: &str) -> anyhow::Result<ControlValue> {
        match self.get(scene, name)? {
            ControlValue::Bool(b) => self.set(scene, name, ControlValue::Bool(!b)),
            other => bail!("control {name:?} is not a toggle ({other:?})"),
        }
    }

    /// Moves a slider by `steps` increments of its step.
    pub fn nudge(&self, scene: &mut Scene, name: &str, steps: i32) -> anyhow::Result<ControlValue> {
        let control = self.control(name)?;
        let ControlKind::Slider { step, .. } = control.kind else {
            bail!("control {name:?} is not a slider");
        };
        match self.get(scene, name)? {
            ControlValue::Number(n) => {
                self.set(scene, name, ControlValue::Number(n + step * steps as f64))
            }
            other => bail!("control {name:?} holds {other:?}"),
        }
    }

    /// Keyboard rendition of the panel: `V` toggles the first toggle, `W` the
    /// second, `[` and `]` move the first slider.
    pub fn handle_key(&self, scene: &mut Scene, key: KeyCode) -> Option<ControlValue> {
        let toggles: Vec<&Control> = self
            .controls
            .iter()
            .filter(|c| c.kind == ControlKind::Toggle)
            .collect();
        let slider = self
            .controls
            .iter()
            .find(|c| matches!(c.kind, ControlKind::Slider { .. }));
        let result = match key {
            KeyCode::KeyV => toggles.first().map(|c| self.toggle(scene, &c.name)),
            KeyCode::KeyW => toggles.get(1).map(|c| self.toggle(scene, &c.name)),
            KeyCode::BracketLeft => slider.map(|c| self.nudge(scene, &c.name, -1)),
            KeyCode::BracketRight => slider.map(|c| self.nudge(scene, &c.name, 1)),
            _ => None,
        }?;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn read(scene: &Scene, binding: Binding) -> ControlValue {
    match binding {
        Binding::Visible(mesh) => ControlValue::Bool(scene.mesh(mesh).visible),
        Binding::Wireframe(material) => ControlValue::Bool(scene.material(material).wireframe),
        Binding::AoMapIntensity(material) => {
            ControlValue::Number(scene.material(material).ao_map_intensity() as f64)
        }
    }
}

fn write(scene: &mut Scene, binding: Binding, value: ControlValue) -> anyhow::Result<()> {
    match (binding, value) {
        (Binding::Visible(mesh), ControlValue::Bool(b)) => scene.mesh_mut(mesh).visible = b,
        (Binding::Wireframe(material), ControlValue::Bool(b)) => {
            scene.material_mut(material).wireframe = b
        }
        (Binding::AoMapIntensity(material), ControlValue::Number(n)) => {
            scene.material_mut(material).set_ao_map_intensity(n as f32)
        }
        (binding, value) => bail!("{value:?} does not fit {binding:?}"),
    }
    Ok(())
}
