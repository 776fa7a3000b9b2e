//! Modal stack
//!
//! The [`ModalStack`] trait is the seam between the dialog service and
//! whatever mounts dialogs on screen. [`LayerStack`] is the default
//! implementation: it keeps surfaces as z-ordered layers, gives input focus
//! to the newest one and hands focus back when a layer is removed.

use super::types::DialogId;
use crate::surface::{DialogSurface, Stylesheet};
use ratatui::{layout::Rect, Frame};

/// Mounts and unmounts dialog surfaces
pub trait ModalStack: Send {
    /// Mount a surface on top. Returns the id it is mounted under, which may
    /// differ from `id`; later calls must use the returned id.
    fn push_modal(&mut self, id: DialogId, surface: DialogSurface) -> DialogId;

    /// Unmount a surface. Returns false if nothing is mounted under `id`.
    /// If several surfaces share `id`, the most recently pushed one goes.
    fn pop_modal(&mut self, id: &DialogId) -> bool;

    /// Id of the surface receiving input
    fn top_id(&self) -> Option<DialogId>;

    fn surface(&self, id: &DialogId) -> Option<&DialogSurface>;

    fn surface_mut(&mut self, id: &DialogId) -> Option<&mut DialogSurface>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw all mounted surfaces, bottom to top
    fn render(&mut self, frame: &mut Frame, area: Rect, stylesheet: &Stylesheet);
}

/// A mounted dialog
#[derive(Debug)]
pub struct DialogLayer {
    surface: DialogSurface,

    /// Rendering order (higher = on top)
    z_index: i32,

    /// Layer that held focus before this one was pushed
    restore_focus: Option<DialogId>,
}

impl DialogLayer {
    pub fn new(surface: DialogSurface, z_index: i32, restore_focus: Option<DialogId>) -> Self {
        Self {
            surface,
            z_index,
            restore_focus,
        }
    }

    pub fn dialog_id(&self) -> &DialogId {
        self.surface.id()
    }

    pub fn surface(&self) -> &DialogSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DialogSurface {
        &mut self.surface
    }

    pub fn is_focused(&self) -> bool {
        self.surface.has_focus()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.surface.set_has_focus(focused);
    }
}

/// Default modal stack with z-ordered layers and focus restoration
#[derive(Debug, Default)]
pub struct LayerStack {
    layers: Vec<DialogLayer>,
    next_z: i32,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers in rendering order
    pub fn layers(&self) -> &[DialogLayer] {
        &self.layers
    }

    pub fn get_layer(&self, id: &DialogId) -> Option<&DialogLayer> {
        self.layers.iter().find(|layer| layer.dialog_id() == id)
    }

    pub fn focused_layer(&self) -> Option<&DialogLayer> {
        self.layers.iter().find(|layer| layer.is_focused())
    }

    /// Topmost layer (highest z-index)
    pub fn topmost_layer(&self) -> Option<&DialogLayer> {
        self.layers.iter().max_by_key(|layer| layer.z_index)
    }

    fn contains(&self, id: &DialogId) -> bool {
        self.get_layer(id).is_some()
    }

    /// `id`, or `id-N` with the smallest free N if `id` is taken
    fn free_id(&self, id: DialogId) -> DialogId {
        if !self.contains(&id) {
            return id;
        }
        let mut n = 1;
        loop {
            let candidate = DialogId::new(format!("{}-{}", id, n));
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn set_focus(&mut self, id: Option<&DialogId>) {
        for layer in &mut self.layers {
            let focused = Some(layer.dialog_id()) == id;
            layer.set_focused(focused);
        }
    }

    fn sort_layers(&mut self) {
        self.layers.sort_by_key(|layer| layer.z_index);
    }
}

impl ModalStack for LayerStack {
    fn push_modal(&mut self, id: DialogId, mut surface: DialogSurface) -> DialogId {
        let id = self.free_id(id);
        surface.rebind(id.clone());

        let previous = self.focused_layer().map(|layer| layer.dialog_id().clone());
        let z_index = self.next_z;
        self.next_z += 1;

        self.layers.push(DialogLayer::new(surface, z_index, previous));
        self.sort_layers();
        self.set_focus(Some(&id));

        tracing::debug!("Pushed dialog layer {} at z-index {}", id, z_index);
        id
    }

    fn pop_modal(&mut self, id: &DialogId) -> bool {
        let Some(index) = self.layers.iter().rposition(|layer| layer.dialog_id() == id) else {
            return false;
        };
        let layer = self.layers.remove(index);

        // Layers pushed on top of this one fall back to what it restored to
        for other in &mut self.layers {
            if other.restore_focus.as_ref() == Some(id) {
                other.restore_focus = layer.restore_focus.clone();
            }
        }

        if layer.is_focused() {
            let target = layer
                .restore_focus
                .filter(|previous| self.contains(previous))
                .or_else(|| self.topmost_layer().map(|top| top.dialog_id().clone()));
            self.set_focus(target.as_ref());
        }

        tracing::debug!("Popped dialog layer {}", id);
        true
    }

    fn top_id(&self) -> Option<DialogId> {
        self.focused_layer()
            .or_else(|| self.topmost_layer())
            .map(|layer| layer.dialog_id().clone())
    }

    fn surface(&self, id: &DialogId) -> Option<&DialogSurface> {
        self.get_layer(id).map(DialogLayer::surface)
    }

    fn surface_mut(&mut self, id: &DialogId) -> Option<&mut DialogSurface> {
        self.layers
            .iter_mut()
            .find(|layer| layer.dialog_id() == id)
            .map(DialogLayer::surface_mut)
    }

    fn len(&self) -> usize {
        self.layers.len()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, stylesheet: &Stylesheet) {
        for layer in &mut self.layers {
            layer.surface.render(frame, area, stylesheet);
        }
    }
}
