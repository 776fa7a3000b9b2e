//! Pending dialog instances
//!
//! The registry owns every pending [`DialogInstance`] together with the
//! modal stack, so adding an instance always mounts its surface and removing
//! it always unmounts it.

use super::layer::ModalStack;
use super::merge::EffectiveConfig;
use super::types::{DialogError, DialogId, DialogResult};
use crate::surface::DialogSurface;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// How a dialog settled
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved(Value),
    Rejected(Value),
}

/// Continuation of the caller's pending future
pub type OutcomeSender = oneshot::Sender<Outcome>;

/// A dialog waiting for its user
#[derive(Debug)]
pub struct DialogInstance {
    pub id: DialogId,
    pub config: Arc<EffectiveConfig>,
    sender: OutcomeSender,
}

impl DialogInstance {
    pub fn new(id: DialogId, config: Arc<EffectiveConfig>, sender: OutcomeSender) -> Self {
        Self { id, config, sender }
    }

    /// Deliver the outcome. Consumes the instance, so it settles at most once.
    pub fn settle(self, outcome: Outcome) {
        debug!("Settling dialog {}: {:?}", self.id, outcome);
        // The caller may have dropped the handle already
        let _ = self.sender.send(outcome);
    }
}

/// Pending instances keyed by id, kept in lockstep with the modal stack
pub struct Registry {
    instances: HashMap<DialogId, DialogInstance>,
    stack: Box<dyn ModalStack>,
}

impl Registry {
    pub fn new(stack: Box<dyn ModalStack>) -> Self {
        Self {
            instances: HashMap::new(),
            stack,
        }
    }

    /// Store `instance` and mount `surface` for it. Returns the id the
    /// instance ended up under, as assigned by the modal stack.
    pub fn add(&mut self, mut instance: DialogInstance, surface: DialogSurface) -> DialogResult<DialogId> {
        if self.instances.contains_key(&instance.id) {
            return Err(DialogError::AlreadyExists(instance.id));
        }

        let id = self.stack.push_modal(instance.id.clone(), surface);
        if self.instances.contains_key(&id) {
            // The stack handed back an id that is already pending. Popping it
            // takes the surface just pushed, the older one stays mounted.
            self.stack.pop_modal(&id);
            return Err(DialogError::AlreadyExists(id));
        }
        if id != instance.id {
            debug!("Modal stack remounted dialog {} as {}", instance.id, id);
            instance.id = id.clone();
        }

        self.instances.insert(id.clone(), instance);
        Ok(id)
    }

    /// Unmount and take out the instance. `None` if it is not pending.
    pub fn remove(&mut self, id: &DialogId) -> Option<DialogInstance> {
        let instance = self.instances.remove(id)?;
        if !self.stack.pop_modal(id) {
            debug!("Dialog {} was not mounted when removed", id);
        }
        Some(instance)
    }

    pub fn get(&self, id: &DialogId) -> DialogResult<&DialogInstance> {
        self.instances
            .get(id)
            .ok_or_else(|| DialogError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Pending ids, sorted
    pub fn ids(&self) -> Vec<DialogId> {
        let mut ids: Vec<_> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn stack(&self) -> &dyn ModalStack {
        self.stack.as_ref()
    }

    pub fn stack_mut(&mut self) -> &mut dyn ModalStack {
        self.stack.as_mut()
    }

    /// Unmount everything and hand back the pending instances
    pub fn drain(&mut self) -> Vec<DialogInstance> {
        let ids = self.ids();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("instances", &self.ids())
            .field("mounted", &self.stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::layer::LayerStack;
    use crate::surface::Stylesheet;
    use ratatui::{layout::Rect, Frame};
    use serde_json::json;

    fn instance(id: &str) -> (DialogInstance, DialogSurface, oneshot::Receiver<Outcome>) {
        let (sender, receiver) = oneshot::channel();
        let config = Arc::new(EffectiveConfig::default());
        let id = DialogId::from(id);
        let surface = DialogSurface::new(id.clone(), config.clone());
        (DialogInstance::new(id, config, sender), surface, receiver)
    }

    fn titled(id: &str, title: &str) -> (DialogInstance, DialogSurface, oneshot::Receiver<Outcome>) {
        let (sender, receiver) = oneshot::channel();
        let config = Arc::new(EffectiveConfig {
            title: Some(title.to_string()),
            ..Default::default()
        });
        let id = DialogId::from(id);
        let surface = DialogSurface::new(id.clone(), config.clone());
        (DialogInstance::new(id, config, sender), surface, receiver)
    }

    #[test]
    fn test_add_mounts_and_remove_unmounts() {
        let mut registry = Registry::new(Box::new(LayerStack::new()));
        let (inst, surface, _rx) = instance("abcd");

        let id = registry.add(inst, surface).unwrap();
        assert_eq!(id, DialogId::from("abcd"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stack().len(), 1);

        assert!(registry.remove(&id).is_some());
        assert!(registry.is_empty());
        assert!(registry.stack().is_empty());
    }

    #[test]
    fn test_duplicate_add_fails_without_touching_stack() {
        let mut registry = Registry::new(Box::new(LayerStack::new()));
        let (first, surface, _rx1) = instance("same");
        registry.add(first, surface).unwrap();

        let (second, surface, _rx2) = instance("same");
        let err = registry.add(second, surface).unwrap_err();

        assert!(matches!(err, DialogError::AlreadyExists(_)));
        assert_eq!(registry.stack().len(), 1);
    }

    /// Mounts everything under one id, like a stack keyed by a fixed slot
    #[derive(Default)]
    struct FixedIdStack {
        surfaces: Vec<DialogSurface>,
    }

    impl ModalStack for FixedIdStack {
        fn push_modal(&mut self, _id: DialogId, mut surface: DialogSurface) -> DialogId {
            let id = DialogId::from("slot");
            surface.rebind(id.clone());
            self.surfaces.push(surface);
            id
        }

        fn pop_modal(&mut self, id: &DialogId) -> bool {
            match self.surfaces.iter().rposition(|surface| surface.id() == id) {
                Some(index) => {
                    self.surfaces.remove(index);
                    true
                }
                None => false,
            }
        }

        fn top_id(&self) -> Option<DialogId> {
            self.surfaces.last().map(|surface| surface.id().clone())
        }

        fn surface(&self, id: &DialogId) -> Option<&DialogSurface> {
            self.surfaces.iter().rev().find(|surface| surface.id() == id)
        }

        fn surface_mut(&mut self, id: &DialogId) -> Option<&mut DialogSurface> {
            self.surfaces.iter_mut().rev().find(|surface| surface.id() == id)
        }

        fn len(&self) -> usize {
            self.surfaces.len()
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _stylesheet: &Stylesheet) {}
    }

    #[test]
    fn test_stack_id_clash_keeps_existing_surface() {
        let mut registry = Registry::new(Box::new(FixedIdStack::default()));
        let (first, surface, _rx1) = titled("a", "First");
        let id = registry.add(first, surface).unwrap();
        assert_eq!(id, DialogId::from("slot"));

        let (second, surface, _rx2) = titled("b", "Second");
        let err = registry.add(second, surface).unwrap_err();

        assert!(matches!(err, DialogError::AlreadyExists(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stack().len(), 1);
        let mounted = registry.stack().surface(&id).unwrap();
        assert_eq!(mounted.config().title.as_deref(), Some("First"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut registry = Registry::new(Box::new(LayerStack::new()));
        assert!(registry.remove(&DialogId::from("nope")).is_none());
    }

    #[test]
    fn test_get_not_found() {
        let registry = Registry::new(Box::new(LayerStack::new()));
        let err = registry.get(&DialogId::from("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_settle_delivers_once() {
        let mut registry = Registry::new(Box::new(LayerStack::new()));
        let (inst, surface, rx) = instance("abcd");
        let id = registry.add(inst, surface).unwrap();

        registry.remove(&id).unwrap().settle(Outcome::Resolved(json!(true)));

        assert_eq!(rx.await.unwrap(), Outcome::Resolved(json!(true)));
        assert!(registry.remove(&id).is_none());
    }

    #[test]
    fn test_drain_empties_both() {
        let mut registry = Registry::new(Box::new(LayerStack::new()));
        let mut receivers = Vec::new();
        for id in ["a", "b", "c"] {
            let (inst, surface, rx) = instance(id);
            registry.add(inst, surface).unwrap();
            receivers.push(rx);
        }

        let drained = registry.drain();
        assert_eq!(drained.len(), 3);
        assert!(registry.is_empty());
        assert!(registry.stack().is_empty());
    }
}
