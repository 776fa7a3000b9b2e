//! Dialog service: requesting, routing and settling dialogs
//!
//! The dialog service is responsible for:
//! - Merging configuration layers and opening dialog instances
//! - Routing terminal events to the topmost dialog surface
//! - Turning surface intents into exactly one resolve or reject per dialog
//! - Rendering all open dialogs in stack order
//!
//! A service is an explicit object owned by the application. Independent
//! dialog scopes are independent services.

use super::form::FormContent;
use super::layer::{LayerStack, ModalStack};
use super::merge::{merge, EffectiveConfig};
use super::registry::{DialogInstance, Outcome, Registry};
use super::types::{Action, DialogConfig, DialogDefaults, DialogError, DialogId, DialogRejection, DialogResult};
use crate::surface::{ActionPress, DialogSurface, Stylesheet, SurfaceIntent};
use crossterm::event::Event;
use rand::Rng;
use ratatui::{layout::Rect, Frame};
use serde_json::Value;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Produces candidate ids for new dialogs
pub type IdSource = Box<dyn FnMut() -> DialogId + Send>;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 4;
const MAX_ID_ATTEMPTS: usize = 32;

/// Short random base-36 id
pub fn random_id() -> DialogId {
    let mut rng = rand::thread_rng();
    let id: String = (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    DialogId::new(id)
}

struct ServiceState {
    registry: Registry,
    renderer_defaults: DialogDefaults,
    stylesheet: Stylesheet,
    id_source: IdSource,
}

impl ServiceState {
    /// Next id that is neither pending nor mounted
    fn fresh_id(&mut self) -> DialogResult<DialogId> {
        let mut last = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.id_source)();
            if !self.registry.contains(&id) && self.registry.stack().surface(&id).is_none() {
                return Ok(id);
            }
            warn!("Dialog id {} is already in use, generating another", id);
            last = Some(id);
        }
        Err(DialogError::AlreadyExists(last.unwrap_or_else(|| DialogId::new(""))))
    }

    fn config_of(&self, id: &DialogId) -> Option<Arc<EffectiveConfig>> {
        self.registry.get(id).ok().map(|instance| instance.config.clone())
    }
}

fn lock_state(state: &Mutex<ServiceState>) -> MutexGuard<'_, ServiceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a cancel with the given value
fn cancel_outcome(config: &EffectiveConfig, value: Value, force_reject: bool) -> Outcome {
    if force_reject || config.reject_on_cancel {
        Outcome::Rejected(value)
    } else {
        Outcome::Resolved(value)
    }
}

/// Outcome of pressing `action`. A cancel action without a value settles
/// with the default cancel value.
fn action_outcome(config: &EffectiveConfig, action: &Action) -> Outcome {
    if action.is_cancel {
        let value = if action.value.is_null() {
            config.default_cancel_value.clone()
        } else {
            action.value.clone()
        };
        cancel_outcome(config, value, false)
    } else {
        Outcome::Resolved(action.value.clone())
    }
}

/// Run user code; a panic is logged and swallowed
fn run_guarded(what: &str, id: &DialogId, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!("{} for dialog {} panicked", what, id);
    }
}

/// Service that owns all pending dialogs of one scope
#[derive(Clone)]
pub struct DialogService {
    state: Arc<Mutex<ServiceState>>,
}

impl DialogService {
    /// Create a service mounting dialogs on `stack`
    pub fn new(stack: impl ModalStack + 'static) -> Self {
        Self::with_id_source(stack, random_id)
    }

    /// Create a service with a custom id generator
    pub fn with_id_source(
        stack: impl ModalStack + 'static,
        id_source: impl FnMut() -> DialogId + Send + 'static,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServiceState {
                registry: Registry::new(Box::new(stack)),
                renderer_defaults: DialogDefaults::default(),
                stylesheet: Stylesheet::default(),
                id_source: Box::new(id_source),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        lock_state(&self.state)
    }

    /// Open a dialog with no hook defaults
    pub fn request(&self, config: DialogConfig) -> DialogResult<DialogHandle> {
        self.request_with(&DialogDefaults::default(), config)
    }

    /// Open a dialog on top of the given hook defaults
    pub fn request_with(&self, hook: &DialogDefaults, config: DialogConfig) -> DialogResult<DialogHandle> {
        let mut state = self.lock();
        let effective = Arc::new(merge(&state.renderer_defaults, hook, &config));

        if effective.focused_action_count() > 1 {
            warn!(
                "Dialog has {} actions marked is_focused; the first one wins",
                effective.focused_action_count()
            );
        }

        let id = state.fresh_id()?;
        let (sender, receiver) = oneshot::channel();
        let surface = DialogSurface::new(id.clone(), effective.clone());
        let id = state
            .registry
            .add(DialogInstance::new(id, effective, sender), surface)?;

        debug!("Opened dialog {}", id);
        Ok(DialogHandle {
            id,
            receiver,
            service: Arc::downgrade(&self.state),
        })
    }

    /// Requester bound to hook-level defaults
    pub fn hook(&self, defaults: DialogDefaults) -> DialogRequester {
        DialogRequester {
            service: self.clone(),
            defaults: Arc::new(defaults),
        }
    }

    /// Context of a pending dialog
    pub fn get_context(&self, id: &DialogId) -> DialogResult<DialogContext> {
        let config = self
            .lock()
            .config_of(id)
            .ok_or_else(|| DialogError::NotFound(id.clone()))?;
        Ok(DialogContext {
            id: id.clone(),
            config,
            service: self.clone(),
        })
    }

    /// Replace the renderer-level defaults. Affects dialogs opened afterwards.
    pub fn set_renderer_defaults(&self, defaults: DialogDefaults) {
        self.lock().renderer_defaults = defaults;
    }

    pub fn renderer_defaults(&self) -> DialogDefaults {
        self.lock().renderer_defaults.clone()
    }

    pub fn set_stylesheet(&self, stylesheet: Stylesheet) {
        self.lock().stylesheet = stylesheet;
    }

    pub fn is_pending(&self, id: &DialogId) -> bool {
        self.lock().registry.contains(id)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn pending_ids(&self) -> Vec<DialogId> {
        self.lock().registry.ids()
    }

    /// Id of the dialog receiving input
    pub fn top_id(&self) -> Option<DialogId> {
        self.lock().registry.stack().top_id()
    }

    /// Run `f` on the mounted surface of `id`. `f` must not call back into
    /// the service.
    pub fn with_surface<R>(&self, id: &DialogId, f: impl FnOnce(&mut DialogSurface) -> R) -> Option<R> {
        let mut state = self.lock();
        state.registry.stack_mut().surface_mut(id).map(f)
    }

    /// Route a terminal event to the topmost dialog. Returns true when a
    /// dialog is open, since an open dialog captures all input.
    pub fn handle_event(&self, event: &Event) -> bool {
        let (id, intent) = {
            let mut state = self.lock();
            let stack = state.registry.stack_mut();
            let Some(id) = stack.top_id() else {
                return false;
            };
            let intent = stack
                .surface_mut(&id)
                .and_then(|surface| surface.handle_event(event));
            (id, intent)
        };

        if let Some(intent) = intent {
            self.apply(&id, intent);
        }
        true
    }

    /// Draw every open dialog, bottom to top
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut state = self.lock();
        let ServiceState {
            registry,
            stylesheet,
            ..
        } = &mut *state;
        registry.stack_mut().render(frame, area, stylesheet);
    }

    /// Press the button labelled `label`, as a click would.
    /// Returns false if the dialog or the button does not exist.
    pub fn click_action(&self, id: &DialogId, label: &str) -> bool {
        let intent = self
            .lock()
            .registry
            .stack_mut()
            .surface_mut(id)
            .and_then(|surface| surface.press_label(label));
        match intent {
            Some(intent) => {
                self.apply(id, intent);
                true
            }
            None => false,
        }
    }

    /// Cancel as Escape or the close button would
    pub fn cancel(&self, id: &DialogId) -> bool {
        self.close(id, false)
    }

    /// Click on the backdrop; cancels only if the dialog allows it
    pub fn backdrop_click(&self, id: &DialogId) -> bool {
        let allowed = self
            .lock()
            .config_of(id)
            .map(|config| config.backdrop_cancel)
            .unwrap_or(false);
        allowed && self.close(id, false)
    }

    /// Settle with the default cancel value. Rejects if `force_reject` is
    /// set, otherwise follows `reject_on_cancel`.
    pub fn force_cancel(&self, id: &DialogId, force_reject: bool) -> bool {
        self.close(id, force_reject)
    }

    /// Force-cancel every pending dialog, as on shutdown. Returns how many
    /// were settled.
    pub fn cancel_all(&self, force_reject: bool) -> usize {
        let instances = self.lock().registry.drain();
        let count = instances.len();
        for instance in instances {
            settle_cancelled(instance, force_reject);
        }
        count
    }

    /// Settle as if `action` was pressed. Click callbacks and form
    /// submission are not run.
    pub fn force_action(&self, id: &DialogId, action: &Action) -> bool {
        let mut state = self.lock();
        let Some(instance) = state.registry.remove(id) else {
            return false;
        };
        let outcome = action_outcome(&instance.config, action);
        instance.settle(outcome);
        true
    }

    fn apply(&self, id: &DialogId, intent: SurfaceIntent) {
        match intent {
            SurfaceIntent::Cancel => {
                self.close(id, false);
            }
            SurfaceIntent::Backdrop => {
                self.backdrop_click(id);
            }
            SurfaceIntent::Press(press) => self.press(id, press),
        }
    }

    /// Button press: callback, then form handling, then settlement
    fn press(&self, id: &DialogId, press: ActionPress) {
        let Some(config) = self.lock().config_of(id) else {
            return;
        };
        let ActionPress { action, form } = press;

        if let Some(callback) = &action.on_click {
            let context = DialogContext {
                id: id.clone(),
                config: config.clone(),
                service: self.clone(),
            };
            run_guarded("Click callback", id, || callback(&action, &context));
        }

        if action.is_submit {
            match form.as_ref() {
                Some(form) if config.is_return_submit => {
                    self.finish(id, Outcome::Resolved(form.data().to_value()));
                    return;
                }
                Some(form) => submit_natively(id, form),
                None => {}
            }
        }

        if action.no_action_return {
            return;
        }
        self.finish(id, action_outcome(&config, &action));
    }

    fn close(&self, id: &DialogId, force_reject: bool) -> bool {
        let mut state = self.lock();
        let Some(instance) = state.registry.remove(id) else {
            return false;
        };
        settle_cancelled(instance, force_reject);
        true
    }

    /// Terminal transition: unmount, remove and settle under one lock
    fn finish(&self, id: &DialogId, outcome: Outcome) -> bool {
        let mut state = self.lock();
        match state.registry.remove(id) {
            Some(instance) => {
                instance.settle(outcome);
                true
            }
            None => false,
        }
    }
}

fn settle_cancelled(instance: DialogInstance, force_reject: bool) {
    let outcome = cancel_outcome(
        &instance.config,
        instance.config.default_cancel_value.clone(),
        force_reject,
    );
    instance.settle(outcome);
}

fn submit_natively(id: &DialogId, form: &FormContent) {
    run_guarded("Form submit handler", id, || form.request_submit());
}

impl Default for DialogService {
    fn default() -> Self {
        Self::new(LayerStack::new())
    }
}

impl std::fmt::Debug for DialogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogService")
            .field("registry", &self.lock().registry)
            .finish()
    }
}

/// Request function bound to hook-level defaults
#[derive(Clone, Debug)]
pub struct DialogRequester {
    service: DialogService,
    defaults: Arc<DialogDefaults>,
}

impl DialogRequester {
    pub fn request(&self, config: DialogConfig) -> DialogResult<DialogHandle> {
        self.service.request_with(&self.defaults, config)
    }

    pub fn get_context(&self, id: &DialogId) -> DialogResult<DialogContext> {
        self.service.get_context(id)
    }

    pub fn defaults(&self) -> &DialogDefaults {
        &self.defaults
    }

    pub fn service(&self) -> &DialogService {
        &self.service
    }
}

/// Future of a requested dialog
///
/// Resolves with the settled value, or fails with the rejected value. If the
/// service is dropped first it fails with [`DialogRejection::Dropped`].
#[derive(Debug)]
pub struct DialogHandle {
    id: DialogId,
    receiver: oneshot::Receiver<Outcome>,
    service: Weak<Mutex<ServiceState>>,
}

impl DialogHandle {
    pub fn id(&self) -> &DialogId {
        &self.id
    }

    /// Context of the dialog, while it is pending
    pub fn context(&self) -> DialogResult<DialogContext> {
        let state = self
            .service
            .upgrade()
            .ok_or_else(|| DialogError::NotFound(self.id.clone()))?;
        DialogService { state }.get_context(&self.id)
    }
}

impl Future for DialogHandle {
    type Output = Result<Value, DialogRejection>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(Outcome::Resolved(value))) => Poll::Ready(Ok(value)),
            Poll::Ready(Ok(Outcome::Rejected(value))) => Poll::Ready(Err(DialogRejection::Rejected(value))),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DialogRejection::Dropped)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Handle on a pending dialog for settling it from code
#[derive(Clone, Debug)]
pub struct DialogContext {
    id: DialogId,
    config: Arc<EffectiveConfig>,
    service: DialogService,
}

impl DialogContext {
    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Service the dialog belongs to, e.g. for opening a nested dialog
    pub fn service(&self) -> &DialogService {
        &self.service
    }

    /// See [`DialogService::force_cancel`]
    pub fn force_cancel(&self, force_reject: bool) -> bool {
        self.service.force_cancel(&self.id, force_reject)
    }

    pub fn force_action(&self, action: &Action) -> bool {
        self.service.force_action(&self.id, action)
    }

    /// Press the first `is_focused` action
    pub fn force_default(&self) -> DialogResult<()> {
        if !self.service.is_pending(&self.id) {
            return Err(DialogError::NotFound(self.id.clone()));
        }
        let action = self
            .config
            .default_action()
            .ok_or_else(|| DialogError::NoDefaultAction(self.id.clone()))?;
        self.service.force_action(&self.id, action);
        Ok(())
    }
}
