//! Dialog lifecycle coordination
//!
//! This module holds everything between "the caller asked for a dialog" and
//! "the caller's future settled":
//!
//! - [`types`]: configuration, actions, ids and errors
//! - [`merge`]: folding renderer, hook and per-call configuration into one
//! - [`registry`]: the pending instances, kept in lockstep with the modal stack
//! - [`layer`]: the modal stack seam and its default layered implementation
//! - [`manager`]: the service that creates, routes and settles dialogs
//! - [`navigation`]: key bindings used by dialog surfaces
//! - [`form`]: form content and its serialized values

pub mod form;
pub mod layer;
pub mod manager;
pub mod merge;
pub mod navigation;
pub mod registry;
pub mod types;

pub use form::{FormContent, FormData, FormField, SubmitHandler};
pub use layer::{DialogLayer, LayerStack, ModalStack};
pub use manager::{DialogContext, DialogHandle, DialogRequester, DialogService};
pub use merge::{merge, EffectiveConfig};
pub use registry::{DialogInstance, Outcome, Registry};
pub use types::*;
