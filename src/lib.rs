//! Promise-style modal dialogs for ratatui applications
//!
//! Request a dialog, get back a [`DialogHandle`] future, and await the user's
//! answer. The crate coordinates the lifecycle of every pending dialog:
//! configuration layers are merged, the dialog surface is pushed onto a modal
//! stack, input events are routed to the topmost surface, and exactly one
//! outcome (resolve or reject) is delivered per request.
//!
//! ```ignore
//! use hookdialog::{Action, DialogConfig, DialogService, LayerStack, Variant};
//!
//! let service = DialogService::new(LayerStack::new());
//! let handle = service.request(
//!     DialogConfig::new()
//!         .with_title("Delete item?")
//!         .with_content("This action cannot be undone.")
//!         .with_actions(vec![vec![
//!             Action::new("Cancel").cancel(true),
//!             Action::new("Delete").with_variant(Variant::Danger).with_value(true),
//!         ]]),
//! )?;
//!
//! // Feed terminal events with `service.handle_event(&event)` and draw with
//! // `service.render(frame, area)` from the UI loop, then:
//! let confirmed = handle.await;
//! ```

pub mod config;
pub mod dialog;
pub mod surface;

pub use dialog::{
    Action, ActionCallback, DialogConfig, DialogContent, DialogContext, DialogDefaults,
    DialogError, DialogHandle, DialogId, DialogRejection, DialogRequester, DialogResult,
    DialogService, EffectiveConfig, FormContent, FormData, FormField, LayerStack, ModalStack,
    Region, RegionMap, Variant, VariantMap,
};
pub use surface::{DialogSurface, Stylesheet, SurfaceIntent};
