//! Dialogs offered by the demo commands

use hookdialog::{Action, DialogConfig, FormContent, FormField, Variant};
use serde_json::json;
use tracing::{info, warn};

pub fn confirm(title: &str, message: &str, danger: bool) -> DialogConfig {
    let variant = if danger { Variant::Danger } else { Variant::Primary };
    DialogConfig::new()
        .with_title(title)
        .with_content(message)
        .with_actions(vec![vec![
            Action::new("Cancel").cancel(true).with_value(false),
            Action::new("Confirm")
                .with_variant(variant)
                .with_value(true)
                .focused(true),
        ]])
}

/// No actions: the dialog shows a single OK button and the backdrop cancels
pub fn alert(title: Option<&str>, message: &str) -> DialogConfig {
    let config = DialogConfig::new().with_content(message);
    match title {
        Some(title) => config.with_title(title),
        None => config,
    }
}

pub fn form(title: &str, fields: &[String]) -> DialogConfig {
    let content = fields
        .iter()
        .fold(FormContent::new(), |form, name| form.with_field(FormField::new(name.as_str())))
        .on_submit(|data| info!("Form submitted: {}", data.to_value()));

    DialogConfig::new()
        .with_title(title)
        .with_content(content)
        .return_submit(true)
        .with_actions(vec![vec![
            Action::new("Cancel").cancel(true),
            Action::new("Submit").with_variant(Variant::Success).submit(true),
        ]])
}

/// One button per option, plus a help button that opens a nested dialog
pub fn choices(title: &str, options: &[String]) -> DialogConfig {
    let buttons: Vec<Action> = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            Action::new(option.as_str())
                .with_value(json!({"index": index, "option": option}))
                .with_variant(Variant::Info)
                .focused(index == 0)
        })
        .collect();

    let help = Action::new("Help")
        .on_left(true)
        .with_variant(Variant::Neutral)
        .no_action_return(true)
        .on_click(|_, context| {
            let request = DialogConfig::new()
                .with_title("Help")
                .with_content("Pick an option with Tab and Enter, or click it. Esc cancels.");
            if let Err(e) = context.service().request(request) {
                warn!("Could not open help: {}", e);
            }
        });

    DialogConfig::new()
        .with_title(title)
        .with_actions(vec![buttons, vec![help, Action::new("Cancel").cancel(true)]])
}
