//! Dialog presentation surface
//!
//! A [`DialogSurface`] is the on-screen half of one pending dialog. It owns a
//! read-only view of the effective configuration plus the state that only
//! matters while the dialog is visible: button layout, focus, the values
//! typed into form fields and the hit regions of the last render. It never
//! settles anything itself; input is translated into a [`SurfaceIntent`]
//! that the dialog service acts on.

pub mod render;
pub mod theme;

pub use theme::{base_variant_style, Stylesheet};

use crate::dialog::merge::EffectiveConfig;
use crate::dialog::navigation::{DialogKeymap, SurfaceCommand};
use crate::dialog::types::{Action, DialogId, Region, Variant};
use crate::dialog::FormContent;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::sync::Arc;

/// Element that can hold keyboard focus inside a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    CloseButton,
    /// Form field, by index
    Field(usize),
    /// Action button, by index into [`DialogSurface::buttons`]
    Button(usize),
}

/// An action button placed in a row
#[derive(Debug, Clone)]
pub struct ButtonSlot {
    pub action: Action,
    pub row: usize,
    /// Position of the action within its configured row
    pub column: usize,
    pub on_left: bool,
}

/// One rendered row of buttons, split into its left and right groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRow {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// A button press, with the form as it stood when the button was pressed
#[derive(Debug, Clone)]
pub struct ActionPress {
    pub action: Action,
    pub form: Option<FormContent>,
}

/// What the user asked the dialog to do
#[derive(Debug, Clone)]
pub enum SurfaceIntent {
    /// Escape or the close button
    Cancel,
    /// Click outside the dialog
    Backdrop,
    /// An action button was activated
    Press(ActionPress),
}

/// Screen areas recorded by the last render
#[derive(Debug, Clone, Default)]
pub(crate) struct HitRegions {
    pub dialog: Option<Rect>,
    pub close_button: Option<Rect>,
    pub fields: Vec<(usize, Rect)>,
    pub buttons: Vec<(usize, Rect)>,
}

/// On-screen state of one dialog
#[derive(Debug)]
pub struct DialogSurface {
    id: DialogId,
    config: Arc<EffectiveConfig>,
    buttons: Vec<ButtonSlot>,
    rows: Vec<ActionRow>,
    form: Option<FormContent>,
    focus_order: Vec<FocusTarget>,
    focused: Option<usize>,
    has_focus: bool,
    hits: HitRegions,
    keymap: DialogKeymap,
}

impl DialogSurface {
    pub fn new(id: DialogId, config: Arc<EffectiveConfig>) -> Self {
        let (buttons, rows) = layout_rows(&config.actions);
        let form = config
            .content
            .as_ref()
            .and_then(|content| content.as_form())
            .cloned();

        let mut focus_order = Vec::new();
        if config.show_close_button {
            focus_order.push(FocusTarget::CloseButton);
        }
        if let Some(form) = &form {
            focus_order.extend((0..form.fields.len()).map(FocusTarget::Field));
        }
        focus_order.extend((0..buttons.len()).map(FocusTarget::Button));

        // Preferred action first, then the first focusable, then the container.
        // Among several focused actions the first in configuration order wins,
        // whichever group it is drawn in.
        let focused = buttons
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.action.is_focused)
            .min_by_key(|(_, slot)| (slot.row, slot.column))
            .map(|(button, _)| button)
            .and_then(|button| {
                focus_order
                    .iter()
                    .position(|target| *target == FocusTarget::Button(button))
            })
            .or(if focus_order.is_empty() { None } else { Some(0) });

        Self {
            id,
            config,
            buttons,
            rows,
            form,
            focus_order,
            focused,
            has_focus: true,
            hits: HitRegions::default(),
            keymap: DialogKeymap::new(),
        }
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    /// Point the surface at the id the modal stack assigned
    pub fn rebind(&mut self, id: DialogId) {
        self.id = id;
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Id of the title element, which labels the dialog. `None` without a title.
    pub fn title_id(&self) -> Option<String> {
        self.config.title.as_ref().map(|_| format!("{}-title", self.id))
    }

    pub fn buttons(&self) -> &[ButtonSlot] {
        &self.buttons
    }

    pub fn rows(&self) -> &[ActionRow] {
        &self.rows
    }

    /// Form as currently edited, if the content is a form
    pub fn form(&self) -> Option<&FormContent> {
        self.form.as_ref()
    }

    pub fn focus_order(&self) -> &[FocusTarget] {
        &self.focus_order
    }

    /// Focused element; `None` means the dialog container itself
    pub fn focused_target(&self) -> Option<FocusTarget> {
        self.focused.and_then(|index| self.focus_order.get(index).copied())
    }

    /// Label of the focused button, if a button holds focus
    pub fn focused_button_label(&self) -> Option<&str> {
        match self.focused_target()? {
            FocusTarget::Button(index) => self.buttons.get(index).map(|slot| slot.action.title.as_str()),
            _ => None,
        }
    }

    /// Move focus to `target`. Returns false if it is not focusable here.
    pub fn set_focus(&mut self, target: FocusTarget) -> bool {
        match self.focus_order.iter().position(|candidate| *candidate == target) {
            Some(index) => {
                self.focused = Some(index);
                true
            }
            None => false,
        }
    }

    /// Whether this dialog is the one receiving input
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn set_has_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    pub fn set_field_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.form.as_mut().and_then(|form| form.field_mut(index)) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn keymap_mut(&mut self) -> &mut DialogKeymap {
        &mut self.keymap
    }

    /// Outer rectangle of the last render
    pub fn dialog_rect(&self) -> Option<Rect> {
        self.hits.dialog
    }

    pub fn close_button_rect(&self) -> Option<Rect> {
        self.hits.close_button
    }

    /// Rectangle of the first button labelled `label` in the last render
    pub fn button_rect(&self, label: &str) -> Option<Rect> {
        let index = self.button_index(label)?;
        self.hits
            .buttons
            .iter()
            .find(|(button, _)| *button == index)
            .map(|(_, rect)| *rect)
    }

    pub fn field_rect(&self, index: usize) -> Option<Rect> {
        self.hits
            .fields
            .iter()
            .find(|(field, _)| *field == index)
            .map(|(_, rect)| *rect)
    }

    /// Press the first button labelled `label`
    pub fn press_label(&mut self, label: &str) -> Option<SurfaceIntent> {
        let index = self.button_index(label)?;
        self.set_focus(FocusTarget::Button(index));
        Some(self.press(index))
    }

    /// Translate a terminal event into an intent
    pub fn handle_event(&mut self, event: &Event) -> Option<SurfaceIntent> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<SurfaceIntent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if let Some(FocusTarget::Field(index)) = self.focused_target() {
            match key.code {
                KeyCode::Char(c)
                    if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    if let Some(field) = self.form.as_mut().and_then(|form| form.field_mut(index)) {
                        field.value.push(c);
                    }
                    return None;
                }
                KeyCode::Backspace => {
                    if let Some(field) = self.form.as_mut().and_then(|form| form.field_mut(index)) {
                        field.value.pop();
                    }
                    return None;
                }
                KeyCode::Enter => return self.implicit_submit(),
                _ => {}
            }
        }

        match self.keymap.command_for(key)? {
            SurfaceCommand::Cancel => Some(SurfaceIntent::Cancel),
            SurfaceCommand::FocusNext => {
                self.cycle_focus(true);
                None
            }
            SurfaceCommand::FocusPrevious => {
                self.cycle_focus(false);
                None
            }
            SurfaceCommand::Activate => self.activate_focused(),
            SurfaceCommand::MoveLeft => {
                self.step_button(false);
                None
            }
            SurfaceCommand::MoveRight => {
                self.step_button(true);
                None
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<SurfaceIntent> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let (x, y) = (mouse.column, mouse.row);

        // Nothing to hit before the first render
        let dialog = self.hits.dialog?;
        if !contains(dialog, x, y) {
            return Some(SurfaceIntent::Backdrop);
        }
        if self.hits.close_button.is_some_and(|rect| contains(rect, x, y)) {
            return Some(SurfaceIntent::Cancel);
        }
        if let Some(index) = hit(&self.hits.buttons, x, y) {
            self.set_focus(FocusTarget::Button(index));
            return Some(self.press(index));
        }
        if let Some(index) = hit(&self.hits.fields, x, y) {
            self.set_focus(FocusTarget::Field(index));
        }
        None
    }

    fn cycle_focus(&mut self, forward: bool) {
        let len = self.focus_order.len();
        if len == 0 {
            return;
        }
        self.focused = Some(match (self.focused, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(index), true) => (index + 1) % len,
            (Some(index), false) => (index + len - 1) % len,
        });
    }

    fn step_button(&mut self, forward: bool) {
        let Some(FocusTarget::Button(index)) = self.focused_target() else {
            return;
        };
        let next = if forward {
            (index + 1).min(self.buttons.len().saturating_sub(1))
        } else {
            index.saturating_sub(1)
        };
        self.set_focus(FocusTarget::Button(next));
    }

    fn activate_focused(&mut self) -> Option<SurfaceIntent> {
        match self.focused_target()? {
            FocusTarget::CloseButton => Some(SurfaceIntent::Cancel),
            FocusTarget::Button(index) => Some(self.press(index)),
            FocusTarget::Field(_) => None,
        }
    }

    /// Enter inside a field presses the first submit button
    fn implicit_submit(&mut self) -> Option<SurfaceIntent> {
        let index = self.buttons.iter().position(|slot| slot.action.is_submit)?;
        Some(self.press(index))
    }

    fn press(&self, index: usize) -> SurfaceIntent {
        SurfaceIntent::Press(ActionPress {
            action: self.buttons[index].action.clone(),
            form: self.form.clone(),
        })
    }

    fn button_index(&self, label: &str) -> Option<usize> {
        self.buttons.iter().position(|slot| slot.action.title == label)
    }

    /// Class list of a region: base class first, then the configured one
    pub fn region_classes(&self, region: Region) -> Vec<String> {
        theme::base_class(region)
            .map(str::to_string)
            .into_iter()
            .chain(self.config.class_names.get(region).cloned())
            .collect()
    }

    /// Class list of an action button
    pub fn button_classes(&self, index: usize) -> Vec<String> {
        let Some(slot) = self.buttons.get(index) else {
            return Vec::new();
        };
        let mut classes = self.region_classes(Region::ActionButton);
        classes.insert(1, theme::variant_class(slot.action.effective_variant()));
        classes.extend(slot.action.class_name.clone());
        classes
    }

    /// Style of a region: class styles, then the inline style
    pub fn region_style(&self, region: Region, stylesheet: &Stylesheet) -> Style {
        let inline = self.config.styles.get(region).copied().unwrap_or_default();
        stylesheet.resolve(&self.region_classes(region)).patch(inline)
    }

    /// Style of an action button
    pub fn button_style(&self, index: usize, stylesheet: &Stylesheet) -> Style {
        let Some(slot) = self.buttons.get(index) else {
            return Style::default();
        };
        let variant = slot.action.effective_variant();
        let mut style = base_variant_style(variant).patch(stylesheet.resolve(&self.button_classes(index)));
        if let Some(variant_style) = self.config.variant_styles.get(variant) {
            style = style.patch(*variant_style);
        }
        if let Some(button_style) = self.config.styles.get(Region::ActionButton) {
            style = style.patch(*button_style);
        }
        if let Some(own) = slot.action.style {
            style = style.patch(own);
        }
        style
    }
}

/// Split configured rows into button slots. No actions gives a single OK
/// button; empty rows are dropped.
fn layout_rows(actions: &[Vec<Action>]) -> (Vec<ButtonSlot>, Vec<ActionRow>) {
    let implicit = [vec![Action::new("OK").with_variant(Variant::Primary)]];
    let source: &[Vec<Action>] = if actions.is_empty() { &implicit } else { actions };

    let mut buttons = Vec::new();
    let mut rows = Vec::new();
    for row in source.iter().filter(|row| !row.is_empty()) {
        let row_index = rows.len();
        let mut layout = ActionRow::default();
        for on_left in [true, false] {
            for (column, action) in row
                .iter()
                .enumerate()
                .filter(|(_, action)| action.is_on_left == on_left)
            {
                let index = buttons.len();
                buttons.push(ButtonSlot {
                    action: action.clone(),
                    row: row_index,
                    column,
                    on_left,
                });
                if on_left {
                    layout.left.push(index);
                } else {
                    layout.right.push(index);
                }
            }
        }
        rows.push(layout);
    }
    (buttons, rows)
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn hit(regions: &[(usize, Rect)], x: u16, y: u16) -> Option<usize> {
    regions
        .iter()
        .find(|(_, rect)| contains(*rect, x, y))
        .map(|(index, _)| *index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogContent, FormField};
    use ratatui::style::Color;
    use serde_json::json;

    fn surface(config: EffectiveConfig) -> DialogSurface {
        DialogSurface::new(DialogId::from("abcd"), Arc::new(config))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn pressed_title(intent: Option<SurfaceIntent>) -> Option<String> {
        match intent? {
            SurfaceIntent::Press(press) => Some(press.action.title),
            _ => None,
        }
    }

    fn form_config() -> EffectiveConfig {
        EffectiveConfig {
            content: Some(DialogContent::Form(
                FormContent::new()
                    .with_field(FormField::new("a"))
                    .with_field(FormField::new("b")),
            )),
            actions: vec![vec![
                Action::new("Cancel").cancel(true),
                Action::new("Save").submit(true),
            ]],
            ..Default::default()
        }
    }

    #[test]
    fn test_implicit_ok_row() {
        let surface = surface(EffectiveConfig::default());

        assert_eq!(surface.buttons().len(), 1);
        assert_eq!(surface.buttons()[0].action.title, "OK");
        assert_eq!(surface.buttons()[0].action.variant, Some(Variant::Primary));
        assert_eq!(surface.focused_button_label(), Some("OK"));
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let surface = surface(EffectiveConfig {
            actions: vec![vec![], vec![Action::new("A")], vec![]],
            ..Default::default()
        });

        assert_eq!(surface.rows().len(), 1);
        assert_eq!(surface.buttons()[0].row, 0);

        let empty = super::DialogSurface::new(
            DialogId::from("x"),
            Arc::new(EffectiveConfig {
                actions: vec![vec![]],
                ..Default::default()
            }),
        );
        assert!(empty.buttons().is_empty());
        assert_eq!(empty.focused_target(), None);
    }

    #[test]
    fn test_left_bucket_before_right() {
        let surface = surface(EffectiveConfig {
            actions: vec![vec![
                Action::new("Right1"),
                Action::new("Left").on_left(true),
                Action::new("Right2"),
            ]],
            ..Default::default()
        });

        let titles: Vec<_> = surface.buttons().iter().map(|s| s.action.title.as_str()).collect();
        assert_eq!(titles, vec!["Left", "Right1", "Right2"]);
        assert_eq!(surface.rows()[0], ActionRow { left: vec![0], right: vec![1, 2] });
    }

    #[test]
    fn test_initial_focus_prefers_focused_action() {
        let surface = surface(EffectiveConfig {
            show_close_button: true,
            actions: vec![vec![Action::new("A"), Action::new("B").focused(true)]],
            ..Default::default()
        });
        assert_eq!(surface.focused_button_label(), Some("B"));

        let surface = super::DialogSurface::new(
            DialogId::from("y"),
            Arc::new(EffectiveConfig {
                show_close_button: true,
                actions: vec![vec![Action::new("A")]],
                ..Default::default()
            }),
        );
        assert_eq!(surface.focused_target(), Some(FocusTarget::CloseButton));
    }

    #[test]
    fn test_several_focused_actions_follow_configuration_order() {
        let config = EffectiveConfig {
            actions: vec![
                vec![Action::new("Skip")],
                vec![
                    Action::new("A").focused(true),
                    Action::new("B").focused(true).on_left(true),
                ],
            ],
            ..Default::default()
        };
        let default_title = config.default_action().map(|action| action.title.clone());
        let surface = surface(config);

        // B is drawn first but A comes first in the row
        assert_eq!(surface.buttons()[1].action.title, "B");
        assert_eq!(surface.focused_button_label(), Some("A"));
        assert_eq!(default_title.as_deref(), Some("A"));
    }

    #[test]
    fn test_tab_wraps_both_ways() {
        let mut surface = surface(EffectiveConfig {
            actions: vec![vec![Action::new("A"), Action::new("B"), Action::new("C")]],
            ..Default::default()
        });
        assert_eq!(surface.focused_button_label(), Some("A"));

        surface.handle_event(&key(KeyCode::BackTab));
        assert_eq!(surface.focused_button_label(), Some("C"));

        surface.handle_event(&key(KeyCode::Tab));
        assert_eq!(surface.focused_button_label(), Some("A"));

        surface.handle_event(&key(KeyCode::Right));
        surface.handle_event(&key(KeyCode::Right));
        surface.handle_event(&key(KeyCode::Right));
        assert_eq!(surface.focused_button_label(), Some("C"));
    }

    #[test]
    fn test_escape_and_enter() {
        let mut surface = surface(EffectiveConfig {
            actions: vec![vec![Action::new("No"), Action::new("Yes").focused(true)]],
            ..Default::default()
        });

        assert!(matches!(
            surface.handle_event(&key(KeyCode::Esc)),
            Some(SurfaceIntent::Cancel)
        ));
        assert_eq!(pressed_title(surface.handle_event(&key(KeyCode::Enter))), Some("Yes".into()));
        assert_eq!(
            pressed_title(surface.handle_event(&key(KeyCode::Char(' ')))),
            Some("Yes".into())
        );
    }

    #[test]
    fn test_typing_into_form_fields() {
        let mut surface = surface(form_config());
        assert_eq!(surface.focused_target(), Some(FocusTarget::Field(0)));

        for c in "12".chars() {
            surface.handle_event(&key(KeyCode::Char(c)));
        }
        surface.handle_event(&key(KeyCode::Backspace));
        surface.handle_event(&key(KeyCode::Tab));
        surface.handle_event(&key(KeyCode::Char(' ')));

        let form = surface.form().unwrap();
        assert_eq!(form.data().to_value(), json!({"a": "1", "b": " "}));
    }

    #[test]
    fn test_enter_in_field_presses_submit() {
        let mut surface = surface(form_config());
        surface.set_field_value(0, "x");

        match surface.handle_event(&key(KeyCode::Enter)) {
            Some(SurfaceIntent::Press(press)) => {
                assert_eq!(press.action.title, "Save");
                assert_eq!(press.form.unwrap().data().to_value(), json!({"a": "x", "b": ""}));
            }
            other => panic!("expected a press, got {other:?}"),
        }
    }

    #[test]
    fn test_press_label() {
        let mut surface = surface(form_config());

        assert_eq!(pressed_title(surface.press_label("Cancel")), Some("Cancel".into()));
        assert_eq!(surface.focused_button_label(), Some("Cancel"));
        assert!(surface.press_label("Missing").is_none());
    }

    #[test]
    fn test_title_id() {
        let mut surface = surface(EffectiveConfig {
            title: Some("Hello".into()),
            ..Default::default()
        });
        assert_eq!(surface.title_id().as_deref(), Some("abcd-title"));

        surface.rebind(DialogId::from("abcd-1"));
        assert_eq!(surface.title_id().as_deref(), Some("abcd-1-title"));
    }

    #[test]
    fn test_button_classes_and_style_order() {
        let mut config = EffectiveConfig {
            actions: vec![vec![Action::new("Go")
                .with_variant(Variant::Danger)
                .with_class_name("mine")
                .with_style(Style::default().fg(Color::Yellow))]],
            ..Default::default()
        };
        config.class_names.insert(Region::ActionButton, "btn".into());
        config
            .variant_styles
            .insert(Variant::Danger, Style::default().bg(Color::Magenta).fg(Color::Black));
        let surface = surface(config);

        assert_eq!(
            surface.button_classes(0),
            vec![
                "hook-dialog-action-button".to_string(),
                "hook-dialog-action-danger".to_string(),
                "btn".to_string(),
                "mine".to_string(),
            ]
        );

        let style = surface.button_style(0, &Stylesheet::new());
        assert_eq!(style.bg, Some(Color::Magenta));
        assert_eq!(style.fg, Some(Color::Yellow));
    }
}
