//! Keyboard navigation inside a dialog
//!
//! Maps terminal key events to the commands a dialog surface understands.
//! Text entry into form fields is handled by the surface itself; these
//! bindings only cover focus movement, activation and cancellation.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashMap;

/// Commands a dialog surface can perform in response to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Cancel the dialog, same as a forced cancel
    Cancel,
    /// Move focus to the next focusable element, wrapping at the end
    FocusNext,
    /// Move focus to the previous focusable element, wrapping at the start
    FocusPrevious,
    /// Press the focused element
    Activate,
    /// Move to the button on the left
    MoveLeft,
    /// Move to the button on the right
    MoveRight,
}

/// Key binding for surface commands
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key_code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(key_code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { key_code, modifiers }
    }

    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            key_code: event.code,
            modifiers: event.modifiers,
        }
    }

    pub fn matches(&self, event: KeyEvent) -> bool {
        self.key_code == event.code && self.modifiers == event.modifiers
    }
}

/// Key bindings used by every dialog surface
#[derive(Debug, Clone)]
pub struct DialogKeymap {
    bindings: HashMap<KeyBinding, SurfaceCommand>,
}

impl DialogKeymap {
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.setup_default_bindings();
        keymap
    }

    fn setup_default_bindings(&mut self) {
        self.bind_key(KeyCode::Esc, KeyModifiers::NONE, SurfaceCommand::Cancel);

        // Focus trap
        self.bind_key(KeyCode::Tab, KeyModifiers::NONE, SurfaceCommand::FocusNext);
        self.bind_key(KeyCode::BackTab, KeyModifiers::SHIFT, SurfaceCommand::FocusPrevious);
        self.bind_key(KeyCode::BackTab, KeyModifiers::NONE, SurfaceCommand::FocusPrevious);
        self.bind_key(KeyCode::Tab, KeyModifiers::SHIFT, SurfaceCommand::FocusPrevious);

        self.bind_key(KeyCode::Enter, KeyModifiers::NONE, SurfaceCommand::Activate);
        self.bind_key(KeyCode::Char(' '), KeyModifiers::NONE, SurfaceCommand::Activate);

        self.bind_key(KeyCode::Left, KeyModifiers::NONE, SurfaceCommand::MoveLeft);
        self.bind_key(KeyCode::Right, KeyModifiers::NONE, SurfaceCommand::MoveRight);
    }

    /// Bind a key to a command, replacing any previous binding
    pub fn bind_key(&mut self, key_code: KeyCode, modifiers: KeyModifiers, command: SurfaceCommand) {
        self.bindings.insert(KeyBinding::new(key_code, modifiers), command);
    }

    pub fn unbind_key(&mut self, key_code: KeyCode, modifiers: KeyModifiers) {
        self.bindings.remove(&KeyBinding::new(key_code, modifiers));
    }

    /// Command bound to a key event. Release events never map to a command.
    pub fn command_for(&self, event: KeyEvent) -> Option<SurfaceCommand> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.bindings.get(&KeyBinding::from_key_event(event)).copied()
    }
}

impl Default for DialogKeymap {
    fn default() -> Self {
        Self::new()
    }
}
