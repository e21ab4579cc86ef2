//! Event Module - Pointer and key event types
//!
//! Input payloads the interceptors wrap and expose. These are the runtime's
//! own event types; `From` impls bridge crossterm events so a crossterm-driven
//! runtime can feed the dispatch pipeline directly.
//!
//! # API
//!
//! - `PointerEvent` - Pointer (mouse/touch) event with action, button, position
//! - `KeyEvent` - Key event with key name, state, modifiers
//! - `Modifiers` - Modifier keys state
//! - `KeyEvent::trace_section_name` - Span name for the key interaction

use std::fmt;

use crossterm::event::{
    KeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers, MouseButton as CtMouseButton,
    MouseEvent as CtMouseEvent, MouseEventKind,
};

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// Create modifiers with alt
    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }

    /// Create modifiers with shift
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Pointer action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

impl PointerAction {
    /// Stable name used for sync trace sections around dispatch.
    pub fn name(self) -> &'static str {
        match self {
            Self::Down => "Down",
            Self::Up => "Up",
            Self::Move => "Move",
            Self::Drag => "Drag",
            Self::Scroll => "Scroll",
        }
    }
}

/// Pointer button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Pointer event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Action type (down, up, move, drag, scroll)
    pub action: PointerAction,
    /// Button pressed
    pub button: PointerButton,
    /// X coordinate (0-indexed)
    pub x: u16,
    /// Y coordinate (0-indexed)
    pub y: u16,
    /// Modifier keys state
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event
    pub fn new(action: PointerAction, button: PointerButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a pointer down event
    pub fn down(button: PointerButton, x: u16, y: u16) -> Self {
        Self::new(PointerAction::Down, button, x, y)
    }

    /// Create a pointer up (release) event
    pub fn up(button: PointerButton, x: u16, y: u16) -> Self {
        Self::new(PointerAction::Up, button, x, y)
    }

    /// Create a pointer move event
    pub fn move_to(x: u16, y: u16) -> Self {
        Self::new(PointerAction::Move, PointerButton::None, x, y)
    }

    /// True for the gesture's final ("up") phase.
    pub fn is_release(&self) -> bool {
        self.action == PointerAction::Up
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

impl KeyState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Press => "Press",
            Self::Repeat => "Repeat",
            Self::Release => "Release",
        }
    }
}

/// Key event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Press/repeat/release state
    pub state: KeyState,
    /// Modifier keys state
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Press,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a key event with an explicit state
    pub fn with_state(key: impl Into<String>, state: KeyState) -> Self {
        Self {
            key: key.into(),
            state,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Press,
            modifiers,
        }
    }

    /// Human-readable "{state} {key}" name, e.g. "Press Enter".
    pub fn name(&self) -> String {
        format!("{} {}", self.state.name(), self.key)
    }

    /// Span name for this key interaction, e.g. "Press Enter Interaction".
    pub fn trace_section_name(&self) -> String {
        format!("{} {INTERACTION_SUFFIX}", self.name())
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Suffix shared by all interaction span names.
pub const INTERACTION_SUFFIX: &str = "Interaction";

// =============================================================================
// CROSSTERM BRIDGING
// =============================================================================

impl From<CtMouseButton> for PointerButton {
    fn from(button: CtMouseButton) -> Self {
        match button {
            CtMouseButton::Left => Self::Left,
            CtMouseButton::Middle => Self::Middle,
            CtMouseButton::Right => Self::Right,
        }
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(modifiers: KeyModifiers) -> Self {
        Self {
            ctrl: modifiers.contains(KeyModifiers::CONTROL),
            alt: modifiers.contains(KeyModifiers::ALT),
            shift: modifiers.contains(KeyModifiers::SHIFT),
            meta: modifiers.contains(KeyModifiers::SUPER)
                || modifiers.contains(KeyModifiers::META),
        }
    }
}

impl From<&CtMouseEvent> for PointerEvent {
    fn from(event: &CtMouseEvent) -> Self {
        let (action, button) = match event.kind {
            MouseEventKind::Down(b) => (PointerAction::Down, b.into()),
            MouseEventKind::Up(b) => (PointerAction::Up, b.into()),
            MouseEventKind::Drag(b) => (PointerAction::Drag, b.into()),
            MouseEventKind::Moved => (PointerAction::Move, PointerButton::None),
            MouseEventKind::ScrollDown
            | MouseEventKind::ScrollUp
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => (PointerAction::Scroll, PointerButton::None),
        };
        Self {
            action,
            button,
            x: event.column,
            y: event.row,
            modifiers: event.modifiers.into(),
        }
    }
}

impl From<&CtKeyEvent> for KeyEvent {
    fn from(event: &CtKeyEvent) -> Self {
        let state = match event.kind {
            KeyEventKind::Press => KeyState::Press,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Release,
        };
        Self {
            key: key_name(event.code),
            state,
            modifiers: event.modifiers.into(),
        }
    }
}

/// Map a crossterm key code to the key names used by the runtime
/// (e.g. "Enter", "ArrowUp", "a").
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_section_name() {
        let event = KeyEvent::with_state("Enter", KeyState::Release);
        assert_eq!(event.name(), "Release Enter");
        assert_eq!(event.trace_section_name(), "Release Enter Interaction");
    }

    #[test]
    fn test_release_detection() {
        assert!(PointerEvent::up(PointerButton::Left, 3, 4).is_release());
        assert!(!PointerEvent::down(PointerButton::Left, 3, 4).is_release());
        assert!(!PointerEvent::move_to(3, 4).is_release());
    }

    #[test]
    fn test_crossterm_mouse_conversion() {
        let ct = CtMouseEvent {
            kind: MouseEventKind::Up(CtMouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::CONTROL,
        };
        let event = PointerEvent::from(&ct);
        assert_eq!(event.action, PointerAction::Up);
        assert_eq!(event.button, PointerButton::Left);
        assert_eq!((event.x, event.y), (10, 5));
        assert!(event.modifiers.ctrl);
    }

    #[test]
    fn test_crossterm_key_conversion() {
        let ct = CtKeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let event = KeyEvent::from(&ct);
        assert_eq!(event.key, "Enter");
        assert_eq!(event.state, KeyState::Press);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::Char('a')), "a");
        assert_eq!(key_name(KeyCode::Up), "ArrowUp");
        assert_eq!(key_name(KeyCode::F(5)), "F5");
    }
}
