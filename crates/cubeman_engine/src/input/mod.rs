//! Input events delivered by the host
//!
//! The host translates its native keyboard and mouse events into these types
//! and hands them to the environment's `on_*` entry points.

use bitflags::bitflags;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// E key
    E,
    /// Q key
    Q,
    /// S key
    S,
    /// W key
    W,
    /// X key
    X,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Any key without a dedicated binding, by host key code
    Other(u32),
}

impl KeyCode {
    /// Map a legacy DOM `keyCode` to a key
    pub fn from_dom_code(code: u32) -> Self {
        match code {
            65 => Self::A,
            68 => Self::D,
            69 => Self::E,
            81 => Self::Q,
            83 => Self::S,
            87 => Self::W,
            88 => Self::X,
            32 => Self::Space,
            13 => Self::Enter,
            27 => Self::Escape,
            38 => Self::Up,
            40 => Self::Down,
            37 => Self::Left,
            39 => Self::Right,
            other => Self::Other(other),
        }
    }
}

bitflags! {
    /// Buttons held during a mouse event, DOM `buttons` layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u32 {
        /// Primary button
        const LEFT = 1;
        /// Secondary button
        const RIGHT = 2;
        /// Wheel button
        const MIDDLE = 4;
    }
}

/// Mouse event with cursor position and held buttons
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseEvent {
    /// Cursor x in window pixels
    pub x: f32,
    /// Cursor y in window pixels
    pub y: f32,
    /// Buttons held while the event fired
    pub buttons: MouseButtons,
}

impl MouseEvent {
    /// Event at `(x, y)` with the given buttons held
    pub fn new(x: f32, y: f32, buttons: MouseButtons) -> Self {
        Self { x, y, buttons }
    }
}
