//! Input event types for pointer and keyboard handling.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default pressure reported by devices without pressure sensing.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in client coordinates (before the container offset and
/// camera transform are applied).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        pressure: f64,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        pressure: f64,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        modifiers: Modifiers,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    pub fn down(position: Point) -> Self {
        PointerEvent::Down {
            position,
            pressure: DEFAULT_PRESSURE,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(position: Point) -> Self {
        PointerEvent::Move {
            position,
            pressure: DEFAULT_PRESSURE,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(position: Point) -> Self {
        PointerEvent::Up {
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Same event with different modifiers.
    pub fn with_modifiers(self, mods: Modifiers) -> Self {
        match self {
            PointerEvent::Down { position, pressure, .. } => PointerEvent::Down {
                position,
                pressure,
                modifiers: mods,
            },
            PointerEvent::Move { position, pressure, .. } => PointerEvent::Move {
                position,
                pressure,
                modifiers: mods,
            },
            PointerEvent::Up { position, .. } => PointerEvent::Up { position, modifiers: mods },
            PointerEvent::Wheel { position, delta, .. } => PointerEvent::Wheel {
                position,
                delta,
                modifiers: mods,
            },
        }
    }

    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Wheel { position, .. } => *position,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            PointerEvent::Down { modifiers, .. }
            | PointerEvent::Move { modifiers, .. }
            | PointerEvent::Up { modifiers, .. }
            | PointerEvent::Wheel { modifiers, .. } => *modifiers,
        }
    }

    /// Reported pressure, falling back to the default for events without
    /// one or devices that report zero.
    pub fn pressure(&self) -> f64 {
        match self {
            PointerEvent::Down { pressure, .. } | PointerEvent::Move { pressure, .. } if *pressure > 0.0 => {
                pressure.min(1.0)
            }
            _ => DEFAULT_PRESSURE,
        }
    }
}

/// Keyboard keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Space,
    Escape,
    Delete,
    Backspace,
    Enter,
}
