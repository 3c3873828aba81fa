//! Tool selection and keyboard shortcut table.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Select,
    #[default]
    Pen,
    Highlighter,
    Line,
    Rectangle,
    Circle,
    Arrow,
    Text,
    Link,
    Image,
    Eraser,
    Pan,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Arrow,
        ToolKind::Text,
        ToolKind::Link,
        ToolKind::Image,
        ToolKind::Eraser,
        ToolKind::Pan,
    ];

    /// Single-letter shortcut, if the tool has one. Pan is reached with space.
    pub fn shortcut(&self) -> Option<char> {
        match self {
            ToolKind::Select => Some('v'),
            ToolKind::Pen => Some('p'),
            ToolKind::Highlighter => Some('h'),
            ToolKind::Line => Some('l'),
            ToolKind::Rectangle => Some('r'),
            ToolKind::Circle => Some('c'),
            ToolKind::Arrow => Some('a'),
            ToolKind::Text => Some('t'),
            ToolKind::Link => Some('k'),
            ToolKind::Image => Some('i'),
            ToolKind::Eraser => Some('e'),
            ToolKind::Pan => None,
        }
    }

    /// Tool bound to a letter (case-insensitive).
    pub fn from_shortcut(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.shortcut() == Some(key))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Line => "Line",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Arrow => "Arrow",
            ToolKind::Text => "Text",
            ToolKind::Link => "Link",
            ToolKind::Image => "Image",
            ToolKind::Eraser => "Eraser",
            ToolKind::Pan => "Pan",
        }
    }

    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Highlighter)
    }

    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            ToolKind::Line | ToolKind::Rectangle | ToolKind::Circle | ToolKind::Arrow
        )
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select tool"),
            Shortcut::new("P", false, false, "Pen"),
            Shortcut::new("H", false, false, "Highlighter"),
            Shortcut::new("L", false, false, "Line"),
            Shortcut::new("R", false, false, "Rectangle"),
            Shortcut::new("C", false, false, "Circle"),
            Shortcut::new("A", false, false, "Arrow"),
            Shortcut::new("T", false, false, "Text"),
            Shortcut::new("K", false, false, "Link"),
            Shortcut::new("I", false, false, "Insert image"),
            Shortcut::new("E", false, false, "Eraser"),
            Shortcut::new("Space", false, false, "Hold to pan (returns to pen)"),
            Shortcut::new("C", true, false, "Copy selected element"),
            Shortcut::new("V", true, false, "Paste (each paste cascades +20)"),
            Shortcut::new("D", true, false, "Duplicate selected element"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("=", true, false, "Zoom in"),
            Shortcut::new("-", true, false, "Zoom out"),
            Shortcut::new("0", true, false, "Reset zoom to 100%"),
            Shortcut::new("Delete", false, false, "Delete selected element"),
            Shortcut::new("Backspace", false, false, "Delete selected element"),
            Shortcut::new("Escape", false, false, "Clear selection and cancel text input"),
            Shortcut::new("Alt+Drag", false, false, "Pan with any tool"),
            Shortcut::new("Ctrl+Wheel", false, false, "Zoom around the pointer"),
            Shortcut::new("Shift+Drag", false, false, "Keep aspect ratio while resizing an image"),
        ]
    }

    /// Print all shortcuts to stdout.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_roundtrip() {
        for tool in ToolKind::ALL {
            if let Some(key) = tool.shortcut() {
                assert_eq!(ToolKind::from_shortcut(key), Some(tool));
                assert_eq!(ToolKind::from_shortcut(key.to_ascii_uppercase()), Some(tool));
            }
        }
        assert_eq!(ToolKind::from_shortcut('z'), None);
        assert_eq!(ToolKind::Pan.shortcut(), None);
    }

    #[test]
    fn test_tool_categories() {
        assert!(ToolKind::Pen.is_freehand());
        assert!(ToolKind::Arrow.is_shape());
        assert!(ToolKind::Highlighter.is_freehand());
        assert!(!ToolKind::Text.is_freehand() && !ToolKind::Text.is_shape());
        assert!(!ToolKind::Select.is_shape());
    }

    #[test]
    fn test_registry_format() {
        let all = ShortcutRegistry::all();
        assert!(all.iter().any(|s| s.format() == "Ctrl+Shift+Z"));
        assert!(all.iter().any(|s| s.format() == "Space"));
    }
}
