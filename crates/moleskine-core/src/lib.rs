//! Moleskine Core Library
//!
//! Platform-agnostic data model and interaction engine for the Moleskine
//! digital notebook: elements, stroke geometry, per-page history, the
//! page/notebook model and the pointer/keyboard state machine.

pub mod camera;
pub mod config;
pub mod editor;
pub mod elements;
pub mod geometry;
pub mod history;
pub mod input;
pub mod notebook;
pub mod page;
pub mod selection;
pub mod storage;
pub mod tools;

pub use camera::Camera;
pub use config::EditorConfig;
pub use editor::{Editor, EditorAction, Gesture, Notification, PendingInput, PendingInputKind};
pub use elements::{Element, ElementId, SerializableColor};
pub use history::History;
pub use notebook::Notebook;
pub use page::{Page, Template};
pub use tools::ToolKind;
