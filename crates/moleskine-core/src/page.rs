//! A single notebook page: element list, background and history.

use crate::elements::{Element, ElementId, SerializableColor};
use crate::history::History;
use chrono::{DateTime, Utc};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Procedural background pattern of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    None,
    Grid,
    Lines,
    Dots,
    Cornell,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::None,
        Template::Grid,
        Template::Lines,
        Template::Dots,
        Template::Cornell,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::None => "none",
            Template::Grid => "grid",
            Template::Lines => "lines",
            Template::Dots => "dots",
            Template::Cornell => "cornell",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// One canvas of the notebook.
///
/// The element list only changes through [`Page::commit`], [`Page::undo`]
/// and [`Page::redo`], so the history cursor always points at a snapshot
/// equal to [`Page::elements`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PageRecord")]
pub struct Page {
    pub id: String,
    elements: Vec<Element>,
    pub background: SerializableColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub template: Template,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_source_page_number: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    history: History,
}

/// Wire shape of a page; loading always starts a fresh history.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRecord {
    #[serde(default = "new_page_id")]
    id: String,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default = "SerializableColor::white")]
    background: SerializableColor,
    #[serde(default)]
    background_image: Option<String>,
    #[serde(default)]
    template: Template,
    #[serde(default)]
    pdf_source_name: Option<String>,
    #[serde(default)]
    pdf_source_page_number: Option<u32>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<PageRecord> for Page {
    fn from(record: PageRecord) -> Self {
        let history = History::new(record.elements.clone());
        Self {
            id: record.id,
            elements: record.elements,
            background: record.background,
            background_image: record.background_image,
            template: record.template,
            pdf_source_name: record.pdf_source_name,
            pdf_source_page_number: record.pdf_source_page_number,
            created_at: record.created_at,
            history,
        }
    }
}

fn new_page_id() -> String {
    Uuid::new_v4().to_string()
}

impl Default for Page {
    fn default() -> Self {
        Self::blank(Template::None)
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.elements == other.elements
            && self.background == other.background
            && self.background_image == other.background_image
            && self.template == other.template
            && self.pdf_source_name == other.pdf_source_name
            && self.pdf_source_page_number == other.pdf_source_page_number
            && self.created_at == other.created_at
    }
}

impl Page {
    /// Empty white page with the given template.
    pub fn blank(template: Template) -> Self {
        Self {
            id: new_page_id(),
            elements: Vec::new(),
            background: SerializableColor::white(),
            background_image: None,
            template,
            pdf_source_name: None,
            pdf_source_page_number: None,
            created_at: Utc::now(),
            history: History::default(),
        }
    }

    /// Page whose background is a rasterized page of an imported document.
    pub fn with_background_image(url: String, source_name: Option<String>, page_number: Option<u32>) -> Self {
        Self {
            background_image: Some(url),
            pdf_source_name: source_name,
            pdf_source_page_number: page_number,
            ..Self::blank(Template::None)
        }
    }

    /// Elements in z-order (back to front).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replace the element list and record it as a new snapshot.
    pub fn commit(&mut self, elements: Vec<Element>) {
        self.history.commit(elements.clone());
        self.elements = elements;
    }

    /// Append one element and commit.
    pub fn push(&mut self, element: Element) {
        let mut next = self.elements.clone();
        next.push(element);
        self.commit(next);
    }

    /// Replace the element that has the same id, keeping its z position.
    /// Returns `false` (and commits nothing) if no such element exists.
    pub fn replace(&mut self, element: Element) -> bool {
        let Some(index) = self.position(element.id()) else {
            return false;
        };
        let mut next = self.elements.clone();
        next[index] = element;
        self.commit(next);
        true
    }

    /// Remove an element by id and commit. No-op if absent.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.position(id)?;
        let mut next = self.elements.clone();
        let removed = next.remove(index);
        self.commit(next);
        Some(removed)
    }

    /// Commit an empty element list. Returns `false` if already empty.
    pub fn clear(&mut self) -> bool {
        if self.elements.is_empty() {
            return false;
        }
        self.commit(Vec::new());
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.elements = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.elements = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Topmost element under `point`; later elements win.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<&Element> {
        self.elements.iter().rev().find(|e| e.hit_test(point, tolerance))
    }

    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }
}
