//! Notebook: the ordered page collection and the displayed-page cursor.

use crate::page::{Page, Template};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A multi-page notebook.
///
/// Always holds at least one page. `current` is the index of the page on
/// screen and is kept valid across add, delete and move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NotebookRecord")]
pub struct Notebook {
    /// Storage key; `None` until the first successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pages: Vec<Page>,
    #[serde(skip)]
    current: usize,
    #[serde(skip)]
    dirty: bool,
}

#[derive(Deserialize)]
struct NotebookRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    pages: Vec<Page>,
}

impl From<NotebookRecord> for Notebook {
    fn from(record: NotebookRecord) -> Self {
        let mut pages = record.pages;
        if pages.is_empty() {
            pages.push(Page::blank(Template::None));
        }
        Self {
            id: record.id,
            name: record.name,
            pages,
            current: 0,
            dirty: false,
        }
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Notebook {
    /// New unsaved notebook with one blank page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            pages: vec![Page::blank(Template::None)],
            current: 0,
            dirty: false,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Index of the displayed page.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    pub fn current_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current]
    }

    /// Run a mutation against the displayed page, marking the notebook
    /// dirty when it reports a change.
    pub fn edit_current(&mut self, edit: impl FnOnce(&mut Page) -> bool) -> bool {
        let changed = edit(&mut self.pages[self.current]);
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Append a blank page and display it. Returns its index.
    pub fn add_page(&mut self, template: Template) -> usize {
        self.pages.push(Page::blank(template));
        self.current = self.pages.len() - 1;
        self.dirty = true;
        log::debug!("Added {} page at index {}", template.name(), self.current);
        self.current
    }

    /// Delete the page at `index`. Refused (returns `false`) for the last
    /// remaining page or an out-of-range index.
    pub fn delete_page(&mut self, index: usize) -> bool {
        if self.pages.len() <= 1 || index >= self.pages.len() {
            return false;
        }
        self.pages.remove(index);
        if self.current >= self.pages.len() {
            self.current = self.pages.len() - 1;
        }
        self.dirty = true;
        log::debug!("Deleted page {index}, now showing {}", self.current);
        true
    }

    /// Move a page from `from` to `to`, keeping the same logical page on
    /// screen.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);

        if self.current == from {
            self.current = to;
        } else if from < self.current && self.current <= to {
            self.current -= 1;
        } else if to <= self.current && self.current < from {
            self.current += 1;
        }
        self.dirty = true;
        true
    }

    /// Display the page at `index`. Out-of-range indices are ignored.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// Append one page per raster (background image, no elements) and show
    /// the first of them. Returns the number of pages added.
    pub fn append_imported_pages(&mut self, rasters: Vec<String>, source_name: &str) -> usize {
        let first = self.pages.len();
        let count = rasters.len();
        for (i, url) in rasters.into_iter().enumerate() {
            let number = u32::try_from(i + 1).ok();
            self.pages
                .push(Page::with_background_image(url, Some(source_name.to_string()), number));
        }
        if count > 0 {
            self.current = first;
            self.dirty = true;
            log::info!("Imported {count} page(s) from {source_name}");
        }
        count
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Whether there are changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File name for a PDF export made on `date`.
    pub fn export_file_name(&self, date: NaiveDate) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{stem}_{}.pdf", date.format("%Y-%m-%d"))
    }

    /// Serialize to the JSON document blob.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from the JSON document blob. Every page starts with a fresh
    /// single-snapshot history.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, SerializableColor, ShapeElement};

    fn notebook_with(count: usize) -> Notebook {
        let mut nb = Notebook::new("Test");
        for _ in 1..count {
            nb.add_page(Template::None);
        }
        nb.go_to_page(0);
        nb.mark_clean();
        nb
    }

    #[test]
    fn test_new_notebook() {
        let nb = Notebook::new("Sketches");
        assert_eq!(nb.page_count(), 1);
        assert_eq!(nb.current_index(), 0);
        assert!(nb.id.is_none());
        assert!(!nb.is_dirty());
    }

    #[test]
    fn test_add_page_shows_it() {
        let mut nb = Notebook::new("Test");
        assert_eq!(nb.add_page(Template::Lines), 1);
        assert_eq!(nb.current_index(), 1);
        assert_eq!(nb.current_page().template, Template::Lines);
        assert!(nb.is_dirty());
    }

    #[test]
    fn test_delete_last_page_is_noop() {
        let mut nb = Notebook::new("Test");
        assert!(!nb.delete_page(0));
        assert_eq!(nb.page_count(), 1);
        assert!(!nb.is_dirty());
    }

    #[test]
    fn test_delete_clamps_current() {
        let mut nb = notebook_with(3);
        nb.go_to_page(2);
        assert!(nb.delete_page(2));
        assert_eq!(nb.current_index(), 1);
        assert!(!nb.delete_page(5));
    }

    #[test]
    fn test_move_follows_displayed_page() {
        let mut nb = notebook_with(3);
        let viewed = nb.current_page().id.clone();
        assert!(nb.move_page(0, 2));
        assert_eq!(nb.current_index(), 2);
        assert_eq!(nb.current_page().id, viewed);
    }

    #[test]
    fn test_move_shifts_between() {
        let mut nb = notebook_with(4);
        nb.go_to_page(1);
        let viewed = nb.current_page().id.clone();
        assert!(nb.move_page(0, 3));
        assert_eq!(nb.current_index(), 0);
        assert_eq!(nb.current_page().id, viewed);

        assert!(nb.move_page(3, 0));
        assert_eq!(nb.current_index(), 1);
        assert_eq!(nb.current_page().id, viewed);

        // Outside the moved range the index is untouched.
        assert!(nb.move_page(2, 3));
        assert_eq!(nb.current_index(), 1);
        assert!(!nb.move_page(1, 1));
        assert!(!nb.move_page(0, 9));
    }

    #[test]
    fn test_import_appends_background_pages() {
        let mut nb = Notebook::new("Test");
        let added = nb.append_imported_pages(vec!["data:a".into(), "data:b".into()], "plan.pdf");
        assert_eq!(added, 2);
        assert_eq!(nb.page_count(), 3);
        assert_eq!(nb.current_index(), 1);
        let page = nb.page(2).unwrap();
        assert_eq!(page.background_image.as_deref(), Some("data:b"));
        assert_eq!(page.pdf_source_name.as_deref(), Some("plan.pdf"));
        assert_eq!(page.pdf_source_page_number, Some(2));
        assert!(page.is_empty());
    }

    #[test]
    fn test_export_file_name() {
        let nb = Notebook::new("Obra Rua #12 / fase 2");
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(nb.export_file_name(date), "Obra_Rua__12___fase_2_2024-03-07.pdf");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut nb = Notebook::new("Round");
        nb.id = Some("abc".into());
        nb.edit_current(|page| {
            page.push(Element::Circle(ShapeElement::new(SerializableColor::black(), 1.0, 0.0, 0.0, 9.0, 9.0)));
            true
        });
        nb.add_page(Template::Cornell);

        let json = nb.to_json().unwrap();
        let loaded = Notebook::from_json(&json).unwrap();
        assert_eq!(loaded.id.as_deref(), Some("abc"));
        assert_eq!(loaded.page_count(), 2);
        assert_eq!(loaded.pages()[0].elements(), nb.pages()[0].elements());
        assert_eq!(loaded.pages()[1].template, Template::Cornell);
        assert_eq!(loaded.current_index(), 0);
        assert!(!loaded.is_dirty());
        assert!(!loaded.pages()[0].can_undo());
    }

    #[test]
    fn test_empty_json_gets_a_page() {
        let nb = Notebook::from_json(r#"{ "name": "Empty", "pages": [] }"#).unwrap();
        assert_eq!(nb.page_count(), 1);
    }
}
