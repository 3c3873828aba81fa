//! Interaction engine: turns pointer and keyboard input into page edits.
//!
//! The [`Editor`] owns one open notebook together with everything transient
//! about editing it: the active tool, the gesture in progress, the
//! selection, the clipboard, the camera and the auto-save debouncer. All
//! mutation happens synchronously inside the input handlers; gesture
//! previews live in [`Gesture`] and reach the page through a single commit
//! when the gesture ends.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::elements::{
    Element, ElementId, FreehandStroke, ImageElement, LinkElement, SerializableColor, ShapeElement, StrokeKind,
    TextElement,
};
use crate::geometry::StrokePoint;
use crate::input::{Key, Modifiers, PointerEvent};
use crate::notebook::Notebook;
use crate::page::Template;
use crate::selection::{HANDLE_HIT_TOLERANCE, HandleKind, hit_test_handles, resize_image};
use crate::storage::{AutoSave, BlobStore, DocumentStore, sanitize_key, save_notebook};
use crate::tools::ToolKind;
use kurbo::{Point, Rect, Size, Vec2};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Default highlighter ink (amber).
const HIGHLIGHTER_COLOR: SerializableColor = SerializableColor::new(250, 204, 21, 255);

/// Which inline input is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInputKind {
    Text,
    Link,
}

/// An inline text/link input waiting for the user to submit or cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingInput {
    pub kind: PendingInputKind,
    /// Where the element will be created.
    pub canvas_point: Point,
    /// Where the host should place the input box (container-relative).
    pub screen_point: Point,
}

/// What the host should do after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Nothing changed.
    None,
    /// View or content changed.
    Redraw,
    /// Show a file picker, then call [`Editor::upload_image`].
    OpenImagePicker,
    /// Show an inline input, then call [`Editor::submit_pending_input`]
    /// or [`Editor::cancel_pending_input`].
    OpenInput(PendingInput),
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Info(msg) | Notification::Error(msg) => f.write_str(msg),
        }
    }
}

/// Pointer gesture in progress. Orthogonal to the active tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// A new stroke or shape being drawn.
    Drawing(Element),
    /// Moving an element. `last` is the previous canvas pointer position.
    Dragging {
        id: ElementId,
        last: Point,
        original: Element,
        current: Element,
    },
    /// Dragging a resize handle of a selected image.
    Resizing {
        id: ElementId,
        handle: HandleKind,
        start: Point,
        original: ImageElement,
        current: Rect,
    },
    /// Moving the view. `last` is the previous client pointer position.
    Panning { last: Point },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// Editing session for one notebook.
pub struct Editor {
    pub notebook: Notebook,
    pub config: EditorConfig,
    pub camera: Camera,
    /// Ink for new pen strokes, shapes and text.
    pub color: SerializableColor,
    pub highlighter_color: SerializableColor,
    pub stroke_width: f64,
    pub font_size: f64,
    tool: ToolKind,
    gesture: Gesture,
    selection: Option<ElementId>,
    clipboard: Option<Element>,
    pending_input: Option<PendingInput>,
    container_origin: Point,
    container_size: Size,
    space_pan: bool,
    autosave: AutoSave,
}

impl Editor {
    pub fn new(notebook: Notebook, config: EditorConfig) -> Self {
        let container_size = config.canvas_size();
        let mut editor = Self {
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            autosave: AutoSave::new(config.autosave_delay()),
            font_size: config.default_font_size,
            notebook,
            config,
            color: SerializableColor::black(),
            highlighter_color: HIGHLIGHTER_COLOR,
            stroke_width: 2.0,
            tool: ToolKind::default(),
            gesture: Gesture::Idle,
            selection: None,
            clipboard: None,
            pending_input: None,
            container_origin: Point::ZERO,
            container_size,
            space_pan: false,
        };
        editor.fit_to_screen();
        editor
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selection.as_ref()?;
        self.notebook.current_page().find(id)
    }

    pub fn clipboard(&self) -> Option<&Element> {
        self.clipboard.as_ref()
    }

    pub fn pending_input(&self) -> Option<&PendingInput> {
        self.pending_input.as_ref()
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// Hit-test tolerance in canvas units at the current zoom.
    pub fn tolerance(&self) -> f64 {
        self.camera.screen_to_canvas_distance(self.config.hit_threshold)
    }

    /// Select an element on the current page by id.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.notebook.current_page().find(&id).is_none() {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Switch tools, abandoning any gesture and pending input.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool == tool {
            return;
        }
        log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        self.gesture = Gesture::Idle;
        self.pending_input = None;
        if tool != ToolKind::Select {
            self.selection = None;
        }
    }

    /// Current page elements with the gesture preview applied, for display.
    pub fn display_elements(&self) -> Vec<Element> {
        let mut elements = self.notebook.current_page().elements().to_vec();
        match &self.gesture {
            Gesture::Drawing(preview) => elements.push(preview.clone()),
            Gesture::Dragging { id, current, .. } => {
                if let Some(slot) = elements.iter_mut().find(|e| e.id() == id) {
                    *slot = current.clone();
                }
            }
            Gesture::Resizing { id, original, current, .. } => {
                if let Some(slot) = elements.iter_mut().find(|e| e.id() == id) {
                    let mut image = original.clone();
                    image.set_rect(*current);
                    *slot = Element::Image(image);
                }
            }
            Gesture::Idle | Gesture::Panning { .. } => {}
        }
        elements
    }

    // --- Pointer input ---

    /// Dispatch any pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EditorAction {
        match event {
            PointerEvent::Down { position, modifiers, .. } => self.pointer_down(position, event.pressure(), modifiers),
            PointerEvent::Move { position, modifiers, .. } => self.pointer_move(position, event.pressure(), modifiers),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            PointerEvent::Wheel { position, delta, modifiers } => self.wheel(position, delta, modifiers),
        }
    }

    /// Pointer pressed at a client position.
    pub fn pointer_down(&mut self, client: Point, pressure: f64, mods: Modifiers) -> EditorAction {
        self.gesture = Gesture::Idle;

        if self.tool == ToolKind::Pan || mods.alt {
            self.gesture = Gesture::Panning { last: client };
            return EditorAction::None;
        }

        let point = self.camera.client_to_canvas(client, self.container_origin);
        match self.tool {
            ToolKind::Select => self.begin_select(point),
            tool if tool.is_freehand() => {
                let (kind, color) = if tool == ToolKind::Pen {
                    (StrokeKind::Pen, self.color)
                } else {
                    (StrokeKind::Highlighter, self.highlighter_color)
                };
                let sample = StrokePoint::new(point.x, point.y, pressure);
                let stroke = FreehandStroke::new(kind, color, self.stroke_width, vec![sample]);
                self.gesture = Gesture::Drawing(Element::Stroke(stroke));
                EditorAction::Redraw
            }
            tool if tool.is_shape() => {
                let shape = ShapeElement::new(self.color, self.stroke_width, point.x, point.y, point.x, point.y);
                let element = match tool {
                    ToolKind::Line => Element::Line(shape),
                    ToolKind::Rectangle => Element::Rectangle(shape),
                    ToolKind::Circle => Element::Circle(shape),
                    _ => Element::Arrow(shape),
                };
                self.gesture = Gesture::Drawing(element);
                EditorAction::Redraw
            }
            ToolKind::Text | ToolKind::Link => {
                let kind = if self.tool == ToolKind::Text {
                    PendingInputKind::Text
                } else {
                    PendingInputKind::Link
                };
                let input = PendingInput {
                    kind,
                    canvas_point: point,
                    screen_point: self.camera.canvas_to_screen(point),
                };
                self.pending_input = Some(input);
                EditorAction::OpenInput(input)
            }
            ToolKind::Image => EditorAction::OpenImagePicker,
            ToolKind::Eraser => self.erase_at(point),
            _ => EditorAction::None,
        }
    }

    fn begin_select(&mut self, point: Point) -> EditorAction {
        let page = self.notebook.current_page();

        // Handles of the selected image take priority over hit-testing.
        if let Some(image) = self.selection.as_ref().and_then(|id| page.find(id)).and_then(Element::as_image) {
            let tolerance = self.camera.screen_to_canvas_distance(HANDLE_HIT_TOLERANCE);
            if let Some(handle) = hit_test_handles(image, point, tolerance) {
                self.gesture = Gesture::Resizing {
                    id: image.id.clone(),
                    handle,
                    start: point,
                    original: image.clone(),
                    current: image.bounds(),
                };
                return EditorAction::Redraw;
            }
        }

        match page.element_at(point, self.tolerance()) {
            Some(element) => {
                let id = element.id().clone();
                self.gesture = Gesture::Dragging {
                    id: id.clone(),
                    last: point,
                    original: element.clone(),
                    current: element.clone(),
                };
                self.selection = Some(id);
            }
            None => self.selection = None,
        }
        EditorAction::Redraw
    }

    fn erase_at(&mut self, point: Point) -> EditorAction {
        let tolerance = self.tolerance();
        let Some(id) = self
            .notebook
            .current_page()
            .element_at(point, tolerance)
            .filter(|e| !e.is_image())
            .map(|e| e.id().clone())
        else {
            return EditorAction::None;
        };

        self.notebook.edit_current(|page| page.remove(&id).is_some());
        if self.selection.as_ref() == Some(&id) {
            self.selection = None;
        }
        log::debug!("Erased element {id}");
        self.after_commit();
        EditorAction::Redraw
    }

    /// Pointer moved to a client position.
    pub fn pointer_move(&mut self, client: Point, pressure: f64, mods: Modifiers) -> EditorAction {
        let point = self.camera.client_to_canvas(client, self.container_origin);
        match &mut self.gesture {
            Gesture::Idle => return EditorAction::None,
            Gesture::Panning { last } => {
                let delta = client - *last;
                *last = client;
                self.camera.pan(delta);
            }
            Gesture::Drawing(Element::Stroke(stroke)) => {
                if stroke.points.last().is_some_and(|p| p.point() == point) {
                    return EditorAction::None;
                }
                stroke.points.push(StrokePoint::new(point.x, point.y, pressure));
            }
            Gesture::Drawing(
                Element::Line(shape) | Element::Rectangle(shape) | Element::Circle(shape) | Element::Arrow(shape),
            ) => shape.set_end(point),
            Gesture::Drawing(_) => return EditorAction::None,
            Gesture::Dragging { last, current, .. } => {
                // Shift by the step since the last move so points never get re-measured.
                current.translate(point - *last);
                *last = point;
            }
            Gesture::Resizing {
                handle,
                start,
                original,
                current,
                ..
            } => {
                *current = resize_image(original, *handle, point - *start, mods.shift, self.config.min_image_size);
            }
        }
        EditorAction::Redraw
    }

    /// Pointer released. Always leaves the gesture idle.
    pub fn pointer_up(&mut self, _client: Point) -> EditorAction {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => EditorAction::None,
            Gesture::Panning { .. } => EditorAction::None,
            Gesture::Drawing(element) => {
                if self.is_accidental(&element) {
                    log::debug!("Discarded accidental {}", element.kind_name());
                    return EditorAction::Redraw;
                }
                log::debug!("Committed {} {}", element.kind_name(), element.id());
                self.notebook.edit_current(|page| {
                    page.push(element);
                    true
                });
                self.after_commit();
                EditorAction::Redraw
            }
            Gesture::Dragging { original, current, .. } => {
                if current != original {
                    self.notebook.edit_current(|page| page.replace(current));
                    self.after_commit();
                }
                EditorAction::Redraw
            }
            Gesture::Resizing { original, current, .. } => {
                if current != original.bounds() {
                    let mut image = original;
                    image.set_rect(current);
                    self.notebook.edit_current(|page| page.replace(Element::Image(image)));
                    self.after_commit();
                }
                EditorAction::Redraw
            }
        }
    }

    /// Strokes with too few samples and shapes without extent are taps.
    fn is_accidental(&self, element: &Element) -> bool {
        match element {
            Element::Stroke(stroke) => stroke.points.len() <= self.config.min_stroke_points,
            Element::Line(shape) | Element::Rectangle(shape) | Element::Circle(shape) | Element::Arrow(shape) => {
                shape.is_degenerate(self.config.min_shape_extent)
            }
            Element::Text(_) | Element::Link(_) | Element::Image(_) => false,
        }
    }

    /// Wheel: zoom around the pointer with Ctrl/Cmd held, scroll otherwise.
    pub fn wheel(&mut self, client: Point, delta: Vec2, mods: Modifiers) -> EditorAction {
        if mods.command() {
            let screen = client - self.container_origin.to_vec2();
            self.camera.wheel_zoom(screen, delta.y);
        } else {
            self.camera.pan(-delta);
        }
        EditorAction::Redraw
    }

    // --- Keyboard input ---

    pub fn key_down(&mut self, key: Key, mods: Modifiers) -> EditorAction {
        if self.pending_input.is_some() {
            // Keystrokes belong to the inline input.
            if key == Key::Escape {
                self.cancel_pending_input();
                return EditorAction::Redraw;
            }
            return EditorAction::None;
        }

        let changed = match key {
            Key::Escape => {
                self.selection = None;
                self.gesture = Gesture::Idle;
                true
            }
            Key::Space => {
                if !self.space_pan {
                    self.space_pan = true;
                    self.set_tool(ToolKind::Pan);
                }
                true
            }
            Key::Delete | Key::Backspace => self.delete_selected(),
            Key::Enter => false,
            Key::Char(c) if mods.command() => match c.to_ascii_lowercase() {
                'c' => self.copy(),
                'v' => self.paste(),
                'd' => self.duplicate(),
                'z' if mods.shift => self.redo(),
                'z' => self.undo(),
                'y' => self.redo(),
                '=' | '+' => {
                    self.zoom_in();
                    true
                }
                '-' => {
                    self.zoom_out();
                    true
                }
                '0' => {
                    self.reset_zoom();
                    true
                }
                _ => false,
            },
            Key::Char(c) => match ToolKind::from_shortcut(c) {
                Some(tool) => {
                    self.set_tool(tool);
                    true
                }
                None => false,
            },
        };
        if changed { EditorAction::Redraw } else { EditorAction::None }
    }

    /// Releasing space ends the momentary pan and returns to the pen.
    pub fn key_up(&mut self, key: Key) -> EditorAction {
        if key == Key::Space && self.space_pan {
            self.space_pan = false;
            self.set_tool(ToolKind::Pen);
            return EditorAction::Redraw;
        }
        EditorAction::None
    }

    // --- Text and link placement ---

    /// Create the pending text or link element. Blank input cancels.
    pub fn submit_pending_input(&mut self, text: &str) -> Option<ElementId> {
        let input = self.pending_input.take()?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Point { x, y } = input.canvas_point;
        let element = match input.kind {
            PendingInputKind::Text => {
                Element::Text(TextElement::new(self.color, text.to_string(), x, y, self.font_size))
            }
            PendingInputKind::Link => Element::Link(LinkElement::new(normalize_url(text), String::new(), x, y)),
        };
        let id = element.id().clone();
        self.notebook.edit_current(|page| {
            page.push(element);
            true
        });
        self.after_commit();
        Some(id)
    }

    pub fn cancel_pending_input(&mut self) {
        self.pending_input = None;
    }

    // --- Images ---

    /// Place an uploaded image at the viewport centre, switch to the select
    /// tool and select it.
    pub fn insert_uploaded_image(&mut self, url: String, source: Option<String>) -> ElementId {
        let (w, h) = (self.config.default_image_width, self.config.default_image_height);
        let center = self.camera.viewport_center(self.container_size);
        let image = ImageElement::new(url, center.x - w / 2.0, center.y - h / 2.0, w, h).with_source(source);
        let id = image.id.clone();
        self.notebook.edit_current(|page| {
            page.push(Element::Image(image));
            true
        });
        self.after_commit();
        self.set_tool(ToolKind::Select);
        self.selection = Some(id.clone());
        log::info!("Inserted image {id}");
        id
    }

    /// Upload picked image bytes and insert the result. On failure the
    /// document is left untouched and the error comes back as a
    /// notification.
    pub async fn upload_image(
        &mut self,
        store: &dyn BlobStore,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ElementId, Notification> {
        let folder = self.notebook.id.clone().unwrap_or_else(|| "unsaved".to_string());
        let path = format!("{folder}/{}-{}", Uuid::new_v4(), sanitize_key(file_name));
        match store.upload(&path, bytes).await {
            Ok(url) => Ok(self.insert_uploaded_image(url, Some(file_name.to_string()))),
            Err(e) => {
                log::error!("Failed to upload image {file_name}: {e}");
                Err(Notification::Error(format!("Could not upload {file_name}: {e}")))
            }
        }
    }

    // --- Clipboard and history ---

    /// Copy the selected element. No-op without a selection.
    pub fn copy(&mut self) -> bool {
        match self.selected_element().cloned() {
            Some(element) => {
                self.clipboard = Some(element);
                true
            }
            None => false,
        }
    }

    /// Insert an offset clone of the clipboard and make that clone the new
    /// clipboard value, so repeated pastes cascade.
    pub fn paste(&mut self) -> bool {
        let Some(source) = &self.clipboard else {
            return false;
        };
        let clone = source.duplicate_with_offset(self.config.paste_offset);
        self.clipboard = Some(clone.clone());
        self.insert_and_select(clone);
        true
    }

    /// Copy and paste in one step with a larger offset. The clipboard is
    /// left alone.
    pub fn duplicate(&mut self) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let clone = element.duplicate_with_offset(self.config.duplicate_offset);
        self.insert_and_select(clone);
        true
    }

    fn insert_and_select(&mut self, element: Element) {
        let id = element.id().clone();
        self.notebook.edit_current(|page| {
            page.push(element);
            true
        });
        self.selection = Some(id);
        self.after_commit();
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        let removed = self.notebook.edit_current(|page| page.remove(&id).is_some());
        if removed {
            self.after_commit();
        }
        removed
    }

    pub fn undo(&mut self) -> bool {
        self.gesture = Gesture::Idle;
        let changed = self.notebook.edit_current(|page| page.undo());
        self.after_history_move(changed)
    }

    pub fn redo(&mut self) -> bool {
        self.gesture = Gesture::Idle;
        let changed = self.notebook.edit_current(|page| page.redo());
        self.after_history_move(changed)
    }

    fn after_history_move(&mut self, changed: bool) -> bool {
        if changed {
            if self.selected_element().is_none() {
                self.selection = None;
            }
            self.after_commit();
        }
        changed
    }

    fn after_commit(&mut self) {
        self.notebook.mark_dirty();
        self.autosave.schedule(Instant::now());
    }

    // --- Pages ---

    pub fn add_page(&mut self, template: Template) -> usize {
        let index = self.notebook.add_page(template);
        self.after_page_change();
        self.autosave.schedule(Instant::now());
        index
    }

    pub fn delete_page(&mut self, index: usize) -> bool {
        let deleted = self.notebook.delete_page(index);
        if deleted {
            self.after_page_change();
            self.autosave.schedule(Instant::now());
        }
        deleted
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let moved = self.notebook.move_page(from, to);
        if moved {
            self.after_page_change();
            self.autosave.schedule(Instant::now());
        }
        moved
    }

    pub fn go_to_page(&mut self, index: usize) -> bool {
        let changed = self.notebook.go_to_page(index);
        if changed {
            self.after_page_change();
        }
        changed
    }

    /// Append rasterized pages of an imported document.
    pub fn import_pages(&mut self, rasters: Vec<String>, source_name: &str) -> usize {
        let added = self.notebook.append_imported_pages(rasters, source_name);
        if added > 0 {
            self.after_page_change();
            self.autosave.schedule(Instant::now());
        }
        added
    }

    fn after_page_change(&mut self) {
        self.gesture = Gesture::Idle;
        self.selection = None;
        self.pending_input = None;
        self.fit_to_screen();
    }

    // --- View ---

    /// New container geometry (client origin and size); refits the page.
    pub fn set_container(&mut self, origin: Point, size: Size) {
        self.container_origin = origin;
        self.container_size = size;
        self.fit_to_screen();
    }

    pub fn fit_to_screen(&mut self) {
        self.camera
            .fit_to_screen(self.config.canvas_size(), self.container_size, self.config.fit_padding);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in(self.container_size, self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out(self.container_size, self.config.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.camera.reset_zoom(self.container_size);
    }

    // --- Persistence ---

    /// Run one debounced auto-save if it is due. Returns a notification
    /// when a save was attempted.
    pub async fn autosave_tick(&mut self, store: &dyn DocumentStore, now: Instant) -> Option<Notification> {
        if !self.notebook.is_dirty() {
            self.autosave.cancel();
            return None;
        }
        if !self.autosave.poll(now) {
            return None;
        }
        let result = save_notebook(store, &mut self.notebook).await;
        self.autosave.finish(result.is_ok(), now);
        Some(match result {
            Ok(_) => Notification::Info("Saved".to_string()),
            Err(e) => {
                log::error!("Auto-save failed: {e}");
                Notification::Error(format!("Could not save notebook: {e}"))
            }
        })
    }

    /// Save right away, unless a save is already running.
    pub async fn save_now(&mut self, store: &dyn DocumentStore) -> Option<Notification> {
        if !self.autosave.begin() {
            return None;
        }
        let result = save_notebook(store, &mut self.notebook).await;
        self.autosave.finish(result.is_ok(), Instant::now());
        Some(match result {
            Ok(key) => Notification::Info(format!("Saved as {key}")),
            Err(e) => {
                log::error!("Save failed: {e}");
                Notification::Error(format!("Could not save notebook: {e}"))
            }
        })
    }
}

/// Prefix bare addresses with `https://`.
fn normalize_url(text: &str) -> String {
    if text.contains("://") || text.starts_with("mailto:") {
        text.to_string()
    } else {
        format!("https://{text}")
    }
}
