//! Terminal shell around the viewer core
//!
//! Owns one [`Viewer`], the comment store, and the interaction state the
//! core leaves to its host: active tool, text placement arming, the comment
//! panel, and the input overlay that replaces blocking prompts. Everything
//! algorithmic lives in [`crate::viewer`]; this file turns terminal events
//! into core calls and core state into widgets.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use log::info;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::annotations::AnnotationStore;
use crate::comments::{Comment, CommentStatus, CommentStore, Reply};
use crate::event_source::EventSource;
use crate::export::{self, SnapshotFormat};
use crate::inputs::keymap::shortcut_command;
use crate::notification::{NotificationLevel, NotificationManager};
use crate::viewer::{
    ClickContext, ClickOutcome, Command, DocumentSource, Haptics, ImageElement, NoHaptics,
    PageElement, PageTurn, PointerKind, RenderEngine, Swipe, SwipeTracker, Tool, Viewer,
    ViewerEvent, ViewerStatus, annotation_rect, comment_markers, route_click, text_anchor,
};

/// Canvas pixels represented by one terminal cell, horizontally
const CELL_PX_X: f32 = 8.0;
/// Canvas pixels represented by one terminal cell, vertically
const CELL_PX_Y: f32 = 16.0;
/// Press and release further apart than this is a drag, not a click
const CLICK_SLOP_PX: f32 = 6.0;

/// Host-side configuration for one app session
#[derive(Clone, Debug)]
pub struct AppOptions {
    pub author: String,
    pub comments_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub start_page: Option<usize>,
    pub start_zoom: Option<f32>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            author: "anonymous".to_string(),
            comments_dir: None,
            export_dir: PathBuf::from("."),
            start_page: None,
            start_zoom: None,
        }
    }
}

/// What the input overlay is collecting text for
#[derive(Clone, Debug)]
enum InputPurpose {
    Note { page: usize, x: f32, y: f32 },
    ImagePath { page: usize, x: f32, y: f32 },
    TextContent { element_id: String },
    Reply { comment_id: String },
}

#[derive(Debug)]
struct InputOverlay {
    purpose: InputPurpose,
    title: &'static str,
    buffer: String,
}

/// Application state for one open document
pub struct App {
    viewer: Viewer,
    comments: CommentStore,
    annotations: AnnotationStore,
    notifications: NotificationManager,
    tracker: SwipeTracker,
    haptics: Box<dyn Haptics>,

    tool: Tool,
    text_placement_armed: bool,
    comment_panel_open: bool,
    selected_comment: Option<String>,
    input: Option<InputOverlay>,

    author: String,
    export_dir: PathBuf,
    start_page: Option<usize>,

    /// Inner canvas area from the last draw, for mouse mapping
    canvas_area: Rect,
    /// Canvas position of the last left-button press
    press: Option<(f32, f32)>,

    should_quit: bool,
}

impl App {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        source: DocumentSource,
        options: AppOptions,
    ) -> Result<Self> {
        let mut viewer = Viewer::new(engine, source);
        if let Some(zoom) = options.start_zoom {
            viewer.apply(Command::SetZoom(zoom));
        }

        let comments =
            CommentStore::open(&viewer.document().id, options.comments_dir.as_deref())?;
        let (annotations, saved) =
            AnnotationStore::open(&viewer.document().id, options.comments_dir.as_deref())?;
        for annotation in saved {
            viewer.document_mut().add_annotation(annotation);
        }
        info!(
            "opened {} with {} existing comments, {} annotations",
            viewer.document().name,
            comments.len(),
            viewer.document().annotations.len()
        );

        Ok(Self {
            viewer,
            comments,
            annotations,
            notifications: NotificationManager::new(),
            tracker: SwipeTracker::new(),
            haptics: Box::new(NoHaptics),
            tool: Tool::Select,
            text_placement_armed: false,
            comment_panel_open: false,
            selected_comment: None,
            input: None,
            author: options.author,
            export_dir: options.export_dir,
            start_page: options.start_page,
            canvas_area: Rect::default(),
            press: None,
            should_quit: false,
        })
    }

    #[must_use]
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    #[must_use]
    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn input_active(&self) -> bool {
        self.input.is_some()
    }

    #[must_use]
    pub fn selected_comment(&self) -> Option<&str> {
        self.selected_comment.as_deref()
    }

    #[must_use]
    pub fn comment_panel_open(&self) -> bool {
        self.comment_panel_open
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn canvas_area(&self) -> Rect {
        self.canvas_area
    }

    /// Drain background progress and expire notifications
    pub fn tick(&mut self) {
        for event in self.viewer.poll_events() {
            self.handle_viewer_event(event);
        }
        self.notifications.update();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_viewer_event(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::DocumentReady {
                pages,
                used_fallback,
            } => {
                if let Some(page) = self.start_page.take() {
                    self.viewer.apply(Command::GoToPage(page));
                }
                if used_fallback {
                    self.notifications
                        .warn("Fetch failed; showing placeholder document");
                } else {
                    self.notifications
                        .success(format!("Loaded {pages} pages"));
                }
            }

            ViewerEvent::LoadFailed => {
                if let Some(error) = self.viewer.load_error() {
                    self.notifications.error(error.to_string());
                }
            }

            ViewerEvent::PageRendered { .. } => {}

            ViewerEvent::RenderFailed { page } => {
                self.notifications
                    .error(format!("Could not render page {page}"));
            }

            ViewerEvent::TextExtracted { pages } => {
                let name = self.viewer.document().name.clone();
                match export::export_text(&pages, &self.export_dir, &name) {
                    Ok(path) => self
                        .notifications
                        .success(format!("Text saved to {}", path.display())),
                    Err(e) => self.notifications.error(format!("Text export failed: {e}")),
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.input.is_some() {
            self.handle_input_key(key);
            return;
        }

        if let Some(cmd) = shortcut_command(&key, false) {
            self.viewer.apply(cmd);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Esc => {
                if !self.notifications.dismiss_current() {
                    self.comment_panel_open = false;
                }
            }

            KeyCode::Char('r') => {
                if self.viewer.retry() {
                    self.notifications.info("Retrying load");
                }
            }

            KeyCode::Char('v') => self.select_tool(Tool::Select),
            KeyCode::Char('p') => self.select_tool(Tool::Pan),
            KeyCode::Char('h') => self.select_tool(Tool::Highlight),
            KeyCode::Char('n') => self.select_tool(Tool::Note),
            KeyCode::Char('d') => self.select_tool(Tool::Drawing),
            KeyCode::Char('g') => self.select_tool(Tool::Signature),
            KeyCode::Char('i') => self.select_tool(Tool::Image),
            KeyCode::Char('t') => {
                self.select_tool(Tool::Text);
                self.text_placement_armed = true;
            }

            KeyCode::Char('c') => {
                self.comment_panel_open = !self.comment_panel_open;
            }
            KeyCode::Tab => self.select_next_comment(),
            KeyCode::Char('m') => self.toggle_resolved(),
            KeyCode::Char('a') => self.archive_selected(),
            KeyCode::Char('L') => self.like_selected(),
            KeyCode::Char('R') => self.reply_to_selected(),
            KeyCode::Char('D') => self.delete_selected(),

            KeyCode::Char('s') => self.export_document(),
            KeyCode::Char('x') => self.export_snapshot(SnapshotFormat::Png),
            KeyCode::Char('X') => self.export_snapshot(SnapshotFormat::Jpeg),
            KeyCode::Char('e') => {
                if matches!(self.viewer.status(), ViewerStatus::Ready) {
                    self.viewer.request_text_extraction();
                    self.notifications.info("Extracting text");
                }
            }

            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input = None;
            }
            KeyCode::Enter => {
                if let Some(overlay) = self.input.take() {
                    self.submit_input(overlay);
                }
            }
            KeyCode::Backspace => {
                if let Some(overlay) = self.input.as_mut() {
                    overlay.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(overlay) = self.input.as_mut() {
                    overlay.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn select_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.text_placement_armed = false;
        self.notifications.info(format!("Tool: {}", tool.label()));
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pos = self.canvas_position(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((x, y)) = pos else { return };
                self.press = Some((x, y));
                // Mouse dragging only turns pages in pan mode
                if self.tool == Tool::Pan {
                    self.tracker.begin(PointerKind::Mouse, x, y, Instant::now());
                }
            }

            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((x, y)) = pos {
                    self.tracker.update(x, y);
                }
            }

            MouseEventKind::Up(MouseButton::Left) => {
                let press = self.press.take();

                if self.tracker.is_active() {
                    match pos {
                        Some((x, y)) => {
                            if let Some(swipe) = self.tracker.finish(x, y, Instant::now()) {
                                self.apply_swipe(swipe);
                                return;
                            }
                        }
                        None => self.tracker.cancel(),
                    }
                }

                if let (Some((px, py)), Some((x, y))) = (press, pos) {
                    let moved = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
                    if moved <= CLICK_SLOP_PX {
                        self.handle_canvas_click(x, y);
                    }
                }
            }

            _ => {}
        }
    }

    /// Map a terminal cell inside the canvas to canvas pixel coordinates
    fn canvas_position(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        let area = self.canvas_area;
        if area.width == 0 || !area.contains(ratatui::layout::Position { x: column, y: row }) {
            return None;
        }
        Some((
            f32::from(column - area.x) * CELL_PX_X,
            f32::from(row - area.y) * CELL_PX_Y,
        ))
    }

    fn apply_swipe(&mut self, swipe: Swipe) {
        let before = self.viewer.document().current_page;
        let cmd = match swipe.turn {
            PageTurn::Prev => Command::PrevPage,
            PageTurn::Next => Command::NextPage,
        };
        self.viewer.apply(cmd);

        let turned = self.viewer.document().current_page != before;
        if turned && swipe.kind == PointerKind::Touch {
            self.haptics.pulse();
        }
    }

    fn handle_canvas_click(&mut self, x: f32, y: f32) {
        if !matches!(self.viewer.status(), ViewerStatus::Ready) {
            return;
        }

        let doc = self.viewer.document();
        let page = doc.current_page;
        let zoom = doc.zoom.factor();

        let outcome = {
            let page_comments = self.comments.on_page(page);
            let ctx = ClickContext {
                page,
                zoom,
                tool: self.tool,
                text_placement_armed: self.text_placement_armed,
                comments: &page_comments,
                author: &self.author,
            };
            route_click(x, y, &ctx)
        };

        match outcome {
            ClickOutcome::CommentSelected { id } => {
                self.selected_comment = Some(id);
                self.comment_panel_open = true;
            }

            ClickOutcome::TextPlaced(element) => {
                self.text_placement_armed = false;
                let element_id = element.id.clone();
                self.viewer.document_mut().add_element(PageElement::Text(element));
                self.input = Some(InputOverlay {
                    purpose: InputPurpose::TextContent { element_id },
                    title: "Text",
                    buffer: String::new(),
                });
            }

            ClickOutcome::ImagePickRequested { page, x, y } => {
                self.input = Some(InputOverlay {
                    purpose: InputPurpose::ImagePath { page, x, y },
                    title: "Image path",
                    buffer: String::new(),
                });
            }

            ClickOutcome::AnnotationCreated(annotation) => {
                let kind = annotation.kind;
                self.viewer.document_mut().add_annotation(annotation);
                if let Err(e) = self.annotations.save(&self.viewer.document().annotations) {
                    self.notifications
                        .error(format!("Could not save annotation: {e}"));
                } else {
                    self.notifications.success(format!("Added {kind:?}"));
                }
            }

            ClickOutcome::NoteRequested { page, x, y } => {
                self.input = Some(InputOverlay {
                    purpose: InputPurpose::Note { page, x, y },
                    title: "Note",
                    buffer: String::new(),
                });
            }

            ClickOutcome::Ignored => {}
        }
    }

    fn submit_input(&mut self, overlay: InputOverlay) {
        match overlay.purpose {
            InputPurpose::Note { page, x, y } => {
                let text = overlay.buffer.trim();
                if text.is_empty() {
                    self.notifications.warn("Empty note discarded");
                    return;
                }

                let comment = Comment::new(page, x, y, text, &self.author);
                let id = comment.id.clone();
                match self.comments.add(comment) {
                    Ok(()) => {
                        self.selected_comment = Some(id);
                        self.comment_panel_open = true;
                        self.notifications.success("Note added");
                    }
                    Err(e) => self.notifications.error(format!("Could not save note: {e}")),
                }
            }

            InputPurpose::Reply { comment_id } => {
                let text = overlay.buffer.trim();
                if text.is_empty() {
                    self.notifications.warn("Empty reply discarded");
                    return;
                }

                match self
                    .comments
                    .add_reply(&comment_id, Reply::new(text, &self.author))
                {
                    Ok(()) => self.notifications.success("Reply added"),
                    Err(e) => self.notifications.error(format!("Could not reply: {e}")),
                }
            }

            InputPurpose::ImagePath { page, x, y } => {
                let path = PathBuf::from(overlay.buffer.trim());
                let bytes = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        self.notifications
                            .error(format!("Could not read {}: {e}", path.display()));
                        return;
                    }
                };

                match ImageElement::place(page, x, y, bytes) {
                    Ok(element) => {
                        let (w, h) = (element.width, element.height);
                        self.viewer
                            .document_mut()
                            .add_element(PageElement::Image(element));
                        self.notifications
                            .success(format!("Placed image at {w:.0}x{h:.0}"));
                    }
                    Err(e) => self.notifications.error(e.to_string()),
                }
            }

            InputPurpose::TextContent { element_id } => {
                if let Some(PageElement::Text(text)) =
                    self.viewer.document_mut().element_mut(&element_id)
                {
                    text.content = overlay.buffer;
                    self.notifications.success("Text placed");
                }
            }
        }
    }

    fn select_next_comment(&mut self) {
        let page = self.viewer.document().current_page;
        let visible: Vec<String> = self
            .comments
            .on_page(page)
            .iter()
            .filter(|c| c.status != CommentStatus::Archived)
            .map(|c| c.id.clone())
            .collect();

        if visible.is_empty() {
            return;
        }

        let next = match &self.selected_comment {
            Some(current) => visible
                .iter()
                .position(|id| id == current)
                .map(|i| (i + 1) % visible.len())
                .unwrap_or(0),
            None => 0,
        };
        self.selected_comment = Some(visible[next].clone());
        self.comment_panel_open = true;
    }

    fn toggle_resolved(&mut self) {
        let Some(id) = self.selected_comment.clone() else {
            return;
        };
        let Some(comment) = self.comments.get(&id) else {
            return;
        };

        let status = match comment.status {
            CommentStatus::Resolved => CommentStatus::Open,
            _ => CommentStatus::Resolved,
        };
        match self.comments.set_status(&id, status) {
            Ok(()) => self
                .notifications
                .success(format!("Comment {}", status.label())),
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    fn archive_selected(&mut self) {
        let Some(id) = self.selected_comment.clone() else {
            return;
        };
        match self.comments.set_status(&id, CommentStatus::Archived) {
            Ok(()) => {
                self.selected_comment = None;
                self.notifications.success("Comment archived");
            }
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    fn like_selected(&mut self) {
        let Some(id) = self.selected_comment.clone() else {
            return;
        };
        match self.comments.toggle_like(&id, &self.author) {
            Ok(true) => self.notifications.info("Liked"),
            Ok(false) => self.notifications.info("Unliked"),
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    fn reply_to_selected(&mut self) {
        let Some(id) = self.selected_comment.clone() else {
            self.notifications.warn("No comment selected");
            return;
        };
        self.input = Some(InputOverlay {
            purpose: InputPurpose::Reply { comment_id: id },
            title: "Reply",
            buffer: String::new(),
        });
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_comment.take() else {
            return;
        };
        match self.comments.remove(&id) {
            Ok(()) => self.notifications.success("Comment deleted"),
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    fn export_document(&mut self) {
        let name = self.viewer.document().name.clone();
        let Some(bytes) = self.viewer.document_bytes().cloned() else {
            self.notifications.warn("No document loaded");
            return;
        };

        match export::export_document_bytes(&bytes, &self.export_dir, &name) {
            Ok(path) => self
                .notifications
                .success(format!("Saved copy to {}", path.display())),
            Err(e) => self.notifications.error(format!("Export failed: {e}")),
        }
    }

    fn export_snapshot(&mut self, format: SnapshotFormat) {
        let name = self.viewer.document().name.clone();
        let Some(bitmap) = self.viewer.current_bitmap().cloned() else {
            self.notifications.warn("Nothing rendered yet");
            return;
        };

        match export::export_snapshot(&bitmap, format, &self.export_dir, &name) {
            Ok(path) => self
                .notifications
                .success(format!("Snapshot saved to {}", path.display())),
            Err(e) => self.notifications.error(format!("Snapshot failed: {e}")),
        }
    }

    // --- drawing ---

    pub fn render(&mut self, frame: &mut Frame) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

        self.render_title(frame, rows[0]);

        if self.comment_panel_open {
            let columns =
                Layout::horizontal([Constraint::Min(20), Constraint::Length(36)]).split(rows[1]);
            self.render_canvas(frame, columns[0]);
            self.render_comment_panel(frame, columns[1]);
        } else {
            self.render_canvas(frame, rows[1]);
        }

        self.render_status(frame, rows[2]);

        if self.input.is_some() {
            self.render_input(frame);
        }
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let doc = self.viewer.document();
        let title = if doc.page_count > 0 {
            format!(
                " {} - page {}/{} - {:.0}% ",
                doc.name,
                doc.current_page,
                doc.page_count,
                doc.zoom.factor() * 100.0
            )
        } else {
            format!(" {} ", doc.name)
        };

        frame.render_widget(
            Paragraph::new(title).style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
        );
    }

    fn render_canvas(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.canvas_area = inner;

        match self.viewer.status() {
            ViewerStatus::Loading => {
                frame.render_widget(
                    Paragraph::new(format!("Loading {}...", self.viewer.document().name)),
                    inner,
                );
            }

            ViewerStatus::Failed(error) => {
                let lines = vec![
                    Line::from(Span::styled(
                        format!("Could not open document: {error}"),
                        Style::default().fg(Color::Red),
                    )),
                    Line::from(""),
                    Line::from("Press r to retry, q to quit"),
                ];
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
            }

            ViewerStatus::Ready => self.render_page(frame, inner),
        }
    }

    fn render_page(&self, frame: &mut Frame, inner: Rect) {
        let doc = self.viewer.document();
        let zoom = doc.zoom.factor();
        let page = doc.current_page;

        let mut info = match self.viewer.current_bitmap() {
            Some(bitmap) => format!("[page {} - {}x{}px]", bitmap.page, bitmap.width, bitmap.height),
            None => format!("[page {page} - rendering...]"),
        };
        if self.text_placement_armed {
            info.push_str("  click to place text");
        }
        frame.render_widget(Paragraph::new(info).style(Style::default().fg(Color::DarkGray)), inner);

        let buf = frame.buffer_mut();
        let cell_at = |x: f32, y: f32| -> Option<(u16, u16)> {
            let col = inner.x + (x / CELL_PX_X) as u16;
            let row = inner.y + (y / CELL_PX_Y) as u16;
            (col < inner.right() && row < inner.bottom()).then_some((col, row))
        };

        for annotation in doc.annotations_on(page) {
            let rect = annotation_rect(annotation, zoom);
            let tint = Color::Rgb(annotation.color.r, annotation.color.g, annotation.color.b);
            let (Some((c0, r0)), Some((c1, r1))) = (
                cell_at(rect.x, rect.y),
                cell_at(rect.x + rect.width, rect.y + rect.height),
            ) else {
                continue;
            };
            for row in r0..=r1 {
                for col in c0..=c1 {
                    buf.set_string(col, row, "▒", Style::default().fg(tint));
                }
            }
        }

        for element in doc.elements_on(page) {
            match element {
                PageElement::Text(text) => {
                    let (x, y) = text_anchor(text, zoom);
                    if let Some((col, row)) = cell_at(x, y) {
                        let shown = if text.content.is_empty() {
                            "_"
                        } else {
                            text.content.as_str()
                        };
                        buf.set_string(col, row, shown, Style::default().fg(Color::Cyan));
                    }
                }
                PageElement::Image(image) => {
                    if let Some((col, row)) = cell_at(image.x * zoom, image.y * zoom) {
                        buf.set_string(
                            col,
                            row,
                            format!("[img {:.0}x{:.0}]", image.width, image.height),
                            Style::default().fg(Color::Magenta),
                        );
                    }
                }
            }
        }

        let page_comments = self.comments.on_page(page);
        for marker in comment_markers(&page_comments, zoom) {
            if let Some((col, row)) = cell_at(marker.x, marker.y) {
                let selected = self.selected_comment.as_deref() == Some(marker.comment_id.as_str());
                let color = match marker.status {
                    CommentStatus::Open => Color::Yellow,
                    CommentStatus::Resolved => Color::Green,
                    CommentStatus::Archived => Color::DarkGray,
                };
                let style = if selected {
                    Style::default().fg(color).add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().fg(color)
                };
                buf.set_string(col, row, "●", style);
            }
        }
    }

    fn render_comment_panel(&self, frame: &mut Frame, area: Rect) {
        let page = self.viewer.document().current_page;
        let page_comments = self.comments.on_page(page);

        let mut items = Vec::new();
        for comment in &page_comments {
            if comment.status == CommentStatus::Archived {
                continue;
            }

            let selected = self.selected_comment.as_deref() == Some(comment.id.as_str());
            let mark = match comment.status {
                CommentStatus::Resolved => "✓",
                _ => "○",
            };
            let head = format!(
                "{mark} {} ♥{} ↳{}",
                comment.author,
                comment.likes.len(),
                comment.replies.len()
            );
            let style = if selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            items.push(ListItem::new(vec![
                Line::styled(head, style),
                Line::from(format!("  {}", comment.content)),
            ]));

            if selected {
                for reply in &comment.replies {
                    items.push(ListItem::new(Line::from(format!(
                        "    ↳ {}: {}",
                        reply.author, reply.content
                    ))));
                }
            }
        }

        if items.is_empty() {
            items.push(ListItem::new("No comments on this page"));
        }

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Comments (page {page}) ")),
        );
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            format!(" tool:{} ", self.tool.label()),
            Style::default().add_modifier(Modifier::BOLD),
        )];

        if let Some(notification) = self.notifications.current() {
            let color = match notification.level {
                NotificationLevel::Info => Color::Blue,
                NotificationLevel::Success => Color::Green,
                NotificationLevel::Warning => Color::Yellow,
                NotificationLevel::Error => Color::Red,
            };
            spans.push(Span::styled(
                format!(" {} ", notification.message),
                Style::default().fg(color),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_input(&self, frame: &mut Frame) {
        let Some(overlay) = &self.input else { return };

        let area = frame.area();
        let width = area.width.saturating_sub(8).min(60).max(20);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + area.height / 2,
            width,
            height: 3,
        };

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} (Enter to confirm, Esc to cancel) ", overlay.title));
        let text = format!("{}█", overlay.buffer);
        frame.render_widget(Paragraph::new(text).block(block), popup);
    }
}

/// Drive the app from an event source until it quits.
///
/// The same loop serves the real terminal and scripted tests; only the
/// event source and backend differ.
pub fn run_app_with_event_source<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut E,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    while !app.should_quit() {
        app.tick();
        terminal.draw(|frame| app.render(frame))?;

        if events.poll(Duration::from_millis(50))? {
            let event = events.read()?;
            app.handle_event(event);
        }
    }
    Ok(())
}
