//! Shared helpers for tests: a scriptable rendering backend and input
//! scenario builders. Compiled only for tests or with the `test-utils`
//! feature.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::event_source::{Event, SimulatedEventSource};
use crate::viewer::engine::{EngineDoc, EngineError, RenderEngine};
use crate::viewer::types::{PageBitmap, PageSize};

/// Scriptable in-memory rendering backend.
///
/// Renders solid-color bitmaps sized from the configured page size and the
/// requested zoom, records every rendered page number, and can be told to
/// reject documents, fail specific pages, or sleep before answering.
pub struct FakeEngine {
    pages: usize,
    page_size: PageSize,
    delay: Option<Duration>,
    fail_pages: HashSet<usize>,
    reject_open: bool,
    rendered: Arc<Mutex<Vec<usize>>>,
}

impl FakeEngine {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            page_size: PageSize::LETTER,
            delay: None,
            fail_pages: HashSet::new(),
            reject_open: false,
            rendered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An engine that refuses to open anything
    pub fn rejecting() -> Self {
        let mut engine = Self::with_pages(0);
        engine.reject_open = true;
        engine
    }

    /// Sleep this long inside every render call
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make renders of `page` fail
    pub fn failing_on(mut self, page: usize) -> Self {
        self.fail_pages.insert(page);
        self
    }

    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Pages rendered so far, in completion order
    pub fn rendered_pages(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

impl RenderEngine for FakeEngine {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn EngineDoc>, EngineError> {
        if self.reject_open || bytes.is_empty() {
            return Err(EngineError::backend("unparseable document"));
        }

        Ok(Box::new(FakeDoc {
            pages: self.pages,
            page_size: self.page_size,
            delay: self.delay,
            fail_pages: self.fail_pages.clone(),
            rendered: self.rendered.clone(),
        }))
    }
}

struct FakeDoc {
    pages: usize,
    page_size: PageSize,
    delay: Option<Duration>,
    fail_pages: HashSet<usize>,
    rendered: Arc<Mutex<Vec<usize>>>,
}

impl FakeDoc {
    fn check_page(&self, page: usize) -> Result<(), EngineError> {
        if page < 1 || page > self.pages {
            Err(EngineError::PageOutOfRange {
                page,
                count: self.pages,
            })
        } else {
            Ok(())
        }
    }
}

impl EngineDoc for FakeDoc {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page_size(&self, page: usize) -> Result<PageSize, EngineError> {
        self.check_page(page)?;
        Ok(self.page_size)
    }

    fn render_page(&self, page: usize, zoom: f32) -> Result<PageBitmap, EngineError> {
        self.check_page(page)?;

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.fail_pages.contains(&page) {
            return Err(EngineError::backend(format!(
                "render failed on page {page}"
            )));
        }

        self.rendered.lock().unwrap().push(page);

        let width = (self.page_size.width * zoom).round().max(1.0) as u32;
        let height = (self.page_size.height * zoom).round().max(1.0) as u32;

        Ok(PageBitmap {
            pixels: vec![0xFF; (width * height * 3) as usize],
            width,
            height,
            page,
            zoom,
        })
    }

    fn page_text(&self, page: usize) -> Result<String, EngineError> {
        self.check_page(page)?;
        Ok(format!("fake text for page {page}\n"))
    }
}

/// Builder for scripted input scenarios
pub struct TestScenarioBuilder {
    events: Vec<Event>,
}

impl Default for TestScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScenarioBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add a character key press
    pub fn press_char(mut self, c: char) -> Self {
        self.events.push(SimulatedEventSource::char_key(c));
        self
    }

    pub fn press_key(mut self, code: crossterm::event::KeyCode) -> Self {
        self.events.push(SimulatedEventSource::key(code));
        self
    }

    /// Next page via Right arrow, n times
    pub fn next_page(mut self, times: usize) -> Self {
        for _ in 0..times {
            self.events
                .push(SimulatedEventSource::key(crossterm::event::KeyCode::Right));
        }
        self
    }

    /// Previous page via Left arrow, n times
    pub fn prev_page(mut self, times: usize) -> Self {
        for _ in 0..times {
            self.events
                .push(SimulatedEventSource::key(crossterm::event::KeyCode::Left));
        }
        self
    }

    /// Left-button press at terminal coordinates
    pub fn mouse_down(mut self, column: u16, row: u16) -> Self {
        self.events
            .push(SimulatedEventSource::mouse_down(column, row));
        self
    }

    pub fn mouse_drag(mut self, column: u16, row: u16) -> Self {
        self.events
            .push(SimulatedEventSource::mouse_drag(column, row));
        self
    }

    pub fn mouse_up(mut self, column: u16, row: u16) -> Self {
        self.events.push(SimulatedEventSource::mouse_up(column, row));
        self
    }

    /// Quit the application (press 'q')
    pub fn quit(mut self) -> Self {
        self.events.push(SimulatedEventSource::char_key('q'));
        self
    }

    /// Build the simulated event source
    pub fn build(self) -> SimulatedEventSource {
        SimulatedEventSource::new(self.events)
    }
}

/// Create a test terminal for driving the app headlessly
pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).unwrap()
}

/// Capture the current terminal buffer as a string
pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let mut lines = Vec::new();

    for y in 0..buffer.area.height {
        let mut line = String::new();
        for x in 0..buffer.area.width {
            let symbol = buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" ");
            line.push_str(symbol);
        }
        lines.push(line.trim_end().to_string());
    }

    while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_engine_renders_scaled_bitmaps() {
        let engine = FakeEngine::with_pages(2).with_page_size(PageSize {
            width: 100.0,
            height: 200.0,
        });
        let doc = engine.open(b"%PDF-").unwrap();

        let bitmap = doc.render_page(1, 2.0).unwrap();
        assert_eq!(bitmap.width, 200);
        assert_eq!(bitmap.height, 400);
        assert_eq!(engine.rendered_pages(), vec![1]);
    }

    #[test]
    fn fake_engine_respects_page_bounds() {
        let engine = FakeEngine::with_pages(2);
        let doc = engine.open(b"%PDF-").unwrap();

        assert!(doc.render_page(0, 1.0).is_err());
        assert!(doc.render_page(3, 1.0).is_err());
        assert!(engine.rendered_pages().is_empty());
    }

    #[test]
    fn scenario_builder_collects_events() {
        let source = TestScenarioBuilder::new()
            .next_page(2)
            .mouse_down(10, 5)
            .mouse_up(30, 5)
            .quit()
            .build();

        assert_eq!(source.events.len(), 5);
    }
}
