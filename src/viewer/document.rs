//! Document identity and session state

use std::path::PathBuf;
use std::sync::Arc;

use super::elements::{Annotation, PageElement};
use super::types::{PageInfo, PageSize};
use super::zoom::Zoom;

/// Where document bytes come from.
///
/// When several are conceivable for one open request the precedence is
/// bytes, then path, then URL; the loader only ever sees one of these.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    /// Bytes already in memory (piped input, tests)
    Bytes { name: String, data: Arc<[u8]> },
    /// Local file
    Path(PathBuf),
    /// Remote file, fetched with a fallback document on failure
    Url(String),
}

impl DocumentSource {
    /// Human-readable name used for titles and export filenames
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::Bytes { name, .. } => name.clone(),
            DocumentSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            DocumentSource::Url(url) => url
                .rsplit('/')
                .find(|seg| !seg.is_empty())
                .unwrap_or(url)
                .to_string(),
        }
    }
}

/// Everything the viewer tracks about the open document
#[derive(Clone, Debug)]
pub struct DocumentState {
    /// Stable id derived from the source, used for persistence
    pub id: String,
    pub name: String,

    /// Current page (1-indexed). Meaningful once `page_count > 0`.
    pub current_page: usize,

    /// Total page count, 0 until the document has loaded
    pub page_count: usize,

    pub zoom: Zoom,

    /// Geometry per page; index `i` holds page `i + 1`
    pub pages: Vec<PageInfo>,

    pub annotations: Vec<Annotation>,
    pub elements: Vec<PageElement>,
}

impl DocumentState {
    #[must_use]
    pub fn new(source: &DocumentSource) -> Self {
        let name = source.display_name();
        let digest = md5::compute(name.as_bytes());

        Self {
            id: format!("{digest:x}"),
            name,
            current_page: 1,
            page_count: 0,
            zoom: Zoom::default(),
            pages: Vec::new(),
            annotations: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Replace page geometry after a (re)load
    pub fn set_pages(&mut self, sizes: &[PageSize]) {
        self.page_count = sizes.len();
        self.pages = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| PageInfo::new(i + 1, *size))
            .collect();
        if self.page_count > 0 {
            self.current_page = self.current_page.clamp(1, self.page_count);
        } else {
            self.current_page = 1;
        }
    }

    #[must_use]
    pub fn page_info(&self, page: usize) -> Option<&PageInfo> {
        if page < 1 {
            return None;
        }
        self.pages.get(page - 1)
    }

    /// Record rasterized dimensions for a page after a completed render
    pub fn record_rendered_size(&mut self, page: usize, width: f32, height: f32) {
        if page >= 1 {
            if let Some(info) = self.pages.get_mut(page - 1) {
                info.width = width;
                info.height = height;
            }
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Returns true if an annotation with this id was removed
    pub fn remove_annotation(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        self.annotations.len() != before
    }

    #[must_use]
    pub fn annotations_on(&self, page: usize) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.page == page).collect()
    }

    pub fn add_element(&mut self, element: PageElement) {
        self.elements.push(element);
    }

    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id() != id);
        self.elements.len() != before
    }

    #[must_use]
    pub fn elements_on(&self, page: usize) -> Vec<&PageElement> {
        self.elements.iter().filter(|e| e.page() == page).collect()
    }

    #[must_use]
    pub fn element_mut(&mut self, id: &str) -> Option<&mut PageElement> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::elements::TextElement;

    fn bytes_source(name: &str) -> DocumentSource {
        DocumentSource::Bytes {
            name: name.to_string(),
            data: Arc::from(&b"%PDF-"[..]),
        }
    }

    #[test]
    fn display_name_from_path_and_url() {
        let path = DocumentSource::Path(PathBuf::from("/tmp/reports/q3.pdf"));
        assert_eq!(path.display_name(), "q3.pdf");

        let url = DocumentSource::Url("https://example.com/docs/spec.pdf".to_string());
        assert_eq!(url.display_name(), "spec.pdf");

        let bare = DocumentSource::Url("https://example.com/".to_string());
        assert_eq!(bare.display_name(), "example.com");
    }

    #[test]
    fn same_name_yields_same_document_id() {
        let a = DocumentState::new(&bytes_source("contract.pdf"));
        let b = DocumentState::new(&bytes_source("contract.pdf"));
        assert_eq!(a.id, b.id);

        let c = DocumentState::new(&bytes_source("other.pdf"));
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn set_pages_clamps_current_page() {
        let mut state = DocumentState::new(&bytes_source("doc.pdf"));
        state.current_page = 9;
        state.set_pages(&[PageSize::LETTER; 4]);

        assert_eq!(state.page_count, 4);
        assert_eq!(state.current_page, 4);
        assert_eq!(state.page_info(1).unwrap().number, 1);
        assert!(state.page_info(0).is_none());
        assert!(state.page_info(5).is_none());
    }

    #[test]
    fn rendered_size_overwrites_base_geometry() {
        let mut state = DocumentState::new(&bytes_source("doc.pdf"));
        state.set_pages(&[PageSize::LETTER; 2]);

        state.record_rendered_size(2, 1224.0, 1584.0);
        let info = state.page_info(2).unwrap();
        assert_eq!(info.width, 1224.0);
        assert_eq!(info.height, 1584.0);

        // Out-of-range records are ignored
        state.record_rendered_size(0, 1.0, 1.0);
        state.record_rendered_size(7, 1.0, 1.0);
    }

    #[test]
    fn annotations_filter_by_page() {
        let mut state = DocumentState::new(&bytes_source("doc.pdf"));
        state.add_annotation(Annotation::highlight(1, 10.0, 10.0, "dev"));
        state.add_annotation(Annotation::highlight(2, 10.0, 10.0, "dev"));
        state.add_annotation(Annotation::drawing(2, 50.0, 50.0, "dev"));

        assert_eq!(state.annotations_on(1).len(), 1);
        assert_eq!(state.annotations_on(2).len(), 2);
        assert!(state.annotations_on(3).is_empty());
    }

    #[test]
    fn remove_annotation_by_id() {
        let mut state = DocumentState::new(&bytes_source("doc.pdf"));
        let annotation = Annotation::highlight(1, 10.0, 10.0, "dev");
        let id = annotation.id.clone();
        state.add_annotation(annotation);

        assert!(state.remove_annotation(&id));
        assert!(!state.remove_annotation(&id));
        assert!(state.annotations.is_empty());
    }

    #[test]
    fn elements_filter_and_lookup() {
        let mut state = DocumentState::new(&bytes_source("doc.pdf"));
        let text = TextElement::new(3, 5.0, 5.0);
        let id = text.id.clone();
        state.add_element(PageElement::Text(text));

        assert_eq!(state.elements_on(3).len(), 1);
        assert!(state.elements_on(1).is_empty());

        if let Some(PageElement::Text(t)) = state.element_mut(&id) {
            t.content = "hello".to_string();
        }
        match &state.elements[0] {
            PageElement::Text(t) => assert_eq!(t.content, "hello"),
            PageElement::Image(_) => panic!("expected text element"),
        }

        assert!(state.remove_element(&id));
        assert!(state.elements.is_empty());
    }
}
