//! Rasterization backend seam
//!
//! The viewer never talks to a PDF library directly. It goes through
//! [`RenderEngine`], which opens raw bytes into an [`EngineDoc`] that can
//! report page geometry, rasterize pages, and extract text. The MuPDF
//! implementation lives behind the `mupdf` cargo feature so the library
//! and its tests build without a C toolchain.

use super::types::{PageBitmap, PageSize};

/// Errors from a rendering backend
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("PDF engine: {detail}")]
    Backend { detail: String },

    #[error("page {page} out of range (document has {count})")]
    PageOutOfRange { page: usize, count: usize },
}

impl EngineError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend { detail: msg.into() }
    }
}

/// Opens raw document bytes into a renderable document.
///
/// Engines are shared handles; each worker thread calls `open` itself and
/// keeps the returned document for the thread's lifetime, so the document
/// type does not need to be `Send`.
pub trait RenderEngine: Send + Sync {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn EngineDoc>, EngineError>;
}

/// A parsed document as exposed by a rendering backend.
///
/// Page numbers are 1-indexed everywhere in this crate; implementations
/// translate to whatever the underlying library expects.
pub trait EngineDoc {
    fn page_count(&self) -> usize;

    /// Base page size in PDF points
    fn page_size(&self, page: usize) -> Result<PageSize, EngineError>;

    /// Rasterize a page at `zoom` (1.0 = one pixel per point), RGB8 output
    fn render_page(&self, page: usize, zoom: f32) -> Result<PageBitmap, EngineError>;

    /// Plain text content of a page
    fn page_text(&self, page: usize) -> Result<String, EngineError>;
}

#[cfg(feature = "mupdf")]
pub use self::mupdf_backend::MupdfEngine;

#[cfg(feature = "mupdf")]
mod mupdf_backend {
    use mupdf::text_page::TextBlockType;
    use mupdf::{Colorspace, Document, Matrix, Pixmap, TextPageFlags};

    use super::{EngineDoc, EngineError, RenderEngine};
    use crate::viewer::types::{PageBitmap, PageSize};

    /// MuPDF-backed engine
    pub struct MupdfEngine;

    impl MupdfEngine {
        #[must_use]
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for MupdfEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RenderEngine for MupdfEngine {
        fn open(&self, bytes: &[u8]) -> Result<Box<dyn EngineDoc>, EngineError> {
            let doc = Document::from_bytes(bytes, "application/pdf")
                .map_err(|e| EngineError::backend(e.to_string()))?;
            let page_count = doc
                .page_count()
                .map_err(|e| EngineError::backend(e.to_string()))? as usize;

            Ok(Box::new(MupdfDoc { doc, page_count }))
        }
    }

    struct MupdfDoc {
        doc: Document,
        page_count: usize,
    }

    impl MupdfDoc {
        fn load_page(&self, page: usize) -> Result<mupdf::Page, EngineError> {
            if page < 1 || page > self.page_count {
                return Err(EngineError::PageOutOfRange {
                    page,
                    count: self.page_count,
                });
            }
            self.doc
                .load_page((page - 1) as i32)
                .map_err(|e| EngineError::backend(e.to_string()))
        }
    }

    impl EngineDoc for MupdfDoc {
        fn page_count(&self) -> usize {
            self.page_count
        }

        fn page_size(&self, page: usize) -> Result<PageSize, EngineError> {
            let bounds = self
                .load_page(page)?
                .bounds()
                .map_err(|e| EngineError::backend(e.to_string()))?;

            Ok(PageSize {
                width: bounds.x1 - bounds.x0,
                height: bounds.y1 - bounds.y0,
            })
        }

        fn render_page(&self, page: usize, zoom: f32) -> Result<PageBitmap, EngineError> {
            let loaded = self.load_page(page)?;
            let transform = Matrix::new_scale(zoom, zoom);
            let rgb = Colorspace::device_rgb();
            let pixmap = loaded
                .to_pixmap(&transform, &rgb, false, false)
                .map_err(|e| EngineError::backend(e.to_string()))?;

            let pixels = pixmap_to_rgb(&pixmap)?;

            Ok(PageBitmap {
                pixels,
                width: pixmap.width(),
                height: pixmap.height(),
                page,
                zoom,
            })
        }

        fn page_text(&self, page: usize) -> Result<String, EngineError> {
            let loaded = self.load_page(page)?;
            let text_page = loaded
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| EngineError::backend(e.to_string()))?;

            let mut text = String::new();
            for block in text_page.blocks() {
                if block.r#type() != TextBlockType::Text {
                    continue;
                }
                for line in block.lines() {
                    for ch in line.chars() {
                        if let Some(c) = ch.char() {
                            text.push(c);
                        }
                    }
                    text.push('\n');
                }
            }

            Ok(text)
        }
    }

    /// Flatten pixmap samples into tightly-packed RGB rows, honoring stride
    fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, EngineError> {
        let n = pixmap.n() as usize;
        if n < 3 {
            return Err(EngineError::backend(format!(
                "unsupported pixmap format: {n} channels"
            )));
        }

        let width = pixmap.width() as usize;
        let height = pixmap.height() as usize;
        let stride = pixmap.stride() as usize;
        let samples = pixmap.samples();
        let row_bytes = width * n;
        let expected_min = stride.saturating_mul(height);
        if samples.len() < expected_min || row_bytes > stride {
            return Err(EngineError::backend("pixmap buffer size mismatch"));
        }

        let mut out = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let row_start = y * stride;
            let row = &samples[row_start..row_start + row_bytes];
            if n == 3 {
                out.extend_from_slice(row);
            } else {
                for px in row.chunks_exact(n) {
                    out.extend_from_slice(&px[..3]);
                }
            }
        }

        Ok(out)
    }
}
