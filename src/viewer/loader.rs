//! Document loading
//!
//! Resolves a [`DocumentSource`] to raw bytes, validates them against the
//! rendering backend, and collects base page geometry. URL fetches that fail
//! for any reason degrade to a synthesized placeholder document instead of
//! an error; empty or unparseable bytes and zero-page documents surface as
//! recoverable [`LoadError`]s the user can retry.
//!
//! Loading runs on its own thread via [`spawn_load`] so opening a large or
//! remote document never blocks the event loop.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flume::Receiver;
use log::{info, warn};

use super::document::DocumentSource;
use super::engine::RenderEngine;
use super::types::PageSize;

/// Overall timeout for remote fetches
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Remote documents larger than this are treated as fetch failures
const MAX_FETCH_BYTES: u64 = 100 * 1024 * 1024;

/// Errors surfaced to the user after a failed load
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("document is empty or corrupt")]
    EmptyOrCorrupt,

    #[error("document has no pages")]
    NoPages,

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A validated document ready for rendering
#[derive(Clone, Debug)]
pub struct LoadedDocument {
    pub bytes: Arc<[u8]>,
    pub page_count: usize,
    /// Base size per page; index `i` holds page `i + 1`
    pub page_sizes: Vec<PageSize>,
    /// True when a failed URL fetch was replaced by the placeholder
    pub used_fallback: bool,
}

/// Outcome delivered by the loader thread
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadedDocument),
    Failed(LoadError),
}

/// Resolve, fetch, and validate a document source.
pub fn load_document(
    engine: &dyn RenderEngine,
    source: &DocumentSource,
) -> Result<LoadedDocument, LoadError> {
    let (bytes, used_fallback): (Arc<[u8]>, bool) = match source {
        DocumentSource::Bytes { data, .. } => (Arc::clone(data), false),

        DocumentSource::Path(path) => {
            let data = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            (Arc::from(data.into_boxed_slice()), false)
        }

        DocumentSource::Url(url) => match fetch_url(url) {
            Some(data) => (Arc::from(data.into_boxed_slice()), false),
            None => {
                info!("fetch failed for {url}, using placeholder document");
                let data = fallback_document(&source.display_name());
                (Arc::from(data.into_boxed_slice()), true)
            }
        },
    };

    if bytes.is_empty() {
        return Err(LoadError::EmptyOrCorrupt);
    }

    let doc = engine.open(&bytes).map_err(|e| {
        warn!("engine rejected document: {e}");
        LoadError::EmptyOrCorrupt
    })?;

    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(LoadError::NoPages);
    }

    let page_sizes = (1..=page_count)
        .map(|page| doc.page_size(page).unwrap_or(PageSize::LETTER))
        .collect();

    Ok(LoadedDocument {
        bytes,
        page_count,
        page_sizes,
        used_fallback,
    })
}

/// Load on a background thread, delivering the outcome over a channel.
///
/// The receiver yields exactly one message. Dropping it abandons the load.
pub fn spawn_load(engine: Arc<dyn RenderEngine>, source: DocumentSource) -> Receiver<LoadOutcome> {
    let (tx, rx) = flume::bounded(1);

    std::thread::spawn(move || {
        let outcome = match load_document(engine.as_ref(), &source) {
            Ok(doc) => LoadOutcome::Loaded(doc),
            Err(e) => LoadOutcome::Failed(e),
        };
        let _ = tx.send(outcome);
    });

    rx
}

fn fetch_url(url: &str) -> Option<Vec<u8>> {
    let agent = ureq::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build();

    let response = match agent.get(url).call() {
        Ok(r) => r,
        Err(e) => {
            warn!("GET {url} failed: {e}");
            return None;
        }
    };

    let mut bytes = Vec::new();
    match response
        .into_reader()
        .take(MAX_FETCH_BYTES)
        .read_to_end(&mut bytes)
    {
        Ok(_) => Some(bytes),
        Err(e) => {
            warn!("reading body of {url} failed: {e}");
            None
        }
    }
}

/// Synthesize a minimal single-page PDF showing `title`.
///
/// Hand-built object by object with a correct xref table, so any conforming
/// parser accepts it. Used when a remote fetch fails.
#[must_use]
pub fn fallback_document(title: &str) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    let mut offsets = [0usize; 6];

    buf.extend_from_slice(b"%PDF-1.4\n");

    offsets[1] = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    offsets[2] = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    offsets[3] = buf.len();
    buf.extend_from_slice(
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
          /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>\nendobj\n",
    );

    offsets[4] = buf.len();
    buf.extend_from_slice(b"4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");

    offsets[5] = buf.len();
    let text = format!(
        "BT\n/F1 24 Tf\n72 720 Td\n({}) Tj\n/F1 12 Tf\n72 690 Td\n(The document could not be fetched.) Tj\nET\n",
        escape_pdf_text(title)
    );
    let stream = format!(
        "5 0 obj\n<< /Length {} >>\nstream\n{}endstream\nendobj\n",
        text.len(),
        text
    );
    buf.extend_from_slice(stream.as_bytes());

    let xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 6\n0000000000 65535 f \n");
    for offset in &offsets[1..] {
        buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(b"trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n");
    buf.extend_from_slice(format!("{xref_offset}\n").as_bytes());
    buf.extend_from_slice(b"%%EOF\n");

    buf
}

/// Escape for a PDF literal string. Helvetica has no glyphs outside
/// Latin-1, so anything else becomes '?'.
fn escape_pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
