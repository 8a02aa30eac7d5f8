//! Render worker - runs in a dedicated thread

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::warn;

use super::engine::{EngineError, RenderEngine};
use super::scheduler::RenderJob;
use super::types::{PageBitmap, TaskId};

/// Requests sent to the render worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Rasterize a page
    Render(RenderJob),

    /// Extract plain text for the given pages (1-indexed)
    ExtractText { pages: Vec<usize> },

    /// Shutdown the worker
    Shutdown,
}

/// Responses from the render worker
#[derive(Debug)]
pub enum WorkerResponse {
    /// Rendered page bitmap
    Rendered {
        task: TaskId,
        page: usize,
        bitmap: PageBitmap,
    },

    /// The task observed its cancel flag and stopped
    Cancelled { task: TaskId },

    /// Error during rendering. Task id 0 means the document itself
    /// failed to open inside the worker.
    Failed {
        task: TaskId,
        page: usize,
        error: EngineError,
    },

    /// Extracted text, one entry per requested page in request order
    Text { pages: Vec<String> },
}

/// Main worker loop.
///
/// Opens the document from `bytes` on this thread and serves requests until
/// `Shutdown` arrives or the channel closes. The document handle never
/// crosses threads.
pub fn render_worker(
    engine: Arc<dyn RenderEngine>,
    bytes: Arc<[u8]>,
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
) {
    let doc = match engine.open(&bytes) {
        Ok(d) => d,
        Err(e) => {
            let _ = responses.send(WorkerResponse::Failed {
                task: TaskId::new(0),
                page: 0,
                error: e,
            });
            return;
        }
    };

    for request in requests {
        match request {
            WorkerRequest::Render(job) => {
                if job.cancel.is_cancelled() {
                    let _ = responses.send(WorkerResponse::Cancelled { task: job.task });
                    continue;
                }

                match doc.render_page(job.page, job.params.zoom) {
                    Ok(bitmap) => {
                        if job.cancel.is_cancelled() {
                            let _ = responses.send(WorkerResponse::Cancelled { task: job.task });
                        } else {
                            let _ = responses.send(WorkerResponse::Rendered {
                                task: job.task,
                                page: job.page,
                                bitmap,
                            });
                        }
                    }
                    Err(error) => {
                        let _ = responses.send(WorkerResponse::Failed {
                            task: job.task,
                            page: job.page,
                            error,
                        });
                    }
                }
            }

            WorkerRequest::ExtractText { pages } => {
                let texts = pages
                    .iter()
                    .map(|&page| match doc.page_text(page) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("text extraction failed on page {page}: {e}");
                            String::new()
                        }
                    })
                    .collect();
                let _ = responses.send(WorkerResponse::Text { pages: texts });
            }

            WorkerRequest::Shutdown => break,
        }
    }
}
