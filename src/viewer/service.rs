//! Viewer service - owns the document lifecycle, scheduler, worker, and cache
//!
//! The service is single-threaded at its surface: the app thread applies
//! commands and polls events, while loading and rendering happen on
//! background threads that report back over channels. All scheduling
//! decisions happen here, so the worker stays a dumb executor.

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, info, warn};

use super::cache::{CacheKey, DEFAULT_CACHE_SIZE, PageCache};
use super::document::{DocumentSource, DocumentState};
use super::engine::RenderEngine;
use super::loader::{self, LoadError, LoadOutcome, LoadedDocument};
use super::scheduler::{Completion, Phase, RenderJob, RenderScheduler};
use super::state::{Command, Effect};
use super::types::{PageBitmap, RenderParams, TaskId};
use super::worker::{WorkerRequest, WorkerResponse, render_worker};

/// Lifecycle of the open document
#[derive(Debug)]
pub enum ViewerStatus {
    Loading,
    Ready,
    Failed(LoadError),
}

/// Observable outcomes, drained via [`Viewer::poll_events`]
#[derive(Debug)]
pub enum ViewerEvent {
    /// The document finished loading and the first render was requested
    DocumentReady { pages: usize, used_fallback: bool },
    /// Loading failed; the error is available via [`Viewer::load_error`]
    LoadFailed,
    /// A fresh bitmap for `page` is available via [`Viewer::current_bitmap`]
    PageRendered { page: usize },
    RenderFailed { page: usize },
    /// Text extraction finished, one entry per page in page order
    TextExtracted { pages: Vec<String> },
}

/// Orchestrates loading, rendering, and caching for one document
pub struct Viewer {
    engine: Arc<dyn RenderEngine>,
    source: DocumentSource,
    document: DocumentState,
    scheduler: RenderScheduler,
    cache: PageCache,
    status: ViewerStatus,
    /// True while a load thread is running; guards retry and reload
    loading: bool,
    used_fallback: bool,
    load_rx: Option<Receiver<LoadOutcome>>,
    request_tx: Option<Sender<WorkerRequest>>,
    response_rx: Option<Receiver<WorkerResponse>>,
    bytes: Option<Arc<[u8]>>,
    current_bitmap: Option<Arc<PageBitmap>>,
    events: Vec<ViewerEvent>,
}

impl Viewer {
    /// Create a viewer and start loading `source` in the background
    #[must_use]
    pub fn new(engine: Arc<dyn RenderEngine>, source: DocumentSource) -> Self {
        let document = DocumentState::new(&source);

        let mut viewer = Self {
            engine,
            source,
            document,
            scheduler: RenderScheduler::new(),
            cache: PageCache::new(DEFAULT_CACHE_SIZE),
            status: ViewerStatus::Loading,
            loading: false,
            used_fallback: false,
            load_rx: None,
            request_tx: None,
            response_rx: None,
            bytes: None,
            current_bitmap: None,
            events: Vec::new(),
        };
        viewer.begin_load();
        viewer
    }

    #[must_use]
    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut DocumentState {
        &mut self.document
    }

    #[must_use]
    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.status {
            ViewerStatus::Failed(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.scheduler.phase() == Phase::Rendering
    }

    /// True when a failed URL fetch was replaced by the placeholder document
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Bitmap of the most recently completed render
    #[must_use]
    pub fn current_bitmap(&self) -> Option<&Arc<PageBitmap>> {
        self.current_bitmap.as_ref()
    }

    /// Raw bytes of the loaded document, for export
    #[must_use]
    pub fn document_bytes(&self) -> Option<&Arc<[u8]>> {
        self.bytes.as_ref()
    }

    /// Apply a command and execute the effects it produces
    pub fn apply(&mut self, cmd: Command) {
        let effects = self.document.apply(cmd);
        self.execute_effects(effects);
    }

    /// Retry a failed load. Ignored unless the viewer is in the failed
    /// state with no load already running.
    pub fn retry(&mut self) -> bool {
        if self.loading || !matches!(self.status, ViewerStatus::Failed(_)) {
            return false;
        }

        info!("retrying load of {}", self.document.name);
        self.begin_load();
        true
    }

    /// Ask for `page` to be rendered at the current zoom.
    ///
    /// Cache hits are delivered immediately and supersede whatever the
    /// worker is doing. Out-of-range pages are ignored by the scheduler.
    pub fn request_render(&mut self, page: usize) {
        if !matches!(self.status, ViewerStatus::Ready) {
            return;
        }

        let params = RenderParams {
            zoom: self.document.zoom.factor(),
        };

        let key = CacheKey::from_params(page, &params);
        if let Some(bitmap) = self.cache.get(&key) {
            self.scheduler.cancel_all();
            self.deliver(bitmap);
            return;
        }

        let Some(job) = self.scheduler.request(page, self.document.page_count, params) else {
            return;
        };
        self.send_job(job);
    }

    /// Extract text for every page. The result arrives as
    /// [`ViewerEvent::TextExtracted`].
    pub fn request_text_extraction(&mut self) {
        if !matches!(self.status, ViewerStatus::Ready) {
            return;
        }

        if let Some(tx) = &self.request_tx {
            let pages = (1..=self.document.page_count).collect();
            let _ = tx.send(WorkerRequest::ExtractText { pages });
        }
    }

    /// Drain background progress and return everything that happened
    /// since the last poll.
    pub fn poll_events(&mut self) -> Vec<ViewerEvent> {
        self.drain_load();
        self.drain_worker();
        std::mem::take(&mut self.events)
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::InvalidateCache => self.cache.invalidate_all(),
                Effect::RenderCurrentPage => self.request_render(self.document.current_page),
                Effect::ReloadDocument => self.reload(),
            }
        }
    }

    fn begin_load(&mut self) {
        self.shutdown_worker();
        self.scheduler.cancel_all();
        self.current_bitmap = None;
        self.status = ViewerStatus::Loading;
        self.loading = true;
        self.load_rx = Some(loader::spawn_load(
            Arc::clone(&self.engine),
            self.source.clone(),
        ));
    }

    fn reload(&mut self) {
        if self.loading {
            return;
        }

        info!("reloading {}", self.document.name);
        self.begin_load();
    }

    fn finish_load(&mut self, doc: LoadedDocument) {
        self.document.set_pages(&doc.page_sizes);
        self.used_fallback = doc.used_fallback;
        self.bytes = Some(Arc::clone(&doc.bytes));

        // The worker opens its own document handle from the shared bytes,
        // so nothing non-Send ever crosses this boundary.
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        let engine = Arc::clone(&self.engine);
        let bytes = doc.bytes;
        std::thread::spawn(move || {
            render_worker(engine, bytes, request_rx, response_tx);
        });
        self.request_tx = Some(request_tx);
        self.response_rx = Some(response_rx);

        self.status = ViewerStatus::Ready;
        self.events.push(ViewerEvent::DocumentReady {
            pages: doc.page_count,
            used_fallback: doc.used_fallback,
        });
        self.request_render(self.document.current_page);
    }

    fn drain_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(flume::TryRecvError::Empty) => return,
            Err(flume::TryRecvError::Disconnected) => {
                LoadOutcome::Failed(LoadError::EmptyOrCorrupt)
            }
        };

        self.load_rx = None;
        self.loading = false;

        match outcome {
            LoadOutcome::Loaded(doc) => self.finish_load(doc),
            LoadOutcome::Failed(error) => {
                warn!("document load failed: {error}");
                self.status = ViewerStatus::Failed(error);
                self.events.push(ViewerEvent::LoadFailed);
            }
        }
    }

    fn drain_worker(&mut self) {
        let Some(rx) = self.response_rx.as_ref().cloned() else {
            return;
        };

        while let Ok(response) = rx.try_recv() {
            self.handle_response(response);
        }
    }

    fn handle_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Rendered { task, page, bitmap } => {
                match self.scheduler.complete(task) {
                    Completion::Finished { pending } => {
                        let key =
                            CacheKey::from_params(page, &RenderParams { zoom: bitmap.zoom });
                        let bitmap = self.cache.insert(key, bitmap);
                        self.deliver(bitmap);
                        if let Some(next) = pending {
                            self.request_render(next);
                        }
                    }
                    Completion::Stale => {
                        debug!("dropping stale render of page {page}");
                    }
                }
            }

            WorkerResponse::Cancelled { task } => {
                // Cancelled tasks were superseded before their response
                // arrived, but route any queued page just in case
                if let Completion::Finished {
                    pending: Some(next),
                } = self.scheduler.complete(task)
                {
                    self.request_render(next);
                }
            }

            WorkerResponse::Failed { task, page, error } => {
                if task == TaskId::new(0) {
                    warn!("worker could not open document: {error}");
                    self.shutdown_worker();
                    self.status = ViewerStatus::Failed(LoadError::EmptyOrCorrupt);
                    self.events.push(ViewerEvent::LoadFailed);
                    return;
                }

                match self.scheduler.complete(task) {
                    Completion::Finished { pending } => {
                        warn!("render of page {page} failed: {error}");
                        self.events.push(ViewerEvent::RenderFailed { page });
                        if let Some(next) = pending {
                            self.request_render(next);
                        }
                    }
                    Completion::Stale => {}
                }
            }

            WorkerResponse::Text { pages } => {
                self.events.push(ViewerEvent::TextExtracted { pages });
            }
        }
    }

    fn deliver(&mut self, bitmap: Arc<PageBitmap>) {
        let page = bitmap.page;
        // Zoom is clamped well away from zero
        let width = bitmap.width as f32 / bitmap.zoom;
        let height = bitmap.height as f32 / bitmap.zoom;

        self.current_bitmap = Some(bitmap);
        let _ = self.document.apply(Command::PageRendered {
            page,
            width,
            height,
        });
        self.events.push(ViewerEvent::PageRendered { page });
    }

    fn send_job(&mut self, job: RenderJob) {
        if let Some(tx) = &self.request_tx {
            let _ = tx.send(WorkerRequest::Render(job));
        }
    }

    fn shutdown_worker(&mut self) {
        if let Some(tx) = self.request_tx.take() {
            let _ = tx.send(WorkerRequest::Shutdown);
        }
        self.response_rx = None;
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
        self.shutdown_worker();
    }
}
