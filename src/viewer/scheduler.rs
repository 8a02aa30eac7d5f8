//! Single-flight render scheduling
//!
//! At most one render task is active at a time. Requests arriving while one
//! is in flight collapse into a single pending slot holding only the latest
//! page; intermediate requests are dropped. Completions carry the task id
//! they belong to, so a task that was superseded or cancelled cannot clobber
//! state when its result arrives late.

use super::types::{CancelFlag, RenderParams, TaskId};

/// Scheduler phase, exposed for inspection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rendering,
}

/// A render task handed to the worker
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub task: TaskId,
    /// Page number (1-indexed)
    pub page: usize,
    pub params: RenderParams,
    pub cancel: CancelFlag,
}

#[derive(Debug)]
struct ActiveRender {
    task: TaskId,
    page: usize,
    cancel: CancelFlag,
}

/// What a completion meant for the scheduler
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    /// The active task finished; `pending` holds the page queued behind it
    Finished { pending: Option<usize> },
    /// A superseded task reported late; its output must be dropped
    Stale,
}

/// Tracks the active render task and the latest queued page
#[derive(Debug, Default)]
pub struct RenderScheduler {
    active: Option<ActiveRender>,
    pending: Option<usize>,
    next_task: u64,
}

impl RenderScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: None,
            pending: None,
            next_task: 1,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.active.is_some() {
            Phase::Rendering
        } else {
            Phase::Idle
        }
    }

    #[must_use]
    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    #[must_use]
    pub fn active_page(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.page)
    }

    /// Whether `task` is the task whose result we are waiting for
    #[must_use]
    pub fn is_current(&self, task: TaskId) -> bool {
        self.active.as_ref().is_some_and(|a| a.task == task)
    }

    /// Ask for `page` to be rendered.
    ///
    /// Out-of-range pages are ignored without touching any state. While a
    /// task is in flight the page lands in the pending slot, replacing
    /// whatever was queued before. Otherwise a job is issued immediately.
    pub fn request(
        &mut self,
        page: usize,
        page_count: usize,
        params: RenderParams,
    ) -> Option<RenderJob> {
        if page < 1 || page > page_count {
            return None;
        }

        if self.active.is_some() {
            self.pending = Some(page);
            return None;
        }

        Some(self.issue(page, params))
    }

    /// Record that the worker responded for `task`, successfully or not.
    ///
    /// Cancelled tasks report through here too; by the time their response
    /// arrives they are no longer active and resolve to `Stale`.
    pub fn complete(&mut self, task: TaskId) -> Completion {
        match &self.active {
            Some(active) if active.task == task => {
                self.active = None;
                Completion::Finished {
                    pending: self.pending.take(),
                }
            }
            _ => Completion::Stale,
        }
    }

    /// Cancel the in-flight task and drop anything queued. Used on
    /// teardown and reload.
    pub fn cancel_all(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
        self.pending = None;
    }

    fn issue(&mut self, page: usize, params: RenderParams) -> RenderJob {
        // Any still-live handle is superseded the moment a new task starts.
        if let Some(prev) = self.active.take() {
            prev.cancel.cancel();
        }

        let task = TaskId::new(self.next_task);
        self.next_task += 1;

        let cancel = CancelFlag::new();
        self.active = Some(ActiveRender {
            task,
            page,
            cancel: cancel.clone(),
        });

        RenderJob {
            task,
            page,
            params: RenderParams { zoom: params.zoom },
            cancel,
        }
    }
}
