//! Core types shared across the viewer

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Unique identifier for render tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Shared flag that tells an in-flight render task to stop early.
///
/// Cloned into the worker alongside the job; the scheduler keeps the other
/// handle so it can cancel when the task is superseded or torn down.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parameters for rendering a page
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// Zoom factor (1.0 = 100%, one pixel per PDF point)
    pub zoom: f32,
}

/// Base page dimensions in PDF points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter, the fallback when a backend cannot report bounds
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };
}

/// Per-page geometry tracked by the viewer.
///
/// `width`/`height` start at the base size reported on load and are
/// overwritten with the rasterized dimensions after each completed render,
/// so they are only authoritative once the first render has finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageInfo {
    /// Page number (1-indexed)
    pub number: usize,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees, multiples of 90
    pub rotation: i32,
}

impl PageInfo {
    #[must_use]
    pub fn new(number: usize, size: PageSize) -> Self {
        Self {
            number,
            width: size.width,
            height: size.height,
            rotation: 0,
        }
    }
}

/// Rasterized page output
#[derive(Clone)]
pub struct PageBitmap {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Page number (1-indexed)
    pub page: usize,
    /// Zoom factor this bitmap was rendered at
    pub zoom: f32,
}

impl fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("page", &self.page)
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}
