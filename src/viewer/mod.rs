//! PDF viewing core
//!
//! Document loading, single-flight render scheduling, gesture recognition,
//! click routing, and the state store driving it all. The rendering backend
//! is reached only through [`RenderEngine`], so the whole module works
//! against a fake engine in tests.

pub mod cache;
pub mod click;
pub mod document;
pub mod elements;
pub mod engine;
pub mod gesture;
pub mod loader;
pub mod overlay;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod types;
pub mod worker;
pub mod zoom;

pub use cache::{CacheKey, DEFAULT_CACHE_SIZE, PageCache};
pub use click::{ClickContext, ClickOutcome, MARKER_HIT_TOLERANCE_PX, Tool, route_click};
pub use document::{DocumentSource, DocumentState};
pub use elements::{
    Annotation, AnnotationKind, ImageElement, PageElement, PlaceImageError, TextElement, Tint,
    fitted_size,
};
#[cfg(feature = "mupdf")]
pub use engine::MupdfEngine;
pub use engine::{EngineDoc, EngineError, RenderEngine};
pub use gesture::{
    Haptics, NoHaptics, PageTurn, PointerKind, Swipe, SwipeTracker, classify,
};
pub use loader::{LoadError, LoadOutcome, LoadedDocument, fallback_document, load_document};
pub use overlay::{CanvasRect, Marker, annotation_rect, comment_markers, image_rect, text_anchor};
pub use scheduler::{Completion, Phase, RenderJob, RenderScheduler};
pub use service::{Viewer, ViewerEvent, ViewerStatus};
pub use state::{Command, Effect};
pub use types::*;
pub use zoom::*;
