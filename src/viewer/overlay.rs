//! Overlay projections
//!
//! Pure position math for the layers composited over the rendered page:
//! filter by page, scale page coordinates into canvas pixels. No drawing
//! happens here; the presentation layer decides how markers and boxes look.

use crate::comments::{Comment, CommentStatus};

use super::elements::{Annotation, ImageElement, TextElement};

/// A rectangle in canvas pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A comment marker positioned in canvas pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub comment_id: String,
    pub x: f32,
    pub y: f32,
    pub status: CommentStatus,
    pub replies: usize,
}

/// Markers for the given page's comments, scaled to canvas pixels.
///
/// Archived threads are not shown, matching the click router.
#[must_use]
pub fn comment_markers(comments: &[&Comment], zoom: f32) -> Vec<Marker> {
    comments
        .iter()
        .filter(|c| c.status != CommentStatus::Archived)
        .map(|c| Marker {
            comment_id: c.id.clone(),
            x: c.x * zoom,
            y: c.y * zoom,
            status: c.status,
            replies: c.replies.len(),
        })
        .collect()
}

#[must_use]
pub fn annotation_rect(annotation: &Annotation, zoom: f32) -> CanvasRect {
    CanvasRect {
        x: annotation.x * zoom,
        y: annotation.y * zoom,
        width: annotation.width * zoom,
        height: annotation.height * zoom,
    }
}

#[must_use]
pub fn image_rect(image: &ImageElement, zoom: f32) -> CanvasRect {
    CanvasRect {
        x: image.x * zoom,
        y: image.y * zoom,
        width: image.width * zoom,
        height: image.height * zoom,
    }
}

/// Text elements size themselves to their content; only the anchor scales
#[must_use]
pub fn text_anchor(text: &TextElement, zoom: f32) -> (f32, f32) {
    (text.x * zoom, text.y * zoom)
}
