//! Canvas click routing
//!
//! One decision function turns a canvas click into an outcome, evaluated in
//! strict priority order: comment markers first, then armed text placement,
//! then picker-backed tools, then shape annotation tools. Clicks arrive in
//! canvas pixels (page coordinates scaled by zoom), so marker hit-testing
//! scales marker positions up rather than scaling the click down.

use crate::comments::{Comment, CommentStatus};

use super::elements::{Annotation, TextElement};

/// Comment marker hit tolerance in canvas pixels (inclusive)
pub const MARKER_HIT_TOLERANCE_PX: f32 = 12.0;

/// Interaction tools selectable in the toolbar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    /// Arms mouse-drag page turning
    Pan,
    Highlight,
    Note,
    Drawing,
    Text,
    Signature,
    Image,
}

impl Tool {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Pan => "pan",
            Tool::Highlight => "highlight",
            Tool::Note => "note",
            Tool::Drawing => "draw",
            Tool::Text => "text",
            Tool::Signature => "sign",
            Tool::Image => "image",
        }
    }
}

/// The click environment: current page, zoom, tool state, and the comments
/// anchored to the current page.
pub struct ClickContext<'a> {
    /// Page number (1-indexed)
    pub page: usize,
    pub zoom: f32,
    pub tool: Tool,
    /// Whether the text tool is waiting for a placement click
    pub text_placement_armed: bool,
    /// Comments on the current page, in marker draw order
    pub comments: &'a [&'a Comment],
    pub author: &'a str,
}

/// What a canvas click resolved to
#[derive(Debug)]
pub enum ClickOutcome {
    /// A comment marker was hit; select the thread and open the panel
    CommentSelected { id: String },
    /// A text element was placed; placement mode must disarm
    TextPlaced(TextElement),
    /// The signature/image tool needs the host to pick an image file
    ImagePickRequested { page: usize, x: f32, y: f32 },
    /// A shape annotation was created at the click point
    AnnotationCreated(Annotation),
    /// The note tool needs note text from the host
    NoteRequested { page: usize, x: f32, y: f32 },
    /// No applicable branch
    Ignored,
}

/// Route a canvas click to its outcome.
///
/// Archived comment threads have no marker, so they never absorb clicks.
#[must_use]
pub fn route_click(canvas_x: f32, canvas_y: f32, ctx: &ClickContext) -> ClickOutcome {
    for comment in ctx.comments {
        if comment.status == CommentStatus::Archived {
            continue;
        }

        let dx = canvas_x - comment.x * ctx.zoom;
        let dy = canvas_y - comment.y * ctx.zoom;
        if (dx * dx + dy * dy).sqrt() <= MARKER_HIT_TOLERANCE_PX {
            return ClickOutcome::CommentSelected {
                id: comment.id.clone(),
            };
        }
    }

    // Everything below works in page coordinates
    let x = canvas_x / ctx.zoom;
    let y = canvas_y / ctx.zoom;

    if ctx.tool == Tool::Text && ctx.text_placement_armed {
        return ClickOutcome::TextPlaced(TextElement::new(ctx.page, x, y));
    }

    match ctx.tool {
        // The pick flow ignores placement arming entirely
        Tool::Signature | Tool::Image => ClickOutcome::ImagePickRequested {
            page: ctx.page,
            x,
            y,
        },

        Tool::Highlight => {
            ClickOutcome::AnnotationCreated(Annotation::highlight(ctx.page, x, y, ctx.author))
        }

        Tool::Drawing => {
            ClickOutcome::AnnotationCreated(Annotation::drawing(ctx.page, x, y, ctx.author))
        }

        Tool::Note => ClickOutcome::NoteRequested {
            page: ctx.page,
            x,
            y,
        },

        Tool::Select | Tool::Pan | Tool::Text => ClickOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::elements::{AnnotationKind, HIGHLIGHT_WIDTH};

    fn ctx<'a>(tool: Tool, zoom: f32, comments: &'a [&'a Comment]) -> ClickContext<'a> {
        ClickContext {
            page: 1,
            zoom,
            tool,
            text_placement_armed: false,
            comments,
            author: "ana",
        }
    }

    #[test]
    fn marker_hit_is_inclusive_at_tolerance() {
        let comment = Comment::new(1, 100.0, 100.0, "here", "ana");
        let comments = [&comment];

        let hit = route_click(112.0, 100.0, &ctx(Tool::Select, 1.0, &comments));
        assert!(matches!(hit, ClickOutcome::CommentSelected { id } if id == comment.id));

        let miss = route_click(113.0, 100.0, &ctx(Tool::Select, 1.0, &comments));
        assert!(matches!(miss, ClickOutcome::Ignored));
    }

    #[test]
    fn marker_positions_scale_with_zoom() {
        let comment = Comment::new(1, 100.0, 100.0, "here", "ana");
        let comments = [&comment];

        // At 2x the marker sits at canvas (200, 200)
        let hit = route_click(200.0, 210.0, &ctx(Tool::Select, 2.0, &comments));
        assert!(matches!(hit, ClickOutcome::CommentSelected { .. }));

        // The unscaled position is nowhere near it
        let miss = route_click(100.0, 100.0, &ctx(Tool::Select, 2.0, &comments));
        assert!(matches!(miss, ClickOutcome::Ignored));
    }

    #[test]
    fn marker_beats_active_tool() {
        let comment = Comment::new(1, 50.0, 50.0, "here", "ana");
        let comments = [&comment];

        let outcome = route_click(50.0, 50.0, &ctx(Tool::Highlight, 1.0, &comments));
        assert!(matches!(outcome, ClickOutcome::CommentSelected { .. }));
    }

    #[test]
    fn first_overlapping_marker_wins() {
        let first = Comment::new(1, 50.0, 50.0, "a", "ana");
        let second = Comment::new(1, 55.0, 50.0, "b", "ana");
        let comments = [&first, &second];

        let outcome = route_click(52.0, 50.0, &ctx(Tool::Select, 1.0, &comments));
        assert!(matches!(outcome, ClickOutcome::CommentSelected { id } if id == first.id));
    }

    #[test]
    fn archived_markers_absorb_nothing() {
        let mut comment = Comment::new(1, 50.0, 50.0, "old", "ana");
        comment.status = CommentStatus::Archived;
        let comments = [&comment];

        let outcome = route_click(50.0, 50.0, &ctx(Tool::Select, 1.0, &comments));
        assert!(matches!(outcome, ClickOutcome::Ignored));
    }

    #[test]
    fn armed_text_tool_places_in_page_coordinates() {
        let mut context = ctx(Tool::Text, 2.0, &[]);
        context.text_placement_armed = true;

        match route_click(300.0, 400.0, &context) {
            ClickOutcome::TextPlaced(element) => {
                assert_eq!(element.x, 150.0);
                assert_eq!(element.y, 200.0);
                assert_eq!(element.page, 1);
            }
            other => panic!("expected text placement, got {other:?}"),
        }
    }

    #[test]
    fn unarmed_text_tool_is_noop() {
        let outcome = route_click(300.0, 400.0, &ctx(Tool::Text, 1.0, &[]));
        assert!(matches!(outcome, ClickOutcome::Ignored));
    }

    #[test]
    fn signature_and_image_request_a_pick() {
        for tool in [Tool::Signature, Tool::Image] {
            match route_click(100.0, 60.0, &ctx(tool, 1.0, &[])) {
                ClickOutcome::ImagePickRequested { page, x, y } => {
                    assert_eq!((page, x, y), (1, 100.0, 60.0));
                }
                other => panic!("expected pick request, got {other:?}"),
            }
        }
    }

    #[test]
    fn highlight_tool_centers_a_fixed_box() {
        match route_click(100.0, 50.0, &ctx(Tool::Highlight, 1.0, &[])) {
            ClickOutcome::AnnotationCreated(annotation) => {
                assert_eq!(annotation.kind, AnnotationKind::Highlight);
                assert_eq!(annotation.x, 100.0 - HIGHLIGHT_WIDTH / 2.0);
                assert_eq!(annotation.author, "ana");
            }
            other => panic!("expected annotation, got {other:?}"),
        }
    }

    #[test]
    fn note_tool_defers_to_the_host() {
        match route_click(80.0, 90.0, &ctx(Tool::Note, 1.0, &[])) {
            ClickOutcome::NoteRequested { page, x, y } => {
                assert_eq!((page, x, y), (1, 80.0, 90.0));
            }
            other => panic!("expected note request, got {other:?}"),
        }
    }

    #[test]
    fn select_and_pan_ignore_clicks() {
        assert!(matches!(
            route_click(10.0, 10.0, &ctx(Tool::Select, 1.0, &[])),
            ClickOutcome::Ignored
        ));
        assert!(matches!(
            route_click(10.0, 10.0, &ctx(Tool::Pan, 1.0, &[])),
            ClickOutcome::Ignored
        ));
    }
}
