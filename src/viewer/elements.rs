//! Annotations and placed page elements
//!
//! Everything here lives in page coordinates (PDF points at zoom 1.0).
//! Rendering multiplies by the current zoom factor; click routing divides
//! canvas coordinates back before constructing these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default size of a freshly placed highlight box
pub const HIGHLIGHT_WIDTH: f32 = 120.0;
pub const HIGHLIGHT_HEIGHT: f32 = 20.0;

/// Default size of a freshly placed drawing box
pub const DRAWING_WIDTH: f32 = 100.0;
pub const DRAWING_HEIGHT: f32 = 60.0;

/// Placed images are fitted into this box, preserving aspect ratio
pub const IMAGE_BOX_WIDTH: f32 = 200.0;
pub const IMAGE_BOX_HEIGHT: f32 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Highlight,
    Note,
    Drawing,
}

/// RGB color carried by annotations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const HIGHLIGHT_YELLOW: Self = Self {
        r: 0xFF,
        g: 0xEB,
        b: 0x3B,
    };
    pub const DRAWING_BLUE: Self = Self {
        r: 0x42,
        g: 0xA5,
        b: 0xF5,
    };
    pub const NOTE_ORANGE: Self = Self {
        r: 0xFF,
        g: 0xA7,
        b: 0x26,
    };
}

/// A rectangular annotation anchored to one page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub kind: AnnotationKind,
    /// Page number (1-indexed)
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Tint,
    #[serde(default)]
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(
        kind: AnnotationKind,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Tint,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            page,
            x: sanitize_coord(x),
            y: sanitize_coord(y),
            width,
            height,
            color,
            content: String::new(),
            author: author.into(),
            created_at: Utc::now(),
        }
    }

    /// Fixed-size highlight box centered on the click point
    #[must_use]
    pub fn highlight(page: usize, x: f32, y: f32, author: &str) -> Self {
        Self::new(
            AnnotationKind::Highlight,
            page,
            x - HIGHLIGHT_WIDTH / 2.0,
            y - HIGHLIGHT_HEIGHT / 2.0,
            HIGHLIGHT_WIDTH,
            HIGHLIGHT_HEIGHT,
            Tint::HIGHLIGHT_YELLOW,
            author,
        )
    }

    /// Fixed-size drawing box anchored at the click point
    #[must_use]
    pub fn drawing(page: usize, x: f32, y: f32, author: &str) -> Self {
        Self::new(
            AnnotationKind::Drawing,
            page,
            x,
            y,
            DRAWING_WIDTH,
            DRAWING_HEIGHT,
            Tint::DRAWING_BLUE,
            author,
        )
    }

    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Editable text placed directly on a page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: String,
    /// Page number (1-indexed)
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TextElement {
    #[must_use]
    pub fn new(page: usize, x: f32, y: f32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            page,
            x: sanitize_coord(x),
            y: sanitize_coord(y),
            content: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// An image placed on a page, fitted to the placement box
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: String,
    /// Page number (1-indexed)
    pub page: usize,
    pub x: f32,
    pub y: f32,
    /// Display size after fitting, in page coordinates
    pub width: f32,
    pub height: f32,
    /// Original encoded image bytes, kept in memory for the session
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Errors from image placement
#[derive(Debug, thiserror::Error)]
pub enum PlaceImageError {
    #[error("not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

impl ImageElement {
    /// Decode `bytes`, fit the natural size into the placement box, and
    /// anchor the result at the click point.
    pub fn place(
        page: usize,
        x: f32,
        y: f32,
        bytes: Vec<u8>,
    ) -> Result<Self, PlaceImageError> {
        let decoded = image::load_from_memory(&bytes)?;
        let (width, height) = fitted_size(decoded.width(), decoded.height());

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            page,
            x: sanitize_coord(x),
            y: sanitize_coord(y),
            width,
            height,
            bytes,
            created_at: Utc::now(),
        })
    }
}

/// Fit natural pixel dimensions into the placement box.
///
/// Preserves aspect ratio and never upscales: an image smaller than the box
/// keeps its natural size.
#[must_use]
pub fn fitted_size(natural_width: u32, natural_height: u32) -> (f32, f32) {
    if natural_width == 0 || natural_height == 0 {
        return (0.0, 0.0);
    }

    let w = natural_width as f32;
    let h = natural_height as f32;
    let scale = (IMAGE_BOX_WIDTH / w)
        .min(IMAGE_BOX_HEIGHT / h)
        .min(1.0);

    (w * scale, h * scale)
}

/// Anything placeable on a page besides annotations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageElement {
    Text(TextElement),
    Image(ImageElement),
}

impl PageElement {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            PageElement::Text(t) => &t.id,
            PageElement::Image(i) => &i.id,
        }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        match self {
            PageElement::Text(t) => t.page,
            PageElement::Image(i) => i.page,
        }
    }
}

fn sanitize_coord(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_centers_box_on_click() {
        let a = Annotation::highlight(2, 100.0, 50.0, "dev");
        assert_eq!(a.kind, AnnotationKind::Highlight);
        assert_eq!(a.page, 2);
        assert_eq!(a.x, 100.0 - HIGHLIGHT_WIDTH / 2.0);
        assert_eq!(a.y, 50.0 - HIGHLIGHT_HEIGHT / 2.0);
        assert!(a.contains(100.0, 50.0));
    }

    #[test]
    fn annotation_ids_are_unique() {
        let a = Annotation::drawing(1, 0.0, 0.0, "dev");
        let b = Annotation::drawing(1, 0.0, 0.0, "dev");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn coordinates_sanitized_at_construction() {
        let t = TextElement::new(1, f32::NAN, -5.0);
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 0.0);
    }

    #[test]
    fn wide_image_fits_to_box_width() {
        // 400x100 scaled by 200/400 -> 200x50
        let (w, h) = fitted_size(400, 100);
        assert_eq!(w, 200.0);
        assert_eq!(h, 50.0);
    }

    #[test]
    fn tall_image_fits_to_box_height() {
        // 100x300 scaled by 150/300 -> 50x150
        let (w, h) = fitted_size(100, 300);
        assert_eq!(w, 50.0);
        assert_eq!(h, 150.0);
    }

    #[test]
    fn small_image_never_upscales() {
        let (w, h) = fitted_size(80, 40);
        assert_eq!(w, 80.0);
        assert_eq!(h, 40.0);
    }

    #[test]
    fn place_rejects_garbage_bytes() {
        let err = ImageElement::place(1, 10.0, 10.0, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(err.is_err());
    }

    #[test]
    fn place_accepts_png() {
        // 4x2 opaque red PNG
        let mut png = Vec::new();
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0]));
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let element = ImageElement::place(3, 20.0, 30.0, png).unwrap();
        assert_eq!(element.page, 3);
        assert_eq!(element.width, 4.0);
        assert_eq!(element.height, 2.0);
    }

    #[test]
    fn page_element_serde_is_tagged() {
        let element = PageElement::Text(TextElement::new(1, 5.0, 6.0));
        let yaml = serde_yaml::to_string(&element).unwrap();
        assert!(yaml.contains("kind: text"));

        let parsed: PageElement = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.page(), 1);
    }
}
