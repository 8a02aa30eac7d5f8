//! Viewer state transitions
//!
//! All page and zoom mutations go through [`DocumentState::apply`], which
//! returns the side effects the caller must execute. Keeping the transition
//! pure makes navigation and zoom behavior testable without threads or a
//! rendering backend.

use super::document::DocumentState;

/// Commands that modify viewer state
#[derive(Clone, Debug)]
pub enum Command {
    /// Go to a specific page (1-indexed, clamped to the document)
    GoToPage(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ZoomIn,
    ZoomOut,
    /// Set an absolute zoom factor
    SetZoom(f32),
    /// A render finished; record the rasterized page dimensions
    PageRendered {
        page: usize,
        width: f32,
        height: f32,
    },
    /// Reload the document from its source
    Reload,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Invalidate all cached bitmaps
    InvalidateCache,
    /// Render the current page
    RenderCurrentPage,
    /// Reload document bytes and metadata
    ReloadDocument,
}

impl DocumentState {
    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::GoToPage(page) => self.go_to(page),
            Command::NextPage => self.go_to(self.current_page.saturating_add(1)),
            Command::PrevPage => self.go_to(self.current_page.saturating_sub(1)),
            Command::FirstPage => self.go_to(1),
            Command::LastPage => self.go_to(self.page_count),

            Command::ZoomIn => {
                if self.zoom.step_in() {
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::ZoomOut => {
                if self.zoom.step_out() {
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetZoom(factor) => {
                if self.zoom.set(factor) {
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::PageRendered {
                page,
                width,
                height,
            } => {
                self.record_rendered_size(page, width, height);
                vec![]
            }

            Command::Reload => {
                vec![Effect::InvalidateCache, Effect::ReloadDocument]
            }
        }
    }

    fn go_to(&mut self, page: usize) -> Vec<Effect> {
        if self.page_count == 0 {
            return vec![];
        }

        let clamped = page.clamp(1, self.page_count);
        if self.current_page != clamped {
            self.current_page = clamped;
            vec![Effect::RenderCurrentPage]
        } else {
            vec![]
        }
    }
}
