pub mod annotations;
pub mod app;
pub mod comments;
pub mod event_source;
pub mod export;
pub mod inputs;
pub mod notification;
pub mod panic_handler;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::{App, AppOptions, run_app_with_event_source};
