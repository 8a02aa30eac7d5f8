//! App-level interaction tests: keyboard navigation, tool clicks, the input
//! overlay, and the error screen, all driven through simulated events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tempfile::TempDir;

use glossa::event_source::SimulatedEventSource;
use glossa::test_utils::{
    FakeEngine, TestScenarioBuilder, capture_terminal_state, create_test_terminal,
};
use glossa::viewer::{DocumentSource, RenderEngine, Tool, ViewerStatus};
use glossa::{App, AppOptions, run_app_with_event_source};

fn bytes_source(name: &str, data: &[u8]) -> DocumentSource {
    DocumentSource::Bytes {
        name: name.to_string(),
        data: Arc::from(data),
    }
}

fn options(dir: &TempDir) -> AppOptions {
    AppOptions {
        author: "tester".to_string(),
        comments_dir: Some(dir.path().to_path_buf()),
        export_dir: dir.path().to_path_buf(),
        start_page: None,
        start_zoom: None,
    }
}

/// Build an app over a fake document and pump it until the first render
fn ready_app(pages: usize) -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let engine: Arc<dyn RenderEngine> = Arc::new(FakeEngine::with_pages(pages));
    let mut app = App::new(engine, bytes_source("doc.pdf", b"%PDF-fake"), options(&dir)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        app.tick();
        if matches!(app.viewer().status(), ViewerStatus::Ready)
            && app.viewer().current_bitmap().is_some()
        {
            break;
        }
        assert!(Instant::now() < deadline, "app never became ready");
        std::thread::sleep(Duration::from_millis(5));
    }
    (dir, app)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_event(SimulatedEventSource::key(code));
}

fn press_char(app: &mut App, c: char) {
    app.handle_event(SimulatedEventSource::char_key(c));
}

#[test]
fn keyboard_navigation_and_boundaries() {
    let (_dir, mut app) = ready_app(4);

    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.viewer().document().current_page, 3);

    press(&mut app, KeyCode::Left);
    assert_eq!(app.viewer().document().current_page, 2);

    press(&mut app, KeyCode::End);
    assert_eq!(app.viewer().document().current_page, 4);
    press(&mut app, KeyCode::PageDown);
    assert_eq!(app.viewer().document().current_page, 4);

    press(&mut app, KeyCode::Home);
    assert_eq!(app.viewer().document().current_page, 1);
    press(&mut app, KeyCode::Left);
    assert_eq!(app.viewer().document().current_page, 1);
}

#[test]
fn note_tool_click_opens_overlay_and_creates_comment() {
    let (_dir, mut app) = ready_app(3);
    let mut terminal = create_test_terminal(80, 24);

    // One draw pass establishes the canvas area for mouse mapping
    terminal.draw(|f| app.render(f)).unwrap();
    assert!(app.canvas_area().width > 0);

    press_char(&mut app, 'n');
    assert_eq!(app.tool(), Tool::Note);

    app.handle_event(SimulatedEventSource::mouse_down(10, 5));
    app.handle_event(SimulatedEventSource::mouse_up(10, 5));
    assert!(app.input_active());

    // Shortcuts are disabled while the overlay has focus
    press(&mut app, KeyCode::Right);
    assert_eq!(app.viewer().document().current_page, 1);

    for c in "looks wrong".chars() {
        press_char(&mut app, c);
    }
    press(&mut app, KeyCode::Enter);

    assert!(!app.input_active());
    assert_eq!(app.comments().len(), 1);
    assert!(app.comment_panel_open());

    let comment = &app.comments().all()[0];
    assert_eq!(comment.content, "looks wrong");
    assert_eq!(comment.author, "tester");
    assert_eq!(comment.page, 1);
    assert_eq!(app.selected_comment(), Some(comment.id.as_str()));
}

#[test]
fn escape_cancels_the_overlay_without_a_comment() {
    let (_dir, mut app) = ready_app(2);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    press_char(&mut app, 'n');
    app.handle_event(SimulatedEventSource::mouse_down(12, 6));
    app.handle_event(SimulatedEventSource::mouse_up(12, 6));
    assert!(app.input_active());

    press_char(&mut app, 'x');
    press(&mut app, KeyCode::Esc);

    assert!(!app.input_active());
    assert!(app.comments().is_empty());
}

#[test]
fn highlight_tool_click_adds_annotation() {
    let (_dir, mut app) = ready_app(2);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    press_char(&mut app, 'h');
    app.handle_event(SimulatedEventSource::mouse_down(20, 8));
    app.handle_event(SimulatedEventSource::mouse_up(20, 8));

    let doc = app.viewer().document();
    assert_eq!(doc.annotations.len(), 1);
    assert_eq!(doc.annotations[0].page, 1);
    assert_eq!(doc.annotations[0].author, "tester");
}

#[test]
fn annotations_persist_across_sessions() {
    let (dir, mut app) = ready_app(2);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    press_char(&mut app, 'h');
    app.handle_event(SimulatedEventSource::mouse_down(20, 8));
    app.handle_event(SimulatedEventSource::mouse_up(20, 8));
    assert_eq!(app.viewer().document().annotations.len(), 1);
    drop(app);

    // A second session over the same document sees the saved annotation
    let engine: Arc<dyn RenderEngine> = Arc::new(FakeEngine::with_pages(2));
    let reopened = App::new(engine, bytes_source("doc.pdf", b"%PDF-fake"), options(&dir)).unwrap();
    assert_eq!(reopened.viewer().document().annotations.len(), 1);
    assert_eq!(reopened.viewer().document().annotations[0].author, "tester");
}

#[test]
fn pan_drag_turns_the_page() {
    let (_dir, mut app) = ready_app(5);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    press_char(&mut app, 'p');
    assert_eq!(app.tool(), Tool::Pan);

    // Leftward drag of 20 cells = 160 canvas px, past the mouse threshold
    app.handle_event(SimulatedEventSource::mouse_down(40, 6));
    app.handle_event(SimulatedEventSource::mouse_drag(30, 6));
    app.handle_event(SimulatedEventSource::mouse_drag(20, 6));
    app.handle_event(SimulatedEventSource::mouse_up(20, 6));

    assert_eq!(app.viewer().document().current_page, 2);

    // Rightward drag goes back
    app.handle_event(SimulatedEventSource::mouse_down(20, 6));
    app.handle_event(SimulatedEventSource::mouse_drag(40, 6));
    app.handle_event(SimulatedEventSource::mouse_up(40, 6));
    assert_eq!(app.viewer().document().current_page, 1);
}

#[test]
fn select_tool_drag_does_not_turn_pages() {
    let (_dir, mut app) = ready_app(5);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    // Default tool is select; dragging must not navigate
    app.handle_event(SimulatedEventSource::mouse_down(40, 6));
    app.handle_event(SimulatedEventSource::mouse_drag(10, 6));
    app.handle_event(SimulatedEventSource::mouse_up(10, 6));

    assert_eq!(app.viewer().document().current_page, 1);
}

#[test]
fn failed_load_shows_retry_screen() {
    let dir = TempDir::new().unwrap();
    let engine: Arc<dyn RenderEngine> = Arc::new(FakeEngine::with_pages(3));
    let mut app = App::new(engine, bytes_source("empty.pdf", b""), options(&dir)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !matches!(app.viewer().status(), ViewerStatus::Failed(_)) {
        app.tick();
        assert!(Instant::now() < deadline, "load never failed");
        std::thread::sleep(Duration::from_millis(5));
    }

    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("retry"), "error screen missing retry hint");

    // 'r' re-invokes the loader
    press_char(&mut app, 'r');
    assert!(
        app.viewer().is_loading() || matches!(app.viewer().status(), ViewerStatus::Failed(_))
    );
}

#[test]
fn scripted_session_runs_to_quit() {
    let (_dir, mut app) = ready_app(6);
    let mut terminal = create_test_terminal(80, 24);

    let mut events = TestScenarioBuilder::new()
        .next_page(3)
        .prev_page(1)
        .press_key(KeyCode::Char('+'))
        .quit()
        .build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert!(app.should_quit());
    assert_eq!(app.viewer().document().current_page, 3);
    assert_eq!(app.viewer().document().zoom.factor(), 1.25);
}

#[test]
fn comment_lifecycle_through_keys() {
    let (_dir, mut app) = ready_app(2);
    let mut terminal = create_test_terminal(80, 24);
    terminal.draw(|f| app.render(f)).unwrap();

    // Create a note
    press_char(&mut app, 'n');
    app.handle_event(SimulatedEventSource::mouse_down(15, 6));
    app.handle_event(SimulatedEventSource::mouse_up(15, 6));
    for c in "fix me".chars() {
        press_char(&mut app, c);
    }
    press(&mut app, KeyCode::Enter);
    let id = app.selected_comment().unwrap().to_string();

    // Reply
    press_char(&mut app, 'R');
    for c in "done".chars() {
        press_char(&mut app, c);
    }
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.comments().get(&id).unwrap().replies.len(), 1);

    // Like, resolve, archive
    press_char(&mut app, 'L');
    assert!(app.comments().get(&id).unwrap().likes.contains("tester"));

    press_char(&mut app, 'm');
    assert_eq!(
        app.comments().get(&id).unwrap().status,
        glossa::comments::CommentStatus::Resolved
    );

    press_char(&mut app, 'a');
    assert_eq!(
        app.comments().get(&id).unwrap().status,
        glossa::comments::CommentStatus::Archived
    );
    assert!(app.selected_comment().is_none());
}
