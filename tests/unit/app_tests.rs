use std::time::Duration;

use super::*;
use crate::lookup::Candidate;

const WIDTH: u16 = 40;

fn test_app() -> App {
    let config = Config {
        debounce_ms: 50,
        ..Config::default()
    };
    App::new(&config)
}

fn type_str(app: &mut App, text: &str, now: Instant) {
    for c in text.chars() {
        app.input_char(c, WIDTH, now);
    }
}

fn deliver_results(app: &mut App, names: &[&str], now: Instant) {
    let request = app
        .suggestions_mut()
        .take_due_lookup(now + Duration::from_secs(60))
        .expect("a lookup should be due");
    let candidates = names
        .iter()
        .enumerate()
        .map(|(idx, name)| Candidate {
            id: idx.to_string(),
            name: (*name).to_string(),
        })
        .collect();
    app.on_lookup_event(LookupEvent::Results {
        generation: request.generation,
        candidates,
    });
}

#[test]
fn starts_focused_on_the_composer() {
    let app = test_app();
    assert!(app.running);
    assert_eq!(app.active_pane, Pane::Composer);
    assert!(!app.suggestions().visible());
}

#[test]
fn typing_a_trigger_opens_the_popup_with_an_anchor() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "hi @", now);

    assert!(app.suggestions().visible());
    assert_eq!(app.suggestions().query(), Some(""));
    assert_eq!(app.suggestions().anchor(), PopupAnchor { row: 0, col: 3 });
}

#[test]
fn query_follows_further_typing() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@al", now);
    assert_eq!(app.suggestions().query(), Some("al"));
}

#[test]
fn accepting_a_candidate_inserts_the_name() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "hey @al", now);
    deliver_results(&mut app, &["Alice Smith", "Alan"], now);

    app.submit(WIDTH, now);

    assert_eq!(app.editor().buffer(), "hey Alice Smith");
    assert_eq!(app.editor().spans(), &[MentionSpan { start: 4, end: 14 }]);
    assert!(!app.suggestions().visible());
    assert!(app.messages().is_empty());
}

#[test]
fn arrow_keys_drive_the_popup_selection() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@", now);
    deliver_results(&mut app, &["Alice", "Bob"], now);

    app.move_down(0);
    app.submit(WIDTH, now);
    assert_eq!(app.editor().buffer(), "Bob");
}

#[test]
fn clicking_a_popup_row_accepts_that_candidate() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@", now);
    deliver_results(&mut app, &["Alice", "Bob", "Carol"], now);

    app.accept_popup_row(2, WIDTH, now);
    assert_eq!(app.editor().buffer(), "Carol");
    assert!(!app.suggestions().visible());
}

#[test]
fn submit_with_no_popup_posts_the_message() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "hi @al", now);
    deliver_results(&mut app, &["Alice"], now);
    app.submit(WIDTH, now);
    type_str(&mut app, " bye", now);

    app.submit(WIDTH, now);

    assert_eq!(app.messages().len(), 1);
    assert_eq!(app.messages()[0].text, "hi Alice bye");
    assert_eq!(
        app.messages()[0].spans,
        vec![MentionSpan { start: 3, end: 7 }]
    );
    assert!(app.editor().is_empty());
}

#[test]
fn submitting_an_empty_composer_is_a_noop() {
    let mut app = test_app();
    app.submit(WIDTH, Instant::now());
    assert!(app.messages().is_empty());
}

#[test]
fn escape_dismisses_the_popup_and_keeps_the_text() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@al", now);
    assert!(app.suggestions().visible());

    app.cancel(now);

    assert!(!app.suggestions().visible());
    assert_eq!(app.editor().buffer(), "@al");
    assert_eq!(app.editor().trigger(), None);
}

#[test]
fn blurring_the_composer_dismisses_the_popup() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@al", now);

    app.next_pane(now);

    assert_eq!(app.active_pane, Pane::Log);
    assert!(!app.suggestions().visible());
    assert_eq!(app.editor().trigger(), None);
}

#[test]
fn keystrokes_are_ignored_while_the_log_pane_is_focused() {
    let mut app = test_app();
    let now = Instant::now();
    app.next_pane(now);
    app.input_char('x', WIDTH, now);
    assert!(app.editor().is_empty());
}

#[test]
fn up_and_down_scroll_the_log_when_no_popup_is_open() {
    let mut app = test_app();
    let now = Instant::now();
    app.next_pane(now);
    app.move_down(5);
    app.move_down(5);
    assert_eq!(app.log_scroll(), 2);
    app.move_up();
    assert_eq!(app.log_scroll(), 1);
    app.move_down(1);
    assert_eq!(app.log_scroll(), 1);
}

#[test]
fn moving_the_caret_out_of_the_query_closes_the_popup() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "a @b", now);
    assert!(app.suggestions().visible());

    app.cursor_home(WIDTH, now);
    assert!(!app.suggestions().visible());
}

#[test]
fn anchor_lands_on_the_wrapped_trigger_cell() {
    let mut app = test_app();
    let now = Instant::now();
    // width 8: "hello " stays on line 0, "there " wraps, then "@" follows
    for c in "hello there ".chars() {
        app.input_char(c, 8, now);
    }
    app.input_char('@', 8, now);
    assert_eq!(app.suggestions().anchor(), PopupAnchor { row: 1, col: 6 });
}

#[test]
fn stale_results_do_not_reach_the_popup() {
    let mut app = test_app();
    let now = Instant::now();
    type_str(&mut app, "@a", now);
    let stale = app
        .suggestions_mut()
        .take_due_lookup(now + Duration::from_secs(60))
        .expect("lookup due");

    type_str(&mut app, "b", now + Duration::from_secs(120));
    app.on_lookup_event(LookupEvent::Results {
        generation: stale.generation,
        candidates: vec![Candidate {
            id: "1".to_string(),
            name: "Aaron".to_string(),
        }],
    });

    assert!(app.suggestions().candidates().is_empty());
}

#[test]
fn log_messages_re_render_their_mention_segments() {
    let message = LogMessage {
        text: "hi Alice bye".to_string(),
        spans: vec![MentionSpan { start: 3, end: 7 }],
    };
    let segments = message.segments();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[1].text, "Alice");
    assert!(segments[1].mention);
}
