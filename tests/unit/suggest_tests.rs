use super::*;

fn named(names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| Candidate {
            id: idx.to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

#[test]
fn hidden_until_a_query_is_set() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(100), 8);
    assert!(!sugg.visible());
    sugg.set_query(Some(String::new()), Instant::now());
    assert!(sugg.visible());
    sugg.set_query(None, Instant::now());
    assert!(!sugg.visible());
}

#[test]
fn debounce_dispatches_once_for_a_burst_of_keystrokes() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(100), 8);
    let t0 = Instant::now();

    sugg.set_query(Some("a".to_string()), t0);
    sugg.set_query(Some("al".to_string()), t0 + Duration::from_millis(30));
    sugg.set_query(Some("ali".to_string()), t0 + Duration::from_millis(60));

    // window restarted at each keystroke, nothing due yet
    assert_eq!(
        sugg.take_due_lookup(t0 + Duration::from_millis(120)),
        None
    );

    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(160))
        .expect("lookup should be due");
    assert_eq!(request.query, "ali");

    // one dispatch per window
    assert_eq!(sugg.take_due_lookup(t0 + Duration::from_millis(300)), None);
}

#[test]
fn repeating_the_same_query_does_not_restart_the_timer() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(100), 8);
    let t0 = Instant::now();

    sugg.set_query(Some("bob".to_string()), t0);
    sugg.set_query(Some("bob".to_string()), t0 + Duration::from_millis(90));

    assert!(
        sugg.take_due_lookup(t0 + Duration::from_millis(110))
            .is_some()
    );
}

#[test]
fn stale_generation_results_are_dropped() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    let t0 = Instant::now();

    sugg.set_query(Some("a".to_string()), t0);
    let first = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("first lookup");

    sugg.set_query(Some("ab".to_string()), t0 + Duration::from_millis(30));
    let second = sugg
        .take_due_lookup(t0 + Duration::from_millis(50))
        .expect("second lookup");
    assert!(second.generation > first.generation);

    // the slow first response arrives after the second was dispatched
    sugg.on_results(first.generation, named(&["Aaron"]));
    assert!(sugg.candidates().is_empty());
    assert_eq!(sugg.state(), PopupState::Loading);

    sugg.on_results(second.generation, named(&["Abby", "Abel"]));
    assert_eq!(sugg.candidates().len(), 2);
    assert_eq!(sugg.state(), PopupState::List);
}

#[test]
fn results_are_capped_at_max_results() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 2);
    let t0 = Instant::now();
    sugg.set_query(Some(String::new()), t0);
    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("lookup");
    sugg.on_results(request.generation, named(&["A", "B", "C", "D"]));
    assert_eq!(sugg.candidates().len(), 2);
}

#[test]
fn empty_results_render_as_empty_state() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    let t0 = Instant::now();
    sugg.set_query(Some("zzz".to_string()), t0);
    assert_eq!(sugg.state(), PopupState::Loading);
    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("lookup");
    sugg.on_results(request.generation, Vec::new());
    assert_eq!(sugg.state(), PopupState::Empty);
    assert_eq!(sugg.selected_name(), None);
}

#[test]
fn clearing_the_query_abandons_the_in_flight_lookup() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    let t0 = Instant::now();
    sugg.set_query(Some("a".to_string()), t0);
    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("lookup");

    sugg.set_query(None, t0 + Duration::from_millis(30));
    sugg.on_results(request.generation, named(&["Aaron"]));

    assert!(!sugg.visible());
    assert!(sugg.candidates().is_empty());
}

#[test]
fn selection_moves_within_bounds() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    let t0 = Instant::now();
    sugg.set_query(Some(String::new()), t0);
    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("lookup");
    sugg.on_results(request.generation, named(&["Alice", "Bob", "Carol"]));

    assert_eq!(sugg.selected_name(), Some("Alice"));
    sugg.move_up();
    assert_eq!(sugg.selected_index(), 0);
    sugg.move_down();
    sugg.move_down();
    sugg.move_down();
    assert_eq!(sugg.selected_name(), Some("Carol"));
    sugg.select(1);
    assert_eq!(sugg.selected_name(), Some("Bob"));
    sugg.select(99);
    assert_eq!(sugg.selected_index(), 1);
}

#[test]
fn new_query_resets_selection_and_candidates() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    let t0 = Instant::now();
    sugg.set_query(Some(String::new()), t0);
    let request = sugg
        .take_due_lookup(t0 + Duration::from_millis(20))
        .expect("lookup");
    sugg.on_results(request.generation, named(&["Alice", "Bob"]));
    sugg.move_down();

    sugg.set_query(Some("b".to_string()), t0 + Duration::from_millis(40));
    assert!(sugg.candidates().is_empty());
    assert_eq!(sugg.selected_index(), 0);
    assert_eq!(sugg.state(), PopupState::Loading);
}

#[test]
fn anchor_round_trips() {
    let mut sugg = SuggestionBox::new(Duration::from_millis(10), 8);
    sugg.set_anchor(PopupAnchor { row: 2, col: 7 });
    assert_eq!(sugg.anchor(), PopupAnchor { row: 2, col: 7 });
}
