use std::time::{Duration, Instant};

use crate::lookup::Candidate;

/// Cell the popup should be anchored to, relative to the composer text
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupAnchor {
    pub row: u16,
    pub col: u16,
}

/// A lookup the caller should dispatch to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Loading,
    Empty,
    List,
}

/// Suggestion popup state: the current query, the debounce timer, and the
/// candidates from the most recent lookup that was still current when it
/// returned.
///
/// Every dispatched lookup carries a generation number. Results arriving
/// for any generation other than the one in flight are dropped, so a slow
/// response for "al" can never overwrite the list for "alice".
#[derive(Debug)]
pub struct SuggestionBox {
    debounce: Duration,
    max_results: usize,
    query: Option<String>,
    anchor: PopupAnchor,
    pending_since: Option<Instant>,
    next_generation: u64,
    in_flight: Option<u64>,
    loading: bool,
    candidates: Vec<Candidate>,
    selected: usize,
}

impl SuggestionBox {
    pub fn new(debounce: Duration, max_results: usize) -> Self {
        Self {
            debounce,
            max_results,
            query: None,
            anchor: PopupAnchor::default(),
            pending_since: None,
            next_generation: 0,
            in_flight: None,
            loading: false,
            candidates: Vec::new(),
            selected: 0,
        }
    }

    pub fn visible(&self) -> bool {
        self.query.is_some()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn anchor(&self) -> PopupAnchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: PopupAnchor) {
        self.anchor = anchor;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.candidates
            .get(self.selected)
            .map(|candidate| candidate.name.as_str())
    }

    pub fn state(&self) -> PopupState {
        if self.loading || self.pending_since.is_some() {
            PopupState::Loading
        } else if self.candidates.is_empty() {
            PopupState::Empty
        } else {
            PopupState::List
        }
    }

    /// Updates the query. Any change restarts the debounce timer; setting
    /// the same query again leaves the timer alone. `None` hides the popup
    /// and abandons whatever lookup was in flight.
    pub fn set_query(&mut self, query: Option<String>, now: Instant) {
        if query == self.query {
            return;
        }
        match query {
            Some(q) => {
                self.query = Some(q);
                self.pending_since = Some(now);
                self.in_flight = None;
                self.loading = true;
                self.candidates.clear();
                self.selected = 0;
            }
            None => {
                self.query = None;
                self.pending_since = None;
                self.in_flight = None;
                self.loading = false;
                self.candidates.clear();
                self.selected = 0;
            }
        }
    }

    /// Returns the lookup to dispatch once the debounce window has elapsed
    /// with no further query changes, at most once per window.
    pub fn take_due_lookup(&mut self, now: Instant) -> Option<LookupRequest> {
        let since = self.pending_since?;
        if now.duration_since(since) < self.debounce {
            return None;
        }
        self.pending_since = None;
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight = Some(generation);
        Some(LookupRequest {
            generation,
            query: self.query.clone().unwrap_or_default(),
        })
    }

    /// Installs results from a completed lookup. Results for a generation
    /// that is no longer in flight are stale and ignored.
    pub fn on_results(&mut self, generation: u64, candidates: Vec<Candidate>) {
        if self.in_flight != Some(generation) {
            return;
        }
        self.in_flight = None;
        self.loading = false;
        self.candidates = candidates;
        self.candidates.truncate(self.max_results);
        self.selected = 0;
    }

    pub fn move_up(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = (self.selected + 1).min(self.candidates.len() - 1);
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.candidates.len() {
            self.selected = index;
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/suggest_tests.rs"]
mod tests;
