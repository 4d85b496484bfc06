use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::Deserialize;

/// One directory entry from the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent {
    Results {
        generation: u64,
        candidates: Vec<Candidate>,
    },
}

/// Fetches candidate lists off the UI thread. Each `send_lookup` spawns a
/// worker that performs the HTTP call and posts the outcome back over an
/// mpsc channel; the run loop drains it between frames. Failures of any
/// kind collapse to an empty candidate list.
pub struct LookupAdapter {
    endpoint: String,
    event_tx: Sender<LookupEvent>,
    event_rx: Receiver<LookupEvent>,
}

impl LookupAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            endpoint: endpoint.into(),
            event_tx,
            event_rx,
        }
    }

    pub fn send_lookup(&self, generation: u64, query: String) {
        let endpoint = self.endpoint.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let candidates = fetch_candidates(&endpoint, &query);
            let _ = tx.send(LookupEvent::Results {
                generation,
                candidates,
            });
        });
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<LookupEvent> {
        let mut events = Vec::new();
        if max_events == 0 {
            return events;
        }
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }
}

/// An empty query fetches the unfiltered list; otherwise the query is sent
/// as the `name` parameter.
fn fetch_candidates(endpoint: &str, query: &str) -> Vec<Candidate> {
    let request = if query.is_empty() {
        ureq::get(endpoint)
    } else {
        ureq::get(endpoint).query("name", query)
    };
    match request.call() {
        Ok(response) => match response.into_body().read_to_string() {
            Ok(body) => parse_candidates(&body),
            Err(_) => Vec::new(),
        },
        Err(_) => Vec::new(),
    }
}

pub fn parse_candidates(body: &str) -> Vec<Candidate> {
    serde_json::from_str(body).unwrap_or_default()
}
