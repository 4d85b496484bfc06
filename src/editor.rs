//! Composer text buffer with @mention tracking.
//!
//! The editor owns the raw text, the caret, the active trigger (an `@`
//! whose trailing text is being interpreted as a search query), and the
//! committed mention spans. Edits are applied in two phases mirroring a
//! key-down/key-up pair: the mutating call snapshots the pre-edit state,
//! and `resolve` adjusts spans, updates the trigger, and reports the
//! outcome as a `TriggerEvent` for the suggestion box.

/// Characters that terminate an in-progress mention query.
const DISALLOWED_QUERY_CHARS: &[char] = &[
    '`', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '-', '=', '[', ']', '{', '}',
    ';', '\'', ':', '"', '\\', '|', ',', '.', '<', '>', '/', '?', '~', '\n',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

/// Inclusive char range of an inserted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionSpan {
    pub start: usize,
    pub end: usize,
}

/// Offsets describing one edit: the selection before it applied and the
/// selection start after it applied. All char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditBounds {
    pub before_start: usize,
    pub before_end: usize,
    pub after_start: usize,
}

/// Message from the editor to the suggestion box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    Changed { offset: usize, query: String },
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub mention: bool,
}

#[derive(Debug, Default)]
pub struct MentionEditor {
    buffer: String,
    cursor: usize,
    prev_selection: Selection,
    prev_buffer: String,
    edit_pending: bool,
    trigger: Option<usize>,
    last_trigger: Option<usize>,
    spans: Vec<MentionSpan>,
}

/// Produces the span list after an edit in one left-to-right pass.
///
/// A span survives unchanged when it ends strictly before the edit: before
/// the post-edit selection start for deletions, before the pre-edit
/// selection start for insertions. A span lying strictly after the
/// pre-edit selection end is shifted by `delta`. Everything else overlaps
/// the edit and is dropped, including spans touching the boundary exactly.
pub fn adjust_spans(spans: &[MentionSpan], delta: isize, bounds: EditBounds) -> Vec<MentionSpan> {
    if delta == 0 {
        return spans.to_vec();
    }
    let mut adjusted = Vec::with_capacity(spans.len());
    for span in spans {
        let survives = if delta < 0 {
            span.end < bounds.after_start
        } else {
            span.end < bounds.before_start
        };
        if survives {
            adjusted.push(*span);
        } else if span.start > bounds.before_end {
            let start = span.start as isize + delta;
            let end = span.end as isize + delta;
            if start >= 0 && end >= start {
                adjusted.push(MentionSpan {
                    start: start as usize,
                    end: end as usize,
                });
            }
        }
    }
    adjusted
}

impl MentionEditor {
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn spans(&self) -> &[MentionSpan] {
        &self.spans
    }

    pub fn trigger(&self) -> Option<usize> {
        self.trigger
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn snapshot_before_edit(&mut self) {
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.prev_buffer = self.buffer.clone();
    }

    pub fn insert_char(&mut self, c: char) {
        self.snapshot_before_edit();
        let byte_idx = char_to_byte_idx(&self.buffer, self.cursor);
        self.buffer.insert(byte_idx, c);
        self.cursor = self.cursor.saturating_add(1);
        self.edit_pending = true;
    }

    pub fn backspace(&mut self) {
        self.snapshot_before_edit();
        if self.cursor == 0 {
            return;
        }
        let byte_idx = char_to_byte_idx(&self.buffer, self.cursor - 1);
        self.buffer.remove(byte_idx);
        self.cursor -= 1;
        self.edit_pending = true;
    }

    pub fn delete_forward(&mut self) {
        self.snapshot_before_edit();
        if self.cursor >= self.char_len() {
            return;
        }
        let byte_idx = char_to_byte_idx(&self.buffer, self.cursor);
        self.buffer.remove(byte_idx);
        self.edit_pending = true;
    }

    pub fn move_left(&mut self) {
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.cursor = self.char_len();
    }

    /// Pointer placement: the caret moves first, then the selection is
    /// captured, matching a click's ordering of events.
    pub fn click(&mut self, offset: usize) {
        self.cursor = offset.min(self.char_len());
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
    }

    /// Key-up phase: span adjustment, then trigger detection. Returns the
    /// message the suggestion box should see, if any.
    pub fn resolve(&mut self) -> Option<TriggerEvent> {
        if let Some(at) = self.trigger
            && self.cursor <= at
        {
            self.edit_pending = false;
            self.trigger = None;
            return Some(TriggerEvent::Cleared);
        }

        if !self.edit_pending {
            return None;
        }
        self.edit_pending = false;

        let delta = self.char_len() as isize - self.prev_buffer.chars().count() as isize;
        let bounds = EditBounds {
            before_start: self.prev_selection.start,
            before_end: self.prev_selection.end,
            after_start: self.cursor,
        };
        self.spans = adjust_spans(&self.spans, delta, bounds);

        self.detect_trigger()
    }

    fn detect_trigger(&mut self) -> Option<TriggerEvent> {
        let chars: Vec<char> = self.buffer.chars().collect();
        let caret = self.cursor;

        if caret > 0 && chars[caret - 1] == '@' && at_sign_available(&chars, caret - 1) {
            self.trigger = Some(caret - 1);
            self.last_trigger = Some(caret - 1);
            return Some(TriggerEvent::Changed {
                offset: caret - 1,
                query: String::new(),
            });
        }

        if let Some(at) = self.trigger {
            let query: String = chars[at + 1..caret].iter().collect();
            if query.contains(DISALLOWED_QUERY_CHARS) {
                self.trigger = None;
                return Some(TriggerEvent::Cleared);
            }
            return Some(TriggerEvent::Changed { offset: at, query });
        }

        // Recovery path: the trigger was lost (e.g. the query text briefly
        // contained a disallowed character that was then deleted). Rescan
        // backward from the last known trigger offset for a valid `@`.
        if let Some(last) = self.last_trigger
            && let Some((pos, query)) = nearest_at_from(&chars, last)
            && at_sign_available(&chars, pos)
            && !query.contains(DISALLOWED_QUERY_CHARS)
        {
            self.trigger = Some(pos);
            self.last_trigger = Some(pos);
            return Some(TriggerEvent::Changed { offset: pos, query });
        }

        None
    }

    /// Explicit dismissal (Esc or blur away from the popup).
    pub fn cancel_trigger(&mut self) -> Option<TriggerEvent> {
        self.trigger.take().map(|_| TriggerEvent::Cleared)
    }

    /// Splices `name` over the trigger `@` and the partial query, records
    /// the new mention span, and moves the caret after the name. Existing
    /// spans are run through the same adjustment rules so the sorted and
    /// non-overlapping invariant holds.
    pub fn accept_mention(&mut self, name: &str) -> Option<TriggerEvent> {
        let at = self.trigger?;
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };

        let splice_end = self.prev_selection.end.max(at);
        let name_chars = name.chars().count();
        let chars: Vec<char> = self.buffer.chars().collect();
        let splice_end = splice_end.min(chars.len());

        let mut next: String = chars[..at.min(chars.len())].iter().collect();
        next.push_str(name);
        next.extend(&chars[splice_end..]);

        let delta = name_chars as isize - (splice_end - at) as isize;
        let bounds = EditBounds {
            before_start: at,
            before_end: splice_end,
            after_start: at + name_chars,
        };
        self.spans = adjust_spans(&self.spans, delta, bounds);
        if name_chars > 0 {
            self.spans.push(MentionSpan {
                start: at,
                end: at + name_chars - 1,
            });
            self.spans.sort_by_key(|s| s.start);
        }

        self.buffer = next;
        self.cursor = at + name_chars;
        self.prev_buffer = self.buffer.clone();
        self.prev_selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.edit_pending = false;
        self.trigger = None;
        self.last_trigger = Some(at);

        Some(TriggerEvent::Cleared)
    }

    /// Drains the composer, returning the text and its mention spans.
    pub fn take_text(&mut self) -> (String, Vec<MentionSpan>) {
        let text = std::mem::take(&mut self.buffer);
        let spans = std::mem::take(&mut self.spans);
        self.cursor = 0;
        self.prev_buffer.clear();
        self.prev_selection = Selection::default();
        self.edit_pending = false;
        self.trigger = None;
        self.last_trigger = None;
        (text, spans)
    }

    /// Partitions the buffer into alternating plain and mention segments.
    /// Zero spans yields a single plain segment covering the whole buffer.
    pub fn segments(&self) -> Vec<Segment> {
        segments_for(&self.buffer, &self.spans)
    }
}

pub fn segments_for(text: &str, spans: &[MentionSpan]) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    if spans.is_empty() {
        return vec![Segment {
            text: text.to_string(),
            mention: false,
        }];
    }

    let mut segments = Vec::new();
    let mut pos = 0usize;
    for span in spans {
        let start = span.start.min(chars.len());
        let end_excl = span.end.saturating_add(1).min(chars.len());
        if start > pos {
            segments.push(Segment {
                text: chars[pos..start].iter().collect(),
                mention: false,
            });
        }
        if end_excl > start {
            segments.push(Segment {
                text: chars[start..end_excl].iter().collect(),
                mention: true,
            });
        }
        pos = pos.max(end_excl);
    }
    if pos < chars.len() {
        segments.push(Segment {
            text: chars[pos..].iter().collect(),
            mention: false,
        });
    }
    segments
}

/// An `@` starts a mention only at the buffer start or after whitespace.
fn at_sign_available(chars: &[char], at: usize) -> bool {
    at == 0 || chars.get(at - 1).is_some_and(|c| c.is_whitespace())
}

/// Walks backward from `from` collecting query text until an `@` is found.
/// Returns the `@` offset and the collected query.
fn nearest_at_from(chars: &[char], from: usize) -> Option<(usize, String)> {
    if chars.is_empty() {
        return None;
    }
    let mut curr = from.min(chars.len() - 1) as isize;
    let mut query = String::new();
    while curr >= 0 {
        let c = chars[curr as usize];
        if c == '@' {
            return Some((curr as usize, query));
        }
        query.insert(0, c);
        curr -= 1;
    }
    None
}

fn char_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

#[cfg(test)]
#[path = "../tests/unit/editor_tests.rs"]
mod tests;
