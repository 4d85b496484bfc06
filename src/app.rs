use std::time::Instant;

use crate::config::Config;
use crate::editor::{MentionEditor, MentionSpan, Segment, TriggerEvent, segments_for};
use crate::lookup::LookupEvent;
use crate::suggest::{PopupAnchor, SuggestionBox};
use crate::text_layout::caret_cell;

const MAX_LOG_MESSAGES: usize = 500;

/// A submitted composer entry, kept with its mention spans so the log can
/// re-render the highlights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub text: String,
    pub spans: Vec<MentionSpan>,
}

impl LogMessage {
    pub fn segments(&self) -> Vec<Segment> {
        segments_for(&self.text, &self.spans)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Log,
    Composer,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub ticks: u64,
    pub active_pane: Pane,
    messages: Vec<LogMessage>,
    log_scroll: u16,
    editor: MentionEditor,
    suggestions: SuggestionBox,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            running: true,
            ticks: 0,
            active_pane: Pane::Composer,
            messages: Vec::new(),
            log_scroll: 0,
            editor: MentionEditor::default(),
            suggestions: SuggestionBox::new(config.debounce(), config.max_results),
        }
    }

    pub fn editor(&self) -> &MentionEditor {
        &self.editor
    }

    pub fn suggestions(&self) -> &SuggestionBox {
        &self.suggestions
    }

    pub fn suggestions_mut(&mut self) -> &mut SuggestionBox {
        &mut self.suggestions
    }

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    pub fn log_scroll(&self) -> u16 {
        self.log_scroll
    }

    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Moving focus away from the composer dismisses the popup and the
    /// active trigger.
    pub fn next_pane(&mut self, now: Instant) {
        if self.active_pane == Pane::Composer {
            self.editor.cancel_trigger();
            self.suggestions.set_query(None, now);
        }
        self.active_pane = match self.active_pane {
            Pane::Log => Pane::Composer,
            Pane::Composer => Pane::Log,
        };
    }

    pub fn prev_pane(&mut self, now: Instant) {
        // two panes, so the cycle is the same in either direction
        self.next_pane(now);
    }

    pub fn input_char(&mut self, c: char, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.insert_char(c);
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn backspace(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.backspace();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn delete_forward(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.delete_forward();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn cursor_left(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.move_left();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn cursor_right(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.move_right();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn cursor_home(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.move_home();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn cursor_end(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        self.editor.move_end();
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn click_composer(&mut self, offset: usize, composer_width: u16, now: Instant) {
        self.active_pane = Pane::Composer;
        self.editor.click(offset);
        let event = self.editor.resolve();
        self.route_trigger_event(event, composer_width, now);
    }

    /// Up/Down drive the popup when it is open, otherwise they scroll the
    /// log pane.
    pub fn move_up(&mut self) {
        if self.active_pane == Pane::Composer && self.suggestions.visible() {
            self.suggestions.move_up();
        } else {
            self.log_scroll = self.log_scroll.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self, max_log_scroll: u16) {
        if self.active_pane == Pane::Composer && self.suggestions.visible() {
            self.suggestions.move_down();
        } else {
            self.log_scroll = (self.log_scroll + 1).min(max_log_scroll);
        }
    }

    pub fn scroll_log_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn scroll_log_down(&mut self, max_log_scroll: u16) {
        self.log_scroll = (self.log_scroll + 1).min(max_log_scroll);
    }

    /// Enter accepts the highlighted candidate while the popup is open,
    /// otherwise it submits the composer contents to the log.
    pub fn submit(&mut self, composer_width: u16, now: Instant) {
        if self.active_pane != Pane::Composer {
            return;
        }
        if self.suggestions.visible() {
            if let Some(name) = self.suggestions.selected_name().map(ToString::to_string) {
                self.accept_name(&name, composer_width, now);
            }
            return;
        }
        if self.editor.is_empty() {
            return;
        }
        let (text, spans) = self.editor.take_text();
        self.messages.push(LogMessage { text, spans });
        if self.messages.len() > MAX_LOG_MESSAGES {
            let excess = self.messages.len() - MAX_LOG_MESSAGES;
            self.messages.drain(..excess);
        }
        self.suggestions.set_query(None, now);
    }

    /// Click on a populated popup row: select it, then accept it.
    pub fn accept_popup_row(&mut self, row: usize, composer_width: u16, now: Instant) {
        if !self.suggestions.visible() {
            return;
        }
        self.suggestions.select(row);
        if let Some(name) = self.suggestions.selected_name().map(ToString::to_string) {
            self.accept_name(&name, composer_width, now);
        }
    }

    fn accept_name(&mut self, name: &str, composer_width: u16, now: Instant) {
        let event = self.editor.accept_mention(name);
        self.route_trigger_event(event, composer_width, now);
    }

    pub fn cancel(&mut self, now: Instant) {
        if self.suggestions.visible() {
            self.editor.cancel_trigger();
            self.suggestions.set_query(None, now);
        }
    }

    pub fn on_lookup_event(&mut self, event: LookupEvent) {
        match event {
            LookupEvent::Results {
                generation,
                candidates,
            } => self.suggestions.on_results(generation, candidates),
        }
    }

    fn route_trigger_event(
        &mut self,
        event: Option<TriggerEvent>,
        composer_width: u16,
        now: Instant,
    ) {
        match event {
            Some(TriggerEvent::Changed { offset, query }) => {
                if composer_width > 0 {
                    let (row, col) = caret_cell(self.editor.buffer(), offset, composer_width);
                    self.suggestions.set_anchor(PopupAnchor { row, col });
                }
                self.suggestions.set_query(Some(query), now);
            }
            Some(TriggerEvent::Cleared) => {
                self.suggestions.set_query(None, now);
            }
            None => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
