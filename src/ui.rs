use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Padding, Paragraph};

use crate::app::{App, Pane};
use crate::editor::MentionSpan;
use crate::suggest::PopupState;
use crate::text_layout::{WrappedText, wrap_word_with_positions};
use crate::theme::Theme;

const MAX_INPUT_TEXT_LINES: u16 = 5;
const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const ACTIVE_TITLE_BG: Color = Color::Rgb(90, 145, 200);
const ACTIVE_TITLE_FG: Color = Color::Black;
const STATUS_HELP_TEXT: &str =
    "Tab focus | @ mentions | Up/Down choose | Enter accept or send | Esc dismiss | Ctrl+C quit";
const LOADING_LABEL: &str = "Loading...";
const NO_DATA_LABEL: &str = "No data...";
const EMPTY_LOG_HINT: &str = "No messages yet. Type below and press Enter.";

struct ComposerMetrics {
    screen: Rect,
    title_area: Rect,
    log_area: Rect,
    input_area: Rect,
    status_area: Rect,
    wrapped: WrappedText,
    cursor_line: u16,
    cursor_col: u16,
    input_scroll: u16,
}

pub fn composer_text_width(screen: Rect) -> u16 {
    screen.width.saturating_sub(TEXT_PADDING * 2).max(1)
}

fn composer_metrics(screen: Rect, app: &App) -> ComposerMetrics {
    let text_width = composer_text_width(screen);
    let wrapped = wrap_word_with_positions(app.editor().buffer(), text_width);
    let cursor_idx = app
        .editor()
        .cursor()
        .min(wrapped.positions.len().saturating_sub(1));
    let (cursor_line, cursor_col) = wrapped.positions[cursor_idx];

    let max_input_height = screen
        .height
        .saturating_sub(TITLE_BAR_HEIGHT + STATUS_HEIGHT + 1)
        .max(1);
    let (input_height, input_scroll) =
        input_box_metrics(wrapped.line_count, cursor_line, max_input_height);

    let [title_area, log_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(TITLE_BAR_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(input_height),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(screen);

    ComposerMetrics {
        screen,
        title_area,
        log_area,
        input_area,
        status_area,
        wrapped,
        cursor_line,
        cursor_col,
        input_scroll,
    }
}

pub fn log_max_scroll(screen: Rect, app: &App) -> u16 {
    let metrics = composer_metrics(screen, app);
    let width = metrics.log_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let visible = metrics.log_area.height.saturating_sub(TEXT_PADDING * 2);
    log_line_count(app, width).saturating_sub(visible)
}

pub fn pane_hit_test(screen: Rect, app: &App, x: u16, y: u16) -> Option<Pane> {
    let metrics = composer_metrics(screen, app);
    if point_in_rect(metrics.input_area, x, y) {
        return Some(Pane::Composer);
    }
    if point_in_rect(metrics.log_area, x, y) || point_in_rect(metrics.title_area, x, y) {
        return Some(Pane::Log);
    }
    None
}

/// Maps a click inside the composer to the char offset the caret should
/// take. Clicks past the end of a line land on its last boundary.
pub fn composer_click_offset(screen: Rect, app: &App, x: u16, y: u16) -> Option<usize> {
    let metrics = composer_metrics(screen, app);
    let inner = metrics.input_area.inner(Margin {
        horizontal: TEXT_PADDING,
        vertical: TEXT_PADDING,
    });
    if !point_in_rect(inner, x, y) {
        return None;
    }
    let line = (y - inner.y).saturating_add(metrics.input_scroll);
    let col = x - inner.x;
    Some(char_offset_at(&metrics.wrapped.positions, line, col))
}

/// Row index of a click on a populated popup list, if any.
pub fn popup_row_hit(screen: Rect, app: &App, x: u16, y: u16) -> Option<usize> {
    if app.suggestions().state() != PopupState::List {
        return None;
    }
    let metrics = composer_metrics(screen, app);
    let overlay = popup_overlay_rect(&metrics, app)?;
    if !point_in_rect(overlay, x, y) {
        return None;
    }
    let row = (y as usize).checked_sub((overlay.y + TEXT_PADDING) as usize)?;
    (row < app.suggestions().candidates().len()).then_some(row)
}

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let metrics = composer_metrics(frame.area(), app);

    render_title_bar(frame, &metrics, app, theme);
    render_log_pane(frame, &metrics, app, theme);
    render_composer(frame, &metrics, app, theme);
    render_status_bar(frame, &metrics, theme);

    if app.suggestions().visible() {
        render_suggestion_popup(frame, &metrics, app, theme);
    }

    if app.active_pane == Pane::Composer {
        let inner = metrics.input_area.inner(Margin {
            horizontal: TEXT_PADDING,
            vertical: TEXT_PADDING,
        });
        if inner.width > 0 && inner.height > 0 {
            let visible_cursor_line = metrics.cursor_line.saturating_sub(metrics.input_scroll);
            if visible_cursor_line < inner.height {
                frame.set_cursor_position((
                    inner
                        .x
                        .saturating_add(metrics.cursor_col.min(inner.width.saturating_sub(1))),
                    inner.y.saturating_add(visible_cursor_line),
                ));
            }
        }
    }
}

fn render_title_bar(frame: &mut Frame, metrics: &ComposerMetrics, app: &App, theme: &Theme) {
    let active = app.active_pane == Pane::Log;
    let title_bg = title_bar_bg(theme.log_bg, active);
    let title_fg = if active {
        ACTIVE_TITLE_FG
    } else {
        theme.muted_fg
    };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        metrics.title_area,
    );
    frame.render_widget(
        Paragraph::new("Messages")
            .style(Style::default().bg(title_bg).fg(title_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        metrics.title_area,
    );
}

fn render_log_pane(frame: &mut Frame, metrics: &ComposerMetrics, app: &App, theme: &Theme) {
    let width = metrics.log_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let lines = log_lines(app, width, theme);
    let scroll = app.log_scroll().min(log_max_scroll(metrics.screen, app));
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .scroll((scroll, 0))
            .style(Style::default().bg(theme.log_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.log_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        metrics.log_area,
    );
}

fn render_composer(frame: &mut Frame, metrics: &ComposerMetrics, app: &App, theme: &Theme) {
    let width = composer_text_width(metrics.screen);
    let lines = styled_wrapped_lines(
        app.editor().buffer(),
        app.editor().spans(),
        width,
        Style::default().fg(theme.text_fg),
        Style::default().bg(theme.mention_bg).fg(theme.mention_fg),
    );
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .scroll((metrics.input_scroll, 0))
            .style(Style::default().bg(theme.composer_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.composer_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        metrics.input_area,
    );
}

fn render_status_bar(frame: &mut Frame, metrics: &ComposerMetrics, theme: &Theme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        metrics.status_area,
    );
    frame.render_widget(
        Paragraph::new(STATUS_HELP_TEXT)
            .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.status_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        metrics.status_area,
    );
}

fn render_suggestion_popup(frame: &mut Frame, metrics: &ComposerMetrics, app: &App, theme: &Theme) {
    let Some(overlay) = popup_overlay_rect(metrics, app) else {
        return;
    };

    let mut lines = Vec::new();
    match app.suggestions().state() {
        PopupState::Loading => lines.push(Line::from(Span::styled(
            LOADING_LABEL,
            Style::default().fg(theme.muted_fg),
        ))),
        PopupState::Empty => lines.push(Line::from(Span::styled(
            NO_DATA_LABEL,
            Style::default().fg(theme.muted_fg),
        ))),
        PopupState::List => {
            for (idx, candidate) in app.suggestions().candidates().iter().enumerate() {
                let style = if idx == app.suggestions().selected_index() {
                    Style::default()
                        .bg(theme.popup_selected_bg)
                        .fg(ACTIVE_TITLE_FG)
                } else {
                    Style::default().fg(theme.text_fg)
                };
                lines.push(Line::from(Span::styled(candidate.name.clone(), style)));
            }
        }
    }

    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.popup_bg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.popup_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        overlay,
    );
}

/// Overlay anchored to the trigger's caret cell, opening upward from it
/// and clamped inside the log area.
fn popup_overlay_rect(metrics: &ComposerMetrics, app: &App) -> Option<Rect> {
    if !app.suggestions().visible() || metrics.log_area.height == 0 {
        return None;
    }
    let anchor = app.suggestions().anchor();
    let visible_row = anchor.row.saturating_sub(metrics.input_scroll);
    let anchor_x = metrics
        .input_area
        .x
        .saturating_add(TEXT_PADDING)
        .saturating_add(anchor.col);
    let anchor_y = metrics
        .input_area
        .y
        .saturating_add(TEXT_PADDING)
        .saturating_add(visible_row);

    let rows = match app.suggestions().state() {
        PopupState::Loading | PopupState::Empty => 1,
        PopupState::List => app.suggestions().candidates().len().max(1),
    } as u16;
    let height = rows
        .saturating_add(TEXT_PADDING * 2)
        .min(metrics.log_area.height.max(1));

    let longest_name = app
        .suggestions()
        .candidates()
        .iter()
        .map(|candidate| candidate.name.chars().count())
        .max()
        .unwrap_or(0);
    let content_width = longest_name
        .max(LOADING_LABEL.chars().count())
        .max(NO_DATA_LABEL.chars().count()) as u16;
    let width = content_width
        .saturating_add(TEXT_PADDING * 2)
        .min(metrics.screen.width.max(1));

    let x = anchor_x.min(metrics.screen.width.saturating_sub(width));
    let y = anchor_y.saturating_sub(height).max(metrics.log_area.y);
    Some(Rect::new(x, y, width, height))
}

fn log_lines(app: &App, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    if app.messages().is_empty() {
        return vec![Line::from(Span::styled(
            EMPTY_LOG_HINT,
            Style::default().fg(theme.muted_fg),
        ))];
    }
    let base = Style::default().fg(theme.text_fg);
    let mention = Style::default().bg(theme.mention_bg).fg(theme.mention_fg);
    let mut lines = Vec::new();
    for (idx, message) in app.messages().iter().enumerate() {
        lines.extend(styled_wrapped_lines(
            &message.text,
            &message.spans,
            width,
            base,
            mention,
        ));
        if idx + 1 < app.messages().len() {
            lines.push(Line::from(Span::styled(
                "─".repeat(width as usize),
                Style::default().fg(theme.muted_fg),
            )));
        }
    }
    lines
}

fn log_line_count(app: &App, width: u16) -> u16 {
    if app.messages().is_empty() {
        return 1;
    }
    let mut total = 0u16;
    for (idx, message) in app.messages().iter().enumerate() {
        total =
            total.saturating_add(wrap_word_with_positions(&message.text, width).line_count);
        if idx + 1 < app.messages().len() {
            total = total.saturating_add(1);
        }
    }
    total
}

/// Wraps `text` and splits each visual line into runs of plain and
/// mention-styled spans.
fn styled_wrapped_lines(
    text: &str,
    spans: &[MentionSpan],
    width: u16,
    base: Style,
    mention: Style,
) -> Vec<Line<'static>> {
    let wrapped = wrap_word_with_positions(text, width);
    let chars: Vec<char> = text.chars().collect();
    let mask = mention_mask(chars.len(), spans);
    let style_for = |is_mention: bool| if is_mention { mention } else { base };

    let mut lines_out: Vec<Line<'static>> = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_is_mention = false;
    let mut current_line = 0u16;

    for (idx, ch) in chars.iter().copied().enumerate() {
        let (line, _) = wrapped.char_cells[idx];
        if line != current_line {
            if !run.is_empty() {
                current_spans.push(Span::styled(
                    std::mem::take(&mut run),
                    style_for(run_is_mention),
                ));
            }
            lines_out.push(Line::from(std::mem::take(&mut current_spans)));
            for _ in current_line + 1..line {
                lines_out.push(Line::default());
            }
            current_line = line;
        }
        if ch == '\n' {
            continue;
        }
        let is_mention = mask[idx];
        if is_mention != run_is_mention && !run.is_empty() {
            current_spans.push(Span::styled(
                std::mem::take(&mut run),
                style_for(run_is_mention),
            ));
        }
        run_is_mention = is_mention;
        run.push(ch);
    }
    if !run.is_empty() {
        current_spans.push(Span::styled(run, style_for(run_is_mention)));
    }
    lines_out.push(Line::from(current_spans));
    while (lines_out.len() as u16) < wrapped.line_count {
        lines_out.push(Line::default());
    }
    lines_out
}

fn mention_mask(char_count: usize, spans: &[MentionSpan]) -> Vec<bool> {
    let mut mask = vec![false; char_count];
    for span in spans {
        for idx in span.start..=span.end {
            if idx < char_count {
                mask[idx] = true;
            }
        }
    }
    mask
}

fn char_offset_at(positions: &[(u16, u16)], line: u16, col: u16) -> usize {
    let mut best = 0;
    for (idx, (l, c)) in positions.iter().copied().enumerate() {
        if l < line || (l == line && c <= col) {
            best = idx;
        }
    }
    best
}

fn input_box_metrics(input_text_lines: u16, cursor_line: u16, max_input_height: u16) -> (u16, u16) {
    let capped_text_lines = input_text_lines.clamp(1, MAX_INPUT_TEXT_LINES);
    let desired_height = capped_text_lines.saturating_add(TEXT_PADDING * 2);
    let input_height = desired_height.clamp(1, max_input_height.max(1));
    let visible_text_lines = input_height.saturating_sub(TEXT_PADDING * 2).max(1);
    let max_scroll = input_text_lines.saturating_sub(visible_text_lines);
    let middle_line = visible_text_lines / 2;
    let input_scroll = cursor_line.saturating_sub(middle_line).min(max_scroll);
    (input_height, input_scroll)
}

fn title_bar_bg(base: Color, active: bool) -> Color {
    if active {
        return ACTIVE_TITLE_BG;
    }
    match base {
        Color::Rgb(r, g, b) => {
            let delta = -12;
            Color::Rgb(
                adjust_channel(r, delta),
                adjust_channel(g, delta),
                adjust_channel(b, delta),
            )
        }
        _ => base,
    }
}

fn point_in_rect(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

fn adjust_channel(channel: u8, delta: i16) -> u8 {
    let value = channel as i16 + delta;
    value.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
