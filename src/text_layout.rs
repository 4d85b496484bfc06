#[derive(Debug, Clone)]
pub struct WrappedText {
    pub rendered: String,
    /// Caret cell for every char boundary (len = chars + 1).
    pub positions: Vec<(u16, u16)>,
    /// Cell where each source char was placed. Newlines keep the cell they
    /// would have occupied but render as line breaks.
    pub char_cells: Vec<(u16, u16)>,
    pub line_count: u16,
}

pub fn wrap_word_with_positions(text: &str, width: u16) -> WrappedText {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut rendered = String::new();
    let mut positions = Vec::with_capacity(chars.len() + 1);
    let mut char_cells = Vec::with_capacity(chars.len());
    let mut line = 0u16;
    let mut col = 0u16;

    positions.push((line, col));

    for (idx, ch) in chars.iter().copied().enumerate() {
        if ch == '\n' {
            rendered.push('\n');
            char_cells.push((line, col));
            line = line.saturating_add(1);
            col = 0;
            positions.push((line, col));
            continue;
        }

        if should_wrap_before_word(&chars, idx, col, width) {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        } else if col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }

        rendered.push(ch);
        char_cells.push((line, col));
        col = col.saturating_add(1);
        if col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }

        positions.push((line, col));
    }

    let line_count = positions
        .iter()
        .map(|(l, _)| *l)
        .max()
        .unwrap_or(0)
        .saturating_add(1);

    WrappedText {
        rendered,
        positions,
        char_cells,
        line_count,
    }
}

/// Cell occupied by the caret at `char_offset` when `text` is wrapped to
/// `width`. The terminal counterpart of measuring a mirror element filled
/// with the text up to the selection point; `char_offset` is clamped.
pub fn caret_cell(text: &str, char_offset: usize, width: u16) -> (u16, u16) {
    let positions = wrap_word_with_positions(text, width).positions;
    let idx = char_offset.min(positions.len().saturating_sub(1));
    positions[idx]
}

fn should_wrap_before_word(chars: &[char], idx: usize, col: u16, width: u16) -> bool {
    if col == 0 {
        return false;
    }
    let ch = chars[idx];
    if ch.is_whitespace() {
        return false;
    }
    if idx > 0 {
        let prev = chars[idx - 1];
        if !prev.is_whitespace() && prev != '\n' {
            return false;
        }
    }

    let word_len = chars[idx..]
        .iter()
        .take_while(|c| !c.is_whitespace() && **c != '\n')
        .count() as u16;

    word_len <= width && col.saturating_add(word_len) > width
}
