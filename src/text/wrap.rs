//! Greedy word wrap with overflow detection

/// Column the message is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapLayout {
    pub max_width: f32,
    pub line_height: f32,
    pub max_lines: usize,
}

impl WrapLayout {
    pub fn new(max_width: f32, line_height: f32, max_lines: usize) -> Self {
        Self {
            max_width,
            line_height,
            max_lines,
        }
    }

    /// Derive line capacity from the available height: `floor(height / line_height)`.
    /// Degenerate inputs give zero lines.
    pub fn for_column(max_width: f32, available_height: f32, line_height: f32) -> Self {
        let max_lines = if line_height > 0.0 && available_height > 0.0 {
            (available_height / line_height).floor() as usize
        } else {
            0
        };
        Self::new(max_width, line_height, max_lines)
    }

    /// Top of line slot `index`, relative to the column top.
    pub fn line_top(&self, index: usize) -> f32 {
        index as f32 * self.line_height
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapOutcome {
    pub lines: Vec<String>,
    /// More text existed than fit in `max_lines`
    pub overflowed: bool,
}

struct LineSink {
    lines: Vec<String>,
    max_lines: usize,
    overflowed: bool,
}

impl LineSink {
    /// Returns false once capacity is exhausted.
    fn push(&mut self, line: String) -> bool {
        if self.lines.len() >= self.max_lines {
            self.overflowed = true;
            return false;
        }
        self.lines.push(line);
        true
    }
}

/// Wrap `message` into lines no wider than `layout.max_width` as reported by
/// `measure`.
///
/// Paragraphs split on `\n` (an empty paragraph still takes a line), words on
/// single spaces, and a word wider than the column is split by character.
/// Repeated spaces are kept; the one space at a break is dropped.
/// Processing stops at the first line that does not fit in `max_lines`.
pub fn wrap<F>(message: &str, layout: &WrapLayout, measure: F) -> WrapOutcome
where
    F: Fn(&str) -> f32,
{
    let mut sink = LineSink {
        lines: Vec::new(),
        max_lines: layout.max_lines,
        overflowed: false,
    };
    if message.is_empty() {
        return WrapOutcome::default();
    }

    'paragraphs: for paragraph in message.split('\n') {
        let mut current = String::new();

        // Empty segments are kept so runs of spaces survive the layout.
        for (i, word) in paragraph.split(' ').enumerate() {
            let candidate = if i == 0 {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= layout.max_width || current.is_empty() {
                current = candidate;
            } else {
                if !sink.push(std::mem::take(&mut current)) {
                    break 'paragraphs;
                }
                current = word.to_string();
            }

            // A lone word still too wide: fall back to splitting by character.
            if measure(&current) > layout.max_width {
                let long = std::mem::take(&mut current);
                for ch in long.chars() {
                    let mut candidate = current.clone();
                    candidate.push(ch);
                    if measure(&candidate) > layout.max_width && !current.is_empty() {
                        if !sink.push(std::mem::take(&mut current)) {
                            break 'paragraphs;
                        }
                        current.push(ch);
                    } else {
                        current = candidate;
                    }
                }
            }
        }

        if !sink.push(current) {
            break;
        }
    }

    WrapOutcome {
        lines: sink.lines,
        overflowed: sink.overflowed,
    }
}
