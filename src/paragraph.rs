use std::fmt;

use crate::error::{Error, Result};

/// Terminates every paragraph's text. Never shown, never written to disk.
pub const SENTINEL: char = '\0';

/// Columns added to the widest paragraph layout when sizing a view.
pub const LAYOUT_MARGIN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParagraphType {
    Scene,
    Action,
    Name,
    Parenthetical,
    Dialogue,
}

impl ParagraphType {
    /// All types in cycling order.
    pub const ALL: [ParagraphType; 5] = [
        ParagraphType::Scene,
        ParagraphType::Action,
        ParagraphType::Name,
        ParagraphType::Parenthetical,
        ParagraphType::Dialogue,
    ];

    pub fn format(self) -> &'static ParagraphFormat {
        &FORMATS[self as usize]
    }

    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ParagraphType::Scene => "Scene",
            ParagraphType::Action => "Action",
            ParagraphType::Name => "Name",
            ParagraphType::Parenthetical => "Parenthetical",
            ParagraphType::Dialogue => "Dialogue",
        }
    }
}

/// Layout and transition rules for one paragraph type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParagraphFormat {
    pub indent: usize,
    pub width: usize,
    /// Empty lines rendered above the paragraph.
    pub blank_lines_before: usize,
    /// Type of the paragraph created when Enter splits this one.
    pub on_enter: ParagraphType,
    /// Type this paragraph converts to on Tab.
    pub on_tab: ParagraphType,
}

/// Indexed by `ParagraphType as usize`.
pub const FORMATS: [ParagraphFormat; 5] = [
    ParagraphFormat {
        indent: 0,
        width: 60,
        blank_lines_before: 2,
        on_enter: ParagraphType::Action,
        on_tab: ParagraphType::Action,
    },
    ParagraphFormat {
        indent: 0,
        width: 60,
        blank_lines_before: 1,
        on_enter: ParagraphType::Action,
        on_tab: ParagraphType::Name,
    },
    ParagraphFormat {
        indent: 25,
        width: 35,
        blank_lines_before: 1,
        on_enter: ParagraphType::Dialogue,
        on_tab: ParagraphType::Action,
    },
    ParagraphFormat {
        indent: 20,
        width: 15,
        blank_lines_before: 0,
        on_enter: ParagraphType::Dialogue,
        on_tab: ParagraphType::Dialogue,
    },
    ParagraphFormat {
        indent: 15,
        width: 35,
        blank_lines_before: 0,
        on_enter: ParagraphType::Name,
        on_tab: ParagraphType::Parenthetical,
    },
];

/// Minimum number of columns needed to lay out any paragraph type.
pub fn required_width() -> usize {
    FORMATS
        .iter()
        .map(|format| format.indent + format.width)
        .max()
        .unwrap_or(0)
        + LAYOUT_MARGIN
}

/// Returned by [`Paragraph::line_column_to_position`] for lines outside the paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineOutOfRange {
    /// The line falls into the blank lines above the text.
    Before,
    /// The line lies below the last wrapped line.
    After,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    paragraph_type: ParagraphType,
    text: String,
    line_lengths: Vec<usize>,
    line_count: usize,
}

impl Paragraph {
    pub fn new(paragraph_type: ParagraphType, text: &str) -> Self {
        let mut text = text.to_string();
        if !text.ends_with(SENTINEL) {
            text.push(SENTINEL);
        }
        let mut paragraph = Self {
            paragraph_type,
            text,
            line_lengths: Vec::new(),
            line_count: 0,
        };
        paragraph.reflow();
        paragraph
    }

    pub fn empty(paragraph_type: ParagraphType) -> Self {
        Self::new(paragraph_type, "")
    }

    pub fn paragraph_type(&self) -> ParagraphType {
        self.paragraph_type
    }

    pub fn format(&self) -> &'static ParagraphFormat {
        self.paragraph_type.format()
    }

    /// The user-visible text, without the sentinel.
    pub fn text(&self) -> &str {
        &self.text[..self.text.len() - SENTINEL.len_utf8()]
    }

    /// Length in characters, sentinel included.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offset of the sentinel, the last valid cursor position.
    pub fn end(&self) -> usize {
        self.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Character count of each wrapped line, trailing space or sentinel included.
    pub fn line_lengths(&self) -> &[usize] {
        &self.line_lengths
    }

    /// Wrapped lines plus the blank lines rendered above them.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Blank lines followed by the wrapped text, sentinel stripped.
    pub fn lines(&self) -> Vec<String> {
        let blank = self.format().blank_lines_before;
        let mut lines = vec![String::new(); blank];
        let mut chars = self.text.chars();
        for &length in &self.line_lengths {
            let line: String = chars
                .by_ref()
                .take(length)
                .filter(|ch| *ch != SENTINEL)
                .collect();
            lines.push(line);
        }
        lines
    }

    pub fn position_to_line_column(&self, position: usize) -> (usize, usize) {
        let mut remaining = position;
        let mut line = 0;
        for &length in &self.line_lengths {
            if remaining < length {
                break;
            }
            remaining -= length;
            line += 1;
        }
        (line + self.format().blank_lines_before, remaining)
    }

    /// Resolves a line (blank lines included) and a column to an offset.
    /// The column is clamped into the line.
    pub fn line_column_to_position(
        &self,
        line: usize,
        column: usize,
    ) -> std::result::Result<usize, LineOutOfRange> {
        let Some(line) = line.checked_sub(self.format().blank_lines_before) else {
            return Err(LineOutOfRange::Before);
        };
        let Some(&length) = self.line_lengths.get(line) else {
            return Err(LineOutOfRange::After);
        };
        let column = column.min(length.saturating_sub(1));
        Ok(self.line_lengths[..line].iter().sum::<usize>() + column)
    }

    /// Inserts `text` before the character at `position`. Valid positions are
    /// `0..=end()`: inserting after the sentinel would leave it mid-text, so
    /// `position == len()` is out of range.
    pub(crate) fn input(&mut self, position: usize, text: &str) -> Result<()> {
        let len = self.len();
        if position >= len {
            return Err(Error::OutOfRange { position, len });
        }
        let byte_idx = char_to_byte_idx(&self.text, position);
        self.text.insert_str(byte_idx, text);
        self.reflow();
        Ok(())
    }

    /// Removes up to `length` characters, never the sentinel.
    pub(crate) fn delete(&mut self, position: usize, length: usize) -> String {
        let end = position.saturating_add(length).min(self.end());
        if position >= end {
            return String::new();
        }
        let start_byte = char_to_byte_idx(&self.text, position);
        let end_byte = char_to_byte_idx(&self.text, end);
        let removed = self.text.drain(start_byte..end_byte).collect();
        self.reflow();
        removed
    }

    pub(crate) fn set_type(&mut self, paragraph_type: ParagraphType) {
        self.paragraph_type = paragraph_type;
        self.reflow();
    }

    /// Greedy word wrap. Words as wide as the column are broken mid-word.
    fn reflow(&mut self) {
        let width = self.format().width;
        self.line_lengths.clear();

        let mut current = 0;
        let mut word = 0;
        for ch in self.text.chars() {
            word += 1;
            if ch == ' ' || ch == SENTINEL {
                current += word;
                word = 0;
            } else if word == width {
                current += word;
                self.line_lengths.push(current);
                current = 0;
                word = 0;
            } else if current + word > width {
                self.line_lengths.push(current);
                current = 0;
            }
        }
        self.line_lengths.push(current);

        self.line_count = self.line_lengths.len() + self.format().blank_lines_before;
    }
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = " ".repeat(self.format().indent);
        for line in self.lines() {
            writeln!(f, "{indent}{line}")?;
        }
        Ok(())
    }
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}
