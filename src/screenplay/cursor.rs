use super::{Cursor, Screenplay};
use crate::paragraph::{Paragraph, ParagraphType};

impl Screenplay {
    pub fn move_left(&mut self) -> bool {
        if self.cursor.offset > 0 {
            self.cursor.offset -= 1;
        } else if self.cursor.paragraph > 0 {
            self.cursor.paragraph -= 1;
            self.cursor.offset = self.cursor_paragraph().end();
        } else {
            return false;
        }
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor.offset < self.cursor_paragraph().end() {
            self.cursor.offset += 1;
        } else if self.cursor.paragraph + 1 < self.paragraphs.len() {
            self.cursor.paragraph += 1;
            self.cursor.offset = 0;
        } else {
            return false;
        }
        true
    }

    /// Moves one rendered line up, keeping the screen column where possible.
    pub fn move_up(&mut self) -> bool {
        let current = self.cursor_paragraph();
        let (line, column) = current.position_to_line_column(self.cursor.offset);
        if let Some(offset) = line
            .checked_sub(1)
            .and_then(|line| current.line_column_to_position(line, column).ok())
        {
            self.cursor.offset = offset;
            return true;
        }
        let Some(index) = self.cursor.paragraph.checked_sub(1) else {
            return false;
        };
        let previous = &self.paragraphs[index];
        let column = shift_column(column, current, previous);
        let offset = previous
            .line_column_to_position(previous.line_count() - 1, column)
            .unwrap_or_else(|_| previous.end());
        self.cursor = Cursor {
            paragraph: index,
            offset,
        };
        true
    }

    /// Moves one rendered line down, keeping the screen column where possible.
    pub fn move_down(&mut self) -> bool {
        let current = self.cursor_paragraph();
        let (line, column) = current.position_to_line_column(self.cursor.offset);
        if let Ok(offset) = current.line_column_to_position(line + 1, column) {
            self.cursor.offset = offset;
            return true;
        }
        let index = self.cursor.paragraph + 1;
        let Some(next) = self.paragraphs.get(index) else {
            return false;
        };
        let column = shift_column(column, current, next);
        let offset = next
            .line_column_to_position(next.format().blank_lines_before, column)
            .unwrap_or(0);
        self.cursor = Cursor {
            paragraph: index,
            offset,
        };
        true
    }

    pub fn move_to_line_start(&mut self) -> bool {
        let (_, column) = self
            .cursor_paragraph()
            .position_to_line_column(self.cursor.offset);
        self.cursor.offset -= column;
        column > 0
    }

    /// Moves to the last character of the rendered line. On wrapped lines
    /// that is the trailing space, on the last line the paragraph end.
    pub fn move_to_line_end(&mut self) -> bool {
        let current = self.cursor_paragraph();
        let (line, column) = current.position_to_line_column(self.cursor.offset);
        let text_line = line - current.format().blank_lines_before;
        let Some(&length) = current.line_lengths().get(text_line) else {
            return false;
        };
        let target = self.cursor.offset + length.saturating_sub(column + 1);
        let moved = target != self.cursor.offset;
        self.cursor.offset = target;
        moved
    }

    pub fn move_to_paragraph_end(&mut self) -> bool {
        let end = self.cursor_paragraph().end();
        let moved = end != self.cursor.offset;
        self.cursor.offset = end;
        moved
    }

    /// Jumps to the closest scene heading above, wrapping to the bottom.
    pub fn move_to_previous_scene(&mut self) -> bool {
        let current = self.cursor.paragraph;
        let target = (0..current)
            .rev()
            .chain((current + 1..self.paragraphs.len()).rev())
            .find(|&index| self.is_scene(index));
        self.jump_to(target)
    }

    /// Jumps to the closest scene heading below, wrapping to the top.
    pub fn move_to_next_scene(&mut self) -> bool {
        let current = self.cursor.paragraph;
        let target = (current + 1..self.paragraphs.len())
            .chain(0..current)
            .find(|&index| self.is_scene(index));
        self.jump_to(target)
    }

    fn is_scene(&self, index: usize) -> bool {
        self.paragraphs[index].paragraph_type() == ParagraphType::Scene
    }

    fn jump_to(&mut self, paragraph: Option<usize>) -> bool {
        match paragraph {
            Some(paragraph) => {
                self.cursor = Cursor {
                    paragraph,
                    offset: 0,
                };
                true
            }
            None => false,
        }
    }
}

/// Translates a column between paragraphs so the cursor keeps its screen column.
fn shift_column(column: usize, from: &Paragraph, to: &Paragraph) -> usize {
    (column + from.format().indent).saturating_sub(to.format().indent)
}
