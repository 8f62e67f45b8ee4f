use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    error::Result,
    fountain,
    paragraph::{self, Paragraph, ParagraphType, SENTINEL},
};

mod cursor;
mod history;
mod names;

pub use history::{
    Action, ActionBundle, COALESCE_WINDOW, HistoryConfig, MAX_UNDO_BUNDLES, UndoLog,
};
pub use names::NameIndex;

/// Cursor location: paragraph index and character offset into that paragraph.
/// The offset may rest on, but never beyond, the paragraph's sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub paragraph: usize,
    pub offset: usize,
}

/// A screenplay being edited: typed paragraphs, a cursor and undo history.
///
/// All changes to the paragraphs go through five primitives (`input`,
/// `delete`, `insert_paragraph`, `remove_paragraph` and `retype`), which
/// record their effect in the undo log unless replaying history.
pub struct Screenplay {
    paragraphs: Vec<Paragraph>,
    cursor: Cursor,
    path: Option<PathBuf>,
    names: NameIndex,
    history: UndoLog,
}

impl Default for Screenplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Screenplay {
    pub fn new() -> Self {
        Self::from_paragraphs(Vec::new())
    }

    /// Builds a screenplay from parsed paragraphs. An empty list yields one
    /// empty scene heading.
    pub fn from_paragraphs(mut paragraphs: Vec<Paragraph>) -> Self {
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::empty(ParagraphType::Scene));
        }
        let mut screenplay = Self {
            paragraphs,
            cursor: Cursor::default(),
            path: None,
            names: NameIndex::new(),
            history: UndoLog::default(),
        };
        screenplay.rebuild_autocomplete_index();
        screenplay
    }

    /// Opens `path`, starting empty when it cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let paragraphs = match fountain::load(path) {
            Ok(paragraphs) => {
                log::debug!("loaded {} paragraphs from {}", paragraphs.len(), path.display());
                paragraphs
            }
            Err(err) => {
                log::warn!("{err}; starting with an empty screenplay");
                Vec::new()
            }
        };
        let mut screenplay = Self::from_paragraphs(paragraphs);
        screenplay.path = Some(path.to_path_buf());
        screenplay
    }

    pub fn with_history_config(mut self, config: HistoryConfig) -> Self {
        self.history = UndoLog::new(config);
        self
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn cursor_paragraph(&self) -> &Paragraph {
        &self.paragraphs[self.cursor.paragraph]
    }

    /// Absolute line and column of the cursor, blank lines included.
    pub fn cursor_line_column(&self) -> (usize, usize) {
        let (line, column) = self
            .cursor_paragraph()
            .position_to_line_column(self.cursor.offset);
        let above: usize = self.paragraphs[..self.cursor.paragraph]
            .iter()
            .map(Paragraph::line_count)
            .sum();
        (above + line, column)
    }

    pub fn line_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::line_count).sum()
    }

    /// Paragraph index containing absolute `line` and the line's index within it.
    pub fn paragraph_at_line(&self, line: usize) -> Option<(usize, usize)> {
        let mut remaining = line;
        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            if remaining < paragraph.line_count() {
                return Some((index, remaining));
            }
            remaining -= paragraph.line_count();
        }
        None
    }

    pub fn required_width(&self) -> usize {
        paragraph::required_width()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn names(&self) -> &NameIndex {
        &self.names
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn input(&mut self, paragraph: usize, position: usize, text: &str, record: bool) {
        if text.is_empty() {
            return;
        }
        let result = self.paragraphs[paragraph].input(position, text);
        debug_assert!(result.is_ok(), "{result:?}");
        if let Err(err) = result {
            log::error!("dropped input into paragraph {paragraph}: {err}");
            return;
        }
        if record {
            self.history.record(Action::Insert {
                paragraph,
                position,
                text: text.to_string(),
            });
        }
    }

    fn delete(&mut self, paragraph: usize, position: usize, length: usize, record: bool) -> String {
        let removed = self.paragraphs[paragraph].delete(position, length);
        if record && !removed.is_empty() {
            self.history.record(Action::Delete {
                paragraph,
                position,
                text: removed.clone(),
            });
        }
        removed
    }

    fn insert_paragraph(
        &mut self,
        index: usize,
        paragraph_type: ParagraphType,
        text: &str,
        record: bool,
    ) {
        self.paragraphs
            .insert(index, Paragraph::new(paragraph_type, text));
        if record {
            self.history.record(Action::NewParagraph {
                paragraph: index,
                paragraph_type,
                text: text.to_string(),
            });
        }
    }

    fn remove_paragraph(&mut self, index: usize, record: bool) {
        debug_assert!(self.paragraphs.len() > 1, "removing the last paragraph");
        if self.paragraphs.len() <= 1 {
            return;
        }
        let removed = self.paragraphs.remove(index);
        if record {
            self.history.record(Action::DeleteParagraph {
                paragraph: index,
                paragraph_type: removed.paragraph_type(),
                text: removed.text().to_string(),
            });
        }
    }

    fn retype(&mut self, index: usize, paragraph_type: ParagraphType, record: bool) {
        let from = self.paragraphs[index].paragraph_type();
        if from == paragraph_type {
            return;
        }
        self.paragraphs[index].set_type(paragraph_type);
        if record {
            self.history.record(Action::ChangeType {
                paragraph: index,
                from,
                to: paragraph_type,
            });
        }
    }

    /// Inserts text at the cursor. Each newline splits the paragraph, the new
    /// paragraph taking the enter transition of the one before it.
    pub fn type_text(&mut self, text: &str) {
        let text: String = text
            .chars()
            .filter(|ch| *ch != SENTINEL && *ch != '\r')
            .collect();
        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();

        self.input(self.cursor.paragraph, self.cursor.offset, first, true);
        self.cursor.offset += first.chars().count();

        let Some(last) = rest.last() else {
            return;
        };

        let paragraph = self.cursor.paragraph;
        let tail = self.paragraphs[paragraph].end() - self.cursor.offset;
        let removed = self.delete(paragraph, self.cursor.offset, tail, true);
        for segment in &rest {
            let next_type = self.cursor_paragraph().format().on_enter;
            self.cursor.paragraph += 1;
            self.insert_paragraph(self.cursor.paragraph, next_type, segment, true);
        }
        self.cursor.offset = last.chars().count();
        self.input(self.cursor.paragraph, self.cursor.offset, &removed, true);
    }

    /// Enter key: a name always ends at its last character before splitting.
    pub fn enter(&mut self) {
        if self.cursor_paragraph().paragraph_type() == ParagraphType::Name {
            self.move_to_paragraph_end();
        }
        self.type_text("\n");
    }

    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == Cursor::default() {
            return false;
        }
        self.move_left();
        self.delete_forward()
    }

    /// Deletes the character under the cursor, or joins the next paragraph
    /// when the cursor sits at the end of its paragraph.
    pub fn delete_forward(&mut self) -> bool {
        let Cursor { paragraph, offset } = self.cursor;
        if offset < self.paragraphs[paragraph].end() {
            self.delete(paragraph, offset, 1, true);
            true
        } else if paragraph + 1 < self.paragraphs.len() {
            let next = self.paragraphs[paragraph + 1].text().to_string();
            self.input(paragraph, offset, &next, true);
            self.remove_paragraph(paragraph + 1, true);
            true
        } else {
            false
        }
    }

    /// Replaces a name with the next known name sharing the text before the cursor.
    pub fn autocomplete_name(&mut self) -> bool {
        let Cursor { paragraph, offset } = self.cursor;
        let current = &self.paragraphs[paragraph];
        if current.paragraph_type() != ParagraphType::Name {
            return false;
        }
        let name = current.text().to_string();
        let prefix: String = name.chars().take(offset).collect();
        let proposal = self.names.next_match(&name, &prefix);
        if proposal == name {
            return false;
        }
        self.delete(paragraph, 0, name.chars().count(), true);
        self.input(paragraph, 0, &proposal, true);
        true
    }

    pub fn convert_by_tab(&mut self) {
        let target = self.cursor_paragraph().format().on_tab;
        self.retype(self.cursor.paragraph, target, true);
    }

    pub fn convert_to_previous_type(&mut self) {
        let target = self.cursor_paragraph().paragraph_type().previous();
        self.retype(self.cursor.paragraph, target, true);
    }

    pub fn convert_to_next_type(&mut self) {
        let target = self.cursor_paragraph().paragraph_type().next();
        self.retype(self.cursor.paragraph, target, true);
    }

    pub fn rebuild_autocomplete_index(&mut self) {
        self.names.clear();
        for paragraph in &self.paragraphs {
            if paragraph.paragraph_type() == ParagraphType::Name {
                self.names.add(paragraph.text());
            }
        }
    }

    /// Saves to `path` and remembers it. On failure nothing changes.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fountain::save(path, &self.paragraphs)?;
        log::debug!(
            "saved {} paragraphs to {}",
            self.paragraphs.len(),
            path.display()
        );
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let Some(actions) = self.history.undo() else {
            return false;
        };
        log::debug!("undo {} actions", actions.len());
        for action in &actions {
            self.replay(action);
        }
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(actions) = self.history.redo() else {
            return false;
        };
        log::debug!("redo {} actions", actions.len());
        for action in &actions {
            self.replay(action);
        }
        true
    }

    /// Applies a history action without recording it and moves the cursor to
    /// where the action took effect.
    fn replay(&mut self, action: &Action) {
        match action {
            Action::Insert {
                paragraph,
                position,
                text,
            } => {
                self.input(*paragraph, *position, text, false);
                self.cursor = Cursor {
                    paragraph: *paragraph,
                    offset: position + text.chars().count(),
                };
            }
            Action::Delete {
                paragraph,
                position,
                text,
            } => {
                self.delete(*paragraph, *position, text.chars().count(), false);
                self.cursor = Cursor {
                    paragraph: *paragraph,
                    offset: *position,
                };
            }
            Action::NewParagraph {
                paragraph,
                paragraph_type,
                text,
            } => {
                self.insert_paragraph(*paragraph, *paragraph_type, text, false);
                self.cursor = Cursor {
                    paragraph: *paragraph,
                    offset: 0,
                };
            }
            Action::DeleteParagraph { paragraph, .. } => {
                self.remove_paragraph(*paragraph, false);
                if self.cursor.paragraph == *paragraph {
                    match paragraph.checked_sub(1) {
                        Some(previous) => {
                            self.cursor.paragraph = previous;
                            self.move_to_paragraph_end();
                        }
                        None => self.cursor = Cursor::default(),
                    }
                } else if self.cursor.paragraph > *paragraph {
                    self.cursor.paragraph -= 1;
                }
            }
            Action::ChangeType { paragraph, to, .. } => {
                self.retype(*paragraph, *to, false);
            }
        }
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let last = self.paragraphs.len() - 1;
        self.cursor.paragraph = self.cursor.paragraph.min(last);
        let end = self.cursor_paragraph().end();
        self.cursor.offset = self.cursor.offset.min(end);
    }
}

impl fmt::Display for Screenplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for paragraph in &self.paragraphs {
            write!(f, "{paragraph}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "screenplay_tests.rs"]
mod screenplay_tests;
