//! Reading and writing the plain-text screenplay format.
//!
//! The format is line based. A line's paragraph type is inferred from its
//! shape and from the line that follows it:
//!
//! - scene headings start with a slugline prefix such as `INT.` or `EXT `
//!   and are followed by a blank line; `.` forces a scene heading,
//! - character names are upper case and directly followed by dialogue or a
//!   parenthetical; `@` forces a name,
//! - parentheticals are wrapped in `(` `)`,
//! - everything else is action; `!` forces action.

use std::{
    fs,
    io::{self, Write},
    mem,
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{
    error::{Error, Result},
    paragraph::{Paragraph, ParagraphType, SENTINEL},
};

const SCENE_PREFIXES: [&str; 12] = [
    "int ", "ext ", "est ", "int./ext ", "int/ext ", "i/e ", "int.", "ext.", "est.", "int./ext.",
    "int/ext.", "i/e.",
];

const FORCE_SCENE: char = '.';
const FORCE_NAME: char = '@';
const FORCE_ACTION: char = '!';

pub fn load(path: impl AsRef<Path>) -> Result<Vec<Paragraph>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    Ok(parse(&content))
}

pub fn parse(input: &str) -> Vec<Paragraph> {
    let mut reader = Reader::default();
    for line in input.lines() {
        reader.feed(line);
    }
    reader.finish()
}

/// Writes the screenplay to `path`, replacing any previous file in one step.
pub fn save(path: impl AsRef<Path>, paragraphs: &[Paragraph]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|err| Error::io(path, err))?;
    write(&mut file, paragraphs).map_err(|err| Error::io(path, err))?;
    file.as_file()
        .sync_all()
        .map_err(|err| Error::io(path, err))?;
    file.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}

pub fn write<W: Write>(out: &mut W, paragraphs: &[Paragraph]) -> io::Result<()> {
    let mut previous_blank = false;
    for paragraph in paragraphs {
        let line = encode_line(paragraph);
        let (blank_before, blank_after) = match paragraph.paragraph_type() {
            ParagraphType::Scene | ParagraphType::Action => (true, true),
            ParagraphType::Name => (true, false),
            ParagraphType::Parenthetical | ParagraphType::Dialogue => (false, false),
        };

        if blank_before && !previous_blank {
            writeln!(out)?;
        }
        writeln!(out, "{line}")?;
        if blank_after {
            writeln!(out)?;
        }
        previous_blank = blank_after;
    }
    out.flush()
}

pub fn to_string(paragraphs: &[Paragraph]) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write(&mut buffer, paragraphs);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Renders one paragraph, adding a forcing marker only where the bare text
/// would be classified differently on reading.
fn encode_line(paragraph: &Paragraph) -> String {
    let text = paragraph.text();
    match paragraph.paragraph_type() {
        ParagraphType::Scene => {
            if is_scene_heading(text) {
                text.to_string()
            } else {
                format!("{FORCE_SCENE}{text}")
            }
        }
        ParagraphType::Action => {
            let shape = text.trim();
            if shape.is_empty()
                || shape.starts_with(FORCE_ACTION)
                || hints_scene(shape)
                || hints_name(shape)
                || is_parenthetical(shape)
            {
                format!("{FORCE_ACTION}{text}")
            } else {
                text.to_string()
            }
        }
        ParagraphType::Name => {
            let shape = text.trim();
            if !is_name(shape) || hints_scene(shape) || shape.starts_with(FORCE_NAME) {
                format!("{FORCE_NAME}{text}")
            } else {
                text.to_string()
            }
        }
        ParagraphType::Parenthetical => format!("({text})"),
        ParagraphType::Dialogue => text.to_string(),
    }
}

fn is_scene_heading(line: &str) -> bool {
    let lower = line.to_lowercase();
    SCENE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

fn is_name(line: &str) -> bool {
    let has_letter = line.chars().any(|ch| ch.is_ascii_alphabetic());
    let before_parenthesis = line.split('(').next().unwrap_or_default();
    has_letter && is_upper_case(before_parenthesis) && !line.starts_with(FORCE_ACTION)
}

fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn hints_scene(line: &str) -> bool {
    line.starts_with(FORCE_SCENE) || is_scene_heading(line)
}

fn hints_name(line: &str) -> bool {
    line.starts_with(FORCE_NAME) || is_name(line)
}

fn is_parenthetical(line: &str) -> bool {
    line.chars().count() >= 2 && line.starts_with('(') && line.ends_with(')')
}

/// Drops indentation and `marker` when the line is forced. Whatever follows
/// the marker is the paragraph text, whitespace included.
fn strip_marker(line: &str, marker: char) -> &str {
    line.trim_start().strip_prefix(marker).unwrap_or(line)
}

/// Classification of the previously read line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Empty,
    SceneHint,
    NameHint,
    SceneAndNameHint,
    Parenthetical,
    Dialogue,
    Action,
}

#[derive(Default)]
struct Reader {
    paragraphs: Vec<Paragraph>,
    state: State,
    previous: String,
}

impl Reader {
    /// Lines are kept verbatim. Surrounding whitespace only matters for
    /// telling blank lines apart and for classifying a line.
    fn feed(&mut self, raw: &str) {
        let line: String = raw.chars().filter(|ch| *ch != SENTINEL).collect();
        let shape = line.trim();
        let blank = shape.is_empty();
        let previous = mem::take(&mut self.previous);
        let state = self.state;

        self.state = match state {
            State::Empty if blank => State::Empty,
            State::Empty => match (hints_scene(shape), hints_name(shape)) {
                (true, true) => State::SceneAndNameHint,
                (true, false) => State::SceneHint,
                (false, true) => State::NameHint,
                (false, false) => {
                    self.push_action(&line);
                    State::Action
                }
            },
            State::SceneHint if blank => {
                self.push_scene(&previous);
                State::Empty
            }
            State::SceneHint => {
                self.push_action(&previous);
                self.push_action(&line);
                State::Action
            }
            State::NameHint if blank => {
                self.push_action(&previous);
                State::Empty
            }
            State::NameHint => {
                self.push(ParagraphType::Name, strip_marker(&previous, FORCE_NAME));
                self.push_speech(&line)
            }
            State::SceneAndNameHint if blank => {
                self.push_scene(&previous);
                State::Empty
            }
            State::SceneAndNameHint => {
                self.push(ParagraphType::Name, &previous);
                self.push_speech(&line)
            }
            State::Parenthetical if blank => State::Empty,
            State::Parenthetical => {
                self.push(ParagraphType::Dialogue, &line);
                State::Dialogue
            }
            State::Dialogue if blank => State::Empty,
            State::Dialogue if is_parenthetical(shape) => self.push_speech(&line),
            State::Dialogue => {
                self.continue_dialogue(&line);
                State::Dialogue
            }
            State::Action if blank => State::Empty,
            State::Action => {
                self.push_action(&line);
                State::Action
            }
        };

        self.previous = line;
    }

    /// End of input resolves a pending hint like a blank line would.
    fn finish(mut self) -> Vec<Paragraph> {
        self.feed("");
        self.paragraphs
    }

    fn push(&mut self, paragraph_type: ParagraphType, text: &str) {
        self.paragraphs.push(Paragraph::new(paragraph_type, text));
    }

    fn push_scene(&mut self, line: &str) {
        self.push(ParagraphType::Scene, strip_marker(line, FORCE_SCENE));
    }

    fn push_action(&mut self, line: &str) {
        self.push(ParagraphType::Action, strip_marker(line, FORCE_ACTION));
    }

    /// A line spoken after a name: a parenthetical or the start of dialogue.
    fn push_speech(&mut self, line: &str) -> State {
        let shape = line.trim();
        if is_parenthetical(shape) {
            let inner = &shape[1..shape.len() - 1];
            self.push(ParagraphType::Parenthetical, inner);
            State::Parenthetical
        } else {
            self.push(ParagraphType::Dialogue, line);
            State::Dialogue
        }
    }

    fn continue_dialogue(&mut self, line: &str) {
        let Some(last) = self.paragraphs.last_mut() else {
            return;
        };
        let merged = format!("{} {}", last.text(), line);
        *last = Paragraph::new(ParagraphType::Dialogue, &merged);
    }
}
