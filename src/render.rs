use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::{
    paragraph::{Paragraph, ParagraphType},
    screenplay::Screenplay,
    theme::Theme,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

/// Lays out every paragraph at its indent. Lines map one to one onto the
/// screenplay's line numbering, blank lines included.
pub fn render_screenplay(screenplay: &Screenplay, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(theme);
    for paragraph in screenplay.paragraphs() {
        renderer.render_paragraph(paragraph);
    }
    renderer.cursor = Some(cursor_position(screenplay));
    renderer.finish()
}

/// Screen position of the cursor. The column stays inside the paragraph's
/// column so a cursor resting on a trailing space is not drawn past it.
pub fn cursor_position(screenplay: &Screenplay) -> CursorVisualPosition {
    let (line, column) = screenplay.cursor_line_column();
    let paragraph = screenplay.cursor_paragraph();
    let format = paragraph.format();

    let offset = screenplay.cursor().offset;
    let line_start = offset - column;
    let width: usize = paragraph
        .text()
        .chars()
        .skip(line_start)
        .take(column)
        .map(char_width)
        .sum();

    CursorVisualPosition {
        line,
        column: clamp_column(format.indent + width.min(format.width)),
    }
}

struct Renderer<'a> {
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    cursor: Option<CursorVisualPosition>,
}

impl<'a> Renderer<'a> {
    fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            cursor: None,
        }
    }

    fn render_paragraph(&mut self, paragraph: &Paragraph) {
        let paragraph_type = paragraph.paragraph_type();
        let format = paragraph.format();
        let style = self.theme.paragraph_style(paragraph_type);

        for _ in 0..format.blank_lines_before {
            self.push_blank_line();
        }

        let lines = paragraph.lines();
        let text_lines = &lines[format.blank_lines_before..];
        let last = text_lines.len() - 1;
        for (idx, text) in text_lines.iter().enumerate() {
            let text = match paragraph_type {
                ParagraphType::Scene => text.to_uppercase(),
                _ => text.clone(),
            };
            let mut spans = Vec::with_capacity(4);
            match paragraph_type {
                ParagraphType::Parenthetical => {
                    let indent = format.indent.saturating_sub(1);
                    spans.push(Span::raw(" ".repeat(indent)));
                    let open = if idx == 0 { "(" } else { " " };
                    spans.push(Span::styled(open, style));
                    spans.push(Span::styled(text, style));
                    if idx == last {
                        spans.push(Span::styled(")", style));
                    }
                }
                _ => {
                    spans.push(Span::raw(" ".repeat(format.indent)));
                    spans.push(Span::styled(text, style));
                }
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.push_blank_line();
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

fn clamp_column(column: usize) -> u16 {
    u16::try_from(column).unwrap_or(u16::MAX)
}

pub fn visible_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

pub fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}
