use ratatui::style::{Color, Modifier, Style};

use crate::paragraph::ParagraphType;

/// Styles for the page, the status bar and the menu popup.
#[derive(Clone, Debug)]
pub struct Theme {
    pub page: Style,
    pub scene: Style,
    pub name: Style,
    /// Applies to the brackets drawn around the text as well.
    pub parenthetical: Style,

    pub status: Style,
    pub status_file: Style,
    pub status_type: Style,
    pub status_error: Style,

    pub scroll_knob: Style,
    pub scroll_track: Style,

    pub menu: Style,
    pub menu_disabled: Style,
    pub menu_selected: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            page: Style::new().bg(Color::Reset),
            scene: Style::new().add_modifier(Modifier::BOLD),
            name: Style::new(),
            parenthetical: Style::new().fg(Color::Gray),

            status: Style::new().fg(Color::Black).bg(Color::Cyan),
            status_file: Style::new().fg(Color::Blue),
            status_type: Style::new().add_modifier(Modifier::BOLD),
            status_error: Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),

            scroll_knob: Style::new().add_modifier(Modifier::REVERSED),
            scroll_track: Style::new().fg(Color::DarkGray),

            menu: Style::new().fg(Color::White).bg(Color::Black),
            menu_disabled: Style::new().fg(Color::DarkGray),
            menu_selected: Style::new().fg(Color::Black).bg(Color::Cyan),
        }
    }
}

impl Theme {
    pub fn paragraph_style(&self, paragraph_type: ParagraphType) -> Style {
        match paragraph_type {
            ParagraphType::Scene => self.scene,
            ParagraphType::Name => self.name,
            ParagraphType::Parenthetical => self.parenthetical,
            ParagraphType::Action | ParagraphType::Dialogue => Style::new(),
        }
    }
}
