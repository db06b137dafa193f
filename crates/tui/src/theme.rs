use ratatui::style::Color;

pub struct Theme {
    pub border_focus: Color,
    pub border_inactive: Color,
    pub chat_border: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
    pub selected_mark: Color,
    pub citation: Color,
    pub error: Color,
}

pub const THEME: Theme = Theme {
    border_focus: Color::Cyan,
    border_inactive: Color::DarkGray,
    chat_border: Color::DarkGray,
    cursor_fg: Color::Black,
    cursor_bg: Color::Cyan,
    selected_mark: Color::Green,
    citation: Color::DarkGray,
    error: Color::Red,
};
