use crossterm::style::{Color, Stylize};

#[derive(Debug, Clone)]
pub struct Theme {
    pub opening: Option<Color>,
    pub assistant: Option<Color>,
    pub user: Option<Color>,
    pub muted: Option<Color>,
    pub success: Option<Color>,
    pub error: Option<Color>,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            opening: Some(Color::Rgb { r: 187, g: 154, b: 247 }),
            assistant: Some(Color::Rgb { r: 158, g: 206, b: 106 }),
            user: Some(Color::Cyan),
            muted: Some(Color::DarkGrey),
            success: Some(Color::Rgb { r: 115, g: 218, b: 202 }),
            error: Some(Color::Rgb { r: 247, g: 118, b: 142 }),
        }
    }

    pub fn light() -> Self {
        Self {
            opening: Some(Color::DarkMagenta),
            assistant: Some(Color::DarkGreen),
            user: Some(Color::DarkBlue),
            muted: Some(Color::Grey),
            success: Some(Color::DarkCyan),
            error: Some(Color::DarkRed),
        }
    }

    /// No escape codes at all, for pipes and `NO_COLOR`.
    pub fn plain() -> Self {
        Self {
            opening: None,
            assistant: None,
            user: None,
            muted: None,
            success: None,
            error: None,
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "plain" | "none" => Self::plain(),
            _ => Self::dark(),
        }
    }

    pub fn paint(&self, text: &str, color: Option<Color>) -> String {
        match color {
            Some(color) => text.with(color).to_string(),
            None => text.to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
