use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Rgb(0x14, 0x17, 0x1f);
    pub const BG_SURFACE: Color = Color::Rgb(0x1f, 0x24, 0x30);
    pub const ACCENT: Color = Color::Rgb(0xff, 0x4f, 0x40);
    pub const SUCCESS: Color = Color::Rgb(0x41, 0xbf, 0x53);
    pub const DANGER: Color = Color::Rgb(0xed, 0x6d, 0x47);
    pub const MUTED: Color = Color::Rgb(0x8e, 0x96, 0xa4);

    pub fn background() -> Style {
        Style::default().bg(Self::BG)
    }

    pub fn surface() -> Style {
        Style::default().bg(Self::BG_SURFACE).fg(Color::White)
    }

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn border_type() -> BorderType {
        BorderType::Rounded
    }

    pub fn title() -> Style {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn amount(value: f64) -> Style {
        if value < 0.0 {
            Style::default().fg(Self::DANGER)
        } else {
            Style::default().fg(Self::SUCCESS)
        }
    }

    pub fn toast(success: bool) -> Style {
        let bg = if success { Self::SUCCESS } else { Self::DANGER };
        Style::default()
            .fg(Color::White)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }
}
