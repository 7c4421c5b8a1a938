use iced::widget::{column, progress_bar, text};
use iced::{Color, Element, Length};

use crate::state::session::Progress;

/// Severity of a status line; picks its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
}

impl Level {
    fn color(self) -> Color {
        match self {
            Level::Info => Color::from_rgb(0.55, 0.75, 1.0),
            Level::Success => Color::from_rgb(0.45, 0.85, 0.45),
            Level::Warning => Color::from_rgb(1.0, 0.7, 0.3),
        }
    }
}

/// One line of feedback shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub level: Level,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Info }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Success }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Warning }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::info("Enter a folder path and press Load")
    }
}

pub fn status_line<'a, Message: 'a>(status: &'a Status) -> Element<'a, Message> {
    text(&status.message)
        .size(16)
        .color(status.level.color())
        .into()
}

/// Progress bar with "i / n" under it
pub fn progress_view<'a, Message: 'a>(progress: Progress) -> Element<'a, Message> {
    column![
        progress_bar(0.0..=100.0, progress.percent()).height(Length::Fixed(8.0)),
        text(progress.label()).size(14),
    ]
    .spacing(4)
    .width(Length::Fill)
    .into()
}
