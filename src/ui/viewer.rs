use iced::widget::image::Handle;
use iced::widget::{button, column, container, text, Image};
use iced::{Alignment, Color, Element, Length};
use tokio::task;
use tracing::warn;

use crate::api::ApiClient;
use crate::state::data::display_name;

/// Decoded pixels ready for the image widget
#[derive(Debug, Clone)]
pub struct Frame {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub enum ViewerState {
    /// No session loaded
    Empty,
    Loading { path: String },
    Shown { path: String, frame: Frame },
    Failed { path: String, error: String },
}

/// Image viewer for the current session image.
///
/// Every `display` hands out a new ticket. Render results are reported back
/// through `on_render_success` / `on_render_failure` with that ticket, and
/// anything but the latest ticket is dropped.
#[derive(Debug)]
pub struct Viewer {
    state: ViewerState,
    ticket: u64,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            state: ViewerState::Empty,
            ticket: 0,
        }
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Start showing `path`; returns the ticket the fetch must report back with
    pub fn display(&mut self, path: &str) -> u64 {
        self.ticket += 1;
        self.state = ViewerState::Loading {
            path: path.to_string(),
        };
        self.ticket
    }

    pub fn clear(&mut self) {
        self.ticket += 1;
        self.state = ViewerState::Empty;
    }

    pub fn on_render_success(&mut self, ticket: u64, frame: Frame) -> bool {
        if ticket != self.ticket {
            return false;
        }
        let ViewerState::Loading { path } = &self.state else {
            return false;
        };
        let path = path.clone();
        self.state = ViewerState::Shown { path, frame };
        true
    }

    pub fn on_render_failure(&mut self, ticket: u64, error: String) -> bool {
        if ticket != self.ticket {
            return false;
        }
        let ViewerState::Loading { path } = &self.state else {
            return false;
        };
        let path = path.clone();
        warn!("Image failed to load: {} ({})", path, error);
        self.state = ViewerState::Failed { path, error };
        true
    }

    /// Re-issue the request for a failed image. No limit, no backoff.
    pub fn retry(&mut self) -> Option<(u64, String)> {
        let ViewerState::Failed { path, .. } = &self.state else {
            return None;
        };
        let path = path.clone();
        let ticket = self.display(&path);
        Some((ticket, path))
    }

    pub fn view<'a, Message: Clone + 'a>(&'a self, on_retry: Message) -> Element<'a, Message> {
        let content: Element<'a, Message> = match &self.state {
            ViewerState::Empty => text("").into(),
            ViewerState::Loading { path } => text(format!("Loading {}...", display_name(path)))
                .size(16)
                .into(),
            ViewerState::Shown { path, frame } => column![
                Image::new(frame.handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill),
                text(format!("{}  ({} × {})", display_name(path), frame.width, frame.height)).size(12),
            ]
            .spacing(4)
            .align_x(Alignment::Center)
            .into(),
            ViewerState::Failed { path, error } => column![
                text("Image failed to load").size(20).color(Color::from_rgb(1.0, 0.35, 0.35)),
                text(format!("Path: {}", path)).size(14),
                text(error).size(14),
                text("Check that the file exists and the server can read it").size(14),
                button("Retry").on_press(on_retry).padding(6),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

/// Fetch an image from the server and decode it off the UI thread
pub async fn fetch_frame(client: ApiClient, path: String) -> Result<Frame, String> {
    let bytes = client.image_bytes(&path).await.map_err(|e| e.to_string())?;

    // Spawn blocking because decoding large images is CPU-intensive
    task::spawn_blocking(move || decode_frame(&bytes))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn decode_frame(bytes: &[u8]) -> Result<Frame, String> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Frame {
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
        width,
        height,
    })
}
