use clap::Parser;
use iced::keyboard::{self, Key, Modifiers};
use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod keys;
mod loader;
mod state;
mod sync;
mod ui;

use api::types::{DedupeSummary, ServerCheck};
use api::ApiClient;
use config::{Cli, Config};
use keys::Shortcut;
use state::data::{display_name, Quality};
use state::session::Session;
use state::store::LocalStore;
use sync::AnnotationSync;
use ui::dedupe::DedupePanel;
use ui::status::{progress_view, status_line, Status};
use ui::viewer::{fetch_frame, Frame, Viewer};

/// Main application state
struct LabelTool {
    config: Config,
    client: ApiClient,
    /// Remembers the last folder; `None` if no data directory is available
    store: Option<LocalStore>,
    session: Session,
    sync: AnnotationSync,
    viewer: Viewer,
    dedupe: DedupePanel,
    /// Contents of the folder path field
    folder_input: String,
    /// Status message to display to the user
    status: Status,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    FolderInputChanged(String),
    /// User clicked "Browse..."
    BrowseFolder,
    /// User clicked "Load" or pressed Enter in the folder field
    LoadFolder,
    FolderLoaded {
        folder: String,
        result: Result<Vec<String>, String>,
    },
    ImageRendered {
        ticket: u64,
        result: Result<Frame, String>,
    },
    RetryImage,
    Next,
    Previous,
    Mark(Quality),
    /// Fires a short delay after a mark
    AutoAdvance { epoch: u64 },
    AnnotationsSaved {
        seq: u64,
        result: Result<(), String>,
    },
    Deduplicate,
    Deduplicated(Result<DedupeSummary, String>),
    ServerChecked(ServerCheck),
}

impl LabelTool {
    /// Create a new instance of the application
    fn new(config: Config, client: ApiClient, store: Option<LocalStore>) -> (Self, Task<Message>) {
        let remembered = store.as_ref().and_then(LocalStore::last_folder);
        let startup_folder = config.startup_folder.clone();

        let mut tool = LabelTool {
            folder_input: startup_folder.clone().or(remembered).unwrap_or_default(),
            config,
            client,
            store,
            session: Session::new(),
            sync: AnnotationSync::new(),
            viewer: Viewer::new(),
            dedupe: DedupePanel::default(),
            status: Status::default(),
        };

        let probe = tool.check_server();
        let task = if startup_folder.is_some() {
            Task::batch([probe, tool.load_folder()])
        } else {
            probe
        };

        (tool, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FolderInputChanged(value) => {
                self.folder_input = value;
                Task::none()
            }
            Message::BrowseFolder => {
                // Local picker; the path only means something to a server on this machine
                let folder = FileDialog::new()
                    .set_title("Select Image Folder")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    self.folder_input = folder_path.display().to_string();
                    return self.load_folder();
                }

                Task::none()
            }
            Message::LoadFolder => self.load_folder(),
            Message::FolderLoaded { folder, result } => {
                let outcome = loader::apply(&mut self.session, &folder, result);
                self.status = outcome.status();

                match outcome {
                    loader::LoadOutcome::Loaded(_) => {
                        self.announce_current();
                        self.display_current()
                    }
                    loader::LoadOutcome::Empty => {
                        self.viewer.clear();
                        Task::none()
                    }
                    loader::LoadOutcome::Failed(_) => Task::none(),
                }
            }
            Message::ImageRendered { ticket, result } => {
                match result {
                    Ok(frame) => self.viewer.on_render_success(ticket, frame),
                    Err(e) => self.viewer.on_render_failure(ticket, e),
                };
                Task::none()
            }
            Message::RetryImage => match self.viewer.retry() {
                Some((ticket, path)) => self.fetch(ticket, path),
                None => Task::none(),
            },
            Message::Next => {
                if self.session.next() {
                    self.announce_current();
                    return self.display_current();
                }
                Task::none()
            }
            Message::Previous => {
                if self.session.previous() {
                    self.announce_current();
                    return self.display_current();
                }
                Task::none()
            }
            Message::Mark(quality) => self.mark(quality),
            Message::AutoAdvance { epoch } => {
                if self.session.auto_advance(epoch) {
                    self.announce_current();
                    return self.display_current();
                }
                Task::none()
            }
            Message::AnnotationsSaved { seq, result } => {
                self.sync.acknowledge(seq, result);
                Task::none()
            }
            Message::Deduplicate => {
                self.dedupe.start();
                let client = self.client.clone();

                Task::perform(
                    async move { client.deduplicate().await.map_err(|e| e.to_string()) },
                    Message::Deduplicated,
                )
            }
            Message::Deduplicated(result) => {
                match &result {
                    Ok(summary) => info!(
                        "📊 Deduplication: {} -> {} records ({} removed), written to {}",
                        summary.original_count,
                        summary.deduplicated_count,
                        summary.removed_count,
                        summary.output_file
                    ),
                    Err(e) => warn!("Deduplication failed: {}", e),
                }
                self.dedupe.finish(result);
                Task::none()
            }
            Message::ServerChecked(check) => {
                let warning = match check {
                    ServerCheck::Up(status) => {
                        info!(
                            "✅ Server {} ({})",
                            status.status,
                            status.timestamp.as_deref().unwrap_or("no timestamp")
                        );
                        None
                    }
                    ServerCheck::NoStatusRoute(e) => {
                        debug!("Server reachable, no status route: {}", e);
                        None
                    }
                    ServerCheck::Unreachable(e) => {
                        warn!("Server probe failed: {}", e);
                        Some(format!("Server unreachable at {}: {}", self.client.base_url(), e))
                    }
                };

                // Only replace the startup hint, never something the operator caused
                if let Some(message) = warning {
                    if self.status == Status::default() {
                        self.status = Status::warning(message);
                    }
                }
                Task::none()
            }
        }
    }

    /// Validate the folder field, remember it and ask the server for its images
    fn load_folder(&mut self) -> Task<Message> {
        let Some(folder) = self.begin_load() else {
            return Task::none();
        };

        let client = self.client.clone();
        Task::perform(
            async move {
                let result = client.list_images(&folder).await.map_err(|e| e.to_string());
                (folder, result)
            },
            |(folder, result)| Message::FolderLoaded { folder, result },
        )
    }

    /// The folder to request, or `None` if the field is blank
    fn begin_load(&mut self) -> Option<String> {
        let folder = match loader::validate(&self.folder_input) {
            Ok(folder) => folder,
            Err(e) => {
                self.status = Status::warning(e.to_string());
                return None;
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.set_last_folder(&folder) {
                warn!("Could not remember folder {}: {}", folder, e);
            }
        }

        info!("🔍 Loading images from {}", folder);
        self.status = Status::info("Loading images...");
        Some(folder)
    }

    /// Label the current image, save everything, then step forward after a delay
    fn mark(&mut self, quality: Quality) -> Task<Message> {
        let Some(marked) = self.session.mark(quality) else {
            return Task::none();
        };

        debug!("Marked {} as {}", marked.path, marked.quality);
        self.status = Status::success(format!(
            "Marked \"{}\" as {}",
            display_name(&marked.path),
            marked.quality
        ));

        let (seq, save) = self.sync.persist(&self.client, self.session.annotations());
        let save = Task::perform(save, move |result| Message::AnnotationsSaved { seq, result });

        if !marked.advance {
            return save;
        }

        let delay = self.config.advance_delay;
        let epoch = marked.epoch;
        let advance = Task::perform(
            async move { tokio::time::sleep(delay).await },
            move |_| Message::AutoAdvance { epoch },
        );

        Task::batch([save, advance])
    }

    fn display_current(&mut self) -> Task<Message> {
        let Some(path) = self.session.current_path().map(str::to_string) else {
            self.viewer.clear();
            return Task::none();
        };

        let ticket = self.viewer.display(&path);
        self.fetch(ticket, path)
    }

    fn fetch(&self, ticket: u64, path: String) -> Task<Message> {
        Task::perform(fetch_frame(self.client.clone(), path), move |result| {
            Message::ImageRendered { ticket, result }
        })
    }

    /// Put the current image name (and its label, if any) in the status line
    fn announce_current(&mut self) {
        let Some(path) = self.session.current_path() else {
            return;
        };

        let mut message = format!("Current image: {}", display_name(path));
        if let Some(annotation) = self.session.current_annotation() {
            message.push_str(&format!(" (marked: {})", annotation.quality));
        }
        self.status = Status::info(message);
    }

    fn check_server(&self) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(
            async move { client.check().await },
            Message::ServerChecked,
        )
    }

    /// Keyboard shortcuts only while a session is active
    fn subscription(&self) -> Subscription<Message> {
        if self.session.is_active() {
            keyboard::on_key_press(Self::key_binding)
        } else {
            Subscription::none()
        }
    }

    fn key_binding(key: Key, modifiers: Modifiers) -> Option<Message> {
        keys::shortcut(&key, modifiers).map(|shortcut| match shortcut {
            Shortcut::Next => Message::Next,
            Shortcut::Previous => Message::Previous,
            Shortcut::Mark(quality) => Message::Mark(quality),
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let folder_row = row![
            text_input("Folder path on the server", &self.folder_input)
                .on_input(Message::FolderInputChanged)
                .on_submit(Message::LoadFolder)
                .padding(8),
            button("Browse...").on_press(Message::BrowseFolder).padding(8),
            button("Load").on_press(Message::LoadFolder).padding(8),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let mut content: Column<Message> = column![
            text("Image Labeler").size(32),
            folder_row,
            status_line(&self.status),
        ]
        .spacing(12);

        if let Some(progress) = self.session.progress() {
            content = content.push(progress_view(progress));
        }

        content = content.push(self.viewer.view(Message::RetryImage));

        if self.session.is_active() {
            content = content.push(
                row![
                    button("◀ Previous (k)").on_press(Message::Previous).padding(10),
                    button("Bad (h)").on_press(Message::Mark(Quality::Bad)).padding(10),
                    button("Good (l)").on_press(Message::Mark(Quality::Good)).padding(10),
                    button("Next (j) ▶").on_press(Message::Next).padding(10),
                ]
                .spacing(12),
            );
        }

        let dedupe_button = button("Deduplicate CSV")
            .on_press_maybe((!self.dedupe.is_running()).then_some(Message::Deduplicate))
            .padding(8);

        content = content.push(dedupe_button).push(self.dedupe.view());

        container(content.padding(24))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let store = match LocalStore::open_default() {
        Ok(store) => {
            debug!("Local state at {}", store.path().display());
            Some(store)
        }
        Err(e) => {
            warn!("Last folder will not be remembered: {}", e);
            None
        }
    };

    info!(
        "🏷️  Image Labeler v{} using server {}",
        env!("CARGO_PKG_VERSION"),
        config.server_url
    );

    iced::application("Image Labeler", LabelTool::update, LabelTool::view)
        .theme(LabelTool::theme)
        .subscription(LabelTool::subscription)
        .window_size((1100.0, 860.0))
        .centered()
        .run_with(move || LabelTool::new(config, client, store))
}
