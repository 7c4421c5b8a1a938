use iced::widget::{column, text};
use iced::{Color, Element};

use crate::api::types::DedupeSummary;

/// Panel showing the last deduplication run.
/// Never touches the labeling session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DedupePanel {
    #[default]
    Hidden,
    Running,
    Done(DedupeSummary),
    Failed(String),
}

impl DedupePanel {
    pub fn start(&mut self) {
        *self = DedupePanel::Running;
    }

    pub fn finish(&mut self, result: Result<DedupeSummary, String>) {
        *self = match result {
            Ok(summary) => DedupePanel::Done(summary),
            Err(e) => DedupePanel::Failed(e),
        };
    }

    pub fn is_running(&self) -> bool {
        matches!(self, DedupePanel::Running)
    }

    /// Lines of text the panel shows
    pub fn lines(&self) -> Vec<String> {
        match self {
            DedupePanel::Hidden => Vec::new(),
            DedupePanel::Running => vec!["Generating deduplicated CSV...".to_string()],
            DedupePanel::Done(summary) => vec![
                "✅ Deduplication complete".to_string(),
                format!("Output file: {}", summary.output_file),
                format!("Original records: {}", summary.original_count),
                format!("After deduplication: {}", summary.deduplicated_count),
                format!("Duplicates removed: {}", summary.removed_count),
                format!("Quality distribution: {}", summary.quality_distribution),
            ],
            DedupePanel::Failed(e) => vec![format!("Deduplication failed: {}", e)],
        }
    }

    pub fn view<'a, Message: 'a>(&self) -> Element<'a, Message> {
        let color = match self {
            DedupePanel::Done(_) => Color::from_rgb(0.45, 0.85, 0.45),
            DedupePanel::Failed(_) => Color::from_rgb(1.0, 0.7, 0.3),
            _ => Color::from_rgb(0.55, 0.75, 1.0),
        };

        let lines: Vec<Element<'a, Message>> = self
            .lines()
            .into_iter()
            .map(|line| text(line).size(14).color(color).into())
            .collect();

        column(lines).spacing(2).into()
    }
}
