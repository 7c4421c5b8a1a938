/// UI components
///
/// - Status line and progress bar (status.rs)
/// - Image viewer with retry on failure (viewer.rs)
/// - Deduplication result panel (dedupe.rs)

pub mod dedupe;
pub mod status;
pub mod viewer;
