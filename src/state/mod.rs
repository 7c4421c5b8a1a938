/// State management module
///
/// This module handles all client-side state:
/// - Shared data structures (data.rs)
/// - The labeling session: image list, cursor, annotations (session.rs)
/// - Durable local state that survives restarts (store.rs)

pub mod data;
pub mod session;
pub mod store;
