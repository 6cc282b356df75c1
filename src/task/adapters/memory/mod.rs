//! In-memory adapters for tests and local experimentation.

mod notifier;
mod store;

pub use notifier::RecordingNotifier;
pub use store::InMemoryTaskStore;
