pub mod app;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod tracker;
pub mod ui;
pub mod view;
pub mod state;

pub use app::router;
pub use state::AppState;
pub use storage::{resolve_data_dir, FileStore, KeyValueStore, MemoryStore};
pub use tracker::HabitTracker;
