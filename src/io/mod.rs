pub mod config_io;
pub mod lock;
pub mod persist;
pub mod project_io;
pub mod state;
pub mod storage;
pub mod timer;
pub mod watcher;
