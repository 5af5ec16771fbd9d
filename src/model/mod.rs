pub mod column;
pub mod config;
pub mod defaults;
pub mod task;
pub mod toast;
pub mod workspace;

pub use column::*;
pub use config::*;
pub use task::*;
pub use toast::*;
pub use workspace::*;
