pub mod column_ops;
pub mod filter;
pub mod reminder;
pub mod stats;
pub mod task_ops;
pub mod transfer;
