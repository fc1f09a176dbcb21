pub mod stats;
pub mod task;
