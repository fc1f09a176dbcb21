pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod time;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use model::stats::StatusOverview;
pub use model::task::{is_blank, Status, Task, MAX_NOTE_CHARS};
pub use service::task_service::{TaskFeed, TaskService};
pub use store::{Snapshot, TaskStore, WriteTxn};
pub use time::Clock;
