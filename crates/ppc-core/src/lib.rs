pub mod feed;
pub mod model;
pub mod sse;

pub use feed::{format_record, LogFeed, LOG_FEED_CAPACITY};
pub use model::{LogLevel, LogRecord, NodeRow, NodesSnapshot, PoolStats, StatusSnapshot, UpdaterStatus};
