pub mod file;
pub mod record;
pub mod snapshot;

pub use file::FileUsage;
pub use record::{FileTally, UsageRecord};
pub use snapshot::{SourceKind, SourceSnapshot, UsageSnapshot};
