//! Record ingestion: directory loading, idempotence registry, feed seam.

pub mod feed;
pub mod loader;
pub mod registry;

pub use feed::{DateRange, LiveFeed};
pub use loader::ingest;
pub use registry::{ContentHashRegistry, REGISTRY_FILE_NAME};
