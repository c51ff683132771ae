//! Persistence adapters for Covenant timelines.
//!
//! Every store persists whole timeline documents keyed by the timeline's
//! own identifier: a JSON file per timeline, an in-memory map, or a
//! Postgres JSONB table. [`Session`] wraps a store together with the one
//! timeline a caller is working on.

mod file;
mod memory;
mod postgres;
mod session;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use session::Session;
pub use traits::TimelineStore;
