// Implementations of the resource catalog store.

pub mod json_store;
pub mod sqlite_store;

pub use json_store::JsonResourceStore;
pub use sqlite_store::SqliteResourceStore;
