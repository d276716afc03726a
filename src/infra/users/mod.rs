// Implementations of the user record store.

#[cfg(test)]
pub mod in_memory;
pub mod json_store;

#[cfg(test)]
pub use in_memory::InMemoryUserStore;
pub use json_store::JsonUserStore;
