pub mod resource_models;
pub mod resource_service;

pub use resource_models::{NewResource, Resource, ResourceSearch};
pub use resource_service::{ResourceError, ResourceService, ResourceStore};
