// Command system core: declarations, the two registries, and the dispatcher.

pub mod command_models;
pub mod command_registry;
pub mod component_registry;
pub mod dispatcher;

pub use command_models::*;
pub use command_registry::{Command, CommandContext, CommandHandler, CommandRegistry};
pub use component_registry::{
    ComponentContext, ComponentHandle, ComponentHandler, ComponentLifetime, ComponentRegistry,
};
pub use dispatcher::{DispatchOutcome, Dispatcher, EventClass, InboundEvent};
