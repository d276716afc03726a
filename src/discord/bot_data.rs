// Application data shared by every command and component handler.

use crate::core::commands::{
    CommandContext, CommandRegistry, ComponentContext, ComponentRegistry, Dispatcher,
};
use crate::core::platform::ChatPlatform;
use crate::core::quiz::QuizBoard;
use crate::core::resources::ResourceService;
use crate::core::users::UserService;
use std::sync::Arc;

pub struct BotData {
    pub users: UserService,
    pub resources: ResourceService,
    pub quiz: QuizBoard,
    pub platform: Arc<dyn ChatPlatform>,
}

pub type Commands = CommandRegistry<BotData>;
pub type Components = ComponentRegistry<BotData>;
pub type BotDispatcher = Dispatcher<BotData>;
pub type Context<'a> = CommandContext<'a, BotData>;
pub type ComponentCtx<'a> = ComponentContext<'a, BotData>;
