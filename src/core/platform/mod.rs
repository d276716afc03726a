pub mod platform_port;

#[cfg(test)]
pub mod recording;

pub use platform_port::{
    ChatPlatform, OutboundMessage, PlatformError, SelectMenuSpec, SelectOption,
    MISSING_PERMISSIONS_CODE,
};
