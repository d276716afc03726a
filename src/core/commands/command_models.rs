// Command domain models - platform-agnostic shapes of commands, inbound
// interactions, replies, and the uniform handler failure type.
//
// The Discord layer converts serenity interactions INTO these types and
// converts `Reply` back OUT into interaction responses. Nothing in here
// knows about serenity.

use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// DECLARATIONS
// ============================================================================

/// Platform option kind of a declared argument.
///
/// `String` is the default so an argument declared without a kind is
/// published as a plain text option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArgumentKind {
    #[default]
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Attachment,
}

/// One declared argument of a command. Declarative only - the platform
/// enforces `required`, we never re-validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: ArgumentKind,
}

impl Argument {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            kind: ArgumentKind::default(),
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    pub fn kind(mut self, kind: ArgumentKind) -> Self {
        self.kind = kind;
        self
    }
}

// ============================================================================
// INBOUND
// ============================================================================

/// A typed option value as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    User(u64),
    Channel(u64),
    Role(u64),
    Attachment { url: String, filename: String },
}

/// Guild permissions a command may require from its invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Administrator,
    BanMembers,
    KickMembers,
    ModerateMembers,
    ManageMessages,
}

impl Permission {
    pub fn label(&self) -> &'static str {
        match self {
            Permission::Administrator => "Administrator",
            Permission::BanMembers => "Ban Members",
            Permission::KickMembers => "Kick Members",
            Permission::ModerateMembers => "Moderate Members",
            Permission::ManageMessages => "Manage Messages",
        }
    }
}

/// A slash-command invocation.
///
/// `permissions` holds the invoker's resolved guild permissions, taken
/// straight from the interaction payload, so permission checks need no
/// extra platform round trip.
#[derive(Debug, Clone, Default)]
pub struct CommandInvocation {
    pub name: String,
    pub user_id: u64,
    pub user_name: String,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub options: HashMap<String, OptionValue>,
    pub permissions: Vec<Permission>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>, user_id: u64, channel_id: u64) -> Self {
        Self {
            name: name.into(),
            user_id,
            channel_id,
            ..Default::default()
        }
    }

    pub fn with_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Administrator implies every other permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| *p == permission || *p == Permission::Administrator)
    }

    /// Refuses when the invoker LACKS the permission.
    pub fn require_permission(&self, permission: Permission) -> Result<(), CommandError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(CommandError::PermissionDenied(permission))
        }
    }

    pub fn guild(&self) -> Result<u64, CommandError> {
        self.guild_id.ok_or_else(|| {
            CommandError::Validation("This command only works in servers.".to_string())
        })
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.options.get(name) {
            Some(OptionValue::Integer(i)) => Some(*i),
            Some(OptionValue::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<u64> {
        match self.options.get(name) {
            Some(OptionValue::User(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn attachment(&self, name: &str) -> Option<(&str, &str)> {
        match self.options.get(name) {
            Some(OptionValue::Attachment { url, filename }) => Some((url, filename)),
            _ => None,
        }
    }
}

/// A follow-up interaction on an interactive element (select menu, button).
#[derive(Debug, Clone, Default)]
pub struct ComponentEvent {
    pub custom_id: String,
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub values: Vec<String>,
}

// ============================================================================
// OUTBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbedSpec {
    pub title: String,
    pub description: String,
    pub colour: Option<u32>,
    /// (name, value, inline)
    pub fields: Vec<(String, String, bool)>,
}

impl EmbedSpec {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn colour(mut self, colour: u32) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push((name.into(), value.into(), inline));
        self
    }
}

/// What a handler wants sent back as the interaction response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub content: String,
    pub embed: Option<EmbedSpec>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            ..Default::default()
        }
    }

    pub fn embed(embed: EmbedSpec) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Uniform failure returned by every command and component handler.
///
/// Handlers never build error replies themselves. The dispatcher maps each
/// kind to one user-facing message (see `user_message`).
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing permission: {}", .0.label())]
    PermissionDenied(Permission),

    /// The message is shown to the user verbatim, so it should say how to
    /// fix the input.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("external I/O failed: {0}")]
    Io(String),

    #[error("could not parse {what}: {detail}")]
    Parse { what: String, detail: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn usage(text: impl Into<String>) -> Self {
        CommandError::Validation(text.into())
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            CommandError::PermissionDenied(_) => "permission_denied",
            CommandError::Validation(_) => "validation",
            CommandError::Io(_) => "io",
            CommandError::Parse { .. } => "parse",
            CommandError::Other(_) => "unclassified",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CommandError::PermissionDenied(_) => {
                "You do not have permission to use this command.".to_string()
            }
            CommandError::Validation(message) => message.clone(),
            CommandError::Io(_) => {
                "Sorry, something went wrong on my side. Please try again later.".to_string()
            }
            CommandError::Parse { what, detail } => format!("Failed to parse {}: {}", what, detail),
            CommandError::Other(_) => "An error occurred while running this command.".to_string(),
        }
    }
}

pub type CommandResult = Result<Reply, CommandError>;
