use stubgen_wire::Direction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("invalid type: `{0}'")]
    UnresolvableType(String),

    #[error("type alias `{0}' is part of a cycle")]
    CyclicAlias(String),

    #[error("too many page payloads in the {direction} of `{message}': {count} (at most 3)")]
    PayloadLimitExceeded {
        message:   String,
        direction: Direction,
        count:     usize,
    },

    #[error("inline payloads in the {direction} of `{message}' take {len} bytes (at most 4095)")]
    InlinePayloadTooLarge {
        message:   String,
        direction: Direction,
        len:       usize,
    },

    #[error("messages `{first}' and `{second}' both use method id {method_id}")]
    DuplicateMessageId {
        first:     String,
        second:    String,
        method_id: u8,
    },

    #[error("method id {method_id} of `{message}' is out of range (0..=127)")]
    MethodIdOutOfRange {
        message:   String,
        method_id: u8,
    },

    #[error("the message `{0}' is defined twice")]
    DuplicateMessage(String),

    #[error("the type `{0}' is defined twice")]
    DuplicateType(String),

    #[error("the {direction} of `{message}' declares `{payload}' twice")]
    DuplicatePayload {
        message:   String,
        direction: Direction,
        payload:   String,
    },

    #[error("the name `{0}' is reserved")]
    ReservedName(String),

    #[error("`{first}' and `{second}' both generate `{generated}'")]
    NameCollision {
        first:     String,
        second:    String,
        generated: String,
    },

    #[error("in message `{message}': {source}")]
    InMessage {
        message: String,
        #[source]
        source:  Box<IdlError>,
    },
}

impl IdlError {
    /// Attaches the name of the message being compiled.
    pub fn in_message(self, message: &str) -> IdlError {
        IdlError::InMessage {
            message: message.to_string(),
            source:  Box::new(self),
        }
    }

    /// The underlying error kind with any message context stripped.
    pub fn root(&self) -> &IdlError {
        match self {
            IdlError::InMessage { source, .. } => source.root(),
            other => other,
        }
    }
}
