use serde::{Deserialize, Serialize};
use stubgen_wire::Direction;

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name:     String,
    pub attrs:    InterfaceAttrs,
    #[serde(default)]
    pub types:    Vec<TypeAlias>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceAttrs {
    pub id: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name:     String,
    pub alias_of: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Rpc,
    Upcall,
    Event,
}

impl MessageKind {
    /// Whether request/response frames and ids are generated.
    pub fn has_wire_frames(&self) -> bool {
        matches!(self, MessageKind::Rpc | MessageKind::Upcall)
    }

    /// Whether dispatch and call stubs are generated.
    pub fn has_stubs(&self) -> bool {
        matches!(self, MessageKind::Rpc)
    }

    pub fn from_keyword(text: &str) -> Option<MessageKind> {
        match text {
            "rpc"    => Some(MessageKind::Rpc),
            "upcall" => Some(MessageKind::Upcall),
            "event"  => Some(MessageKind::Event),
            _        => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAttrs {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub id:   u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub name:     String,
    pub attrs:    MessageAttrs,
    #[serde(default)]
    pub request:  Vec<Payload>,
    #[serde(default)]
    pub response: Vec<Payload>,
    #[serde(skip)]
    pub line:     usize,
    #[serde(skip)]
    pub column:   usize,
}

impl Message {
    pub fn payloads(&self, direction: Direction) -> &[Payload] {
        match direction {
            Direction::Request  => &self.request,
            Direction::Response => &self.response,
        }
    }
}

/// A named payload; serialized as a `[name, type]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Payload {
    pub name:      String,
    pub type_name: String,
}

impl Payload {
    pub fn new(name: &str, type_name: &str) -> Payload {
        Payload {
            name:      name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

impl From<(String, String)> for Payload {
    fn from((name, type_name): (String, String)) -> Self {
        Payload { name, type_name }
    }
}

impl From<Payload> for (String, String) {
    fn from(payload: Payload) -> Self {
        (payload.name, payload.type_name)
    }
}

/// Target settings that affect layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Options {
    /// Bytes in a machine word (`usize`) on the target.
    pub word_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options { word_size: 8 }
    }
}
