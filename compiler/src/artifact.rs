use serde::Serialize;

use crate::{
    layout::MessageLayout,
    stubs::{ClientStub, ServerStub},
    types::MessageKind,
};

/// Everything a renderer needs, fully resolved. Renderers read ids,
/// headers and layouts from here and never recompute them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub interface_name: String,
    pub interface_id:   u8,
    pub word_size:      usize,
    pub types:          Vec<ResolvedAlias>,
    pub messages:       Vec<CompiledMessage>,
    pub server:         ServerStub,
    pub client:         ClientStub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAlias {
    pub name:      String,
    pub alias_of:  String,
    pub canonical: String,
}

/// A frame-bearing (rpc or upcall) message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledMessage {
    pub name:      String,
    pub kind:      MessageKind,
    pub method_id: u8,
    pub request:   MessageLayout,
    pub response:  MessageLayout,
}

impl Artifact {
    pub fn message(&self, name: &str) -> Option<&CompiledMessage> {
        self.messages.iter().find(|m| m.name == name)
    }
}
