//! Server dispatch and client call descriptions, built from compiled
//! frame layouts.
//!
//! Dispatcher contract, carried by the renderer: each inbound frame is
//! decoded, handled and answered to completion before the next one. A
//! handler fault is answered with a fault reply to the sender. A failed
//! reply send is logged and the dispatcher keeps running. A frame with an
//! unknown message id is logged and dropped without a reply.

use serde::Serialize;
use stubgen_wire::{Header, MessageId};

use crate::{
    error::IdlError,
    layout::MessageLayout,
    resolver::{PayloadKind, TypeResolver},
    types::{Message, Payload},
};

/// Reference to a generated frame struct and its precomputed constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRef {
    pub struct_name:   String,
    pub message_id:    MessageId,
    pub header:        Header,
    /// Unused page slots to zero-fill.
    pub padding_slots: usize,
}

impl From<&MessageLayout> for FrameRef {
    fn from(layout: &MessageLayout) -> Self {
        FrameRef {
            struct_name:   layout.struct_name.clone(),
            message_id:    layout.message_id,
            header:        layout.header,
            padding_slots: layout.page_slots.len() - layout.page_count(),
        }
    }
}

/// A payload as seen by handler and caller signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    pub name:          String,
    /// The type as written in the IDL, alias names included.
    pub declared_type: String,
    pub kind:          PayloadKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnShape {
    Unit,
    Single(Argument),
    Tuple(Vec<Argument>),
}

impl ReturnShape {
    /// Response fields in the order the handler result fills them.
    pub fn fields(&self) -> &[Argument] {
        match self {
            ReturnShape::Unit             => &[],
            ReturnShape::Single(argument) => std::slice::from_ref(argument),
            ReturnShape::Tuple(arguments) => arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    pub method:    String,
    pub request:   FrameRef,
    pub response:  FrameRef,
    pub arguments: Vec<Argument>,
    pub returns:   ReturnShape,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerStub {
    pub entries: Vec<DispatchEntry>,
}

impl ServerStub {
    pub fn entry(&self, request_id: MessageId) -> Option<&DispatchEntry> {
        self.entries.iter().find(|e| e.request.message_id == request_id)
    }
}

/// One synchronous round trip: build the request, call, return the
/// response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallWrapper {
    pub method:    String,
    pub request:   FrameRef,
    pub response:  FrameRef,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientStub {
    pub calls: Vec<CallWrapper>,
}

fn arguments(payloads: &[Payload], resolver: &TypeResolver) -> Result<Vec<Argument>, IdlError> {
    payloads
        .iter()
        .map(|payload| -> Result<Argument, IdlError> {
            Ok(Argument {
                name:          payload.name.clone(),
                declared_type: payload.type_name.clone(),
                kind:          resolver.resolve(&payload.type_name)?,
            })
        })
        .collect()
}

pub fn build_dispatch_entry(
    message: &Message,
    resolver: &TypeResolver,
    request: &MessageLayout,
    response: &MessageLayout,
) -> Result<DispatchEntry, IdlError> {
    let mut returns = arguments(&message.response, resolver)?;
    let returns = match returns.len() {
        0 => ReturnShape::Unit,
        1 => ReturnShape::Single(returns.remove(0)),
        _ => ReturnShape::Tuple(returns),
    };

    Ok(DispatchEntry {
        method:    message.name.clone(),
        request:   request.into(),
        response:  response.into(),
        arguments: arguments(&message.request, resolver)?,
        returns,
    })
}

pub fn build_call_wrapper(
    message: &Message,
    resolver: &TypeResolver,
    request: &MessageLayout,
    response: &MessageLayout,
) -> Result<CallWrapper, IdlError> {
    Ok(CallWrapper {
        method:    message.name.clone(),
        request:   request.into(),
        response:  response.into(),
        arguments: arguments(&message.request, resolver)?,
    })
}
