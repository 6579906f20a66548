use std::collections::{HashMap, HashSet};

use stubgen_wire::{Direction, MAX_METHOD_ID};

use crate::{
    error::IdlError,
    layout::struct_name,
    types::Interface,
    utils::{const_prefix, escape_rust_keyword},
};

/// Payload names that collide with the fixed fields of every frame.
pub const RESERVED_NAMES: [&str; 3] = ["header", "from", "__unused_page"];

/// Type names the generated module imports, defines or relies on.
pub const RESERVED_TYPE_NAMES: [&str; 14] = [
    "ChannelId", "Fault", "Header", "Msg", "Page", "Transport",
    "Server", "Client", "Result", "S", "T", "str", "core", "stubgen",
];

/// Inherent methods of the generated client.
pub const RESERVED_METHODS: [&str; 2] = ["new", "transport"];

/// Structural checks that do not need type resolution.
pub fn verify_interface(interface: &Interface) -> Result<(), IdlError> {
    let mut names: HashSet<&str> = HashSet::new();
    let mut method_ids: HashMap<u8, &str> = HashMap::new();

    for message in &interface.messages {
        if !names.insert(&message.name) {
            return Err(IdlError::DuplicateMessage(message.name.clone()));
        }

        if message.attrs.id > MAX_METHOD_ID {
            return Err(IdlError::MethodIdOutOfRange {
                message:   message.name.clone(),
                method_id: message.attrs.id,
            });
        }

        // Only frame-bearing messages occupy the message-id namespace.
        if message.attrs.kind.has_wire_frames() {
            if let Some(first) = method_ids.insert(message.attrs.id, &message.name) {
                return Err(IdlError::DuplicateMessageId {
                    first:     first.to_string(),
                    second:    message.name.clone(),
                    method_id: message.attrs.id,
                });
            }
        }

        for direction in Direction::BOTH {
            // Keyed on the emitted field name: `type` and `type_` are one field.
            let mut seen: HashSet<String> = HashSet::new();
            for payload in message.payloads(direction) {
                if RESERVED_NAMES.contains(&payload.name.as_str()) {
                    return Err(IdlError::ReservedName(payload.name.clone()).in_message(&message.name));
                }
                if !seen.insert(escape_rust_keyword(&payload.name)) {
                    return Err(IdlError::DuplicatePayload {
                        message: message.name.clone(),
                        direction,
                        payload: payload.name.clone(),
                    });
                }
            }
        }
    }

    verify_generated_names(interface)
}

/// Distinct declarations must not map to one Rust item in the generated
/// module.
fn verify_generated_names(interface: &Interface) -> Result<(), IdlError> {
    let mut types: HashMap<String, &str> = HashMap::new();
    let mut consts: HashMap<String, &str> = HashMap::new();
    let mut methods: HashMap<String, &str> = HashMap::new();

    for alias in &interface.types {
        let generated = escape_rust_keyword(&alias.name);
        if RESERVED_TYPE_NAMES.contains(&generated.as_str()) {
            return Err(IdlError::ReservedName(alias.name.clone()));
        }
        claim(&mut types, generated, &alias.name)?;
    }

    for message in &interface.messages {
        let kind = message.attrs.kind;
        if kind.has_wire_frames() {
            for direction in Direction::BOTH {
                claim(&mut types, struct_name(&message.name, direction), &message.name)?;
            }
            claim(&mut consts, const_prefix(&message.name), &message.name)?;
        }
        if kind.has_stubs() {
            let method = escape_rust_keyword(&message.name);
            if RESERVED_METHODS.contains(&method.as_str()) {
                return Err(IdlError::ReservedName(message.name.clone()).in_message(&message.name));
            }
            claim(&mut methods, method, &message.name)?;
        }
    }

    Ok(())
}

/// Records `owner` as the source of `generated`. Repeats of the same
/// declaration are left to the duplicate checks.
fn claim<'a>(
    owners: &mut HashMap<String, &'a str>,
    generated: String,
    owner: &'a str,
) -> Result<(), IdlError> {
    match owners.get(&generated) {
        Some(&first) if first != owner => Err(IdlError::NameCollision {
            first: first.to_string(),
            second: owner.to_string(),
            generated,
        }),
        Some(_) => Ok(()),
        None => {
            owners.insert(generated, owner);
            Ok(())
        }
    }
}
