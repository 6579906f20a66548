use log::{debug, trace};
use stubgen_wire::Direction;

use crate::{
    artifact::{Artifact, CompiledMessage, ResolvedAlias},
    classifier::classify,
    error::IdlError,
    header::HeaderEncoder,
    layout::{build_layout, MessageLayout},
    parser::parse_idl,
    resolver::TypeResolver,
    stubs::{build_call_wrapper, build_dispatch_entry, ClientStub, ServerStub},
    tokenizer::tokenize_idl,
    types::{Interface, Message, Options},
    verifier::verify_interface,
};

/// Compile IDL text into `(Interface, Artifact)`.
/// Returns `Err(IdlError)` if tokenization, parsing, verification or any
/// semantic stage fails; nothing partial is returned.
pub fn compile_idl(text: &str, options: &Options) -> Result<(Interface, Artifact), IdlError> {
    let tokens = tokenize_idl(text)?;
    debug!("tokenized {} tokens", tokens.len());
    let interface = parse_idl(&tokens)?;
    let artifact = compile_interface(&interface, options)?;
    Ok((interface, artifact))
}

/// Compile a structured interface given as JSON (the parser's output form).
pub fn compile_json(text: &str, options: &Options) -> Result<(Interface, Artifact), IdlError> {
    let interface: Interface = serde_json::from_str(text)?;
    let artifact = compile_interface(&interface, options)?;
    Ok((interface, artifact))
}

/// Resolve, classify, encode and lay out every frame-bearing message of
/// `interface`, then build the server and client stub descriptions.
pub fn compile_interface(interface: &Interface, options: &Options) -> Result<Artifact, IdlError> {
    debug!(
        "compiling interface `{}' (id {}, {} types, {} messages)",
        interface.name,
        interface.attrs.id,
        interface.types.len(),
        interface.messages.len()
    );

    verify_interface(interface)?;
    let resolver = TypeResolver::new(&interface.types)?;

    let types = interface
        .types
        .iter()
        .map(|alias| -> Result<ResolvedAlias, IdlError> {
            // Every alias is emitted, so each must end at a builtin even if unused.
            resolver.resolve(&alias.name)?;
            Ok(ResolvedAlias {
                name:      alias.name.clone(),
                alias_of:  alias.alias_of.clone(),
                canonical: resolver.canonical(&alias.name)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let encoder = HeaderEncoder::new(interface.attrs.id, options.word_size);
    let mut messages = Vec::new();
    let mut server   = ServerStub::default();
    let mut client   = ClientStub::default();

    for message in &interface.messages {
        if !message.attrs.kind.has_wire_frames() {
            trace!("skipping {:?} message `{}'", message.attrs.kind, message.name);
            continue;
        }

        let request  = compile_direction(message, Direction::Request, &resolver, &encoder, options)?;
        let response = compile_direction(message, Direction::Response, &resolver, &encoder, options)?;

        if message.attrs.kind.has_stubs() {
            server.entries.push(
                build_dispatch_entry(message, &resolver, &request, &response)
                    .map_err(|e| e.in_message(&message.name))?,
            );
            client.calls.push(
                build_call_wrapper(message, &resolver, &request, &response)
                    .map_err(|e| e.in_message(&message.name))?,
            );
        }

        messages.push(CompiledMessage {
            name:      message.name.clone(),
            kind:      message.attrs.kind,
            method_id: message.attrs.id,
            request,
            response,
        });
    }

    debug!(
        "compiled {} frame-bearing messages, {} dispatch entries",
        messages.len(),
        server.entries.len()
    );

    Ok(Artifact {
        interface_name: interface.name.clone(),
        interface_id:   interface.attrs.id,
        word_size:      options.word_size,
        types,
        messages,
        server,
        client,
    })
}

fn compile_direction(
    message: &Message,
    direction: Direction,
    resolver: &TypeResolver,
    encoder: &HeaderEncoder,
    options: &Options,
) -> Result<MessageLayout, IdlError> {
    let classified = classify(message.payloads(direction), resolver)
        .map_err(|e| e.in_message(&message.name))?;
    let header = encoder.encode(&message.name, message.attrs.id, direction, &classified)?;
    trace!("{} {}: {}", message.name, direction, header.word);
    build_layout(&message.name, direction, &header, &classified, options.word_size)
}
