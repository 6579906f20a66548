use crate::{
    artifact::{Artifact, CompiledMessage},
    layout::{MessageLayout, PageSlot},
    resolver::PAGE_TYPE,
    stubs::{Argument, CallWrapper, DispatchEntry, ReturnShape},
    utils::{const_prefix, escape_rust_keyword},
};

/// Maps an IDL type name (alias or builtin) to the Rust spelling.
fn map_type(type_name: &str) -> String {
    if type_name == PAGE_TYPE {
        "Page".to_string()
    } else {
        escape_rust_keyword(type_name)
    }
}

fn args_list(arguments: &[Argument]) -> String {
    arguments
        .iter()
        .map(|a| format!(", {}: {}", escape_rust_keyword(&a.name), map_type(&a.declared_type)))
        .collect()
}

fn rets_type(returns: &ReturnShape) -> String {
    match returns {
        ReturnShape::Unit             => "()".to_string(),
        ReturnShape::Single(argument) => map_type(&argument.declared_type),
        ReturnShape::Tuple(arguments) => format!(
            "({})",
            arguments
                .iter()
                .map(|a| map_type(&a.declared_type))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Compiles the artifact into the items of one Rust module: constants,
/// frame structs, a `Server` trait with its `dispatch` function, and a
/// `Client`. The output has no inner attributes so it can be pulled in
/// with `include!`; the enclosing module should allow `dead_code` and
/// `unused_imports`.
pub fn compile_artifact_to_rust(artifact: &Artifact) -> String {
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push(format!(
        "// Generated by `stubgen` from interface `{}`. Do not edit.",
        artifact.interface_name
    ));
    rust_code.push("".to_string());
    rust_code.push("use stubgen::{ChannelId, Fault, Header, Msg, Page, Transport};".to_string());
    rust_code.push("".to_string());
    rust_code.push(format!("pub const INTERFACE_ID: u8 = {};", artifact.interface_id));
    rust_code.push(format!("pub const INTERFACE_NAME: &str = \"{}\";", artifact.interface_name));
    rust_code.push("".to_string());

    if !artifact.types.is_empty() {
        rust_code.push("// Types".to_string());
        for alias in &artifact.types {
            rust_code.push("#[allow(non_camel_case_types)]".to_string());
            rust_code.push(format!(
                "pub type {} = {};",
                escape_rust_keyword(&alias.name),
                map_type(&alias.alias_of)
            ));
        }
        rust_code.push("".to_string());
    }

    for message in &artifact.messages {
        rust_code.push(generate_message(message, artifact.word_size));
    }

    rust_code.push(generate_server(&artifact.server.entries));
    rust_code.push(generate_client(&artifact.client.calls));

    rust_code.join("\n")
}

/// Ids, headers and both frame structs of one message.
fn generate_message(message: &CompiledMessage, word_size: usize) -> String {
    let prefix = const_prefix(&message.name);
    let mut lines = Vec::new();

    lines.push(format!("// {} ({:?}, method {})", message.name, message.kind, message.method_id));
    lines.push(format!(
        "pub const {}_REQUEST_ID: u16 = {:#06x};",
        prefix,
        message.request.message_id.raw()
    ));
    lines.push(format!(
        "pub const {}_RESPONSE_ID: u16 = {:#06x};",
        prefix,
        message.response.message_id.raw()
    ));
    lines.push(format!(
        "pub const {}_REQUEST_HEADER: usize = {:#010x};",
        prefix,
        message.request.header.as_usize()
    ));
    lines.push(format!(
        "pub const {}_RESPONSE_HEADER: usize = {:#010x};",
        prefix,
        message.response.header.as_usize()
    ));
    lines.push("".to_string());

    for (layout, suffix) in [(&message.request, "REQUEST"), (&message.response, "RESPONSE")] {
        lines.push(generate_frame(layout, &prefix, suffix, word_size));
    }

    lines.join("\n")
}

fn generate_frame(layout: &MessageLayout, prefix: &str, suffix: &str, word_size: usize) -> String {
    let mut fields = vec![
        "    pub header: Header,".to_string(),
        "    pub from: ChannelId,".to_string(),
    ];
    for slot in &layout.page_slots {
        if let PageSlot::Named(name) = slot {
            fields.push(format!("    pub {}: Page,", escape_rust_keyword(name)));
        }
    }
    fields.push(format!(
        "    __unused_page: [Page; {}],",
        layout.page_slots.len() - layout.page_count()
    ));
    for field in &layout.inline_fields {
        fields.push(format!("    pub {}: {},", escape_rust_keyword(&field.name), field.ty.name()));
    }

    let name = &layout.struct_name;
    let mut lines = Vec::new();
    lines.push("#[repr(C, packed)]".to_string());
    lines.push("#[derive(Clone, Copy)]".to_string());
    lines.push(format!("pub struct {} {{", name));
    lines.extend(fields);
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.push(format!("impl Msg for {} {{", name));
    lines.push(format!("    const ID: u16 = {}_{}_ID;", prefix, suffix));
    lines.push(format!("    const HEADER: usize = {}_{}_HEADER;", prefix, suffix));
    lines.push("".to_string());
    lines.push("    fn sender(&self) -> ChannelId {".to_string());
    lines.push("        self.from".to_string());
    lines.push("    }".to_string());
    lines.push("".to_string());
    lines.push("    fn set_sender(&mut self, from: ChannelId) {".to_string());
    lines.push("        self.from = from;".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());
    // Fails to build when the target word size differs from the compiled one.
    lines.push(format!(
        "const _: () = assert!(core::mem::size_of::<{}>() == stubgen::FIXED_WORDS * {} + {});",
        name,
        word_size,
        layout.inline_len()
    ));
    lines.push(format!(
        "const _: () = assert!(core::mem::size_of::<usize>() == {});",
        word_size
    ));
    lines.push("".to_string());

    lines.join("\n")
}

fn generate_server(entries: &[DispatchEntry]) -> String {
    let mut lines = Vec::new();

    lines.push("// Server".to_string());
    lines.push("pub trait Server {".to_string());
    for entry in entries {
        lines.push(format!(
            "    fn {}(&mut self{}) -> Result<{}, Fault>;",
            escape_rust_keyword(&entry.method),
            args_list(&entry.arguments),
            rets_type(&entry.returns)
        ));
    }
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.push("/// Handles one inbound frame whose header has been peeked.".to_string());
    lines.push("pub fn dispatch<S: Server + ?Sized, T: Transport>(server: &mut S, transport: &T, header: Header) {".to_string());
    lines.push("    match header.msg_id() {".to_string());
    for entry in entries {
        lines.push(generate_dispatch_arm(entry));
    }
    lines.push("        unknown => {".to_string());
    lines.push("            stubgen::log::warn!(\"{}: unknown message id: {:#06x}\", INTERFACE_NAME, unknown);".to_string());
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

fn generate_dispatch_arm(entry: &DispatchEntry) -> String {
    let prefix = const_prefix(&entry.method);
    let method = escape_rust_keyword(&entry.method);
    let call_args = entry
        .arguments
        .iter()
        .map(|a| format!("m.{}", escape_rust_keyword(&a.name)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = Vec::new();
    lines.push(format!("        {}_REQUEST_ID => {{", prefix));
    lines.push(format!("            let m: {} = match transport.receive() {{", entry.request.struct_name));
    lines.push("                Ok(m) => m,".to_string());
    lines.push("                Err(err) => {".to_string());
    lines.push(format!(
        "                    stubgen::log::warn!(\"{{}}: failed to receive {}: {{:?}}\", INTERFACE_NAME, err);",
        entry.method
    ));
    lines.push("                    return;".to_string());
    lines.push("                }".to_string());
    lines.push("            };".to_string());
    lines.push("            let reply_to = m.sender();".to_string());
    lines.push(format!("            match server.{}({}) {{", method, call_args));
    match entry.returns {
        ReturnShape::Unit => lines.push("                Ok(()) => {".to_string()),
        _ => lines.push("                Ok(rets) => {".to_string()),
    }
    lines.push(format!("                    let r = {} {{", entry.response.struct_name));
    lines.push(format!("                        header: Header::from_usize({}_RESPONSE_HEADER),", prefix));
    lines.push("                        from: ChannelId::UNSET,".to_string());
    lines.push(format!(
        "                        __unused_page: [Page::NULL; {}],",
        entry.response.padding_slots
    ));
    match &entry.returns {
        ReturnShape::Unit => {}
        ReturnShape::Single(field) => {
            lines.push(format!("                        {}: rets,", escape_rust_keyword(&field.name)));
        }
        ReturnShape::Tuple(fields) => {
            for (i, field) in fields.iter().enumerate() {
                lines.push(format!("                        {}: rets.{},", escape_rust_keyword(&field.name), i));
            }
        }
    }
    lines.push("                    };".to_string());
    lines.push("                    if let Err(err) = transport.reply(reply_to, r) {".to_string());
    lines.push(format!(
        "                        stubgen::log::warn!(\"{{}}: failed to reply to {}: {{:?}}\", INTERFACE_NAME, err);",
        entry.method
    ));
    lines.push("                    }".to_string());
    lines.push("                }".to_string());
    lines.push("                Err(fault) => {".to_string());
    lines.push(format!(
        "                    if let Err(err) = transport.fault(reply_to, {}_RESPONSE_ID, fault) {{",
        prefix
    ));
    lines.push(format!(
        "                        stubgen::log::warn!(\"{{}}: failed to send fault for {}: {{:?}}\", INTERFACE_NAME, err);",
        entry.method
    ));
    lines.push("                    }".to_string());
    lines.push("                }".to_string());
    lines.push("            }".to_string());
    lines.push("        }".to_string());

    lines.join("\n")
}

fn generate_client(calls: &[CallWrapper]) -> String {
    let mut lines = Vec::new();

    lines.push("// Client".to_string());
    lines.push("pub struct Client<T: Transport> {".to_string());
    lines.push("    server: T,".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.push("impl<T: Transport> Client<T> {".to_string());
    lines.push("    pub fn new(server: T) -> Client<T> {".to_string());
    lines.push("        Client { server }".to_string());
    lines.push("    }".to_string());
    lines.push("".to_string());
    lines.push("    pub fn transport(&self) -> &T {".to_string());
    lines.push("        &self.server".to_string());
    lines.push("    }".to_string());

    for call in calls {
        let prefix = const_prefix(&call.method);

        lines.push("".to_string());
        lines.push(format!(
            "    pub fn {}(&self{}) -> Result<{}, T::Error> {{",
            escape_rust_keyword(&call.method),
            args_list(&call.arguments),
            call.response.struct_name
        ));
        lines.push(format!("        self.server.call({} {{", call.request.struct_name));
        lines.push(format!("            header: Header::from_usize({}_REQUEST_HEADER),", prefix));
        lines.push("            from: ChannelId::UNSET,".to_string());
        lines.push(format!(
            "            __unused_page: [Page::NULL; {}],",
            call.request.padding_slots
        ));
        for argument in &call.arguments {
            lines.push(format!("            {},", escape_rust_keyword(&argument.name)));
        }
        lines.push("        })".to_string());
        lines.push("    }".to_string());
    }

    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_idl;
    use crate::types::Options;

    const BENCH: &str = r#"
        interface bench = 3 {
            type cid = isize;
            type buffer = page;

            rpc ping = 1 () -> (pong: u32);
            rpc read = 2 (fd: cid, buf: buffer) -> (data: buffer, len: usize);
            rpc close = 3 (fd: cid) -> ();
            upcall notify = 4 (type: u8) -> ();
            event tick = 5 (now: usize);
        }
    "#;

    fn render() -> String {
        let (_, artifact) = compile_idl(BENCH, &Options::default()).unwrap();
        compile_artifact_to_rust(&artifact)
    }

    #[test]
    fn test_constants_and_aliases() {
        let code = render();
        assert!(code.contains("pub const INTERFACE_ID: u8 = 3;"));
        assert!(code.contains("pub type cid = isize;"));
        assert!(code.contains("pub type buffer = Page;"));
        assert!(code.contains("pub const PING_REQUEST_ID: u16 = 0x0301;"));
        assert!(code.contains("pub const PING_RESPONSE_ID: u16 = 0x0381;"));
        assert!(code.contains("pub const PING_RESPONSE_HEADER: usize = 0x03810004;"));
        assert!(code.contains("pub const READ_REQUEST_HEADER: usize = 0x03021008;"));
    }

    #[test]
    fn test_frame_struct_layout() {
        let code = render();
        let expected = [
            "#[repr(C, packed)]",
            "#[derive(Clone, Copy)]",
            "pub struct ReadMsg {",
            "    pub header: Header,",
            "    pub from: ChannelId,",
            "    pub buf: Page,",
            "    __unused_page: [Page; 2],",
            "    pub fd: isize,",
            "}",
        ]
        .join("\n");
        assert!(code.contains(&expected), "{}", code);
        assert!(code.contains("const _: () = assert!(core::mem::size_of::<PingResponseMsg>() == stubgen::FIXED_WORDS * 8 + 4);"));
    }

    #[test]
    fn test_server_and_client() {
        let code = render();
        assert!(code.contains("    fn ping(&mut self) -> Result<u32, Fault>;"));
        assert!(code.contains("    fn read(&mut self, fd: cid, buf: buffer) -> Result<(buffer, usize), Fault>;"));
        assert!(code.contains("    fn close(&mut self, fd: cid) -> Result<(), Fault>;"));
        assert!(code.contains("            match server.read(m.fd, m.buf) {"));
        assert!(code.contains("                        data: rets.0,"));
        assert!(code.contains("                        pong: rets,"));
        assert!(code.contains("transport.fault(reply_to, CLOSE_RESPONSE_ID, fault)"));
        assert!(code.contains("    pub fn read(&self, fd: cid, buf: buffer) -> Result<ReadResponseMsg, T::Error> {"));
        assert!(code.contains("            header: Header::from_usize(READ_REQUEST_HEADER),"));
    }

    #[test]
    fn test_upcall_and_event_handling() {
        let code = render();
        // Upcalls get frames but no stubs; events get nothing.
        assert!(code.contains("pub struct NotifyMsg {"));
        assert!(code.contains("    pub type_: u8,"));
        assert!(!code.contains("fn notify"));
        assert!(!code.contains("TICK_"));
        assert!(!code.contains("TickMsg"));
    }

    #[test]
    fn test_reserved_words_are_escaped() {
        let idl = "interface k = 1 { rpc fetch = 1 (box: u8, try: u16) -> (yield: u32); }";
        let (_, artifact) = compile_idl(idl, &Options::default()).unwrap();
        let code = compile_artifact_to_rust(&artifact);
        assert!(code.contains("    pub box_: u8,"));
        assert!(code.contains("    pub try_: u16,"));
        assert!(code.contains("            match server.fetch(m.box_, m.try_) {"));
        assert!(code.contains("                        yield_: rets,"));
        assert!(code.contains("    pub fn fetch(&self, box_: u8, try_: u16) -> Result<FetchResponseMsg, T::Error> {"));
    }
}
