use std::collections::HashMap;

use serde::Serialize;

use crate::{error::IdlError, types::TypeAlias};

/// The reserved type name for an out-of-line page handoff.
pub const PAGE_TYPE: &str = "page";

/// Scalars that are copied into the inline region of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    Usize,
    I8,
    I16,
    I32,
    I64,
    Isize,
    Char,
    Bool,
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::Usize,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::Isize,
        Primitive::Char,
        Primitive::Bool,
    ];

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// The Rust spelling, which is also the IDL spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::U8    => "u8",
            Primitive::U16   => "u16",
            Primitive::U32   => "u32",
            Primitive::U64   => "u64",
            Primitive::Usize => "usize",
            Primitive::I8    => "i8",
            Primitive::I16   => "i16",
            Primitive::I32   => "i32",
            Primitive::I64   => "i64",
            Primitive::Isize => "isize",
            Primitive::Char  => "char",
            Primitive::Bool  => "bool",
        }
    }

    /// Width inside a packed frame on a target with `word_size`-byte words.
    pub fn size(&self, word_size: usize) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 | Primitive::Bool => 1,
            Primitive::U16 | Primitive::I16                 => 2,
            Primitive::U32 | Primitive::I32 | Primitive::Char => 4,
            Primitive::U64 | Primitive::I64                 => 8,
            Primitive::Usize | Primitive::Isize             => word_size,
        }
    }
}

/// What a payload type resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Inline(Primitive),
    Page,
}

pub fn is_builtin(name: &str) -> bool {
    name == PAGE_TYPE || Primitive::from_name(name).is_some()
}

/// Alias table for one interface. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    aliases: HashMap<String, String>,
}

impl TypeResolver {
    /// Fails with `DuplicateType` if an alias is declared twice or shadows a
    /// builtin type name.
    pub fn new(types: &[TypeAlias]) -> Result<TypeResolver, IdlError> {
        let mut aliases = HashMap::with_capacity(types.len());
        for alias in types {
            if is_builtin(&alias.name) || aliases.contains_key(&alias.name) {
                return Err(IdlError::DuplicateType(alias.name.clone()));
            }
            aliases.insert(alias.name.clone(), alias.alias_of.clone());
        }
        Ok(TypeResolver { aliases })
    }

    /// Follows the alias chain of `name` to its terminal type name.
    pub fn canonical<'a>(&'a self, name: &'a str) -> Result<&'a str, IdlError> {
        let mut current = name;
        // Any chain longer than the table revisits an alias.
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next.as_str(),
                None       => return Ok(current),
            }
        }
        Err(IdlError::CyclicAlias(name.to_string()))
    }

    pub fn resolve(&self, name: &str) -> Result<PayloadKind, IdlError> {
        let terminal = self.canonical(name)?;
        if terminal == PAGE_TYPE {
            return Ok(PayloadKind::Page);
        }
        Primitive::from_name(terminal)
            .map(PayloadKind::Inline)
            .ok_or_else(|| IdlError::UnresolvableType(terminal.to_string()))
    }
}
