use serde::Serialize;

use crate::{
    error::IdlError,
    resolver::{PayloadKind, Primitive, TypeResolver},
    types::Payload,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinePayload {
    pub name: String,
    pub ty:   Primitive,
}

/// One direction's payloads split by transport slot, each group in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedPayloads {
    pub pages:  Vec<String>,
    pub inline: Vec<InlinePayload>,
}

impl ClassifiedPayloads {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn inline_len(&self, word_size: usize) -> usize {
        self.inline.iter().map(|p| p.ty.size(word_size)).sum()
    }
}

/// Stable partition of `payloads` into page slots and inline fields.
pub fn classify(payloads: &[Payload], resolver: &TypeResolver) -> Result<ClassifiedPayloads, IdlError> {
    let mut classified = ClassifiedPayloads::default();
    for payload in payloads {
        match resolver.resolve(&payload.type_name)? {
            PayloadKind::Page => classified.pages.push(payload.name.clone()),
            PayloadKind::Inline(ty) => classified.inline.push(InlinePayload {
                name: payload.name.clone(),
                ty,
            }),
        }
    }
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeAlias;

    #[test]
    fn test_partition_preserves_order() {
        let resolver = TypeResolver::new(&[TypeAlias { name: "buf".into(), alias_of: "page".into() }]).unwrap();
        let payloads = vec![
            Payload::new("len", "usize"),
            Payload::new("first", "page"),
            Payload::new("flag", "bool"),
            Payload::new("second", "buf"),
            Payload::new("c", "char"),
        ];
        let classified = classify(&payloads, &resolver).unwrap();

        assert_eq!(classified.pages, vec!["first", "second"]);
        let inline: Vec<(&str, Primitive)> = classified
            .inline
            .iter()
            .map(|p| (p.name.as_str(), p.ty))
            .collect();
        assert_eq!(
            inline,
            vec![("len", Primitive::Usize), ("flag", Primitive::Bool), ("c", Primitive::Char)]
        );
        assert_eq!(classified.page_count(), 2);
        assert_eq!(classified.inline_len(8), 8 + 1 + 4);
        assert_eq!(classified.inline_len(4), 4 + 1 + 4);
    }

    #[test]
    fn test_empty_payloads() {
        let resolver = TypeResolver::default();
        let classified = classify(&[], &resolver).unwrap();
        assert_eq!(classified, ClassifiedPayloads::default());
        assert_eq!(classified.inline_len(8), 0);
    }

    #[test]
    fn test_unresolvable_type_propagates() {
        let resolver = TypeResolver::default();
        let err = classify(&[Payload::new("x", "f64")], &resolver).unwrap_err();
        assert!(matches!(err, IdlError::UnresolvableType(name) if name == "f64"));
    }
}
