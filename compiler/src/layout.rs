use serde::Serialize;
use stubgen_wire::{Direction, Header, MessageId, PAGE_SLOTS};

use crate::{
    classifier::ClassifiedPayloads,
    error::IdlError,
    header::EncodedHeader,
    resolver::Primitive,
    utils::camel_case,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSlot {
    Named(String),
    #[default]
    Padding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineField {
    pub name:   String,
    pub ty:     Primitive,
    /// Byte offset from the start of the inline region.
    pub offset: usize,
    pub size:   usize,
}

/// Physical shape of one frame: header, sender, three page slots, then the
/// inline fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageLayout {
    pub struct_name:   String,
    pub direction:     Direction,
    pub message_id:    MessageId,
    pub header:        Header,
    pub page_slots:    [PageSlot; PAGE_SLOTS],
    pub inline_fields: Vec<InlineField>,
}

/// Field types in frame order, ignoring names. Two layouts with equal
/// shapes decode identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutShape {
    pub page_count: usize,
    pub inline:     Vec<Primitive>,
}

impl MessageLayout {
    pub fn page_count(&self) -> usize {
        self.page_slots
            .iter()
            .filter(|slot| matches!(slot, PageSlot::Named(_)))
            .count()
    }

    pub fn inline_len(&self) -> usize {
        self.inline_fields.iter().map(|f| f.size).sum()
    }

    pub fn named_pages(&self) -> impl Iterator<Item = &str> {
        self.page_slots.iter().filter_map(|slot| match slot {
            PageSlot::Named(name) => Some(name.as_str()),
            PageSlot::Padding     => None,
        })
    }

    pub fn shape(&self) -> LayoutShape {
        LayoutShape {
            page_count: self.page_count(),
            inline:     self.inline_fields.iter().map(|f| f.ty).collect(),
        }
    }
}

pub fn struct_name(message: &str, direction: Direction) -> String {
    match direction {
        Direction::Request  => format!("{}Msg", camel_case(message)),
        Direction::Response => format!("{}ResponseMsg", camel_case(message)),
    }
}

/// Assembles a frame from classified payloads. More pages than slots is
/// `PayloadLimitExceeded`, never a truncated frame.
pub fn build_layout(
    message: &str,
    direction: Direction,
    header: &EncodedHeader,
    payloads: &ClassifiedPayloads,
    word_size: usize,
) -> Result<MessageLayout, IdlError> {
    if payloads.pages.len() > PAGE_SLOTS {
        return Err(IdlError::PayloadLimitExceeded {
            message: message.to_string(),
            direction,
            count: payloads.pages.len(),
        });
    }

    let mut page_slots: [PageSlot; PAGE_SLOTS] = Default::default();
    for (slot, name) in page_slots.iter_mut().zip(&payloads.pages) {
        *slot = PageSlot::Named(name.clone());
    }

    let mut offset = 0;
    let inline_fields = payloads
        .inline
        .iter()
        .map(|payload| {
            let size = payload.ty.size(word_size);
            let field = InlineField {
                name: payload.name.clone(),
                ty: payload.ty,
                offset,
                size,
            };
            offset += size;
            field
        })
        .collect();

    Ok(MessageLayout {
        struct_name: struct_name(message, direction),
        direction,
        message_id: header.message_id,
        header: header.word,
        page_slots,
        inline_fields,
    })
}
