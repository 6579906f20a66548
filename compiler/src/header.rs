use serde::Serialize;
use stubgen_wire::{Direction, Header, MessageId, MAX_INLINE_LEN, PAGE_SLOTS};

use crate::{classifier::ClassifiedPayloads, error::IdlError};

/// Identity and shape of one message direction, validated against the
/// frame limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodedHeader {
    pub message_id: MessageId,
    pub page_count: usize,
    pub inline_len: usize,
    pub word:       Header,
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderEncoder {
    interface_id: u8,
    word_size:    usize,
}

impl HeaderEncoder {
    pub fn new(interface_id: u8, word_size: usize) -> HeaderEncoder {
        HeaderEncoder { interface_id, word_size }
    }

    pub fn message_id(&self, method_id: u8, direction: Direction) -> MessageId {
        MessageId::new(self.interface_id, method_id, direction)
    }

    /// Fails before any layout exists if the payloads do not fit a frame.
    pub fn encode(
        &self,
        message: &str,
        method_id: u8,
        direction: Direction,
        payloads: &ClassifiedPayloads,
    ) -> Result<EncodedHeader, IdlError> {
        let page_count = payloads.page_count();
        if page_count > PAGE_SLOTS {
            return Err(IdlError::PayloadLimitExceeded {
                message: message.to_string(),
                direction,
                count: page_count,
            });
        }

        let inline_len = payloads.inline_len(self.word_size);
        if inline_len > MAX_INLINE_LEN {
            return Err(IdlError::InlinePayloadTooLarge {
                message: message.to_string(),
                direction,
                len: inline_len,
            });
        }

        let message_id = self.message_id(method_id, direction);
        Ok(EncodedHeader {
            message_id,
            page_count,
            inline_len,
            word: Header::new(message_id, page_count, inline_len),
        })
    }
}
