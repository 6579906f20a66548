use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MAX_INLINE_LEN, MAX_METHOD_ID, MESSAGE_ID_SHIFT, PAGE_COUNT_SHIFT, PAGE_SLOTS, RESPONSE_BIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Request, Direction::Response];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request  => "request",
            Direction::Response => "response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 16-bit message label: `interface_id << 8 | response bit | method_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u16);

impl MessageId {
    /// Method ids above `MAX_METHOD_ID` are masked to seven bits; callers are
    /// expected to reject them before encoding.
    pub const fn new(interface_id: u8, method_id: u8, direction: Direction) -> MessageId {
        let response = match direction {
            Direction::Request  => 0,
            Direction::Response => RESPONSE_BIT,
        };
        MessageId(((interface_id as u16) << 8) | response | (method_id & MAX_METHOD_ID) as u16)
    }

    pub const fn from_raw(raw: u16) -> MessageId {
        MessageId(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn interface_id(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn method_id(self) -> u8 {
        (self.0 as u8) & MAX_METHOD_ID
    }

    pub const fn is_response(self) -> bool {
        self.0 & RESPONSE_BIT != 0
    }

    pub const fn direction(self) -> Direction {
        if self.is_response() {
            Direction::Response
        } else {
            Direction::Request
        }
    }

    /// The id of the opposite direction of the same method.
    pub const fn counterpart(self) -> MessageId {
        MessageId(self.0 ^ RESPONSE_BIT)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// The self-describing first word of every frame.
///
/// Layout: `message_id << 16 | page_count << 12 | inline_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Header(usize);

impl Header {
    /// Packs without range checks. `page_count` must be at most `PAGE_SLOTS`
    /// and `inline_len` at most `MAX_INLINE_LEN`; see [`Header::checked`].
    pub const fn new(message_id: MessageId, page_count: usize, inline_len: usize) -> Header {
        Header(
            ((message_id.raw() as usize) << MESSAGE_ID_SHIFT)
                | ((page_count & 0xf) << PAGE_COUNT_SHIFT)
                | (inline_len & MAX_INLINE_LEN),
        )
    }

    pub const fn checked(message_id: MessageId, page_count: usize, inline_len: usize) -> Option<Header> {
        if page_count > PAGE_SLOTS || inline_len > MAX_INLINE_LEN {
            None
        } else {
            Some(Header::new(message_id, page_count, inline_len))
        }
    }

    pub const fn from_usize(word: usize) -> Header {
        Header(word)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }

    pub const fn msg_id(self) -> u16 {
        (self.0 >> MESSAGE_ID_SHIFT) as u16
    }

    pub const fn message_id(self) -> MessageId {
        MessageId(self.msg_id())
    }

    pub const fn page_count(self) -> usize {
        (self.0 >> PAGE_COUNT_SHIFT) & 0xf
    }

    pub const fn inline_len(self) -> usize {
        self.0 & MAX_INLINE_LEN
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pages: {}, inline: {})",
            self.message_id(),
            self.page_count(),
            self.inline_len()
        )
    }
}
