//! Frame metadata for a fixed-size, page-capable IPC transport.
//!
//! Every frame starts with five machine words: the header word, the sender
//! channel, and three page slots. Inline scalars follow. The header word
//! alone tells a receiver which message arrived and what shape it has:
//!
//! ```
//! use stubgen_wire::*;
//!
//! let id = MessageId::new(3, 1, Direction::Response);
//! assert_eq!(id.raw(), 0x0381);
//!
//! let header = Header::new(id, 0, 4);
//! assert_eq!(header.as_usize(), 0x0381_0004);
//! assert_eq!(header.message_id().method_id(), 1);
//! assert_eq!(header.page_count(), 0);
//! assert_eq!(header.inline_len(), 4);
//! ```

pub mod frame;
pub mod header;

pub use frame::*;
pub use header::*;

/// Number of page slots every frame carries, used or not.
pub const PAGE_SLOTS: usize = 3;

/// Words preceding the inline region: header, sender, page slots.
pub const FIXED_WORDS: usize = 2 + PAGE_SLOTS;

pub const RESPONSE_BIT: u16 = 1 << 7;
pub const MAX_METHOD_ID: u8 = 127;
pub const MAX_INLINE_LEN: usize = 0xfff;

pub const MESSAGE_ID_SHIFT: u32 = 16;
pub const PAGE_COUNT_SHIFT: u32 = 12;
