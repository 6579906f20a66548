use serde::{Deserialize, Serialize};

/// Addressable transport endpoint. Replies go to the channel named in a
/// frame's sender field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ChannelId(isize);

impl ChannelId {
    /// Placeholder until the transport fills in the sender.
    pub const UNSET: ChannelId = ChannelId(0);

    pub const fn from_raw(cid: isize) -> ChannelId {
        ChannelId(cid)
    }

    pub const fn raw(self) -> isize {
        self.0
    }

    pub const fn is_set(self) -> bool {
        self.0 != 0
    }
}

/// Handle to an out-of-line page handed off through a frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Page(usize);

impl Page {
    pub const NULL: Page = Page(0);

    pub const fn from_raw(addr: usize) -> Page {
        Page(addr)
    }

    pub const fn raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FIXED_WORDS;

    #[test]
    fn test_fixed_fields_are_single_words() {
        assert_eq!(std::mem::size_of::<ChannelId>(), std::mem::size_of::<usize>());
        assert_eq!(std::mem::size_of::<Page>(), std::mem::size_of::<usize>());
        assert_eq!(
            std::mem::size_of::<crate::Header>() + std::mem::size_of::<ChannelId>()
                + 3 * std::mem::size_of::<Page>(),
            FIXED_WORDS * std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_defaults_are_zeroed() {
        assert_eq!(ChannelId::default(), ChannelId::UNSET);
        assert!(!ChannelId::UNSET.is_set());
        assert!(Page::default().is_null());
    }
}
