//! stubgen-sdk
//!
//! Runtime contract for source generated by the stubgen compiler.
//!
//! - `Msg`: implemented by every generated frame struct
//! - `Transport`: implemented by the IPC layer the stubs run on
//! - `Fault`: the error a server handler answers a request with
//!
//! Generated code logs through the re-exported `log` facade.

use std::fmt;

pub use log;
pub use stubgen_wire::{ChannelId, Direction, Header, MessageId, Page, FIXED_WORDS, PAGE_SLOTS};

/// Error code a handler returns instead of a response. The transport
/// carries it back to the caller on the response id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("fault {0}")]
pub struct Fault(pub isize);

/// A fixed-layout frame generated from an interface definition.
pub trait Msg: Copy + 'static {
    const ID: u16;
    const HEADER: usize;

    /// Channel the response goes to.
    fn sender(&self) -> ChannelId;

    /// Called by the transport on receipt; generated code leaves the
    /// sender `ChannelId::UNSET`.
    fn set_sender(&mut self, from: ChannelId);

    fn header() -> Header {
        Header::from_usize(Self::HEADER)
    }

    /// Whether an inbound header describes exactly this frame: same id,
    /// page count and inline length.
    fn matches(header: Header) -> bool {
        header == Self::header()
    }
}

/// The synchronous IPC layer the stubs run on.
pub trait Transport {
    type Error: fmt::Debug;

    /// Sends `request` and blocks for the matching response. One call is
    /// one round trip; no retries.
    fn call<Req: Msg, Res: Msg>(&self, request: Req) -> Result<Res, Self::Error>;

    /// Reads the frame whose header the dispatcher is handling.
    fn receive<M: Msg>(&self) -> Result<M, Self::Error>;

    fn reply<M: Msg>(&self, to: ChannelId, response: M) -> Result<(), Self::Error>;

    /// Answers the request on `response_id` with a fault instead of a
    /// response frame.
    fn fault(&self, to: ChannelId, response_id: u16, fault: Fault) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C, packed)]
    #[derive(Clone, Copy)]
    struct EchoMsg {
        header:        Header,
        from:          ChannelId,
        __unused_page: [Page; 3],
        value:         u32,
    }

    const ECHO_REQUEST_ID: MessageId = MessageId::new(3, 1, Direction::Request);

    impl Msg for EchoMsg {
        const ID: u16 = ECHO_REQUEST_ID.raw();
        const HEADER: usize = Header::new(ECHO_REQUEST_ID, 0, 4).as_usize();

        fn sender(&self) -> ChannelId {
            self.from
        }

        fn set_sender(&mut self, from: ChannelId) {
            self.from = from;
        }
    }

    #[test]
    fn test_header_helpers() {
        assert_eq!(EchoMsg::header().msg_id(), 0x0301);
        assert!(EchoMsg::matches(Header::new(ECHO_REQUEST_ID, 0, 4)));
        assert!(!EchoMsg::matches(Header::new(ECHO_REQUEST_ID, 1, 4)));
        assert!(!EchoMsg::matches(Header::new(ECHO_REQUEST_ID.counterpart(), 0, 4)));
    }

    #[test]
    fn test_sender_is_set_explicitly() {
        let mut m = EchoMsg {
            header:        EchoMsg::header(),
            from:          ChannelId::UNSET,
            __unused_page: [Page::NULL; 3],
            value:         7,
        };
        assert!(!m.sender().is_set());
        m.set_sender(ChannelId::from_raw(12));
        assert_eq!(m.sender(), ChannelId::from_raw(12));
        let value = m.value;
        assert_eq!(value, 7);
        assert_eq!(std::mem::size_of::<EchoMsg>(), FIXED_WORDS * std::mem::size_of::<usize>() + 4);
    }

    #[test]
    fn test_fault_display() {
        assert_eq!(Fault(-2).to_string(), "fault -2");
    }
}
