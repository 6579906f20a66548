// example/src/main.rs

mod bench {
    #![allow(dead_code, unused_imports)]
    include!(concat!(env!("OUT_DIR"), "/bench.rs"));
}

use std::any::Any;
use std::cell::RefCell;

use stubgen::{ChannelId, Fault, Msg, Page, Transport};

use bench::{Client, Server};

#[derive(Debug)]
enum LoopbackError {
    Empty,
    WrongFrame,
    Fault(Fault),
}

/// Runs the server in the caller's thread: `call` hands the request to
/// `bench::dispatch` and picks the reply up from the outbox.
struct Loopback<S> {
    server: RefCell<S>,
    inbox:  RefCell<Option<Box<dyn Any>>>,
    outbox: RefCell<Option<Result<Box<dyn Any>, Fault>>>,
}

impl<S: Server> Loopback<S> {
    fn new(server: S) -> Self {
        Loopback {
            server: RefCell::new(server),
            inbox:  RefCell::new(None),
            outbox: RefCell::new(None),
        }
    }
}

impl<S: Server> Transport for Loopback<S> {
    type Error = LoopbackError;

    fn call<Req: Msg, Res: Msg>(&self, mut request: Req) -> Result<Res, LoopbackError> {
        request.set_sender(ChannelId::from_raw(1));
        *self.inbox.borrow_mut() = Some(Box::new(request));
        bench::dispatch(&mut *self.server.borrow_mut(), self, Req::header());

        match self.outbox.borrow_mut().take() {
            Some(Ok(frame)) => frame
                .downcast::<Res>()
                .map(|frame| *frame)
                .map_err(|_| LoopbackError::WrongFrame),
            Some(Err(fault)) => Err(LoopbackError::Fault(fault)),
            None => Err(LoopbackError::Empty),
        }
    }

    fn receive<M: Msg>(&self) -> Result<M, LoopbackError> {
        let frame = self.inbox.borrow_mut().take().ok_or(LoopbackError::Empty)?;
        frame
            .downcast::<M>()
            .map(|frame| *frame)
            .map_err(|_| LoopbackError::WrongFrame)
    }

    fn reply<M: Msg>(&self, _to: ChannelId, response: M) -> Result<(), LoopbackError> {
        *self.outbox.borrow_mut() = Some(Ok(Box::new(response)));
        Ok(())
    }

    fn fault(&self, _to: ChannelId, _response_id: u16, fault: Fault) -> Result<(), LoopbackError> {
        *self.outbox.borrow_mut() = Some(Err(fault));
        Ok(())
    }
}

#[derive(Default)]
struct BenchServer {
    calls: usize,
}

impl Server for BenchServer {
    fn ping(&mut self, value: u32) -> Result<u32, Fault> {
        self.calls += 1;
        Ok(value + 1)
    }

    fn read(&mut self, fd: bench::cid, buf: bench::buffer, len: usize) -> Result<(bench::buffer, usize), Fault> {
        self.calls += 1;
        if fd < 0 {
            return Err(Fault(-9));
        }
        Ok((buf, len.min(4096)))
    }

    fn fail(&mut self) -> Result<(), Fault> {
        self.calls += 1;
        Err(Fault(-38))
    }
}

fn main() -> Result<(), LoopbackError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = Client::new(Loopback::new(BenchServer::default()));

    let pong = client.ping(41)?;
    let value = pong.value;
    log::info!("ping(41) = {}", value);

    let response = client.read(3, Page::from_raw(0x1000), 10_000)?;
    let (data, read) = (response.data, response.read);
    log::info!("read: page {:#x}, {} bytes", data.raw(), read);

    match client.fail() {
        Err(LoopbackError::Fault(fault)) => log::info!("fail() answered with {}", fault),
        other => log::warn!("fail() unexpectedly returned {:?}", other.map(|_| ())),
    }

    let calls = client.transport().server.borrow().calls;
    log::info!("server handled {} calls", calls);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubgen::Header;

    fn client() -> Client<Loopback<BenchServer>> {
        Client::new(Loopback::new(BenchServer::default()))
    }

    #[test]
    fn test_ping_round_trip() {
        let client = client();
        let pong = client.ping(1).unwrap();
        let (value, header, from) = (pong.value, pong.header, pong.from);
        assert_eq!(value, 2);
        assert_eq!(header, bench::PingResponseMsg::header());
        assert_eq!(header.msg_id(), 0x0381);
        assert_eq!(from, ChannelId::UNSET);
    }

    #[test]
    fn test_page_payloads_travel_in_slots() {
        let client = client();
        let response = client.read(3, Page::from_raw(0x2000), 16).unwrap();
        let (data, read) = (response.data, response.read);
        assert_eq!(data, Page::from_raw(0x2000));
        assert_eq!(read, 16);
        assert_eq!(bench::ReadMsg::header().page_count(), 1);
        assert_eq!(bench::READ_REQUEST_ID, 0x0302);
    }

    #[test]
    fn test_handler_fault_is_replied() {
        let client = client();
        assert!(matches!(client.fail(), Err(LoopbackError::Fault(Fault(-38)))));
        assert!(matches!(
            client.read(-1, Page::NULL, 1),
            Err(LoopbackError::Fault(Fault(-9)))
        ));
    }

    #[test]
    fn test_unknown_message_is_dropped() {
        let loopback = Loopback::new(BenchServer::default());
        let unknown = Header::from_usize(0x0305_0000);
        bench::dispatch(&mut *loopback.server.borrow_mut(), &loopback, unknown);
        assert!(loopback.outbox.borrow().is_none());
        assert_eq!(loopback.server.borrow().calls, 0);
    }

    #[test]
    fn test_upcall_frames_exist_without_stubs() {
        assert_eq!(bench::NOTIFY_REQUEST_ID, 0x0304);
        assert_eq!(bench::NotifyMsg::header().inline_len(), 4);
        assert_eq!(bench::INTERFACE_ID, 3);
    }
}
