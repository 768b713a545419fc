#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind};
use std::rc::Rc;
use std::time::Duration;

use knx_tpuart::{Config, IndividualAddress, LinkErrors, Target, Telegram, TpUart, Transport};

/// Simulated transceiver side of the serial line. Received bytes are
/// scripted up front or pushed while the test runs, written bytes are
/// recorded.
pub struct SerialInterface {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    do_write_error: bool,
    writes_before_error: usize,
    link_errors: LinkErrors,
}

pub struct SerialPlane(Rc<RefCell<SerialInterface>>);

impl SerialPlane {
    pub fn new(serial_if: &Rc<RefCell<SerialInterface>>) -> SerialPlane {
        SerialPlane(serial_if.clone())
    }
}

impl SerialInterface {
    pub fn new(rx: &[u8]) -> Rc<RefCell<SerialInterface>> {
        Rc::new(RefCell::new(SerialInterface {
            rx: rx.iter().copied().collect(),
            tx: Vec::new(),
            do_write_error: false,
            writes_before_error: 0,
            link_errors: LinkErrors::default(),
        }))
    }

    pub fn push_rx(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    pub fn rx_remaining(&self) -> Vec<u8> {
        self.rx.iter().copied().collect()
    }

    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    pub fn trigger_write_error(&mut self) {
        self.trigger_write_error_after(0);
    }

    /// Let `writes` more writes succeed, then fail the next one.
    pub fn trigger_write_error_after(&mut self, writes: usize) {
        self.do_write_error = true;
        self.writes_before_error = writes;
    }

    pub fn trigger_link_errors(&mut self, errors: LinkErrors) {
        self.link_errors = errors;
    }
}

impl Transport for SerialPlane {
    fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        let mut inner = self.0.borrow_mut();
        if inner.do_write_error && inner.writes_before_error > 0 {
            inner.writes_before_error -= 1;
            inner.tx.extend_from_slice(data);
            Ok(())
        } else if inner.do_write_error {
            inner.do_write_error = false;
            Err(Error::new(ErrorKind::BrokenPipe, "simulated write error"))
        } else {
            inner.tx.extend_from_slice(data);
            Ok(())
        }
    }

    fn available(&mut self) -> usize {
        self.0.borrow().rx.len()
    }

    fn peek(&mut self) -> Option<u8> {
        self.0.borrow().rx.front().copied()
    }

    fn read(&mut self) -> Option<u8> {
        self.0.borrow_mut().rx.pop_front()
    }

    fn link_errors(&mut self) -> LinkErrors {
        std::mem::take(&mut self.0.borrow_mut().link_errors)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Short timeouts and no settle delay, so tests run fast.
pub fn test_config() -> Config {
    Config::default()
        .with_read_timeout(Duration::from_millis(5))
        .with_poll_interval(Duration::from_micros(100))
        .with_settle_delay(Duration::ZERO)
}

pub fn tpuart(
    rx: &[u8],
    address: IndividualAddress,
) -> (Rc<RefCell<SerialInterface>>, TpUart<SerialPlane>) {
    init_logger();
    let serial_sim = SerialInterface::new(rx);
    let tpuart = TpUart::with_config(SerialPlane::new(&serial_sim), address, test_config());
    (serial_sim, tpuart)
}

/// A checksummed frame as it arrives from the bus.
pub fn frame(
    source: IndividualAddress,
    target: impl Into<Target>,
    build: impl FnOnce(&mut Telegram),
) -> Vec<u8> {
    let mut tg = Telegram::new();
    tg.set_source(source);
    tg.set_target(target);
    build(&mut tg);
    tg.update_checksum();
    tg.as_bytes().to_vec()
}

/// Strip the send unit markers, checking them on the way.
pub fn unpack_units(tx: &[u8]) -> Vec<u8> {
    assert_eq!(tx.len() % 2, 0, "send units come in pairs");
    let count = tx.len() / 2;
    tx.chunks(2)
        .enumerate()
        .map(|(index, unit)| {
            let marker = if index + 1 == count { 0x40 } else { 0x80 };
            assert_eq!(unit[0], marker | index as u8, "marker of unit {}", index);
            unit[1]
        })
        .collect()
}
