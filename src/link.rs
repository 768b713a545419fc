//! Blocking byte level access to the transceiver, with deadlines.

use std::thread;
use std::time::Instant;

use log::{debug, trace, warn};
use snafu::ResultExt;

use crate::config::Config;
use crate::telegram::Telegram;
use crate::transport::Transport;
use crate::wire::{self, CONFIRM_NEGATIVE, CONFIRM_POSITIVE};
use crate::{Error, IoSnafu};

/// Outcome of transmitting one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The transceiver reported a successful transmission.
    Accepted,
    /// The transceiver reported a failed transmission.
    Rejected,
    /// No confirmation arrived within the read timeout.
    TimedOut,
}

impl Confirmation {
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl From<Confirmation> for bool {
    fn from(confirmation: Confirmation) -> Self {
        confirmation.is_accepted()
    }
}

#[derive(Debug)]
pub(crate) struct Link<T> {
    transport: T,
    pub(crate) config: Config,
}

impl<T: Transport> Link<T> {
    pub(crate) fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub(crate) fn into_transport(self) -> T {
        self.transport
    }

    pub(crate) fn available(&mut self) -> usize {
        self.transport.available()
    }

    pub(crate) fn peek(&mut self) -> Option<u8> {
        self.transport.peek()
    }

    /// Report UART errors. Never affects the protocol.
    pub(crate) fn check_errors(&mut self) {
        let errors = self.transport.link_errors();
        if !errors.any() {
            return;
        }
        if errors.overrun {
            warn!("Overrun");
        }
        if errors.framing {
            warn!("Frame Error");
        }
        if errors.parity {
            warn!("Parity Error");
        }
    }

    /// Wait up to the read timeout for one byte. Returns `None` on timeout.
    pub(crate) fn read_byte(&mut self) -> Option<u8> {
        let start = Instant::now();
        while self.transport.available() == 0 {
            if start.elapsed() > self.config.read_timeout {
                debug!("Timeout while receiving message");
                return None;
            }
            thread::sleep(self.config.poll_interval);
        }
        let byte = self.transport.read();
        self.check_errors();
        if let Some(byte) = byte {
            trace_byte(byte);
        }
        byte
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.transport.write(data).context(IoSnafu)
    }

    /// Write a single service or acknowledge byte and keep the line quiet afterwards.
    pub(crate) fn write_settled(&mut self, byte: u8) -> Result<(), Error> {
        let result = self.write(&[byte]);
        self.settle();
        result
    }

    /// Send `telegram` unit by unit and wait for the data confirm.
    pub(crate) fn transmit(&mut self, telegram: &Telegram) -> Result<Confirmation, Error> {
        let result = self.send_units(telegram).map(|_| self.wait_confirmation());
        self.settle();
        result
    }

    fn send_units(&mut self, telegram: &Telegram) -> Result<(), Error> {
        let frame = telegram.as_bytes();
        for (index, byte) in frame.iter().enumerate() {
            let unit = [wire::send_unit_marker(index, frame.len()), *byte];
            trace!("Send unit {:#04x} {:#04x}", unit[0], unit[1]);
            self.write(&unit)?;
        }
        Ok(())
    }

    fn wait_confirmation(&mut self) -> Confirmation {
        loop {
            match self.read_byte() {
                Some(CONFIRM_POSITIVE) => {
                    debug!("Telegram sent");
                    return Confirmation::Accepted;
                }
                Some(CONFIRM_NEGATIVE) => {
                    warn!("Transceiver rejected the telegram");
                    return Confirmation::Rejected;
                }
                Some(other) => debug!("Skipping {:#04x} while waiting for confirmation", other),
                None => {
                    warn!("No confirmation for the telegram");
                    return Confirmation::TimedOut;
                }
            }
        }
    }

    fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            thread::sleep(self.config.settle_delay);
        }
    }
}

fn trace_byte(byte: u8) {
    trace!("Incoming Byte: {0} - {0:#04x} - {0:#010b}", byte);
}
