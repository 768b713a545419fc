//! The byte stream between host and transceiver.

use std::io;

/// Non-blocking access to the serial line connected to the transceiver.
///
/// Blocking reads with a deadline are built on top of this by the protocol
/// engine, so implementations should return immediately.
pub trait Transport {
    /// Queue `data` for transmission.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Number of received bytes that can be read without waiting.
    fn available(&mut self) -> usize;

    /// The next received byte, without consuming it.
    fn peek(&mut self) -> Option<u8>;

    /// Consume the next received byte.
    fn read(&mut self) -> Option<u8>;

    /// Line errors seen by the UART since the last call. Purely diagnostic.
    fn link_errors(&mut self) -> LinkErrors {
        LinkErrors::default()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write(data)
    }

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn peek(&mut self) -> Option<u8> {
        (**self).peek()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn link_errors(&mut self) -> LinkErrors {
        (**self).link_errors()
    }
}

/// UART status flags.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LinkErrors {
    pub framing: bool,
    pub parity: bool,
    pub overrun: bool,
}

impl LinkErrors {
    pub const fn any(&self) -> bool {
        self.framing || self.parity || self.overrun
    }
}

#[cfg(feature = "serialport")]
pub use self::serial::{open_serial, SerialTransport};

#[cfg(feature = "serialport")]
mod serial {
    use std::io::{self, Read, Write};
    use std::time::Duration;

    use log::warn;
    use serialport::{DataBits, Parity, SerialPort, StopBits};

    use super::Transport;

    const BAUD_RATE: u32 = 19200;

    /// Open `path` with the TP-UART line settings, 19200 baud 8E1.
    pub fn open_serial(path: &str) -> serialport::Result<SerialTransport> {
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::Even)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(1))
            .open()?;
        Ok(SerialTransport::new(port))
    }

    /// [`Transport`] over a `serialport` handle. Peeking is emulated with
    /// a one byte cache.
    pub struct SerialTransport {
        port: Box<dyn SerialPort>,
        peeked: Option<u8>,
    }

    impl SerialTransport {
        pub fn new(port: Box<dyn SerialPort>) -> Self {
            Self { port, peeked: None }
        }

        pub fn into_inner(self) -> Box<dyn SerialPort> {
            self.port
        }

        fn read_port(&mut self) -> Option<u8> {
            let mut buf = [0];
            match self.port.read(&mut buf) {
                Ok(1) => Some(buf[0]),
                Ok(_) => None,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => None,
                Err(e) => {
                    warn!("Serial read failed: {}", e);
                    None
                }
            }
        }
    }

    impl Transport for SerialTransport {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.port.write_all(data)
        }

        fn available(&mut self) -> usize {
            let pending = self.port.bytes_to_read().unwrap_or_else(|e| {
                warn!("Serial status failed: {}", e);
                0
            });
            usize::from(self.peeked.is_some()) + pending as usize
        }

        fn peek(&mut self) -> Option<u8> {
            if self.peeked.is_none() {
                self.peeked = self.read_port();
            }
            self.peeked
        }

        fn read(&mut self) -> Option<u8> {
            self.peeked.take().or_else(|| self.read_port())
        }
    }
}


#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::io;

    use super::Transport;

    /// Scripted receive side, recorded transmit side.
    #[derive(Debug, Default)]
    pub(crate) struct Loopback {
        pub(crate) rx: VecDeque<u8>,
        pub(crate) tx: Vec<u8>,
    }

    impl Loopback {
        pub(crate) fn with_rx(rx: &[u8]) -> Self {
            Self {
                rx: rx.iter().copied().collect(),
                tx: Vec::new(),
            }
        }

        /// The second byte of every send unit.
        pub(crate) fn sent_frame(&self) -> Vec<u8> {
            self.tx.chunks(2).map(|unit| unit[1]).collect()
        }
    }

    impl Transport for Loopback {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn available(&mut self) -> usize {
            self.rx.len()
        }

        fn peek(&mut self) -> Option<u8> {
            self.rx.front().copied()
        }

        fn read(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
    }
}
