//! Line layer driver for the KNX TP-UART bus transceiver.
//!
//! [`TpUart`] turns the byte stream of the transceiver into telegrams and
//! back. It reassembles received frames, decides whether this node is
//! addressed, acknowledges every frame towards the transceiver and confirms
//! numbered control data. Outgoing telegrams are cut into the transceiver's
//! two byte send units, after which the driver waits for the data confirm.
//!
//! The driver is blocking and single threaded. The host calls
//! [`TpUart::poll()`] from its main loop to observe incoming traffic.
//!
//! # Example
//!
//! ```
//! use knx_tpuart::{ga, ia, Event, Transport, TpUart};
//! # use std::collections::VecDeque;
//! # #[derive(Default)]
//! # struct Serial(VecDeque<u8>);
//! # impl Transport for Serial {
//! #     fn write(&mut self, _data: &[u8]) -> std::io::Result<()> { Ok(()) }
//! #     fn available(&mut self) -> usize { self.0.len() }
//! #     fn peek(&mut self) -> Option<u8> { self.0.front().copied() }
//! #     fn read(&mut self) -> Option<u8> { self.0.pop_front() }
//! # }
//! # fn main() -> Result<(), knx_tpuart::Error> {
//! let mut tpuart = TpUart::new(Serial::default(), ia(1, 1, 1));
//! tpuart.add_listen_group_address(ga(0, 0, 3))?;
//!
//! match tpuart.poll()? {
//!     Event::TelegramReceived => {
//!         let telegram = tpuart.received_telegram();
//!         println!("{}", telegram);
//!     }
//!     Event::ResetIndication => println!("transceiver reset"),
//!     _ => {}
//! }
//! # Ok(()) }
//! ```

use snafu::Snafu;

pub mod config;
pub mod filter;
mod link;
mod message;
mod nom_parser;
mod receive;
pub mod telegram;
mod transmit;
pub mod transport;
mod tpuart;
pub mod types;
pub mod value;
pub mod wire;

pub use crate::config::Config;
pub use crate::filter::{AddressFilter, Interest, MAX_LISTEN_GROUP_ADDRESSES};
pub use crate::link::Confirmation;
pub use crate::receive::Event;
pub use crate::telegram::{
    Command, CommunicationType, ControlData, ExtCommand, Priority, Telegram,
};
pub use crate::tpuart::TpUart;
pub use crate::transport::{LinkErrors, Transport};
pub use crate::types::{ga, ia, GroupAddress, IndividualAddress, Target};
pub use crate::value::{TimeOfDay, Weekday};

/// Error type for the driver.
///
/// Timeouts and rejected transmissions are not errors, they are reported
/// through [`Event::ReceiveTimeout`] and [`Confirmation`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Writing to the transport failed.
    #[snafu(display("Transport write failed: {}", source))]
    Io { source: std::io::Error },
    /// The group address listen table has no room left.
    #[snafu(display("Already listening to {} group addresses", capacity))]
    ListenTableFull { capacity: usize },
    /// A value was out of range.
    #[snafu(context(false), display("{}", source))]
    Type { source: types::Error },
}
