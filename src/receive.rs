use arrayvec::ArrayVec;
use log::{debug, warn};

use crate::nom_parser::{parse_frame, FrameToken};
use crate::telegram::{
    payload_length, CommunicationType, Telegram, HEADER_SIZE, MAX_TELEGRAM_SIZE,
};
use crate::tpuart::TpUart;
use crate::transport::Transport;
use crate::wire::{self, ACK, NOT_ADDRESSED, RESET_INDICATION};
use crate::Error;

/// What a call to [`TpUart::poll()`] observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// A telegram addressed to this node. Get it with
    /// [`received_telegram()`](TpUart::received_telegram).
    TelegramReceived,
    /// A complete telegram for some other node.
    IrrelevantTelegram,
    /// The transceiver has been reset.
    ResetIndication,
    /// A telegram started, but the transceiver stopped sending after
    /// `received` bytes. The partial telegram is dropped and not acknowledged.
    ReceiveTimeout { received: usize },
    /// Any other byte from the transceiver, or `None` if nothing was received.
    Unknown(Option<u8>),
}

type FrameStore = ArrayVec<u8, MAX_TELEGRAM_SIZE>;

impl<T: Transport> TpUart<T> {
    /// Handle the next unit of input from the transceiver.
    ///
    /// Consumes a complete telegram when one starts, otherwise a single
    /// byte. Never reads beyond what the reported event needs. A received
    /// telegram is always acknowledged towards the transceiver, and the
    /// telegram stays available until the next call.
    pub fn poll(&mut self) -> Result<Event, Error> {
        let event = if self.link.available() > 0 {
            self.link.check_errors();
            match self.link.peek() {
                Some(byte) if wire::is_control_byte(byte) => self.receive_telegram()?,
                Some(RESET_INDICATION) => {
                    self.link.read_byte();
                    Event::ResetIndication
                }
                Some(_) => Event::Unknown(self.link.read_byte()),
                None => Event::Unknown(None),
            }
        } else {
            Event::Unknown(None)
        };
        debug!("Event {:?}", event);
        Ok(event)
    }

    /// The most recently received telegram.
    ///
    /// Only meaningful after [`poll()`](Self::poll) reported
    /// [`Event::TelegramReceived`] or [`Event::IrrelevantTelegram`].
    pub fn received_telegram(&self) -> &Telegram {
        &self.telegram
    }

    fn receive_telegram(&mut self) -> Result<Event, Error> {
        let mut frame = FrameStore::new();
        loop {
            match parse_frame(&frame) {
                FrameToken::Frame(_) => break,
                FrameToken::NeedData(needed) => {
                    for _ in 0..needed {
                        match self.link.read_byte() {
                            Some(byte) => frame.push(byte), // frame length is bounded by the parser
                            None => {
                                warn!("Telegram incomplete after {} bytes", frame.len());
                                return Ok(Event::ReceiveTimeout {
                                    received: frame.len(),
                                });
                            }
                        }
                    }
                    if frame.len() == HEADER_SIZE {
                        debug!("Payload Length: {}", payload_length(frame[5]));
                    }
                }
            }
        }

        self.telegram = Telegram::from_bytes(&frame);
        debug!("Received {}", self.telegram);
        if !self.telegram.verify_checksum() {
            warn!("Checksum mismatch in telegram from {}", self.telegram.source());
        }

        let interest = self.filter.interest(&self.telegram);
        debug!(
            "Interested GA: {} PA: {} BC: {} target: {}",
            interest.group,
            interest.individual,
            interest.broadcast,
            self.telegram.target()
        );
        let interested = interest.any();

        self.link
            .write_settled(if interested { ACK } else { NOT_ADDRESSED })?;

        match self.telegram.communication_type() {
            CommunicationType::Ucd => debug!("UCD Telegram received"),
            CommunicationType::Ncd => {
                let sequence = self.telegram.sequence_number();
                debug!("NCD Telegram {} received", sequence);
                if interested {
                    // the frame is acknowledged already, still report it
                    if let Err(e) = self.send_ncd_pos_confirm(sequence, self.telegram.source()) {
                        warn!("NCD positive confirm {} not sent: {}", sequence, e);
                    }
                }
            }
            _ => {}
        }

        Ok(if interested {
            Event::TelegramReceived
        } else {
            Event::IrrelevantTelegram
        })
    }
}
