//! Access to the fields of a TP1 standard frame.
//!
//! ```text
//! byte 0   control field       1 0 R 1 P P 0 0   (R = 0: repeated, PP = priority)
//! byte 1-2 source address      individual address
//! byte 3-4 target address      group or individual address
//! byte 5   address type / NPCI G C C C L L L L   (G = group, CCC = routing counter,
//!                                                 LLLL = payload length - 1)
//! byte 6   TPCI                T T S S S S D D   (TT = communication type,
//!                                                 SSSS = sequence, DD = control data /
//!                                                 upper command bits)
//! byte 7   APCI                C C F F F F F F   (CC = lower command bits,
//!                                                 FFFFFF = first data byte / ext. command)
//! byte 8.. data
//! last     checksum
//! ```

use core::fmt;

use snafu::ensure;

use crate::types::{
    Error as TypeError, GroupAddress, IndividualAddress, InvalidPayloadLengthSnafu, Target,
};

pub const HEADER_SIZE: usize = 6;
pub const MAX_PAYLOAD_LENGTH: usize = 16;
pub const MAX_TELEGRAM_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_LENGTH + 1;

const CONTROL_DEFAULT: u8 = 0b1011_1100; // standard frame, not repeated, normal priority
const NPCI_DEFAULT: u8 = 0b1110_0001; // group target, routing counter 6, payload length 2

const REPEAT_FLAG: u8 = 0b0010_0000;
const PRIORITY_MASK: u8 = 0b0000_1100;
const GROUP_FLAG: u8 = 0b1000_0000;
const ROUTING_MASK: u8 = 0b0111_0000;
const LENGTH_MASK: u8 = 0b0000_1111;
const COMM_TYPE_MASK: u8 = 0b1100_0000;
const SEQUENCE_MASK: u8 = 0b0011_1100;
const CONTROL_DATA_MASK: u8 = 0b0000_0011;
const FIRST_DATA_MASK: u8 = 0b0011_1111;

/// Payload length announced by the NPCI byte (header byte 5).
pub(crate) const fn payload_length(npci: u8) -> usize {
    (npci & LENGTH_MASK) as usize + 1
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Priority {
    System = 0b00,
    High = 0b01,
    Alarm = 0b10,
    Normal = 0b11,
}

impl Priority {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::System,
            0b01 => Self::High,
            0b10 => Self::Alarm,
            _ => Self::Normal,
        }
    }
}

/// Transport layer communication type, bits 7-6 of the TPCI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CommunicationType {
    /// Unnumbered data packet, plain group and broadcast traffic.
    Udp = 0b00,
    /// Numbered data packet, point-to-point request/response.
    Ndp = 0b01,
    /// Unnumbered control data (connect/disconnect).
    Ucd = 0b10,
    /// Numbered control data, confirmed with the same sequence number.
    Ncd = 0b11,
}

impl CommunicationType {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Udp,
            0b01 => Self::Ndp,
            0b10 => Self::Ucd,
            _ => Self::Ncd,
        }
    }
}

/// Control data carried in UCD/NCD telegrams.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlData {
    Connect = 0b00,
    Disconnect = 0b01,
    PositiveConfirm = 0b10,
    NegativeConfirm = 0b11,
}

impl ControlData {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Connect,
            0b01 => Self::Disconnect,
            0b10 => Self::PositiveConfirm,
            _ => Self::NegativeConfirm,
        }
    }
}

/// Application layer command, four bits spread over TPCI and APCI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Read = 0b0000,
    Answer = 0b0001,
    Write = 0b0010,
    IndividualAddressWrite = 0b0011,
    IndividualAddressRequest = 0b0100,
    IndividualAddressResponse = 0b0101,
    AdcRead = 0b0110,
    AdcAnswer = 0b0111,
    MemoryRead = 0b1000,
    MemoryAnswer = 0b1001,
    MemoryWrite = 0b1010,
    Unknown = 0b1011,
    MaskVersionRead = 0b1100,
    MaskVersionResponse = 0b1101,
    Restart = 0b1110,
    /// The first data byte holds an [`ExtCommand`].
    Escape = 0b1111,
}

impl Command {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b1111 {
            0b0000 => Self::Read,
            0b0001 => Self::Answer,
            0b0010 => Self::Write,
            0b0011 => Self::IndividualAddressWrite,
            0b0100 => Self::IndividualAddressRequest,
            0b0101 => Self::IndividualAddressResponse,
            0b0110 => Self::AdcRead,
            0b0111 => Self::AdcAnswer,
            0b1000 => Self::MemoryRead,
            0b1001 => Self::MemoryAnswer,
            0b1010 => Self::MemoryWrite,
            0b1011 => Self::Unknown,
            0b1100 => Self::MaskVersionRead,
            0b1101 => Self::MaskVersionResponse,
            0b1110 => Self::Restart,
            _ => Self::Escape,
        }
    }
}

/// Extended commands following [`Command::Escape`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtCommand {
    AuthorizeRequest = 0b01_0001,
    AuthorizeResponse = 0b01_0010,
}

/// One telegram in its on-wire layout.
///
/// The buffer always has room for the largest standard frame. Only the
/// first [`total_length()`](Self::total_length) bytes are part of the frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Telegram {
    buffer: [u8; MAX_TELEGRAM_SIZE],
}

impl Default for Telegram {
    fn default() -> Self {
        Self::new()
    }
}

impl Telegram {
    /// An empty group telegram: normal priority, routing counter 6, payload length 2.
    pub const fn new() -> Self {
        let mut buffer = [0; MAX_TELEGRAM_SIZE];
        buffer[0] = CONTROL_DEFAULT;
        buffer[5] = NPCI_DEFAULT;
        Self { buffer }
    }

    /// Copy a received frame. Bytes beyond [`MAX_TELEGRAM_SIZE`] are ignored.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut telegram = Self {
            buffer: [0; MAX_TELEGRAM_SIZE],
        };
        let len = data.len().min(MAX_TELEGRAM_SIZE);
        telegram.buffer[..len].copy_from_slice(&data[..len]);
        telegram
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn buffer_byte(&self, index: usize) -> u8 {
        self.buffer[index]
    }

    pub fn set_buffer_byte(&mut self, index: usize, value: u8) {
        self.buffer[index] = value;
    }

    /// The frame bytes, checksum included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.total_length()]
    }

    /// Data bytes following the APCI byte.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[HEADER_SIZE + 2..]
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.buffer[HEADER_SIZE..HEADER_SIZE + self.payload_length()]
    }

    pub fn is_repeated(&self) -> bool {
        self.buffer[0] & REPEAT_FLAG == 0
    }

    pub fn set_repeated(&mut self, repeated: bool) {
        if repeated {
            self.buffer[0] &= !REPEAT_FLAG;
        } else {
            self.buffer[0] |= REPEAT_FLAG;
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::from_bits(self.buffer[0] >> 2)
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.buffer[0] &= !PRIORITY_MASK;
        self.buffer[0] |= (priority as u8) << 2;
    }

    pub fn source(&self) -> IndividualAddress {
        IndividualAddress::from_bytes([self.buffer[1], self.buffer[2]])
    }

    pub fn set_source(&mut self, source: IndividualAddress) {
        self.buffer[1..3].copy_from_slice(&source.to_bytes());
    }

    pub fn is_target_group(&self) -> bool {
        self.buffer[5] & GROUP_FLAG != 0
    }

    pub fn target(&self) -> Target {
        let bytes = [self.buffer[3], self.buffer[4]];
        if self.is_target_group() {
            Target::Group(GroupAddress::from_bytes(bytes))
        } else {
            Target::Individual(IndividualAddress::from_bytes(bytes))
        }
    }

    pub fn set_target(&mut self, target: impl Into<Target>) {
        let target = target.into();
        self.buffer[3..5].copy_from_slice(&target.to_bytes());
        if target.is_group() {
            self.buffer[5] |= GROUP_FLAG;
        } else {
            self.buffer[5] &= !GROUP_FLAG;
        }
    }

    /// Broadcasts are group telegrams sent to `0/0/0`.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.target(), Target::Group(addr) if addr.is_broadcast())
    }

    pub fn routing_counter(&self) -> u8 {
        (self.buffer[5] & ROUTING_MASK) >> 4
    }

    pub fn set_routing_counter(&mut self, counter: u8) {
        self.buffer[5] &= !ROUTING_MASK;
        self.buffer[5] |= (counter << 4) & ROUTING_MASK;
    }

    /// Number of payload bytes, TPCI and APCI included.
    pub fn payload_length(&self) -> usize {
        payload_length(self.buffer[5])
    }

    /// Set the payload length, checking that it fits in the NPCI length field.
    /// # Errors
    /// Returns [`TypeError::InvalidPayloadLength`] unless `1 <= length <= 16`.
    pub fn try_set_payload_length(&mut self, length: usize) -> Result<(), TypeError> {
        ensure!(
            (1..=MAX_PAYLOAD_LENGTH).contains(&length),
            InvalidPayloadLengthSnafu { length }
        );
        self.buffer[5] &= !LENGTH_MASK;
        self.buffer[5] |= (length - 1) as u8;
        Ok(())
    }

    /// Infallible variant for the fixed lengths used inside the crate.
    pub(crate) fn set_payload_length(&mut self, length: usize) {
        debug_assert!((1..=MAX_PAYLOAD_LENGTH).contains(&length));
        self.buffer[5] &= !LENGTH_MASK;
        self.buffer[5] |= ((length - 1) as u8) & LENGTH_MASK;
    }

    /// Header, payload and checksum.
    pub fn total_length(&self) -> usize {
        HEADER_SIZE + self.payload_length() + 1
    }

    pub fn communication_type(&self) -> CommunicationType {
        CommunicationType::from_bits(self.buffer[6] >> 6)
    }

    pub fn set_communication_type(&mut self, comm_type: CommunicationType) {
        self.buffer[6] &= !COMM_TYPE_MASK;
        self.buffer[6] |= (comm_type as u8) << 6;
    }

    pub fn sequence_number(&self) -> u8 {
        (self.buffer[6] & SEQUENCE_MASK) >> 2
    }

    pub fn set_sequence_number(&mut self, sequence: u8) {
        self.buffer[6] &= !SEQUENCE_MASK;
        self.buffer[6] |= (sequence << 2) & SEQUENCE_MASK;
    }

    pub fn control_data(&self) -> ControlData {
        ControlData::from_bits(self.buffer[6])
    }

    pub fn set_control_data(&mut self, control_data: ControlData) {
        self.buffer[6] &= !CONTROL_DATA_MASK;
        self.buffer[6] |= control_data as u8;
    }

    pub fn command(&self) -> Command {
        Command::from_bits(((self.buffer[6] & 0b11) << 2) | (self.buffer[7] >> 6))
    }

    pub fn set_command(&mut self, command: Command) {
        let bits = command as u8;
        self.buffer[6] &= !0b11;
        self.buffer[6] |= bits >> 2;
        self.buffer[7] &= FIRST_DATA_MASK;
        self.buffer[7] |= (bits & 0b11) << 6;
    }

    /// The six data bits sharing the APCI byte with the command.
    pub fn first_data_byte(&self) -> u8 {
        self.buffer[7] & FIRST_DATA_MASK
    }

    pub fn set_first_data_byte(&mut self, data: u8) {
        self.buffer[7] &= !FIRST_DATA_MASK;
        self.buffer[7] |= data & FIRST_DATA_MASK;
    }

    /// Extended command of an escape telegram.
    pub fn ext_command(&self) -> Option<ExtCommand> {
        if self.command() != Command::Escape {
            return None;
        }
        match self.first_data_byte() {
            x if x == ExtCommand::AuthorizeRequest as u8 => Some(ExtCommand::AuthorizeRequest),
            x if x == ExtCommand::AuthorizeResponse as u8 => Some(ExtCommand::AuthorizeResponse),
            _ => None,
        }
    }

    /// XOR checksum over everything up to the checksum position, inverted.
    pub fn calculate_checksum(&self) -> u8 {
        let checksum_pos = self.total_length() - 1;
        self.buffer[..checksum_pos]
            .iter()
            .fold(0xFF, |bcc, byte| bcc ^ byte)
    }

    pub fn update_checksum(&mut self) {
        let checksum_pos = self.total_length() - 1;
        self.buffer[checksum_pos] = self.calculate_checksum();
    }

    pub fn checksum(&self) -> u8 {
        self.buffer[self.total_length() - 1]
    }

    pub fn verify_checksum(&self) -> bool {
        self.calculate_checksum() == self.checksum()
    }
}

impl fmt::Debug for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telegram")
            .field("bytes", &format_args!("{:02x?}", self.as_bytes()))
            .finish()
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} {:?} prio={:?} repeated={} routing={} len={} {:?} seq={} {:?} data={:02x?} checksum={:#04x} ({})",
            self.source(),
            self.target(),
            self.command(),
            self.priority(),
            self.is_repeated(),
            self.routing_counter(),
            self.payload_length(),
            self.communication_type(),
            self.sequence_number(),
            self.control_data(),
            &self.payload()[1..],
            self.checksum(),
            if self.verify_checksum() { "ok" } else { "invalid" },
        )
    }
}
