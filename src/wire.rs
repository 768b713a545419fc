//! Single byte services and indications of the TP-UART line protocol.

/// Host request: reset the transceiver.
pub const RESET_REQUEST: u8 = 0x01;
/// Host request: report the transceiver state.
pub const STATE_REQUEST: u8 = 0x02;
/// Transceiver indication after a reset.
pub const RESET_INDICATION: u8 = 0x03;

/// Send unit marker for every frame byte but the last, OR'd with the byte index.
pub const DATA_CONTINUE: u8 = 0x80;
/// Send unit marker for the last frame byte, OR'd with the byte index.
pub const DATA_END: u8 = 0x40;

/// Acknowledge info: the received frame is addressed to us.
pub const ACK: u8 = 0b0001_0001;
/// Acknowledge info: the received frame is not for us.
pub const NOT_ADDRESSED: u8 = 0b0001_0000;

/// Data confirm: the frame was transmitted and acknowledged on the bus.
pub const CONFIRM_POSITIVE: u8 = 0b1000_1011;
/// Data confirm: the transmission failed.
pub const CONFIRM_NEGATIVE: u8 = 0b0000_1011;

const CONTROL_TEMPLATE: u8 = 0b1011_1100;
// repeat flag and priority
const CONTROL_DONT_CARE: u8 = 0b0010_1100;

/// True if `byte` starts a telegram (a standard frame control field).
pub const fn is_control_byte(byte: u8) -> bool {
    (byte | CONTROL_DONT_CARE) == CONTROL_TEMPLATE
}

/// First byte of the send unit for frame byte `index` of a `length` byte frame.
pub(crate) const fn send_unit_marker(index: usize, length: usize) -> u8 {
    let marker = if index + 1 == length {
        DATA_END
    } else {
        DATA_CONTINUE
    };
    marker | (index as u8 & 0x3F)
}
