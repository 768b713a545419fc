//! This module defines range-checked types for KNX individual and group
//! addresses, meant to simplify correct usage of the API.

use snafu::{ensure, Snafu};

use core::fmt;

/// Error type for this module
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// The components don't form a valid individual address.
    #[snafu(display("Invalid individual address {}.{}.{}", area, line, member))]
    InvalidIndividualAddress { area: u8, line: u8, member: u8 },
    /// The components don't form a valid three level group address.
    #[snafu(display("Invalid group address {}/{}/{}", main, middle, sub))]
    InvalidGroupAddress { main: u8, middle: u8, sub: u8 },
    /// Payload lengths are limited to what the 4 bit length field can carry.
    #[snafu(display("Invalid payload length {}", length))]
    InvalidPayloadLength { length: usize },
    /// Hours, minutes or seconds out of range.
    #[snafu(display("Invalid time of day {:02}:{:02}:{:02}", hours, minutes, seconds))]
    InvalidTimeOfDay { hours: u8, minutes: u8, seconds: u8 },
}

/// `IndividualAddress` identifies a single device on the bus,
/// written `area.line.member`.
///
/// ## Example
/// ```
/// use knx_tpuart::IndividualAddress;
/// let addr = IndividualAddress::new(1, 1, 5).unwrap();
/// assert_eq!(addr.to_bytes(), [0x11, 0x05]);
/// ```
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash, Default)]
#[repr(transparent)]
pub struct IndividualAddress([u8; 2]);

/// Create a new [`IndividualAddress`], panics if it is out of range.
pub const fn ia(area: u8, line: u8, member: u8) -> IndividualAddress {
    if area <= 0x0F && line <= 0x0F {
        return IndividualAddress([(area << 4) | line, member]);
    }
    panic!("Invalid individual address.")
}

impl IndividualAddress {
    /// Create a new address, checking that area and line fit in four bits.
    /// # Errors
    /// Returns [`Error::InvalidIndividualAddress`] if a component is out of range.
    pub fn new(area: u8, line: u8, member: u8) -> Result<Self, Error> {
        ensure!(
            area <= 0x0F && line <= 0x0F,
            InvalidIndividualAddressSnafu { area, line, member }
        );
        Ok(Self([(area << 4) | line, member]))
    }

    /// Wrap the two on-wire address bytes.
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    pub const fn area(self) -> u8 {
        self.0[0] >> 4
    }

    pub const fn line(self) -> u8 {
        self.0[0] & 0x0F
    }

    pub const fn member(self) -> u8 {
        self.0[1]
    }
}

impl From<[u8; 2]> for IndividualAddress {
    fn from(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for IndividualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.area(), self.line(), self.member())
    }
}

/// `GroupAddress` is a multicast destination, written `main/middle/sub`.
///
/// The all-zero group address `0/0/0` is the broadcast address.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash, Default)]
#[repr(transparent)]
pub struct GroupAddress([u8; 2]);

/// Create a new [`GroupAddress`], panics if it is out of range.
pub const fn ga(main: u8, middle: u8, sub: u8) -> GroupAddress {
    if main <= 0x1F && middle <= 0x07 {
        return GroupAddress([(main << 3) | middle, sub]);
    }
    panic!("Invalid group address.")
}

impl GroupAddress {
    /// The broadcast destination, `0/0/0`.
    pub const BROADCAST: Self = Self([0, 0]);

    /// Create a new three level group address.
    /// # Errors
    /// Returns [`Error::InvalidGroupAddress`] if `main` doesn't fit in five bits
    /// or `middle` doesn't fit in three bits.
    pub fn new(main: u8, middle: u8, sub: u8) -> Result<Self, Error> {
        ensure!(
            main <= 0x1F && middle <= 0x07,
            InvalidGroupAddressSnafu { main, middle, sub }
        );
        Ok(Self([(main << 3) | middle, sub]))
    }

    /// Wrap the two on-wire address bytes.
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    pub const fn main(self) -> u8 {
        self.0[0] >> 3
    }

    pub const fn middle(self) -> u8 {
        self.0[0] & 0x07
    }

    pub const fn sub(self) -> u8 {
        self.0[1]
    }

    pub const fn is_broadcast(self) -> bool {
        self.0[0] == 0 && self.0[1] == 0
    }
}

impl From<[u8; 2]> for GroupAddress {
    fn from(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

/// Destination of a telegram, either a group or a single device.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum Target {
    Group(GroupAddress),
    Individual(IndividualAddress),
}

impl Target {
    pub const fn to_bytes(self) -> [u8; 2] {
        match self {
            Self::Group(addr) => addr.to_bytes(),
            Self::Individual(addr) => addr.to_bytes(),
        }
    }

    pub const fn is_group(self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl From<GroupAddress> for Target {
    fn from(addr: GroupAddress) -> Self {
        Self::Group(addr)
    }
}

impl From<IndividualAddress> for Target {
    fn from(addr: IndividualAddress) -> Self {
        Self::Individual(addr)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(addr) => addr.fmt(f),
            Self::Individual(addr) => addr.fmt(f),
        }
    }
}
