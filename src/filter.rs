//! Decides which received telegrams this node takes an interest in.

use arrayvec::ArrayVec;
use log::warn;

use crate::telegram::Telegram;
use crate::types::{GroupAddress, IndividualAddress, Target};
use crate::{Error, ListenTableFullSnafu};

/// Capacity of the group address listen table.
pub const MAX_LISTEN_GROUP_ADDRESSES: usize = 15;

/// Own address, listened group addresses and the broadcast switch.
#[derive(Debug, Clone)]
pub struct AddressFilter {
    individual_address: IndividualAddress,
    listen_group_addresses: ArrayVec<GroupAddress, MAX_LISTEN_GROUP_ADDRESSES>,
    listen_to_broadcasts: bool,
}

/// Why a telegram is interesting, one flag per addressing mode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Interest {
    pub group: bool,
    pub individual: bool,
    pub broadcast: bool,
}

impl Interest {
    pub const fn any(&self) -> bool {
        self.group || self.individual || self.broadcast
    }
}

impl AddressFilter {
    pub fn new(individual_address: IndividualAddress) -> Self {
        Self {
            individual_address,
            listen_group_addresses: ArrayVec::new(),
            listen_to_broadcasts: false,
        }
    }

    pub fn individual_address(&self) -> IndividualAddress {
        self.individual_address
    }

    pub fn set_individual_address(&mut self, address: IndividualAddress) {
        self.individual_address = address;
    }

    pub fn listen_to_broadcasts(&self) -> bool {
        self.listen_to_broadcasts
    }

    pub fn set_listen_to_broadcasts(&mut self, listen: bool) {
        self.listen_to_broadcasts = listen;
    }

    /// Start listening to `address`. Adding an address twice is a no-op.
    /// When the table is full the address is not added.
    /// # Errors
    /// Returns [`Error::ListenTableFull`] if the table has no room left.
    pub fn add_listen_group_address(&mut self, address: GroupAddress) -> Result<(), Error> {
        if self.is_listening_to_group_address(address) {
            return Ok(());
        }
        if self.listen_group_addresses.is_full() {
            warn!(
                "Already listening to {} group addresses, cannot listen to {}",
                MAX_LISTEN_GROUP_ADDRESSES, address
            );
            return ListenTableFullSnafu {
                capacity: MAX_LISTEN_GROUP_ADDRESSES,
            }
            .fail();
        }
        self.listen_group_addresses.push(address);
        Ok(())
    }

    pub fn is_listening_to_group_address(&self, address: GroupAddress) -> bool {
        self.listen_group_addresses.contains(&address)
    }

    /// Listened group addresses, in insertion order.
    pub fn listen_group_addresses(&self) -> &[GroupAddress] {
        &self.listen_group_addresses
    }

    pub fn interest(&self, telegram: &Telegram) -> Interest {
        let (group, individual) = match telegram.target() {
            Target::Group(addr) => (self.is_listening_to_group_address(addr), false),
            Target::Individual(addr) => (false, addr == self.individual_address),
        };
        Interest {
            group,
            individual,
            broadcast: self.listen_to_broadcasts && telegram.is_broadcast(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ga, ia};

    fn to(target: impl Into<Target>) -> Telegram {
        let mut tg = Telegram::new();
        tg.set_source(ia(1, 1, 9));
        tg.set_target(target);
        tg
    }

    #[test]
    fn test_group_interest() {
        let mut filter = AddressFilter::new(ia(1, 1, 1));
        let group = GroupAddress::from_bytes([1, 5]);
        assert!(!filter.interest(&to(group)).any());
        filter.add_listen_group_address(group).unwrap();
        assert_eq!(
            filter.interest(&to(group)),
            Interest {
                group: true,
                ..Default::default()
            }
        );
        // same bytes as an individual address don't match the group table
        assert!(!filter.interest(&to(IndividualAddress::from_bytes([1, 5]))).any());
    }

    #[test]
    fn test_individual_interest() {
        let mut filter = AddressFilter::new(ia(1, 1, 1));
        assert!(filter.interest(&to(ia(1, 1, 1))).individual);
        assert!(!filter.interest(&to(ia(1, 1, 2))).any());
        // a group with the same bytes as our own address
        assert!(!filter.interest(&to(GroupAddress::from_bytes([0x11, 0x01]))).any());

        filter.set_individual_address(ia(1, 1, 2));
        assert!(filter.interest(&to(ia(1, 1, 2))).individual);
        assert_eq!(filter.individual_address(), ia(1, 1, 2));
    }

    #[test]
    fn test_broadcast_interest() {
        let mut filter = AddressFilter::new(ia(1, 1, 1));
        let broadcast = to(GroupAddress::BROADCAST);
        assert!(!filter.interest(&broadcast).any());
        filter.set_listen_to_broadcasts(true);
        assert!(filter.listen_to_broadcasts());
        assert!(filter.interest(&broadcast).broadcast);
        assert!(filter.listen_group_addresses().is_empty());
        assert!(!filter.interest(&to(ga(1, 1, 1))).any());
    }

    #[test]
    fn test_listen_table_capacity() {
        let mut filter = AddressFilter::new(ia(1, 1, 1));
        for sub in 0..MAX_LISTEN_GROUP_ADDRESSES as u8 {
            assert!(filter.add_listen_group_address(ga(2, 0, sub)).is_ok());
        }
        assert!(matches!(
            filter.add_listen_group_address(ga(3, 0, 0)),
            Err(Error::ListenTableFull { capacity: 15 })
        ));
        assert!(!filter.is_listening_to_group_address(ga(3, 0, 0)));
        assert_eq!(filter.listen_group_addresses().len(), MAX_LISTEN_GROUP_ADDRESSES);
        // already present, still fine when full
        assert!(filter.add_listen_group_address(ga(2, 0, 4)).is_ok());
        assert_eq!(filter.listen_group_addresses()[4], ga(2, 0, 4));
    }

    #[test]
    fn test_no_duplicates() {
        let mut filter = AddressFilter::new(ia(1, 1, 1));
        filter.add_listen_group_address(ga(1, 0, 1)).unwrap();
        filter.add_listen_group_address(ga(1, 0, 1)).unwrap();
        assert_eq!(filter.listen_group_addresses(), &[ga(1, 0, 1)]);
    }
}
