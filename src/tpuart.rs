use crate::config::Config;
use crate::filter::AddressFilter;
use crate::link::Link;
use crate::telegram::Telegram;
use crate::transport::Transport;
use crate::types::{GroupAddress, IndividualAddress};
use crate::wire::{RESET_REQUEST, STATE_REQUEST};
use crate::Error;

/// One bus node attached through a TP-UART transceiver.
///
/// Owns the transport, the addressing configuration and two telegram
/// buffers: one for received and outgoing application telegrams, and one
/// used only for the positive confirmations of numbered control data, so a
/// confirmation never disturbs the application telegram.
#[derive(Debug)]
pub struct TpUart<T> {
    pub(crate) link: Link<T>,
    pub(crate) filter: AddressFilter,
    pub(crate) telegram: Telegram,
    pub(crate) confirm: Telegram,
}

impl<T: Transport> TpUart<T> {
    /// Create a driver for the node with address `address`, using the default timing.
    pub fn new(transport: T, address: IndividualAddress) -> Self {
        Self::with_config(transport, address, Config::default())
    }

    pub fn with_config(transport: T, address: IndividualAddress, config: Config) -> Self {
        Self {
            link: Link::new(transport, config),
            filter: AddressFilter::new(address),
            telegram: Telegram::new(),
            confirm: Telegram::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.link.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.link.config = config;
    }

    pub fn individual_address(&self) -> IndividualAddress {
        self.filter.individual_address()
    }

    pub fn set_individual_address(&mut self, address: IndividualAddress) {
        self.filter.set_individual_address(address);
    }

    pub fn listen_to_broadcasts(&self) -> bool {
        self.filter.listen_to_broadcasts()
    }

    /// Take interest in broadcast telegrams, e.g. while in programming mode.
    pub fn set_listen_to_broadcasts(&mut self, listen: bool) {
        self.filter.set_listen_to_broadcasts(listen);
    }

    /// # Errors
    /// Returns [`Error::ListenTableFull`] if no more group addresses fit.
    pub fn add_listen_group_address(&mut self, address: GroupAddress) -> Result<(), Error> {
        self.filter.add_listen_group_address(address)
    }

    pub fn is_listening_to_group_address(&self, address: GroupAddress) -> bool {
        self.filter.is_listening_to_group_address(address)
    }

    pub fn filter(&self) -> &AddressFilter {
        &self.filter
    }

    /// Ask the transceiver to reset. It answers with a reset indication.
    pub fn reset_request(&mut self) -> Result<(), Error> {
        self.link.write(&[RESET_REQUEST])
    }

    /// Ask the transceiver for its state. The answer shows up as
    /// [`Event::Unknown`](crate::Event::Unknown) in [`poll()`](Self::poll).
    pub fn state_request(&mut self) -> Result<(), Error> {
        self.link.write(&[STATE_REQUEST])
    }

    pub fn transport(&self) -> &T {
        self.link.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.link.transport_mut()
    }

    pub fn into_inner(self) -> T {
        self.link.into_transport()
    }
}
