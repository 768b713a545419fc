use log::debug;
use snafu::ensure;

use crate::link::Confirmation;
use crate::telegram::{
    Command, CommunicationType, ControlData, ExtCommand, Telegram, MAX_PAYLOAD_LENGTH,
};
use crate::tpuart::TpUart;
use crate::transport::Transport;
use crate::types::{
    Error as TypeError, GroupAddress, IndividualAddress, InvalidPayloadLengthSnafu, Target,
};
use crate::Error;

/// Mask version of the BIM M 112.
const MASK_VERSION: [u8; 2] = [0x07, 0x01];

impl<T: Transport> TpUart<T> {
    /// Start a new telegram from this node to a group address.
    ///
    /// The returned telegram has a valid checksum. Fill in the remaining
    /// payload, call [`Telegram::update_checksum()`] and then
    /// [`send_message()`](Self::send_message).
    /// # Errors
    /// Returns an error unless `1 <= payload_length <= 16`.
    pub fn create_group_message(
        &mut self,
        payload_length: usize,
        command: Command,
        group: GroupAddress,
        first_data_byte: u8,
    ) -> Result<&mut Telegram, Error> {
        check_payload_length(payload_length)?;
        Ok(self.prepare_message(payload_length, command, group.into(), first_data_byte))
    }

    /// Like [`create_group_message()`](Self::create_group_message), but
    /// addressed to a single device.
    pub fn create_individual_message(
        &mut self,
        payload_length: usize,
        command: Command,
        target: IndividualAddress,
        first_data_byte: u8,
    ) -> Result<&mut Telegram, Error> {
        check_payload_length(payload_length)?;
        Ok(self.prepare_message(payload_length, command, target.into(), first_data_byte))
    }

    pub(crate) fn prepare_message(
        &mut self,
        payload_length: usize,
        command: Command,
        target: Target,
        first_data_byte: u8,
    ) -> &mut Telegram {
        let tg = &mut self.telegram;
        tg.clear();
        tg.set_source(self.filter.individual_address());
        tg.set_target(target);
        tg.set_first_data_byte(first_data_byte);
        tg.set_command(command);
        tg.set_payload_length(payload_length);
        tg.update_checksum();
        tg
    }

    /// The outgoing telegram, to be completed before [`send_message()`](Self::send_message).
    pub fn telegram_mut(&mut self) -> &mut Telegram {
        &mut self.telegram
    }

    /// Transmit the current telegram as is and wait for the data confirm.
    ///
    /// Blocks for the transmission, the confirmation and the settle delay.
    /// There are no retries.
    pub fn send_message(&mut self) -> Result<Confirmation, Error> {
        debug!("Sending {}", self.telegram);
        self.link.transmit(&self.telegram)
    }

    /// Confirm a numbered control data telegram with sequence number `sequence` from `target`.
    ///
    /// Uses its own telegram buffer, the received telegram is left untouched.
    pub fn send_ncd_pos_confirm(
        &mut self,
        sequence: u8,
        target: IndividualAddress,
    ) -> Result<Confirmation, Error> {
        let tg = &mut self.confirm;
        tg.clear();
        tg.set_source(self.filter.individual_address());
        tg.set_target(target);
        tg.set_sequence_number(sequence);
        tg.set_communication_type(CommunicationType::Ncd);
        tg.set_control_data(ControlData::PositiveConfirm);
        tg.set_payload_length(1);
        tg.update_checksum();

        debug!("Sending NCD positive confirm {} to {}", sequence, target);
        self.link.transmit(&self.confirm)
    }

    /// Answer an individual address read (programming mode) with our address.
    pub fn individual_answer_address(&mut self) -> Result<Confirmation, Error> {
        self.prepare_message(
            2,
            Command::IndividualAddressResponse,
            GroupAddress::BROADCAST.into(),
            0,
        );
        self.send_message()
    }

    /// Answer a mask version read from `target`.
    pub fn individual_answer_mask_version(
        &mut self,
        target: IndividualAddress,
    ) -> Result<Confirmation, Error> {
        let tg = self.prepare_message(4, Command::MaskVersionResponse, target.into(), 0);
        tg.set_communication_type(CommunicationType::Ndp);
        tg.set_buffer_byte(8, MASK_VERSION[0]);
        tg.set_buffer_byte(9, MASK_VERSION[1]);
        tg.update_checksum();
        self.send_message()
    }

    /// Answer an authorize request from `target`, granting `access_level`.
    pub fn individual_answer_auth(
        &mut self,
        access_level: u8,
        sequence: u8,
        target: IndividualAddress,
    ) -> Result<Confirmation, Error> {
        let tg = self.prepare_message(
            3,
            Command::Escape,
            target.into(),
            ExtCommand::AuthorizeResponse as u8,
        );
        tg.set_communication_type(CommunicationType::Ndp);
        tg.set_sequence_number(sequence);
        tg.set_buffer_byte(8, access_level);
        tg.update_checksum();
        self.send_message()
    }
}

fn check_payload_length(length: usize) -> Result<(), TypeError> {
    ensure!(
        (1..=MAX_PAYLOAD_LENGTH).contains(&length),
        InvalidPayloadLengthSnafu { length }
    );
    Ok(())
}
