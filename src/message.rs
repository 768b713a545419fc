//! One call group communication: build, encode, checksum, send.

use crate::link::Confirmation;
use crate::telegram::{Command, Telegram};
use crate::tpuart::TpUart;
use crate::transport::Transport;
use crate::types::GroupAddress;
use crate::value::TimeOfDay;
use crate::Error;

impl<T: Transport> TpUart<T> {
    fn send_group_value<F>(
        &mut self,
        command: Command,
        group: GroupAddress,
        encode: F,
    ) -> Result<Confirmation, Error>
    where
        F: FnOnce(&mut Telegram),
    {
        let tg = self.prepare_message(2, command, group.into(), 0);
        encode(tg);
        tg.update_checksum();
        self.send_message()
    }

    pub fn group_write_bool(
        &mut self,
        group: GroupAddress,
        value: bool,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| tg.set_bool_value(value))
    }

    pub fn group_answer_bool(
        &mut self,
        group: GroupAddress,
        value: bool,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| tg.set_bool_value(value))
    }

    pub fn group_write_1byte_int(
        &mut self,
        group: GroupAddress,
        value: u8,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| tg.set_1byte_int_value(value))
    }

    pub fn group_answer_1byte_int(
        &mut self,
        group: GroupAddress,
        value: u8,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| tg.set_1byte_int_value(value))
    }

    /// Send a KNX 2 byte float, e.g. a temperature. Out of range values are clamped.
    pub fn group_write_2byte_float(
        &mut self,
        group: GroupAddress,
        value: f32,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| {
            tg.set_2byte_float_value(value)
        })
    }

    pub fn group_answer_2byte_float(
        &mut self,
        group: GroupAddress,
        value: f32,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| {
            tg.set_2byte_float_value(value)
        })
    }

    pub fn group_write_2byte_int(
        &mut self,
        group: GroupAddress,
        value: i16,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| tg.set_2byte_int_value(value))
    }

    pub fn group_answer_2byte_int(
        &mut self,
        group: GroupAddress,
        value: i16,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| tg.set_2byte_int_value(value))
    }

    pub fn group_write_4byte_float(
        &mut self,
        group: GroupAddress,
        value: f32,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| {
            tg.set_4byte_float_value(value)
        })
    }

    pub fn group_answer_4byte_float(
        &mut self,
        group: GroupAddress,
        value: f32,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| {
            tg.set_4byte_float_value(value)
        })
    }

    /// Send up to 14 bytes of text. Longer text is cut off.
    pub fn group_write_14byte_text(
        &mut self,
        group: GroupAddress,
        value: &str,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| tg.set_14byte_value(value))
    }

    pub fn group_answer_14byte_text(
        &mut self,
        group: GroupAddress,
        value: &str,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Answer, group, |tg| tg.set_14byte_value(value))
    }

    pub fn group_write_time(
        &mut self,
        group: GroupAddress,
        time: TimeOfDay,
    ) -> Result<Confirmation, Error> {
        self.send_group_value(Command::Write, group, |tg| tg.set_time_value(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::testing::Loopback;
    use crate::types::{ga, ia};
    use crate::value::Weekday;
    use crate::wire::CONFIRM_POSITIVE;
    use std::time::Duration;

    fn node() -> TpUart<Loopback> {
        let config = Config::default()
            .with_read_timeout(Duration::from_millis(5))
            .with_settle_delay(Duration::ZERO);
        TpUart::with_config(
            Loopback::with_rx(&[CONFIRM_POSITIVE]),
            ia(1, 1, 5),
            config,
        )
    }

    fn sent(tpuart: &TpUart<Loopback>) -> Telegram {
        Telegram::from_bytes(&tpuart.transport().sent_frame())
    }

    #[test]
    fn test_write_bool() {
        let mut tpuart = node();
        assert_eq!(
            tpuart.group_write_bool(ga(0, 0, 1), true).unwrap(),
            Confirmation::Accepted
        );
        assert_eq!(
            tpuart.transport().sent_frame(),
            vec![0xBC, 0x11, 0x05, 0x00, 0x01, 0xE1, 0x00, 0x81, 0x36]
        );
    }

    #[test]
    fn test_answer_2byte_float() {
        let mut tpuart = node();
        tpuart.group_answer_2byte_float(ga(2, 1, 3), 21.5).unwrap();
        let tg = sent(&tpuart);
        assert_eq!(tg.command(), Command::Answer);
        assert_eq!(tg.payload_length(), 4);
        assert_eq!([tg.buffer_byte(8), tg.buffer_byte(9)], [0x0C, 0x33]);
        assert!(tg.verify_checksum());
    }

    #[test]
    fn test_write_values() {
        let mut tpuart = node();
        tpuart.group_write_2byte_int(ga(1, 0, 0), -2).unwrap();
        let tg = sent(&tpuart);
        assert_eq!(tg.int16_value(), Some(-2));
        assert!(tg.verify_checksum());

        let mut tpuart = node();
        tpuart.group_write_1byte_int(ga(1, 0, 0), 200).unwrap();
        assert_eq!(sent(&tpuart).byte_value(), Some(200));

        let mut tpuart = node();
        tpuart.group_write_4byte_float(ga(1, 0, 0), 1.5).unwrap();
        assert_eq!(sent(&tpuart).float32_value(), Some(1.5));

        let mut tpuart = node();
        tpuart
            .group_answer_14byte_text(ga(1, 0, 0), "hello world, KNX")
            .unwrap();
        let tg = sent(&tpuart);
        assert_eq!(tg.total_length(), 23);
        assert_eq!(tg.text_value().as_deref(), Some("hello world, K"));
        assert!(tg.verify_checksum());
    }

    #[test]
    fn test_write_time() {
        let mut tpuart = node();
        let time = TimeOfDay::new(Weekday::Tuesday, 13, 45, 7).unwrap();
        tpuart.group_write_time(ga(0, 1, 2), time).unwrap();
        let tg = sent(&tpuart);
        assert_eq!(tg.buffer_byte(8), (2 << 5) | 13);
        assert_eq!(tg.time_value(), Some(time));
        assert_eq!(tg.command(), Command::Write);
    }

    #[test]
    fn test_repeat_send_identical() {
        let mut first = node();
        first.group_write_2byte_float(ga(3, 2, 1), -5.0).unwrap();
        let mut second = node();
        second.group_write_2byte_float(ga(3, 2, 1), 12.0).unwrap();
        second.transport_mut().tx.clear();
        second.transport_mut().rx.push_back(CONFIRM_POSITIVE);
        second.group_write_2byte_float(ga(3, 2, 1), -5.0).unwrap();
        assert_eq!(first.transport().tx, second.transport().tx);
    }
}
