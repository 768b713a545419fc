//! Datapoint encodings for the payload of a [`Telegram`].
//!
//! Each setter fixes the payload length for its value type. The checksum is
//! not touched, call [`Telegram::update_checksum()`] once the payload is final.

use snafu::ensure;

use crate::telegram::Telegram;
use crate::types::{Error, InvalidTimeOfDaySnafu};

const DATA_START: usize = 8;
const TEXT_LENGTH: usize = 14;

/// Range of the KNX 2 byte float, mantissa 2046 and -2048 at exponent 15.
/// Mantissa 2047 at exponent 15 is reserved for invalid data.
const FLOAT16_MAX: f32 = 670_433.28;
const FLOAT16_MIN: f32 = -671_088.64;
const FLOAT16_INVALID: [u8; 2] = [0x7F, 0xFF];

/// Day of week for time-of-day telegrams. `NoDay` means the day is unspecified.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Weekday {
    NoDay = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            6 => Self::Saturday,
            7 => Self::Sunday,
            _ => Self::NoDay,
        }
    }
}

/// Time of day value (3 data bytes).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeOfDay {
    pub day: Weekday,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    /// # Errors
    /// Returns [`Error::InvalidTimeOfDay`] unless the time is within `00:00:00..=23:59:59`.
    pub fn new(day: Weekday, hours: u8, minutes: u8, seconds: u8) -> Result<Self, Error> {
        ensure!(
            hours < 24 && minutes < 60 && seconds < 60,
            InvalidTimeOfDaySnafu {
                hours,
                minutes,
                seconds
            }
        );
        Ok(Self {
            day,
            hours,
            minutes,
            seconds,
        })
    }
}

impl Telegram {
    fn payload_is(&self, length: usize) -> bool {
        self.payload_length() == length
    }

    /// Booleans travel in the first data byte.
    pub fn set_bool_value(&mut self, value: bool) {
        self.set_payload_length(2);
        self.set_first_data_byte(value as u8);
    }

    pub fn bool_value(&self) -> Option<bool> {
        self.payload_is(2).then(|| self.first_data_byte() & 1 == 1)
    }

    pub fn set_1byte_int_value(&mut self, value: u8) {
        self.set_payload_length(3);
        self.set_buffer_byte(DATA_START, value);
    }

    pub fn byte_value(&self) -> Option<u8> {
        self.payload_is(3).then(|| self.buffer_byte(DATA_START))
    }

    /// KNX 2 byte float: sign, 4 bit exponent, 11 bit mantissa in units of 0.01.
    /// Values outside the representable range are clamped, NaN is sent as
    /// the invalid data marker `0x7FFF`.
    pub fn set_2byte_float_value(&mut self, value: f32) {
        self.set_payload_length(4);
        if value.is_nan() {
            self.set_buffer_byte(DATA_START, FLOAT16_INVALID[0]);
            self.set_buffer_byte(DATA_START + 1, FLOAT16_INVALID[1]);
            return;
        }
        let mut scaled = value.clamp(FLOAT16_MIN, FLOAT16_MAX) * 100.0;
        let mut exponent = 0u8;
        while !(-2048.0..=2047.0).contains(&scaled.round()) && exponent < 15 {
            scaled /= 2.0;
            exponent += 1;
        }
        let rounded = scaled.round() as i32;
        let mantissa = (rounded & 0x7FF) as u16;
        let mut msb = (exponent << 3) | (mantissa >> 8) as u8;
        if rounded < 0 {
            msb |= 0x80;
        }
        self.set_buffer_byte(DATA_START, msb);
        self.set_buffer_byte(DATA_START + 1, mantissa as u8);
    }

    /// `None` for the invalid data marker too.
    pub fn float16_value(&self) -> Option<f32> {
        let msb = self.buffer_byte(DATA_START);
        if !self.payload_is(4) || [msb, self.buffer_byte(DATA_START + 1)] == FLOAT16_INVALID {
            return None;
        }
        let exponent = (msb >> 3) & 0x0F;
        let mut mantissa = (i32::from(msb & 0x07) << 8) | i32::from(self.buffer_byte(DATA_START + 1));
        if msb & 0x80 != 0 {
            mantissa -= 2048;
        }
        Some((mantissa << exponent) as f32 / 100.0)
    }

    /// Signed 16 bit integer, big endian.
    pub fn set_2byte_int_value(&mut self, value: i16) {
        self.set_payload_length(4);
        let [hi, lo] = value.to_be_bytes();
        self.set_buffer_byte(DATA_START, hi);
        self.set_buffer_byte(DATA_START + 1, lo);
    }

    pub fn int16_value(&self) -> Option<i16> {
        self.payload_is(4).then(|| {
            i16::from_be_bytes([
                self.buffer_byte(DATA_START),
                self.buffer_byte(DATA_START + 1),
            ])
        })
    }

    /// IEEE 754 single precision, big endian.
    pub fn set_4byte_float_value(&mut self, value: f32) {
        self.set_payload_length(6);
        for (i, byte) in value.to_be_bytes().into_iter().enumerate() {
            self.set_buffer_byte(DATA_START + i, byte);
        }
    }

    pub fn float32_value(&self) -> Option<f32> {
        if !self.payload_is(6) {
            return None;
        }
        let mut bytes = [0; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.buffer_byte(DATA_START + i);
        }
        Some(f32::from_be_bytes(bytes))
    }

    /// Fixed 14 byte text. Longer input is truncated, shorter input is NUL padded.
    pub fn set_14byte_value(&mut self, value: &str) {
        self.set_payload_length(2 + TEXT_LENGTH);
        let text = &mut self.data_mut()[..TEXT_LENGTH];
        text.fill(0);
        for (dst, src) in text.iter_mut().zip(value.bytes()) {
            *dst = src;
        }
    }

    /// The text up to the first NUL. Non-ASCII bytes are mapped to `?`.
    pub fn text_value(&self) -> Option<String> {
        if !self.payload_is(2 + TEXT_LENGTH) {
            return None;
        }
        Some(
            (DATA_START..DATA_START + TEXT_LENGTH)
                .map(|i| self.buffer_byte(i))
                .take_while(|b| *b != 0)
                .map(|b| if b.is_ascii() { b as char } else { '?' })
                .collect(),
        )
    }

    pub fn set_time_value(&mut self, time: TimeOfDay) {
        self.set_payload_length(5);
        self.set_buffer_byte(
            DATA_START,
            ((time.day as u8) << 5) | (time.hours & 0b1_1111),
        );
        self.set_buffer_byte(DATA_START + 1, time.minutes & 0b11_1111);
        self.set_buffer_byte(DATA_START + 2, time.seconds & 0b11_1111);
    }

    pub fn time_value(&self) -> Option<TimeOfDay> {
        if !self.payload_is(5) {
            return None;
        }
        let first = self.buffer_byte(DATA_START);
        Some(TimeOfDay {
            day: Weekday::from_bits(first >> 5),
            hours: first & 0b1_1111,
            minutes: self.buffer_byte(DATA_START + 1) & 0b11_1111,
            seconds: self.buffer_byte(DATA_START + 2) & 0b11_1111,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool() {
        let mut tg = Telegram::new();
        tg.set_bool_value(true);
        assert_eq!(tg.bool_value(), Some(true));
        assert_eq!(tg.buffer_byte(7) & 0x3F, 1);
        tg.set_bool_value(false);
        assert_eq!(tg.bool_value(), Some(false));
        tg.set_1byte_int_value(1);
        assert_eq!(tg.bool_value(), None);
    }

    #[test]
    fn test_float16_known_encodings() {
        let mut tg = Telegram::new();
        tg.set_2byte_float_value(21.5);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0x0C, 0x33));
        assert_eq!(tg.float16_value(), Some(21.5));

        tg.set_2byte_float_value(-5.0);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0x86, 0x0C));
        assert_eq!(tg.float16_value(), Some(-5.0));

        tg.set_2byte_float_value(0.0);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0x00, 0x00));
        assert_eq!(tg.payload_length(), 4);
    }

    #[test]
    fn test_float16_range() {
        let mut tg = Telegram::new();
        tg.set_2byte_float_value(1.0e9);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0x7F, 0xFE));
        let max = tg.float16_value().unwrap();
        assert!((max - FLOAT16_MAX).abs() < 1.0);

        tg.set_2byte_float_value(-1.0e9);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0xF8, 0x00));
        let min = tg.float16_value().unwrap();
        assert!((min - FLOAT16_MIN).abs() < 1.0);
    }

    #[test]
    fn test_float16_nan() {
        let mut tg = Telegram::new();
        tg.set_2byte_float_value(f32::NAN);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0x7F, 0xFF));
        assert_eq!(tg.float16_value(), None);
        assert_eq!(tg.payload_length(), 4);
    }

    #[test]
    fn test_time_of_day_range() {
        let time = TimeOfDay::new(Weekday::Sunday, 23, 59, 59).unwrap();
        assert_eq!(time.hours, 23);
        assert_eq!(
            TimeOfDay::new(Weekday::NoDay, 24, 0, 0),
            Err(Error::InvalidTimeOfDay {
                hours: 24,
                minutes: 0,
                seconds: 0
            })
        );
        assert!(TimeOfDay::new(Weekday::Monday, 32, 0, 0).is_err());
        assert!(TimeOfDay::new(Weekday::Monday, 0, 60, 0).is_err());
        assert!(TimeOfDay::new(Weekday::Monday, 0, 0, 60).is_err());
    }

    #[test]
    fn test_int16() {
        let mut tg = Telegram::new();
        tg.set_2byte_int_value(-2);
        assert_eq!((tg.buffer_byte(8), tg.buffer_byte(9)), (0xFF, 0xFE));
        assert_eq!(tg.int16_value(), Some(-2));
    }

    #[test]
    fn test_float32() {
        let mut tg = Telegram::new();
        tg.set_4byte_float_value(1.0);
        assert_eq!(tg.payload_length(), 6);
        assert_eq!(
            [tg.buffer_byte(8), tg.buffer_byte(9), tg.buffer_byte(10), tg.buffer_byte(11)],
            [0x3F, 0x80, 0x00, 0x00]
        );
        assert_eq!(tg.float32_value(), Some(1.0));
    }

    #[test]
    fn test_text() {
        let mut tg = Telegram::new();
        tg.set_14byte_value("KNX is OK");
        assert_eq!(tg.payload_length(), 16);
        assert_eq!(tg.total_length(), 23);
        assert_eq!(tg.text_value().as_deref(), Some("KNX is OK"));
        assert_eq!(tg.buffer_byte(8 + 9), 0);

        tg.set_14byte_value("this text is far too long");
        assert_eq!(tg.text_value().as_deref(), Some("this text is f"));

        tg.set_14byte_value("");
        assert_eq!(tg.text_value().as_deref(), Some(""));
    }

    #[test]
    fn test_time() {
        let mut tg = Telegram::new();
        let time = TimeOfDay {
            day: Weekday::Wednesday,
            hours: 13,
            minutes: 37,
            seconds: 59,
        };
        tg.set_time_value(time);
        assert_eq!(tg.payload_length(), 5);
        assert_eq!(
            [tg.buffer_byte(8), tg.buffer_byte(9), tg.buffer_byte(10)],
            [0b0110_1101, 37, 59]
        );
        assert_eq!(tg.time_value(), Some(time));
    }
}
