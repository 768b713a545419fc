use nom::bytes::streaming::take;
use nom::combinator::peek;
use nom::Err::Incomplete;
use nom::{IResult, Needed};

use crate::telegram::{payload_length, HEADER_SIZE};

type Buf = [u8];

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub(crate) enum FrameToken {
    /// A complete frame of the given length starts the buffer.
    Frame(usize),
    /// At least this many more bytes are needed.
    NeedData(usize),
}

/// Find the extent of the telegram at the start of `buf`.
///
/// The returned need is never larger than what the frame still lacks, so
/// reading exactly that many bytes never consumes data of the next unit.
pub(crate) fn parse_frame(buf: &Buf) -> FrameToken {
    match frame(buf) {
        Ok((_, frame)) => FrameToken::Frame(frame.len()),
        Err(Incomplete(Needed::Size(needed))) => FrameToken::NeedData(needed.get()),
        Err(_) => FrameToken::NeedData(1),
    }
}

fn frame(buf: &Buf) -> IResult<&Buf, &Buf> {
    let (_, header) = header(buf)?;
    take(HEADER_SIZE + payload_length(header[5]) + 1)(buf)
}

fn header(buf: &Buf) -> IResult<&Buf, &Buf> {
    peek(take(HEADER_SIZE))(buf)
}

#[cfg(test)]
mod tests {
    use super::FrameToken::*;
    use super::*;

    #[test]
    fn test_header_first() {
        assert_eq!(parse_frame(b""), NeedData(6));
        assert_eq!(parse_frame(&[0xBC]), NeedData(5));
        assert_eq!(parse_frame(&[0xBC, 0x11, 0x01]), NeedData(3));
    }

    #[test]
    fn test_payload_after_header() {
        let mut frame = vec![0xBC, 0x11, 0x01, 0x20, 0x01, 0xE1];
        // payload length 2 + checksum
        assert_eq!(parse_frame(&frame), NeedData(3));
        frame.extend_from_slice(&[0x00, 0x81]);
        assert_eq!(parse_frame(&frame), NeedData(1));
        frame.push(0x55);
        assert_eq!(parse_frame(&frame), Frame(9));
    }

    #[test]
    fn test_does_not_claim_next_frame() {
        let mut data = vec![0xBC, 0x11, 0x01, 0x20, 0x01, 0xE0, 0x00, 0x55];
        data.extend_from_slice(&[0xBC, 0x11]);
        assert_eq!(parse_frame(&data), Frame(8));
    }

    #[test]
    fn test_longest_frame() {
        let mut data = vec![0xBC, 0x11, 0x01, 0x20, 0x01, 0xEF];
        assert_eq!(parse_frame(&data), NeedData(17));
        data.resize(23, 0);
        assert_eq!(parse_frame(&data), Frame(23));
    }
}
