// SPDX-License-Identifier: AGPL-3.0-or-later
// Hornet - Embeddable Logic Query Server
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Frame codec.
//!
//! A frame on the wire is exactly
//!
//! ```text
//! <decimal-length>.\n<payload-bytes>.\n
//! ```
//!
//! where `<decimal-length>` counts the payload bytes *including* the
//! trailing `.\n`. The codec is oblivious to payload content beyond
//! requiring UTF-8.
//!
//! The single raw `.` heartbeat byte the server writes during a
//! synchronous `run` is not a frame; [`read_reply_frame`] (the client
//! side) skips and counts leading `.` bytes before the length prefix.

use std::io::{BufRead, Read, Write};

use crate::error::{Result, ServerError};

/// Upper bound on a declared payload length. Anything larger is treated
/// as a framing fault rather than an allocation request.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

const TERMINATOR: &[u8] = b".\n";

/// Read one frame, returning the payload with its trailing `.\n` stripped.
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<String> {
    let len = read_length(reader, false)?.0;
    read_payload(reader, len)
}

/// Client-side frame read: identical to [`read_frame`] except that raw `.`
/// heartbeat bytes before the length prefix are skipped. Returns the
/// payload and the number of heartbeats consumed.
pub fn read_reply_frame<R: BufRead>(reader: &mut R) -> Result<(String, u64)> {
    let (len, heartbeats) = read_length(reader, true)?;
    Ok((read_payload(reader, len)?, heartbeats))
}

fn read_length<R: BufRead>(reader: &mut R, skip_heartbeats: bool) -> Result<(usize, u64)> {
    let mut digits: Vec<u8> = Vec::new();
    let mut heartbeats = 0u64;
    loop {
        let byte = read_byte(reader)?;
        match byte {
            b'.' if digits.is_empty() && skip_heartbeats => heartbeats += 1,
            b'.' => {
                if read_byte(reader)? != b'\n' {
                    return Err(ServerError::Frame("length terminator missing newline"));
                }
                if digits.is_empty() {
                    return Err(ServerError::Frame("empty length prefix"));
                }
                let text = std::str::from_utf8(&digits)
                    .map_err(|_| ServerError::Frame("non-numeric length prefix"))?;
                let len: usize = text
                    .parse()
                    .map_err(|_| ServerError::Frame("non-numeric length prefix"))?;
                if len > MAX_FRAME_SIZE {
                    return Err(ServerError::Frame("declared length exceeds limit"));
                }
                return Ok((len, heartbeats));
            }
            b'0'..=b'9' => digits.push(byte),
            _ => return Err(ServerError::Frame("non-numeric length prefix")),
        }
    }
}

fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<String> {
    if len < TERMINATOR.len() {
        return Err(ServerError::Frame("declared length shorter than terminator"));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ServerError::Frame("payload shorter than declared length")
        } else {
            ServerError::Io(e)
        }
    })?;
    if !payload.ends_with(TERMINATOR) {
        return Err(ServerError::Frame("payload missing terminator"));
    }
    payload.truncate(len - TERMINATOR.len());
    String::from_utf8(payload).map_err(|_| ServerError::Frame("payload is not UTF-8"))
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf[0]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ServerError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}

/// Write one frame. `payload` is the content without the trailing `.\n`;
/// the declared length includes it.
pub fn write_frame<W: Write>(writer: &mut W, payload: &str) -> Result<()> {
    let total = payload.len() + TERMINATOR.len();
    write!(writer, "{total}.\n{payload}.\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(payload: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        write_frame(&mut buf, payload).unwrap();
        buf
    }

    #[test]
    fn test_encode_shape() {
        assert_eq!(encode("hello"), b"7.\nhello.\n");
        assert_eq!(encode(""), b"2.\n.\n");
    }

    #[test]
    fn test_roundtrip() {
        for payload in ["run(atom(a), -1)", "", "héllo wörld", "a".repeat(4096).as_str()] {
            let buf = encode(payload);
            let decoded = read_frame(&mut Cursor::new(buf)).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_declared_length_matches_payload_bytes() {
        // Multi-byte UTF-8: length counts bytes, not characters.
        let buf = encode("é");
        let text = String::from_utf8(buf).unwrap();
        let (len, rest) = text.split_once(".\n").unwrap();
        assert_eq!(len.parse::<usize>().unwrap(), rest.len());
    }

    #[test]
    fn test_non_numeric_length_is_frame_error() {
        let result = read_frame(&mut Cursor::new(b"abc.\nxyz.\n".to_vec()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }

    #[test]
    fn test_eof_before_frame_is_connection_closed() {
        let result = read_frame(&mut Cursor::new(Vec::new()));
        assert!(matches!(result, Err(ServerError::ConnectionClosed)));
    }

    #[test]
    fn test_short_payload_is_frame_error() {
        let result = read_frame(&mut Cursor::new(b"10.\nab.\n".to_vec()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }

    #[test]
    fn test_missing_payload_terminator_is_frame_error() {
        let result = read_frame(&mut Cursor::new(b"5.\nabcde".to_vec()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }

    #[test]
    fn test_length_terminator_requires_newline() {
        let result = read_frame(&mut Cursor::new(b"5.xabc.\n".to_vec()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }

    #[test]
    fn test_oversized_declared_length_rejected() {
        let header = format!("{}.\n", MAX_FRAME_SIZE + 1);
        let result = read_frame(&mut Cursor::new(header.into_bytes()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }

    #[test]
    fn test_reply_frame_skips_and_counts_heartbeats() {
        let mut buf = b"...".to_vec();
        write_frame(&mut buf, "done").unwrap();
        let (payload, heartbeats) = read_reply_frame(&mut Cursor::new(buf)).unwrap();
        assert_eq!(payload, "done");
        assert_eq!(heartbeats, 3);
    }

    #[test]
    fn test_server_read_does_not_skip_heartbeats() {
        let result = read_frame(&mut Cursor::new(b".5.\nabc.\n".to_vec()));
        assert!(matches!(result, Err(ServerError::Frame(_))));
    }
}
