//! Reader input helpers.
//!
//! The scanner works on `&str`, so reader input is decoded up front.
//! `encoding_rs_io` sniffs a UTF-8 or UTF-16 BOM and transcodes to UTF-8;
//! without a BOM the bytes must already be UTF-8.

use encoding_rs_io::DecodeReaderBytesBuilder;
use std::io::{self, BufReader, Read};

/// Read all of `reader` into a `String`, honoring a byte-order mark.
///
/// With `max_bytes` set, input longer than that is an error instead of being
/// buffered without bound.
pub(crate) fn read_to_text<R: Read>(reader: R, max_bytes: Option<usize>) -> io::Result<String> {
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(None)
        .strip_bom(true)
        .build(reader);
    let mut text = String::new();
    match max_bytes {
        Some(limit) => {
            // One byte past the limit tells "exactly at the limit" from "over it".
            let mut capped = BufReader::new(decoded).take(limit as u64 + 1);
            capped.read_to_string(&mut text)?;
            if text.len() > limit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("input exceeds the {limit} byte limit"),
                ));
            }
        }
        None => {
            BufReader::new(decoded).read_to_string(&mut text)?;
        }
    }
    Ok(text)
}
