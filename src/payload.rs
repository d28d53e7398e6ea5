//! Payload length derivation.
//!
//! The payload length is never stored on the wire. It is the data length field of the primary
//! header minus everything the secondary header occupies. The time codes split their length
//! into a fixed part, [TimeWriter::HEADER_OVERHEAD](crate::time::TimeWriter::HEADER_OVERHEAD),
//! and a part which depends on preamble or out of band settings.
use crate::{ByteConversionError, CodecError};

/// Returns [CodecError::CorruptPacket] if the data length is smaller than the secondary
/// header.
pub fn payload_len(
    data_len: u16,
    header_overhead: usize,
    variable_len: usize,
) -> Result<usize, CodecError> {
    let secondary_header_len = header_overhead.saturating_add(variable_len);
    usize::from(data_len)
        .checked_sub(secondary_header_len)
        .ok_or(CodecError::CorruptPacket {
            data_len,
            secondary_header_len,
        })
}

/// Extract the payload from `buf`, which starts right after the secondary header.
///
/// Trailing bytes after the payload are ignored. Returns
/// [ByteConversionError::FromSliceTooSmall] if `buf` is shorter than the derived payload
/// length.
pub fn extract_payload(
    buf: &[u8],
    data_len: u16,
    header_overhead: usize,
    variable_len: usize,
) -> Result<&[u8], CodecError> {
    let len = payload_len(data_len, header_overhead, variable_len)?;
    if buf.len() < len {
        return Err(ByteConversionError::FromSliceTooSmall {
            found: buf.len(),
            expected: len,
        }
        .into());
    }
    Ok(&buf[0..len])
}
