//! Bit and byte level primitives used by every codec in this crate.
//!
//! [BitReader] and [BitWriter] are cursors over a byte slice. Bits are accessed most significant
//! bit first and multi-byte integers are big endian, so fields which straddle byte boundaries
//! like the 11 bit APID can be read and written in field order.
use crate::{ByteConversionError, CodecError};
use alloc::vec::Vec;

/// Widest value which can be accessed with a single bit field operation.
pub const MAX_BIT_FIELD_WIDTH: u32 = u64::BITS;
/// Widest value which can be accessed as one run of whole bytes.
pub const MAX_BYTE_FIELD_WIDTH: usize = 16;

/// Largest value representable with the given number of bits.
#[inline]
pub const fn max_value_for_bits(bit_count: u32) -> u128 {
    if bit_count >= u128::BITS {
        return u128::MAX;
    }
    (1 << bit_count) - 1
}

/// Returns [CodecError::ValueOutOfRange] if the value does not fit into the bit width.
#[inline]
pub fn ensure_fits(field: &'static str, value: u128, bit_count: u32) -> Result<(), CodecError> {
    let max = max_value_for_bits(bit_count);
    if value > max {
        return Err(CodecError::ValueOutOfRange { field, value, max });
    }
    Ok(())
}

fn check_bit_width(bit_count: u32) -> Result<(), CodecError> {
    if bit_count == 0 || bit_count > MAX_BIT_FIELD_WIDTH {
        return Err(CodecError::InvalidFieldWidth {
            field: "bit field",
            width: bit_count as usize,
        });
    }
    Ok(())
}

fn check_byte_width(byte_count: usize) -> Result<(), CodecError> {
    if byte_count == 0 || byte_count > MAX_BYTE_FIELD_WIDTH {
        return Err(CodecError::InvalidFieldWidth {
            field: "byte field",
            width: byte_count,
        });
    }
    Ok(())
}

/// Read cursor over a raw byte buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'buf> {
    buf: &'buf [u8],
    bit_pos: usize,
}

impl<'buf> BitReader<'buf> {
    pub const fn new(buf: &'buf [u8]) -> Self {
        Self { buf, bit_pos: 0 }
    }

    #[inline]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Number of bytes touched by the cursor. A partially read byte counts as consumed.
    #[inline]
    pub const fn bytes_consumed(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    #[inline]
    pub const fn remaining_bits(&self) -> usize {
        self.buf.len().saturating_mul(8) - self.bit_pos
    }

    fn ensure_remaining_bits(&self, bit_count: usize) -> Result<(), CodecError> {
        if bit_count > self.remaining_bits() {
            return Err(ByteConversionError::FromSliceTooSmall {
                found: self.buf.len(),
                expected: self.bit_pos.saturating_add(bit_count).div_ceil(8),
            }
            .into());
        }
        Ok(())
    }

    /// Byte counts come from untrusted parameters, so the bit count is computed checked.
    fn ensure_remaining_bytes(&self, byte_count: usize) -> Result<(), CodecError> {
        match byte_count.checked_mul(8) {
            Some(bit_count) => self.ensure_remaining_bits(bit_count),
            None => Err(ByteConversionError::FromSliceTooSmall {
                found: self.buf.len(),
                expected: self.bytes_consumed().saturating_add(byte_count),
            }
            .into()),
        }
    }

    fn next_bit(&mut self) -> u8 {
        let byte = self.buf[self.bit_pos / 8];
        let bit = (byte >> (7 - (self.bit_pos % 8))) & 0b1;
        self.bit_pos += 1;
        bit
    }

    /// Consume `bit_count` bits (1 to 64) and return them as an unsigned integer.
    pub fn read_bits(&mut self, bit_count: u32) -> Result<u64, CodecError> {
        check_bit_width(bit_count)?;
        self.ensure_remaining_bits(bit_count as usize)?;
        let mut value: u64 = 0;
        for _ in 0..bit_count {
            value = (value << 1) | u64::from(self.next_bit());
        }
        Ok(value)
    }

    #[inline]
    pub fn read_flag(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Consume `byte_count` whole bytes (1 to 16) and return them as one big endian unsigned
    /// integer. Widths which are not a power of two, for example 3 or 7 bytes, are supported.
    pub fn read_bytes_as_int(&mut self, byte_count: usize) -> Result<u128, CodecError> {
        check_byte_width(byte_count)?;
        self.ensure_remaining_bytes(byte_count)?;
        let mut value: u128 = 0;
        for _ in 0..byte_count {
            let mut byte: u8 = 0;
            for _ in 0..8 {
                byte = (byte << 1) | self.next_bit();
            }
            value = (value << 8) | u128::from(byte);
        }
        Ok(value)
    }

    /// Fill the passed slice with the next bytes. An empty slice is a no-op.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<(), CodecError> {
        self.ensure_remaining_bytes(dst.len())?;
        for slot in dst.iter_mut() {
            let mut byte: u8 = 0;
            for _ in 0..8 {
                byte = (byte << 1) | self.next_bit();
            }
            *slot = byte;
        }
        Ok(())
    }

    /// Read `byte_count` bytes into a new vector. The length is checked against the buffer
    /// before anything is allocated.
    pub fn read_vec(&mut self, byte_count: usize) -> Result<Vec<u8>, CodecError> {
        self.ensure_remaining_bytes(byte_count)?;
        let mut bytes = alloc::vec![0; byte_count];
        self.read_into(&mut bytes)?;
        Ok(bytes)
    }
}

/// Write cursor over a raw byte buffer.
///
/// Every write checks the value range before the buffer is touched.
#[derive(Debug)]
pub struct BitWriter<'buf> {
    buf: &'buf mut [u8],
    bit_pos: usize,
}

impl<'buf> BitWriter<'buf> {
    pub fn new(buf: &'buf mut [u8]) -> Self {
        Self { buf, bit_pos: 0 }
    }

    #[inline]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    #[inline]
    pub const fn bytes_written(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    fn ensure_remaining_bits(&self, bit_count: usize) -> Result<(), CodecError> {
        let end = self.bit_pos.saturating_add(bit_count);
        if end > self.buf.len().saturating_mul(8) {
            return Err(ByteConversionError::ToSliceTooSmall {
                found: self.buf.len(),
                expected: end.div_ceil(8),
            }
            .into());
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        let mask: u8 = 1 << (7 - (self.bit_pos % 8));
        let byte = &mut self.buf[self.bit_pos / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.bit_pos += 1;
    }

    /// Write the `bit_count` (1 to 64) least significant bits of `value`.
    pub fn write_bits(&mut self, value: u64, bit_count: u32) -> Result<(), CodecError> {
        check_bit_width(bit_count)?;
        ensure_fits("bit field", value.into(), bit_count)?;
        self.ensure_remaining_bits(bit_count as usize)?;
        for shift in (0..bit_count).rev() {
            self.push_bit((value >> shift) & 0b1 == 1);
        }
        Ok(())
    }

    #[inline]
    pub fn write_flag(&mut self, flag: bool) -> Result<(), CodecError> {
        self.write_bits(flag.into(), 1)
    }

    /// Write `value` as a big endian unsigned integer spanning `byte_count` (1 to 16) bytes.
    pub fn write_int_as_bytes(&mut self, value: u128, byte_count: usize) -> Result<(), CodecError> {
        check_byte_width(byte_count)?;
        ensure_fits("byte field", value, byte_count as u32 * 8)?;
        self.ensure_remaining_bits(byte_count * 8)?;
        for shift in (0..byte_count * 8).rev() {
            self.push_bit((value >> shift) & 0b1 == 1);
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.ensure_remaining_bits(bytes.len().saturating_mul(8))?;
        for byte in bytes {
            for shift in (0..8).rev() {
                self.push_bit((byte >> shift) & 0b1 == 1);
            }
        }
        Ok(())
    }
}

/// Checks that `buf` can hold `len` bytes, then runs the field writer on exactly that prefix.
/// Returns `len` on success.
pub(crate) fn write_fields<F>(buf: &mut [u8], len: usize, write: F) -> Result<usize, CodecError>
where
    F: FnOnce(&mut BitWriter) -> Result<(), CodecError>,
{
    if buf.len() < len {
        return Err(ByteConversionError::ToSliceTooSmall {
            found: buf.len(),
            expected: len,
        }
        .into());
    }
    let mut writer = BitWriter::new(&mut buf[0..len]);
    write(&mut writer)?;
    Ok(len)
}
