//! ASCII time codes A and B as specified in
//! [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf) section 3.5 .
//!
//! Both codes have no preamble field. The number of decimal fraction digits and the presence of
//! the terminator byte are agreed outside of the byte stream and passed as [AsciiParams].
//!
//! - Code A: `YYYY-MM-DDThh:mm:ss.` followed by the decimal fraction of the second.
//! - Code B: `YYYY-DDDThh:mm:ss.` followed by the decimal fraction of the second.
//!
//! The digit and separator bytes are kept as received. The digit accessors return [None] if
//! a field does not contain ASCII digits.
use super::{TimeReader, TimeWriter};
use crate::util::{write_fields, BitReader};
use crate::CodecError;
use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const ASCII_A_FIXED_LEN: usize = 20;
pub const ASCII_B_FIXED_LEN: usize = 18;
/// Terminator byte used by [TimeCodeAsciiA::with_terminator] and
/// [TimeCodeAsciiB::with_terminator].
pub const DEFAULT_TERMINATOR: u8 = b'Z';

const ASCII_A_TEMPLATE: [u8; ASCII_A_FIXED_LEN] = *b"0000-00-00T00:00:00.";
const ASCII_B_TEMPLATE: [u8; ASCII_B_FIXED_LEN] = *b"0000-000T00:00:00.";

/// Out of band parameters for the ASCII time codes. Both sides of the link have to use the
/// same values.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AsciiParams {
    pub number_of_decimals: usize,
    pub add_terminator: bool,
}

impl AsciiParams {
    pub const fn new(number_of_decimals: usize, add_terminator: bool) -> Self {
        Self {
            number_of_decimals,
            add_terminator,
        }
    }

    /// Bytes following the fixed part of the time code.
    #[inline]
    pub const fn variable_len(&self) -> usize {
        self.number_of_decimals.saturating_add(self.add_terminator as usize)
    }
}

fn parse_digits(raw: &[u8]) -> Option<u16> {
    raw.iter().try_fold(0_u16, |acc, byte| {
        if !byte.is_ascii_digit() {
            return None;
        }
        Some(acc * 10 + u16::from(byte - b'0'))
    })
}

fn format_digits(field: &'static str, value: u128, dst: &mut [u8]) -> Result<(), CodecError> {
    if let Some(limit) = u32::try_from(dst.len())
        .ok()
        .and_then(|digits| 10_u128.checked_pow(digits))
    {
        if value >= limit {
            return Err(CodecError::ValueOutOfRange {
                field,
                value,
                max: limit - 1,
            });
        }
    }
    let mut rest = value;
    for slot in dst.iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    Ok(())
}

fn format_time_of_day(
    fixed: &mut [u8],
    offset: usize,
    hour: u8,
    minute: u8,
    second: u8,
) -> Result<(), CodecError> {
    format_digits("ascii hour", hour.into(), &mut fixed[offset..offset + 2])?;
    format_digits("ascii minute", minute.into(), &mut fixed[offset + 3..offset + 5])?;
    format_digits("ascii second", second.into(), &mut fixed[offset + 6..offset + 8])
}

macro_rules! ascii_time_code {
    (
        $(#[$meta:meta])*
        $Name:ident, $fixed_len:expr, $time_offset:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $Name {
            fixed: [u8; $fixed_len],
            decimals: Vec<u8>,
            terminator: Option<u8>,
        }

        impl $Name {
            /// Build the time code from raw bytes without any checks.
            pub fn from_raw_parts(
                fixed: [u8; $fixed_len],
                decimals: Vec<u8>,
                terminator: Option<u8>,
            ) -> Self {
                Self {
                    fixed,
                    decimals,
                    terminator,
                }
            }

            /// Replace the decimal fraction of the second with `fraction` formatted as exactly
            /// `number_of_decimals` digits, padded with leading zeros.
            pub fn with_decimal_fraction(
                mut self,
                fraction: u64,
                number_of_decimals: usize,
            ) -> Result<Self, CodecError> {
                let mut decimals = alloc::vec![b'0'; number_of_decimals];
                format_digits("ascii decimal fraction", fraction.into(), &mut decimals)?;
                self.decimals = decimals;
                Ok(self)
            }

            /// Append the [DEFAULT_TERMINATOR].
            pub fn with_terminator(mut self) -> Self {
                self.terminator = Some(DEFAULT_TERMINATOR);
                self
            }

            #[inline]
            pub fn fixed_bytes(&self) -> &[u8; $fixed_len] {
                &self.fixed
            }

            #[inline]
            pub fn decimals(&self) -> &[u8] {
                &self.decimals
            }

            #[inline]
            pub fn terminator(&self) -> Option<u8> {
                self.terminator
            }

            /// Parameters required to decode this time code again.
            pub fn params(&self) -> AsciiParams {
                AsciiParams::new(self.decimals.len(), self.terminator.is_some())
            }

            pub fn year(&self) -> Option<u16> {
                parse_digits(&self.fixed[0..4])
            }

            pub fn hour(&self) -> Option<u8> {
                parse_digits(&self.fixed[$time_offset..$time_offset + 2]).map(|v| v as u8)
            }

            pub fn minute(&self) -> Option<u8> {
                parse_digits(&self.fixed[$time_offset + 3..$time_offset + 5]).map(|v| v as u8)
            }

            pub fn second(&self) -> Option<u8> {
                parse_digits(&self.fixed[$time_offset + 6..$time_offset + 8]).map(|v| v as u8)
            }

            /// Decimal fraction digits as an integer. Returns [None] for non digit bytes or
            /// if the value does not fit a [u64].
            pub fn decimal_fraction(&self) -> Option<u64> {
                self.decimals.iter().try_fold(0_u64, |acc, byte| {
                    if !byte.is_ascii_digit() {
                        return None;
                    }
                    acc.checked_mul(10)?.checked_add(u64::from(byte - b'0'))
                })
            }
        }

        impl TimeWriter for $Name {
            const HEADER_OVERHEAD: usize = $fixed_len;

            fn variable_len(&self) -> usize {
                self.params().variable_len()
            }

            fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
                write_fields(buf, self.len_written(), |writer| {
                    writer.write_bytes(&self.fixed)?;
                    writer.write_bytes(&self.decimals)?;
                    if let Some(terminator) = self.terminator {
                        writer.write_bytes(&[terminator])?;
                    }
                    Ok(())
                })
            }
        }

        impl TimeReader for $Name {
            type Params = AsciiParams;

            fn from_bytes(buf: &[u8], params: AsciiParams) -> Result<(Self, usize), CodecError> {
                let mut reader = BitReader::new(buf);
                let mut fixed = [0; $fixed_len];
                reader.read_into(&mut fixed)?;
                let decimals = reader.read_vec(params.number_of_decimals)?;
                let mut terminator = None;
                if params.add_terminator {
                    terminator = Some(reader.read_bits(8)? as u8);
                }
                Ok((
                    Self {
                        fixed,
                        decimals,
                        terminator,
                    },
                    reader.bytes_consumed(),
                ))
            }
        }
    };
}

ascii_time_code!(
    /// ASCII time code A using month and day of month, `YYYY-MM-DDThh:mm:ss.d*Z`.
    TimeCodeAsciiA, ASCII_A_FIXED_LEN, 11
);

ascii_time_code!(
    /// ASCII time code B using the day of year, `YYYY-DDDThh:mm:ss.d*Z`.
    TimeCodeAsciiB, ASCII_B_FIXED_LEN, 9
);

impl TimeCodeAsciiA {
    /// Format the fixed part from numeric values. The time code has no decimals and no
    /// terminator until [Self::with_decimal_fraction] or [Self::with_terminator] are used.
    ///
    /// Returns [CodecError::ValueOutOfRange] if a value has more digits than its field.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CodecError> {
        let mut fixed = ASCII_A_TEMPLATE;
        format_digits("ascii year", year.into(), &mut fixed[0..4])?;
        format_digits("ascii month", month.into(), &mut fixed[5..7])?;
        format_digits("ascii day", day.into(), &mut fixed[8..10])?;
        format_time_of_day(&mut fixed, 11, hour, minute, second)?;
        Ok(Self::from_raw_parts(fixed, Vec::new(), None))
    }

    pub fn month(&self) -> Option<u8> {
        parse_digits(&self.fixed[5..7]).map(|v| v as u8)
    }

    pub fn day(&self) -> Option<u8> {
        parse_digits(&self.fixed[8..10]).map(|v| v as u8)
    }
}

impl TimeCodeAsciiB {
    /// Format the fixed part from numeric values. The time code has no decimals and no
    /// terminator until [Self::with_decimal_fraction] or [Self::with_terminator] are used.
    ///
    /// Returns [CodecError::ValueOutOfRange] if a value has more digits than its field.
    pub fn new(
        year: u16,
        day_of_year: u16,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CodecError> {
        let mut fixed = ASCII_B_TEMPLATE;
        format_digits("ascii year", year.into(), &mut fixed[0..4])?;
        format_digits("ascii day of year", day_of_year.into(), &mut fixed[5..8])?;
        format_time_of_day(&mut fixed, 9, hour, minute, second)?;
        Ok(Self::from_raw_parts(fixed, Vec::new(), None))
    }

    pub fn day_of_year(&self) -> Option<u16> {
        parse_digits(&self.fixed[5..8])
    }
}
