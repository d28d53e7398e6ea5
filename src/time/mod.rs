//! CCSDS Time Code Formats according to [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf)
//!
//! Every time code of this module can be read with [TimeReader] and written with [TimeWriter].
//! The binary time codes start with a preamble field (p-field) which determines the width of the
//! fields following it. The ASCII time codes have no preamble and need [ascii::AsciiParams]
//! agreed between both sides of the link.
use crate::CodecError;
use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod ascii;
pub mod ccs;
pub mod cds;
pub mod cuc;

#[derive(Debug, PartialEq, Eq, Copy, Clone, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CcsdsTimeCodes {
    CucCcsdsEpoch = 0b001,
    CucAgencyEpoch = 0b010,
    Cds = 0b100,
    Ccs = 0b101,
    AgencyDefined = 0b110,
}

/// Retrieve the CCSDS time code from the p-field. If no valid time code identifier is found, the
/// value of the raw time code identification field is returned.
pub fn ccsds_time_code_from_p_field(pfield: u8) -> Result<CcsdsTimeCodes, u8> {
    let raw_bits = (pfield >> 4) & 0b111;
    CcsdsTimeCodes::try_from(raw_bits).map_err(|e| e.number)
}

pub trait TimeWriter {
    /// Fixed share of the secondary header length, which is everything that does not depend on
    /// preamble settings or external parameters.
    const HEADER_OVERHEAD: usize;

    /// Share of the secondary header length which depends on preamble settings or external
    /// parameters.
    fn variable_len(&self) -> usize;

    /// Length subtracted from the packet data length to get the payload length.
    #[inline]
    fn secondary_header_len(&self) -> usize {
        Self::HEADER_OVERHEAD.saturating_add(self.variable_len())
    }

    /// Number of bytes the time code occupies on the wire. Identical to
    /// [Self::secondary_header_len] except for the CCS day of year form, which is one byte
    /// shorter.
    #[inline]
    fn len_written(&self) -> usize {
        self.secondary_header_len()
    }

    /// Write the time code into a raw buffer. Returns the number of written bytes on success.
    fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError>;

    fn to_vec(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = alloc::vec![0; self.len_written()];
        self.write_to_bytes(&mut buf)?;
        Ok(buf)
    }
}

pub trait TimeReader: Sized {
    /// Parameters agreed outside of the byte stream which are required to parse the time code.
    type Params;

    /// Parse the time code from the start of the buffer. Returns the time code and the number
    /// of consumed bytes.
    fn from_bytes(buf: &[u8], params: Self::Params) -> Result<(Self, usize), CodecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_code_from_p_field() {
        assert_eq!(
            ccsds_time_code_from_p_field(0b0001_1100),
            Ok(CcsdsTimeCodes::CucCcsdsEpoch)
        );
        assert_eq!(ccsds_time_code_from_p_field(0b0100_0000), Ok(CcsdsTimeCodes::Cds));
        assert_eq!(ccsds_time_code_from_p_field(0b1101_0011), Ok(CcsdsTimeCodes::Ccs));
        assert_eq!(ccsds_time_code_from_p_field(0b0111_0000), Err(0b111));
        assert_eq!(ccsds_time_code_from_p_field(0b0000_0000), Err(0));
    }
}
