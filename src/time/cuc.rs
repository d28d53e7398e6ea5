//! Module to read or write CCSDS Unsegmented (CUC) timestamps as specified in
//! [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf) section 3.2 .
//!
//! The core data structure to do this is the [TimeCodeCuc] struct. The basic time unit counter
//! and the fractional time unit counter have widths determined by the preamble field and the
//! optional preamble field extension. Both widths are the encoded octet count plus one, with
//! the additional octets of the extension added on top.
use super::{CcsdsTimeCodes, TimeReader, TimeWriter};
use crate::util::{ensure_fits, write_fields, BitReader, BitWriter};
use crate::CodecError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Preamble byte plus the smallest possible basic and fractional counters.
pub const CUC_HEADER_OVERHEAD: usize = 3;
/// 4 octets from the preamble field and 3 additional octets from the extension.
pub const MAX_BASIC_TIME_UNIT_LEN: usize = 7;
/// 4 octets from the preamble field and 7 additional octets from the extension.
pub const MAX_FRACTIONAL_TIME_UNIT_LEN: usize = 11;

/// First preamble byte of the CUC time code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PFieldCuc {
    /// Set if a [PFieldCucExtension] byte follows.
    pub extension: bool,
    /// 3 bit time code identification.
    pub time_id: u8,
    /// 2 bit raw value, the basic time unit spans this value plus one octets.
    pub basic_octets: u8,
    /// 2 bit raw value, the fractional time unit spans this value plus one octets.
    pub fractional_octets: u8,
}

impl PFieldCuc {
    /// Preamble using the CCSDS epoch without an extension.
    pub const fn new(basic_octets: u8, fractional_octets: u8) -> Self {
        Self {
            extension: false,
            time_id: CcsdsTimeCodes::CucCcsdsEpoch as u8,
            basic_octets,
            fractional_octets,
        }
    }

    pub fn time_code(&self) -> Result<CcsdsTimeCodes, u8> {
        CcsdsTimeCodes::try_from(self.time_id).map_err(|e| e.number)
    }

    fn validate(&self) -> Result<(), CodecError> {
        ensure_fits("cuc time code id", self.time_id.into(), 3)?;
        ensure_fits("cuc basic octets", self.basic_octets.into(), 2)?;
        ensure_fits("cuc fractional octets", self.fractional_octets.into(), 2)
    }

    pub fn read(reader: &mut BitReader) -> Result<Self, CodecError> {
        Ok(Self {
            extension: reader.read_flag()?,
            time_id: reader.read_bits(3)? as u8,
            basic_octets: reader.read_bits(2)? as u8,
            fractional_octets: reader.read_bits(2)? as u8,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), CodecError> {
        writer.write_flag(self.extension)?;
        writer.write_bits(self.time_id.into(), 3)?;
        writer.write_bits(self.basic_octets.into(), 2)?;
        writer.write_bits(self.fractional_octets.into(), 2)
    }
}

/// Second preamble byte of the CUC time code, present if [PFieldCuc::extension] is set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PFieldCucExtension {
    /// Raw extension flag. Further extension bytes are not supported, the flag is only carried.
    pub extension: bool,
    /// 2 bit count of octets added to the basic time unit.
    pub additional_basic_octets: u8,
    /// 3 bit count of octets added to the fractional time unit.
    pub additional_fractional_octets: u8,
    /// 2 bits reserved for mission definition.
    pub reserved: u8,
}

impl PFieldCucExtension {
    pub const fn new(additional_basic_octets: u8, additional_fractional_octets: u8) -> Self {
        Self {
            extension: false,
            additional_basic_octets,
            additional_fractional_octets,
            reserved: 0,
        }
    }

    fn validate(&self) -> Result<(), CodecError> {
        ensure_fits(
            "cuc additional basic octets",
            self.additional_basic_octets.into(),
            2,
        )?;
        ensure_fits(
            "cuc additional fractional octets",
            self.additional_fractional_octets.into(),
            3,
        )?;
        ensure_fits("cuc reserved bits", self.reserved.into(), 2)
    }

    pub fn read(reader: &mut BitReader) -> Result<Self, CodecError> {
        Ok(Self {
            extension: reader.read_flag()?,
            additional_basic_octets: reader.read_bits(2)? as u8,
            additional_fractional_octets: reader.read_bits(3)? as u8,
            reserved: reader.read_bits(2)? as u8,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), CodecError> {
        writer.write_flag(self.extension)?;
        writer.write_bits(self.additional_basic_octets.into(), 2)?;
        writer.write_bits(self.additional_fractional_octets.into(), 3)?;
        writer.write_bits(self.reserved.into(), 2)
    }
}

/// Width of the basic time unit in bytes.
pub fn basic_time_unit_len(pfield: &PFieldCuc, extension: Option<&PFieldCucExtension>) -> usize {
    pfield.basic_octets as usize
        + 1
        + extension.map_or(0, |ext| ext.additional_basic_octets as usize)
}

/// Width of the fractional time unit in bytes.
pub fn fractional_time_unit_len(
    pfield: &PFieldCuc,
    extension: Option<&PFieldCucExtension>,
) -> usize {
    pfield.fractional_octets as usize
        + 1
        + extension.map_or(0, |ext| ext.additional_fractional_octets as usize)
}

/// This object is the abstraction for the CCSDS Unsegmented Time Code (CUC).
///
/// The time is represented by a basic time unit counter (generally seconds) and a fractional
/// time unit counter. The counters are kept as raw fixed point values, no epoch conversion is
/// performed.
///
/// # Example
///
/// ```
/// use ccsds_spp::time::cuc::{PFieldCuc, TimeCodeCuc};
/// use ccsds_spp::time::{TimeReader, TimeWriter};
///
/// let stamp = TimeCodeCuc::new(PFieldCuc::new(3, 1), None, 0x20102030, 0x0102).unwrap();
/// let raw = stamp.to_vec().unwrap();
/// assert_eq!(raw, [0x1D, 0x20, 0x10, 0x20, 0x30, 0x01, 0x02]);
/// let (read_back, consumed) = TimeCodeCuc::from_bytes(&raw, ()).unwrap();
/// assert_eq!(consumed, 7);
/// assert_eq!(read_back, stamp);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeCodeCuc {
    pfield: PFieldCuc,
    pfield_extension: Option<PFieldCucExtension>,
    basic_time_unit: u64,
    fractional_time_unit: u128,
}

impl TimeCodeCuc {
    /// The extension flag of the preamble field is set according to the presence of the
    /// extension. Returns [CodecError::ValueOutOfRange] if a preamble value or counter does not
    /// fit its width.
    pub fn new(
        mut pfield: PFieldCuc,
        pfield_extension: Option<PFieldCucExtension>,
        basic_time_unit: u64,
        fractional_time_unit: u128,
    ) -> Result<Self, CodecError> {
        pfield.extension = pfield_extension.is_some();
        pfield.validate()?;
        if let Some(extension) = &pfield_extension {
            extension.validate()?;
        }
        let basic_len = basic_time_unit_len(&pfield, pfield_extension.as_ref());
        let fractional_len = fractional_time_unit_len(&pfield, pfield_extension.as_ref());
        ensure_fits(
            "cuc basic time unit",
            basic_time_unit.into(),
            basic_len as u32 * 8,
        )?;
        ensure_fits(
            "cuc fractional time unit",
            fractional_time_unit,
            fractional_len as u32 * 8,
        )?;
        Ok(Self {
            pfield,
            pfield_extension,
            basic_time_unit,
            fractional_time_unit,
        })
    }

    #[inline]
    pub fn pfield(&self) -> PFieldCuc {
        self.pfield
    }

    #[inline]
    pub fn pfield_extension(&self) -> Option<PFieldCucExtension> {
        self.pfield_extension
    }

    #[inline]
    pub fn basic_time_unit(&self) -> u64 {
        self.basic_time_unit
    }

    #[inline]
    pub fn fractional_time_unit(&self) -> u128 {
        self.fractional_time_unit
    }

    pub fn basic_time_unit_len(&self) -> usize {
        basic_time_unit_len(&self.pfield, self.pfield_extension.as_ref())
    }

    pub fn fractional_time_unit_len(&self) -> usize {
        fractional_time_unit_len(&self.pfield, self.pfield_extension.as_ref())
    }
}

impl TimeWriter for TimeCodeCuc {
    const HEADER_OVERHEAD: usize = CUC_HEADER_OVERHEAD;

    fn variable_len(&self) -> usize {
        let mut len = self.pfield.basic_octets as usize + self.pfield.fractional_octets as usize;
        if let Some(ext) = &self.pfield_extension {
            len += 1
                + ext.additional_basic_octets as usize
                + ext.additional_fractional_octets as usize;
        }
        len
    }

    fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        write_fields(buf, self.len_written(), |writer| {
            self.pfield.write(writer)?;
            if let Some(ext) = &self.pfield_extension {
                ext.write(writer)?;
            }
            writer.write_int_as_bytes(self.basic_time_unit.into(), self.basic_time_unit_len())?;
            writer.write_int_as_bytes(self.fractional_time_unit, self.fractional_time_unit_len())
        })
    }
}

impl TimeReader for TimeCodeCuc {
    type Params = ();

    fn from_bytes(buf: &[u8], _params: ()) -> Result<(Self, usize), CodecError> {
        let mut reader = BitReader::new(buf);
        let pfield = PFieldCuc::read(&mut reader)?;
        // The extension changes both counter widths, so it must be known before the counters.
        let pfield_extension = if pfield.extension {
            Some(PFieldCucExtension::read(&mut reader)?)
        } else {
            None
        };
        let basic_len = basic_time_unit_len(&pfield, pfield_extension.as_ref());
        let fractional_len = fractional_time_unit_len(&pfield, pfield_extension.as_ref());
        // At most 7 bytes wide.
        let basic_time_unit = reader.read_bytes_as_int(basic_len)? as u64;
        let fractional_time_unit = reader.read_bytes_as_int(fractional_len)?;
        Ok((
            Self {
                pfield,
                pfield_extension,
                basic_time_unit,
                fractional_time_unit,
            },
            reader.bytes_consumed(),
        ))
    }
}
