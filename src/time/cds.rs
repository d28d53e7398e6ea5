//! Module to read or write CCSDS Day Segmented (CDS) timestamps as specified in
//! [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf) section 3.3 .
//!
//! The core data structure to do this is the [TimeCodeCds] struct.
use super::{CcsdsTimeCodes, TimeReader, TimeWriter};
use crate::util::{ensure_fits, write_fields, BitReader, BitWriter};
use crate::CodecError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Preamble byte, the short 16 bit day segment and the 4 byte milliseconds of day.
pub const CDS_HEADER_OVERHEAD: usize = 7;
pub const MS_OF_DAY_LEN: usize = 4;

#[derive(Debug, PartialEq, Eq, Copy, Clone, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LengthOfDaySegment {
    Short16Bits = 0,
    Long24Bits = 1,
}

impl LengthOfDaySegment {
    #[inline]
    pub const fn byte_len(self) -> usize {
        2 + self as usize
    }
}

/// Width code of the submillisecond segment. Each step adds two bytes. The raw value 3 is
/// reserved.
#[derive(Debug, PartialEq, Eq, Copy, Clone, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SubmillisSegmentLength {
    Absent = 0,
    Microseconds = 1,
    Picoseconds = 2,
}

impl SubmillisSegmentLength {
    #[inline]
    pub const fn byte_len(self) -> usize {
        2 * self as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PFieldCds {
    pub extension: bool,
    /// 3 bit time code identification.
    pub time_id: u8,
    /// 1 bit epoch identification. 0 is the CCSDS epoch, 1 an agency defined epoch.
    pub epoch_id: u8,
    pub day_segment: LengthOfDaySegment,
    pub submillis_segment: SubmillisSegmentLength,
}

impl PFieldCds {
    /// Preamble using the CCSDS epoch.
    pub const fn new(
        day_segment: LengthOfDaySegment,
        submillis_segment: SubmillisSegmentLength,
    ) -> Self {
        Self {
            extension: false,
            time_id: CcsdsTimeCodes::Cds as u8,
            epoch_id: 0,
            day_segment,
            submillis_segment,
        }
    }

    pub fn time_code(&self) -> Result<CcsdsTimeCodes, u8> {
        CcsdsTimeCodes::try_from(self.time_id).map_err(|e| e.number)
    }

    fn validate(&self) -> Result<(), CodecError> {
        ensure_fits("cds time code id", self.time_id.into(), 3)?;
        ensure_fits("cds epoch id", self.epoch_id.into(), 1)
    }

    /// Returns [CodecError::InvalidFieldWidth] for the reserved submillisecond segment code.
    pub fn read(reader: &mut BitReader) -> Result<Self, CodecError> {
        let extension = reader.read_flag()?;
        let time_id = reader.read_bits(3)? as u8;
        let epoch_id = reader.read_bits(1)? as u8;
        let day_segment = LengthOfDaySegment::try_from(reader.read_bits(1)? as u8).map_err(|e| {
            CodecError::InvalidFieldWidth {
                field: "cds day segment",
                width: e.number.into(),
            }
        })?;
        let submillis_segment = SubmillisSegmentLength::try_from(reader.read_bits(2)? as u8)
            .map_err(|e| CodecError::InvalidFieldWidth {
                field: "cds submillisecond segment",
                width: e.number.into(),
            })?;
        Ok(Self {
            extension,
            time_id,
            epoch_id,
            day_segment,
            submillis_segment,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), CodecError> {
        writer.write_flag(self.extension)?;
        writer.write_bits(self.time_id.into(), 3)?;
        writer.write_bits(self.epoch_id.into(), 1)?;
        writer.write_bits(u8::from(self.day_segment).into(), 1)?;
        writer.write_bits(u8::from(self.submillis_segment).into(), 2)
    }
}

/// This object is the abstraction for the CCSDS Day Segmented Time Code (CDS).
///
/// The day counter is 16 or 24 bits wide depending on the preamble field, followed by the
/// 32 bit milliseconds of day and an optional 16 or 32 bit submillisecond counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeCodeCds {
    pfield: PFieldCds,
    days: u32,
    ms_of_day: u32,
    submillis: u32,
}

impl TimeCodeCds {
    /// Returns [CodecError::ValueOutOfRange] if the days or submillisecond value do not fit the
    /// widths configured in the preamble field. The submillisecond value must be 0 if the
    /// segment is absent.
    pub fn new(
        pfield: PFieldCds,
        days: u32,
        ms_of_day: u32,
        submillis: u32,
    ) -> Result<Self, CodecError> {
        pfield.validate()?;
        ensure_fits(
            "cds days",
            days.into(),
            pfield.day_segment.byte_len() as u32 * 8,
        )?;
        ensure_fits(
            "cds submilliseconds",
            submillis.into(),
            pfield.submillis_segment.byte_len() as u32 * 8,
        )?;
        Ok(Self {
            pfield,
            days,
            ms_of_day,
            submillis,
        })
    }

    #[inline]
    pub fn pfield(&self) -> PFieldCds {
        self.pfield
    }

    #[inline]
    pub fn days(&self) -> u32 {
        self.days
    }

    #[inline]
    pub fn ms_of_day(&self) -> u32 {
        self.ms_of_day
    }

    #[inline]
    pub fn submillis(&self) -> u32 {
        self.submillis
    }
}

impl TimeWriter for TimeCodeCds {
    const HEADER_OVERHEAD: usize = CDS_HEADER_OVERHEAD;

    fn variable_len(&self) -> usize {
        u8::from(self.pfield.day_segment) as usize + self.pfield.submillis_segment.byte_len()
    }

    fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        write_fields(buf, self.len_written(), |writer| {
            self.pfield.write(writer)?;
            writer.write_int_as_bytes(self.days.into(), self.pfield.day_segment.byte_len())?;
            writer.write_int_as_bytes(self.ms_of_day.into(), MS_OF_DAY_LEN)?;
            let submillis_len = self.pfield.submillis_segment.byte_len();
            if submillis_len > 0 {
                writer.write_int_as_bytes(self.submillis.into(), submillis_len)?;
            }
            Ok(())
        })
    }
}

impl TimeReader for TimeCodeCds {
    type Params = ();

    fn from_bytes(buf: &[u8], _params: ()) -> Result<(Self, usize), CodecError> {
        let mut reader = BitReader::new(buf);
        let pfield = PFieldCds::read(&mut reader)?;
        // At most 3 bytes wide.
        let days = reader.read_bytes_as_int(pfield.day_segment.byte_len())? as u32;
        let ms_of_day = reader.read_bytes_as_int(MS_OF_DAY_LEN)? as u32;
        let submillis_len = pfield.submillis_segment.byte_len();
        let mut submillis = 0;
        if submillis_len > 0 {
            submillis = reader.read_bytes_as_int(submillis_len)? as u32;
        }
        Ok((
            Self {
                pfield,
                days,
                ms_of_day,
                submillis,
            },
            reader.bytes_consumed(),
        ))
    }
}
