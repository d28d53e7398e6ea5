//! Module to read or write CCSDS Calendar Segmented (CCS) timestamps as specified in
//! [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf) section 3.4 .
//!
//! The calendar part is either month and day of month or the day of year, selected by the
//! calendar variation flag of the preamble field. [CcsCalendar] makes sure only one of the
//! two forms exists for a given timestamp.
use super::{CcsdsTimeCodes, TimeReader, TimeWriter};
use crate::util::{ensure_fits, write_fields, BitReader, BitWriter};
use crate::CodecError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Preamble byte, 2 byte year, month and day of month and hour, minute and second. The day
/// of year form uses the same overhead although its calendar segment is one byte shorter.
pub const CCS_HEADER_OVERHEAD: usize = 8;
pub const MAX_RESOLUTION: u8 = 7;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PFieldCcs {
    pub extension: bool,
    /// 3 bit time code identification.
    pub time_id: u8,
    /// Cleared for the month and day of month variation, set for the day of year variation.
    pub calendar_variation: bool,
    /// Number of subsecond bytes, 0 to 7.
    pub resolution: u8,
}

impl PFieldCcs {
    pub const fn new(calendar_variation: bool, resolution: u8) -> Self {
        Self {
            extension: false,
            time_id: CcsdsTimeCodes::Ccs as u8,
            calendar_variation,
            resolution,
        }
    }

    pub fn time_code(&self) -> Result<CcsdsTimeCodes, u8> {
        CcsdsTimeCodes::try_from(self.time_id).map_err(|e| e.number)
    }

    fn validate(&self) -> Result<(), CodecError> {
        ensure_fits("ccs time code id", self.time_id.into(), 3)?;
        ensure_fits("ccs resolution", self.resolution.into(), 3)
    }

    pub fn read(reader: &mut BitReader) -> Result<Self, CodecError> {
        Ok(Self {
            extension: reader.read_flag()?,
            time_id: reader.read_bits(3)? as u8,
            calendar_variation: reader.read_flag()?,
            resolution: reader.read_bits(3)? as u8,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), CodecError> {
        writer.write_flag(self.extension)?;
        writer.write_bits(self.time_id.into(), 3)?;
        writer.write_flag(self.calendar_variation)?;
        writer.write_bits(self.resolution.into(), 3)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcsCalendar {
    MonthDay { month: u8, day_of_month: u8 },
    DayOfYear(u8),
}

impl CcsCalendar {
    /// Value of the calendar variation flag for this calendar form.
    #[inline]
    pub const fn variation_flag(&self) -> bool {
        matches!(self, CcsCalendar::DayOfYear(_))
    }

    #[inline]
    pub const fn byte_len(&self) -> usize {
        match self {
            CcsCalendar::MonthDay { .. } => 2,
            CcsCalendar::DayOfYear(_) => 1,
        }
    }
}

/// This object is the abstraction for the CCSDS Calendar Segmented Time Code (CCS).
///
/// All values are kept raw. The codec does not check calendar plausibility, so a month of 13
/// is encoded and decoded like any other byte value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeCodeCcs {
    pfield: PFieldCcs,
    year: u16,
    calendar: CcsCalendar,
    hour: u8,
    minute: u8,
    second: u8,
    subseconds: u64,
}

impl TimeCodeCcs {
    /// The calendar variation flag of the passed preamble field is overwritten to match the
    /// calendar form. Returns [CodecError::ValueOutOfRange] if the resolution exceeds
    /// [MAX_RESOLUTION] or the subseconds do not fit into `resolution` bytes.
    pub fn new(
        mut pfield: PFieldCcs,
        year: u16,
        calendar: CcsCalendar,
        hour: u8,
        minute: u8,
        second: u8,
        subseconds: u64,
    ) -> Result<Self, CodecError> {
        pfield.validate()?;
        pfield.calendar_variation = calendar.variation_flag();
        ensure_fits(
            "ccs subseconds",
            subseconds.into(),
            u32::from(pfield.resolution) * 8,
        )?;
        Ok(Self {
            pfield,
            year,
            calendar,
            hour,
            minute,
            second,
            subseconds,
        })
    }

    #[inline]
    pub fn pfield(&self) -> PFieldCcs {
        self.pfield
    }

    #[inline]
    pub fn year(&self) -> u16 {
        self.year
    }

    #[inline]
    pub fn calendar(&self) -> CcsCalendar {
        self.calendar
    }

    pub fn month(&self) -> Option<u8> {
        match self.calendar {
            CcsCalendar::MonthDay { month, .. } => Some(month),
            CcsCalendar::DayOfYear(_) => None,
        }
    }

    pub fn day_of_month(&self) -> Option<u8> {
        match self.calendar {
            CcsCalendar::MonthDay { day_of_month, .. } => Some(day_of_month),
            CcsCalendar::DayOfYear(_) => None,
        }
    }

    pub fn day_of_year(&self) -> Option<u8> {
        match self.calendar {
            CcsCalendar::DayOfYear(day) => Some(day),
            CcsCalendar::MonthDay { .. } => None,
        }
    }

    #[inline]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u8 {
        self.second
    }

    #[inline]
    pub fn subseconds(&self) -> u64 {
        self.subseconds
    }
}

impl TimeWriter for TimeCodeCcs {
    const HEADER_OVERHEAD: usize = CCS_HEADER_OVERHEAD;

    fn variable_len(&self) -> usize {
        self.pfield.resolution.into()
    }

    // Preamble, year and hour/minute/second take 6 bytes in both branches.
    fn len_written(&self) -> usize {
        6 + self.calendar.byte_len() + usize::from(self.pfield.resolution)
    }

    fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        write_fields(buf, self.len_written(), |writer| {
            self.pfield.write(writer)?;
            writer.write_int_as_bytes(self.year.into(), 2)?;
            match self.calendar {
                CcsCalendar::MonthDay {
                    month,
                    day_of_month,
                } => writer.write_bytes(&[month, day_of_month])?,
                CcsCalendar::DayOfYear(day) => writer.write_bytes(&[day])?,
            }
            writer.write_bytes(&[self.hour, self.minute, self.second])?;
            if self.pfield.resolution > 0 {
                writer
                    .write_int_as_bytes(self.subseconds.into(), self.pfield.resolution.into())?;
            }
            Ok(())
        })
    }
}

impl TimeReader for TimeCodeCcs {
    type Params = ();

    fn from_bytes(buf: &[u8], _params: ()) -> Result<(Self, usize), CodecError> {
        let mut reader = BitReader::new(buf);
        let pfield = PFieldCcs::read(&mut reader)?;
        let year = reader.read_bytes_as_int(2)? as u16;
        let calendar = if pfield.calendar_variation {
            CcsCalendar::DayOfYear(reader.read_bits(8)? as u8)
        } else {
            let mut month_day = [0; 2];
            reader.read_into(&mut month_day)?;
            CcsCalendar::MonthDay {
                month: month_day[0],
                day_of_month: month_day[1],
            }
        };
        let mut hms = [0; 3];
        reader.read_into(&mut hms)?;
        let mut subseconds = 0;
        if pfield.resolution > 0 {
            subseconds = reader.read_bytes_as_int(pfield.resolution.into())? as u64;
        }
        Ok((
            Self {
                pfield,
                year,
                calendar,
                hour: hms[0],
                minute: hms[1],
                second: hms[2],
                subseconds,
            },
            reader.bytes_consumed(),
        ))
    }
}
