//! Complete space packets consisting of the primary header, an optional time code as the
//! secondary header and the payload.
//!
//! The time code kind can not be determined from the raw packet. [SpacePacket::from_bytes]
//! expects the [TimeCodeFormat] used by the sender, including the [AsciiParams] for the ASCII
//! time codes.
//!
//! # Example
//!
//! ```rust
//! use ccsds_spp::packet::{SpacePacket, TimeCodeFormat};
//! use ccsds_spp::time::ascii::{AsciiParams, TimeCodeAsciiB};
//! use ccsds_spp::{CcsdsPacket, SpHeader};
//!
//! let stamp = TimeCodeAsciiB::new(2024, 77, 12, 0, 0).unwrap().with_terminator();
//! let packet = SpacePacket::new_with_data_len(
//!     SpHeader::tm(0x12, 1, 0).unwrap(),
//!     Some(stamp.into()),
//!     vec![0xAA; 4],
//! )
//! .unwrap();
//! assert_eq!(packet.data_len(), 18 + 1 + 4);
//! let raw = packet.to_vec().unwrap();
//!
//! let format = TimeCodeFormat::AsciiB(AsciiParams::new(0, true));
//! let decoded = SpacePacket::from_bytes(&raw, format).unwrap();
//! assert_eq!(decoded.time_code_ascii_b().unwrap().day_of_year(), Some(77));
//! assert_eq!(decoded.payload(), [0xAA; 4]);
//! ```
use crate::payload::extract_payload;
use crate::time::ascii::{
    AsciiParams, TimeCodeAsciiA, TimeCodeAsciiB, ASCII_A_FIXED_LEN, ASCII_B_FIXED_LEN,
};
use crate::time::ccs::{TimeCodeCcs, CCS_HEADER_OVERHEAD};
use crate::time::cds::{TimeCodeCds, CDS_HEADER_OVERHEAD};
use crate::time::cuc::{TimeCodeCuc, CUC_HEADER_OVERHEAD};
use crate::time::{TimeReader, TimeWriter};
use crate::{
    ByteConversionError, CcsdsPacket, CodecError, PacketId, PacketSequenceCtrl, SequenceFlags,
    SpHeader, CCSDS_HEADER_LEN,
};
use alloc::vec::Vec;
use delegate::delegate;
use paste::paste;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Time code kind carried in the secondary header. Both sides of the link have to agree on
/// this setting.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeCodeFormat {
    /// No secondary header, the complete packet data field is payload.
    #[default]
    None,
    Cuc,
    Cds,
    Ccs,
    AsciiA(AsciiParams),
    AsciiB(AsciiParams),
}

impl TimeCodeFormat {
    /// Fixed part of the secondary header length.
    pub const fn header_overhead(&self) -> usize {
        match self {
            TimeCodeFormat::None => 0,
            TimeCodeFormat::Cuc => CUC_HEADER_OVERHEAD,
            TimeCodeFormat::Cds => CDS_HEADER_OVERHEAD,
            TimeCodeFormat::Ccs => CCS_HEADER_OVERHEAD,
            TimeCodeFormat::AsciiA(_) => ASCII_A_FIXED_LEN,
            TimeCodeFormat::AsciiB(_) => ASCII_B_FIXED_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeCode {
    Cuc(TimeCodeCuc),
    Cds(TimeCodeCds),
    Ccs(TimeCodeCcs),
    AsciiA(TimeCodeAsciiA),
    AsciiB(TimeCodeAsciiB),
}

macro_rules! for_each_time_code {
    ($time_code: expr, $stamp: ident => $body: expr) => {
        match $time_code {
            TimeCode::Cuc($stamp) => $body,
            TimeCode::Cds($stamp) => $body,
            TimeCode::Ccs($stamp) => $body,
            TimeCode::AsciiA($stamp) => $body,
            TimeCode::AsciiB($stamp) => $body,
        }
    };
}

impl TimeCode {
    pub fn format(&self) -> TimeCodeFormat {
        match self {
            TimeCode::Cuc(_) => TimeCodeFormat::Cuc,
            TimeCode::Cds(_) => TimeCodeFormat::Cds,
            TimeCode::Ccs(_) => TimeCodeFormat::Ccs,
            TimeCode::AsciiA(stamp) => TimeCodeFormat::AsciiA(stamp.params()),
            TimeCode::AsciiB(stamp) => TimeCodeFormat::AsciiB(stamp.params()),
        }
    }

    pub fn header_overhead(&self) -> usize {
        self.format().header_overhead()
    }

    pub fn variable_len(&self) -> usize {
        for_each_time_code!(self, stamp => stamp.variable_len())
    }

    pub fn secondary_header_len(&self) -> usize {
        for_each_time_code!(self, stamp => stamp.secondary_header_len())
    }

    pub fn len_written(&self) -> usize {
        for_each_time_code!(self, stamp => stamp.len_written())
    }

    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        for_each_time_code!(self, stamp => stamp.write_to_bytes(buf))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, CodecError> {
        for_each_time_code!(self, stamp => stamp.to_vec())
    }

    /// Parse the time code selected by `format` from the start of the buffer. Returns [None]
    /// for [TimeCodeFormat::None], otherwise the time code and the number of consumed bytes.
    pub fn from_bytes(
        buf: &[u8],
        format: TimeCodeFormat,
    ) -> Result<Option<(Self, usize)>, CodecError> {
        let (time_code, consumed) = match format {
            TimeCodeFormat::None => return Ok(None),
            TimeCodeFormat::Cuc => {
                let (stamp, consumed) = TimeCodeCuc::from_bytes(buf, ())?;
                (TimeCode::Cuc(stamp), consumed)
            }
            TimeCodeFormat::Cds => {
                let (stamp, consumed) = TimeCodeCds::from_bytes(buf, ())?;
                (TimeCode::Cds(stamp), consumed)
            }
            TimeCodeFormat::Ccs => {
                let (stamp, consumed) = TimeCodeCcs::from_bytes(buf, ())?;
                (TimeCode::Ccs(stamp), consumed)
            }
            TimeCodeFormat::AsciiA(params) => {
                let (stamp, consumed) = TimeCodeAsciiA::from_bytes(buf, params)?;
                (TimeCode::AsciiA(stamp), consumed)
            }
            TimeCodeFormat::AsciiB(params) => {
                let (stamp, consumed) = TimeCodeAsciiB::from_bytes(buf, params)?;
                (TimeCode::AsciiB(stamp), consumed)
            }
        };
        Ok(Some((time_code, consumed)))
    }
}

/// Space packet with an optional time code and an owned payload.
///
/// [SpacePacket::new] keeps the data length field of the passed header as it is, which allows
/// building deliberately inconsistent packets. Use [SpacePacket::new_with_data_len] to derive
/// the field from the time code and payload sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpacePacket {
    header: SpHeader,
    time_code: Option<TimeCode>,
    payload: Vec<u8>,
}

impl SpacePacket {
    pub fn new(header: SpHeader, time_code: Option<TimeCode>, payload: Vec<u8>) -> Self {
        Self {
            header,
            time_code,
            payload,
        }
    }

    /// Set the data length field and the secondary header flag of the header to match the
    /// time code and payload. Returns [CodecError::ValueOutOfRange] if the data field does
    /// not fit the 16 bit data length field.
    pub fn new_with_data_len(
        mut header: SpHeader,
        time_code: Option<TimeCode>,
        payload: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let data_field_len = time_code
            .as_ref()
            .map_or(0, TimeCode::secondary_header_len)
            .saturating_add(payload.len());
        let data_len = u16::try_from(data_field_len).map_err(|_| CodecError::ValueOutOfRange {
            field: "data length",
            value: data_field_len as u128,
            max: u16::MAX.into(),
        })?;
        header.data_len = data_len;
        header.set_sec_header_flag(time_code.is_some());
        Ok(Self::new(header, time_code, payload))
    }

    /// Decode a complete packet. The payload is copied out of the buffer and bytes following
    /// the packet are ignored.
    ///
    /// Returns [CodecError::CorruptPacket] if the data length field is smaller than the
    /// decoded time code.
    pub fn from_bytes(buf: &[u8], format: TimeCodeFormat) -> Result<Self, CodecError> {
        Self::parse(buf, format)
            .inspect(|packet| {
                trace!(
                    apid = packet.header.apid(),
                    format = ?format,
                    payload_len = packet.payload.len(),
                    "decoded space packet"
                )
            })
            .inspect_err(|e| debug!(format = ?format, error = %e, "rejected space packet"))
    }

    fn parse(buf: &[u8], format: TimeCodeFormat) -> Result<Self, CodecError> {
        let header = SpHeader::from_bytes(buf)?;
        let header_overhead = format.header_overhead();
        if usize::from(header.data_len) < header_overhead {
            return Err(CodecError::CorruptPacket {
                data_len: header.data_len,
                secondary_header_len: header_overhead,
            });
        }
        let data_field = &buf[CCSDS_HEADER_LEN..];
        let (time_code, consumed) = match TimeCode::from_bytes(data_field, format)? {
            Some((time_code, consumed)) => (Some(time_code), consumed),
            None => (None, 0),
        };
        let variable_len = time_code.as_ref().map_or(0, TimeCode::variable_len);
        let payload = extract_payload(
            &data_field[consumed..],
            header.data_len,
            header_overhead,
            variable_len,
        )?;
        Ok(Self {
            header,
            time_code,
            payload: payload.to_vec(),
        })
    }

    #[inline]
    pub fn header(&self) -> &SpHeader {
        &self.header
    }

    #[inline]
    pub fn time_code(&self) -> Option<&TimeCode> {
        self.time_code.as_ref()
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn format(&self) -> TimeCodeFormat {
        self.time_code
            .as_ref()
            .map_or(TimeCodeFormat::None, TimeCode::format)
    }

    /// Length of the secondary header and the payload, which is the value the data length
    /// field should have. For a CCS day of year time code this is one byte more than the time
    /// code and payload occupy, the encoder fills that byte with zero.
    pub fn data_field_len(&self) -> usize {
        self.time_code
            .as_ref()
            .map_or(0, TimeCode::secondary_header_len)
            .saturating_add(self.payload.len())
    }

    pub fn has_consistent_data_len(&self) -> bool {
        usize::from(self.header.data_len) == self.data_field_len()
    }

    pub fn len_written(&self) -> usize {
        CCSDS_HEADER_LEN + self.data_field_len()
    }

    delegate!(to self.header {
        pub fn set_apid(&mut self, apid: u16) -> bool;
        pub fn set_seq_count(&mut self, seq_count: u16) -> bool;
        pub fn set_seq_flags(&mut self, seq_flags: SequenceFlags);
    });

    /// Write header, time code and payload into the buffer. The data length field is written
    /// as stored. Returns the number of written bytes.
    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let len = self.len_written();
        if buf.len() < len {
            return Err(ByteConversionError::ToSliceTooSmall {
                found: buf.len(),
                expected: len,
            }
            .into());
        }
        let mut current_idx = self.header.write_to_bytes(buf)?;
        if let Some(time_code) = &self.time_code {
            current_idx += time_code.write_to_bytes(&mut buf[current_idx..])?;
        }
        buf[current_idx..current_idx + self.payload.len()].copy_from_slice(&self.payload);
        current_idx += self.payload.len();
        buf[current_idx..len].fill(0);
        Ok(len)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = alloc::vec![0; self.len_written()];
        self.write_to_bytes(&mut buf)?;
        Ok(buf)
    }
}

impl CcsdsPacket for SpacePacket {
    delegate!(to self.header {
        fn ccsds_version(&self) -> u8;
        fn packet_id(&self) -> PacketId;
        fn psc(&self) -> PacketSequenceCtrl;
        fn data_len(&self) -> u16;
    });
}

macro_rules! time_code_variants {
    ($($Variant: ident => $Stamp: ty),+ $(,)?) => {
        $(
            impl From<$Stamp> for TimeCode {
                fn from(stamp: $Stamp) -> Self {
                    TimeCode::$Variant(stamp)
                }
            }
        )+

        impl SpacePacket {
            $(
                paste! {
                    /// Returns [None] if the packet has no time code or a different kind.
                    pub fn [<time_code_ $Variant:snake>](&self) -> Option<&$Stamp> {
                        match &self.time_code {
                            Some(TimeCode::$Variant(stamp)) => Some(stamp),
                            _ => None,
                        }
                    }
                }
            )+
        }
    };
}

time_code_variants!(
    Cuc => TimeCodeCuc,
    Cds => TimeCodeCds,
    Ccs => TimeCodeCcs,
    AsciiA => TimeCodeAsciiA,
    AsciiB => TimeCodeAsciiB,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ccs::{CcsCalendar, PFieldCcs};
    use crate::time::cds::{LengthOfDaySegment, PFieldCds, SubmillisSegmentLength};
    use crate::time::cuc::{PFieldCuc, PFieldCucExtension};
    use crate::PacketType;

    fn header() -> SpHeader {
        SpHeader::tm(0x3FF, 0x1AAA, 0).unwrap()
    }

    fn roundtrip(time_code: Option<TimeCode>, payload: &[u8]) -> SpacePacket {
        let packet = SpacePacket::new_with_data_len(header(), time_code, payload.to_vec()).unwrap();
        assert!(packet.has_consistent_data_len());
        let raw = packet.to_vec().unwrap();
        assert_eq!(raw.len(), packet.len_written());
        assert_eq!(raw.len(), packet.packet_len());
        let decoded = SpacePacket::from_bytes(&raw, packet.format()).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(decoded.payload(), payload);
        decoded
    }

    #[test]
    fn test_no_time_code() {
        let packet = roundtrip(None, &[1, 2, 3, 4]);
        assert_eq!(packet.data_len(), 4);
        assert!(!packet.sec_header_flag());
        assert_eq!(packet.format(), TimeCodeFormat::None);
        assert!(packet.time_code().is_none());
        assert!(packet.time_code_cuc().is_none());
    }

    #[test]
    fn test_cuc_packet() {
        let stamp = TimeCodeCuc::new(
            PFieldCuc::new(3, 1),
            Some(PFieldCucExtension::new(1, 1)),
            0xDEADBEEF01,
            0x010203,
        )
        .unwrap();
        let packet = roundtrip(Some(stamp.into()), &[0x42; 5]);
        assert!(packet.sec_header_flag());
        assert_eq!(packet.data_len(), 10 + 5);
        assert_eq!(packet.time_code_cuc(), Some(&stamp));
        assert!(packet.time_code_cds().is_none());
    }

    #[test]
    fn test_cds_packet() {
        let pfield = PFieldCds::new(
            LengthOfDaySegment::Long24Bits,
            SubmillisSegmentLength::Microseconds,
        );
        let stamp = TimeCodeCds::new(pfield, 0x10000, 1000, 500).unwrap();
        let packet = roundtrip(Some(stamp.into()), &[0; 8]);
        assert_eq!(packet.data_len(), 10 + 8);
        assert_eq!(packet.time_code_cds().unwrap().days(), 0x10000);
    }

    #[test]
    fn test_ccs_packet() {
        let stamp = TimeCodeCcs::new(
            PFieldCcs::new(true, 3),
            2024,
            CcsCalendar::DayOfYear(250),
            10,
            20,
            30,
            0xABCDEF,
        )
        .unwrap();
        let packet = roundtrip(Some(stamp.into()), &[9, 8, 7]);
        assert_eq!(packet.data_len(), 8 + 3 + 3);
        assert_eq!(packet.payload(), [9, 8, 7]);
        assert_eq!(packet.time_code_ccs().unwrap().day_of_year(), Some(250));
    }

    #[test]
    fn test_ccs_day_of_year_payload_len() {
        // Data length 10 leaves two payload bytes for resolution 0, although the day of year
        // time code only occupies 7 bytes.
        let raw = [
            0x1F, 0xFF, 0x00, 0x01, 0x00, 0x0A,
            0b0101_1000, 0x07, 0xE8, 100, 12, 30, 45,
            0xAA, 0xBB, 0xCC, 0xDD,
        ];
        let packet = SpacePacket::from_bytes(&raw, TimeCodeFormat::Ccs).unwrap();
        let stamp = packet.time_code_ccs().unwrap();
        assert_eq!(stamp.day_of_year(), Some(100));
        assert_eq!(stamp.len_written(), 7);
        assert_eq!(packet.payload(), &raw[13..15]);
        assert!(packet.has_consistent_data_len());

        let encoded = packet.to_vec().unwrap();
        assert_eq!(encoded.len(), 16);
        assert_eq!(encoded[0..15], raw[0..15]);
        assert_eq!(encoded[15], 0);
    }

    #[test]
    fn test_ccs_day_of_year_too_short_for_overhead() {
        let raw = [
            0x1F, 0xFF, 0x00, 0x01, 0x00, 0x07,
            0b0101_1000, 0x07, 0xE8, 100, 12, 30, 45,
        ];
        let error = SpacePacket::from_bytes(&raw, TimeCodeFormat::Ccs).unwrap_err();
        assert_eq!(
            error,
            CodecError::CorruptPacket {
                data_len: 7,
                secondary_header_len: 8
            }
        );
    }

    #[test]
    fn test_ascii_packets() {
        let stamp_a = TimeCodeAsciiA::new(2024, 2, 29, 1, 2, 3)
            .unwrap()
            .with_decimal_fraction(5, 2)
            .unwrap();
        let packet = roundtrip(Some(stamp_a.clone().into()), b"payload");
        assert_eq!(packet.data_len(), 20 + 2 + 7);
        assert_eq!(
            packet.format(),
            TimeCodeFormat::AsciiA(AsciiParams::new(2, false))
        );
        assert_eq!(packet.time_code_ascii_a(), Some(&stamp_a));

        let stamp_b = TimeCodeAsciiB::new(2024, 60, 1, 2, 3).unwrap().with_terminator();
        let packet = roundtrip(Some(stamp_b.into()), &[]);
        assert_eq!(packet.data_len(), 18 + 1);
        assert!(packet.payload().is_empty());
        assert!(packet.time_code_ascii_a().is_none());
    }

    #[test]
    fn test_ascii_params_change_payload_len() {
        let mut raw = [b'0'; 40];
        let header = SpHeader::tc(0x12, 0, 34).unwrap();
        header.write_to_bytes(&mut raw).unwrap();
        raw[6..26].copy_from_slice(b"2024-01-01T00:00:00.");
        let three = SpacePacket::from_bytes(
            &raw,
            TimeCodeFormat::AsciiA(AsciiParams::new(3, false)),
        )
        .unwrap();
        let five = SpacePacket::from_bytes(
            &raw,
            TimeCodeFormat::AsciiA(AsciiParams::new(5, false)),
        )
        .unwrap();
        assert_eq!(three.payload().len(), 11);
        assert_eq!(five.payload().len(), 9);
        assert_eq!(three.payload().len() - five.payload().len(), 2);
        assert_eq!(three.ptype(), PacketType::Tc);
    }

    #[test]
    fn test_huge_ascii_decimal_count_is_rejected() {
        let mut raw = [b'0'; 40];
        SpHeader::tc(0x12, 0, 34)
            .unwrap()
            .write_to_bytes(&mut raw)
            .unwrap();
        let error = SpacePacket::from_bytes(
            &raw,
            TimeCodeFormat::AsciiB(AsciiParams::new(usize::MAX, false)),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            CodecError::ByteConversion(ByteConversionError::FromSliceTooSmall { found: 34, .. })
        ));
    }

    #[test]
    fn test_data_len_smaller_than_overhead() {
        let mut raw = [0; 32];
        SpHeader::tm(0x01, 0, 5)
            .unwrap()
            .write_to_bytes(&mut raw)
            .unwrap();
        raw[6] = 0b0100_0000;
        let error = SpacePacket::from_bytes(&raw, TimeCodeFormat::Cds).unwrap_err();
        assert_eq!(
            error,
            CodecError::CorruptPacket {
                data_len: 5,
                secondary_header_len: 7
            }
        );
    }

    #[test]
    fn test_data_len_smaller_than_time_code() {
        let stamp = TimeCodeCuc::new(
            PFieldCuc::new(3, 3),
            Some(PFieldCucExtension::new(0, 0)),
            1,
            2,
        )
        .unwrap();
        let mut sp_header = header();
        // Covers the fixed part but not the 8 byte wide counters.
        sp_header.set_data_len(5);
        let packet = SpacePacket::new(sp_header, Some(stamp.into()), Vec::new());
        assert!(!packet.has_consistent_data_len());
        let raw = packet.to_vec().unwrap();
        let error = SpacePacket::from_bytes(&raw, TimeCodeFormat::Cuc).unwrap_err();
        assert_eq!(
            error,
            CodecError::CorruptPacket {
                data_len: 5,
                secondary_header_len: 10
            }
        );
    }

    #[test]
    fn test_truncated_payload() {
        let packet = SpacePacket::new_with_data_len(header(), None, alloc::vec![1; 10]).unwrap();
        let raw = packet.to_vec().unwrap();
        let error = SpacePacket::from_bytes(&raw[0..12], TimeCodeFormat::None).unwrap_err();
        assert_eq!(
            error,
            CodecError::ByteConversion(ByteConversionError::FromSliceTooSmall {
                found: 6,
                expected: 10
            })
        );
        let error = SpacePacket::from_bytes(&raw[0..3], TimeCodeFormat::None).unwrap_err();
        assert_eq!(
            error,
            CodecError::ByteConversion(ByteConversionError::FromSliceTooSmall {
                found: 3,
                expected: 6
            })
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let packet = SpacePacket::new_with_data_len(header(), None, alloc::vec![5; 3]).unwrap();
        let mut raw = packet.to_vec().unwrap();
        raw.extend_from_slice(&[0xFF; 4]);
        assert_eq!(
            SpacePacket::from_bytes(&raw, TimeCodeFormat::None).unwrap(),
            packet
        );
    }

    #[test]
    fn test_new_keeps_data_len() {
        let mut sp_header = header();
        sp_header.set_data_len(99);
        let packet = SpacePacket::new(sp_header, None, alloc::vec![1, 2]);
        assert_eq!(packet.data_len(), 99);
        assert!(!packet.has_consistent_data_len());
        let raw = packet.to_vec().unwrap();
        assert_eq!(raw.len(), 8);
        assert_eq!(raw[4..6], [0, 99]);
    }

    #[test]
    fn test_data_len_too_large() {
        let error =
            SpacePacket::new_with_data_len(header(), None, alloc::vec![0; 70_000]).unwrap_err();
        assert_eq!(
            error,
            CodecError::ValueOutOfRange {
                field: "data length",
                value: 70_000,
                max: 65535
            }
        );
    }

    #[test]
    fn test_write_to_small_buffer() {
        let packet = SpacePacket::new_with_data_len(header(), None, alloc::vec![0; 4]).unwrap();
        let mut buf = [0; 9];
        let error = packet.write_to_bytes(&mut buf).unwrap_err();
        assert_eq!(
            error,
            CodecError::ByteConversion(ByteConversionError::ToSliceTooSmall {
                found: 9,
                expected: 10
            })
        );
        let mut buf = [0; 12];
        assert_eq!(packet.write_to_bytes(&mut buf), Ok(10));
    }

    #[test]
    fn test_header_setters() {
        let mut packet = SpacePacket::new_with_data_len(header(), None, Vec::new()).unwrap();
        assert!(packet.set_apid(0x22));
        assert!(!packet.set_seq_count(0xFFFF));
        packet.set_seq_flags(SequenceFlags::FirstSegment);
        assert_eq!(packet.apid(), 0x22);
        assert_eq!(packet.seq_count(), 0x1AAA);
        assert_eq!(packet.sequence_flags(), SequenceFlags::FirstSegment);
    }

    #[test]
    fn test_time_code_dispatch() {
        let stamp: TimeCode = TimeCodeAsciiB::new(2000, 1, 0, 0, 0)
            .unwrap()
            .with_decimal_fraction(7, 1)
            .unwrap()
            .into();
        assert_eq!(stamp.header_overhead(), ASCII_B_FIXED_LEN);
        assert_eq!(stamp.variable_len(), 1);
        assert_eq!(stamp.len_written(), 19);
        let raw = stamp.to_vec().unwrap();
        let (read_back, consumed) = TimeCode::from_bytes(&raw, stamp.format())
            .unwrap()
            .unwrap();
        assert_eq!(consumed, 19);
        assert_eq!(read_back, stamp);
        assert_eq!(TimeCode::from_bytes(&raw, TimeCodeFormat::None), Ok(None));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_serde_packet() {
        let pfield = PFieldCds::new(
            LengthOfDaySegment::Short16Bits,
            SubmillisSegmentLength::Absent,
        );
        let stamp = TimeCodeCds::new(pfield, 1, 2, 0).unwrap();
        let packet =
            SpacePacket::new_with_data_len(header(), Some(stamp.into()), alloc::vec![1, 2]).unwrap();
        let output = postcard::to_allocvec(&packet).unwrap();
        let deserialized: SpacePacket = postcard::from_bytes(&output).unwrap();
        assert_eq!(deserialized, packet);
    }
}
