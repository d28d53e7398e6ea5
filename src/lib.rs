//! # CCSDS Space Packet codec
//!
//! This crate contains a codec for the CCSDS Space Packet format according to
//! [CCSDS 133.0-B-1](https://public.ccsds.org/Pubs/133x0b2e1.pdf) with an optional secondary
//! header carrying one of the time codes specified in
//! [CCSDS 301.0-B-4](https://public.ccsds.org/Pubs/301x0b4e1.pdf):
//!
//!  - CCSDS Unsegmented Time Code (CUC), see [time::cuc]
//!  - CCSDS Day Segmented Time Code (CDS), see [time::cds]
//!  - CCSDS Calendar Segmented Time Code (CCS), see [time::ccs]
//!  - ASCII time codes A and B, see [time::ascii]
//!
//! The codec only produces raw field values. It does not convert time codes into calendar
//! representations and it does not interpret the packet payload.
//!
//! The time code kind is not self-describing on the wire. It is selected by the caller with a
//! [packet::TimeCodeFormat] which must be identical on the encoding and decoding side.
//!
//! ## Features
//!
//! `ccsds-spp` is a `no_std` crate which requires an allocator.
//!
//! Default features:
//!
//!  - [`std`](https://doc.rust-lang.org/std/): Implements [std::error::Error] for the error types.
//!
//! Optional features:
//!
//!  - `serde`: Derives [`serde`](https://serde.rs/) traits for all value types.
//!  - `defmt`: Derives `defmt::Format` for the header and preamble field types.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_spp::packet::{SpacePacket, TimeCodeFormat};
//! use ccsds_spp::time::cds::{LengthOfDaySegment, PFieldCds, SubmillisSegmentLength, TimeCodeCds};
//! use ccsds_spp::SpHeader;
//!
//! let header = SpHeader::tm(0x42, 12, 0).unwrap();
//! let pfield = PFieldCds::new(LengthOfDaySegment::Short16Bits, SubmillisSegmentLength::Absent);
//! let stamp = TimeCodeCds::new(pfield, 23_000, 3_600_000, 0).unwrap();
//! let packet = SpacePacket::new_with_data_len(header, Some(stamp.into()), vec![1, 2, 3]).unwrap();
//! let raw = packet.to_vec().unwrap();
//! assert_eq!(raw.len(), 16);
//! let decoded = SpacePacket::from_bytes(&raw, TimeCodeFormat::Cds).unwrap();
//! assert_eq!(decoded, packet);
//! ```
#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

use alloc::vec::Vec;
use delegate::delegate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use util::{ensure_fits, BitReader, BitWriter};

pub mod packet;
pub mod payload;
pub mod time;
pub mod util;

/// Length of the fixed CCSDS primary header.
pub const CCSDS_HEADER_LEN: usize = 6;
pub const MAX_VERSION: u8 = 2u8.pow(3) - 1;
pub const MAX_APID: u16 = 2u16.pow(11) - 1;
pub const MAX_SEQ_COUNT: u16 = 2u16.pow(14) - 1;

/// Size mismatch between a buffer and the field layout which is read from or written to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteConversionError {
    /// Output buffer of `found` bytes, the encoding needs `expected` bytes.
    #[error("output buffer holds {found} bytes, encoding needs {expected}")]
    ToSliceTooSmall { found: usize, expected: usize },
    /// Input buffer of `found` bytes ends before the `expected` bytes of the layout.
    #[error("input buffer holds {found} bytes, layout needs {expected}")]
    FromSliceTooSmall { found: usize, expected: usize },
}

/// Error type shared by every encoder and decoder of this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Not enough input bytes for a field, or not enough space in the output buffer.
    #[error("byte conversion error: {0}")]
    ByteConversion(#[from] ByteConversionError),
    /// A value passed for encoding does not fit the width of its field.
    #[error("value {value} for {field} exceeds maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u128,
        max: u128,
    },
    /// The data length field is smaller than the secondary header which was decoded with it.
    #[error("corrupt packet: data length {data_len} smaller than secondary header length {secondary_header_len}")]
    CorruptPacket {
        data_len: u16,
        secondary_header_len: usize,
    },
    /// A field width computed from other fields is zero, too large or uses a reserved code.
    #[error("invalid width {width} for {field}")]
    InvalidFieldWidth { field: &'static str, width: usize },
}

/// Packet type bit of the primary header.
#[derive(Debug, PartialEq, Eq, Copy, Clone, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    Tm = 0,
    Tc = 1,
}

impl PacketType {
    /// Only the lowest bit of `raw` is looked at.
    pub const fn from_bit(raw: u8) -> Self {
        match raw & 0b1 {
            0 => PacketType::Tm,
            _ => PacketType::Tc,
        }
    }
}

/// Segmentation state of the packet, the two bit sequence flags field.
#[derive(Debug, PartialEq, Eq, Copy, Clone, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SequenceFlags {
    ContinuationSegment = 0b00,
    FirstSegment = 0b01,
    LastSegment = 0b10,
    Unsegmented = 0b11,
}

impl SequenceFlags {
    /// Only the two lowest bits of `raw` are looked at.
    pub const fn from_bits(raw: u8) -> Self {
        match raw & 0b11 {
            0b00 => SequenceFlags::ContinuationSegment,
            0b01 => SequenceFlags::FirstSegment,
            0b10 => SequenceFlags::LastSegment,
            _ => SequenceFlags::Unsegmented,
        }
    }
}

/// Packet type, secondary header flag and the 11 bit APID.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketId {
    pub ptype: PacketType,
    pub sec_header_flag: bool,
    apid: u16,
}

impl PacketId {
    /// Returns [CodecError::ValueOutOfRange] for an APID above [MAX_APID].
    pub fn new(ptype: PacketType, sec_header_flag: bool, apid: u16) -> Result<Self, CodecError> {
        ensure_fits("apid", apid.into(), 11)?;
        Ok(PacketId {
            ptype,
            sec_header_flag,
            apid,
        })
    }

    /// Returns false and keeps the old APID if `apid` exceeds [MAX_APID].
    pub fn set_apid(&mut self, apid: u16) -> bool {
        if apid > MAX_APID {
            return false;
        }
        self.apid = apid;
        true
    }

    #[inline]
    pub fn apid(&self) -> u16 {
        self.apid
    }
}

/// Sequence flags and the 14 bit sequence count.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketSequenceCtrl {
    pub seq_flags: SequenceFlags,
    seq_count: u16,
}

impl PacketSequenceCtrl {
    /// Returns [CodecError::ValueOutOfRange] for a count above [MAX_SEQ_COUNT].
    pub fn new(seq_flags: SequenceFlags, seq_count: u16) -> Result<Self, CodecError> {
        ensure_fits("sequence count", seq_count.into(), 14)?;
        Ok(PacketSequenceCtrl {
            seq_flags,
            seq_count,
        })
    }

    /// Returns false and keeps the old count if `seq_count` exceeds [MAX_SEQ_COUNT].
    pub fn set_seq_count(&mut self, seq_count: u16) -> bool {
        if seq_count > MAX_SEQ_COUNT {
            return false;
        }
        self.seq_count = seq_count;
        true
    }

    #[inline]
    pub fn seq_count(&self) -> u16 {
        self.seq_count
    }
}

/// Read access to the primary header fields, shared by [SpHeader] and
/// [packet::SpacePacket].
pub trait CcsdsPacket {
    fn ccsds_version(&self) -> u8;
    fn packet_id(&self) -> PacketId;
    fn psc(&self) -> PacketSequenceCtrl;

    /// Raw data length field. No bias is applied.
    fn data_len(&self) -> u16;

    /// Total packet length announced by the header: the primary header plus every byte
    /// counted by the data length field.
    #[inline]
    fn packet_len(&self) -> usize {
        CCSDS_HEADER_LEN + usize::from(self.data_len())
    }

    #[inline]
    fn ptype(&self) -> PacketType {
        self.packet_id().ptype
    }

    #[inline]
    fn sec_header_flag(&self) -> bool {
        self.packet_id().sec_header_flag
    }

    #[inline]
    fn apid(&self) -> u16 {
        self.packet_id().apid
    }

    #[inline]
    fn seq_count(&self) -> u16 {
        self.psc().seq_count
    }

    #[inline]
    fn sequence_flags(&self) -> SequenceFlags {
        self.psc().seq_flags
    }
}

/// Decoded primary header.
///
/// The six header bytes carry, most significant bit first:
///
/// | Field | Bits |
/// |-------|------|
/// | `version` | 3 |
/// | `packet_id`: type, secondary header flag, APID | 1, 1, 11 |
/// | `psc`: sequence flags, sequence count | 2, 14 |
/// | `data_len` | 16 |
///
/// `data_len` is the raw count of bytes following the header. The CCSDS minus one convention
/// is never applied.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpHeader {
    pub version: u8,
    pub packet_id: PacketId,
    pub psc: PacketSequenceCtrl,
    pub data_len: u16,
}

impl SpHeader {
    /// Unsegmented header with version 0. Returns [CodecError::ValueOutOfRange] if the APID
    /// or the sequence count does not fit its field.
    pub fn new(
        ptype: PacketType,
        sec_header_flag: bool,
        apid: u16,
        seq_count: u16,
        data_len: u16,
    ) -> Result<Self, CodecError> {
        Ok(SpHeader {
            version: 0,
            packet_id: PacketId::new(ptype, sec_header_flag, apid)?,
            psc: PacketSequenceCtrl::new(SequenceFlags::Unsegmented, seq_count)?,
            data_len,
        })
    }

    #[inline]
    pub fn tm(apid: u16, seq_count: u16, data_len: u16) -> Result<Self, CodecError> {
        Self::new(PacketType::Tm, false, apid, seq_count, data_len)
    }

    #[inline]
    pub fn tc(apid: u16, seq_count: u16, data_len: u16) -> Result<Self, CodecError> {
        Self::new(PacketType::Tc, false, apid, seq_count, data_len)
    }

    delegate!(to self.packet_id {
        pub fn set_apid(&mut self, apid: u16) -> bool;
    });

    delegate!(to self.psc {
        pub fn set_seq_count(&mut self, seq_count: u16) -> bool;
    });

    pub fn set_seq_flags(&mut self, seq_flags: SequenceFlags) {
        self.psc.seq_flags = seq_flags;
    }

    pub fn set_sec_header_flag(&mut self, sec_header_flag: bool) {
        self.packet_id.sec_header_flag = sec_header_flag;
    }

    pub fn set_data_len(&mut self, data_len: u16) {
        self.data_len = data_len;
    }

    /// Decode the first [CCSDS_HEADER_LEN] bytes of `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < CCSDS_HEADER_LEN {
            return Err(ByteConversionError::FromSliceTooSmall {
                found: buf.len(),
                expected: CCSDS_HEADER_LEN,
            }
            .into());
        }
        let mut reader = BitReader::new(&buf[0..CCSDS_HEADER_LEN]);
        let version = reader.read_bits(3)? as u8;
        let ptype = PacketType::from_bit(reader.read_bits(1)? as u8);
        let sec_header_flag = reader.read_flag()?;
        let apid = reader.read_bits(11)? as u16;
        let seq_flags = SequenceFlags::from_bits(reader.read_bits(2)? as u8);
        let seq_count = reader.read_bits(14)? as u16;
        let data_len = reader.read_bits(16)? as u16;
        Ok(SpHeader {
            version,
            packet_id: PacketId {
                ptype,
                sec_header_flag,
                apid,
            },
            psc: PacketSequenceCtrl {
                seq_flags,
                seq_count,
            },
            data_len,
        })
    }

    /// Encode into the first [CCSDS_HEADER_LEN] bytes of `buf` and return that length.
    ///
    /// The public `version` field is range checked here because it can be set freely after
    /// construction. Nothing is written if it exceeds [MAX_VERSION].
    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        util::write_fields(buf, CCSDS_HEADER_LEN, |writer| self.write_fields(writer))
    }

    pub(crate) fn write_fields(&self, writer: &mut BitWriter) -> Result<(), CodecError> {
        ensure_fits("version", self.version.into(), 3)?;
        writer.write_bits(self.version.into(), 3)?;
        writer.write_bits(u8::from(self.packet_id.ptype).into(), 1)?;
        writer.write_flag(self.packet_id.sec_header_flag)?;
        writer.write_bits(self.packet_id.apid.into(), 11)?;
        writer.write_bits(u8::from(self.psc.seq_flags).into(), 2)?;
        writer.write_bits(self.psc.seq_count.into(), 14)?;
        writer.write_bits(self.data_len.into(), 16)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = alloc::vec![0; CCSDS_HEADER_LEN];
        self.write_to_bytes(&mut buf)?;
        Ok(buf)
    }
}

impl CcsdsPacket for SpHeader {
    #[inline]
    fn ccsds_version(&self) -> u8 {
        self.version
    }

    #[inline]
    fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    #[inline]
    fn psc(&self) -> PacketSequenceCtrl {
        self.psc
    }

    #[inline]
    fn data_len(&self) -> u16 {
        self.data_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // TC, secondary header present, APID 0x3FF, unsegmented, count 0x1AAA, data length 100.
    const REFERENCE_HEADER: [u8; 6] = [0x1B, 0xFF, 0xDA, 0xAA, 0x00, 0x64];

    fn reference_header() -> SpHeader {
        let mut header = SpHeader::tc(0x3FF, 0x1AAA, 100).unwrap();
        header.set_sec_header_flag(true);
        header
    }

    #[test]
    fn test_raw_field_enums() {
        assert_eq!(PacketType::from_bit(0b10), PacketType::Tm);
        assert_eq!(PacketType::from_bit(0b11), PacketType::Tc);
        assert_eq!(u8::from(PacketType::Tc), 1);
        for raw in 0..4 {
            let flags = SequenceFlags::from_bits(raw);
            assert_eq!(u8::from(flags), raw);
            assert_eq!(SequenceFlags::try_from(raw), Ok(flags));
        }
        assert_eq!(SequenceFlags::from_bits(0b1110), SequenceFlags::LastSegment);
        assert!(SequenceFlags::try_from(4).is_err());
    }

    #[test]
    fn test_apid_limit() {
        assert!(PacketId::new(PacketType::Tm, false, MAX_APID).is_ok());
        assert_eq!(
            PacketId::new(PacketType::Tc, true, MAX_APID + 1).unwrap_err(),
            CodecError::ValueOutOfRange {
                field: "apid",
                value: 0x800,
                max: 0x7FF
            }
        );
        let mut header = SpHeader::tm(0x10, 0, 0).unwrap();
        assert!(!header.set_apid(0x800));
        assert_eq!(header.apid(), 0x10);
        assert!(header.set_apid(0x7FF));
        assert_eq!(header.apid(), 0x7FF);
    }

    #[test]
    fn test_seq_count_limit() {
        assert_eq!(
            SpHeader::tm(0x10, MAX_SEQ_COUNT + 1, 0).unwrap_err(),
            CodecError::ValueOutOfRange {
                field: "sequence count",
                value: 0x4000,
                max: 0x3FFF
            }
        );
        let mut header = SpHeader::tm(0x10, 5, 0).unwrap();
        assert!(!header.set_seq_count(0x4000));
        assert_eq!(header.seq_count(), 5);
        assert!(header.set_seq_count(MAX_SEQ_COUNT));
        assert_eq!(header.seq_count(), MAX_SEQ_COUNT);
    }

    #[test]
    fn test_encode_reference_header() {
        assert_eq!(reference_header().to_vec().unwrap(), REFERENCE_HEADER);
    }

    #[test]
    fn test_decode_reference_header() {
        let header = SpHeader::from_bytes(&REFERENCE_HEADER).unwrap();
        assert_eq!(header, reference_header());
        assert_eq!(header.ccsds_version(), 0);
        assert_eq!(header.ptype(), PacketType::Tc);
        assert!(header.sec_header_flag());
        assert_eq!(header.apid(), 0x3FF);
        assert_eq!(header.sequence_flags(), SequenceFlags::Unsegmented);
        assert_eq!(header.seq_count(), 0x1AAA);
        assert_eq!(header.data_len(), 100);
        assert_eq!(header.packet_len(), 106);
    }

    #[test]
    fn test_decode_ignores_following_bytes() {
        let mut raw = [0xEE; 9];
        raw[0..6].copy_from_slice(&REFERENCE_HEADER);
        assert_eq!(SpHeader::from_bytes(&raw).unwrap(), reference_header());
    }

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(
            SpHeader::from_bytes(&REFERENCE_HEADER[0..5]).unwrap_err(),
            CodecError::ByteConversion(ByteConversionError::FromSliceTooSmall {
                found: 5,
                expected: 6
            })
        );
        let mut out = [0; 4];
        assert_eq!(
            reference_header().write_to_bytes(&mut out).unwrap_err(),
            CodecError::ByteConversion(ByteConversionError::ToSliceTooSmall {
                found: 4,
                expected: 6
            })
        );
    }

    #[test]
    fn test_version_out_of_range() {
        let mut header = reference_header();
        header.version = MAX_VERSION + 1;
        let mut buf = [0; 6];
        assert_eq!(
            header.write_to_bytes(&mut buf).unwrap_err(),
            CodecError::ValueOutOfRange {
                field: "version",
                value: 8,
                max: 7
            }
        );
        assert_eq!(buf, [0; 6]);
    }

    #[test]
    fn test_every_bit_set_survives() {
        let mut header = SpHeader::tc(MAX_APID, MAX_SEQ_COUNT, u16::MAX).unwrap();
        header.version = MAX_VERSION;
        header.set_sec_header_flag(true);
        assert_eq!(header.to_vec().unwrap(), [0xFF; 6]);
        assert_eq!(SpHeader::from_bytes(&[0xFF; 6]).unwrap(), header);
    }

    #[test]
    fn test_version_and_segment_bits() {
        let mut header = SpHeader::tm(0x7FF, MAX_SEQ_COUNT, 0xFFFF).unwrap();
        header.version = 0b101;
        header.set_seq_flags(SequenceFlags::FirstSegment);
        let raw = header.to_vec().unwrap();
        assert_eq!(raw, [0xA7, 0xFF, 0x7F, 0xFF, 0xFF, 0xFF]);
        assert_eq!(SpHeader::from_bytes(&raw).unwrap(), header);
    }

    #[test]
    fn test_header_updates() {
        let mut header = SpHeader::tm(0x20, 3, 0).unwrap();
        header.set_sec_header_flag(true);
        header.set_data_len(42);
        header.set_seq_flags(SequenceFlags::LastSegment);
        assert_eq!(header.to_vec().unwrap(), [0x08, 0x20, 0x80, 0x03, 0x00, 0x2A]);
        header.set_sec_header_flag(false);
        assert!(!header.sec_header_flag());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_serde_header() {
        let header = reference_header();
        let output = postcard::to_allocvec(&header).unwrap();
        let deserialized: SpHeader = postcard::from_bytes(&output).unwrap();
        assert_eq!(deserialized, header);
    }
}
