//! Advertising data (AD) structures.
//!
//! An advertising payload is a sequence of `[length][type][data...]` records where `length`
//! counts the type byte and the data but not itself. [`parse`] walks such a buffer without ever
//! reading past its end, [`AdStructure`] gives the typed view of a record and
//! [`AdStructure::encode_slice`] builds a payload for the radio.
use core::iter::FusedIterator;

use crate::codec;
use crate::cursor::{ReadCursor, WriteCursor};

pub const AD_FLAG_LE_LIMITED_DISCOVERABLE: u8 = 0b00000001;
pub const LE_GENERAL_DISCOVERABLE: u8 = 0b00000010;
pub const BR_EDR_NOT_SUPPORTED: u8 = 0b00000100;
pub const SIMUL_LE_BR_CONTROLLER: u8 = 0b00001000;
pub const SIMUL_LE_BR_HOST: u8 = 0b00010000;

/// Maximum size of legacy advertising data and of legacy scan response data.
pub const MAX_ADV_DATA_LEN: usize = 31;

/// Assigned numbers for the AD types this crate understands.
pub mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const INCOMPLETE_SERVICE_UUIDS_16: u8 = 0x02;
    pub const COMPLETE_SERVICE_UUIDS_16: u8 = 0x03;
    pub const INCOMPLETE_SERVICE_UUIDS_128: u8 = 0x06;
    pub const COMPLETE_SERVICE_UUIDS_128: u8 = 0x07;
    pub const SHORTENED_LOCAL_NAME: u8 = 0x08;
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    pub const SERVICE_DATA_16: u8 = 0x16;
    pub const MANUFACTURER_SPECIFIC_DATA: u8 = 0xff;
}

/// A list of 16-bit service UUIDs, kept in their little-endian wire form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uuid16List<'a>(&'a [u8]);

impl<'a> Uuid16List<'a> {
    /// Wraps little-endian UUID pairs. A trailing odd byte is not part of the list.
    pub fn new(le_bytes: &'a [u8]) -> Self {
        Self(&le_bytes[..le_bytes.len() & !1])
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + 'a {
        let bytes: &'a [u8] = self.0;
        bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]))
    }

    pub fn contains(&self, uuid: u16) -> bool {
        self.iter().any(|u| u == uuid)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdStructure<'a> {
    /// Device flags and baseband capabilities.
    ///
    /// This should be sent if any flags apply to the device. If not (ie. the value sent would be
    /// 0), this may be omitted.
    ///
    /// Must not be used in scan response data.
    Flags(u8),

    /// Complete list of 16-bit service UUIDs.
    ServiceUuids16(Uuid16List<'a>),

    /// Complete list of 128-bit service UUIDs, 16 little-endian bytes each.
    ServiceUuids128(&'a [u8]),

    /// Service data with 16-bit service UUID.
    ServiceData16 {
        /// The 16-bit service UUID.
        uuid: u16,
        /// The associated service data. May be empty.
        data: &'a [u8],
    },

    /// Sets the full (unabbreviated) device name.
    ///
    /// This will be shown to the user when this device is found.
    CompleteLocalName(&'a [u8]),

    /// Sets the shortened device name.
    ShortenedLocalName(&'a [u8]),

    /// Set manufacturer specific data
    ManufacturerSpecificData {
        company_identifier: u16,
        payload: &'a [u8],
    },

    /// An unknown or unimplemented AD structure stored as raw bytes.
    Unknown {
        /// Type byte.
        ty: u8,
        /// Raw data transmitted after the type.
        data: &'a [u8],
    },
}

impl<'d> AdStructure<'d> {
    pub fn encode_slice(data: &[AdStructure<'_>], dest: &mut [u8]) -> Result<usize, codec::Error> {
        let mut w = WriteCursor::new(dest);
        for item in data.iter() {
            item.encode(&mut w)?;
        }
        Ok(w.len())
    }

    pub fn encode(&self, w: &mut WriteCursor<'_>) -> Result<(), codec::Error> {
        match self {
            AdStructure::Flags(flags) => {
                w.append(&[0x02, ad_type::FLAGS, *flags])?;
            }
            AdStructure::ServiceUuids16(uuids) => {
                header(w, uuids.as_bytes().len(), ad_type::COMPLETE_SERVICE_UUIDS_16)?;
                w.append(uuids.as_bytes())?;
            }
            AdStructure::ServiceUuids128(uuids) => {
                if uuids.len() % 16 != 0 {
                    return Err(codec::Error::InvalidValue);
                }
                header(w, uuids.len(), ad_type::COMPLETE_SERVICE_UUIDS_128)?;
                w.append(uuids)?;
            }
            AdStructure::ShortenedLocalName(name) => {
                header(w, name.len(), ad_type::SHORTENED_LOCAL_NAME)?;
                w.append(name)?;
            }
            AdStructure::CompleteLocalName(name) => {
                header(w, name.len(), ad_type::COMPLETE_LOCAL_NAME)?;
                w.append(name)?;
            }
            AdStructure::ServiceData16 { uuid, data } => {
                header(w, data.len() + 2, ad_type::SERVICE_DATA_16)?;
                w.write(*uuid)?;
                w.append(data)?;
            }
            AdStructure::ManufacturerSpecificData {
                company_identifier,
                payload,
            } => {
                header(w, payload.len() + 2, ad_type::MANUFACTURER_SPECIFIC_DATA)?;
                w.write(*company_identifier)?;
                w.append(payload)?;
            }
            AdStructure::Unknown { ty, data } => {
                header(w, data.len(), *ty)?;
                w.append(data)?;
            }
        }
        Ok(())
    }

    /// Decodes every well-formed record of `data` into its typed form.
    ///
    /// Decoding stops at the first malformed record, see [`parse`].
    pub fn decode(data: &'d [u8]) -> impl Iterator<Item = AdStructure<'d>> {
        parse(data).map(|record| record.structure())
    }
}

fn header(w: &mut WriteCursor<'_>, data_len: usize, ty: u8) -> Result<(), codec::Error> {
    let len = u8::try_from(data_len + 1).map_err(|_| codec::Error::InvalidValue)?;
    w.append(&[len, ty])
}

/// One raw record of an advertising payload, borrowed from the scanned buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdRecord<'d> {
    /// AD type byte.
    pub ty: u8,
    /// The `length - 1` bytes following the type.
    pub data: &'d [u8],
}

impl<'d> AdRecord<'d> {
    /// Number of bytes this record occupies on the wire, length byte included.
    pub fn encoded_len(&self) -> usize {
        self.data.len() + 2
    }

    pub fn is_service_data16(&self) -> bool {
        self.ty == ad_type::SERVICE_DATA_16
    }

    /// Typed view of this record.
    ///
    /// Records that are too short for the fixed fields of their type are returned as
    /// [`AdStructure::Unknown`].
    pub fn structure(&self) -> AdStructure<'d> {
        let data = self.data;
        match (self.ty, data) {
            (ad_type::FLAGS, [flags, ..]) => AdStructure::Flags(*flags),
            (ad_type::INCOMPLETE_SERVICE_UUIDS_16 | ad_type::COMPLETE_SERVICE_UUIDS_16, _) if data.len() % 2 == 0 => {
                AdStructure::ServiceUuids16(Uuid16List::new(data))
            }
            (ad_type::INCOMPLETE_SERVICE_UUIDS_128 | ad_type::COMPLETE_SERVICE_UUIDS_128, _) if data.len() % 16 == 0 => {
                AdStructure::ServiceUuids128(data)
            }
            (ad_type::SHORTENED_LOCAL_NAME, _) => AdStructure::ShortenedLocalName(data),
            (ad_type::COMPLETE_LOCAL_NAME, _) => AdStructure::CompleteLocalName(data),
            (ad_type::SERVICE_DATA_16, [lo, hi, rest @ ..]) => AdStructure::ServiceData16 {
                uuid: u16::from_le_bytes([*lo, *hi]),
                data: rest,
            },
            (ad_type::MANUFACTURER_SPECIFIC_DATA, [lo, hi, rest @ ..]) => AdStructure::ManufacturerSpecificData {
                company_identifier: u16::from_le_bytes([*lo, *hi]),
                payload: rest,
            },
            (ty, _) => AdStructure::Unknown { ty, data },
        }
    }
}

/// Lazily walks the records of an advertising payload.
///
/// A record declaring a zero length, or a length running past the end of the buffer, ends the
/// walk for the whole buffer; records after it are never produced. A single trailing byte is
/// ignored.
pub fn parse(data: &[u8]) -> AdRecords<'_> {
    AdRecords {
        cursor: ReadCursor::new(data),
    }
}

/// Payloads (16-bit UUID included) of every 16-bit service data record in `data`.
pub fn service_data16(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    parse(data).filter(AdRecord::is_service_data16).map(|record| record.data)
}

/// Iterator returned by [`parse`].
#[derive(Debug, Clone)]
pub struct AdRecords<'d> {
    cursor: ReadCursor<'d>,
}

impl<'d> AdRecords<'d> {
    fn read(&mut self) -> Result<AdRecord<'d>, codec::Error> {
        let len: u8 = self.cursor.read()?;
        if len == 0 || len as usize > self.cursor.available() {
            return Err(codec::Error::InvalidValue);
        }
        let ty: u8 = self.cursor.read()?;
        let data = self.cursor.slice(len as usize - 1)?;
        Ok(AdRecord { ty, data })
    }
}

impl<'d> Iterator for AdRecords<'d> {
    type Item = AdRecord<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.available() < 2 {
            return None;
        }
        match self.read() {
            Ok(record) => Some(record),
            Err(_) => {
                self.cursor.exhaust();
                None
            }
        }
    }
}

impl FusedIterator for AdRecords<'_> {}
