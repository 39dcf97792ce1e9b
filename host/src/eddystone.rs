//! Eddystone-UID frames.
//!
//! A UID frame travels inside a 16-bit service data record for UUID `0xFEAA`:
//!
//! ```text
//! [uuid: 0xFEAA LE][frame type: 0x00][tx power: i8][namespace: 10][instance: 6][rfu: 2]
//! ```
//!
//! Decoding is permissive: anything that is not a well-formed UID frame simply yields nothing.
use core::fmt;

use crate::ad_structure::service_data16;
use crate::codec;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::fmt::Hex;

/// 16-bit service UUID assigned to Eddystone.
pub const EDDYSTONE_UUID: u16 = 0xFEAA;
/// Frame type byte of a UID frame.
pub const FRAME_TYPE_UID: u8 = 0x00;

pub const NAMESPACE_LEN: usize = 10;
pub const COMPACT_NAMESPACE_LEN: usize = 6;
pub const INSTANCE_LEN: usize = 6;
const RFU_LEN: usize = 2;

/// Longest frame (after the UUID) any layout produces.
pub const MAX_FRAME_LEN: usize = UidLayout::Full.frame_len();

/// 10-byte namespace identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Namespace(pub [u8; NAMESPACE_LEN]);

impl Namespace {
    pub const fn new(id: [u8; NAMESPACE_LEN]) -> Self {
        Self(id)
    }

    /// Widens a 6-byte compact namespace, zero filling the remaining bytes.
    pub const fn from_compact(id: [u8; COMPACT_NAMESPACE_LEN]) -> Self {
        let mut out = [0; NAMESPACE_LEN];
        let mut i = 0;
        while i < COMPACT_NAMESPACE_LEN {
            out[i] = id[i];
            i += 1;
        }
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; NAMESPACE_LEN] {
        &self.0
    }

    /// Whether a [`UidLayout::Compact`] frame carries this namespace without loss.
    pub fn fits_compact(&self) -> bool {
        self.0[COMPACT_NAMESPACE_LEN..].iter().all(|b| *b == 0)
    }

    /// The leading bytes carried by a [`UidLayout::Compact`] frame.
    pub fn compact(&self) -> &[u8] {
        &self.0[..COMPACT_NAMESPACE_LEN]
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hex(&self.0), f)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Namespace {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", Hex(&self.0))
    }
}

/// 6-byte instance identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct InstanceId(pub [u8; INSTANCE_LEN]);

impl InstanceId {
    pub const fn new(id: [u8; INSTANCE_LEN]) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; INSTANCE_LEN] {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hex(&self.0), f)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InstanceId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", Hex(&self.0))
    }
}

/// Which fields a UID frame carries.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UidLayout {
    /// `[frame type][tx power][namespace: 6]`, the short frame broadcast by the deployed beacon
    /// firmware. The namespace is zero extended to 10 bytes on decode.
    Compact,
    /// `[frame type][tx power][namespace: 10]`, instance not required.
    #[default]
    Namespace,
    /// `[frame type][tx power][namespace: 10][instance: 6][rfu: 2]`.
    Full,
}

impl UidLayout {
    /// Bytes that must follow the frame type for a frame to decode.
    pub const fn required_len(self) -> usize {
        match self {
            UidLayout::Compact => 1 + COMPACT_NAMESPACE_LEN,
            UidLayout::Namespace => 1 + NAMESPACE_LEN,
            UidLayout::Full => 1 + NAMESPACE_LEN + INSTANCE_LEN,
        }
    }

    /// Encoded frame length, UUID excluded.
    pub const fn frame_len(self) -> usize {
        match self {
            UidLayout::Compact | UidLayout::Namespace => 1 + self.required_len(),
            UidLayout::Full => 1 + self.required_len() + RFU_LEN,
        }
    }
}

/// Why a service data payload did not decode as a UID frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not enough bytes for the UUID, the frame type or the fields of the layout.
    TooShort,
    /// Service UUID is not `0xFEAA`.
    NotEddystone,
    /// An Eddystone frame of another type (URL, TLM, EID).
    NotUid,
}

impl From<codec::Error> for Rejection {
    fn from(_: codec::Error) -> Self {
        Rejection::TooShort
    }
}

/// Decoded content of an Eddystone-UID frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EddystoneUid {
    /// Calibrated tx power at 0 m, in dBm.
    pub tx_power: i8,
    pub namespace: Namespace,
    /// Only present for [`UidLayout::Full`].
    pub instance: Option<InstanceId>,
}

impl EddystoneUid {
    /// Decodes the payload of a 16-bit service data record, UUID included.
    pub fn try_decode(payload: &[u8], layout: UidLayout) -> Result<Self, Rejection> {
        let mut r = ReadCursor::new(payload);
        let uuid: u16 = r.read()?;
        if uuid != EDDYSTONE_UUID {
            return Err(Rejection::NotEddystone);
        }
        let frame_type: u8 = r.read()?;
        if frame_type != FRAME_TYPE_UID {
            return Err(Rejection::NotUid);
        }
        if r.available() < layout.required_len() {
            return Err(Rejection::TooShort);
        }

        let tx_power: i8 = r.read()?;
        let namespace = match layout {
            UidLayout::Compact => Namespace::from_compact(r.read_array()?),
            UidLayout::Namespace | UidLayout::Full => Namespace(r.read_array()?),
        };
        let instance = match layout {
            UidLayout::Full => Some(InstanceId(r.read_array()?)),
            UidLayout::Compact | UidLayout::Namespace => None,
        };
        Ok(Self {
            tx_power,
            namespace,
            instance,
        })
    }

    /// Writes the frame for `layout`, starting at the frame type. A missing instance is sent as
    /// zeros.
    pub fn encode(&self, layout: UidLayout, w: &mut WriteCursor<'_>) -> Result<(), codec::Error> {
        w.write(FRAME_TYPE_UID)?;
        w.write(self.tx_power)?;
        match layout {
            UidLayout::Compact => w.append(self.namespace.compact())?,
            UidLayout::Namespace => w.append(self.namespace.as_bytes())?,
            UidLayout::Full => {
                w.append(self.namespace.as_bytes())?;
                w.append(self.instance.unwrap_or_default().as_bytes())?;
                w.append(&[0; RFU_LEN])?;
            }
        }
        Ok(())
    }
}

/// Decodes a namespace-carrying UID frame from a 16-bit service data payload.
///
/// Uses [`UidLayout::Namespace`], which needs 11 bytes after the frame type. The 6-byte
/// namespace frame of the deployed beacon firmware is shorter and only decodes with
/// `decode_eddystone_uid_with(payload, UidLayout::Compact)`.
pub fn decode_eddystone_uid(service_data: &[u8]) -> Option<EddystoneUid> {
    decode_eddystone_uid_with(service_data, UidLayout::Namespace)
}

/// Like [`decode_eddystone_uid`] with an explicit layout.
pub fn decode_eddystone_uid_with(service_data: &[u8], layout: UidLayout) -> Option<EddystoneUid> {
    EddystoneUid::try_decode(service_data, layout).ok()
}

/// First UID frame found in a complete advertising payload.
pub fn find_eddystone_uid(adv_data: &[u8], layout: UidLayout) -> Option<EddystoneUid> {
    service_data16(adv_data).find_map(|payload| decode_eddystone_uid_with(payload, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad_structure::parse;

    const NAMESPACE: [u8; 10] = [0x53, 0x4c, 0x42, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    fn full_frame() -> [u8; 22] {
        let mut p = [0u8; 22];
        p[..4].copy_from_slice(&[0xaa, 0xfe, 0x00, 0xeb]);
        p[4..14].copy_from_slice(&NAMESPACE);
        p[14..20].copy_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        p
    }

    #[test]
    fn decode_full_frame() {
        let p = full_frame();
        let uid = decode_eddystone_uid_with(&p, UidLayout::Full).unwrap();
        assert_eq!(uid.tx_power, -21);
        assert_eq!(uid.namespace, Namespace(NAMESPACE));
        assert_eq!(uid.instance, Some(InstanceId([0x01, 0x02, 0x03, 0x04, 0x05, 0x06])));

        let uid = decode_eddystone_uid(&p).unwrap();
        assert_eq!(uid.namespace, Namespace(NAMESPACE));
        assert_eq!(uid.instance, None);
    }

    #[test]
    fn rejection_reasons() {
        let p = full_frame();
        assert_eq!(EddystoneUid::try_decode(&p[..1], UidLayout::Full), Err(Rejection::TooShort));
        assert_eq!(EddystoneUid::try_decode(&p[..2], UidLayout::Full), Err(Rejection::TooShort));

        let mut other = p;
        other[0] = 0xab;
        assert_eq!(EddystoneUid::try_decode(&other, UidLayout::Full), Err(Rejection::NotEddystone));

        let mut url = p;
        url[2] = 0x10;
        assert_eq!(EddystoneUid::try_decode(&url, UidLayout::Full), Err(Rejection::NotUid));

        // instance cut short
        assert_eq!(EddystoneUid::try_decode(&p[..19], UidLayout::Full), Err(Rejection::TooShort));
        assert!(EddystoneUid::try_decode(&p[..20], UidLayout::Full).is_ok());
    }

    #[test]
    fn namespace_layout_needs_eleven_bytes_after_frame_type() {
        let p = full_frame();
        assert!(decode_eddystone_uid(&p[..13]).is_none());
        assert!(decode_eddystone_uid(&p[..14]).is_some());
        for len in 0..11 {
            assert!(decode_eddystone_uid(&p[..len]).is_none());
        }
    }

    #[test]
    fn decode_scanned_compact_frame() {
        let scanned = [
            0x02, 0x01, 0x06, 0x03, 0x03, 0xaa, 0xfe, 0x0b, 0x16, 0xaa, 0xfe, 0x00, 0x00, 0x53, 0x4c, 0x42, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let record = parse(&scanned).find(|r| r.is_service_data16()).unwrap();
        let uid = decode_eddystone_uid_with(record.data, UidLayout::Compact).unwrap();
        assert_eq!(uid.tx_power, 0);
        assert_eq!(uid.namespace.as_bytes(), &NAMESPACE);
        assert_eq!(uid.instance, None);

        assert_eq!(find_eddystone_uid(&scanned, UidLayout::Compact), Some(uid));
        // the compact frame is too short for the 10-byte namespace layout
        assert_eq!(find_eddystone_uid(&scanned, UidLayout::Namespace), None);
    }

    #[test]
    fn encode_matches_layout_length() {
        let uid = EddystoneUid {
            tx_power: -4,
            namespace: Namespace(NAMESPACE),
            instance: Some(InstanceId([9; 6])),
        };
        for layout in [UidLayout::Compact, UidLayout::Namespace, UidLayout::Full] {
            let mut buf = [0u8; MAX_FRAME_LEN + 2];
            let mut w = WriteCursor::new(&mut buf[2..]);
            uid.encode(layout, &mut w).unwrap();
            let n = w.len();
            assert_eq!(n, layout.frame_len());

            buf[..2].copy_from_slice(&EDDYSTONE_UUID.to_le_bytes());
            let decoded = decode_eddystone_uid_with(&buf[..n + 2], layout).unwrap();
            assert_eq!(decoded.tx_power, -4);
            assert_eq!(decoded.namespace, Namespace(NAMESPACE));
        }
    }

    const LAYOUTS: [UidLayout; 3] = [UidLayout::Compact, UidLayout::Namespace, UidLayout::Full];

    fn decode_all(payload: &[u8]) {
        for layout in LAYOUTS {
            if EddystoneUid::try_decode(payload, layout).is_ok() {
                assert!(payload.len() >= 3 + layout.required_len(), "{:02x?}", payload);
            }
            assert_eq!(
                decode_eddystone_uid_with(payload, layout).is_some(),
                EddystoneUid::try_decode(payload, layout).is_ok()
            );
        }
    }

    #[test]
    fn short_payloads_never_decode() {
        decode_all(&[]);
        for a in 0..=255u8 {
            decode_all(&[a]);
            for b in 0..=255u8 {
                decode_all(&[a, b]);
                for c in 0..=255u8 {
                    // shorter than any layout requires
                    decode_all(&[a, b, c]);
                }
            }
        }
    }

    #[test]
    fn mutated_scanned_buffer_never_panics() {
        let scanned = [
            0x02, 0x01, 0x06, 0x03, 0x03, 0xaa, 0xfe, 0x0b, 0x16, 0xaa, 0xfe, 0x00, 0x00, 0x53, 0x4c, 0x42, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        for len in 0..=scanned.len() {
            for i in 0..len {
                for v in 0..=255u8 {
                    let mut buf = scanned;
                    buf[i] = v;
                    let buf = &buf[..len];
                    for payload in service_data16(buf) {
                        decode_all(payload);
                    }
                    for layout in LAYOUTS {
                        let _ = find_eddystone_uid(buf, layout);
                    }
                }
            }
        }
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Namespace(NAMESPACE).to_string(), "534C4201000000000000");
    }
}
