//! Namespace rotation.
//!
//! The [`Rotator`] owns the broadcast [`BeaconPayload`] and, on every tick, installs the other
//! namespace constant and restarts advertising with it.
use crate::ad_structure::{AdStructure, Uuid16List, BR_EDR_NOT_SUPPORTED, MAX_ADV_DATA_LEN};
use crate::beacon::{BeaconPayload, RotationState};
use crate::codec;
use crate::eddystone::{InstanceId, Namespace, UidLayout, EDDYSTONE_UUID};
use crate::radio::BeaconRadio;

/// Name advertised alongside the beacon frame.
pub const DEVICE_NAME: &[u8] = b"L4S3C 8SL";

/// Namespace the beacon starts with.
pub const INITIAL_NAMESPACE: Namespace = Namespace::new([0x53, 0x4c, 0x42, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

/// The two namespaces the beacon alternates between.
pub const ROTATION_NAMESPACES: [Namespace; 2] = [
    Namespace::new([0x53, 0x4c, 0x42, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    Namespace::new([0x53, 0x4c, 0x42, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
];

/// Runtime configuration of a [`Rotator`].
#[derive(Debug, Clone, Copy)]
pub struct RotationConfig<'d> {
    /// Installed on odd and even ticks respectively.
    pub namespaces: [Namespace; 2],
    /// Complete local name, omitted when empty.
    pub device_name: &'d [u8],
}

impl Default for RotationConfig<'static> {
    fn default() -> Self {
        Self {
            namespaces: ROTATION_NAMESPACES,
            device_name: DEVICE_NAME,
        }
    }
}

/// Payload a freshly booted beacon advertises: compact frame, tx power 0, initial namespace.
pub const fn default_payload() -> BeaconPayload {
    BeaconPayload::compact(0, INITIAL_NAMESPACE)
}

/// Full-layout variant of [`default_payload`].
pub const fn default_full_payload(instance: InstanceId) -> BeaconPayload {
    BeaconPayload::full(0, INITIAL_NAMESPACE, instance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationError<E> {
    /// Scanning or advertising could not be halted. The new namespace is installed but not
    /// broadcast; the previous advertisement may still be on air.
    StopFailed(E),
    /// Advertising could not be restarted. The radio may be silent.
    StartFailed(E),
    /// The advertising data did not fit.
    Encode(codec::Error),
}

impl<E> From<codec::Error> for RotationError<E> {
    fn from(error: codec::Error) -> Self {
        Self::Encode(error)
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for RotationError<E>
where
    E: defmt::Format,
{
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            RotationError::StopFailed(e) => {
                defmt::write!(fmt, "StopFailed({})", e)
            }
            RotationError::StartFailed(e) => {
                defmt::write!(fmt, "StartFailed({})", e)
            }
            RotationError::Encode(e) => {
                defmt::write!(fmt, "Encode({})", e)
            }
        }
    }
}

/// Encoded advertising data and scan response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingSet {
    adv: [u8; MAX_ADV_DATA_LEN],
    adv_len: usize,
    scan: [u8; MAX_ADV_DATA_LEN],
    scan_len: usize,
}

impl AdvertisingSet {
    pub fn adv_data(&self) -> &[u8] {
        &self.adv[..self.adv_len]
    }

    pub fn scan_data(&self) -> &[u8] {
        &self.scan[..self.scan_len]
    }
}

/// Owns the broadcast payload and rotates its namespace.
pub struct Rotator<'d, R: BeaconRadio> {
    radio: R,
    payload: BeaconPayload,
    config: RotationConfig<'d>,
    on_air: Option<RotationState>,
}

impl<'d, R: BeaconRadio> Rotator<'d, R> {
    /// Fails if the advertising data for this payload and name exceeds legacy advertising limits,
    /// or if a compact payload would be given a namespace whose last four bytes it cannot carry.
    pub fn new(radio: R, payload: BeaconPayload, config: RotationConfig<'d>) -> Result<Self, codec::Error> {
        if payload.layout() == UidLayout::Compact
            && !core::iter::once(payload.namespace())
                .chain(config.namespaces.iter())
                .all(Namespace::fits_compact)
        {
            return Err(codec::Error::InvalidValue);
        }
        let rotator = Self {
            radio,
            payload,
            config,
            on_air: None,
        };
        rotator.advertising_set()?;
        Ok(rotator)
    }

    pub fn payload(&self) -> &BeaconPayload {
        &self.payload
    }

    /// State of the namespace currently broadcast, `None` while the radio is not known to be
    /// advertising.
    pub fn on_air(&self) -> Option<RotationState> {
        self.on_air
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn into_radio(self) -> R {
        self.radio
    }

    /// Builds the records for the installed payload.
    ///
    /// The compact frame carries the name in the advertisement, the full frame needs the room
    /// and moves the name to the scan response.
    pub fn advertising_set(&self) -> Result<AdvertisingSet, codec::Error> {
        let (frame, frame_len) = self.payload.to_frame_bytes()?;
        let uuids = EDDYSTONE_UUID.to_le_bytes();
        let flags = AdStructure::Flags(BR_EDR_NOT_SUPPORTED);
        let uuid_list = AdStructure::ServiceUuids16(Uuid16List::new(&uuids));
        let service_data = AdStructure::ServiceData16 {
            uuid: EDDYSTONE_UUID,
            data: &frame[..frame_len],
        };
        let name = AdStructure::CompleteLocalName(self.config.device_name);
        let has_name = !self.config.device_name.is_empty();

        let mut set = AdvertisingSet {
            adv: [0; MAX_ADV_DATA_LEN],
            adv_len: 0,
            scan: [0; MAX_ADV_DATA_LEN],
            scan_len: 0,
        };
        match (self.payload.layout(), has_name) {
            (UidLayout::Compact, true) => {
                set.adv_len = AdStructure::encode_slice(&[flags, name, uuid_list, service_data], &mut set.adv[..])?;
            }
            (_, false) => {
                set.adv_len = AdStructure::encode_slice(&[flags, uuid_list, service_data], &mut set.adv[..])?;
            }
            (UidLayout::Namespace | UidLayout::Full, true) => {
                set.adv_len = AdStructure::encode_slice(&[flags, uuid_list, service_data], &mut set.adv[..])?;
                set.scan_len = AdStructure::encode_slice(&[name], &mut set.scan[..])?;
            }
        }
        Ok(set)
    }

    /// Starts advertising the installed payload.
    pub async fn start(&mut self) -> Result<(), RotationError<R::Error>> {
        let set = self.advertising_set()?;
        self.radio
            .start_advertising(set.adv_data(), set.scan_data())
            .await
            .map_err(RotationError::StartFailed)?;
        self.on_air = Some(self.payload.state());
        debug!("[rotation] advertising namespace {}", self.payload.namespace());
        Ok(())
    }

    /// Installs the next namespace and re-broadcasts.
    ///
    /// The namespace is written before the radio is touched, so after a
    /// [`RotationError::StopFailed`] the payload already holds the new namespace while the old
    /// advertisement stays on air. No step is retried; [`Self::rebroadcast`] is the retry.
    pub async fn advance(&mut self) -> Result<(), RotationError<R::Error>> {
        let next = self.payload.state().next();
        let namespace = match next.index() {
            Some(i) => self.config.namespaces[i],
            None => *self.payload.namespace(),
        };
        self.payload.install(next, namespace);
        trace!("[rotation] installed {:?} namespace {}", next, namespace);
        self.rebroadcast().await
    }

    /// Halts the radio and broadcasts the installed payload again, without rotating.
    ///
    /// Use after a [`RotationError::StopFailed`] to get the installed namespace on air.
    pub async fn rebroadcast(&mut self) -> Result<(), RotationError<R::Error>> {
        let set = self.advertising_set()?;

        self.radio.stop_scan().await.map_err(RotationError::StopFailed)?;
        self.radio.stop_advertising().await.map_err(RotationError::StopFailed)?;
        self.on_air = None;

        self.radio
            .start_advertising(set.adv_data(), set.scan_data())
            .await
            .map_err(RotationError::StartFailed)?;
        self.on_air = Some(self.payload.state());
        Ok(())
    }
}
