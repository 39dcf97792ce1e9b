//! The advertised beacon payload.
use crate::codec;
use crate::cursor::WriteCursor;
use crate::eddystone::{EddystoneUid, InstanceId, Namespace, UidLayout, MAX_FRAME_LEN};

/// Which namespace is installed in a [`BeaconPayload`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RotationState {
    /// The namespace the payload was built with, before the first rotation.
    Initial,
    /// First rotation constant.
    A,
    /// Second rotation constant.
    B,
}

impl RotationState {
    /// State installed by the next rotation tick.
    pub const fn next(self) -> Self {
        match self {
            RotationState::Initial | RotationState::B => RotationState::A,
            RotationState::A => RotationState::B,
        }
    }

    /// Index into the pair of rotation constants, `None` before the first rotation.
    pub const fn index(self) -> Option<usize> {
        match self {
            RotationState::Initial => None,
            RotationState::A => Some(0),
            RotationState::B => Some(1),
        }
    }
}

/// Eddystone-UID frame broadcast by this node.
///
/// The layout is chosen at construction and never changes. The namespace can only be replaced
/// as a whole, together with the state it belongs to.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconPayload {
    layout: UidLayout,
    tx_power: i8,
    namespace: Namespace,
    instance: InstanceId,
    state: RotationState,
}

impl BeaconPayload {
    pub const fn new(layout: UidLayout, tx_power: i8, namespace: Namespace, instance: InstanceId) -> Self {
        Self {
            layout,
            tx_power,
            namespace,
            instance,
            state: RotationState::Initial,
        }
    }

    /// Short frame with a 6-byte namespace and no instance.
    pub const fn compact(tx_power: i8, namespace: Namespace) -> Self {
        Self::new(UidLayout::Compact, tx_power, namespace, InstanceId([0; 6]))
    }

    /// Complete UID frame with instance and reserved bytes.
    pub const fn full(tx_power: i8, namespace: Namespace, instance: InstanceId) -> Self {
        Self::new(UidLayout::Full, tx_power, namespace, instance)
    }

    pub fn layout(&self) -> UidLayout {
        self.layout
    }

    pub fn tx_power(&self) -> i8 {
        self.tx_power
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn instance(&self) -> Option<&InstanceId> {
        match self.layout {
            UidLayout::Full => Some(&self.instance),
            UidLayout::Compact | UidLayout::Namespace => None,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Replaces the namespace and records the state it belongs to.
    pub(crate) fn install(&mut self, state: RotationState, namespace: Namespace) {
        self.namespace = namespace;
        self.state = state;
    }

    /// The frame as a receiver decoding with [`Self::layout`] would see it.
    pub fn frame(&self) -> EddystoneUid {
        EddystoneUid {
            tx_power: self.tx_power,
            namespace: match self.layout {
                UidLayout::Compact => {
                    let mut compact = [0; 6];
                    compact.copy_from_slice(self.namespace.compact());
                    Namespace::from_compact(compact)
                }
                UidLayout::Namespace | UidLayout::Full => self.namespace,
            },
            instance: self.instance().copied(),
        }
    }

    /// Encodes the service data that follows the Eddystone UUID.
    pub fn encode<'b>(&self, dest: &'b mut [u8]) -> Result<&'b [u8], codec::Error> {
        let mut w = WriteCursor::new(dest);
        self.frame().encode(self.layout, &mut w)?;
        Ok(w.finish())
    }

    /// Encoded service data in a buffer of its own.
    pub fn to_frame_bytes(&self) -> Result<([u8; MAX_FRAME_LEN], usize), codec::Error> {
        let mut buf = [0; MAX_FRAME_LEN];
        let len = self.encode(&mut buf[..])?.len();
        Ok((buf, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL: Namespace = Namespace::new([0x53, 0x4c, 0x42, 0x01, 0, 0, 0, 0, 0, 0]);
    const OTHER: Namespace = Namespace::new([0x53, 0x4c, 0x42, 0x03, 0, 0, 0, 0, 0, 0]);

    #[test]
    fn state_cycle() {
        let s = RotationState::Initial;
        assert_eq!(s.next(), RotationState::A);
        assert_eq!(s.next().next(), RotationState::B);
        assert_eq!(s.next().next().next(), RotationState::A);
        assert_eq!(RotationState::Initial.index(), None);
        assert_eq!(RotationState::B.index(), Some(1));
    }

    #[test]
    fn compact_encoding_matches_firmware_frame() {
        let payload = BeaconPayload::compact(0, INITIAL);
        let (buf, len) = payload.to_frame_bytes().unwrap();
        assert_eq!(&buf[..len], &[0x00, 0x00, 0x53, 0x4c, 0x42, 0x01, 0x00, 0x00]);
        assert_eq!(payload.instance(), None);
    }

    #[test]
    fn full_encoding_has_instance_and_rfu() {
        let payload = BeaconPayload::full(-12, INITIAL, InstanceId([1, 2, 3, 4, 5, 6]));
        let (buf, len) = payload.to_frame_bytes().unwrap();
        assert_eq!(len, 20);
        assert_eq!(buf[0], 0x00);
        assert_eq!(buf[1] as i8, -12);
        assert_eq!(&buf[2..12], INITIAL.as_bytes());
        assert_eq!(&buf[12..18], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&buf[18..20], &[0, 0]);
    }

    #[test]
    fn install_replaces_whole_namespace() {
        let mut payload = BeaconPayload::full(0, INITIAL, InstanceId::default());
        assert_eq!(payload.state(), RotationState::Initial);
        payload.install(RotationState::A, OTHER);
        assert_eq!(payload.namespace(), &OTHER);
        assert_eq!(payload.state(), RotationState::A);
        assert_eq!(payload.layout(), UidLayout::Full);
    }

    #[test]
    fn encode_into_small_buffer_fails() {
        let payload = BeaconPayload::full(0, INITIAL, InstanceId::default());
        let mut buf = [0u8; 8];
        assert_eq!(payload.encode(&mut buf[..]), Err(codec::Error::InsufficientSpace));
    }
}
