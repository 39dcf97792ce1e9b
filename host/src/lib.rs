//! Rotating Eddystone-UID beacon.
//!
//! Two independent pieces make up a beacon node:
//!
//! - [`ad_structure`] and [`eddystone`] parse scanned advertising data and pull Eddystone-UID
//!   frames out of it, never reading past the received buffer.
//! - [`rotation`] owns the broadcast [`beacon::BeaconPayload`] and swaps its namespace between
//!   two constants on every tick, halting and restarting the radio around the change.
//!
//! The radio itself is reached through the [`radio::BeaconRadio`] trait.
#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

mod fmt;

pub mod ad_structure;
pub mod beacon;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod eddystone;
pub mod node;
pub mod observer;
pub mod radio;
pub mod rotation;

pub use ad_structure::{parse, AdRecord, AdStructure};
pub use eddystone::{decode_eddystone_uid, decode_eddystone_uid_with, EddystoneUid, UidLayout};
pub use rotation::{RotationError, Rotator};

pub mod prelude {
    pub use crate::ad_structure::{
        parse, service_data16, AdRecord, AdStructure, Uuid16List, BR_EDR_NOT_SUPPORTED, LE_GENERAL_DISCOVERABLE,
    };
    pub use crate::beacon::{BeaconPayload, RotationState};
    pub use crate::eddystone::{
        decode_eddystone_uid, decode_eddystone_uid_with, find_eddystone_uid, EddystoneUid, InstanceId, Namespace,
        Rejection, UidLayout, EDDYSTONE_UUID,
    };
    pub use crate::node::{BeaconNode, NodeError};
    pub use crate::observer::{Observer, ScanReport, ScanTarget, Sighting};
    pub use crate::radio::BeaconRadio;
    pub use crate::rotation::{RotationConfig, RotationError, Rotator};
}
