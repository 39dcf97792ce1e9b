//! Passive observation of other beacons.
use core::cell::RefCell;

use bt_hci::param::{AddrKind, BdAddr, LeAdvEventKind};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use crate::eddystone::{find_eddystone_uid, EddystoneUid, UidLayout};

/// The peer whose advertisements are decoded.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanTarget {
    pub kind: AddrKind,
    pub addr: BdAddr,
}

impl ScanTarget {
    pub fn new(kind: AddrKind, addr: [u8; 6]) -> Self {
        Self {
            kind,
            addr: BdAddr::new(addr),
        }
    }

    /// Compares address type and the raw address bytes.
    pub fn matches(&self, kind: AddrKind, addr: &BdAddr) -> bool {
        self.kind == kind && self.addr.raw() == addr.raw()
    }
}

/// One received advertisement, as handed over by the platform's scan callback.
#[derive(Debug, Clone, Copy)]
pub struct ScanReport<'d> {
    pub kind: AddrKind,
    pub addr: BdAddr,
    pub rssi: i8,
    pub event_kind: LeAdvEventKind,
    pub data: &'d [u8],
}

/// A decoded frame together with who sent it.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sighting {
    pub kind: AddrKind,
    pub addr: BdAddr,
    pub rssi: i8,
    pub frame: EddystoneUid,
}

/// Filters scan reports by address and decodes Eddystone-UID frames.
///
/// Keeps the last `N` sightings, oldest evicted first. Reports are processed through `&self`
/// so the observer can be shared between the scan callback and the application.
pub struct Observer<M: RawMutex, const N: usize> {
    target: Option<ScanTarget>,
    layout: UidLayout,
    sightings: Mutex<M, RefCell<Deque<Sighting, N>>>,
}

impl<M: RawMutex, const N: usize> Observer<M, N> {
    /// With no target every advertiser is decoded.
    pub const fn new(target: Option<ScanTarget>, layout: UidLayout) -> Self {
        Self {
            target,
            layout,
            sightings: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub fn target(&self) -> Option<&ScanTarget> {
        self.target.as_ref()
    }

    /// Handles one advertisement. Returns the decoded frame if the report came from the target
    /// and carried a UID frame.
    pub fn on_report(&self, report: &ScanReport<'_>) -> Option<EddystoneUid> {
        if let Some(target) = &self.target {
            if !target.matches(report.kind, &report.addr) {
                return None;
            }
        }
        let frame = find_eddystone_uid(report.data, self.layout)?;
        info!(
            "[observer] {:?} rssi {} tx {} namespace {}",
            report.addr, report.rssi, frame.tx_power, frame.namespace
        );

        let sighting = Sighting {
            kind: report.kind,
            addr: report.addr,
            rssi: report.rssi,
            frame,
        };
        self.sightings.lock(|sightings| {
            let mut sightings = sightings.borrow_mut();
            if sightings.is_full() {
                sightings.pop_front();
            }
            // Cannot fail, a slot was freed above.
            let _ = sightings.push_back(sighting);
        });
        Some(frame)
    }

    pub fn last_seen(&self) -> Option<Sighting> {
        self.sightings.lock(|sightings| sightings.borrow().back().copied())
    }

    /// Calls `f` for each retained sighting, oldest first.
    pub fn for_each_sighting(&self, mut f: impl FnMut(&Sighting)) {
        self.sightings.lock(|sightings| sightings.borrow().iter().for_each(|s| f(s)));
    }

    pub fn len(&self) -> usize {
        self.sightings.lock(|sightings| sightings.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.sightings.lock(|sightings| sightings.borrow_mut().clear());
    }
}
