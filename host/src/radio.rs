//! Radio capabilities the beacon needs from the platform.
//!
//! The platform owns the controller and the BLE stack. The beacon only ever asks it to stop and
//! start scanning and advertising.

/// Advertising and scanning control of a BLE radio.
pub trait BeaconRadio {
    type Error;

    /// Halts passive scanning. Succeeds if no scan is running.
    async fn stop_scan(&mut self) -> Result<(), Self::Error>;

    /// Halts the current advertisement.
    async fn stop_advertising(&mut self) -> Result<(), Self::Error>;

    /// Starts a non-connectable advertisement with the given encoded AD records.
    ///
    /// `scan_data` is the scan response; it is empty when the advertisement is not scannable.
    async fn start_advertising(&mut self, adv_data: &[u8], scan_data: &[u8]) -> Result<(), Self::Error>;

    /// Starts passive scanning. Reports are delivered by the platform, see
    /// [`Observer::on_report`](crate::observer::Observer::on_report).
    async fn start_scan(&mut self) -> Result<(), Self::Error>;
}

impl<T: BeaconRadio> BeaconRadio for &mut T {
    type Error = T::Error;

    async fn stop_scan(&mut self) -> Result<(), Self::Error> {
        T::stop_scan(self).await
    }

    async fn stop_advertising(&mut self) -> Result<(), Self::Error> {
        T::stop_advertising(self).await
    }

    async fn start_advertising(&mut self, adv_data: &[u8], scan_data: &[u8]) -> Result<(), Self::Error> {
        T::start_advertising(self, adv_data, scan_data).await
    }

    async fn start_scan(&mut self) -> Result<(), Self::Error> {
        T::start_scan(self).await
    }
}
