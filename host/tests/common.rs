use eddystone_host::radio::BeaconRadio;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StopScan,
    StopAdvertising,
    StartAdvertising { adv: Vec<u8>, scan: Vec<u8> },
    StartScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub &'static str);

/// Records every request and simulates what is on air.
#[derive(Debug, Default)]
pub struct MockRadio {
    pub calls: Vec<Call>,
    pub on_air: Option<Vec<u8>>,
    pub scanning: bool,
    pub fail_stop_scan: bool,
    pub fail_stop_advertising: bool,
    pub fail_start_advertising: bool,
    pub fail_start_scan: bool,
}

#[allow(unused)]
impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::StartAdvertising { .. }))
            .count()
    }
}

impl BeaconRadio for MockRadio {
    type Error = MockError;

    async fn stop_scan(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::StopScan);
        if self.fail_stop_scan {
            return Err(MockError("stop scan"));
        }
        self.scanning = false;
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::StopAdvertising);
        if self.fail_stop_advertising {
            return Err(MockError("stop advertising"));
        }
        self.on_air = None;
        Ok(())
    }

    async fn start_advertising(&mut self, adv_data: &[u8], scan_data: &[u8]) -> Result<(), MockError> {
        self.calls.push(Call::StartAdvertising {
            adv: adv_data.to_vec(),
            scan: scan_data.to_vec(),
        });
        if self.fail_start_advertising {
            return Err(MockError("start advertising"));
        }
        self.on_air = Some(adv_data.to_vec());
        Ok(())
    }

    async fn start_scan(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::StartScan);
        if self.fail_start_scan {
            return Err(MockError("start scan"));
        }
        self.scanning = true;
        Ok(())
    }
}
