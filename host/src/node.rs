//! Beacon node run loop.
use embassy_time::{Duration, Ticker};

use crate::config;
use crate::radio::BeaconRadio;
use crate::rotation::{RotationError, Rotator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError<E> {
    Rotation(RotationError<E>),
    /// Scanning could not be (re)started. Advertising is unaffected.
    Scan(E),
}

impl<E> From<RotationError<E>> for NodeError<E> {
    fn from(error: RotationError<E>) -> Self {
        Self::Rotation(error)
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for NodeError<E>
where
    E: defmt::Format,
{
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            NodeError::Rotation(e) => {
                defmt::write!(fmt, "Rotation({})", e)
            }
            NodeError::Scan(e) => {
                defmt::write!(fmt, "Scan({})", e)
            }
        }
    }
}

/// Drives a [`Rotator`] on a fixed period and keeps passive scanning alive around it.
pub struct BeaconNode<'d, R: BeaconRadio> {
    rotator: Rotator<'d, R>,
    scanning: bool,
    // last tick could not halt the radio, the installed namespace never went on air
    halt_pending: bool,
}

impl<'d, R: BeaconRadio> BeaconNode<'d, R> {
    pub fn new(rotator: Rotator<'d, R>) -> Self {
        Self {
            rotator,
            scanning: config::SCAN_WHILE_ADVERTISING,
            halt_pending: false,
        }
    }

    /// Overrides [`config::SCAN_WHILE_ADVERTISING`].
    pub fn with_scanning(mut self, scanning: bool) -> Self {
        self.scanning = scanning;
        self
    }

    pub fn rotator(&self) -> &Rotator<'d, R> {
        &self.rotator
    }

    pub fn rotator_mut(&mut self) -> &mut Rotator<'d, R> {
        &mut self.rotator
    }

    /// Starts advertising the initial payload, then scanning if enabled.
    pub async fn start(&mut self) -> Result<(), NodeError<R::Error>> {
        self.rotator.start().await?;
        info!("[node] beacon started, namespace {}", self.rotator.payload().namespace());
        self.resume_scan().await
    }

    /// One rotation tick.
    ///
    /// After a tick that failed to halt the radio, the next tick retries the halt and broadcasts
    /// the namespace installed back then instead of rotating past it.
    pub async fn tick(&mut self) -> Result<(), NodeError<R::Error>> {
        let result = if self.halt_pending {
            debug!("[node] retrying halt for namespace {}", self.rotator.payload().namespace());
            self.rotator.rebroadcast().await
        } else {
            self.rotator.advance().await
        };
        match result {
            Ok(()) => {
                self.halt_pending = false;
                info!("[node] broadcasting namespace {}", self.rotator.payload().namespace());
            }
            Err(e) => {
                self.halt_pending = matches!(e, RotationError::StopFailed(_));
                match &e {
                    RotationError::StopFailed(_) => {
                        warn!("[node] failed to stop radio, previous namespace still on air")
                    }
                    RotationError::StartFailed(_) => warn!("[node] failed to restart advertising"),
                    RotationError::Encode(_) => error!("[node] advertising data does not fit"),
                }
                return Err(e.into());
            }
        }
        self.resume_scan().await
    }

    /// Ticks every [`config::ROTATION_INTERVAL_SECS`] seconds, forever.
    ///
    /// Failed ticks are logged and the next tick tries again.
    pub async fn run(&mut self) -> ! {
        self.run_every(Duration::from_secs(config::ROTATION_INTERVAL_SECS)).await
    }

    /// [`Self::run`] with an explicit period.
    pub async fn run_every(&mut self, period: Duration) -> ! {
        let mut ticker = Ticker::every(period);
        loop {
            ticker.next().await;
            let _ = self.tick().await;
        }
    }

    async fn resume_scan(&mut self) -> Result<(), NodeError<R::Error>> {
        if !self.scanning {
            return Ok(());
        }
        if let Err(e) = self.rotator.radio_mut().start_scan().await {
            warn!("[node] failed to start scanning");
            return Err(NodeError::Scan(e));
        }
        Ok(())
    }
}
