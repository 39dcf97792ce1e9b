//! Compile-time configuration.
//!
//! Settings are read from environment variables at build time. Set the variable named
//! `EDDYSTONE_HOST_<name>`, for example `EDDYSTONE_HOST_ROTATION_INTERVAL_SECS=30 cargo build`.
//! You can also set them in the `[env]` section of `.cargo/config.toml`. Unset variables keep
//! their default.

mod raw {
    #![allow(unused)]
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

/// Seconds between two namespace rotations.
///
/// Default: 8.
pub const ROTATION_INTERVAL_SECS: u64 = raw::ROTATION_INTERVAL_SECS;

/// Resume passive scanning after each rotation.
///
/// A rotation halts scanning before it restarts advertising. Set to 0 to leave scanning off.
///
/// Default: 1.
pub const SCAN_WHILE_ADVERTISING: bool = raw::SCAN_WHILE_ADVERTISING != 0;
