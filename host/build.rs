use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;
use std::{env, fs};

static CONFIGS: &[(&str, u64)] = &[
    // BEGIN AUTOGENERATED CONFIG FEATURES
    ("ROTATION_INTERVAL_SECS", 8),
    ("SCAN_WHILE_ADVERTISING", 1),
    // END AUTOGENERATED CONFIG FEATURES
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let prefix = env::var("CARGO_PKG_NAME")
        .unwrap()
        .to_ascii_uppercase()
        .replace('-', "_");

    let mut configs: HashMap<&str, u64> = CONFIGS.iter().copied().collect();
    for (name, value) in configs.iter_mut() {
        let var = format!("{}_{}", prefix, name);
        println!("cargo:rerun-if-env-changed={}", var);
        if let Ok(raw) = env::var(&var) {
            *value = match raw.parse() {
                Ok(v) => v,
                Err(_) => panic!("{} must be an unsigned integer, got {:?}", var, raw),
            };
        }
    }

    if configs["ROTATION_INTERVAL_SECS"] == 0 {
        panic!("{}_ROTATION_INTERVAL_SECS must be at least 1", prefix);
    }

    let mut data = String::new();
    for (name, _) in CONFIGS {
        writeln!(data, "pub const {}: u64 = {};", name, configs[name]).unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::write(out_dir.join("config.rs"), data).unwrap();
}
