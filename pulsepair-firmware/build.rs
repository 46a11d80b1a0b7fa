//! Build script for pulsepair-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in [stepper_pair]
const STEPPER_PAIR_KEYS: &[&str] = &[
    "max_speed",
    "max_delta_v",
    "high_pulse_us",
    "enable_inverted",
    "ramp",
    "max_accel",
];

/// Capacity of the firmware's sweep segment list
const MAX_SWEEP_SEGMENTS: usize = 8;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds machine.toml as its configuration.          ║\n\
            ║  Please create one in the pulsepair-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_stepper_pair(&config);
    validate_sweep(&config, &config_content);

    println!("cargo:warning=machine.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fail the build with a list of problems found in one section
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Read an optional positive integer key
fn positive_int(table: &toml::Table, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if *v > 0 && *v <= u32::MAX as i64 => Some(*v),
        Some(_) => {
            errors.push(format!("[stepper_pair] {} must be a positive integer", key));
            None
        }
    }
}

/// Validate the [stepper_pair] section
fn validate_stepper_pair(config: &toml::Value) {
    let mut errors = Vec::new();

    for key in config.as_table().map(|t| t.keys()).into_iter().flatten() {
        if key != "stepper_pair" && key != "sweep" {
            errors.push(format!("unknown section [{}]", key));
        }
    }

    let pair = match config.get("stepper_pair") {
        None => {
            report("Invalid top-level configuration", &errors);
            return;
        }
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[stepper_pair] must be a table".to_string());
            report("Invalid top-level configuration", &errors);
            return;
        }
    };
    report("Invalid top-level configuration", &errors);

    for key in pair.keys() {
        if !STEPPER_PAIR_KEYS.contains(&key.as_str()) {
            errors.push(format!("[stepper_pair] unknown key '{}'", key));
        }
    }

    let max_speed = positive_int(pair, "max_speed", &mut errors).unwrap_or(35_000);
    positive_int(pair, "max_delta_v", &mut errors);
    let high_pulse_us = positive_int(pair, "high_pulse_us", &mut errors).unwrap_or(3);
    positive_int(pair, "max_accel", &mut errors);

    // Fastest speed whose rounded period still exceeds the high pulse
    let speed_limit = 2_000_000 / (2 * high_pulse_us + 1);
    if max_speed > speed_limit {
        errors.push(format!(
            "[stepper_pair] max_speed must be at most {} for this high_pulse_us",
            speed_limit
        ));
    }

    if let Some(value) = pair.get("enable_inverted") {
        if !value.is_bool() {
            errors.push("[stepper_pair] enable_inverted must be true or false".to_string());
        }
    }

    match pair.get("ramp") {
        None => {}
        Some(toml::Value::String(mode)) if mode == "pulse_wait" || mode == "linear" => {}
        Some(_) => {
            errors.push("[stepper_pair] ramp must be 'pulse_wait' or 'linear'".to_string());
        }
    }

    report("Invalid stepper_pair configuration", &errors);
}

/// Validate the [sweep] section
fn validate_sweep(config: &toml::Value, raw: &str) {
    let sweep = match config.get("sweep") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            report("Invalid sweep configuration", &["[sweep] must be a table".to_string()]);
            return;
        }
        None => return,
    };

    let mut errors = Vec::new();

    for key in sweep.keys() {
        if key != "segments" {
            errors.push(format!("[sweep] unknown key '{}'", key));
        }
    }

    match sweep.get("segments") {
        Some(toml::Value::Array(segments)) => {
            if segments.len() > MAX_SWEEP_SEGMENTS {
                errors.push(format!("[sweep] at most {} segments", MAX_SWEEP_SEGMENTS));
            }

            for (i, segment) in segments.iter().enumerate() {
                let segment = match segment.as_table() {
                    Some(t) => t,
                    None => {
                        errors.push(format!("[sweep] segment {} must be an inline table", i));
                        continue;
                    }
                };

                match segment.get("speed") {
                    Some(toml::Value::Integer(v)) if i32::try_from(*v).is_ok() => {}
                    _ => errors.push(format!("[sweep] segment {} needs an integer 'speed'", i)),
                }
                match segment.get("hold_ms") {
                    Some(toml::Value::Integer(v)) if u32::try_from(*v).is_ok() => {}
                    _ => errors.push(format!("[sweep] segment {} needs a 'hold_ms' >= 0", i)),
                }
                for key in segment.keys() {
                    if key != "speed" && key != "hold_ms" {
                        errors.push(format!("[sweep] segment {} unknown key '{}'", i, key));
                    }
                }
            }

            // The on-target parser reads arrays from a single line
            let single_line = raw
                .lines()
                .map(|line| line.split('#').next().unwrap_or("").trim())
                .filter(|line| line.starts_with("segments"))
                .all(|line| line.ends_with(']'));
            if !single_line {
                errors.push("[sweep] segments must be written on one line".to_string());
            }
        }
        Some(_) => errors.push("[sweep] segments must be an array".to_string()),
        None => {}
    }

    report("Invalid sweep configuration", &errors);
}
