//! Minimal TOML parser for machine configuration
//!
//! Handles only the subset needed for the PulsePair configuration and
//! does not allocate, so it runs on the target at boot.
//!
//! Supported features:
//! - `key = value` pairs (integer, boolean, string)
//! - `[section]` headers
//! - Single-line arrays of inline tables: `segments = [{ speed = 0, hold_ms = 200 }]`
//! - Comments (`# ...`) and `_` digit separators in integers
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Floats and datetimes
//! - Dotted keys

use super::types::{ConfigError, MachineConfig, SweepSegment};
use crate::motion::{RampMode, DEFAULT_MAX_ACCEL};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not a `key = value` pair
    InvalidLine,
    /// Key not recognised in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Values parsed but do not form a usable configuration
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    StepperPair,
    Sweep,
}

/// Parsed scalar value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value<'a> {
    Integer(i64),
    Boolean(bool),
    Str(&'a str),
    Array(&'a str),
}

/// Ramp selection is spread over two keys that may come in any order
#[derive(Default)]
struct RampKeys {
    linear: Option<bool>,
    max_accel: Option<u32>,
}

/// Parse TOML configuration into a validated [`MachineConfig`]
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;
    let mut ramp = RampKeys::default();

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::StepperPair => apply_stepper_pair(key, value, &mut config, &mut ramp)?,
            Section::Sweep => apply_sweep(key, value, &mut config)?,
        }
    }

    config.stepper_pair.ramp = match ramp.linear {
        Some(true) => RampMode::Linear {
            max_accel: ramp.max_accel.unwrap_or(DEFAULT_MAX_ACCEL),
        },
        _ => RampMode::PulseWait,
    };

    config.stepper_pair.validate()?;
    Ok(config)
}

/// Parse a section header like "stepper_pair"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "stepper_pair" => Ok(Section::StepperPair),
        "sweep" => Ok(Section::Sweep),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_stepper_pair(
    key: &str,
    value: Value<'_>,
    config: &mut MachineConfig,
    ramp: &mut RampKeys,
) -> Result<(), ParseError> {
    let pair = &mut config.stepper_pair;
    match key {
        "max_speed" => pair.max_speed = as_u32(value)?,
        "max_delta_v" => pair.max_delta_v = as_u32(value)?,
        "high_pulse_us" => pair.high_pulse_us = as_u32(value)?,
        "enable_inverted" => pair.enable_inverted = as_bool(value)?,
        "ramp" => {
            ramp.linear = Some(match as_str(value)? {
                "pulse_wait" => false,
                "linear" => true,
                _ => return Err(ParseError::InvalidValue),
            })
        }
        "max_accel" => ramp.max_accel = Some(as_u32(value)?),
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_sweep(key: &str, value: Value<'_>, config: &mut MachineConfig) -> Result<(), ParseError> {
    match key {
        "segments" => {
            let Value::Array(body) = value else {
                return Err(ParseError::InvalidValue);
            };
            config.sweep.segments.clear();
            for table in InlineTables::new(body) {
                let segment = parse_segment(table?)?;
                config
                    .sweep
                    .segments
                    .push(segment)
                    .map_err(|_| ParseError::TooManyItems)?;
            }
            Ok(())
        }
        _ => Err(ParseError::UnknownKey),
    }
}

/// Parse the body of `{ speed = 1000, hold_ms = 2000 }`
fn parse_segment(body: &str) -> Result<SweepSegment, ParseError> {
    let mut speed = None;
    let mut hold_ms = None;

    for pair in body.split(',') {
        if pair.trim().is_empty() {
            continue;
        }
        let (key, value) = parse_key_value(pair).ok_or(ParseError::InvalidLine)?;
        match key {
            "speed" => speed = Some(as_i32(value)?),
            "hold_ms" => hold_ms = Some(as_u32(value)?),
            _ => return Err(ParseError::UnknownKey),
        }
    }

    match (speed, hold_ms) {
        (Some(speed), Some(hold_ms)) => Ok(SweepSegment { speed, hold_ms }),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Iterator over the `{...}` bodies of a single-line array
struct InlineTables<'a> {
    rest: &'a str,
}

impl<'a> InlineTables<'a> {
    fn new(body: &'a str) -> Self {
        Self { rest: body }
    }
}

impl<'a> Iterator for InlineTables<'a> {
    type Item = Result<&'a str, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            return None;
        }
        if !rest.starts_with('{') {
            self.rest = "";
            return Some(Err(ParseError::InvalidValue));
        }
        match rest.find('}') {
            Some(end) => {
                self.rest = &rest[end + 1..];
                Some(Ok(&rest[1..end]))
            }
            None => {
                self.rest = "";
                Some(Err(ParseError::InvalidValue))
            }
        }
    }
}

/// Drop a trailing `# comment`, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split `key = value` and classify the value
fn parse_key_value(line: &str) -> Option<(&str, Value<'_>)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, parse_value(value.trim())?))
}

fn parse_value(s: &str) -> Option<Value<'_>> {
    if s.starts_with('[') && s.ends_with(']') && s.len() >= 2 {
        return Some(Value::Array(&s[1..s.len() - 1]));
    }
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        return Some(Value::Str(&s[1..s.len() - 1]));
    }
    match s {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        _ => {}
    }
    parse_integer(s).map(Value::Integer)
}

/// Parse a decimal integer with optional sign and `_` separators
fn parse_integer(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10)? as i64;
        value = value.checked_mul(10)?.checked_add(digit)?;
        seen_digit = true;
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn as_u32(value: Value<'_>) -> Result<u32, ParseError> {
    match value {
        Value::Integer(i) => u32::try_from(i).map_err(|_| ParseError::InvalidValue),
        _ => Err(ParseError::InvalidValue),
    }
}

fn as_i32(value: Value<'_>) -> Result<i32, ParseError> {
    match value {
        Value::Integer(i) => i32::try_from(i).map_err(|_| ParseError::InvalidValue),
        _ => Err(ParseError::InvalidValue),
    }
}

fn as_bool(value: Value<'_>) -> Result<bool, ParseError> {
    match value {
        Value::Boolean(b) => Ok(b),
        _ => Err(ParseError::InvalidValue),
    }
}

fn as_str(value: Value<'_>) -> Result<&str, ParseError> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_HIGH_PULSE_US, DEFAULT_MAX_DELTA_V};

    const FULL: &str = r#"
# Mirrored pair on the X/Y driver slots
[stepper_pair]
max_speed = 35_000      # steps/s
max_delta_v = 800
high_pulse_us = 3
enable_inverted = true
ramp = "pulse_wait"

[sweep]
segments = [{ speed = 0, hold_ms = 200 }, { speed = 1000, hold_ms = 2000 }, { speed = -1000, hold_ms = 2000 }]
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL).unwrap();

        assert_eq!(config.stepper_pair.max_speed, 35_000);
        assert_eq!(config.stepper_pair.max_delta_v, 800);
        assert_eq!(config.stepper_pair.high_pulse_us, 3);
        assert!(config.stepper_pair.enable_inverted);
        assert_eq!(config.stepper_pair.ramp, RampMode::PulseWait);

        assert_eq!(config.sweep.segments.len(), 3);
        assert_eq!(
            config.sweep.segments[2],
            SweepSegment {
                speed: -1000,
                hold_ms: 2000
            }
        );
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.stepper_pair.max_delta_v, DEFAULT_MAX_DELTA_V);
        assert_eq!(config.stepper_pair.high_pulse_us, DEFAULT_HIGH_PULSE_US);
        assert!(!config.sweep.is_enabled());
    }

    #[test]
    fn test_linear_ramp_keys_any_order() {
        let config = parse_config("[stepper_pair]\nmax_accel = 50000\nramp = \"linear\"\n").unwrap();
        assert_eq!(
            config.stepper_pair.ramp,
            RampMode::Linear { max_accel: 50_000 }
        );

        let config = parse_config("[stepper_pair]\nramp = \"linear\"\n").unwrap();
        assert_eq!(
            config.stepper_pair.ramp,
            RampMode::Linear {
                max_accel: DEFAULT_MAX_ACCEL
            }
        );
    }

    #[test]
    fn test_invalid_section() {
        assert_eq!(
            parse_config("[heater]\nmax_temp = 50\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[stepper_pair]\nmax_rpm = 50\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("max_speed = 50\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[stepper_pair]\nmax_speed = -5\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[stepper_pair]\nenable_inverted = 1\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[stepper_pair]\nramp = \"s_curve\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[sweep]\nsegments = [{ speed = 10 }]\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_validation_errors_surface() {
        assert_eq!(
            parse_config("[stepper_pair]\nmax_speed = 0\n"),
            Err(ParseError::Config(ConfigError::ZeroMaxSpeed))
        );
    }

    #[test]
    fn test_too_many_segments() {
        let line = "[sweep]\nsegments = [{speed=1,hold_ms=1},{speed=2,hold_ms=1},{speed=3,hold_ms=1},\
                    {speed=4,hold_ms=1},{speed=5,hold_ms=1},{speed=6,hold_ms=1},{speed=7,hold_ms=1},\
                    {speed=8,hold_ms=1},{speed=9,hold_ms=1}]\n";
        assert_eq!(parse_config(line), Err(ParseError::TooManyItems));
    }

    #[test]
    fn test_comment_inside_string_is_kept() {
        assert_eq!(strip_comment("ramp = \"a#b\" # note"), "ramp = \"a#b\" ");
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("35_000"), Some(35_000));
        assert_eq!(parse_integer("-1000"), Some(-1000));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("_"), None);
        assert_eq!(parse_integer("12a"), None);
        assert_eq!(parse_integer("-"), None);
    }
}
