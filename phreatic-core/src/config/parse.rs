//! Text configuration parser
//!
//! A minimal parser for the TOML subset used by `irrigation.toml`. It
//! allocates nothing: every value lands directly in the heapless
//! configuration types. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - Flat arrays of strings or integers: `lines = ["gpio10", "!gpio11"]`
//! - `[multiplexer]`, `[pumps]` and `[zone.<name>]` section headers
//! - Comments (# ...), including trailing comments
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Inline tables
//! - Dotted keys outside section headers
//!
//! Unknown keys are ignored. Every zone must set the keys listed in
//! [`REQUIRED_ZONE_FIELDS`].

use core::str::FromStr;

use heapless::String;

use super::error::ConfigError;
use super::types::{IrrigationConfig, Label, PinConfig, TriggerMode, ZoneConfig};
use crate::mux::Channel;
use crate::pump::PumpLine;

/// Keys every `[zone.<name>]` section must set
pub const REQUIRED_ZONE_FIELDS: [&str; 9] = [
    "trigger",
    "water_channel",
    "moisture_channels",
    "pump_lines",
    "min_moisture",
    "pump_secs",
    "moisture_check_period_ms",
    "water_check_period_ms",
    "pump_check_period_ms",
];

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Multiplexer,
    Pumps,
    Zone,
}

/// Zone being built, with the required keys seen so far
struct ZoneDraft {
    config: ZoneConfig,
    seen: u16,
}

impl ZoneDraft {
    fn new(name: Label) -> Self {
        Self {
            config: ZoneConfig::new(name, Channel::default()),
            seen: 0,
        }
    }

    fn mark(&mut self, key: &str) {
        if let Some(i) = REQUIRED_ZONE_FIELDS.iter().position(|f| *f == key) {
            self.seen |= 1 << i;
        }
    }

    fn finish(self) -> Result<ZoneConfig, ConfigError> {
        for (i, field) in REQUIRED_ZONE_FIELDS.iter().enumerate() {
            if self.seen & (1 << i) == 0 {
                return Err(ConfigError::MissingField {
                    zone: self.config.name,
                    field: *field,
                });
            }
        }
        Ok(self.config)
    }
}

/// Parse configuration text into an [`IrrigationConfig`]
///
/// Only syntax and per-field checks happen here; cross-references such as
/// pump line ownership are checked by [`IrrigationConfig::validate`].
pub fn parse_config(input: &str) -> Result<IrrigationConfig, ConfigError> {
    let mut config = IrrigationConfig::new();
    let mut section = Section::Root;
    let mut draft: Option<ZoneDraft> = None;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index as u32 + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') || line.len() < 2 {
                return Err(ConfigError::InvalidSection { line: line_no });
            }
            finish_zone(&mut config, draft.take())?;

            let header = &line[1..line.len() - 1];
            section = match parse_section_header(header, line_no)? {
                (Section::Zone, Some(name)) => {
                    draft = Some(ZoneDraft::new(name));
                    Section::Zone
                }
                (section, _) => section,
            };
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or(ConfigError::InvalidValue { line: line_no })?;

        match section {
            Section::Root => apply_root(&mut config, key, value, line_no)?,
            Section::Multiplexer => apply_multiplexer(&mut config, key, value, line_no)?,
            Section::Pumps => apply_pumps(&mut config, key, value, line_no)?,
            Section::Zone => {
                let zone = draft
                    .as_mut()
                    .ok_or(ConfigError::InvalidSection { line: line_no })?;
                apply_zone(zone, key, value, line_no)?;
            }
        }
    }

    finish_zone(&mut config, draft)?;
    Ok(config)
}

fn finish_zone(config: &mut IrrigationConfig, draft: Option<ZoneDraft>) -> Result<(), ConfigError> {
    if let Some(draft) = draft {
        let zone = draft.finish()?;
        config
            .zones
            .push(zone)
            .map_err(|_| ConfigError::TooManyItems)?;
    }
    Ok(())
}

/// Parse section header like "multiplexer" or "zone.bed1"
fn parse_section_header(header: &str, line: u32) -> Result<(Section, Option<Label>), ConfigError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        if kind.trim() != "zone" {
            return Err(ConfigError::InvalidSection { line });
        }
        let name = parse_string(name.trim());
        if name.is_empty() {
            return Err(ConfigError::InvalidSection { line });
        }
        let name = Label::try_from(name).map_err(|_| ConfigError::NameTooLong)?;
        return Ok((Section::Zone, Some(name)));
    }

    match header {
        "multiplexer" => Ok((Section::Multiplexer, None)),
        "pumps" => Ok((Section::Pumps, None)),
        _ => Err(ConfigError::InvalidSection { line }),
    }
}

fn apply_root(
    config: &mut IrrigationConfig,
    key: &str,
    value: &str,
    line: u32,
) -> Result<(), ConfigError> {
    match key {
        "instance" => {
            config.instance =
                String::try_from(parse_string(value)).map_err(|_| ConfigError::NameTooLong)?;
        }
        "system_stats_period_ms" => config.system_stats_period_ms = parse_int(value, line)?,
        "status_led" => config.status_led = Some(PinConfig::parse(parse_string(value))?),
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn apply_multiplexer(
    config: &mut IrrigationConfig,
    key: &str,
    value: &str,
    line: u32,
) -> Result<(), ConfigError> {
    let mux = &mut config.multiplexer;
    match key {
        "select_pins" => {
            let mut count = 0;
            for item in list_items(value, line)? {
                let slot = mux
                    .select_pins
                    .get_mut(count)
                    .ok_or(ConfigError::TooManyItems)?;
                *slot = PinConfig::parse(parse_string(item))?;
                count += 1;
            }
            if count != mux.select_pins.len() {
                return Err(ConfigError::InvalidValue { line });
            }
        }
        "adc_pin" => mux.adc_pin = PinConfig::parse(parse_string(value))?.pin,
        "settle_ms" => mux.settle_ms = parse_int(value, line)?,
        "samples" => mux.samples = parse_int(value, line)?,
        _ => {}
    }
    Ok(())
}

fn apply_pumps(
    config: &mut IrrigationConfig,
    key: &str,
    value: &str,
    line: u32,
) -> Result<(), ConfigError> {
    if key == "lines" {
        config.pumps.clear();
        for item in list_items(value, line)? {
            let pin = PinConfig::parse(parse_string(item))?;
            config
                .pumps
                .push(pin)
                .map_err(|_| ConfigError::TooManyItems)?;
        }
    }
    Ok(())
}

fn apply_zone(draft: &mut ZoneDraft, key: &str, value: &str, line: u32) -> Result<(), ConfigError> {
    let z = &mut draft.config;
    match key {
        "trigger" => z.trigger = TriggerMode::from_str(parse_string(value))?,
        "water_channel" => z.water_channel = parse_channel(value, line)?,
        "moisture_channels" => {
            z.moisture_channels.clear();
            for item in list_items(value, line)? {
                let channel = parse_channel(item, line)?;
                if !z.moisture_channels.contains(&channel) {
                    z.moisture_channels
                        .push(channel)
                        .map_err(|_| ConfigError::TooManyItems)?;
                }
            }
        }
        "pump_lines" => {
            z.pump_lines.clear();
            for item in list_items(value, line)? {
                let pump = PumpLine(parse_line_number(item, line)?);
                z.pump_lines
                    .push(pump)
                    .map_err(|_| ConfigError::TooManyItems)?;
            }
        }
        "min_moisture" => z.min_moisture = parse_int(value, line)?,
        "min_water" => z.min_water = parse_int(value, line)?,
        "pump_secs" => z.pump_secs = parse_int(value, line)?,
        "moisture_check_period_ms" => z.moisture_check_period_ms = parse_int(value, line)?,
        "water_check_period_ms" => z.water_check_period_ms = parse_int(value, line)?,
        "pump_check_period_ms" => z.pump_check_period_ms = parse_int(value, line)?,
        "button" => z.button = Some(PinConfig::parse(parse_string(value))?),
        _ => return Ok(()),
    }
    draft.mark(key);
    Ok(())
}

/// Drop a trailing comment, keeping `#` inside quoted strings
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

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: FromStr>(value: &str, line: u32) -> Result<T, ConfigError> {
    let mut digits: String<24> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits
            .push(c)
            .map_err(|_| ConfigError::InvalidValue { line })?;
    }
    digits
        .parse()
        .map_err(|_| ConfigError::InvalidValue { line })
}

fn parse_channel(value: &str, line: u32) -> Result<Channel, ConfigError> {
    let index: u8 = parse_int(value, line)?;
    Channel::try_from(index)
}

/// Pump lines may be written as numbers (`10`) or pin names (`"gpio10"`)
fn parse_line_number(value: &str, line: u32) -> Result<u8, ConfigError> {
    let value = parse_string(value);
    if value.starts_with("gpio") {
        Ok(PinConfig::parse(value)?.pin)
    } else {
        parse_int(value, line)
    }
}

/// Items of a single-line array like `[1, 2, 3]`
fn list_items(value: &str, line: u32) -> Result<impl Iterator<Item = &str>, ConfigError> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigError::InvalidValue { line })?;

    Ok(inner.split(',').map(str::trim).filter(|item| !item.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Greenhouse controller
instance = "greenhouse"
system_stats_period_ms = 600_000
status_led = "gpio25"

[multiplexer]
select_pins = ["gpio2", "gpio3", "gpio4"]
adc_pin = "gpio26"
settle_ms = 50
samples = 1

[pumps]
lines = ["gpio10", "!gpio11"]   # relay board is active-low on 11

[zone.bed1]
trigger = "any"
water_channel = 0
moisture_channels = [2]
pump_lines = [10]
min_moisture = 500
pump_secs = 5
moisture_check_period_ms = 60000
water_check_period_ms = 300000
pump_check_period_ms = 1000

[zone.herbs]
trigger = "all"
water_channel = 0
moisture_channels = [3, 4]
pump_lines = ["gpio11"]
min_moisture = 450
min_water = 80
pump_secs = 10
moisture_check_period_ms = 120000
water_check_period_ms = 300000
pump_check_period_ms = 500
button = "^gpio15"
"#;

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_parse_sample_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.instance.as_str(), "greenhouse");
        assert_eq!(config.system_stats_period_ms, 600_000);
        assert_eq!(config.status_led, Some(PinConfig::new(25)));
        assert_eq!(config.multiplexer.select_pins[1], PinConfig::new(3));
        assert_eq!(config.multiplexer.adc_pin, 26);
        assert_eq!(config.pumps.len(), 2);
        assert!(config.pumps[1].inverted);
        assert_eq!(config.zones.len(), 2);

        let bed = config.zone("bed1").unwrap();
        assert_eq!(bed.trigger, TriggerMode::Any);
        assert_eq!(bed.water_channel, ch(0));
        assert_eq!(bed.moisture_channels.as_slice(), &[ch(2)]);
        assert_eq!(bed.pump_lines.as_slice(), &[PumpLine(10)]);
        assert_eq!(bed.min_moisture, 500);
        assert_eq!(bed.min_water, 50);
        assert_eq!(bed.pump_run_ms(), 5000);
        assert_eq!(bed.button, None);

        let herbs = config.zone("herbs").unwrap();
        assert_eq!(herbs.trigger, TriggerMode::All);
        assert_eq!(herbs.moisture_channels.as_slice(), &[ch(3), ch(4)]);
        assert_eq!(herbs.pump_lines.as_slice(), &[PumpLine(11)]);
        assert_eq!(herbs.min_water, 80);
        assert_eq!(herbs.button, Some(PinConfig::with_pullup(15)));

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_field_names_zone_and_key() {
        let input = r#"
[zone.lawn]
trigger = "any"
water_channel = 1
moisture_channels = [5]
pump_lines = [10]
min_moisture = 400
moisture_check_period_ms = 1000
water_check_period_ms = 1000
pump_check_period_ms = 1000
"#;
        let err = parse_config(input).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                zone: Label::try_from("lawn").unwrap(),
                field: "pump_secs",
            }
        );
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let input = "[zone.a]\nwater_channel = 8\n";
        assert_eq!(parse_config(input), Err(ConfigError::InvalidChannel(8)));

        let input = "[zone.a]\nmoisture_channels = [1, 9]\n";
        assert_eq!(parse_config(input), Err(ConfigError::InvalidChannel(9)));
    }

    #[test]
    fn test_unknown_trigger_rejected() {
        let input = "[zone.a]\ntrigger = \"most\"\n";
        assert_eq!(parse_config(input), Err(ConfigError::UnknownTriggerMode));
    }

    #[test]
    fn test_bad_section_reports_line() {
        let input = "instance = \"x\"\n\n[heater.bed]\n";
        assert_eq!(
            parse_config(input),
            Err(ConfigError::InvalidSection { line: 3 })
        );
    }

    #[test]
    fn test_bad_integer_reports_line() {
        let input = "[multiplexer]\nsettle_ms = fifty\n";
        assert_eq!(
            parse_config(input),
            Err(ConfigError::InvalidValue { line: 2 })
        );
    }

    #[test]
    fn test_select_pins_needs_three_entries() {
        let input = "[multiplexer]\nselect_pins = [\"gpio2\", \"gpio3\"]\n";
        assert_eq!(
            parse_config(input),
            Err(ConfigError::InvalidValue { line: 2 })
        );
    }

    #[test]
    fn test_long_zone_name_rejected() {
        let input = "[zone.a_really_long_zone_name]\n";
        assert_eq!(parse_config(input), Err(ConfigError::NameTooLong));
    }

    #[test]
    fn test_empty_input_is_empty_config() {
        let config = parse_config("# nothing here\n").unwrap();
        assert!(config.zones.is_empty());
        assert!(config.pumps.is_empty());
    }

    #[test]
    fn test_strip_comment_keeps_quoted_hash() {
        assert_eq!(strip_comment("a = \"x#y\" # note"), "a = \"x#y\" ");
        assert_eq!(strip_comment("# all comment"), "");
    }
}
