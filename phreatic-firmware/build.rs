//! Build script for phreatic-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates irrigation.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys every `[zone.*]` table must carry
const ZONE_FIELDS: &[&str] = &[
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

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate irrigation.toml at compile time
///
/// The firmware parses the same file again at boot with its own no-alloc
/// parser; this catches mistakes before they reach the board.
fn validate_config() {
    println!("cargo:rerun-if-changed=irrigation.toml");

    let config_path = Path::new("irrigation.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: irrigation.toml not found!                               ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an irrigation.toml configuration file.    ║\n\
            ║  Please create one in the phreatic-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read irrigation.toml                           ║\n\
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
                ║  ERROR: Invalid TOML syntax in irrigation.toml                   ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);
    validate_hardware(&config);
    validate_zones(&config);

    println!("cargo:warning=irrigation.toml validated successfully");
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

/// Abort the build with a boxed list of problems
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

/// Parse a `gpioN` / `!gpioN` / `^gpioN` pin string
fn parse_pin(s: &str) -> Option<u8> {
    let s = s.trim_start_matches(['!', '^']);
    let n = s.strip_prefix("gpio").unwrap_or(s);
    n.parse::<u8>().ok().filter(|&n| n < 30)
}

/// Pump line numbers declared under `[pumps]`
fn pump_lines(config: &toml::Value) -> Vec<u8> {
    config
        .get("pumps")
        .and_then(|p| p.get("lines"))
        .and_then(|l| l.as_array())
        .map(|lines| {
            lines
                .iter()
                .filter_map(|l| l.as_str().and_then(parse_pin))
                .collect()
        })
        .unwrap_or_default()
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    if config.get("multiplexer").is_none() {
        errors.push("Missing [multiplexer] section".to_string());
    }
    if config.get("pumps").is_none() {
        errors.push("Missing [pumps] section - list the pump output lines".to_string());
    }
    if config.get("zone").is_none() {
        errors.push("Missing [zone.*] section - at least one zone is required".to_string());
    }

    report("Missing required sections in irrigation.toml", &errors);
}

/// Validate multiplexer and pump wiring
fn validate_hardware(config: &toml::Value) {
    let mut errors = Vec::new();
    let mut used: Vec<(u8, String)> = Vec::new();
    let mut claim = |pin: u8, what: String, errors: &mut Vec<String>| {
        if let Some((_, owner)) = used.iter().find(|(p, _)| *p == pin) {
            errors.push(format!("gpio{} used by both {} and {}", pin, owner, what));
        } else {
            used.push((pin, what));
        }
    };

    if let Some(mux) = config.get("multiplexer") {
        match mux.get("select_pins").and_then(|s| s.as_array()) {
            Some(pins) if pins.len() == 3 => {
                for (i, pin) in pins.iter().enumerate() {
                    match pin.as_str().and_then(parse_pin) {
                        Some(n) => claim(n, format!("select line {}", i), &mut errors),
                        None => errors.push(format!("[multiplexer] select_pins[{}] is not a pin", i)),
                    }
                }
            }
            _ => errors.push("[multiplexer] select_pins must list exactly 3 pins".to_string()),
        }

        match mux.get("adc_pin").and_then(|a| a.as_str()).and_then(parse_pin) {
            Some(n) if (26..=29).contains(&n) => claim(n, "the ADC".to_string(), &mut errors),
            Some(n) => errors.push(format!("[multiplexer] adc_pin gpio{} has no ADC input", n)),
            None => errors.push("[multiplexer] missing or invalid 'adc_pin'".to_string()),
        }

        if let Some(toml::Value::Integer(samples)) = mux.get("samples") {
            if *samples < 1 || *samples > 10 {
                errors.push("[multiplexer] samples must be 1-10".to_string());
            }
        }
    }

    if let Some(lines) = config
        .get("pumps")
        .and_then(|p| p.get("lines"))
        .and_then(|l| l.as_array())
    {
        for line in lines {
            match line.as_str().and_then(parse_pin) {
                Some(n) => claim(n, "a pump".to_string(), &mut errors),
                None => errors.push(format!("[pumps] {} is not a pin", line)),
            }
        }
    }

    if let Some(led) = config.get("status_led") {
        match led.as_str().and_then(parse_pin) {
            Some(n) => claim(n, "the status LED".to_string(), &mut errors),
            None => errors.push("status_led is not a pin".to_string()),
        }
    }

    if let Some(zones) = config.get("zone").and_then(|z| z.as_table()) {
        for (name, zone) in zones {
            if let Some(button) = zone.get("button") {
                match button.as_str().and_then(parse_pin) {
                    Some(n) => claim(n, format!("zone {} button", name), &mut errors),
                    None => errors.push(format!("[zone.{}] button is not a pin", name)),
                }
            }
        }
    }

    report("Invalid pin assignment in irrigation.toml", &errors);
}

/// Validate zone configurations
fn validate_zones(config: &toml::Value) {
    let zones = match config.get("zone") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let pumps = pump_lines(config);
    let mut claimed: Vec<(i64, String)> = Vec::new();
    let mut errors = Vec::new();

    if zones.len() > 8 {
        errors.push(format!("{} zones configured, at most 8 supported", zones.len()));
    }

    for (name, zone) in zones {
        let zone = match zone {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[zone.{}] must be a table", name));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("zone name '{}' is longer than 16 bytes", name));
        }

        for field in ZONE_FIELDS {
            if zone.get(*field).is_none() {
                errors.push(format!("[zone.{}] missing '{}'", name, field));
            }
        }

        if let Some(toml::Value::String(trigger)) = zone.get("trigger") {
            if !["any", "all"].contains(&trigger.to_lowercase().as_str()) {
                errors.push(format!("[zone.{}] trigger must be 'any' or 'all'", name));
            }
        }

        if let Some(toml::Value::Integer(ch)) = zone.get("water_channel") {
            if !(0..=7).contains(ch) {
                errors.push(format!("[zone.{}] water_channel must be 0-7", name));
            }
        }

        if let Some(toml::Value::Array(channels)) = zone.get("moisture_channels") {
            for ch in channels {
                if !matches!(ch.as_integer(), Some(0..=7)) {
                    errors.push(format!("[zone.{}] moisture channel {} must be 0-7", name, ch));
                }
            }
        }

        if let Some(toml::Value::Array(lines)) = zone.get("pump_lines") {
            if lines.len() > 4 {
                errors.push(format!("[zone.{}] at most 4 pump lines", name));
            }
            for line in lines {
                let number = match line {
                    toml::Value::Integer(n) => Some(*n),
                    toml::Value::String(s) => parse_pin(s).map(i64::from),
                    _ => None,
                };
                let Some(number) = number else {
                    errors.push(format!("[zone.{}] pump line {} is not a line", name, line));
                    continue;
                };
                if !pumps.iter().any(|&p| i64::from(p) == number) {
                    errors.push(format!("[zone.{}] pump line {} not in [pumps]", name, number));
                }
                if let Some((_, owner)) = claimed.iter().find(|(n, _)| *n == number) {
                    errors.push(format!(
                        "[zone.{}] pump line {} already used by zone {}",
                        name, number, owner
                    ));
                } else {
                    claimed.push((number, name.clone()));
                }
            }
        }

        if let Some(toml::Value::Integer(secs)) = zone.get("pump_secs") {
            if *secs <= 0 {
                errors.push(format!("[zone.{}] pump_secs must be positive", name));
            }
        }
    }

    report("Invalid zone configuration", &errors);
}
