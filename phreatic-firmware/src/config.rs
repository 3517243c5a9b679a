//! Configuration loading
//!
//! The configuration is compiled into the firmware from `irrigation.toml`
//! (already checked by `build.rs`) and parsed at boot with the no-alloc
//! parser in phreatic-core.

use defmt::*;

use phreatic_core::{parse_config, IrrigationConfig};

/// Embedded configuration. Edit irrigation.toml and rebuild to customize.
const EMBEDDED_CONFIG: &str = include_str!("../irrigation.toml");

/// Parse and validate the embedded configuration
///
/// A configuration that fails either step is replaced by an empty one:
/// no zones, no pumps. The board then only reports health, which is the
/// safe way to run with a broken setup.
pub fn load_config() -> IrrigationConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            return IrrigationConfig::new();
        }
    };

    if let Err(e) = config.validate() {
        error!("Embedded config rejected: {}", e);
        return IrrigationConfig::new();
    }

    info!(
        "Parsed embedded configuration: {} zones, {} pump lines",
        config.zones.len(),
        config.pumps.len()
    );
    config
}
