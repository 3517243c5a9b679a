//! Property tests for the timer, channel encoding, zone decisions and
//! configuration parser

use embassy_futures::block_on;
use proptest::prelude::*;

use phreatic_core::config::{Label, ZoneConfig};
use phreatic_core::traits::{AnalogSource, MetricSink, PumpOutput, SensorError};
use phreatic_core::{
    parse_config, Channel, CooperativeTimer, Metric, PumpBank, PumpLine, TriggerMode, Zone,
    ZoneState,
};

struct FixedSource([u16; 8]);

impl AnalogSource for FixedSource {
    async fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        Ok(self.0[channel.index() as usize])
    }
}

struct NullSink;

impl MetricSink for NullSink {
    fn emit(&mut self, _metric: &Metric<'_>) {}
}

struct Relay(bool);

impl PumpOutput for Relay {
    fn set_on(&mut self, on: bool) {
        self.0 = on;
    }

    fn is_on(&self) -> bool {
        self.0
    }
}

fn zone_config(trigger: TriggerMode, channels: usize, min_moisture: u16, pump_secs: u32) -> ZoneConfig {
    let water = Channel::new(7).unwrap();
    let mut config = ZoneConfig::new(Label::try_from("prop").unwrap(), water);
    config.trigger = trigger;
    for c in 0..channels as u8 {
        config.moisture_channels.push(Channel::new(c).unwrap()).unwrap();
    }
    config.pump_lines.push(PumpLine(10)).unwrap();
    config.min_moisture = min_moisture;
    config.pump_secs = pump_secs;
    config
}

fn bank() -> PumpBank<Relay> {
    let mut bank = PumpBank::new();
    bank.add(PumpLine(10), Relay(false)).unwrap();
    bank
}

proptest! {
    #[test]
    fn channel_select_bits_match_binary_encoding(n in 0u8..8) {
        let bits = Channel::new(n).unwrap().select_bits();
        for (i, bit) in bits.iter().enumerate() {
            prop_assert_eq!(*bit, (n >> i) & 1 == 1);
        }
    }

    #[test]
    fn channel_rejects_out_of_range(n in 8u8..) {
        prop_assert!(Channel::new(n).is_none());
    }

    #[test]
    fn armed_timer_fires_once_at_deadline(
        start in 0u64..1_000_000_000,
        period in 1u64..10_000_000,
        early in 0u64..10_000_000,
    ) {
        let mut timer = CooperativeTimer::new();
        prop_assert!(timer.has_elapsed(start));
        timer.arm(start, period);

        let before = start + early.min(period - 1);
        prop_assert!(!timer.has_elapsed(before));
        prop_assert!(timer.has_elapsed(start + period));
        prop_assert!(!timer.has_elapsed(start + period));
    }

    #[test]
    fn trigger_mode_combines_readings(
        levels in proptest::array::uniform7(0u16..1024),
        channels in 0usize..=7,
        min_moisture in 0u16..1024,
        all in any::<bool>(),
    ) {
        let trigger = if all { TriggerMode::All } else { TriggerMode::Any };
        let mut zone = Zone::new(&zone_config(trigger, channels, min_moisture, 5));
        let mut readings = [0u16; 8];
        readings[..7].copy_from_slice(&levels);
        let mut source = FixedSource(readings);

        let mut dry = levels[..channels].iter().map(|&l| l < min_moisture);
        let expected = if channels == 0 {
            false
        } else if all {
            dry.all(|d| d)
        } else {
            dry.any(|d| d)
        };

        prop_assert_eq!(block_on(zone.needs_watering(&mut source, &mut NullSink)), expected);
    }

    #[test]
    fn pump_stops_exactly_at_deadline(
        start in 0u64..1_000_000_000,
        pump_secs in 1u32..3_600,
        water in 51u16..1024,
    ) {
        let mut zone = Zone::new(&zone_config(TriggerMode::Any, 1, 500, pump_secs));
        let mut pumps = bank();
        pumps.claim(&[PumpLine(10)]).unwrap();
        let mut source = FixedSource([water; 8]);

        zone.start_pumping(start, &mut pumps, &mut NullSink);
        let deadline = start + u64::from(pump_secs) * 1000;
        prop_assert_eq!(zone.pump_stop_deadline(), Some(deadline));

        prop_assert!(block_on(zone.is_pumping(deadline - 1, &mut source, &mut pumps, &mut NullSink)));
        prop_assert_eq!(pumps.is_on(PumpLine(10)), Some(true));

        prop_assert!(!block_on(zone.is_pumping(deadline, &mut source, &mut pumps, &mut NullSink)));
        prop_assert_eq!(zone.state(), ZoneState::Idle);
        prop_assert_eq!(pumps.is_on(PumpLine(10)), Some(false));
    }

    #[test]
    fn no_water_never_starts_pump(
        moisture in 0u16..1024,
        water in 0u16..=50,
        ticks in 1u64..20,
    ) {
        let mut config = zone_config(TriggerMode::Any, 1, 1024, 5);
        config.moisture_check_period_ms = 1_000;
        let mut zone = Zone::new(&config);
        let mut pumps = bank();
        pumps.claim(&[PumpLine(10)]).unwrap();
        let mut readings = [moisture; 8];
        readings[7] = water;
        let mut source = FixedSource(readings);

        for t in 0..ticks {
            block_on(zone.tick(t * 1_000, &mut source, &mut pumps, &mut NullSink));
            prop_assert_eq!(zone.state(), ZoneState::Idle);
        }
        prop_assert_eq!(pumps.is_on(PumpLine(10)), Some(false));
    }

    #[test]
    fn parser_never_panics(input in "\\PC*") {
        let _ = parse_config(&input);
    }

    #[test]
    fn parser_handles_section_like_lines(lines in proptest::collection::vec("\\[?[a-z._]{0,20}\\]? ?=? ?[\\[\\]\"0-9a-z, ]{0,20}", 0..20)) {
        let input = lines.join("\n");
        let _ = parse_config(&input);
    }
}
