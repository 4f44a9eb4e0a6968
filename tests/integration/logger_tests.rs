//! Integration tests: Scheduler → sensor → storage → indicator/console.

use templogger::adapters::eeprom::NvsEeprom;
use templogger::app::commands::Command;
use templogger::app::events::LoggerEvent;
use templogger::config::LoggerConfig;
use templogger::drivers::status_led::IndicatorMode;
use templogger::error::Error;
use templogger::scheduler::{CycleState, Scheduler, StepOutcome};

use crate::mock_hw::{
    CountingConsole, FakeSensorBus, RecordingPin, RecordingSink, SimDelay, SimTime,
};

type TestScheduler = Scheduler<NvsEeprom, FakeSensorBus, RecordingPin>;

struct Rig {
    scheduler: TestScheduler,
    console: CountingConsole,
    time: SimTime,
    delay: SimDelay,
    sink: RecordingSink,
    pin: RecordingPin,
}

impl Rig {
    fn boot(config: &LoggerConfig, store: NvsEeprom, readings: &[f32]) -> Self {
        let time = SimTime::default();
        let bus = FakeSensorBus::with_celsius(time.clone(), readings);
        Self::boot_with_bus(config, store, bus, time)
    }

    fn boot_with_bus(
        config: &LoggerConfig,
        store: NvsEeprom,
        bus: FakeSensorBus,
        time: SimTime,
    ) -> Self {
        let pin = RecordingPin::default();
        let mut sink = RecordingSink::default();
        let scheduler = Scheduler::boot(config, store, bus, pin.clone(), &mut sink).unwrap();
        Self {
            scheduler,
            console: CountingConsole::default(),
            delay: SimDelay::new(time.clone()),
            time,
            sink,
            pin,
        }
    }

    fn step(&mut self) -> StepOutcome {
        self.scheduler
            .step(&mut self.console, &self.time, &mut self.delay, &mut self.sink)
    }

    /// Step until the region reports full, with a safety bound.
    fn run_until_full(&mut self) {
        for _ in 0..10_000 {
            if let StepOutcome::Full { .. } = self.step() {
                return;
            }
        }
        panic!("region never filled");
    }

    fn type_input(&mut self, bytes: &[u8]) {
        self.console.inner.push_input(bytes);
    }

    fn output(&mut self) -> Vec<String> {
        self.console.inner.take_output()
    }
}

fn small_config(eeprom_size: u32) -> LoggerConfig {
    LoggerConfig {
        eeprom_size,
        sample_interval_ms: 2_000,
        sub_tick_ms: 1_000,
        ..LoggerConfig::default()
    }
}

#[test]
fn boot_reports_restored_offset_and_selects_register() {
    let time = SimTime::default();
    let bus = FakeSensorBus::with_celsius(time.clone(), &[20.0]);
    let pointer_writes = bus.pointer_writes.clone();
    let rig = Rig::boot_with_bus(&small_config(10), NvsEeprom::new(10), bus, time);

    assert_eq!(rig.sink.events[0], LoggerEvent::Restored { offset: 0 });
    assert_eq!(pointer_writes.get(), 1);
    assert_eq!(rig.scheduler.state(), CycleState::Check);
    assert!(!rig.pin.is_high());
}

#[test]
fn four_records_fill_a_ten_byte_store() {
    let config = small_config(10);
    let mut rig = Rig::boot(&config, NvsEeprom::new(10), &[20.5, 21.0, 19.75, 22.25]);

    rig.run_until_full();
    assert!(!rig.scheduler.region().has_capacity());
    assert_eq!(
        rig.sink.sampled(),
        vec![(0, 20.5), (2, 21.0), (4, 19.75), (6, 22.25)]
    );

    rig.type_input(b"r");
    assert_eq!(rig.step(), StepOutcome::Full { command: Some(Command::Dump) });
    assert_eq!(
        rig.output(),
        ["-----", "[0]20.50", "[2]21.00", "[4]19.75", "[6]22.25", "-----"]
    );
}

#[test]
fn full_store_goes_solid_and_stops_writing() {
    let config = small_config(6);
    let mut rig = Rig::boot(&config, NvsEeprom::new(6), &[20.0, 21.0, 22.0]);

    rig.run_until_full();
    let flash = rig.scheduler.region().store().flash().to_vec();
    let writes = rig.pin.writes();

    for _ in 0..50 {
        assert!(matches!(rig.step(), StepOutcome::Full { command: None }));
    }

    assert_eq!(rig.scheduler.indicator().mode(), IndicatorMode::SolidOn);
    assert!(rig.pin.is_high());
    // Solid-on is entered once; nothing toggles afterwards.
    assert_eq!(rig.pin.writes(), writes);
    assert_eq!(rig.scheduler.region().store().flash(), flash.as_slice());
    // The full branch never sleeps.
    let sleeps_before = rig.delay.sleeps.len();
    rig.step();
    assert_eq!(rig.delay.sleeps.len(), sleeps_before);

    let full_events = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, LoggerEvent::StorageFull { .. }))
        .count();
    assert_eq!(full_events, 1);
}

#[test]
fn wait_of_2500_ms_is_three_sub_ticks() {
    let config = LoggerConfig {
        eeprom_size: 64,
        sample_interval_ms: 2_500,
        sub_tick_ms: 1_000,
        ..LoggerConfig::default()
    };
    let mut rig = Rig::boot(&config, NvsEeprom::new(64), &[20.0]);

    assert!(matches!(rig.step(), StepOutcome::Sampled { offset: 0, .. }));
    let toggles_before = rig.scheduler.indicator().toggle_count();

    let mut durations = Vec::new();
    for _ in 0..3 {
        match rig.step() {
            StepOutcome::SubTick { duration_ms, command } => {
                assert_eq!(command, None);
                durations.push(duration_ms);
            }
            other => panic!("expected a sub-tick, got {other:?}"),
        }
    }

    assert_eq!(durations, vec![1000, 1000, 500]);
    assert_eq!(rig.delay.sleeps, vec![1000, 1000, 500]);
    assert_eq!(rig.scheduler.indicator().toggle_count() - toggles_before, 3);
    assert_eq!(rig.console.polls, 3);
    assert_eq!(rig.scheduler.state(), CycleState::Check);
    assert_eq!(rig.time.now(), 2_500);
}

#[test]
fn processing_time_shortens_the_wait() {
    let config = small_config(64);
    let time = SimTime::default();
    let bus = FakeSensorBus::with_celsius(time.clone(), &[20.0]).read_cost(300);
    let mut rig = Rig::boot_with_bus(&config, NvsEeprom::new(64), bus, time);

    rig.step();
    rig.step();
    rig.step();

    assert_eq!(rig.delay.sleeps, vec![1000, 700]);
    assert_eq!(rig.time.now(), 2_000);
}

#[test]
fn overrunning_the_interval_skips_the_wait() {
    let config = small_config(64);
    let time = SimTime::default();
    let bus = FakeSensorBus::with_celsius(time.clone(), &[20.0]).read_cost(5_000);
    let mut rig = Rig::boot_with_bus(&config, NvsEeprom::new(64), bus, time);

    assert!(matches!(rig.step(), StepOutcome::Sampled { offset: 0, .. }));
    assert!(matches!(rig.step(), StepOutcome::Sampled { offset: 2, .. }));
    assert!(rig.delay.sleeps.is_empty());
}

#[test]
fn clear_during_wait_empties_dump_and_restores_capacity() {
    let config = small_config(10);
    let mut rig = Rig::boot(&config, NvsEeprom::new(10), &[20.5, 21.0]);

    // Two full cycles: sample, sub-tick, sub-tick.
    for _ in 0..6 {
        rig.step();
    }
    assert_eq!(rig.scheduler.region().cursor(), 4);

    rig.type_input(b"c");
    rig.step(); // sample at offset 4
    assert!(matches!(
        rig.step(),
        StepOutcome::SubTick { command: Some(Command::Clear), .. }
    ));
    assert_eq!(rig.output(), ["clear"]);
    assert_eq!(rig.scheduler.region().cursor(), 0);
    assert_eq!(rig.scheduler.region().store().flash()[8..], [0u8, 0]);

    rig.type_input(b"r");
    rig.step();
    assert_eq!(rig.output(), ["-----", "-----"]);
    assert!(rig.scheduler.region().has_capacity());
    assert_eq!(rig.scheduler.region().record_count(), 0);
}

#[test]
fn clear_while_full_resumes_blinking_and_sampling() {
    let config = small_config(6);
    let mut rig = Rig::boot(&config, NvsEeprom::new(6), &[20.0]);
    rig.run_until_full();
    assert_eq!(rig.scheduler.indicator().mode(), IndicatorMode::SolidOn);

    rig.type_input(b"c");
    assert_eq!(rig.step(), StepOutcome::Full { command: Some(Command::Clear) });
    assert_eq!(rig.output(), ["clear"]);

    assert!(matches!(rig.step(), StepOutcome::Sampled { offset: 0, .. }));
    assert_eq!(rig.scheduler.indicator().mode(), IndicatorMode::Blinking);
    assert!(matches!(rig.step(), StepOutcome::SubTick { .. }));
    assert!(!rig.pin.is_high());
}

#[test]
fn unknown_input_is_ignored() {
    let config = small_config(10);
    let mut rig = Rig::boot(&config, NvsEeprom::new(10), &[20.0]);
    rig.step();

    rig.type_input(b"xR");
    rig.step();
    rig.step();

    assert!(rig.output().is_empty());
    assert_eq!(rig.scheduler.region().cursor(), 2);
}

#[test]
fn restart_resumes_after_last_record() {
    let config = small_config(20);
    let mut rig = Rig::boot(&config, NvsEeprom::new(20), &[18.0, 18.5, 19.25]);
    for _ in 0..9 {
        rig.step();
    }
    assert_eq!(rig.scheduler.region().cursor(), 6);

    let store = rig.scheduler.into_store().power_cycle();
    let mut rig = Rig::boot(&config, store, &[30.0]);
    assert_eq!(rig.sink.events[0], LoggerEvent::Restored { offset: 6 });

    assert!(matches!(rig.step(), StepOutcome::Sampled { offset: 6, .. }));
    rig.type_input(b"r");
    rig.step();
    assert_eq!(
        rig.output(),
        ["-----", "[0]18.00", "[2]18.50", "[4]19.25", "[6]30.00", "-----"]
    );
}

#[test]
fn silent_sensor_logs_zero_readings() {
    let config = small_config(10);
    let time = SimTime::default();
    let bus = FakeSensorBus::with_celsius(time.clone(), &[25.0]).failing();
    let mut rig = Rig::boot_with_bus(&config, NvsEeprom::new(10), bus, time);

    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, LoggerEvent::FaultIgnored(_)))
    );
    assert_eq!(
        rig.step(),
        StepOutcome::Sampled {
            offset: 0,
            celsius: 0.0
        }
    );
}

#[test]
fn invalid_config_refuses_to_boot() {
    let config = LoggerConfig {
        sub_tick_ms: 0,
        ..small_config(10)
    };
    let time = SimTime::default();
    let mut sink = RecordingSink::default();
    let result = TestScheduler::boot(
        &config,
        NvsEeprom::new(10),
        FakeSensorBus::with_celsius(time, &[20.0]),
        RecordingPin::default(),
        &mut sink,
    );

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(sink.events.is_empty());
}
