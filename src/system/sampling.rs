//! Periodic sampling task
//!
//! One [`SamplingTask`] per sensor concern. Each cycle walks the same path:
//!
//! ```text
//! Waiting --wake--> Sampling --> Classifying --> Acting --> Waiting
//! ```
//!
//! - **Waiting**: blocked on the [`WakeSignal`]; wakes that pile up while the
//!   task is busy collapse into one
//! - **Sampling**: pending commands are applied, then the sensor is read,
//!   unless hold is active
//! - **Classifying**: the sample is mapped to a band, alert flags are decided
//! - **Acting**: actuators get the band's output, the alert board is drained
//!   through the serial port
//!
//! A failed sensor read ends the cycle early; the previous sample is never
//! reused in its place.

use crate::system::alert::{AlertBoard, AlertFlags};
use crate::system::classifier::Classifier;
use crate::system::command::{Command, CommandChannel};
use crate::system::dispatcher;
use crate::system::output::{Actuators, OutputState};
use crate::system::sample::{PeakTracker, Sample, SensorError, Unit};
use crate::system::serial::SerialSink;
use crate::system::wake::WakeSignal;

/// Source of one reading per cycle
#[allow(async_fn_in_trait)]
pub trait SensorReader {
    /// Takes one reading, in the unit configured for the task
    async fn read(&mut self) -> Result<f32, SensorError>;
}

/// Where the task currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    Waiting,
    Sampling,
    Classifying,
    Acting,
}

/// What a held task does when it wakes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldPolicy {
    /// Classify and act on the last sample again
    ReuseLast,
    /// Leave everything as it is
    Freeze,
}

/// Static settings of a sampling task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskConfig {
    pub name: &'static str,
    pub unit: Unit,
    pub hold_policy: HoldPolicy,
    /// Show the sample value on the readout
    pub readout: bool,
}

/// Classification and actions of one completed cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleResult {
    pub sample: Sample,
    pub band: usize,
    pub output: OutputState,
    /// Flags this cycle raised on the board
    pub raised: AlertFlags,
    /// Flags whose message this cycle sent, possibly raised by another task
    pub dispatched: AlertFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// A fresh sample went through the whole cycle
    Measured(CycleResult),
    /// Hold was active; the last sample went through the cycle again
    Reused(CycleResult),
    /// Hold was active and nothing was updated
    Frozen,
    /// The reader failed; nothing was classified
    NoReading(SensorError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Period tick the cycle ran for
    pub tick: u32,
    pub outcome: CycleOutcome,
}

/// Read-classify-act loop for one sensor
pub struct SamplingTask<'a, R, A, S, const N: usize> {
    config: TaskConfig,
    classifier: Classifier<N>,
    wake: &'a WakeSignal,
    alerts: &'a AlertBoard,
    commands: Option<&'a CommandChannel>,
    reader: R,
    actuators: A,
    serial: S,
    state: TaskState,
    tick: u32,
    last: Option<Sample>,
    band: Option<usize>,
    hold: bool,
    output_enabled: bool,
    peak: PeakTracker,
}

impl<'a, R, A, S, const N: usize> SamplingTask<'a, R, A, S, N>
where
    R: SensorReader,
    A: Actuators,
    S: SerialSink,
{
    pub fn new(
        config: TaskConfig,
        classifier: Classifier<N>,
        wake: &'a WakeSignal,
        alerts: &'a AlertBoard,
        reader: R,
        actuators: A,
        serial: S,
    ) -> Self {
        Self {
            config,
            classifier,
            wake,
            alerts,
            commands: None,
            reader,
            actuators,
            serial,
            state: TaskState::Waiting,
            tick: 0,
            last: None,
            band: None,
            hold: false,
            output_enabled: true,
            peak: PeakTracker::new(),
        }
    }

    /// Accepts hold/output commands from `commands`
    #[must_use]
    pub fn with_commands(mut self, commands: &'a CommandChannel) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Runs cycles for the rest of the process lifetime
    pub async fn run(&mut self) -> ! {
        info!("{} sampling started", self.config.name);
        loop {
            self.run_cycle().await;
        }
    }

    /// Waits for the next wake and runs exactly one cycle
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.enter(TaskState::Waiting);
        self.wake.wait().await;

        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        self.enter(TaskState::Sampling);
        self.apply_commands();

        let outcome = match self.take_sample(tick).await {
            Ok(Some((sample, fresh))) => {
                let result = self.classify_and_act(sample).await;
                if fresh {
                    CycleOutcome::Measured(result)
                } else {
                    CycleOutcome::Reused(result)
                }
            }
            Ok(None) => CycleOutcome::Frozen,
            Err(e) => {
                warn!("{}: no reading at tick {}: {:?}", self.config.name, tick, e);
                CycleOutcome::NoReading(e)
            }
        };

        self.enter(TaskState::Waiting);
        CycleReport { tick, outcome }
    }

    /// Sample for this cycle and whether it was freshly read
    async fn take_sample(&mut self, tick: u32) -> Result<Option<(Sample, bool)>, SensorError> {
        if self.hold {
            return Ok(match self.config.hold_policy {
                HoldPolicy::ReuseLast => self.last.map(|sample| (sample, false)),
                HoldPolicy::Freeze => None,
            });
        }

        let value = self.reader.read().await?;
        let sample = Sample::new(value, self.config.unit, tick);
        self.last = Some(sample);
        if self.peak.update(sample) {
            debug!("{}: new peak {}", self.config.name, value);
        }
        Ok(Some((sample, true)))
    }

    async fn classify_and_act(&mut self, sample: Sample) -> CycleResult {
        self.enter(TaskState::Classifying);
        let classification = self.classifier.classify(&sample, self.band);
        self.band = Some(classification.band);
        let band = *self.classifier.band(classification.band);
        if classification.changed {
            info!("{}: {} at {}", self.config.name, band.label, sample.value());
        }

        self.enter(TaskState::Acting);
        let output = if !self.output_enabled {
            OutputState::OFF
        } else if self.config.readout {
            band.output.with_readout(sample.value())
        } else {
            band.output
        };
        self.actuators.apply(&output).await;

        self.alerts.raise(classification.alerts);
        let dispatched = dispatcher::dispatch(self.alerts, &mut self.serial).await;

        CycleResult {
            sample,
            band: classification.band,
            output,
            raised: classification.alerts,
            dispatched,
        }
    }

    fn apply_commands(&mut self) {
        let Some(commands) = self.commands else {
            return;
        };
        while let Ok(command) = commands.try_receive() {
            match command {
                Command::ToggleHold => self.hold = !self.hold,
                Command::ToggleOutput => self.output_enabled = !self.output_enabled,
            }
            info!(
                "{}: {:?} -> hold {}, output {}",
                self.config.name, command, self.hold, self.output_enabled
            );
        }
    }

    fn enter(&mut self, state: TaskState) {
        if self.state != state {
            trace!("{}: {:?} -> {:?}", self.config.name, self.state, state);
            self.state = state;
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_held(&self) -> bool {
        self.hold
    }

    pub fn output_enabled(&self) -> bool {
        self.output_enabled
    }

    /// Highest freshly read sample so far
    pub fn peak(&self) -> Option<Sample> {
        self.peak.peak()
    }

    pub fn last_sample(&self) -> Option<Sample> {
        self.last
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::system::alert::AlertKind;
    use crate::system::config;
    use crate::system::dispatcher::tests::RecordingSerial;
    use crate::system::output::{Led, LedPattern};
    use core::task::Poll;
    use embassy_futures::{block_on, poll_once};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Hands out scripted readings and counts calls
    #[derive(Default)]
    pub(crate) struct ScriptedReader {
        pub script: VecDeque<Result<f32, SensorError>>,
        pub calls: usize,
    }

    impl ScriptedReader {
        pub fn new(values: &[f32]) -> Self {
            Self {
                script: values.iter().copied().map(Ok).collect(),
                calls: 0,
            }
        }
    }

    impl SensorReader for ScriptedReader {
        async fn read(&mut self) -> Result<f32, SensorError> {
            self.calls += 1;
            self.script.pop_front().unwrap_or(Err(SensorError::Timeout))
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingActuators {
        pub applied: Vec<OutputState>,
    }

    impl Actuators for RecordingActuators {
        async fn apply(&mut self, state: &OutputState) {
            self.applied.push(*state);
        }
    }

    const DISTANCE: TaskConfig = TaskConfig {
        name: "distance",
        unit: Unit::Centimeters,
        hold_policy: HoldPolicy::ReuseLast,
        readout: false,
    };

    type DistanceTask<'a> = SamplingTask<'a, ScriptedReader, RecordingActuators, RecordingSerial, 3>;

    fn distance_task<'a>(wake: &'a WakeSignal, board: &'a AlertBoard, values: &[f32]) -> DistanceTask<'a> {
        SamplingTask::new(
            DISTANCE,
            Classifier::new(config::distance_bands().unwrap()),
            wake,
            board,
            ScriptedReader::new(values),
            RecordingActuators::default(),
            RecordingSerial::default(),
        )
    }

    fn cycle<R, A, S, const N: usize>(task: &mut SamplingTask<'_, R, A, S, N>, wake: &WakeSignal) -> CycleReport
    where
        R: SensorReader,
        A: Actuators,
        S: SerialSink,
    {
        wake.notify();
        block_on(task.run_cycle())
    }

    fn measured(report: CycleReport) -> CycleResult {
        match report.outcome {
            CycleOutcome::Measured(result) => result,
            other => panic!("expected a measured cycle, got {other:?}"),
        }
    }

    #[test]
    fn caution_distance_lights_two_leds_and_alerts_once() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[450.0]);

        let result = measured(cycle(&mut task, &wake));

        let leds = result.output.leds;
        assert!(leds.is_on(Led::Led1) && leds.is_on(Led::Led2) && !leds.is_on(Led::Led3));
        assert_eq!(result.dispatched, AlertFlags::only(AlertKind::Caution));
        assert_eq!(task.serial().lines, ["Precaución, vehículo cerca."]);
        assert_eq!(task.actuators().applied.len(), 1);
    }

    #[test]
    fn danger_distance_lights_all_leds_and_alerts_once() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[250.0]);

        let result = measured(cycle(&mut task, &wake));

        assert_eq!(result.output.leds, LedPattern::ALL);
        assert!(result.output.buzzer);
        assert_eq!(task.serial().lines, ["Peligro, vehículo cerca."]);
    }

    #[test]
    fn clear_distance_lights_first_led_only_and_stays_silent() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[600.0]);

        let result = measured(cycle(&mut task, &wake));

        assert_eq!(result.output.leds, LedPattern::bar(1));
        assert!(!result.output.buzzer);
        assert!(result.dispatched.is_empty());
        assert!(task.serial().lines.is_empty());
    }

    #[test]
    fn alerts_fire_once_per_band_entry() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[450.0, 420.0, 250.0, 260.0, 600.0, 450.0]);

        for _ in 0..6 {
            cycle(&mut task, &wake);
            assert!(board.pending().is_empty());
        }

        assert_eq!(
            task.serial().lines,
            [
                "Precaución, vehículo cerca.",
                "Peligro, vehículo cerca.",
                "Precaución, vehículo cerca.",
            ]
        );
    }

    #[test]
    fn queued_wakes_run_a_single_cycle() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[600.0, 600.0]);

        wake.notify();
        wake.notify();
        let report = block_on(task.run_cycle());
        assert_eq!(report.tick, 0);
        assert_eq!(task.state(), TaskState::Waiting);

        assert_eq!(poll_once(task.run_cycle()), Poll::Pending);
        assert_eq!(task.reader().calls, 1);
    }

    /// Fires the timer twice during its first read, as a slow sensor would see
    struct SlowReader<'a> {
        wake: &'a WakeSignal,
        calls: usize,
    }

    impl SensorReader for SlowReader<'_> {
        async fn read(&mut self) -> Result<f32, SensorError> {
            self.calls += 1;
            if self.calls == 1 {
                self.wake.notify();
                self.wake.notify();
            }
            Ok(600.0)
        }
    }

    #[test]
    fn wakes_during_a_busy_cycle_run_one_more_cycle() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = SamplingTask::new(
            DISTANCE,
            Classifier::new(config::distance_bands().unwrap()),
            &wake,
            &board,
            SlowReader { wake: &wake, calls: 0 },
            RecordingActuators::default(),
            RecordingSerial::default(),
        );

        wake.notify();
        assert_eq!(block_on(task.run_cycle()).tick, 0);
        assert!(wake.is_pending());

        let second = poll_once(task.run_cycle());
        assert!(matches!(second, Poll::Ready(CycleReport { tick: 1, .. })));

        assert_eq!(poll_once(task.run_cycle()), Poll::Pending);
        assert_eq!(task.reader().calls, 2);
    }

    #[test]
    fn failed_read_skips_classification_and_outputs() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[450.0]);
        task.reader.script.push_front(Err(SensorError::Timeout));

        let report = cycle(&mut task, &wake);
        assert_eq!(report.outcome, CycleOutcome::NoReading(SensorError::Timeout));
        assert!(task.actuators().applied.is_empty());
        assert!(task.serial().lines.is_empty());
        assert_eq!(task.last_sample(), None);

        // the next good reading goes through as usual
        measured(cycle(&mut task, &wake));
        assert_eq!(task.actuators().applied.len(), 1);
    }

    #[test]
    fn hold_reuses_last_sample_without_reading() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let commands = CommandChannel::new();
        let mut task = distance_task(&wake, &board, &[250.0, 600.0]).with_commands(&commands);

        measured(cycle(&mut task, &wake));
        commands.try_send(Command::ToggleHold).unwrap();

        let report = cycle(&mut task, &wake);
        let CycleOutcome::Reused(result) = report.outcome else {
            panic!("expected a reused cycle, got {:?}", report.outcome);
        };
        assert!(task.is_held());
        assert_eq!(result.sample.value(), 250.0);
        assert_eq!(result.sample.tick(), 0);
        assert!(result.raised.is_empty());
        assert_eq!(task.reader().calls, 1);
        assert_eq!(task.serial().lines.len(), 1);

        commands.try_send(Command::ToggleHold).unwrap();
        let result = measured(cycle(&mut task, &wake));
        assert_eq!(result.sample.value(), 600.0);
        assert_eq!(task.reader().calls, 2);
    }

    #[test]
    fn hold_without_history_or_with_freeze_does_nothing() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let commands = CommandChannel::new();
        let mut task = distance_task(&wake, &board, &[450.0]).with_commands(&commands);

        commands.try_send(Command::ToggleHold).unwrap();
        assert_eq!(cycle(&mut task, &wake).outcome, CycleOutcome::Frozen);

        let mut frozen = SamplingTask::new(
            TaskConfig {
                hold_policy: HoldPolicy::Freeze,
                ..DISTANCE
            },
            Classifier::new(config::distance_bands().unwrap()),
            &wake,
            &board,
            ScriptedReader::new(&[450.0]),
            RecordingActuators::default(),
            RecordingSerial::default(),
        )
        .with_commands(&commands);
        measured(cycle(&mut frozen, &wake));
        commands.try_send(Command::ToggleHold).unwrap();
        assert_eq!(cycle(&mut frozen, &wake).outcome, CycleOutcome::Frozen);
        assert_eq!(frozen.actuators().applied.len(), 1);
    }

    #[test]
    fn output_toggle_blanks_outputs_but_keeps_alerting() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let commands = CommandChannel::new();
        let mut task = distance_task(&wake, &board, &[250.0]).with_commands(&commands);

        commands.try_send(Command::ToggleOutput).unwrap();
        let result = measured(cycle(&mut task, &wake));

        assert!(!task.output_enabled());
        assert_eq!(result.output, OutputState::OFF);
        assert_eq!(task.serial().lines, ["Peligro, vehículo cerca."]);
    }

    #[test]
    fn readout_carries_sample_value() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = SamplingTask::new(
            TaskConfig {
                readout: true,
                ..DISTANCE
            },
            Classifier::new(config::distance_bands().unwrap()),
            &wake,
            &board,
            ScriptedReader::new(&[612.0]),
            RecordingActuators::default(),
            RecordingSerial::default(),
        );

        let result = measured(cycle(&mut task, &wake));
        assert_eq!(result.output.readout, Some(612.0));
    }

    #[test]
    fn ticks_advance_per_cycle_and_peak_is_tracked() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[700.0, 900.0, 800.0]);

        let ticks: Vec<u32> = (0..3).map(|_| cycle(&mut task, &wake).tick).collect();
        assert_eq!(ticks, [0, 1, 2]);
        assert_eq!(task.peak().map(|s| s.value()), Some(900.0));
        assert_eq!(task.peak().map(|s| s.tick()), Some(1));
    }

    #[test]
    fn a_task_dispatches_flags_left_by_another() {
        let wake = WakeSignal::new();
        let board = AlertBoard::new();
        let mut task = distance_task(&wake, &board, &[600.0]);

        board.raise(AlertFlags::only(AlertKind::Fall));
        let result = measured(cycle(&mut task, &wake));

        assert!(result.raised.is_empty());
        assert_eq!(result.dispatched, AlertFlags::only(AlertKind::Fall));
        assert_eq!(task.serial().lines, ["Caída detectada."]);
    }
}
