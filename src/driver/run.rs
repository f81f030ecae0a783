//! The simulation driver loop.

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::EventSchedule;
use crate::input::{KpError, KpSeries, SampleSchedule};
use crate::model::{Engine, PotentialModel};
use crate::output::{OutputError, SampleWriter, StateWriter};
use crate::time::{add_seconds, format_time, seconds_between, SimTime};

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Driving index error: {0}")]
    Kp(#[from] KpError),
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
    #[error("{name} must be positive, got {value}")]
    NonPositivePeriod { name: &'static str, value: f64 },
    #[error("Run end {end} is before run start {start}")]
    EndBeforeStart { start: String, end: String },
}

/// Scheduling parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub start: SimTime,
    pub end: SimTime,
    /// First state write. Ignored in sample mode, where the schedule carries its own start.
    pub output_start: SimTime,
    /// Seconds between state writes.
    pub output_period: f64,
    /// Seconds between clock ticks pushed to the engine.
    pub clock_period: f64,
    pub potential: PotentialModel,
}

impl DriverConfig {
    /// A run over `[start, end]` with state output from `start` every 900 s.
    pub fn new(start: SimTime, end: SimTime) -> Self {
        Self {
            start,
            end,
            output_start: start,
            output_period: 900.0,
            clock_period: 300.0,
            potential: PotentialModel::default(),
        }
    }

    fn validate(&self) -> Result<(), DriverError> {
        if self.end < self.start {
            return Err(DriverError::EndBeforeStart {
                start: format_time(self.start),
                end: format_time(self.end),
            });
        }
        for (name, value) in [
            ("Output period", self.output_period),
            ("Clock period", self.clock_period),
        ] {
            if !(value > 0.0) {
                return Err(DriverError::NonPositivePeriod { name, value });
            }
        }
        Ok(())
    }
}

/// The single active output of a run.
pub enum OutputMode<W: Write> {
    /// Full engine state every output period.
    State(StateWriter<W>),
    /// Density samples at fixed locations.
    Samples {
        schedule: SampleSchedule,
        writer: SampleWriter<W>,
    },
}

impl<W: Write> OutputMode<W> {
    pub fn name(&self) -> &'static str {
        match self {
            OutputMode::State(_) => "state",
            OutputMode::Samples { .. } => "samples",
        }
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of `advance` calls made on the engine.
    pub steps: usize,
    pub index_updates: usize,
    pub state_writes: usize,
    pub sample_writes: usize,
    pub simulated_seconds: f64,
}

/// Something the driver did during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverEvent {
    Advanced { from: SimTime, to: SimTime, dt: f64 },
    IndexUpdated { time: SimTime, index: usize, kp: f64 },
    StateWritten { time: SimTime },
    SampleWritten { time: SimTime, locations: usize },
}

/// Run-wide mutable state: the output sink, the index pointer and counters.
pub struct RunContext<W: Write> {
    output: OutputMode<W>,
    kp_index: usize,
    summary: RunSummary,
}

impl<W: Write> RunContext<W> {
    pub fn output(&self) -> &OutputMode<W> {
        &self.output
    }

    /// Position of the next driving-index entry to apply.
    pub fn kp_index(&self) -> usize {
        self.kp_index
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

/// Steps an engine through a run, dispatching index updates and output.
pub struct SimulationDriver<E: Engine, W: Write> {
    engine: E,
    kp: KpSeries,
    config: DriverConfig,
    schedule: EventSchedule,
    context: RunContext<W>,
    current: SimTime,
}

impl<E: Engine, W: Write> SimulationDriver<E, W> {
    /// Prepares a run starting at `config.start`.
    ///
    /// Fails when no driving-index entry lies at or before the start time.
    /// The engine is parameterized with that entry before the first tick.
    pub fn new(
        mut engine: E,
        kp: KpSeries,
        config: DriverConfig,
        output: OutputMode<W>,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        let kp_index = kp.find(config.start)?;
        let entry = kp.entries()[kp_index];
        engine.set_driving_parameter(config.potential, &[entry.kp]);

        let mut schedule = EventSchedule::new(config.start, config.end);
        schedule.next_index = entry.time;
        match &output {
            OutputMode::State(_) => schedule.next_state_write = config.output_start,
            OutputMode::Samples { schedule: samples, .. } => {
                schedule.next_sample_write = samples.next_time()
            }
        }

        info!(
            start = %format_time(config.start),
            end = %format_time(config.end),
            output = output.name(),
            potential = config.potential.name(),
            "driver initialized"
        );

        Ok(Self {
            engine,
            kp,
            config,
            schedule,
            context: RunContext {
                output,
                kp_index,
                summary: RunSummary::default(),
            },
            current: config.start,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn schedule(&self) -> &EventSchedule {
        &self.schedule
    }

    pub fn context(&self) -> &RunContext<W> {
        &self.context
    }

    pub fn current_time(&self) -> SimTime {
        self.current
    }

    /// Runs to completion.
    pub fn run(&mut self) -> Result<RunSummary, DriverError> {
        self.run_with_callback(|_| {})
    }

    /// Runs to completion, reporting every event to `on_event`.
    pub fn run_with_callback<F>(&mut self, mut on_event: F) -> Result<RunSummary, DriverError>
    where
        F: FnMut(&DriverEvent),
    {
        let mut next_dispatch = self.current;
        while !self.schedule.is_past_end(next_dispatch) {
            self.engine.set_clock(self.current);
            self.schedule.next_clock_tick =
                add_seconds(self.schedule.next_clock_tick, self.config.clock_period);

            if next_dispatch > self.current {
                let dt = seconds_between(self.current, next_dispatch);
                self.engine.advance(dt);
                let from = self.current;
                self.current = next_dispatch;
                self.context.summary.steps += 1;
                self.context.summary.simulated_seconds += dt;
                on_event(&DriverEvent::Advanced {
                    from,
                    to: self.current,
                    dt,
                });
            }
            debug!(time = %format_time(self.current), "tick");

            if self.current >= self.schedule.next_index {
                if let Some(event) = self.apply_index() {
                    on_event(&event);
                }
            }
            if let Some(event) = self.dispatch_output()? {
                on_event(&event);
            }

            next_dispatch = self.schedule.next_dispatch();
        }

        let summary = self.context.summary;
        info!(
            steps = summary.steps,
            index_updates = summary.index_updates,
            state_writes = summary.state_writes,
            sample_writes = summary.sample_writes,
            simulated_seconds = summary.simulated_seconds,
            "run complete"
        );
        Ok(summary)
    }

    /// Flushes the output and hands back the engine and the output sink.
    pub fn finish(self) -> Result<(E, W), DriverError> {
        let sink = match self.context.output {
            OutputMode::State(writer) => writer.finish()?,
            OutputMode::Samples { writer, .. } => writer.finish()?,
        };
        Ok((self.engine, sink))
    }

    fn apply_index(&mut self) -> Option<DriverEvent> {
        let index = self.context.kp_index;
        let Some(entry) = self.kp.get(index).copied() else {
            self.schedule.next_index = self.schedule.disabled();
            return None;
        };

        self.engine
            .set_driving_parameter(self.config.potential, &[entry.kp]);
        self.context.kp_index += 1;
        self.context.summary.index_updates += 1;
        info!(time = %format_time(self.current), kp = entry.kp, "driving index updated");

        self.schedule.next_index = match self.kp.get(self.context.kp_index) {
            Some(next) => next.time,
            None => {
                info!("driving index exhausted");
                self.schedule.disabled()
            }
        };

        Some(DriverEvent::IndexUpdated {
            time: self.current,
            index,
            kp: entry.kp,
        })
    }

    fn dispatch_output(&mut self) -> Result<Option<DriverEvent>, DriverError> {
        let time = self.current;
        match &mut self.context.output {
            OutputMode::State(writer) => {
                if time < self.schedule.next_state_write {
                    return Ok(None);
                }
                writer.write_record(time, &self.engine)?;
                self.schedule.next_state_write =
                    add_seconds(self.schedule.next_state_write, self.config.output_period);
                self.context.summary.state_writes += 1;
                info!(time = %format_time(time), "state written");
                Ok(Some(DriverEvent::StateWritten { time }))
            }
            OutputMode::Samples { schedule, writer } => {
                if time < self.schedule.next_sample_write {
                    return Ok(None);
                }
                writer.write_samples(time, schedule.locations(), &self.engine)?;
                self.schedule.next_sample_write = schedule.advance();
                self.context.summary.sample_writes += 1;
                let locations = schedule.locations().len();
                info!(time = %format_time(time), locations, "samples written");
                Ok(Some(DriverEvent::SampleWritten { time, locations }))
            }
        }
    }
}
