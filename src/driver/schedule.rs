//! Next-fire times of the driver's event streams.

use crate::time::{add_seconds, SimTime};

/// Next-fire times of the four event streams plus the run end.
///
/// A stream that will never fire again is parked one second past `run_end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSchedule {
    pub next_index: SimTime,
    pub next_state_write: SimTime,
    pub next_sample_write: SimTime,
    pub next_clock_tick: SimTime,
    pub run_end: SimTime,
}

impl EventSchedule {
    /// Creates a schedule with every stream disabled except the clock tick.
    pub fn new(first_tick: SimTime, run_end: SimTime) -> Self {
        let disabled = add_seconds(run_end, 1.0);
        Self {
            next_index: disabled,
            next_state_write: disabled,
            next_sample_write: disabled,
            next_clock_tick: first_tick,
            run_end,
        }
    }

    /// The time used to park a stream that has nothing left to fire.
    pub fn disabled(&self) -> SimTime {
        add_seconds(self.run_end, 1.0)
    }

    /// Earliest next-fire time across all streams.
    pub fn next_dispatch(&self) -> SimTime {
        self.next_index
            .min(self.next_state_write)
            .min(self.next_sample_write)
            .min(self.next_clock_tick)
    }

    /// True once `time` lies past the end of the run.
    pub fn is_past_end(&self, time: SimTime) -> bool {
        time > self.run_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{from_epoch_seconds, seconds_between};

    fn t(s: f64) -> SimTime {
        from_epoch_seconds(1_000_000_000.0 + s)
    }

    #[test]
    fn test_min_selection() {
        let schedule = EventSchedule {
            next_index: t(10.0),
            next_state_write: t(20.0),
            next_sample_write: t(15.0),
            next_clock_tick: t(30.0),
            run_end: t(25.0),
        };
        let next = schedule.next_dispatch();
        assert_eq!(next, t(10.0));
        assert_eq!(seconds_between(t(0.0), next), 10.0);
        assert!(!schedule.is_past_end(next));
    }

    #[test]
    fn test_terminates_once_minimum_passes_end() {
        let mut schedule = EventSchedule {
            next_index: t(10.0),
            next_state_write: t(20.0),
            next_sample_write: t(15.0),
            next_clock_tick: t(30.0),
            run_end: t(25.0),
        };
        schedule.next_index = schedule.disabled();
        assert_eq!(schedule.next_dispatch(), t(15.0));

        schedule.next_sample_write = t(40.0);
        assert_eq!(schedule.next_dispatch(), t(20.0));

        schedule.next_state_write = t(35.0);
        let next = schedule.next_dispatch();
        assert_eq!(next, t(26.0));
        assert!(schedule.is_past_end(next));
    }

    #[test]
    fn test_new_disables_all_but_clock() {
        let schedule = EventSchedule::new(t(0.0), t(100.0));
        assert_eq!(schedule.next_dispatch(), t(0.0));
        assert_eq!(schedule.next_index, t(101.0));
        assert_eq!(schedule.next_state_write, schedule.disabled());
        assert_eq!(schedule.next_sample_write, schedule.disabled());
    }
}
