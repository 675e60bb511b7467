use hintsweeper_common::models::{ClockState, TimerBand, TimerView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Starts on the first reveal and counts elapsed seconds.
    CountUp,
    /// Runs from the start of the session down to zero.
    Countdown { budget: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock is not running.
    Ignored,
    Counted,
    /// The countdown just reached zero.
    Expired,
}

/// The single game clock. Whatever drives it calls [`Clock::tick`] once per
/// second while [`Clock::is_running`] holds.
#[derive(Debug, Clone)]
pub struct Clock {
    mode: TimerMode,
    state: ClockState,
    elapsed: u32,
    remaining: u32,
}

impl Clock {
    pub fn count_up() -> Self {
        Self {
            mode: TimerMode::CountUp,
            state: ClockState::Idle,
            elapsed: 0,
            remaining: 0,
        }
    }

    pub fn countdown(budget: u32) -> Self {
        Self {
            mode: TimerMode::Countdown { budget },
            state: ClockState::Running,
            elapsed: 0,
            remaining: budget,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Seconds actually ticked, penalties excluded.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining(&self) -> Option<u32> {
        match self.mode {
            TimerMode::CountUp => None,
            TimerMode::Countdown { .. } => Some(self.remaining),
        }
    }

    /// Leave `Idle`; every other state is kept.
    pub fn start(&mut self) {
        if self.state == ClockState::Idle {
            self.state = ClockState::Running;
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.state != ClockState::Running {
            return Tick::Ignored;
        }

        self.elapsed += 1;
        if let TimerMode::Countdown { .. } = self.mode {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.state = ClockState::Expired;
                return Tick::Expired;
            }
        }
        Tick::Counted
    }

    /// Take `seconds` off a countdown. Returns `true` when that used up the
    /// remaining time. Count-up clocks are unaffected.
    pub fn charge(&mut self, seconds: u32) -> bool {
        let TimerMode::Countdown { .. } = self.mode else {
            return false;
        };
        if matches!(self.state, ClockState::Stopped | ClockState::Expired) {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(seconds);
        if self.remaining == 0 {
            self.state = ClockState::Expired;
            return true;
        }
        false
    }

    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != ClockState::Paused {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    /// Freeze the clock for good. An expired countdown stays expired.
    pub fn stop(&mut self) {
        if self.state != ClockState::Expired {
            self.state = ClockState::Stopped;
        }
    }

    pub fn view(&self, penalty: u32) -> TimerView {
        match self.mode {
            TimerMode::CountUp => TimerView {
                timed: false,
                state: self.state,
                seconds: self.elapsed + penalty,
                band: None,
            },
            TimerMode::Countdown { budget } => TimerView {
                timed: true,
                state: self.state,
                seconds: self.remaining,
                band: Some(TimerBand::for_remaining(self.remaining, budget)),
            },
        }
    }
}
