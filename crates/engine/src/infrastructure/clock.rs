//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Ticking clock for testing - strictly increasing timestamps so event
/// order stays deterministic.
#[cfg(test)]
pub struct TickingClock(pub std::sync::Mutex<DateTime<Utc>>);

#[cfg(test)]
impl TickingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self(std::sync::Mutex::new(start))
    }
}

#[cfg(test)]
impl ClockPort for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut guard = self.0.lock().expect("clock mutex poisoned");
        let current = *guard;
        *guard = current + chrono::Duration::milliseconds(1);
        current
    }
}

/// Fixed random for testing - every roll returns the same value.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, _min: i32, _max: i32) -> i32 {
        self.0
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Scripted random for testing - returns values in sequence, then the minimum.
#[cfg(test)]
pub struct SequenceRandom(pub std::sync::Mutex<std::collections::VecDeque<i32>>);

#[cfg(test)]
impl SequenceRandom {
    pub fn new(values: &[i32]) -> Self {
        Self(std::sync::Mutex::new(values.iter().copied().collect()))
    }
}

#[cfg(test)]
impl RandomPort for SequenceRandom {
    fn gen_range(&self, min: i32, _max: i32) -> i32 {
        self.0
            .lock()
            .expect("random mutex poisoned")
            .pop_front()
            .unwrap_or(min)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}
