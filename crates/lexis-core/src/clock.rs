//! Source of "today" for the scheduler.

use chrono::{Local, NaiveDate};

/// Supplies the current calendar date. Injected into
/// [`crate::trainer::Trainer`] so scheduling can be tested deterministically.
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

/// A clock frozen on a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.0 }
}
