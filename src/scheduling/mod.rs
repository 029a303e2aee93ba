mod alarm;
mod ticker;

pub use alarm::{AlarmScheduler, firing_window, is_due};
pub use ticker::{Clock, SystemClock, Tick, spawn_ticker};
