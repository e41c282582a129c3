mod engine;
mod ticker;

pub use engine::{FocusTimer, TimerState, Toggle};
pub use ticker::{spawn_ticker, LiveSession, SharedOrganizer, TickHandle, TICK_PERIOD};
