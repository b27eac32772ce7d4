//! Preferencias de horario de salida.

mod files;
mod schedule;

pub use files::{LINEAR_SCHEDULE, TSTARS};
pub use schedule::{HomogeneousTstarStep, LinearScheduleStep};
