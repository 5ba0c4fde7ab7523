#![forbid(unsafe_code)]

pub mod access;
pub mod ids;
pub mod number;
pub mod recurrence;
pub mod status;
pub mod transition;
