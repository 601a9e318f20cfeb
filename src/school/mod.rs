//! School-specific logic that does not touch the network or the terminal.

pub mod calendar;
pub mod fees;
pub mod forms;
pub mod holidays;
pub mod notices;
