//! Small pure helpers shared by the booking screens.

pub mod booking;
pub mod flight;
pub mod format;
