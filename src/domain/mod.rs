pub mod plant;
pub mod schedule;
