//! Device probing and poll-cycle orchestration

pub mod cycle;
pub mod observation;
pub mod prober;
