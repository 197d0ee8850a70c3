//! Discrete-event simulation of processes competing for named exclusive
//! resources, scheduled by static priority or round robin, with deadlock
//! detection and recovery.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod kernel;
