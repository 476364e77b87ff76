//! Application module

pub mod cli;
pub mod output;
pub mod report;
pub mod spinner;
pub mod startup;
