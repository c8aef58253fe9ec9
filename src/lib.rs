//! Running log statistics: load a log of daily runs, then compute totals and
//! rolling/cumulative distance series for any date range.

pub mod cli;
pub mod parsers;
pub mod services;
pub mod types;
