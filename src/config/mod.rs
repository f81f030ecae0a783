//! Run configuration.
//!
//! [`RunOptions`] holds the raw values supplied on the command line;
//! [`RunOptions::resolve`] combines them with the loaded Kp series into a
//! validated [`RunConfig`].

mod run;

pub use run::{ConfigError, OutputTarget, RunConfig, RunOptions, SpotOptions};
