// strider-core: Types, errors, configuration and timing for the strider quadruped controller.

pub mod config;
pub mod error;
pub mod time;
pub mod types;
