pub mod config;
pub mod constants;
pub mod control;
pub mod geo;
pub mod map;
pub mod projection;
pub mod viewport;
