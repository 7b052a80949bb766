pub mod distance_sampling;
pub mod fall_sampling;
pub mod periodic_wake;
pub mod resources;
pub mod serial;
pub mod signal_lab;
pub mod switch_input;
