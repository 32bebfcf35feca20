pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod net;
pub mod use_cases;

pub use frameworks::config;
pub use frameworks::server::{init_runtime, run, run_with_config};
