pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod net;
pub mod use_cases;

pub use frameworks::app::{init_runtime, run};
pub use frameworks::config;
