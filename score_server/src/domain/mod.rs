pub mod errors;
pub mod paging;
pub mod ports;
pub mod score;
pub mod stats;
