pub mod config;
pub mod error;
pub mod message;
pub mod timing;
pub mod value;

pub use config::Config;
pub use error::*;
pub use message::Message;
pub use timing::{Benchmark, ExponentialBackoff};
pub use value::encode_value;
