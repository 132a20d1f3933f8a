pub mod channel;
pub mod error;

pub use channel::{bounded, Receiver, Sender};
pub use error::QueueError;
