pub use warden_core::{ProfileError, RowError};
