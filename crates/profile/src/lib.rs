//! The profile engine (§4.4) and reporters (§4.5): per-profile `identify`
//! and `process`, and the `Mandatory`/`Optional` scoring algorithms they
//! run per field.

pub mod definition;
pub mod engine;
pub mod error;
pub mod field;
pub mod registry;
pub mod reporters;
pub mod row;

pub use definition::ProfileDefinition;
pub use engine::{identify, process, update_feature_count};
pub use error::{ProfileError, RowError};
pub use field::{Extractor, FieldDefinition};
pub use registry::build_profile;
pub use reporters::{Mandatory, Optional, Reporter};
pub use row::{FeatureRow, IdentifiedRow, ScoredRow, ValueRow};
