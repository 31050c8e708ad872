//! Feature schema for the Alzheimer's risk classifier.
//!
//! The schema is the ordering contract shared with the externally trained
//! model and scaler: 32 named slots, each either categorical (with a
//! label-to-code codebook) or numeric (part of the scaled subset).
//!
//! ```
//! use alzrisk_schema::FeatureSchema;
//! let schema = FeatureSchema::alzheimers();
//! assert_eq!(schema.len(), 32);
//! assert_eq!(schema.codebook("Gender").and_then(|c| c.code("Female")), Some(1));
//! assert!(schema.is_numeric("MMSE"));
//! ```

pub mod feature;
pub mod registry;

pub use feature::{Codebook, FeatureDescriptor, FeatureKind, NumericField, ValidRange};
pub use registry::{FeatureSchema, SchemaError};
