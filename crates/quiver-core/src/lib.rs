//! Quiver Core
//!
//! The value types shared by every layer of the Quiver graph query runtime.
//!
//! - **Identifiers**: [`NodeId`] and [`EdgeId`] for referencing graph elements
//! - **Values**: the [`Value`] enum bound into record columns by operators
//!
//! # Example
//!
//! ```
//! use quiver_core::{NodeId, Value};
//!
//! let values = vec![Value::from(NodeId::new(1)), Value::from("Alice")];
//! assert_eq!(values[1].as_str(), Some("Alice"));
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod id;
pub mod value;

pub use id::{EdgeId, NodeId};
pub use value::Value;
