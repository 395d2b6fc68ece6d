#![warn(missing_docs)]
//! Core primitives shared across the limlib workspace.

pub mod key;

pub use key::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};
