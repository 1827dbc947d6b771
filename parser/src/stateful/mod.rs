//! Stateful readers bound to a data source.
pub mod decode;
