//! Render-facing export
//!
//! No GPU code lives in this crate; a frontend uploads the instances built
//! here and draws one mesh per [`InstanceKind`].

pub mod instance;

pub use instance::{InstanceKind, InstanceRaw, collect_instances, colors};
