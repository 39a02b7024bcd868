//! Mesh analysis algorithms.
//!
//! - **Mirror**: symmetric vertex correspondence across an axis
//!   ([`mirror::MirrorCache`])
//! - **UV**: UV vertex grouping and island segmentation
//!   ([`uv::UvVertMap`], [`uv::UvElementMap`])

pub mod mirror;
pub mod progress;
pub mod uv;
