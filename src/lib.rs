//! Workspace placeholder crate.
//!
//! This crate exists so host applications can depend on `epc-workspace` and
//! pull in the individual workspace crates (`core-runtime`, `core-codec`,
//! `core-filter`, `core-engine`) without wiring each one individually.

pub use core_codec as codec;
pub use core_engine as engine;
pub use core_filter as filter;
pub use core_runtime as runtime;
