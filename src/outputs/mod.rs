//! Storage for finished digests.
//!
//! # Submodules
//!
//! - [`json`]: writes the digest to a JSON file for static hosting
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── digest.json
//! ```

pub mod json;

pub use json::FileStore;
