// src/ranges/mod.rs
// =============================================================================
// This module handles the IP ranges we search for.
//
// Submodules:
// - block: Parses the ranges document into typed NetworkBlocks
// - expand: Expands a block into its individual addresses
// - load: Reads the document from a file or a URL
// =============================================================================

mod block;
mod expand;
mod load;

pub use block::{ConfigParseError, LabeledBlocks, NetworkBlock, RangeDocument};
pub use expand::AddressRange;
pub use load::load_ranges;
