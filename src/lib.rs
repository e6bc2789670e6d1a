// src/lib.rs
// =============================================================================
// Library side of wiki-ip-edits.
//
// The binary (src/main.rs) only parses arguments, sets up logging and wires
// these modules together. Keeping the logic in a library lets the tests
// drive the whole crawl with a fake transport.
// =============================================================================

pub mod cli; // src/cli.rs - command-line parsing
pub mod config; // src/config.rs - run configuration
pub mod crawl; // src/crawl/ - the crawl loop
pub mod output; // src/output.rs - CSV output
pub mod ranges; // src/ranges/ - IP range parsing and expansion
pub mod wiki; // src/wiki/ - usercontribs API client
