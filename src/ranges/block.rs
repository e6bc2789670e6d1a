// src/ranges/block.rs
// =============================================================================
// This module parses the ranges document into typed network blocks.
//
// The document is a JSON object like:
//   {
//     "House of Commons": ["192.197.82.0/24"],
//     "Senate":           [["192.197.83.0", "192.197.83.127"]]
//   }
//
// Each label owns a list of blocks, and each block is either:
// - a CIDR string ("192.197.82.0/24", or a bare address for a single host)
// - a two-element list of boundary addresses (start and end, inclusive)
//
// We decide which shape a block has ONCE, here, while parsing. Everything
// downstream works with the NetworkBlock enum and never looks at JSON again.
//
// Rust concepts:
// - Enums with data: NetworkBlock is a tagged union of the two shapes
// - thiserror: Derives std::error::Error for our error enum
// - FromStr: Lets callers write `text.parse::<RangeDocument>()`
// =============================================================================

use ipnetwork::IpNetwork;
use serde_json::{Map, Value};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

use super::expand::AddressRange;

// Everything that can be wrong with a ranges document.
//
// All of these are fatal: the run stops before any request is made.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    #[error("ranges document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ranges document must be a JSON object mapping labels to lists of blocks")]
    NotAnObject,

    #[error("blocks for '{0}' must be a JSON list")]
    NotAList(String),

    #[error("invalid CIDR block '{block}': {reason}")]
    InvalidCidr { block: String, reason: String },

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("a boundary pair needs exactly two addresses, found {0}")]
    WrongArity(usize),

    #[error("boundary pair mixes address families: {start} and {end}")]
    MixedFamilies { start: IpAddr, end: IpAddr },

    #[error("block is neither a CIDR string nor a pair of addresses: {0}")]
    BadShape(String),

    #[error("in '{label}': {source}")]
    InLabel {
        label: String,
        #[source]
        source: Box<ConfigParseError>,
    },
}

/// One configured address range.
///
/// The two variants keep the shape the range was written in, so log lines
/// can show it back to the user the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkBlock {
    /// A network in CIDR notation, e.g. 192.0.2.0/24
    Cidr(IpNetwork),
    /// An explicit inclusive range; both ends share one address family
    BoundaryPair { start: IpAddr, end: IpAddr },
}

impl NetworkBlock {
    // Parses one block from its JSON form
    //
    // Accepts:
    //   "192.0.2.0/24"                   -> Cidr
    //   "192.0.2.7"                      -> Cidr (single host, /32)
    //   ["192.0.2.10", "192.0.2.20"]     -> BoundaryPair
    pub fn from_json(value: &Value) -> Result<Self, ConfigParseError> {
        match value {
            Value::String(text) => Self::parse_cidr(text),
            Value::Array(items) => {
                if items.len() != 2 {
                    return Err(ConfigParseError::WrongArity(items.len()));
                }
                let start = parse_address(&items[0])?;
                let end = parse_address(&items[1])?;
                Self::pair(start, end)
            }
            other => Err(ConfigParseError::BadShape(other.to_string())),
        }
    }

    // Parses a CIDR string.
    //
    // Host bits below the prefix are ignored: "192.0.2.5/30" covers the
    // same four addresses as "192.0.2.0/30".
    pub fn parse_cidr(text: &str) -> Result<Self, ConfigParseError> {
        let network = IpNetwork::from_str(text.trim()).map_err(|e| ConfigParseError::InvalidCidr {
            block: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(NetworkBlock::Cidr(network))
    }

    // Builds a boundary pair, rejecting pairs that mix IPv4 and IPv6.
    //
    // start > end is allowed and simply expands to nothing.
    pub fn pair(start: IpAddr, end: IpAddr) -> Result<Self, ConfigParseError> {
        if start.is_ipv4() != end.is_ipv4() {
            return Err(ConfigParseError::MixedFamilies { start, end });
        }
        Ok(NetworkBlock::BoundaryPair { start, end })
    }

    // Expands the block into its addresses.
    //
    // This is cheap: nothing is allocated, the range is generated lazily.
    // Calling it again starts over from the first address.
    pub fn addresses(&self) -> AddressRange {
        match *self {
            NetworkBlock::Cidr(network) => AddressRange::for_network(network),
            NetworkBlock::BoundaryPair { start, end } => AddressRange::between(start, end),
        }
    }
}

impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkBlock::Cidr(network) => write!(f, "{}/{}", network.network(), network.prefix()),
            NetworkBlock::BoundaryPair { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

fn parse_address(value: &Value) -> Result<IpAddr, ConfigParseError> {
    let text = value
        .as_str()
        .ok_or_else(|| ConfigParseError::InvalidAddress(value.to_string()))?;
    text.trim()
        .parse()
        .map_err(|_| ConfigParseError::InvalidAddress(text.to_string()))
}

// All blocks that belong to one label ("office") of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledBlocks {
    pub label: String,
    pub blocks: Vec<NetworkBlock>,
}

// The whole parsed ranges document, labels kept in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDocument {
    groups: Vec<LabeledBlocks>,
}

impl RangeDocument {
    pub fn groups(&self) -> &[LabeledBlocks] {
        &self.groups
    }

    pub fn block_count(&self) -> usize {
        self.groups.iter().map(|g| g.blocks.len()).sum()
    }

    // Total number of addresses the crawl will visit.
    // u128 because a single IPv6 block can hold more than u64::MAX addresses.
    pub fn address_count(&self) -> u128 {
        self.groups
            .iter()
            .flat_map(|g| g.blocks.iter())
            .fold(0u128, |total, block| total.saturating_add(block.addresses().len()))
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, ConfigParseError> {
        let mut groups = Vec::with_capacity(object.len());

        // serde_json is built with 'preserve_order', so this walks the
        // labels in the order they appear in the file
        for (label, value) in object {
            let items = value
                .as_array()
                .ok_or_else(|| ConfigParseError::NotAList(label.clone()))?;

            let blocks = items
                .iter()
                .map(NetworkBlock::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ConfigParseError::InLabel {
                    label: label.clone(),
                    source: Box::new(e),
                })?;

            groups.push(LabeledBlocks {
                label: label.clone(),
                blocks,
            });
        }

        Ok(RangeDocument { groups })
    }
}

impl FromStr for RangeDocument {
    type Err = ConfigParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(object) => Self::from_object(&object),
            _ => Err(ConfigParseError::NotAnObject),
        }
    }
}
