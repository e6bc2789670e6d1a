// src/ranges/expand.rs
// =============================================================================
// This module turns a network block into the individual addresses inside it.
//
// How it works:
// - Both IPv4 and IPv6 addresses are just unsigned integers (32 or 128 bits)
// - We convert the first and last address to u128 and count upwards
// - Each step converts the integer back into an IpAddr
//
// The range is inclusive on both ends and includes the network and
// broadcast addresses; nothing is special-cased.
//
// Rust concepts:
// - Iterator trait: AddressRange produces addresses one at a time (lazily)
// - Clone: A cloned range carries on from the same spot, independently
// =============================================================================

use ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

/// A lazy, inclusive, ascending sequence of addresses of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    family: Family,
    // None once the range is exhausted (or was empty from the start)
    next: Option<u128>,
    last: u128,
}

impl AddressRange {
    // Every address of a CIDR network, network address to broadcast address
    pub fn for_network(network: IpNetwork) -> Self {
        match network {
            IpNetwork::V4(net) => Self::from_bounds(
                Family::V4,
                u128::from(u32::from(net.network())),
                u128::from(u32::from(net.broadcast())),
            ),
            IpNetwork::V6(net) => {
                let first = u128::from(net.network());
                // checked_shr because a /0 would otherwise shift by 128
                let host_bits = u128::MAX.checked_shr(u32::from(net.prefix())).unwrap_or(0);
                Self::from_bounds(Family::V6, first, first | host_bits)
            }
        }
    }

    // Every address from start to end inclusive.
    //
    // Empty when start > end. Mixed families also yield an empty range;
    // NetworkBlock::pair refuses to build such a block in the first place.
    pub fn between(start: IpAddr, end: IpAddr) -> Self {
        match (start, end) {
            (IpAddr::V4(a), IpAddr::V4(b)) => {
                Self::from_bounds(Family::V4, u128::from(u32::from(a)), u128::from(u32::from(b)))
            }
            (IpAddr::V6(a), IpAddr::V6(b)) => Self::from_bounds(Family::V6, u128::from(a), u128::from(b)),
            _ => Self {
                family: Family::V4,
                next: None,
                last: 0,
            },
        }
    }

    fn from_bounds(family: Family, first: u128, last: u128) -> Self {
        Self {
            family,
            next: (first <= last).then_some(first),
            last,
        }
    }

    /// Number of addresses not yet produced.
    ///
    /// Saturates at `u128::MAX`: a full IPv6 `::/0` holds 2^128 addresses,
    /// one more than a u128 can count, so it reports 2^128 - 1. Every
    /// smaller range is counted exactly.
    pub fn len(&self) -> u128 {
        match self.next {
            Some(next) => (self.last - next).saturating_add(1),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_none()
    }

    fn to_addr(&self, value: u128) -> IpAddr {
        match self.family {
            // Values in a V4 range never exceed u32::MAX
            Family::V4 => IpAddr::V4(Ipv4Addr::from(value as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(value)),
        }
    }
}

impl Iterator for AddressRange {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        let current = self.next?;
        self.next = if current < self.last { Some(current + 1) } else { None };
        Some(self.to_addr(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.len()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why u128 for everything?
//    - An IPv6 address is exactly 128 bits, so u128 holds any address
//    - IPv4 fits too, so one piece of arithmetic covers both families
//
// 2. What does (first <= last).then_some(first) do?
//    - bool::then_some returns Some(value) when the bool is true, else None
//    - So a backwards range starts out already exhausted
//
// 3. Why is the iterator "lazy"?
//    - A /8 has 16 million addresses; we never build a Vec of them
//    - Each call to next() computes just one address
// -----------------------------------------------------------------------------
