//! CIDR helpers over `ipnet::Ipv4Net`.
//!
//! Strict parsing (no host bits), overlap checks and the alignment rules that
//! decide which block sizes may start at a given address.

use serde::{Deserialize, Deserializer};
use std::net::Ipv4Addr;

pub use ipnet::Ipv4Net;

use super::error::PoolError;

/// Number of bits in an IPv4 address
pub const MASK_BITS: u8 = 32;

/// Errors produced when parsing CIDR text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrParseError {
    #[error("invalid CIDR '{0}'")]
    Invalid(String),
    #[error("provided non-net CIDR '{given}', did you mean '{suggestion}'?")]
    HostBitsSet { given: String, suggestion: Ipv4Net },
}

/// Parse `a.b.c.d/n`, rejecting text whose address has host bits set.
pub fn parse_network(text: &str) -> Result<Ipv4Net, CidrParseError> {
    let net: Ipv4Net = text
        .trim()
        .parse()
        .map_err(|_| CidrParseError::Invalid(text.to_string()))?;
    if !is_network_address(&net) {
        return Err(CidrParseError::HostBitsSet {
            given: text.to_string(),
            suggestion: net.trunc(),
        });
    }
    Ok(net)
}

/// Serde `deserialize_with` for networks that must not carry host bits
pub fn deserialize_network<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Ipv4Net, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_network(&text).map_err(serde::de::Error::custom)
}

pub fn is_network_address(net: &Ipv4Net) -> bool {
    net.trunc() == *net
}

pub fn overlaps(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.network() <= b.broadcast() && b.network() <= a.broadcast()
}

/// Number of addresses covered by a network
pub fn block_size(net: &Ipv4Net) -> u64 {
    1u64 << (MASK_BITS - net.prefix_len())
}

/// All prefix lengths longer than `parent_prefix` at which `addr` is the
/// network base, shortest (largest block) first.
pub fn legal_prefix_lengths(addr: Ipv4Addr, parent_prefix: u8) -> Vec<u8> {
    (parent_prefix.saturating_add(1)..=MASK_BITS)
        .filter(|&len| Ipv4Net::new(addr, len).is_ok_and(|net| net.network() == addr))
        .collect()
}

/// Check that every network is a proper subnet of `superblock` with no host
/// bits set, and that no two of them overlap. `nets` must be sorted by
/// network address.
pub fn verify_no_overlap(nets: &[Ipv4Net], superblock: &Ipv4Net) -> Result<(), PoolError> {
    for net in nets {
        if !is_network_address(net) {
            return Err(PoolError::OverlapOrOutOfBounds(format!(
                "{} is not a network address, did you mean {}",
                net,
                net.trunc()
            )));
        }
        if !superblock.contains(net) || net == superblock {
            return Err(PoolError::OverlapOrOutOfBounds(format!(
                "{} is not a subnet of {}",
                net, superblock
            )));
        }
    }

    // Sorted by start address, so any overlap shows up between neighbours
    for pair in nets.windows(2) {
        if overlaps(&pair[0], &pair[1]) {
            return Err(PoolError::OverlapOrOutOfBounds(format!(
                "{} overlaps {}",
                pair[0], pair[1]
            )));
        }
    }

    Ok(())
}
