//! Best-fit block selection.
//!
//! New subnets are carved from the smallest free block that can still hold
//! them, which keeps larger free regions intact and fragmentation low.

use super::cidr::Ipv4Net;
use super::partition::Block;

/// Pick the tightest free block that can hold a `/prefix_len` network and
/// return the lowest-addressed network of that size inside it.
///
/// Among equally tight blocks the first in address order wins, so placement
/// is deterministic for a given pool state.
pub fn best_fit(blocks: &[Block], prefix_len: u8) -> Option<Ipv4Net> {
    let mut chosen: Option<&Block> = None;

    for block in blocks.iter().filter(|b| !b.allocated) {
        let block_len = block.network.prefix_len();
        if block_len > prefix_len {
            continue;
        }
        // Strictly greater keeps the earliest block on ties
        if chosen.map_or(true, |c| block_len > c.network.prefix_len()) {
            chosen = Some(block);
        }
    }

    // Downsize the chosen block to the requested size
    chosen.and_then(|block| Ipv4Net::new(block.network.network(), prefix_len).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str, allocated: bool) -> Block {
        Block {
            network: s.parse().unwrap(),
            allocated,
        }
    }

    #[test]
    fn test_tightest_fit_wins() {
        let blocks = vec![
            block("10.0.0.0/25", false),
            block("10.0.0.128/26", true),
            block("10.0.0.192/27", false),
            block("10.0.0.224/27", false),
        ];

        assert_eq!(best_fit(&blocks, 28), Some("10.0.0.192/28".parse().unwrap()));
        assert_eq!(best_fit(&blocks, 27), Some("10.0.0.192/27".parse().unwrap()));
        assert_eq!(best_fit(&blocks, 26), Some("10.0.0.0/26".parse().unwrap()));
    }

    #[test]
    fn test_allocated_blocks_are_skipped() {
        let blocks = vec![block("10.0.0.0/25", true), block("10.0.0.128/26", false)];
        assert_eq!(best_fit(&blocks, 25), None);
        assert_eq!(best_fit(&blocks, 30), Some("10.0.0.128/30".parse().unwrap()));
    }

    #[test]
    fn test_nothing_large_enough() {
        let blocks = vec![block("10.0.0.0/13", false), block("10.8.0.0/13", false)];
        assert_eq!(best_fit(&blocks, 8), None);
        assert_eq!(best_fit(&[], 24), None);
    }

    #[test]
    fn test_out_of_range_prefix_is_not_carved() {
        let blocks = vec![block("10.0.0.0/24", false)];
        assert_eq!(best_fit(&blocks, 33), None);
        assert_eq!(best_fit(&blocks, 255), None);
    }
}
