//! Superblock partitioning.
//!
//! Walks the superblock from its base address and tiles it with the largest
//! aligned blocks possible, each either exactly an allocation or free of any
//! allocation.

use serde::Serialize;
use std::net::Ipv4Addr;

use super::cidr::{block_size, legal_prefix_lengths, overlaps, Ipv4Net};
use super::error::{invariant_violated, InvariantViolation};

/// A network that is either allocated or free within a superblock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    pub network: Ipv4Net,
    pub allocated: bool,
}

/// Calculate all blocks of a superblock. Unallocated space is reduced to the
/// largest allocatable blocks.
///
/// `allocations` must be sorted by base address, non-overlapping and inside
/// `superblock`; a pool guarantees this. If no block fits at some address the
/// input broke those rules and the engine aborts.
pub fn find_all_blocks(superblock: &Ipv4Net, allocations: &[Ipv4Net]) -> Vec<Block> {
    let mut blocks = Vec::new();

    // Allocations are sorted, so only the next pending one can start here
    let mut pending = allocations.iter().peekable();

    let end = u64::from(u32::from(superblock.broadcast())) + 1;
    let mut cursor = u64::from(u32::from(superblock.network()));

    while cursor < end {
        // cursor < end <= 2^32
        let addr = Ipv4Addr::from(cursor as u32);
        let mut placed = None;

        for prefix_len in legal_prefix_lengths(addr, superblock.prefix_len()) {
            let Ok(candidate) = Ipv4Net::new(addr, prefix_len) else {
                continue;
            };

            if pending.peek().is_some_and(|next| **next == candidate) {
                pending.next();
                placed = Some(Block {
                    network: candidate,
                    allocated: true,
                });
                break;
            }

            if !allocations.iter().any(|alloc| overlaps(alloc, &candidate)) {
                placed = Some(Block {
                    network: candidate,
                    allocated: false,
                });
                break;
            }
        }

        match placed {
            Some(block) => {
                cursor += block_size(&block.network);
                blocks.push(block);
            }
            None => invariant_violated(InvariantViolation::PartitionStalled {
                superblock: superblock.to_string(),
                address: addr.to_string(),
            }),
        }
    }

    blocks
}
