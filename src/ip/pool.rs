//! Network pool.
//!
//! An `IpNetPool` owns a superblock and the sorted list of networks already
//! allocated inside it. Every constructor and mutation re-checks that the list
//! is sorted, non-overlapping and contained in the superblock.

use super::allocator::best_fit;
use super::cidr::{block_size, is_network_address, verify_no_overlap, Ipv4Net, MASK_BITS};
use super::error::{invariant_violated, InvariantViolation, PoolError};
use super::partition::{find_all_blocks, Block};

/// A list of allocations in one larger superblock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpNetPool {
    superblock: Ipv4Net,
    allocations: Vec<Ipv4Net>,
}

/// Address usage summary for a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total_addresses: u64,
    pub allocated_addresses: u64,
    pub free_addresses: u64,
    pub free_blocks: usize,
    /// Prefix length of the largest free block, if any space is left
    pub largest_free_prefix: Option<u8>,
}

impl IpNetPool {
    /// Create a new pool of allocation blocks within one superblock
    pub fn new<I>(superblock: &str, allocations: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = Ipv4Net>,
    {
        let invalid = |reason: String| PoolError::InvalidSuperblock {
            superblock: superblock.to_string(),
            reason,
        };

        let net: Ipv4Net = superblock
            .trim()
            .parse()
            .map_err(|_| invalid("not an IPv4 CIDR".to_string()))?;
        if !is_network_address(&net) {
            return Err(invalid(format!("address is not the network address of {}", net.trunc())));
        }
        if net.prefix_len() == MASK_BITS {
            return Err(invalid("a /32 cannot be subdivided".to_string()));
        }

        let allocations = Self::sorted_and_verified(&net, allocations.into_iter().collect())?;
        Ok(IpNetPool {
            superblock: net,
            allocations,
        })
    }

    fn sorted_and_verified(
        superblock: &Ipv4Net,
        mut allocations: Vec<Ipv4Net>,
    ) -> Result<Vec<Ipv4Net>, PoolError> {
        // Stable, so equal addresses keep their input order
        allocations.sort_by_key(|net| net.network());
        verify_no_overlap(&allocations, superblock)?;
        Ok(allocations)
    }

    pub fn superblock(&self) -> &Ipv4Net {
        &self.superblock
    }

    /// Allocated networks, ascending by base address
    pub fn allocations(&self) -> &[Ipv4Net] {
        &self.allocations
    }

    /// Partition the superblock into maximal allocated and free blocks.
    pub fn find_all_blocks(&self) -> Vec<Block> {
        find_all_blocks(&self.superblock, &self.allocations)
    }

    /// Allocate a `/prefix_len` network from the tightest free block that can
    /// hold it.
    ///
    /// The caller is responsible for rejecting sizes outside its policy range;
    /// a request larger than any free block returns `NoSpaceAvailable`, and a
    /// prefix longer than /32 returns `InvalidPrefixLength`.
    pub fn alloc(&mut self, prefix_len: u8) -> Result<Ipv4Net, PoolError> {
        if prefix_len > MASK_BITS {
            return Err(PoolError::InvalidPrefixLength { prefix_len });
        }

        let blocks = self.find_all_blocks();
        let network = best_fit(&blocks, prefix_len).ok_or(PoolError::NoSpaceAvailable { prefix_len })?;
        self.commit(network);

        log::debug!("allocated {} in {}", network, self.superblock);
        Ok(network)
    }

    /// Record a network chosen by the allocator. The new list is checked on a
    /// copy and only swapped in when valid; a network that breaks the pool is
    /// an engine defect.
    pub(crate) fn commit(&mut self, network: Ipv4Net) {
        let mut next = self.allocations.clone();
        next.push(network);
        match Self::sorted_and_verified(&self.superblock, next) {
            Ok(next) => self.allocations = next,
            Err(source) => invariant_violated(InvariantViolation::DefectiveAllocation {
                network: network.to_string(),
                source,
            }),
        }
    }

    /// Get statistics about address usage
    pub fn stats(&self) -> PoolStats {
        let total_addresses = block_size(&self.superblock);
        let allocated_addresses: u64 = self.allocations.iter().map(block_size).sum();
        let free: Vec<Ipv4Net> = self
            .find_all_blocks()
            .into_iter()
            .filter(|block| !block.allocated)
            .map(|block| block.network)
            .collect();

        PoolStats {
            total_addresses,
            allocated_addresses,
            free_addresses: total_addresses - allocated_addresses,
            free_blocks: free.len(),
            largest_free_prefix: free.iter().map(Ipv4Net::prefix_len).min(),
        }
    }
}
