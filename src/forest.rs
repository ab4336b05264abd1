//! Suballocation forest.
//!
//! Builds the top-level pool of an allocation table plus one nested pool for
//! every allocation that declares suballocations. Nesting depth is an explicit
//! parameter, capped at [`MAX_NESTING_DEPTH`] by default.

use std::collections::HashMap;

use crate::atf::{Allocation, AtfFile};
use crate::ip::{IpNetPool, PoolError};

/// Levels of pools allowed: the superblock's own pool and one level of
/// suballocation pools beneath it.
pub const MAX_NESTING_DEPTH: usize = 2;

/// A parsed allocation table: the root pool plus lookups keyed by network
#[derive(Debug, Clone)]
pub struct AllocationForest {
    root: IpNetPool,
    sub_pools: HashMap<String, IpNetPool>,
    allocations: HashMap<String, Allocation>,
}

impl AllocationForest {
    /// Build the forest for an allocation table with the default depth cap
    pub fn from_atf(atf: &AtfFile) -> Result<Self, PoolError> {
        Self::build(&atf.superblock.to_string(), &atf.allocations, MAX_NESTING_DEPTH)
    }

    /// Build the forest rooted at `superblock`, allowing `max_depth` levels of pools.
    pub fn build(
        superblock: &str,
        allocations: &[Allocation],
        max_depth: usize,
    ) -> Result<Self, PoolError> {
        let mut sub_pools = HashMap::new();
        let mut by_network = HashMap::new();

        let root = build_level(superblock, allocations, 0, max_depth, &mut sub_pools, &mut by_network)?;

        Ok(AllocationForest {
            root,
            sub_pools,
            allocations: by_network,
        })
    }

    /// Pool for the superblock itself
    pub fn root(&self) -> &IpNetPool {
        &self.root
    }

    /// Nested pool of an allocation that declares suballocations
    pub fn pool_for(&self, network: &str) -> Option<&IpNetPool> {
        self.sub_pools.get(network)
    }

    /// Allocation recorded for a network, at any level
    pub fn allocation_for(&self, network: &str) -> Option<&Allocation> {
        self.allocations.get(network)
    }

    pub fn has_sub_pools(&self) -> bool {
        !self.sub_pools.is_empty()
    }
}

fn build_level(
    superblock: &str,
    allocations: &[Allocation],
    depth: usize,
    max_depth: usize,
    sub_pools: &mut HashMap<String, IpNetPool>,
    by_network: &mut HashMap<String, Allocation>,
) -> Result<IpNetPool, PoolError> {
    if depth >= max_depth {
        return Err(PoolError::NestingTooDeep {
            network: superblock.to_string(),
            max_depth,
        });
    }

    let pool = IpNetPool::new(superblock, allocations.iter().map(|alloc| alloc.network))?;

    for alloc in allocations {
        let network_name = alloc.network.to_string();
        if !alloc.sub_allocations.is_empty() {
            let sub_pool = build_level(
                &network_name,
                &alloc.sub_allocations,
                depth + 1,
                max_depth,
                sub_pools,
                by_network,
            )?;
            log::debug!("assign subnet {}\t{}", network_name, alloc.description);
            sub_pools.insert(network_name.clone(), sub_pool);
        }
        log::debug!("assign net    {}\t{}", network_name, alloc.description);
        by_network.insert(network_name, alloc.clone());
    }

    Ok(pool)
}
