//! Human and machine readable views of an allocation table.
//!
//! Both renderers walk the same rows: every block of the root pool, and for
//! allocations with suballocations, the blocks of their nested pool. Free
//! space is re-derived from the pools rather than read from the file.

pub mod json;
pub mod markdown;

use crate::atf::Allocation;
use crate::forest::AllocationForest;
use crate::ip::{Block, IpNetPool};

pub use json::render_json;
pub use markdown::render_markdown;

/// Output formats for the `render` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderFormat {
    Markdown,
    Json,
}

/// One block of the table, with the allocation recorded for it
#[derive(Debug)]
pub struct Row<'a> {
    pub block: Block,
    pub allocation: Option<&'a Allocation>,
    pub children: Vec<Row<'a>>,
}

impl Row<'_> {
    pub fn is_reserved(&self) -> bool {
        self.allocation.is_some_and(|alloc| alloc.is_reserved)
    }
}

/// Collect the rows to render, skipping free blocks unless `include_free`
pub fn collect_rows(forest: &AllocationForest, include_free: bool) -> Vec<Row<'_>> {
    rows_for_pool(forest, forest.root(), include_free)
}

fn rows_for_pool<'a>(forest: &'a AllocationForest, pool: &IpNetPool, include_free: bool) -> Vec<Row<'a>> {
    pool.find_all_blocks()
        .into_iter()
        .filter(|block| block.allocated || include_free)
        .map(|block| {
            let network = block.network.to_string();
            let allocation = if block.allocated {
                forest.allocation_for(&network)
            } else {
                None
            };
            let children = forest
                .pool_for(&network)
                .map(|sub_pool| rows_for_pool(forest, sub_pool, include_free))
                .unwrap_or_default();
            Row {
                block,
                allocation,
                children,
            }
        })
        .collect()
}
