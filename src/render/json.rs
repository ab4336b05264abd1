//! JSON renderer, for tooling that consumes the block listing.

use serde::Serialize;
use std::io::Write;

use super::{collect_rows, Row};
use crate::atf::AtfFile;
use crate::forest::AllocationForest;
use crate::ip::Ipv4Net;

#[derive(Debug, Serialize)]
struct JsonTable<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    superblock: Ipv4Net,
    blocks: Vec<JsonBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonBlock<'a> {
    network: Ipv4Net,
    allocated: bool,
    reserved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonBlock<'a>>,
}

impl<'a> From<&Row<'a>> for JsonBlock<'a> {
    fn from(row: &Row<'a>) -> Self {
        JsonBlock {
            network: row.block.network,
            allocated: row.block.allocated,
            reserved: row.is_reserved(),
            description: row.allocation.map(|alloc| alloc.description.as_str()),
            children: row.children.iter().map(JsonBlock::from).collect(),
        }
    }
}

/// Render the block listing as pretty-printed JSON
pub fn render_json<W: Write>(
    target: &mut W,
    atf: &AtfFile,
    forest: &AllocationForest,
    include_free: bool,
) -> serde_json::Result<()> {
    let rows = collect_rows(forest, include_free);
    let table = JsonTable {
        name: atf.name.as_deref(),
        superblock: atf.superblock,
        blocks: rows.iter().map(JsonBlock::from).collect(),
    };
    serde_json::to_writer_pretty(&mut *target, &table)?;
    writeln!(target).map_err(serde_json::Error::io)
}
