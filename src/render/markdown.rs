//! Markdown table renderer.

use std::io::{self, Write};

use super::{collect_rows, Row};
use crate::atf::AtfFile;
use crate::forest::AllocationForest;

pub const MARKER_ALLOC: &str = "✅";
pub const MARKER_FREE: &str = "";
pub const MARKER_RESERVED: &str = "⚠️";

/// Prefix for the Net cell of a suballocation row
const SUB_PREFIX: &str = "└ ";

/// Render the allocation table as a Markdown document
pub fn render_markdown<W: Write>(
    target: &mut W,
    atf: &AtfFile,
    forest: &AllocationForest,
    include_free: bool,
) -> io::Result<()> {
    match &atf.name {
        None => {
            let added = if include_free { "(with empty blocks)" } else { "" };
            writeln!(target, "# {} {}\n", atf.superblock, added)?;
        }
        Some(name) => {
            let added = if include_free { ", with empty blocks" } else { "" };
            writeln!(target, "# {} ({}{})\n", name, atf.superblock, added)?;
        }
    }

    writeln!(target, "[//]: # (Generated by atfutil, DO NOT EDIT)\n")?;
    writeln!(target, "|Alloc|Net|Desc|Ref|\n|-|-|-|-|")?;

    for row in collect_rows(forest, include_free) {
        write_row(target, &row, "")?;
        for child in &row.children {
            write_row(target, child, SUB_PREFIX)?;
        }
    }
    Ok(())
}

fn write_row<W: Write>(target: &mut W, row: &Row<'_>, prefix: &str) -> io::Result<()> {
    let network = row.block.network;
    match row.allocation {
        Some(alloc) => {
            let status = if alloc.is_reserved { MARKER_RESERVED } else { MARKER_ALLOC };
            writeln!(
                target,
                "|{}|{}{}|{}|{}|",
                status,
                prefix,
                network,
                alloc.description,
                alloc.markdown_refs()
            )
        }
        None if row.block.allocated => writeln!(target, "|{}|{}{}|||", MARKER_ALLOC, prefix, network),
        None => writeln!(target, "|{}|{}{}|||", MARKER_FREE, prefix, network),
    }
}
