//! # atfutil - allocation tables for CIDR address space
//!
//! This library keeps a declarative record of how a network range (for
//! example a VPC CIDR) has been divided up among teams and services, and
//! hands out new subnets from it without creating needless fragmentation.
//!
//! ## Overview
//!
//! An allocation table (ATF) is a YAML document naming a superblock and the
//! networks allocated inside it, optionally with one level of suballocations.
//! From it the library can:
//!
//! - **Validate**: reject overlapping or out-of-bounds allocations
//! - **Partition**: tile the superblock into maximal allocated and free blocks
//! - **Allocate**: carve a new subnet from the tightest free block that fits
//! - **Render**: produce a Markdown or JSON view of the table
//!
//! ## Architecture
//!
//! - `ip`: CIDR primitives, the network pool, partitioner and best-fit allocator
//! - `forest`: the root pool plus nested pools for suballocations
//! - `atf`: allocation table data structures
//! - `atf_loader`: reading and writing allocation tables
//! - `render`: Markdown and JSON renderers
//!
//! ## Example Usage
//!
//! ```rust
//! use atfutil::ip::{IpNetPool, Ipv4Net};
//!
//! let mut pool = IpNetPool::new(
//!     "10.0.0.0/8",
//!     vec!["10.0.0.0/16".parse::<Ipv4Net>()?, "10.1.0.0/16".parse()?],
//! )?;
//!
//! let net = pool.alloc(16)?;
//! assert_eq!(net.to_string(), "10.2.0.0/16");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Bad input surfaces as `ip::PoolError`. A failure of the engine's own
//! invariants is not an input error: it is reported as
//! `ip::InvariantViolation` and aborts. The CLI layers `color_eyre` on top
//! for context-rich reports.

pub mod atf;
pub mod atf_loader;
pub mod forest;
pub mod ip;
pub mod render;
