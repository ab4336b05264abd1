//! Subnet allocation engine.
//!
//! This module partitions a superblock into allocated and free blocks and
//! hands out new subnets with a best-fit policy.

pub mod allocator;
pub mod cidr;
pub mod error;
pub mod partition;
pub mod pool;

// Re-export commonly used types
pub use cidr::{parse_network, CidrParseError, Ipv4Net};
pub use error::{InvariantViolation, PoolError};
pub use partition::Block;
pub use pool::{IpNetPool, PoolStats};
