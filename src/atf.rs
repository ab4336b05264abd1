//! Allocation table format (ATF).
//!
//! Type-safe structures for the YAML document that records how a superblock
//! has been divided up.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ip::cidr::deserialize_network;
use crate::ip::Ipv4Net;

/// An allocation table file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtfFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "superBlock", deserialize_with = "deserialize_network")]
    pub superblock: Ipv4Net,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

/// One allocated network and its descriptive metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(rename = "reserved", default, skip_serializing_if = "is_false")]
    pub is_reserved: bool,
    #[serde(rename = "cidr", deserialize_with = "deserialize_network")]
    pub network: Ipv4Net,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    #[serde(rename = "subAllocations", default, skip_serializing_if = "Vec::is_empty")]
    pub sub_allocations: Vec<Allocation>,
}

/// Links to where an allocation is documented or deployed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "documentedAt", default, skip_serializing_if = "String::is_empty")]
    pub documentation_uri: String,
    #[serde(rename = "awsCF", default, skip_serializing_if = "String::is_empty")]
    pub aws_cloud_formation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git: String,
    #[serde(rename = "subAlloc", default, skip_serializing_if = "String::is_empty")]
    pub sub_alloc: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Allocation table validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid table name: {0}")]
    InvalidName(String),
    #[error("Duplicate network {0} in allocation table")]
    DuplicateNetwork(String),
}

impl AtfFile {
    /// Validate the table beyond what parsing already guarantees.
    ///
    /// Overlap and nesting rules are checked when the pools are built.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidName("name cannot be empty".to_string()));
            }
        }
        Self::validate_unique(&self.allocations)
    }

    fn validate_unique(allocations: &[Allocation]) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for alloc in allocations {
            if !seen.insert(alloc.network) {
                return Err(ValidationError::DuplicateNetwork(alloc.network.to_string()));
            }
            Self::validate_unique(&alloc.sub_allocations)?;
        }
        Ok(())
    }

    /// Find a top-level allocation by its network
    pub fn allocation_mut(&mut self, network: &Ipv4Net) -> Option<&mut Allocation> {
        self.allocations.iter_mut().find(|alloc| alloc.network == *network)
    }
}

impl Allocation {
    pub fn new(network: Ipv4Net, description: impl Into<String>) -> Self {
        Allocation {
            is_reserved: false,
            network,
            ident: None,
            description: description.into(),
            reference: None,
            sub_allocations: Vec::new(),
        }
    }

    /// Markdown links for the references of this allocation, space separated
    pub fn markdown_refs(&self) -> String {
        let mut links = Vec::new();
        if let Some(reference) = &self.reference {
            if !reference.sub_alloc.is_empty() {
                links.push(format!("[SubAlloc]({})", reference.sub_alloc));
            }
            if !reference.documentation_uri.is_empty() {
                links.push(format!("[Docs]({})", reference.documentation_uri));
            }
            if !reference.aws_cloud_formation.is_empty() {
                links.push(format!("[AWS:CF]({})", reference.aws_cloud_formation));
            }
            if !reference.git.is_empty() {
                links.push(format!("[Git]({})", reference.git));
            }
        }
        links.join(" ")
    }
}
