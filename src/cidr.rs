//! IPv4 CIDR blocks and sequential subnet allocation
//!
//! The network stack carves its `/28` subnets out of the configured VPC block
//! in the same order the provisioning toolchain does: subnet group by subnet
//! group, availability zone by availability zone, each taking the next
//! aligned free range.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from CIDR parsing and allocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("Invalid CIDR notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u8),

    #[error("Address {0} has host bits set for prefix /{1}")]
    HostBitsSet(Ipv4Addr, u8),

    #[error("Subnet prefix /{0} is wider than the block prefix /{1}")]
    SubnetTooLarge(u8, u8),

    #[error("Block {0} has no room left for a /{1} subnet")]
    Exhausted(Ipv4Cidr, u8),
}

/// An IPv4 network in CIDR notation, always stored in canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// Build a block from a network address and prefix length.
    ///
    /// The address must not have host bits set, so `10.0.0.5/24` is rejected
    /// rather than silently truncated.
    pub fn new(network: Ipv4Addr, prefix: u8) -> Result<Self, CidrError> {
        if prefix > 32 {
            return Err(CidrError::InvalidPrefixLength(prefix));
        }
        let bits = u32::from(network);
        if bits & !mask_for(prefix) != 0 {
            return Err(CidrError::HostBitsSet(network, prefix));
        }
        Ok(Self { network, prefix })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// True if `other` lies entirely within this block
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix >= self.prefix
            && u32::from(other.network) & mask_for(self.prefix) == u32::from(self.network)
    }
}

fn mask_for(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| CidrError::InvalidNotation(s.to_string()))?;
        let network =
            Ipv4Addr::from_str(addr).map_err(|_| CidrError::InvalidAddress(addr.to_string()))?;
        let prefix = prefix
            .parse::<u8>()
            .map_err(|_| CidrError::InvalidNotation(s.to_string()))?;
        Self::new(network, prefix)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = CidrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Cidr> for String {
    fn from(cidr: Ipv4Cidr) -> Self {
        cidr.to_string()
    }
}

/// Hands out consecutive, size-aligned subnets from a parent block
#[derive(Debug, Clone)]
pub struct SubnetAllocator {
    block: Ipv4Cidr,
    next_offset: u64,
}

impl SubnetAllocator {
    pub fn new(block: Ipv4Cidr) -> Self {
        Self {
            block,
            next_offset: 0,
        }
    }

    /// Allocate the next free subnet with the given prefix length.
    pub fn allocate(&mut self, prefix: u8) -> Result<Ipv4Cidr, CidrError> {
        if prefix > 32 {
            return Err(CidrError::InvalidPrefixLength(prefix));
        }
        if prefix < self.block.prefix {
            return Err(CidrError::SubnetTooLarge(prefix, self.block.prefix));
        }

        let size = 1u64 << (32 - u32::from(prefix));
        let aligned = self.next_offset.div_ceil(size) * size;
        if aligned + size > self.block.size() {
            return Err(CidrError::Exhausted(self.block, prefix));
        }
        self.next_offset = aligned + size;

        let base = u32::from(self.block.network) as u64 + aligned;
        Ipv4Cidr::new(Ipv4Addr::from(base as u32), prefix)
    }

    /// Addresses still unallocated at the tail of the block
    pub fn remaining(&self) -> u64 {
        self.block.size() - self.next_offset
    }
}
