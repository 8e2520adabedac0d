//! IPv4 allow-list matching.
//!
//! # Entry formats
//! - `*`: any caller
//! - `192.168.1.100`: exact, compared as text
//! - `192.168.*.*`: per-octet wildcard, compared as text (`01` != `1`)
//! - `10.0.0.0/8`: CIDR block, prefix 0..=32
//!
//! Entries that cannot be interpreted are kept as `Malformed` and never
//! match. Matching never fails.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

const WILDCARD: &str = "*";
const CIDR_SEPARATOR: char = '/';
const IPV4_OCTET_COUNT: usize = 4;
const IPV4_BIT_LENGTH: u8 = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AllowListEntry {
    Any,
    Exact(String),
    Wildcard([String; IPV4_OCTET_COUNT]),
    Cidr { base: u32, prefix_len: u8 },
    Malformed(String),
}

impl AllowListEntry {
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            return AllowListEntry::Any;
        }
        if raw.contains(CIDR_SEPARATOR) {
            return parse_cidr(raw).unwrap_or_else(|| AllowListEntry::Malformed(raw.to_owned()));
        }
        if raw.contains(WILDCARD) {
            let octets: Vec<String> = raw.split('.').map(str::to_owned).collect();
            return match <[String; IPV4_OCTET_COUNT]>::try_from(octets) {
                Ok(octets) => AllowListEntry::Wildcard(octets),
                Err(_) => AllowListEntry::Malformed(raw.to_owned()),
            };
        }
        AllowListEntry::Exact(raw.to_owned())
    }

    pub fn matches(&self, address: &str) -> bool {
        match self {
            AllowListEntry::Any => true,
            AllowListEntry::Exact(expected) => expected == address,
            AllowListEntry::Wildcard(pattern) => {
                let octets: Vec<&str> = address.split('.').collect();
                octets.len() == IPV4_OCTET_COUNT
                    && pattern
                        .iter()
                        .zip(octets)
                        .all(|(p, o)| p == WILDCARD || p == o)
            }
            AllowListEntry::Cidr { base, prefix_len } => {
                let Some(addr) = ipv4_to_u32(address) else {
                    return false;
                };
                let mask = subnet_mask(*prefix_len);
                (addr & mask) == (base & mask)
            }
            AllowListEntry::Malformed(_) => false,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, AllowListEntry::Malformed(_))
    }
}

fn parse_cidr(raw: &str) -> Option<AllowListEntry> {
    let (base, prefix) = raw.split_once(CIDR_SEPARATOR)?;
    if prefix.contains(CIDR_SEPARATOR) {
        return None;
    }
    let prefix_len: u8 = prefix.parse().ok()?;
    if prefix_len > IPV4_BIT_LENGTH {
        return None;
    }
    Some(AllowListEntry::Cidr {
        base: ipv4_to_u32(base)?,
        prefix_len,
    })
}

/// Pack a dotted quad big-endian. Each octet must be a number in 0..=255.
pub fn ipv4_to_u32(address: &str) -> Option<u32> {
    let mut octets = 0usize;
    let mut value = 0u32;
    for part in address.split('.') {
        octets += 1;
        if octets > IPV4_OCTET_COUNT {
            return None;
        }
        let octet: u8 = part.parse().ok()?;
        value = (value << 8) | u32::from(octet);
    }
    (octets == IPV4_OCTET_COUNT).then_some(value)
}

/// Mask with the top `prefix_len` bits set.
fn subnet_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (IPV4_BIT_LENGTH - prefix_len)
    }
}

impl From<String> for AllowListEntry {
    fn from(raw: String) -> Self {
        AllowListEntry::parse(&raw)
    }
}

impl From<&str> for AllowListEntry {
    fn from(raw: &str) -> Self {
        AllowListEntry::parse(raw)
    }
}

impl From<AllowListEntry> for String {
    fn from(entry: AllowListEntry) -> Self {
        entry.to_string()
    }
}

impl fmt::Display for AllowListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowListEntry::Any => f.write_str(WILDCARD),
            AllowListEntry::Exact(raw) | AllowListEntry::Malformed(raw) => f.write_str(raw),
            AllowListEntry::Wildcard(octets) => f.write_str(&octets.join(".")),
            AllowListEntry::Cidr { base, prefix_len } => {
                write!(f, "{}/{}", Ipv4Addr::from(*base), prefix_len)
            }
        }
    }
}

/// True iff `address` matches any entry.
pub fn is_allowed(address: &str, entries: &[AllowListEntry]) -> bool {
    entries.iter().any(|entry| entry.matches(address))
}

/// Immutable set of allow-list entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    entries: Vec<AllowListEntry>,
}

impl AllowList {
    pub fn new(entries: Vec<AllowListEntry>) -> Self {
        Self { entries }
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            patterns
                .into_iter()
                .map(|p| AllowListEntry::parse(p.as_ref()))
                .collect(),
        )
    }

    /// Loopback addresses, used as the configured default.
    pub fn loopback() -> Self {
        Self::from_patterns(["127.0.0.1", "localhost", "0:0:0:0:0:0:0:1", "::1"])
    }

    /// This list followed by the entries of `other` not already present.
    pub fn merged(&self, other: &AllowList) -> Self {
        let mut entries = self.entries.clone();
        for entry in &other.entries {
            if !entries.contains(entry) {
                entries.push(entry.clone());
            }
        }
        Self { entries }
    }

    pub fn is_allowed(&self, address: &str) -> bool {
        is_allowed(address, &self.entries)
    }

    pub fn entries(&self) -> &[AllowListEntry] {
        &self.entries
    }

    pub fn malformed(&self) -> impl Iterator<Item = &AllowListEntry> {
        self.entries.iter().filter(|e| e.is_malformed())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
