//! Joint identifiers.
//!
//! A [`JointKey`] carries the joint name together with a 32-bit key derived
//! from it. Skeletons index their joints by key so that lookups avoid string
//! comparisons except to confirm a hit.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::constants::FALLBACK_JOINT_NAME;

/// Name of a skeletal joint plus its hashed lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct JointKey {
    name: String,
    key: u32,
}

impl JointKey {
    /// Build a key for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = Self::hash_name(&name);
        Self { name, key }
    }

    /// Key for the joint that invalid references are redirected to.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_JOINT_NAME)
    }

    /// Hash used for the numeric key (low 32 bits of xxh3).
    #[inline]
    pub fn hash_name(name: &str) -> u32 {
        xxh3_64(name.as_bytes()) as u32
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> u32 {
        self.key
    }

    pub fn is_fallback(&self) -> bool {
        self.name == FALLBACK_JOINT_NAME
    }
}

impl From<String> for JointKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for JointKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<JointKey> for String {
    fn from(joint: JointKey) -> Self {
        joint.name
    }
}

impl fmt::Display for JointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
