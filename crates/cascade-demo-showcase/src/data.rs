#![forbid(unsafe_code)]

//! Deterministic alert feed and the option tree used to filter it.
//!
//! Every alert is derived from its index through a fixed hash, so runs and
//! tests always see the same feed. No system time or external randomness is
//! used.

use cascade::{FilterRecord, Key, OptionNode, OptionTree};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SEVERITIES: [(&str, &str); 4] = [
    ("critical", "Critical"),
    ("error", "Error"),
    ("warning", "Warning"),
    ("info", "Info"),
];

pub const STATUSES: [(&str, &str); 4] = [
    ("active", "Active"),
    ("pending", "Pending"),
    ("acknowledged", "Acknowledged"),
    ("resolved", "Resolved"),
];

pub const POOL_COUNT: i64 = 6;

/// Pools that are drained and cannot be picked.
const DRAINED_POOLS: [i64; 1] = [5];

const MESSAGES: [&str; 6] = [
    "disk usage above threshold",
    "replica lag exceeded",
    "certificate expires soon",
    "health check flapping",
    "queue depth rising",
    "node unreachable",
];

// ---------------------------------------------------------------------------
// Deterministic pseudo-random
// ---------------------------------------------------------------------------

/// splitmix64-style scramble of `seed`.
fn det_hash(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Deterministic index in `0..len` for `seed` and a per-field `salt`.
fn det_pick(seed: u64, salt: u64, len: usize) -> usize {
    (det_hash(seed ^ salt.rotate_left(17)) % len as u64) as usize
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A simulated alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: u64,
    pub severity: Key,
    pub status: Key,
    pub pool: Key,
    pub message: String,
}

impl FilterRecord for Alert {
    fn field(&self, category: &Key) -> Option<&Key> {
        match category.as_str()? {
            "severity" => Some(&self.severity),
            "status" => Some(&self.status),
            "pool" => Some(&self.pool),
            _ => None,
        }
    }
}

/// `count` alerts derived from `seed`.
pub fn alert_feed(seed: u64, count: usize) -> Vec<Alert> {
    (0..count as u64)
        .map(|i| {
            let s = seed.wrapping_add(i);
            Alert {
                id: i + 1,
                severity: Key::from(SEVERITIES[det_pick(s, 1, SEVERITIES.len())].0),
                status: Key::from(STATUSES[det_pick(s, 2, STATUSES.len())].0),
                pool: Key::Int(det_pick(s, 3, POOL_COUNT as usize) as i64 + 1),
                message: MESSAGES[det_pick(s, 4, MESSAGES.len())].to_owned(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Option tree
// ---------------------------------------------------------------------------

/// Severity / status / pool selector over the alert feed.
pub fn alert_tree() -> OptionTree {
    let severity = OptionNode::new("severity", "Severity").with_children(
        SEVERITIES
            .iter()
            .map(|(value, label)| OptionNode::new(*value, *label))
            .collect(),
    );
    let status = OptionNode::new("status", "Status").with_children(
        STATUSES
            .iter()
            .map(|(value, label)| OptionNode::new(*value, *label))
            .collect(),
    );
    let pools = OptionNode::new("pool", "Pool").with_children(
        (1..=POOL_COUNT)
            .map(|n| {
                OptionNode::new(n, format!("Pool {n}")).with_disabled(DRAINED_POOLS.contains(&n))
            })
            .collect(),
    );
    OptionTree::new(vec![severity, status, pools])
}
