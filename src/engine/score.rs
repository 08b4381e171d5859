use serde::Serialize;

use super::{
    category::{categorize, Category},
    interval::{sanitize, TimeInterval},
};

pub const XP_PER_LEVEL: u64 = 100;

/// XP per minute multiplied by 10, so that weighting stays in integers.
fn weight_tenths(category: Category) -> u64 {
    match category {
        Category::Code => 30,
        Category::Productivity => 20,
        Category::Meetings => 15,
        Category::Explore => 10,
        Category::Other => 1,
    }
}

/// Weighted minutes of all given intervals, rounded down. The caller decides which intervals
/// count, nothing is filtered by time here.
pub fn compute_xp<'a>(intervals: impl IntoIterator<Item = &'a TimeInterval>) -> u64 {
    let weighted_tenth_seconds: u128 = sanitize(intervals)
        .map(|v| v.duration() as u128 * weight_tenths(categorize(&v.app_name)) as u128)
        .sum();
    (weighted_tenth_seconds / 600) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub xp: u64,
    pub level: u64,
    pub progress: u64,
}

impl Score {
    pub fn from_xp(xp: u64) -> Self {
        Self {
            xp,
            level: xp / XP_PER_LEVEL,
            progress: xp % XP_PER_LEVEL,
        }
    }

    pub fn from_intervals<'a>(intervals: impl IntoIterator<Item = &'a TimeInterval>) -> Self {
        Self::from_xp(compute_xp(intervals))
    }
}
