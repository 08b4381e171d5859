//! Horizontal placement of intervals on the timeline.
//!
//! Intervals are sorted and swept by start time. Each interval takes the first column not used by
//! an overlapping interval that was already placed. Overlapping intervals are joined into clusters
//! and every member of a cluster reports the same column count, so a wide group later in the day
//! also narrows the earlier intervals chained to it.

use std::cmp::Ordering;

use tracing::{instrument, trace};

use super::interval::{sanitize, LayoutInterval, TimeInterval};

pub const DEFAULT_MARGIN_PCT: f64 = 1.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal gap subtracted from every entry width, in percent of the timeline width.
    pub margin_pct: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_pct: DEFAULT_MARGIN_PCT,
        }
    }
}

impl LayoutConfig {
    fn width_pct(&self, max_columns: usize) -> f64 {
        let slot = 100. / max_columns as f64;
        if slot > self.margin_pct {
            slot - self.margin_pct
        } else {
            slot
        }
    }

    fn left_pct(&self, column: usize, max_columns: usize) -> f64 {
        column as f64 * 100. / max_columns as f64
    }
}

/// Assigns every interval a column so that overlapping intervals never share one. The result is
/// ordered by start time, then end time, then app name, regardless of input order.
#[instrument(skip_all)]
pub fn layout_intervals<'a>(
    intervals: impl IntoIterator<Item = &'a TimeInterval>,
    config: &LayoutConfig,
) -> Vec<LayoutInterval> {
    let mut sorted = sanitize(intervals).cloned().collect::<Vec<_>>();
    sorted.sort_by(layout_order);

    let mut columns = Vec::with_capacity(sorted.len());
    let mut clusters = Clusters::new(sorted.len());
    // Placed intervals that still end after the current start. Sorting guarantees that anything
    // dropped from here can't overlap a later interval.
    let mut active: Vec<usize> = vec![];

    for (index, interval) in sorted.iter().enumerate() {
        active.retain(|&placed| sorted[placed].end_time > interval.start_time);

        let mut taken = vec![];
        for &placed in &active {
            if sorted[placed].overlaps(interval) {
                taken.push(columns[placed]);
                clusters.union(placed, index);
            }
        }

        columns.push(first_free_column(taken));
        active.push(index);
    }

    let mut widest = vec![1usize; sorted.len()];
    for (index, column) in columns.iter().enumerate() {
        let root = clusters.find(index);
        widest[root] = widest[root].max(column + 1);
    }

    sorted
        .into_iter()
        .zip(columns)
        .enumerate()
        .map(|(index, (interval, column))| {
            let max_columns = widest[clusters.find(index)];
            trace!(
                "Placed {} at column {column} of {max_columns}",
                interval.app_name
            );
            LayoutInterval {
                interval,
                column,
                max_columns,
                width_pct: config.width_pct(max_columns),
                left_pct: config.left_pct(column, max_columns),
            }
        })
        .collect()
}

fn layout_order(a: &TimeInterval, b: &TimeInterval) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then(a.end_time.cmp(&b.end_time))
        .then_with(|| a.app_name.cmp(&b.app_name))
}

fn first_free_column(mut taken: Vec<usize>) -> usize {
    taken.sort_unstable();
    taken.dedup();
    taken
        .iter()
        .enumerate()
        .find(|(expected, column)| *expected != **column)
        .map_or(taken.len(), |(expected, _)| expected)
}

/// Union-find over interval indices.
struct Clusters {
    parents: Vec<usize>,
    sizes: Vec<usize>,
}

impl Clusters {
    fn new(len: usize) -> Self {
        Self {
            parents: (0..len).collect(),
            sizes: vec![1; len],
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parents[index] != index {
            self.parents[index] = self.parents[self.parents[index]];
            index = self.parents[index];
        }
        index
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        let (large, small) = if self.sizes[a] >= self.sizes[b] {
            (a, b)
        } else {
            (b, a)
        };
        self.parents[small] = large;
        self.sizes[large] += self.sizes[small];
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use crate::engine::interval::{LayoutInterval, TimeInterval};

    use super::{first_free_column, layout_intervals, LayoutConfig};

    const NO_MARGIN: LayoutConfig = LayoutConfig { margin_pct: 0. };

    fn find<'a>(layout: &'a [LayoutInterval], name: &str) -> &'a LayoutInterval {
        layout
            .iter()
            .find(|v| &*v.interval.app_name == name)
            .unwrap()
    }

    #[test]
    fn test_first_free_column() {
        assert_eq!(first_free_column(vec![]), 0);
        assert_eq!(first_free_column(vec![1, 2]), 0);
        assert_eq!(first_free_column(vec![0, 2, 0]), 1);
        assert_eq!(first_free_column(vec![2, 1, 0]), 3);
    }

    #[test]
    fn test_layout_empty() {
        assert!(layout_intervals(std::iter::empty(), &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_layout_two_overlapping() {
        let values = vec![
            TimeInterval::new("chrome", 0, 1800),
            TimeInterval::new("vscode", 900, 2700),
        ];
        let layout = layout_intervals(&values, &NO_MARGIN);

        let chrome = find(&layout, "chrome");
        let vscode = find(&layout, "vscode");
        assert_ne!(chrome.column, vscode.column);
        assert_eq!(chrome.max_columns, 2);
        assert_eq!(vscode.max_columns, 2);
        assert_eq!(chrome.left_pct, 0.);
        assert_eq!(vscode.left_pct, 50.);
        assert_eq!(chrome.width_pct, 50.);

        let with_margin = layout_intervals(&values, &LayoutConfig::default());
        assert_eq!(with_margin[0].width_pct, 49.);
    }

    #[test]
    fn test_layout_disjoint() {
        let values = vec![
            TimeInterval::new("x", 200, 300),
            TimeInterval::new("x", 0, 100),
        ];
        let layout = layout_intervals(&values, &LayoutConfig::default());
        for entry in &layout {
            assert_eq!(entry.column, 0);
            assert_eq!(entry.max_columns, 1);
            assert_eq!(entry.width_pct, 99.);
            assert_eq!(entry.left_pct, 0.);
        }
        assert_eq!(layout[0].interval.start_time, 0);
    }

    #[test]
    fn test_layout_identical_ranges() {
        let values = (0..5)
            .map(|i| TimeInterval::new(format!("app {i}"), 10, 20))
            .collect::<Vec<_>>();
        let layout = layout_intervals(&values, &NO_MARGIN);
        let mut columns = layout.iter().map(|v| v.column).collect::<Vec<_>>();
        columns.sort();
        assert_eq!(columns, vec![0, 1, 2, 3, 4]);
        assert!(layout.iter().all(|v| v.max_columns == 5));
        assert!(layout.iter().all(|v| v.width_pct == 20.));
    }

    #[test]
    fn test_layout_touching_share_column() {
        let values = vec![
            TimeInterval::new("a", 0, 100),
            TimeInterval::new("b", 100, 200),
            TimeInterval::new("c", 150, 150),
        ];
        let layout = layout_intervals(&values, &NO_MARGIN);
        assert!(layout.iter().all(|v| v.column == 0 && v.max_columns == 1));
    }

    #[test]
    fn test_layout_propagates_through_chain() {
        // "a" only touches "b", but "b" is part of a group that needs four columns.
        let values = vec![
            TimeInterval::new("a", 0, 10),
            TimeInterval::new("b", 5, 20),
            TimeInterval::new("c", 15, 40),
            TimeInterval::new("d", 15, 40),
            TimeInterval::new("e", 15, 40),
            TimeInterval::new("later", 40, 50),
        ];
        let layout = layout_intervals(&values, &NO_MARGIN);

        assert_eq!(find(&layout, "a").column, 0);
        assert_eq!(find(&layout, "b").column, 1);
        assert_eq!(find(&layout, "c").column, 0);
        assert_eq!(find(&layout, "d").column, 2);
        assert_eq!(find(&layout, "e").column, 3);
        for name in ["a", "b", "c", "d", "e"] {
            assert_eq!(find(&layout, name).max_columns, 4, "{name}");
        }
        assert_eq!(find(&layout, "later").max_columns, 1);
        assert_eq!(find(&layout, "a").width_pct, 25.);
    }

    #[test]
    fn test_layout_skips_malformed() {
        let values = vec![
            TimeInterval::new("good", 0, 100),
            TimeInterval::new("bad", 50, 10),
        ];
        let layout = layout_intervals(&values, &NO_MARGIN);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].max_columns, 1);
    }

    #[test]
    fn test_layout_margin_never_makes_width_negative() {
        let values = (0..200)
            .map(|i| TimeInterval::new(format!("app {i}"), 0, 10))
            .collect::<Vec<_>>();
        let layout = layout_intervals(&values, &LayoutConfig::default());
        assert!(layout.iter().all(|v| v.width_pct > 0.));
    }

    /// Small deterministic generator, enough to produce messy days.
    fn generated_day(seed: u64, count: usize) -> Vec<TimeInterval> {
        let mut state = seed;
        let mut next = move |limit: u64| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % limit
        };
        (0..count)
            .map(|i| {
                let start = next(86400) as i64;
                let length = next(3600) as i64;
                TimeInterval::new(format!("app {}", i % 7), start, start + length)
            })
            .collect()
    }

    fn components(layout: &[LayoutInterval]) -> Vec<usize> {
        let mut component = vec![usize::MAX; layout.len()];
        let mut next_id = 0;
        for root in 0..layout.len() {
            if component[root] != usize::MAX {
                continue;
            }
            let mut queue = VecDeque::from([root]);
            component[root] = next_id;
            while let Some(current) = queue.pop_front() {
                for other in 0..layout.len() {
                    if component[other] == usize::MAX
                        && layout[current].interval.overlaps(&layout[other].interval)
                    {
                        component[other] = next_id;
                        queue.push_back(other);
                    }
                }
            }
            next_id += 1;
        }
        component
    }

    #[test]
    fn test_layout_properties_on_generated_days() {
        for seed in 0..20 {
            let values = generated_day(seed, 150);
            let layout = layout_intervals(&values, &LayoutConfig::default());
            assert_eq!(layout.len(), values.len());

            let component = components(&layout);
            for (i, a) in layout.iter().enumerate() {
                assert!(a.column < a.max_columns);
                for (j, b) in layout.iter().enumerate().skip(i + 1) {
                    if a.interval.overlaps(&b.interval) {
                        assert_ne!(a.column, b.column, "seed {seed}: {a:?} {b:?}");
                    }
                    if component[i] == component[j] {
                        assert_eq!(a.max_columns, b.max_columns, "seed {seed}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_layout_is_input_order_independent() {
        let values = generated_day(42, 100);
        let mut reversed = values.clone();
        reversed.reverse();
        let mut rotated = values.clone();
        rotated.rotate_left(37);

        let expected = layout_intervals(&values, &LayoutConfig::default());
        assert_eq!(layout_intervals(&reversed, &LayoutConfig::default()), expected);
        assert_eq!(layout_intervals(&rotated, &LayoutConfig::default()), expected);
    }
}
