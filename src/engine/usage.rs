use std::{collections::HashMap, hash::Hash, sync::Arc};

use serde::Serialize;

use super::{
    category::{categorize, Category},
    interval::{sanitize, DayWindow, TimeInterval},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUsage {
    pub name: Arc<str>,
    pub total_duration_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub total_duration_seconds: i64,
}

/// Total time per app for intervals starting inside `window`. Longest first, ties by name.
pub fn aggregate_by_app<'a>(
    intervals: impl IntoIterator<Item = &'a TimeInterval>,
    window: DayWindow,
) -> Vec<AppUsage> {
    let totals = sum_by(intervals, window, |v| v.app_name.clone());
    let mut usages = totals
        .into_iter()
        .map(|(name, total_duration_seconds)| AppUsage {
            name,
            total_duration_seconds,
        })
        .collect::<Vec<_>>();
    usages.sort_by(|a, b| {
        b.total_duration_seconds
            .cmp(&a.total_duration_seconds)
            .then_with(|| a.name.cmp(&b.name))
    });
    usages
}

/// Total time per [Category] for intervals starting inside `window`. Longest first, ties by
/// category name.
pub fn aggregate_by_category<'a>(
    intervals: impl IntoIterator<Item = &'a TimeInterval>,
    window: DayWindow,
) -> Vec<CategoryUsage> {
    let totals = sum_by(intervals, window, |v| categorize(&v.app_name));
    let mut usages = totals
        .into_iter()
        .map(|(category, total_duration_seconds)| CategoryUsage {
            category,
            total_duration_seconds,
        })
        .collect::<Vec<_>>();
    usages.sort_by(|a, b| {
        b.total_duration_seconds
            .cmp(&a.total_duration_seconds)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    usages
}

/// An interval counts fully towards its key even if it ends after the window.
fn sum_by<'a, K: Eq + Hash>(
    intervals: impl IntoIterator<Item = &'a TimeInterval>,
    window: DayWindow,
    mut key: impl FnMut(&TimeInterval) -> K,
) -> HashMap<K, i64> {
    let mut map = HashMap::<K, i64>::new();
    for v in window.filter(sanitize(intervals)) {
        *map.entry(key(v)).or_default() += v.duration();
    }
    map
}

#[cfg(test)]
mod tests {
    use crate::engine::{
        category::Category,
        interval::{DayWindow, TimeInterval},
    };

    use super::{aggregate_by_app, aggregate_by_category};

    const WINDOW: DayWindow = DayWindow {
        start: 0,
        end: 86400,
    };

    #[test]
    fn test_aggregate_same_app() {
        let values = vec![
            TimeInterval::new("appA", 0, 60),
            TimeInterval::new("appA", 120, 180),
        ];
        let usage = aggregate_by_app(&values, WINDOW);
        assert_eq!(usage.len(), 1);
        assert_eq!(&*usage[0].name, "appA");
        assert_eq!(usage[0].total_duration_seconds, 120);
    }

    #[test]
    fn test_aggregate_sorting() {
        let values = vec![
            TimeInterval::new("b", 0, 100),
            TimeInterval::new("a", 100, 200),
            TimeInterval::new("long", 200, 1000),
            TimeInterval::new("short", 1000, 1001),
        ];
        let names = aggregate_by_app(&values, WINDOW)
            .into_iter()
            .map(|v| v.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["long", "a", "b", "short"]);
    }

    #[test]
    fn test_aggregate_window_does_not_split() {
        let values = vec![
            TimeInterval::new("late", 86000, 90000),
            TimeInterval::new("tomorrow", 86400, 86500),
            TimeInterval::new("yesterday", -100, 50),
        ];
        let usage = aggregate_by_app(&values, WINDOW);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].total_duration_seconds, 4000);
    }

    #[test]
    fn test_aggregate_empty_and_malformed() {
        assert!(aggregate_by_app(std::iter::empty(), WINDOW).is_empty());
        assert!(aggregate_by_category(std::iter::empty(), WINDOW).is_empty());
        let values = vec![TimeInterval::new("broken", 100, 0)];
        assert!(aggregate_by_app(&values, WINDOW).is_empty());
    }

    #[test]
    fn test_aggregate_by_category() {
        let values = vec![
            TimeInterval::new("Visual Studio Code", 0, 600),
            TimeInterval::new("nvim", 600, 900),
            TimeInterval::new("zoom.us", 900, 1800),
            TimeInterval::new("unknownapp", 1800, 1900),
            TimeInterval::new("Firefox", 1900, 2000),
        ];
        let usage = aggregate_by_category(&values, WINDOW);
        let pairs = usage
            .iter()
            .map(|v| (v.category, v.total_duration_seconds))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                (Category::Code, 900),
                (Category::Meetings, 900),
                (Category::Explore, 100),
                (Category::Other, 100),
            ]
        );
    }

    #[test]
    fn test_category_total_matches_app_total() {
        let values = (0..50)
            .map(|i| {
                let name = ["code", "zoom", "chrome", "notion", "game"][i % 5];
                TimeInterval::new(name, i as i64 * 100, i as i64 * 100 + (i as i64 % 13) * 7)
            })
            .collect::<Vec<_>>();
        let apps: i64 = aggregate_by_app(&values, WINDOW)
            .iter()
            .map(|v| v.total_duration_seconds)
            .sum();
        let categories: i64 = aggregate_by_category(&values, WINDOW)
            .iter()
            .map(|v| v.total_duration_seconds)
            .sum();
        let raw: i64 = values.iter().map(|v| v.end_time - v.start_time).sum();
        assert_eq!(apps, raw);
        assert_eq!(categories, raw);
    }

    #[test]
    fn test_aggregate_is_input_order_independent() {
        // "a" and "b" tie, as do Explore and Meetings.
        let values = vec![
            TimeInterval::new("b", 0, 100),
            TimeInterval::new("zoom.us", 100, 400),
            TimeInterval::new("a", 400, 450),
            TimeInterval::new("code", 450, 1000),
            TimeInterval::new("a", 1000, 1050),
            TimeInterval::new("firefox", 1050, 1350),
            TimeInterval::new("broken", 2000, 1500),
        ];
        let mut reversed = values.clone();
        reversed.reverse();
        let mut rotated = values.clone();
        rotated.rotate_left(3);

        let apps = aggregate_by_app(&values, WINDOW);
        let categories = aggregate_by_category(&values, WINDOW);
        for other in [&reversed, &rotated] {
            assert_eq!(aggregate_by_app(other, WINDOW), apps);
            assert_eq!(aggregate_by_category(other, WINDOW), categories);
        }

        let names = apps.iter().map(|v| &*v.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["code", "firefox", "zoom.us", "a", "b"]);
        assert_eq!(categories[1].category, Category::Explore);
        assert_eq!(categories[2].category, Category::Meetings);
    }
}
