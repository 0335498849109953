use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub stratified: bool,
}

/// Splits `labels.len()` rows into train and test partitions.
///
/// The test partition gets `ceil(test_fraction * n)` rows. The split is
/// stratified by label when every class has at least two rows and both
/// partitions have room for one row per class; otherwise rows are shuffled
/// without regard to label. Returns `None` when fewer than two rows exist.
pub fn train_test_split(labels: &[String], test_fraction: f64, seed: u64) -> Option<Split> {
    let n = labels.len();
    if n < 2 {
        return None;
    }
    let n_test = ((test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);
    let n_train = n - n_test;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(label.as_str()).or_default().push(i);
    }

    let can_stratify = by_class.values().all(|rows| rows.len() >= 2)
        && n_test >= by_class.len()
        && n_train >= by_class.len();

    let (mut train, mut test) = if can_stratify {
        stratified(by_class, n, n_test, &mut rng)
    } else {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        (train, indices)
    };

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Some(Split {
        train,
        test,
        stratified: can_stratify,
    })
}

fn stratified(
    by_class: BTreeMap<&str, Vec<usize>>,
    n: usize,
    n_test: usize,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    // Proportional allocation: floor first, then hand out the remainder by
    // largest fractional part (class order breaks ties).
    let mut allocation: Vec<(usize, f64)> = by_class
        .values()
        .map(|rows| {
            let ideal = rows.len() as f64 * n_test as f64 / n as f64;
            let floor = (ideal.floor() as usize).min(rows.len() - 1);
            (floor, ideal - floor as f64)
        })
        .collect();

    let mut remaining = n_test - allocation.iter().map(|(k, _)| k).sum::<usize>();
    let mut order: Vec<usize> = (0..allocation.len()).collect();
    order.sort_by(|&a, &b| allocation[b].1.total_cmp(&allocation[a].1));
    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    while remaining > 0 {
        let mut progressed = false;
        for &class in &order {
            if remaining == 0 {
                break;
            }
            if allocation[class].0 < sizes[class] - 1 {
                allocation[class].0 += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (mut rows, (k, _)) in by_class.into_values().zip(allocation) {
        rows.shuffle(rng);
        let rest = rows.split_off(k);
        test.extend(rows);
        train.extend(rest);
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[(&str, usize)]) -> Vec<String> {
        counts.iter()
            .flat_map(|(name, count)| std::iter::repeat(name.to_string()).take(*count))
            .collect()
    }

    fn count(labels: &[String], rows: &[usize], name: &str) -> usize {
        rows.iter().filter(|&&i| labels[i] == name).count()
    }

    #[test]
    fn test_sizes_follow_ceil_of_fraction() {
        let y = labels(&[("A", 6), ("B", 5)]);
        let split = train_test_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_partitions_cover_every_row_once() {
        let y = labels(&[("A", 7), ("B", 9), ("C", 4)]);
        let split = train_test_split(&y, 0.2, 42).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_keeps_class_proportions() {
        let y = labels(&[("A", 50), ("B", 30), ("C", 20)]);
        let split = train_test_split(&y, 0.2, 42).unwrap();
        assert!(split.stratified);
        assert_eq!(count(&y, &split.test, "A"), 10);
        assert_eq!(count(&y, &split.test, "B"), 6);
        assert_eq!(count(&y, &split.test, "C"), 4);
    }

    #[test]
    fn test_singleton_class_falls_back_to_plain_split() {
        let y = labels(&[("A", 10), ("B", 9), ("C", 1)]);
        let split = train_test_split(&y, 0.2, 42).unwrap();
        assert!(!split.stratified);
        assert_eq!(split.test.len(), 4);
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels(&[("A", 12), ("B", 8)]);
        assert_eq!(train_test_split(&y, 0.2, 42), train_test_split(&y, 0.2, 42));
    }

    #[test]
    fn test_too_few_rows() {
        assert!(train_test_split(&labels(&[("A", 1)]), 0.2, 42).is_none());
        assert!(train_test_split(&[], 0.2, 42).is_none());
        let split = train_test_split(&labels(&[("A", 2)]), 0.2, 42).unwrap();
        assert_eq!((split.train.len(), split.test.len()), (1, 1));
    }
}
