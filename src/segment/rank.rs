use super::frequency::FrequencyTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct Ranking {
    pub entries: Vec<RankedEntry>,
    pub excluded: usize,
}

/// Keep keys above `threshold` (all keys when `None`), most frequent first.
/// Equal counts are ordered by key so repeated runs emit the same file.
pub fn rank(table: FrequencyTable, threshold: Option<usize>) -> Ranking {
    let mut ranking = Ranking::default();

    for (key, count) in table.counts {
        match threshold {
            Some(t) if count <= t => ranking.excluded += 1,
            _ => ranking.entries.push(RankedEntry { key, count }),
        }
    }

    ranking
        .entries
        .sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: &[(&str, usize)]) -> FrequencyTable {
        FrequencyTable {
            counts: counts.iter().map(|(k, c)| (k.to_string(), *c)).collect(),
            lines_read: 0,
        }
    }

    #[test]
    fn filters_and_sorts() {
        let r = rank(table(&[("a", 5), ("b", 100), ("c", 6), ("d", 40)]), Some(5));
        let keys: Vec<_> = r.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "d", "c"]);
        assert_eq!(r.excluded, 1);
    }

    #[test]
    fn retained_plus_excluded_is_distinct() {
        let t = table(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 50)]);
        let distinct = t.distinct();
        let r = rank(t, Some(2));
        assert_eq!(r.entries.len() + r.excluded, distinct);
        assert!(r.entries.iter().all(|e| e.count > 2));
        assert!(r.entries.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn ties_ordered_by_key() {
        let r = rank(table(&[("zeta", 3), ("alpha", 3), ("mid", 3), ("top", 9)]), Some(0));
        let keys: Vec<_> = r.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["top", "alpha", "mid", "zeta"]);
    }

    #[test]
    fn no_threshold_keeps_everything() {
        let r = rank(table(&[("a", 1), ("b", 1)]), None);
        assert_eq!(r.entries.len(), 2);
        assert_eq!(r.excluded, 0);
    }

    #[test]
    fn empty_table() {
        let r = rank(table(&[]), Some(0));
        assert!(r.entries.is_empty());
        assert_eq!(r.excluded, 0);
    }
}
