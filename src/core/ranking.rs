//! Top-N / "other" split of stakeholders by holdings

use crate::types::StakeholderRecord;

/// Stakeholders in rank order, split at the template's top-investor count
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<'a> {
    pub top: Vec<&'a StakeholderRecord>,
    pub other: Vec<&'a StakeholderRecord>,
}

impl Ranking<'_> {
    pub fn total(&self) -> usize {
        self.top.len() + self.other.len()
    }
}

/// Sort by `total_shares` descending and split after `top_n`
///
/// The sort is stable: holders with equal totals keep their export row order.
pub fn rank_stakeholders(stakeholders: &[StakeholderRecord], top_n: usize) -> Ranking<'_> {
    let mut ranked: Vec<&StakeholderRecord> = stakeholders.iter().collect();
    ranked.sort_by(|a, b| b.total_shares.total_cmp(&a.total_shares));

    let other = if ranked.len() > top_n {
        ranked.split_off(top_n)
    } else {
        Vec::new()
    };

    Ranking { top: ranked, other }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(name: &str, row: u32, shares: f64) -> StakeholderRecord {
        StakeholderRecord {
            name: name.to_string(),
            source_row_index: row,
            holdings_by_class: Vec::new(),
            total_shares: shares,
            total_options: 0.0,
        }
    }

    #[test]
    fn test_descending_order() {
        let holders = vec![holder("a", 5, 10.0), holder("b", 6, 30.0), holder("c", 7, 20.0)];
        let ranking = rank_stakeholders(&holders, 9);
        let names: Vec<&str> = ranking.top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert!(ranking.other.is_empty());
    }

    #[test]
    fn test_ties_keep_row_order() {
        let holders = vec![
            holder("first", 5, 10.0),
            holder("big", 6, 50.0),
            holder("second", 7, 10.0),
            holder("third", 8, 10.0),
        ];
        let ranking = rank_stakeholders(&holders, 2);
        let top: Vec<&str> = ranking.top.iter().map(|s| s.name.as_str()).collect();
        let other: Vec<&str> = ranking.other.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(top, vec!["big", "first"]);
        assert_eq!(other, vec!["second", "third"]);
    }

    #[test]
    fn test_split_counts() {
        let holders: Vec<StakeholderRecord> = (0..16)
            .map(|i| holder(&format!("h{i}"), 5 + i, (100 - i) as f64))
            .collect();
        let ranking = rank_stakeholders(&holders, 9);
        assert_eq!(ranking.top.len(), 9);
        assert_eq!(ranking.other.len(), 7);
        assert_eq!(ranking.total(), 16);
    }

    #[test]
    fn test_exactly_top_n_has_no_other() {
        let holders: Vec<StakeholderRecord> =
            (0..9).map(|i| holder(&format!("h{i}"), i, 1.0)).collect();
        let ranking = rank_stakeholders(&holders, 9);
        assert_eq!(ranking.top.len(), 9);
        assert!(ranking.other.is_empty());
    }
}
