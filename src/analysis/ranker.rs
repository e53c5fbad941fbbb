//! Leaderboard ordering and rank assignment.
//!
//! Found entries come first, highest score first; entries the scoring
//! service could not resolve follow in their original order. Ranks are
//! ordinal: tied scores get consecutive ranks in input order.

use crate::models::{NamedRecord, Rank, RankedEntry};
use std::cmp::Ordering;

/// Order two entries for the leaderboard.
///
/// Equal scores and pairs of not-found entries compare equal, so a stable
/// sort keeps their input order.
pub fn leaderboard_order(a: &NamedRecord, b: &NamedRecord) -> Ordering {
    match (a.record.valid_score(), b.record.valid_score()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort entries and assign ranks.
pub fn rank(mut entries: Vec<NamedRecord>) -> Vec<RankedEntry> {
    entries.sort_by(leaderboard_order);

    let mut position = 0;
    entries
        .into_iter()
        .map(|entry| {
            let rank = if entry.record.valid_score().is_some() {
                position += 1;
                Rank::Position(position)
            } else {
                Rank::Unranked
            };
            RankedEntry {
                record: entry.record,
                name: entry.name,
                rank,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreRecord;

    fn named(record: ScoreRecord) -> NamedRecord {
        let name = record.handle.to_uppercase();
        NamedRecord { record, name }
    }

    fn handles(entries: &[RankedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.record.handle.as_str()).collect()
    }

    #[test]
    fn test_ties_get_consecutive_ranks() {
        let ranked = rank(vec![
            named(ScoreRecord::found("first", 100.0)),
            named(ScoreRecord::found("second", 100.0)),
            named(ScoreRecord::found("third", 80.0)),
        ]);

        assert_eq!(handles(&ranked), vec!["first", "second", "third"]);
        let ranks: Vec<_> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(
            ranks,
            vec![Rank::Position(1), Rank::Position(2), Rank::Position(3)]
        );
    }

    #[test]
    fn test_signed_zeros_tie() {
        let ranked = rank(vec![
            named(ScoreRecord::found("negative", -0.0)),
            named(ScoreRecord::found("positive", 0.0)),
        ]);

        assert_eq!(handles(&ranked), vec!["negative", "positive"]);
        assert_eq!(ranked[0].rank, Rank::Position(1));
    }

    #[test]
    fn test_not_found_sorts_last() {
        let ranked = rank(vec![
            named(ScoreRecord::found("a", 90.0)),
            named(ScoreRecord::not_found("b")),
            named(ScoreRecord::found("c", 70.0)),
        ]);

        assert_eq!(handles(&ranked), vec!["a", "c", "b"]);
        assert_eq!(ranked[0].rank, Rank::Position(1));
        assert_eq!(ranked[1].rank, Rank::Position(2));
        assert_eq!(ranked[2].rank, Rank::Unranked);
    }

    #[test]
    fn test_not_found_keep_input_order() {
        let ranked = rank(vec![
            named(ScoreRecord::not_found("z")),
            named(ScoreRecord::found("m", 5.0)),
            named(ScoreRecord::not_found("a")),
            named(ScoreRecord::not_found("k")),
        ]);

        assert_eq!(handles(&ranked), vec!["m", "z", "a", "k"]);
        assert!(ranked[1..].iter().all(|e| e.rank == Rank::Unranked));
    }

    #[test]
    fn test_ranks_are_dense_permutation() {
        let scores = [12.0, 99.5, 12.0, 40.0, 7.0, 99.5, 63.0];
        let mut input: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| named(ScoreRecord::found(format!("u{}", i), *s)))
            .collect();
        input.insert(3, named(ScoreRecord::not_found("gone")));

        let ranked = rank(input);
        assert_eq!(ranked.len(), scores.len() + 1);

        let positions: Vec<usize> = ranked.iter().filter_map(|e| e.rank.position()).collect();
        assert_eq!(positions, (1..=scores.len()).collect::<Vec<_>>());

        let sorted_scores: Vec<f64> = ranked.iter().filter_map(|e| e.record.score).collect();
        assert!(sorted_scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(ranked.last().map(|e| e.rank), Some(Rank::Unranked));
    }

    #[test]
    fn test_names_survive_ranking() {
        let ranked = rank(vec![named(ScoreRecord::found("x", 1.0))]);
        assert_eq!(ranked[0].name, "X");
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }
}
