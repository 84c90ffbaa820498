//! Deterministic standings computation.

use serde::Serialize;

/// Accumulated totals for one candidate on one poll day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub candidate_id: String,
    pub votes: i32,
    pub score: i32,
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub candidate_id: String,
    pub rank: i32,
    pub votes: i32,
    pub score: i32,
}

/// Order tallies into standings.
///
/// Score decides first, votes break score ties, and the candidate ID breaks
/// full ties so the ordering is total and reproducible across runs.
#[must_use]
pub fn rank(mut tallies: Vec<Tally>) -> Vec<Standing> {
    tallies.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.votes.cmp(&a.votes))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    tallies
        .into_iter()
        .enumerate()
        .map(|(i, t)| Standing {
            candidate_id: t.candidate_id,
            rank: i as i32 + 1,
            votes: t.votes,
            score: t.score,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tally(id: &str, votes: i32, score: i32) -> Tally {
        Tally {
            candidate_id: id.to_string(),
            votes,
            score,
        }
    }

    #[test]
    fn test_score_decides_order() {
        let standings = rank(vec![tally("a", 5, 10), tally("b", 3, 9), tally("c", 0, 0)]);

        assert_eq!(standings[0].candidate_id, "a");
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].candidate_id, "b");
        assert_eq!(standings[1].rank, 2);
        assert_eq!(standings[2].candidate_id, "c");
        assert_eq!(standings[2].rank, 3);
    }

    #[test]
    fn test_votes_break_score_ties() {
        let standings = rank(vec![tally("a", 2, 50), tally("b", 4, 50)]);

        assert_eq!(standings[0].candidate_id, "b");
        assert_eq!(standings[1].candidate_id, "a");
    }

    #[test]
    fn test_candidate_id_breaks_full_ties() {
        let standings = rank(vec![tally("z", 1, 50), tally("a", 1, 50), tally("m", 1, 50)]);

        let ids: Vec<&str> = standings.iter().map(|s| s.candidate_id.as_str()).collect();
        assert_eq!(ids, ["a", "m", "z"]);
    }

    #[test]
    fn test_zero_vote_candidates_keep_stable_order() {
        let standings = rank(vec![tally("c", 0, 0), tally("a", 0, 0), tally("b", 0, 0)]);

        let ids: Vec<&str> = standings.iter().map(|s| s.candidate_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(standings.last().unwrap().rank, 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(vec![]).is_empty());
    }
}
