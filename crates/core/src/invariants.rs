//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible match states during
//! development. These checks are compiled out in release builds.

use crate::models::{Match, TeamId, STARTING_SCORE};

/// Validate that a match is internally consistent
pub fn assert_match_invariants(game: &Match) {
    for (index, team) in game.teams.iter().enumerate() {
        debug_assert!(
            team.id.index() == index,
            "Team {} stored at position {}",
            team.id,
            index
        );

        debug_assert!(
            team.score <= STARTING_SCORE,
            "Team {} has score {} above {}",
            team.id,
            team.score,
            STARTING_SCORE
        );

        // Zero score and winner are the same fact
        debug_assert!(
            (team.score == 0) == (game.winner_id == Some(team.id)),
            "Team {} has score {} but winner is {:?}",
            team.id,
            team.score,
            game.winner_id
        );
    }

    assert_throw_log_invariants(game);
}

/// Validate the throw log against the team scores
pub fn assert_throw_log_invariants(game: &Match) {
    for throw in &game.throws {
        debug_assert!(
            (1..=3).contains(&throw.darts_used),
            "Throw by team {} used {} darts",
            throw.team_id,
            throw.darts_used
        );
    }

    for id in TeamId::ALL {
        let thrown: u32 = game
            .throws
            .iter()
            .filter(|t| t.team_id == id)
            .map(|t| t.points)
            .sum();
        debug_assert!(
            thrown + game.team(id).score == STARTING_SCORE,
            "Team {} threw {} points but has {} remaining",
            id,
            thrown,
            game.team(id).score
        );
    }

    // Only the last throw can finish a match
    let finishes = game.throws.iter().filter(|t| t.is_finish()).count();
    debug_assert!(
        finishes <= 1 && game.throws.iter().rev().skip(1).all(|t| !t.is_finish()),
        "Throw log has a finish before its last entry"
    );
}
