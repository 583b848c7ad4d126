//! Request dispatch onto the match engine
//!
//! A thin adapter: decode the verb and body, run the engine operation, and
//! answer with the full match snapshot or an error object.

use oche_core::{Match, MatchError, TeamId};
use serde_json::Value;
use tracing::debug;

use crate::protocol::{Method, Request, Response};

/// Outcome of handling one request
pub struct Handled {
    pub response: Response,
    /// Whether the match changed
    pub mutated: bool,
}

/// HTTP-style status for an engine rejection
pub fn status_for(err: &MatchError) -> u16 {
    match err {
        MatchError::UnknownTeam(_) => 404,
        _ => 400,
    }
}

/// Apply one request to `game`
pub fn handle(game: &mut Match, request: &Request) -> Handled {
    let method = match request.method.parse::<Method>() {
        Ok(method) => method,
        Err(other) => {
            return Handled {
                response: Response::method_not_allowed(&other),
                mutated: false,
            }
        }
    };

    debug!(method = %method, "Handling request");

    match method {
        Method::Get => unchanged(game),
        Method::Post => record_throw(game, request.body.as_ref()),
        Method::Put => {
            game.reset::<&str>(&[]);
            changed(game)
        }
        // Undo on an empty log is not an error here; the snapshot is returned as is
        Method::Delete => match game.undo_last_throw() {
            Ok(_) => changed(game),
            Err(_) => unchanged(game),
        },
    }
}

fn record_throw(game: &mut Match, body: Option<&Value>) -> Handled {
    let fields = body.and_then(|b| {
        let team = b.get("teamId")?.as_u64()?;
        let points = b.get("points")?.as_i64()?;
        Some((team, points))
    });

    let Some((raw_team, points)) = fields else {
        return rejected(Response::error(400, "TeamId and points are required"));
    };

    let team_id = match u8::try_from(raw_team)
        .ok()
        .and_then(|id| TeamId::try_from(id).ok())
    {
        Some(id) => id,
        None => return rejected(Response::error(404, "Team not found")),
    };

    match game.record_throw(team_id, points, None) {
        Ok(()) => changed(game),
        Err(e) => rejected(Response::error(status_for(&e), e.to_string())),
    }
}

fn unchanged(game: &Match) -> Handled {
    Handled {
        response: Response::snapshot(game),
        mutated: false,
    }
}

fn changed(game: &Match) -> Handled {
    Handled {
        response: Response::snapshot(game),
        mutated: true,
    }
}

fn rejected(response: Response) -> Handled {
    Handled {
        response,
        mutated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(game: &mut Match, body: Value) -> Handled {
        handle(game, &Request::new("POST", Some(body)))
    }

    #[test]
    fn test_get_returns_snapshot() {
        let mut game = Match::default();
        let handled = handle(&mut game, &Request::new("GET", None));
        assert_eq!(handled.response.status, 200);
        assert!(!handled.mutated);
        assert_eq!(handled.response.body["teams"][0]["score"], 501);
        assert_eq!(handled.response.body["activeTeamId"], 1);
    }

    #[test]
    fn test_post_records_throw_with_three_darts() {
        let mut game = Match::default();
        let handled = post(&mut game, json!({ "teamId": 1, "points": 100 }));
        assert_eq!(handled.response.status, 200);
        assert!(handled.mutated);
        assert_eq!(game.team(TeamId::ONE).score, 401);
        assert_eq!(game.throws[0].darts_used, 3);
        assert_eq!(handled.response.body["activeTeamId"], 2);
    }

    #[test]
    fn test_post_missing_fields() {
        let mut game = Match::default();
        assert_eq!(post(&mut game, json!({ "teamId": 1 })).response.status, 400);
        assert_eq!(
            post(&mut game, json!({ "teamId": 1, "points": "60" }))
                .response
                .status,
            400
        );
        assert_eq!(
            post(&mut game, json!({ "teamId": 1, "points": 60.5 }))
                .response
                .status,
            400
        );
        assert_eq!(
            handle(&mut game, &Request::new("POST", None)).response.status,
            400
        );
        assert!(game.throws.is_empty());
    }

    #[test]
    fn test_post_unknown_team() {
        let mut game = Match::default();
        let handled = post(&mut game, json!({ "teamId": 3, "points": 60 }));
        assert_eq!(handled.response.status, 404);
        assert_eq!(handled.response.error_message(), Some("Team not found"));
    }

    #[test]
    fn test_post_engine_rejections() {
        let mut game = Match::default();
        let handled = post(&mut game, json!({ "teamId": 1, "points": 181 }));
        assert_eq!(handled.response.status, 400);
        let handled = post(&mut game, json!({ "teamId": 1, "points": -5 }));
        assert_eq!(handled.response.status, 400);
        assert!(!handled.mutated);
        assert!(game.throws.is_empty());
    }

    #[test]
    fn test_delete_undoes_and_tolerates_empty_log() {
        let mut game = Match::default();
        let handled = handle(&mut game, &Request::new("DELETE", None));
        assert_eq!(handled.response.status, 200);
        assert!(!handled.mutated);

        post(&mut game, json!({ "teamId": 1, "points": 60 }));
        let handled = handle(&mut game, &Request::new("DELETE", None));
        assert!(handled.mutated);
        assert_eq!(game.team(TeamId::ONE).score, 501);
        assert_eq!(game.active_team_id, TeamId::ONE);
    }

    #[test]
    fn test_put_resets() {
        let mut game = Match::new(&["Bulls", "Arrows"]);
        post(&mut game, json!({ "teamId": 1, "points": 60 }));
        let handled = handle(&mut game, &Request::new("PUT", None));
        assert_eq!(handled.response.status, 200);
        assert!(game.throws.is_empty());
        assert_eq!(game.team(TeamId::ONE).name, "Team 1");
    }

    #[test]
    fn test_unsupported_verb() {
        let mut game = Match::default();
        let handled = handle(&mut game, &Request::new("PATCH", None));
        assert_eq!(handled.response.status, 405);
    }
}
