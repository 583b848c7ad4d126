//! Line-oriented terminal front end for the scoreboard

use std::io::{self, BufRead, Write};

use oche_core::{parse_points, MatchError, TeamId};

use crate::viewmodel::{Scoreboard, ThrowOutcome};

const HELP: &str = "\
Commands:
  <points> [darts]   score a visit for the team at the oche (darts 1-3, default 3)
  finish             score exactly the remaining points
  undo               take back the last visit
  switch             change who throws first (before the first visit only)
  name <1|2> <name>  rename a team
  darts <1-3>        answer the finish prompt
  skip               skip the finish prompt (counts 3 darts)
  reset              start a new match
  stats              per-team statistics
  history            recent completed matches
  clear-history      forget completed matches
  help               this text
  quit               leave";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Score { points: i64, darts: Option<u8> },
    Finish,
    Undo,
    Switch,
    Rename { team_id: TeamId, name: String },
    Darts(u8),
    Skip,
    Reset,
    Stats,
    History,
    ClearHistory,
    Help,
    Quit,
}

/// Parse one line of input. While the finish prompt is open a bare 1-3 is
/// read as the dart count.
pub fn parse_line(line: &str, prompt_open: bool) -> Result<Option<ConsoleCommand>, MatchError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "finish" | "f" => ConsoleCommand::Finish,
        "undo" | "u" => ConsoleCommand::Undo,
        "switch" => ConsoleCommand::Switch,
        "skip" => ConsoleCommand::Skip,
        "reset" => ConsoleCommand::Reset,
        "stats" => ConsoleCommand::Stats,
        "history" => ConsoleCommand::History,
        "clear-history" => ConsoleCommand::ClearHistory,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        "darts" => ConsoleCommand::Darts(parse_darts(words.next())?),
        "name" => {
            let raw_id = words
                .next()
                .and_then(|w| w.parse::<u8>().ok())
                .ok_or_else(|| MatchError::InvalidInput("usage: name <1|2> <name>".into()))?;
            let team_id = TeamId::try_from(raw_id)?;
            let name = words.collect::<Vec<_>>().join(" ");
            ConsoleCommand::Rename { team_id, name }
        }
        _ => {
            let points = parse_points(head)?;
            if prompt_open && (1..=3).contains(&points) && words.clone().next().is_none() {
                ConsoleCommand::Darts(points as u8)
            } else {
                let darts = match words.next() {
                    Some(w) => Some(parse_darts(Some(w))?),
                    None => None,
                };
                ConsoleCommand::Score { points, darts }
            }
        }
    };

    Ok(Some(command))
}

fn parse_darts(word: Option<&str>) -> Result<u8, MatchError> {
    word.and_then(|w| w.parse::<u8>().ok())
        .filter(|d| (1..=3).contains(d))
        .ok_or_else(|| MatchError::InvalidInput("darts must be 1, 2 or 3".into()))
}

/// Run the console until `quit` or end of input
pub fn run<R: BufRead, W: Write>(board: &mut Scoreboard, input: R, out: &mut W) -> io::Result<()> {
    render_board(board, out)?;

    for line in input.lines() {
        let line = line?;
        let prompt_open = board.pending_finish().is_some();

        let command = match parse_line(&line, prompt_open) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "! {}", e)?;
                continue;
            }
        };

        if command == ConsoleCommand::Quit {
            break;
        }

        if let Err(e) = execute(board, command, out)? {
            writeln!(out, "! {}", e)?;
        }
    }

    Ok(())
}

/// Errors from the engine are reported to the user, io errors abort
fn execute<W: Write>(
    board: &mut Scoreboard,
    command: ConsoleCommand,
    out: &mut W,
) -> io::Result<Result<(), MatchError>> {
    let prompt_open = board.pending_finish().is_some();
    let blocked_by_prompt = matches!(
        command,
        ConsoleCommand::Score { .. } | ConsoleCommand::Finish | ConsoleCommand::Switch
    );
    if prompt_open && blocked_by_prompt {
        writeln!(out, "How many darts for the winning visit? (darts <1-3> or skip)")?;
        return Ok(Ok(()));
    }

    let result = match command {
        ConsoleCommand::Score { points, darts } => board.throw(points, darts).map(Some),
        ConsoleCommand::Finish => board.throw_finish().map(Some),
        ConsoleCommand::Undo => board.undo().map(|_| None),
        ConsoleCommand::Switch => board.switch_first_thrower().map(|_| None),
        ConsoleCommand::Rename { team_id, name } => board.rename(team_id, &name).map(|_| None),
        ConsoleCommand::Darts(darts) => return finish(board, Some(darts), out),
        ConsoleCommand::Skip => return finish(board, None, out),
        ConsoleCommand::Reset => {
            board.reset();
            Ok(None)
        }
        ConsoleCommand::Stats => {
            render_stats(board, out)?;
            return Ok(Ok(()));
        }
        ConsoleCommand::History => {
            render_history(board, out)?;
            return Ok(Ok(()));
        }
        ConsoleCommand::ClearHistory => {
            board.clear_history();
            writeln!(out, "History cleared")?;
            return Ok(Ok(()));
        }
        ConsoleCommand::Help => {
            writeln!(out, "{}", HELP)?;
            return Ok(Ok(()));
        }
        ConsoleCommand::Quit => return Ok(Ok(())),
    };

    match result {
        Ok(outcome) => {
            render_board(board, out)?;
            if let Some(ThrowOutcome::Finished(pending)) = outcome {
                let name = &board.game().team(pending.team_id).name;
                writeln!(
                    out,
                    "Game shot! {} wins with {}. How many darts? (darts <1-3> or skip)",
                    name, pending.points
                )?;
            }
            Ok(Ok(()))
        }
        Err(e) => Ok(Err(e)),
    }
}

fn finish<W: Write>(
    board: &mut Scoreboard,
    darts: Option<u8>,
    out: &mut W,
) -> io::Result<Result<(), MatchError>> {
    match board.submit_finish_darts(darts) {
        Ok(completed) => {
            let darts = completed.throws.last().map(|t| t.darts_used).unwrap_or(3);
            let plural = if darts == 1 { "" } else { "s" };
            writeln!(
                out,
                "{} won, finishing with {} dart{}. Type reset for a new match.",
                completed.winner().name,
                darts,
                plural
            )?;
            Ok(Ok(()))
        }
        Err(e) => Ok(Err(e)),
    }
}

pub fn render_board<W: Write>(board: &Scoreboard, out: &mut W) -> io::Result<()> {
    let game = board.game();
    writeln!(out)?;
    for team in &game.teams {
        let marker = if game.is_finished() {
            if game.winner_id == Some(team.id) {
                " *winner*"
            } else {
                ""
            }
        } else if game.active_team_id == team.id {
            " <"
        } else {
            ""
        };
        let stats = board.stats(team.id);
        writeln!(
            out,
            "  [{}] {:<20} {:>3}   avg {:>6.2}{}",
            team.id, team.name, team.score, stats.average, marker
        )?;
    }
    if let Some(last) = game.throws.last() {
        writeln!(
            out,
            "  last: {} scored {} ({} darts)",
            game.team(last.team_id).name,
            last.points,
            last.darts_used
        )?;
    }
    if !game.is_finished() {
        let active = game.active_team();
        writeln!(
            out,
            "{} to throw, {} left (max {})",
            active.name,
            active.score,
            active.score.min(180)
        )?;
    }
    Ok(())
}

fn render_stats<W: Write>(board: &Scoreboard, out: &mut W) -> io::Result<()> {
    for id in TeamId::ALL {
        let stats = board.stats(id);
        writeln!(
            out,
            "  {:<20} visits {:>3}  darts {:>3}  points {:>3}  avg {:.2}",
            board.game().team(id).name,
            stats.total_throws,
            stats.total_darts,
            stats.total_points,
            stats.average
        )?;
    }
    Ok(())
}

fn render_history<W: Write>(board: &Scoreboard, out: &mut W) -> io::Result<()> {
    let history = board.history();
    if history.is_empty() {
        return writeln!(out, "No completed matches yet");
    }

    let total = history.len();
    for (index, record) in history.iter().enumerate() {
        let minutes = record.duration_minutes();
        let duration = if minutes > 0 {
            format!(", {} min", minutes)
        } else {
            String::new()
        };
        writeln!(
            out,
            "#{} {} won ({}{})",
            total - index,
            record.winner().name,
            record.completed_at.format("%Y-%m-%d %H:%M"),
            duration
        )?;
        for team in &record.teams {
            let stats = record.stats_for(team.id);
            writeln!(
                out,
                "    {:<20} {} visits, {} points, avg {:.2}",
                team.name, stats.total_throws, stats.total_points, stats.average
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oche_core::MemoryStore;
    use std::io::Cursor;

    fn play(script: &str) -> (Scoreboard, String) {
        let mut board = Scoreboard::restore(Box::new(MemoryStore::new()), None);
        let mut out = Vec::new();
        run(&mut board, Cursor::new(script.to_string()), &mut out).unwrap();
        (board, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_score_and_darts() {
        assert_eq!(
            parse_line("60", false).unwrap(),
            Some(ConsoleCommand::Score {
                points: 60,
                darts: None
            })
        );
        assert_eq!(
            parse_line("40 2", false).unwrap(),
            Some(ConsoleCommand::Score {
                points: 40,
                darts: Some(2)
            })
        );
        assert_eq!(parse_line("2", true).unwrap(), Some(ConsoleCommand::Darts(2)));
        assert_eq!(parse_line("   ", false).unwrap(), None);
        assert!(parse_line("40 4", false).is_err());
        assert!(parse_line("sixty", false).is_err());
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_line("name 2 The Arrows", false).unwrap(),
            Some(ConsoleCommand::Rename {
                team_id: TeamId::TWO,
                name: "The Arrows".into()
            })
        );
        assert_eq!(
            parse_line("name 3 x", false).unwrap_err(),
            MatchError::UnknownTeam(3)
        );
    }

    #[test]
    fn test_session_plays_and_undoes() {
        let (board, output) = play("100\n60\nundo\nquit\n100\n");
        assert_eq!(board.game().throws.len(), 1);
        assert_eq!(board.game().active_team_id, TeamId::TWO);
        assert!(output.contains("401"));
    }

    #[test]
    fn test_session_reports_rejections() {
        let (board, output) = play("181\nabc\n");
        assert!(board.game().throws.is_empty());
        assert!(output.contains("out of range"));
        assert!(output.contains("not a whole number"));
    }

    #[test]
    fn test_session_finish_prompt() {
        let script = "180\n180\n180\n180\nfinish\n60\n2\nhistory\n";
        let (board, output) = play(script);
        assert!(output.contains("Game shot!"));
        assert!(output.contains("How many darts for the winning visit?"));
        assert!(output.contains("finishing with 2 darts"));
        assert!(output.contains("#1 Team 1 won"));
        assert_eq!(board.history().len(), 1);
    }
}
