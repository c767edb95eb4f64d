use crate::cli::{Commands, LineKind};
use crate::render::{highlight_of, TextRenderer};
use crate::session::{format_time, Outcome, Session};
use anyhow::{bail, Context, Result};
use forkmaze_core::{Cell, Highlight, HintKind, Line, Pos, Renderer, Seed};
use std::io::Write;

pub fn run<W: Write>(command: Commands, session: &mut Session, out: &mut TextRenderer<W>) -> Result<()> {
    match command {
        Commands::New { seed, size } => {
            let seed = seed
                .map(|s| s.parse::<Seed>())
                .transpose()
                .context("invalid seed")?;
            let game = session.new_game(seed, size)?;
            let label = match game.seed() {
                Some(seed) => format!("Seed {seed}, {0}×{0}", game.size()),
                None => format!("{0}×{0}", game.size()),
            };
            out.render(&game.view(Highlight::None))?;
            out.message(&label, false)?;
            settle(session, out)
        }
        Commands::Show => show(session, out, Highlight::None),
        Commands::Mark { row, col, value } => {
            let pos = to_pos(row, col)?;
            let result = session.game_mut()?.apply_move(pos, Cell::from(value));
            after_move(session, out, result.map_err(|e| e.to_string()))
        }
        Commands::Line { kind, index, value } => {
            let index = index.checked_sub(1).context("lines are numbered from 1")?;
            let line = match kind {
                LineKind::Row => Line::Row(index),
                LineKind::Col => Line::Col(index),
            };
            let result = session.game_mut()?.apply_line(line, value.into());
            after_move(session, out, result.map_err(|e| e.to_string()))
        }
        Commands::Fork => {
            let ok = session.game_mut()?.fork();
            after_move(session, out, ok_or(ok, "can't open another layer here"))
        }
        Commands::Commit => {
            let ok = session.game_mut()?.commit();
            after_move(session, out, ok_or(ok, "there is no open layer to commit"))
        }
        Commands::Discard => {
            let ok = session.game_mut()?.discard();
            after_move(session, out, ok_or(ok, "there is no open layer to discard"))
        }
        Commands::Undo => {
            let ok = session.game_mut()?.undo();
            after_move(session, out, ok_or(ok, "nothing to undo"))
        }
        Commands::Hint { row, col } => hint(session, out, row.zip(col)),
        Commands::Check => check(session, out),
        Commands::Reset => {
            session.game_mut()?.reset();
            show(session, out, Highlight::None)?;
            settle(session, out)
        }
        Commands::Stats => {
            let player = *session.player();
            out.message(&format!("Games won:   {}", player.games_won), false)?;
            out.message(&format!("Win streak:  {}", player.win_streak), false)?;
            out.message(&format!("Best streak: {}", player.best_streak), false)?;
            if let Some(best) = player.best_time_secs {
                out.message(&format!("Best time:   {}", format_time(best)), false)?;
            }
            Ok(())
        }
    }
}

fn to_pos(row: usize, col: usize) -> Result<Pos> {
    if row == 0 || col == 0 {
        bail!("rows and columns are numbered from 1");
    }
    Ok(Pos::new(row - 1, col - 1))
}

fn ok_or(ok: bool, reason: &str) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

fn show<W: Write>(session: &Session, out: &mut TextRenderer<W>, highlight: Highlight) -> Result<()> {
    let game = session.game()?;
    out.render(&game.view(highlight))?;
    Ok(())
}

/// Report a rejected action, or redraw and save after an accepted one.
fn after_move<W: Write>(
    session: &mut Session,
    out: &mut TextRenderer<W>,
    result: Result<(), String>,
) -> Result<()> {
    if let Err(reason) = result {
        out.message(&capitalize(&reason), true)?;
        return Ok(());
    }
    show(session, out, Highlight::None)?;
    settle(session, out)
}

fn settle<W: Write>(session: &mut Session, out: &mut TextRenderer<W>) -> Result<()> {
    if let Outcome::Won { elapsed_secs, streak } = session.save()? {
        out.message(
            &format!("Solved in {}. Win streak: {streak}.", format_time(elapsed_secs)),
            false,
        )?;
    }
    Ok(())
}

fn hint<W: Write>(session: &Session, out: &mut TextRenderer<W>, cell: Option<(usize, usize)>) -> Result<()> {
    let game = session.game()?;
    let engine = session.engine();
    let hint = match cell {
        Some((row, col)) => {
            let pos = to_pos(row, col)?;
            let hint = engine.hint_for_cell(game, pos);
            if hint.is_none() {
                show(session, out, Highlight::Cell(pos))?;
                out.message(&format!("No deduction decides {pos} right now."), false)?;
                return Ok(());
            }
            hint
        }
        None => engine.next_hint(game),
    };

    show(session, out, highlight_of(hint.as_ref()))?;
    match hint {
        Some(hint) => out.render_hint(&hint)?,
        None => out.message("The puzzle is already solved.", false)?,
    }
    Ok(())
}

/// Surface mistakes and contradictions only; forcing hints stay hidden.
fn check<W: Write>(session: &Session, out: &mut TextRenderer<W>) -> Result<()> {
    let game = session.game()?;
    let finding = session.engine().next_hint(game);
    match finding {
        Some(hint) if matches!(hint.kind, HintKind::Mistake | HintKind::ForkContradiction) => {
            show(session, out, hint.highlight.clone())?;
            out.render_hint(&hint)?;
        }
        Some(_) => {
            show(session, out, Highlight::None)?;
            let open = game.board().empties().len();
            out.message(&format!("No mistakes so far; {open} cells left."), false)?;
        }
        None => out.message("The puzzle is solved.", false)?,
    }
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CellArg, MarkArg};
    use crate::theme::Theme;
    use forkmaze_core::{HintEngine, StandardTerms};
    use tempfile::TempDir;

    fn renderer() -> TextRenderer<Vec<u8>> {
        TextRenderer::new(Vec::new(), Theme::mono(), Box::new(StandardTerms))
    }

    fn output(out: TextRenderer<Vec<u8>>) -> String {
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_new_then_mark_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path(), HintEngine::new());
        let mut out = renderer();
        let new = Commands::New {
            seed: Some("zxn8yb".to_string()),
            size: 4,
        };
        run(new, &mut session, &mut out).unwrap();
        assert!(output(out).contains("Seed ZXN8YB, 4×4"));

        let mut out = renderer();
        run(Commands::Fork, &mut session, &mut out).unwrap();
        run(
            Commands::Mark {
                row: 1,
                col: 1,
                value: CellArg::Wall,
            },
            &mut session,
            &mut out,
        )
        .unwrap();
        let text = output(out);
        assert!(text.contains("fork depth 1, started at cell (1, 1)"), "{text}");

        let reopened = Session::open(tmp.path(), HintEngine::new());
        assert_eq!(reopened.game().unwrap().depth(), 1);
    }

    #[test]
    fn test_rejections_are_reported() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path(), HintEngine::new());
        let mut out = renderer();
        assert!(run(Commands::Show, &mut session, &mut out).is_err());

        let new = Commands::New {
            seed: Some("ZXN8YB".to_string()),
            size: 4,
        };
        run(new, &mut session, &mut out).unwrap();
        let mut out = renderer();
        run(Commands::Commit, &mut session, &mut out).unwrap();
        run(
            Commands::Line {
                kind: LineKind::Row,
                index: 9,
                value: MarkArg::Wall,
            },
            &mut session,
            &mut out,
        )
        .unwrap();
        let text = output(out);
        assert!(text.contains("There is no open layer to commit"));
        assert!(text.contains("That position is off the board"));
        assert!(run(Commands::New { seed: Some("bad".into()), size: 4 }, &mut session, &mut renderer()).is_err());
    }

    #[test]
    fn test_hint_and_check() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path(), HintEngine::new());
        run(
            Commands::New {
                seed: Some("ZXN8YB".to_string()),
                size: 4,
            },
            &mut session,
            &mut renderer(),
        )
        .unwrap();

        let mut out = renderer();
        run(Commands::Hint { row: None, col: None }, &mut session, &mut out).unwrap();
        assert!(output(out).contains('['));

        let mut out = renderer();
        run(Commands::Check, &mut session, &mut out).unwrap();
        assert!(output(out).contains("No mistakes so far"));
    }
}
