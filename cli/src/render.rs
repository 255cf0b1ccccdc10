use std::fmt::Write;

use hues_core::{Annotations, Board, CellIndex, Effect, Marker, Phase, PlayerId, Snapshot};

pub const HELP: &str = "\
Commands:
  add <name>          add a player (lobby, offline)
  remove <id>         remove a player (lobby, offline)
  start               start the match
  new                 start a new match after a win
  pick <1-4|cell>     choose the target among the offered options
  cue <words>         give the cue the phase expects (one word, then up to two)
  guess <cell>        guess a cell, like B7 or #36
  close               end the running guess wave (offline)
  next                go to the next round
  board | status      show the board or the scores
  help | quit";

pub fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Lobby => "Lobby",
        Phase::Cue1 => "First cue",
        Phase::Guess1 => "First wave of guesses",
        Phase::Cue2 => "Second cue",
        Phase::Guess2 => "Second wave of guesses",
        Phase::Reveal => "Reveal",
    }
}

pub fn describe(effect: &Effect, snapshot: Option<&Snapshot>) -> String {
    let board = snapshot.map_or(Board::STANDARD, |snapshot| snapshot.board);
    let name = |id: &PlayerId| {
        snapshot
            .and_then(|snapshot| snapshot.player(id))
            .map_or_else(|| id.to_string(), |player| player.name.clone())
    };

    match effect {
        Effect::Welcomed { id } => format!("Joined as {id}"),
        Effect::RoundStarted { round } => format!("=== Round {round} ==="),
        Effect::PhaseChanged { to, .. } => format!("Phase: {}", phase_title(*to)),
        Effect::Cue1Given { cue } => format!("First cue: {cue}"),
        Effect::Cue2Given { cue } => format!("Second cue: {cue}"),
        Effect::TargetChosen { index } => format!("Your target is {}", cell(&board, *index)),
        Effect::PickTarget { options } => {
            let mut text = String::from("Pick a target:");
            for (number, &index) in options.iter().enumerate() {
                let _ = write!(text, "  {}) {}", number + 1, cell(&board, index));
            }
            text
        }
        Effect::Revealed { summary } => {
            let mut text = format!("The target was {}", cell(&board, summary.target));
            for award in &summary.awards {
                let best = if summary.best.as_ref() == Some(&award.player) {
                    " (closest)"
                } else {
                    ""
                };
                let _ = write!(
                    text,
                    "\n  {}: {} at distance {}, +{}{}",
                    name(&award.player),
                    board.cell_label(award.guess),
                    award.distance,
                    award.points,
                    best
                );
            }
            text
        }
        Effect::MatchWon { name, score, .. } => {
            format!("{name} wins with {score} points! Type `new` for another match.")
        }
        Effect::MatchReset => "A new match begins".into(),
        Effect::ServerError { message } => format!("Server: {message}"),
        Effect::ConnectionLost => "Connection to the server was lost".into(),
    }
}

/// Label and color of a cell, `B7 hsl(72deg 100% 69%)`.
pub fn cell(board: &Board, index: CellIndex) -> String {
    if board.contains(index) {
        format!("{} {}", board.cell_label(index), board.cell_color(index))
    } else {
        format!("#{index}")
    }
}

pub fn status(snapshot: &Snapshot) -> String {
    let mut text = format!("Round {}, {}", snapshot.round, phase_title(snapshot.phase));
    if let Some(giver) = &snapshot.cue_giver {
        let _ = write!(text, ", cues by {}", snapshot.player_name(giver));
    }
    let cues: Vec<&str> = [snapshot.cue1.as_deref(), snapshot.cue2.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !cues.is_empty() {
        let _ = write!(text, ", cues: {}", cues.join(" / "));
    }
    for player in &snapshot.players {
        let _ = write!(text, "\n  {:<12} {:>3}  ({})", player.name, player.score, player.id);
    }
    text
}

fn glyph(annotations: &Annotations, index: CellIndex) -> char {
    let mark = annotations.mark(index);
    let marker = mark.marker;
    if marker.contains(Marker::BEST) {
        '!'
    } else if marker.contains(Marker::TARGET) {
        'T'
    } else if marker.contains(Marker::SELECTED) {
        '*'
    } else if marker.contains(Marker::GUESS) {
        'x'
    } else if mark.points > 0 {
        char::from_digit(mark.points, 10).unwrap_or('+')
    } else {
        '.'
    }
}

/// Text rendition of the board: one character per cell, row letters on the left.
pub fn board(annotations: &Annotations) -> String {
    let board = annotations.board();
    let mut text = String::from("   ");
    for col in 1..=u16::from(board.cols()) {
        text.push(if col % 5 == 0 {
            char::from_digit(u32::from(col / 5 % 10), 10).unwrap_or(' ')
        } else {
            ' '
        });
    }
    for row in 0..board.rows() {
        let _ = write!(text, "\n {} ", char::from(b'A' + row));
        for col in 0..board.cols() {
            text.push(glyph(annotations, board.row_col_to_index((row, col))));
        }
    }
    text
}
