use hues_core::{Authority, Board, Effect, Session};

use crate::input::{self, Action, InputError};
use crate::render;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs one typed line against the session and prints what happened.
pub fn handle_line<A: Authority>(session: &mut Session<A>, line: &str) -> Flow {
    let board = session
        .snapshot()
        .map_or(Board::STANDARD, |snapshot| snapshot.board);

    let result = match input::parse(line, &board) {
        Ok(Action::Quit) => return Flow::Quit,
        Ok(Action::Help) => {
            println!("{}", render::HELP);
            return Flow::Continue;
        }
        Ok(Action::Board) => {
            println!("{}", render::board(session.annotations()));
            return Flow::Continue;
        }
        Ok(Action::Status) => {
            match session.snapshot() {
                Some(snapshot) => println!("{}", render::status(snapshot)),
                None => println!("Nothing to show yet"),
            }
            return Flow::Continue;
        }
        Ok(Action::NewMatch) => session.request_new_match().map_err(InputError::from),
        Ok(Action::Play(play)) => play
            .into_command(session.snapshot())
            .and_then(|command| Ok(session.dispatch(command)?)),
        Err(InputError::Empty) => return Flow::Continue,
        Err(err) => Err(err),
    };

    match result {
        Ok(effects) => show(session, &effects),
        Err(err) => println!("{err}"),
    }
    Flow::Continue
}

pub fn show<A: Authority>(session: &Session<A>, effects: &[Effect]) {
    for effect in effects {
        println!("{}", render::describe(effect, session.snapshot()));
    }
    let revealed = effects
        .iter()
        .any(|effect| matches!(effect, Effect::Revealed { .. }));
    if revealed {
        println!("{}", render::board(session.annotations()));
    }
}
