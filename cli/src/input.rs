use hues_core::{Board, CellIndex, Command, GameError, Phase, PlayerId, Snapshot, TARGET_OPTIONS};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Type a command, or `help`")]
    Empty,
    #[error("Unknown command `{0}`, try `help`")]
    UnknownVerb(String),
    #[error("`{verb}` needs {what}")]
    MissingArgument {
        verb: &'static str,
        what: &'static str,
    },
    #[error("There is no option {0}")]
    NoSuchOption(usize),
    #[error("No cue is expected during the {0} phase")]
    NoCueExpected(Phase),
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Cell named on the command line: an option number, a label like `B7` or a raw index like `#36`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellRef {
    Option(usize),
    Label(CellIndex),
}

/// Console-only actions, plus game actions that become a [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Help,
    Board,
    Status,
    Quit,
    NewMatch,
    Play(Play),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Play {
    Add(String),
    Remove(PlayerId),
    Start,
    Pick(CellRef),
    /// Either cue, whichever the phase expects.
    Cue(String),
    Cue1(String),
    Cue2(String),
    Guess(CellIndex),
    Close,
    Next,
}

pub fn parse(line: &str, board: &Board) -> Result<Action, InputError> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let argument = |what: &'static str, verb: &'static str| {
        Some(rest)
            .filter(|rest| !rest.is_empty())
            .ok_or(InputError::MissingArgument { verb, what })
    };

    let play = match verb.to_ascii_lowercase().as_str() {
        "" => return Err(InputError::Empty),
        "help" | "?" => return Ok(Action::Help),
        "board" | "b" => return Ok(Action::Board),
        "status" | "s" => return Ok(Action::Status),
        "quit" | "exit" | "q" => return Ok(Action::Quit),
        "new" => return Ok(Action::NewMatch),
        "add" | "join" => Play::Add(argument("a name", "add")?.into()),
        "remove" | "kick" => Play::Remove(argument("a player id", "remove")?.into()),
        "start" => Play::Start,
        "pick" | "choose" => Play::Pick(parse_pick(argument("an option or a cell", "pick")?, board)?),
        "cue" => Play::Cue(argument("a cue", "cue")?.into()),
        "cue1" => Play::Cue1(argument("a cue", "cue1")?.into()),
        "cue2" => Play::Cue2(argument("a cue", "cue2")?.into()),
        "guess" | "g" => Play::Guess(parse_cell(argument("a cell", "guess")?, board)?),
        "close" => Play::Close,
        "next" => Play::Next,
        _ => return Err(InputError::UnknownVerb(verb.into())),
    };
    Ok(Action::Play(play))
}

fn parse_pick(text: &str, board: &Board) -> Result<CellRef, InputError> {
    match text.parse::<usize>() {
        Ok(number) if (1..=TARGET_OPTIONS).contains(&number) => Ok(CellRef::Option(number - 1)),
        _ => parse_cell(text, board).map(CellRef::Label),
    }
}

pub fn parse_cell(text: &str, board: &Board) -> Result<CellIndex, InputError> {
    match text.strip_prefix('#') {
        Some(raw) => {
            let index = raw.parse().map_err(|_| GameError::InvalidLabel)?;
            Ok(board.checked_index(index)?)
        }
        None => Ok(board.parse_cell_label(text)?),
    }
}

impl Play {
    /// Turns a game action into a command, using the current state to fill in what the player left implicit.
    pub fn into_command(self, snapshot: Option<&Snapshot>) -> Result<Command, InputError> {
        let phase = snapshot.map_or(Phase::Lobby, |snapshot| snapshot.phase);
        Ok(match self {
            Self::Add(name) => Command::AddPlayer { name },
            Self::Remove(id) => Command::RemovePlayer { id },
            Self::Start => Command::Start,
            Self::Pick(CellRef::Label(index)) => Command::ChooseTarget { index },
            Self::Pick(CellRef::Option(number)) => {
                let index = snapshot
                    .and_then(|snapshot| snapshot.select_options.get(number).copied())
                    .ok_or(InputError::NoSuchOption(number + 1))?;
                Command::ChooseTarget { index }
            }
            Self::Cue(cue) => match phase {
                Phase::Cue1 => Command::LockCue1 { cue },
                Phase::Cue2 => Command::LockCue2 { cue },
                phase => return Err(InputError::NoCueExpected(phase)),
            },
            Self::Cue1(cue) => Command::LockCue1 { cue },
            Self::Cue2(cue) => Command::LockCue2 { cue },
            Self::Guess(cell) => Command::Guess { cell },
            Self::Close => Command::CloseWave,
            Self::Next => Command::NextRound,
        })
    }
}
