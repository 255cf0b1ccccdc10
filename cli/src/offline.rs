use hues_core::{Command, OfflineEngine, Phase, Session};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::{self, Flow};
use crate::render;

/// Pass-and-play on this terminal until stdin closes or someone quits.
pub async fn run(players: Vec<String>, seed: u64) -> anyhow::Result<()> {
    log::info!("Offline game, seed {:#x}", seed);
    let mut session = Session::new(OfflineEngine::with_seed(seed));

    for name in players {
        match session.dispatch(Command::AddPlayer { name }) {
            Ok(effects) => console::show(&session, &effects),
            Err(err) => println!("{err}"),
        }
    }
    println!("{}", render::HELP);
    prompt(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if console::handle_line(&mut session, &line) == Flow::Quit {
            break;
        }
        prompt(&session);
    }

    session.close();
    Ok(())
}

/// Tells the table who should hold the device next.
fn prompt(session: &Session<OfflineEngine>) {
    let engine = session.authority();
    let hint = match (engine.phase(), engine.current_player()) {
        (Phase::Lobby, _) => {
            let names: Vec<&str> = engine.players().iter().map(|p| p.name.as_str()).collect();
            format!("Players: {}. Add more or `start`.", names.join(", "))
        }
        (Phase::Reveal, _) => match engine.winner() {
            Some(winner) => format!("{} reached {} points. `new` or `next`.", winner.name, winner.score),
            None => "Type `next` for the next round.".into(),
        },
        (Phase::Cue1, Some(player)) if engine.machine().target().is_none() => {
            let options: Vec<String> = engine
                .machine()
                .options()
                .iter()
                .enumerate()
                .map(|(number, &index)| format!("{}) {}", number + 1, engine.machine().board().cell_label(index)))
                .collect();
            format!("{}, pick the target: {}", player.name, options.join("  "))
        }
        (Phase::Cue1, Some(player)) => format!("{}, give a one word cue.", player.name),
        (Phase::Cue2, Some(player)) => format!("{}, give a cue of up to two words.", player.name),
        (Phase::Guess1 | Phase::Guess2, Some(player)) => format!("{}, guess a cell.", player.name),
        (_, None) => return,
    };
    println!("> {hint}");
}
