use hues_core::{
    Board, COLS, CellIndex, Coord, Guess, Phase, Player, PlayerId, ROWS, RoundNumber, Snapshot,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The `state` payload as the server sends it.
///
/// Decoding never fails on a single bad field: whatever cannot be read is logged and left empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireSnapshot {
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub round: RoundNumber,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cols: Option<Coord>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rows: Option<Coord>,
    #[serde(deserialize_with = "lenient")]
    pub cue_giver: Option<PlayerId>,
    #[serde(deserialize_with = "lenient")]
    pub phase: String,
    #[serde(deserialize_with = "lenient")]
    pub cue1: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub cue2: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub target: Option<CellIndex>,
    #[serde(deserialize_with = "lenient")]
    pub select_options: Option<Vec<CellIndex>>,
    #[serde(deserialize_with = "lenient")]
    pub players: Vec<Player>,
    pub guesses1: GuessList,
    pub guesses2: GuessList,
    pub last_guesses: GuessList,
}

impl From<WireSnapshot> for Snapshot {
    fn from(wire: WireSnapshot) -> Self {
        let phase = match Phase::from_wire(&wire.phase) {
            Some(phase) => phase,
            None if wire.phase.is_empty() => Phase::Lobby,
            None => {
                log::warn!("Unknown phase {:?}, treating it as the lobby", wire.phase);
                Phase::Lobby
            }
        };

        Snapshot {
            room: wire.room,
            board: Board::new(wire.rows.unwrap_or(ROWS), wire.cols.unwrap_or(COLS)),
            players: wire.players,
            round: wire.round,
            phase,
            cue_giver: wire.cue_giver,
            cue1: wire.cue1,
            cue2: wire.cue2,
            target: wire.target,
            select_options: wire.select_options.unwrap_or_default().into_iter().collect(),
            guesses1: wire.guesses1.0,
            guesses2: wire.guesses2.0,
            last_guesses: wire.last_guesses.0,
        }
    }
}

impl From<&Snapshot> for WireSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let board = snapshot.board;
        Self {
            room: snapshot.room.clone(),
            round: snapshot.round,
            cols: Some(board.cols()),
            rows: Some(board.rows()),
            cue_giver: snapshot.cue_giver.clone(),
            phase: snapshot.phase.as_str().into(),
            cue1: snapshot.cue1.clone(),
            cue2: snapshot.cue2.clone(),
            target: snapshot.target,
            select_options: (!snapshot.select_options.is_empty())
                .then(|| snapshot.select_options.to_vec()),
            players: snapshot.players.clone(),
            guesses1: GuessList(snapshot.guesses1.clone()),
            guesses2: GuessList(snapshot.guesses2.clone()),
            last_guesses: GuessList(snapshot.last_guesses.clone()),
        }
    }
}

/// Guesses in any of the shapes servers send: `[[id, cell], …]`, `{id: cell, …}` or `[cell, …]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuessList(pub Vec<Guess>);

impl GuessList {
    pub fn from_value(value: &Value) -> Self {
        let guesses = match value {
            Value::Array(items) => items.iter().filter_map(guess_from_item).collect(),
            Value::Object(map) => map
                .iter()
                .filter_map(|(id, cell)| Some(Guess::new(id.as_str().into(), cell_index(cell)?)))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                log::warn!("Ignoring guesses in unexpected shape: {}", other);
                Vec::new()
            }
        };
        Self(guesses)
    }

    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.0.iter().map(|guess| guess.cell)
    }
}

fn guess_from_item(item: &Value) -> Option<Guess> {
    match item {
        Value::Array(pair) => match pair.as_slice() {
            [id, cell, ..] => Some(Guess::new(player_id(id)?, cell_index(cell)?)),
            _ => None,
        },
        Value::Number(_) => cell_index(item).map(Guess::anonymous),
        _ => None,
    }
}

fn cell_index(value: &Value) -> Option<CellIndex> {
    value.as_u64().and_then(|cell| CellIndex::try_from(cell).ok())
}

fn player_id(value: &Value) -> Option<PlayerId> {
    match value {
        Value::String(id) => Some(id.as_str().into()),
        Value::Number(id) => Some(id.to_string().into()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for GuessList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireGuess<'a> {
    Pair(&'a PlayerId, CellIndex),
    Cell(CellIndex),
}

impl Serialize for GuessList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|guess| match &guess.player {
            Some(player) => WireGuess::Pair(player, guess.cell),
            None => WireGuess::Cell(guess.cell),
        }))
    }
}

/// Reads a field, falling back to its default when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed field {}: {}", value, err);
        T::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(state: Value) -> Snapshot {
        serde_json::from_value::<WireSnapshot>(state).unwrap().into()
    }

    #[test]
    fn all_guess_shapes_decode_to_the_same_cells() {
        let pairs = GuessList::from_value(&json!([["a", 10], ["b", 11]]));
        let object = GuessList::from_value(&json!({"a": 10, "b": 11}));
        let cells = GuessList::from_value(&json!([10, 11]));

        for list in [&pairs, &object, &cells] {
            assert_eq!(list.cells().collect::<Vec<_>>(), vec![10, 11]);
        }
        assert_eq!(pairs, object);
        assert_eq!(cells.0[0], Guess::anonymous(10));
    }

    #[test]
    fn garbage_guesses_decode_to_empty() {
        for garbage in [json!("oops"), json!(null), json!(3), json!([["a"], {"x": 1}, "b", -4])] {
            assert_eq!(GuessList::from_value(&garbage), GuessList::default(), "{garbage}");
        }
    }

    #[test]
    fn full_server_state_decodes() {
        let snapshot = decode(json!({
            "room": "lobby",
            "round": 2,
            "cols": 30,
            "rows": 18,
            "cue_giver": "a",
            "phase": "guess2",
            "cue1": "sea",
            "cue2": "calm sea",
            "target": null,
            "select_options": null,
            "players": [
                {"id": "a", "name": "Ann", "score": 4},
                {"id": "b", "name": "Ben", "score": 0}
            ],
            "guessed_once": ["b"],
            "guessed_twice": [],
            "guesses1": [["b", 99]],
            "guesses2": [],
            "last_guesses": []
        }));

        assert_eq!(snapshot.room.as_deref(), Some("lobby"));
        assert_eq!(snapshot.round, 2);
        assert_eq!(snapshot.phase, Phase::Guess2);
        assert_eq!(snapshot.board, Board::STANDARD);
        assert_eq!(snapshot.cue_giver, Some("a".into()));
        assert_eq!(snapshot.players[0].score, 4);
        assert_eq!(snapshot.guess1_of(&"b".into()), Some(99));
        assert!(snapshot.select_options.is_empty());
    }

    #[test]
    fn partial_state_degrades_to_defaults() {
        let snapshot = decode(json!({
            "round": "two",
            "phase": "setup",
            "players": "nobody",
            "select_options": [1, 2, 70000],
            "guesses1": {"a": "x"}
        }));

        assert_eq!(snapshot.round, 0);
        assert_eq!(snapshot.phase, Phase::Lobby);
        assert!(snapshot.players.is_empty());
        assert!(snapshot.select_options.is_empty());
        assert!(snapshot.guesses1.is_empty());
    }

    #[test]
    fn unknown_phase_is_treated_as_lobby() {
        assert_eq!(decode(json!({"phase": "intermission"})).phase, Phase::Lobby);
    }

    #[test]
    fn encodes_guesses_as_pairs() {
        let list = GuessList(vec![Guess::new("a".into(), 3), Guess::anonymous(4)]);
        assert_eq!(serde_json::to_value(&list).unwrap(), json!([["a", 3], 4]));
    }
}
