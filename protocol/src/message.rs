use hues_core::{CellIndex, Command, Inbound, PlayerId};
use serde::{Deserialize, Serialize};

use crate::*;

/// Messages sent to the server. Every one is fire-and-forget; the next `state` push reflects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Join { name: String, room: String },
    StartGame,
    ChooseTarget { index: CellIndex },
    LockCue1 { cue: String },
    LockCue2 { cue2: String },
    Guess { cell: CellIndex },
    NextRound,
}

impl ClientMsg {
    pub fn join(name: impl Into<String>, room: impl Into<String>) -> Self {
        Self::Join {
            name: name.into(),
            room: room.into(),
        }
    }

    /// Player management and forced wave closing only exist offline.
    pub fn from_command(command: Command) -> Result<Self> {
        Ok(match command {
            Command::Start => Self::StartGame,
            Command::ChooseTarget { index } => Self::ChooseTarget { index },
            Command::LockCue1 { cue } => Self::LockCue1 { cue },
            Command::LockCue2 { cue } => Self::LockCue2 { cue2: cue },
            Command::Guess { cell } => Self::Guess { cell },
            Command::NextRound => Self::NextRound,
            command @ (Command::AddPlayer { .. }
            | Command::RemovePlayer { .. }
            | Command::CloseWave) => return Err(ProtocolError::Unsupported(command.name())),
        })
    }
}

impl TryFrom<Command> for ClientMsg {
    type Error = ProtocolError;

    fn try_from(command: Command) -> Result<Self> {
        Self::from_command(command)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Welcome {
        id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    State {
        state: WireSnapshot,
    },
    Error {
        message: String,
    },
}

impl From<ServerMsg> for Inbound {
    fn from(msg: ServerMsg) -> Self {
        match msg {
            ServerMsg::Welcome { id, .. } => Inbound::Welcome { id },
            ServerMsg::State { state } => Inbound::Snapshot(state.into()),
            ServerMsg::Error { message } => Inbound::ServerError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(msg: &ClientMsg) -> serde_json::Value {
        serde_json::to_value(msg).unwrap()
    }

    #[test]
    fn client_messages_use_snake_case_tags() {
        assert_eq!(
            to_json(&ClientMsg::join("Ann", "lobby")),
            json!({"type": "join", "name": "Ann", "room": "lobby"})
        );
        assert_eq!(to_json(&ClientMsg::StartGame), json!({"type": "start_game"}));
        assert_eq!(
            to_json(&ClientMsg::ChooseTarget { index: 12 }),
            json!({"type": "choose_target", "index": 12})
        );
        assert_eq!(
            to_json(&ClientMsg::LockCue1 { cue: "teal".into() }),
            json!({"type": "lock_cue1", "cue": "teal"})
        );
        assert_eq!(
            to_json(&ClientMsg::LockCue2 {
                cue2: "deep teal".into()
            }),
            json!({"type": "lock_cue2", "cue2": "deep teal"})
        );
        assert_eq!(
            to_json(&ClientMsg::Guess { cell: 539 }),
            json!({"type": "guess", "cell": 539})
        );
        assert_eq!(to_json(&ClientMsg::NextRound), json!({"type": "next_round"}));
    }

    #[test]
    fn commands_map_to_messages() {
        assert_eq!(
            ClientMsg::from_command(Command::LockCue2 { cue: "dusk".into() }).unwrap(),
            ClientMsg::LockCue2 { cue2: "dusk".into() }
        );
        assert_eq!(
            ClientMsg::try_from(Command::Start).unwrap(),
            ClientMsg::StartGame
        );
        for command in [
            Command::AddPlayer { name: "Ann".into() },
            Command::RemovePlayer { id: "p1".into() },
            Command::CloseWave,
        ] {
            assert!(matches!(
                ClientMsg::from_command(command),
                Err(ProtocolError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn server_messages_become_inbound_events() {
        let welcome: ServerMsg =
            serde_json::from_value(json!({"type": "welcome", "id": "abc", "room": "r1"})).unwrap();
        assert_eq!(Inbound::from(welcome), Inbound::Welcome { id: "abc".into() });

        let error: ServerMsg =
            serde_json::from_value(json!({"type": "error", "message": "Room is full"})).unwrap();
        assert_eq!(
            Inbound::from(error),
            Inbound::ServerError("Room is full".into())
        );
    }
}
