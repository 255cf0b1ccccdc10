use anyhow::Context;
use futures_channel::mpsc::{UnboundedSender, unbounded};
use futures_util::{SinkExt, StreamExt};
use hues_core::{Authority, Command, GameError, Inbound, Session, Snapshot};
use hues_protocol::{ClientMsg, ServerMsg, decode, encode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::console::{self, Flow};

/// Forwards commands to the server; the resulting state arrives as a later snapshot.
#[derive(Debug)]
pub struct RemoteAuthority {
    outgoing: UnboundedSender<ClientMsg>,
}

impl RemoteAuthority {
    pub fn new(outgoing: UnboundedSender<ClientMsg>) -> Self {
        Self { outgoing }
    }
}

impl Authority for RemoteAuthority {
    fn dispatch(&mut self, command: Command) -> hues_core::Result<Option<Snapshot>> {
        let msg = ClientMsg::from_command(command).map_err(|err| {
            log::debug!("{}", err);
            GameError::Unsupported
        })?;
        self.outgoing
            .unbounded_send(msg)
            .map_err(|_| GameError::Disconnected)?;
        Ok(None)
    }

    fn close(&mut self) {
        self.outgoing.close_channel();
    }
}

pub fn ws_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid server address {raw:?}"))?;
    anyhow::ensure!(
        matches!(url.scheme(), "ws" | "wss"),
        "server address must use ws:// or wss://, got {url}"
    );
    Ok(url)
}

fn inbound_from_frame(frame: Message) -> Option<Inbound> {
    match frame {
        Message::Text(text) => match decode::<ServerMsg>(text.as_str()) {
            Ok(msg) => Some(msg.into()),
            Err(err) => {
                log::warn!("Dropping undecodable frame: {}", err);
                None
            }
        },
        Message::Close(frame) => {
            log::info!("Server closed the connection: {:?}", frame);
            Some(Inbound::Disconnected)
        }
        _ => None,
    }
}

pub async fn run(url: &str, room: &str, name: &str) -> anyhow::Result<()> {
    let url = ws_url(url)?;
    log::info!("Connecting to {}", url);
    let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .with_context(|| format!("cannot reach {url}"))?;
    let (mut write, mut read) = ws.split();

    let (outgoing, mut queue) = unbounded::<ClientMsg>();
    let writer = tokio::spawn(async move {
        while let Some(msg) = queue.next().await {
            let text = match encode(&msg) {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("Cannot encode {:?}: {}", msg, err);
                    continue;
                }
            };
            if let Err(err) = write.send(Message::text(text)).await {
                log::warn!("Send failed: {}", err);
                break;
            }
        }
        let _ = write.send(Message::Close(None)).await;
    });

    outgoing
        .unbounded_send(ClientMsg::join(name, room))
        .map_err(|_| anyhow::anyhow!("connection closed before joining"))?;
    println!("Joined room {room} as {name}. Type `help` for commands.");

    let mut session = Session::new(RemoteAuthority::new(outgoing));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            frame = read.next() => {
                let inbound = match frame {
                    Some(Ok(frame)) => match inbound_from_frame(frame) {
                        Some(inbound) => inbound,
                        None => continue,
                    },
                    Some(Err(err)) => {
                        log::warn!("Connection error: {}", err);
                        Inbound::Disconnected
                    }
                    None => Inbound::Disconnected,
                };
                let effects = session.receive(inbound);
                console::show(&session, &effects);
                if !session.is_connected() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if console::handle_line(&mut session, &line) == Flow::Quit {
                    break;
                }
            }
        }
    }

    session.close();
    if let Err(err) = writer.await {
        log::warn!("Writer task failed: {}", err);
    }
    Ok(())
}
