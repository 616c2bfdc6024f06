use crate::{
    card::{CharacterType, ClueCard, RoomType, WeaponType},
    deck::Clues,
    game_state::{GameOverType, PlayerId, TurnAction},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Direction {
    ToServer,
    ToClient,
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Display, EnumIter, FromRepr)]
pub enum MessageId {
    ConnectToServer = 0,
    DisconnectToServer,
    ReadyToServer,
    ChatToServer,
    GameStartToServer,
    CharUpdateToServer,
    MoveToRoomToServer,
    GuessToServer,
    RevealToServer,
    TurnDoneToServer,

    ConnectToClient = 10,
    ConnectForwardToClient,
    DisconnectToClient,
    ClientDropToClient,
    ReadyToClient,
    ChatToClient,
    GameStartToClient,
    TurnToClient,
    CharUpdateToClient,
    MoveToRoomToClient,
    GuessToClient,
    RevealToClient,
    WinLoseToClient,
}

impl MessageId {
    pub fn direction(&self) -> Direction {
        if (*self as u8) < MessageId::ConnectToClient as u8 {
            Direction::ToServer
        } else {
            Direction::ToClient
        }
    }
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,
    #[error("unknown message id {0}")]
    UnknownId(u8),
    #[error("{0} arrived at the wrong endpoint")]
    Misrouted(MessageId),
    #[error("malformed {id} payload: {source}")]
    Payload {
        id: MessageId,
        #[source]
        source: serde_json::Error,
    },
}

// Payloads -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub is_accepted: bool,
    pub player_id: PlayerId,
    pub name: String,
    pub character: Option<CharacterType>,
    pub room: Option<RoomType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoined {
    pub player_id: PlayerId,
    pub name: String,
    pub character: CharacterType,
    pub room: RoomType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disconnect {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ready {
    pub player_id: PlayerId,
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub player_id: PlayerId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStart {
    pub player_id: PlayerId,
    pub turn: PlayerId,
    pub clues: Clues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn: PlayerId,
    pub action: TurnAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharUpdate {
    pub player_id: PlayerId,
    pub character: CharacterType,
    // set by the host, the new character's starting room
    #[serde(default)]
    pub room: Option<RoomType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToRoom {
    pub player_id: PlayerId,
    pub room: RoomType,
    pub is_forced_move: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub player_id: PlayerId,
    pub is_final: bool,
    pub character: CharacterType,
    pub weapon: WeaponType,
    pub room: RoomType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    pub send_id: PlayerId,
    pub recv_id: PlayerId,
    pub card: ClueCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinLose {
    pub player_id: PlayerId,
    pub outcome: GameOverType,
}

// Packets --------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ToServer {
    Connect(ConnectRequest),
    Disconnect(PlayerRef),
    Ready(Ready),
    Chat(Chat),
    GameStart(PlayerRef),
    CharUpdate(CharUpdate),
    MoveToRoom(MoveToRoom),
    Guess(Guess),
    Reveal(Reveal),
    TurnDone(PlayerRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToClient {
    Connect(ConnectResponse),
    ConnectForward(PlayerJoined),
    Disconnect(Disconnect),
    ClientDrop(PlayerRef),
    Ready(Ready),
    Chat(Chat),
    GameStart(GameStart),
    Turn(Turn),
    CharUpdate(CharUpdate),
    MoveToRoom(MoveToRoom),
    Guess(Guess),
    Reveal(Reveal),
    WinLose(WinLose),
}

impl ToServer {
    pub fn message_id(&self) -> MessageId {
        match self {
            ToServer::Connect(_) => MessageId::ConnectToServer,
            ToServer::Disconnect(_) => MessageId::DisconnectToServer,
            ToServer::Ready(_) => MessageId::ReadyToServer,
            ToServer::Chat(_) => MessageId::ChatToServer,
            ToServer::GameStart(_) => MessageId::GameStartToServer,
            ToServer::CharUpdate(_) => MessageId::CharUpdateToServer,
            ToServer::MoveToRoom(_) => MessageId::MoveToRoomToServer,
            ToServer::Guess(_) => MessageId::GuessToServer,
            ToServer::Reveal(_) => MessageId::RevealToServer,
            ToServer::TurnDone(_) => MessageId::TurnDoneToServer,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = match self {
            ToServer::Connect(p) => to_body(p),
            ToServer::Disconnect(p) | ToServer::GameStart(p) | ToServer::TurnDone(p) => {
                to_body(p)
            }
            ToServer::Ready(p) => to_body(p),
            ToServer::Chat(p) => to_body(p),
            ToServer::CharUpdate(p) => to_body(p),
            ToServer::MoveToRoom(p) => to_body(p),
            ToServer::Guess(p) => to_body(p),
            ToServer::Reveal(p) => to_body(p),
        };
        frame(self.message_id(), body)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let (id, body) = split(bytes, Direction::ToServer)?;
        let packet = match id {
            MessageId::ConnectToServer => ToServer::Connect(from_body(id, body)?),
            MessageId::DisconnectToServer => ToServer::Disconnect(from_body(id, body)?),
            MessageId::ReadyToServer => ToServer::Ready(from_body(id, body)?),
            MessageId::ChatToServer => ToServer::Chat(from_body(id, body)?),
            MessageId::GameStartToServer => ToServer::GameStart(from_body(id, body)?),
            MessageId::CharUpdateToServer => ToServer::CharUpdate(from_body(id, body)?),
            MessageId::MoveToRoomToServer => ToServer::MoveToRoom(from_body(id, body)?),
            MessageId::GuessToServer => ToServer::Guess(from_body(id, body)?),
            MessageId::RevealToServer => ToServer::Reveal(from_body(id, body)?),
            MessageId::TurnDoneToServer => ToServer::TurnDone(from_body(id, body)?),
            _ => return Err(PacketError::Misrouted(id)),
        };
        Ok(packet)
    }
}

impl ToClient {
    pub fn message_id(&self) -> MessageId {
        match self {
            ToClient::Connect(_) => MessageId::ConnectToClient,
            ToClient::ConnectForward(_) => MessageId::ConnectForwardToClient,
            ToClient::Disconnect(_) => MessageId::DisconnectToClient,
            ToClient::ClientDrop(_) => MessageId::ClientDropToClient,
            ToClient::Ready(_) => MessageId::ReadyToClient,
            ToClient::Chat(_) => MessageId::ChatToClient,
            ToClient::GameStart(_) => MessageId::GameStartToClient,
            ToClient::Turn(_) => MessageId::TurnToClient,
            ToClient::CharUpdate(_) => MessageId::CharUpdateToClient,
            ToClient::MoveToRoom(_) => MessageId::MoveToRoomToClient,
            ToClient::Guess(_) => MessageId::GuessToClient,
            ToClient::Reveal(_) => MessageId::RevealToClient,
            ToClient::WinLose(_) => MessageId::WinLoseToClient,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = match self {
            ToClient::Connect(p) => to_body(p),
            ToClient::ConnectForward(p) => to_body(p),
            ToClient::Disconnect(p) => to_body(p),
            ToClient::ClientDrop(p) => to_body(p),
            ToClient::Ready(p) => to_body(p),
            ToClient::Chat(p) => to_body(p),
            ToClient::GameStart(p) => to_body(p),
            ToClient::Turn(p) => to_body(p),
            ToClient::CharUpdate(p) => to_body(p),
            ToClient::MoveToRoom(p) => to_body(p),
            ToClient::Guess(p) => to_body(p),
            ToClient::Reveal(p) => to_body(p),
            ToClient::WinLose(p) => to_body(p),
        };
        frame(self.message_id(), body)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let (id, body) = split(bytes, Direction::ToClient)?;
        let packet = match id {
            MessageId::ConnectToClient => ToClient::Connect(from_body(id, body)?),
            MessageId::ConnectForwardToClient => ToClient::ConnectForward(from_body(id, body)?),
            MessageId::DisconnectToClient => ToClient::Disconnect(from_body(id, body)?),
            MessageId::ClientDropToClient => ToClient::ClientDrop(from_body(id, body)?),
            MessageId::ReadyToClient => ToClient::Ready(from_body(id, body)?),
            MessageId::ChatToClient => ToClient::Chat(from_body(id, body)?),
            MessageId::GameStartToClient => ToClient::GameStart(from_body(id, body)?),
            MessageId::TurnToClient => ToClient::Turn(from_body(id, body)?),
            MessageId::CharUpdateToClient => ToClient::CharUpdate(from_body(id, body)?),
            MessageId::MoveToRoomToClient => ToClient::MoveToRoom(from_body(id, body)?),
            MessageId::GuessToClient => ToClient::Guess(from_body(id, body)?),
            MessageId::RevealToClient => ToClient::Reveal(from_body(id, body)?),
            MessageId::WinLoseToClient => ToClient::WinLose(from_body(id, body)?),
            _ => return Err(PacketError::Misrouted(id)),
        };
        Ok(packet)
    }
}

fn to_body<T: Serialize>(payload: &T) -> Vec<u8> {
    // payloads are plain structs of enums, numbers and strings
    serde_json::to_vec(payload).unwrap_or_default()
}

fn frame(id: MessageId, body: Vec<u8>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + 1);
    bytes.push(id as u8);
    bytes.extend(body);
    bytes
}

fn split(bytes: &[u8], expected: Direction) -> Result<(MessageId, &[u8]), PacketError> {
    let (&first, body) = bytes.split_first().ok_or(PacketError::Empty)?;
    let id = MessageId::from_repr(first).ok_or(PacketError::UnknownId(first))?;
    if id.direction() != expected {
        return Err(PacketError::Misrouted(id));
    }
    Ok((id, body))
}

fn from_body<T: DeserializeOwned>(id: MessageId, body: &[u8]) -> Result<T, PacketError> {
    serde_json::from_slice(body).map_err(|source| PacketError::Payload { id, source })
}

#[cfg(test)]
mod tests {
    use crate::{
        card::{CharacterType, ClueCard, RoomType, WeaponType},
        deck::Clues,
        game_state::{GameOverType, TurnAction},
        packet::{
            Direction, GameStart, Guess, MessageId, PacketError, PlayerRef, Reveal, ToClient,
            ToServer, Turn, WinLose,
        },
    };
    use strum::IntoEnumIterator;

    #[test]
    fn message_ids_should_be_split_by_direction() {
        let to_server = MessageId::iter()
            .filter(|id| id.direction() == Direction::ToServer)
            .count();
        let to_client = MessageId::iter()
            .filter(|id| id.direction() == Direction::ToClient)
            .count();
        assert_eq!(to_server, 10);
        assert_eq!(to_client, 13);
        assert_eq!(MessageId::WinLoseToClient as u8, 22);
    }

    #[test]
    fn frame_should_start_with_the_message_id() {
        let bytes = ToServer::TurnDone(PlayerRef { player_id: 2 }).encode();
        assert_eq!(bytes[0], MessageId::TurnDoneToServer as u8);
        assert_eq!(&bytes[1..], br#"{"player_id":2}"#);
    }

    #[test]
    fn guess_should_survive_the_wire() {
        let packet = ToServer::Guess(Guess {
            player_id: 1,
            is_final: true,
            character: CharacterType::Peacock,
            weapon: WeaponType::Candlestick,
            room: RoomType::Library,
        });
        assert_eq!(ToServer::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn game_start_should_carry_the_three_clue_lists() {
        let packet = ToClient::GameStart(GameStart {
            player_id: 0,
            turn: 1,
            clues: Clues {
                characters: vec![CharacterType::Green],
                weapons: vec![WeaponType::Rope, WeaponType::Wrench],
                rooms: vec![RoomType::Hall],
            },
        });
        assert_eq!(ToClient::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn client_packet_should_be_rejected_by_the_server_decoder() {
        let bytes = ToClient::Turn(Turn {
            turn: 0,
            action: TurnAction::MoveRoom,
        })
        .encode();
        assert!(matches!(
            ToServer::decode(&bytes),
            Err(PacketError::Misrouted(MessageId::TurnToClient))
        ));
    }

    #[test]
    fn server_packet_should_be_rejected_by_the_client_decoder() {
        let bytes = ToServer::Reveal(Reveal {
            send_id: 1,
            recv_id: 0,
            card: ClueCard::Weapon(WeaponType::Dagger),
        })
        .encode();
        assert!(matches!(
            ToClient::decode(&bytes),
            Err(PacketError::Misrouted(MessageId::RevealToServer))
        ));
    }

    #[test]
    fn decode_should_report_unknown_ids_and_bad_payloads() {
        assert!(matches!(ToClient::decode(&[]), Err(PacketError::Empty)));
        assert!(matches!(
            ToClient::decode(&[200, b'{', b'}']),
            Err(PacketError::UnknownId(200))
        ));
        let mut bytes = ToClient::WinLose(WinLose {
            player_id: 3,
            outcome: GameOverType::Lose,
        })
        .encode();
        bytes.truncate(4);
        assert!(matches!(
            ToClient::decode(&bytes),
            Err(PacketError::Payload {
                id: MessageId::WinLoseToClient,
                ..
            })
        ));
    }
}
