pub mod guest;
pub mod host;
pub mod reveal_queue;

use crate::{
    card::{CharacterType, ClueCard, RoomType, WeaponType},
    deck::{CardDeck, DeckConfig, DeckError},
    game_state::{GameState, PlayerId, PlayerState, TurnAction},
};
use log::info;
use std::collections::BTreeMap;
use thiserror::Error;

pub use guest::{GuestEngine, GuestView, ViewEvent};
pub use host::HostEngine;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("not allowed while the turn is in the {0} phase")]
    WrongPhase(TurnAction),
    #[error("cannot move from {from} to {to}")]
    InvalidMove { from: RoomType, to: RoomType },
    #[error("the game has already started")]
    GameStarted,
    #[error("the game has not started yet")]
    GameNotStarted,
    #[error("the game is over")]
    GameOver,
    #[error("the name {0:?} is already taken")]
    DuplicateName(String),
    #[error("names must be 1 to 64 characters")]
    InvalidName,
    #[error("{0} is already taken")]
    CharacterTaken(CharacterType),
    #[error("seat {0} is already taken")]
    SeatTaken(PlayerId),
    #[error("the session is full")]
    SessionFull,
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is out of the game")]
    Eliminated(PlayerId),
    #[error("player {0} does not need to reveal anything now")]
    NotPendingReveal(PlayerId),
    #[error("player {player} does not hold {card}")]
    CardNotHeld { player: PlayerId, card: ClueCard },
    #[error("player {0} is not waiting for cards")]
    NotRevealTarget(PlayerId),
    #[error("packet claims to be from player {claimed} but came from {actual}")]
    WrongSender { claimed: PlayerId, actual: PlayerId },
    #[error("{0} players cannot start a game")]
    NotEnoughPlayers(usize),
    #[error("seat {0} is empty")]
    SeatGap(PlayerId),
    #[error("not connected to a host")]
    NotConnected,
    #[error(transparent)]
    Deck(#[from] DeckError),
}

pub struct Session {
    players: BTreeMap<PlayerId, PlayerState>,
    state: GameState,
    deck: CardDeck,
    is_game_started: bool,
    is_game_over: bool,
}

impl Session {
    pub fn new(deck: DeckConfig) -> Self {
        Session {
            players: BTreeMap::new(),
            state: GameState::new(0),
            deck: CardDeck::new(deck),
            is_game_started: false,
            is_game_over: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&player_id)
    }

    pub fn player_name(&self, player_id: PlayerId) -> Option<&str> {
        self.players
            .get(&player_id)
            .map(|p| p.player_name.as_str())
    }

    pub fn is_game_started(&self) -> bool {
        self.is_game_started
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    fn begin(&mut self, num_players: usize) {
        self.state = GameState::new(num_players);
        self.is_game_started = true;
        self.is_game_over = false;
    }

    fn replace_turn(&mut self, turn: PlayerId, action: TurnAction) {
        if self.state.turn != turn {
            if let Some(name) = self.player_name(turn) {
                info!(target: "engine", "It is {}'s turn", name);
            }
        }
        self.state = GameState {
            turn,
            action,
            num_players: self.state.num_players,
        };
    }

    fn resize(&mut self, num_players: usize) {
        self.state = GameState::new(num_players);
    }
}

pub trait Engine {
    type Inbound;

    fn session(&self) -> &Session;

    /// Routes one inbound packet to the operation it names. Rejections are
    /// logged and leave the session unchanged.
    fn dispatch(&mut self, packet: Self::Inbound);

    fn start_game(&mut self) -> Result<(), ActionError>;

    fn set_turn(&mut self, turn: PlayerId, action: TurnAction);

    fn set_player_ready(&mut self, player_id: PlayerId, is_ready: bool)
        -> Result<(), ActionError>;

    fn remove_player(&mut self, player_id: PlayerId) -> Result<(), ActionError>;

    fn move_player(
        &mut self,
        player_id: PlayerId,
        room: RoomType,
        is_forced_move: bool,
    ) -> Result<(), ActionError>;

    fn guess(
        &mut self,
        player_id: PlayerId,
        is_final: bool,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError>;

    fn reveal(
        &mut self,
        send_id: PlayerId,
        recv_id: PlayerId,
        card: ClueCard,
    ) -> Result<(), ActionError>;

    fn shut_down(&mut self);

    fn state(&self) -> &GameState {
        self.session().state()
    }

    fn player_name(&self, player_id: PlayerId) -> Option<&str> {
        self.session().player_name(player_id)
    }
}
