use super::{reveal_queue::RevealQueue, ActionError, Engine, Session};
use crate::{
    card::{CharacterType, ClueCard, RoomType, WeaponType},
    deck::{DeckConfig, DeckError},
    game_state::{
        GameOverType, PlayerId, PlayerState, PlayerStatus, TurnAction, MAX_PLAYERS,
    },
    packet::{
        CharUpdate, Chat, ConnectRequest, ConnectResponse, GameStart, Guess, MoveToRoom,
        PlayerJoined, PlayerRef, Ready, Reveal, ToClient, ToServer, WinLose,
    },
    transport::HostLink,
};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Connected {
        player_id: PlayerId,
        is_accepted: bool,
        character: Option<CharacterType>,
    },
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        character: CharacterType,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    PlayerStatus {
        player_id: PlayerId,
        status: PlayerStatus,
    },
    CharacterChanged {
        player_id: PlayerId,
        character: CharacterType,
    },
    GameStarted {
        turn: PlayerId,
        cards: Vec<ClueCard>,
    },
    TurnChanged {
        player_id: PlayerId,
        action: TurnAction,
        is_self: bool,
    },
    CharacterMoved {
        player_id: PlayerId,
        room: RoomType,
        is_forced_move: bool,
    },
    Guessed {
        player_id: PlayerId,
        is_final: bool,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    },
    RevealRequested {
        guesser: PlayerId,
        cards: Vec<ClueCard>,
    },
    CardRevealed {
        from: PlayerId,
        card: ClueCard,
    },
    GameOver {
        player_id: PlayerId,
        outcome: GameOverType,
    },
    Chat {
        player_id: PlayerId,
        message: String,
    },
    Disconnected {
        reason: String,
    },
}

pub trait GuestView {
    fn notify(&mut self, event: ViewEvent);
}

pub struct GuestEngine<L: HostLink, V: GuestView> {
    session: Session,
    link: L,
    view: V,
    me: Option<PlayerId>,
    last_guess: Option<Guess>,
    reveals: RevealQueue<Reveal>,
}

impl<L: HostLink, V: GuestView> GuestEngine<L, V> {
    pub fn new(link: L, view: V, deck: DeckConfig) -> Self {
        GuestEngine {
            session: Session::new(deck),
            link,
            view,
            me: None,
            last_guess: None,
            reveals: RevealQueue::new(MAX_PLAYERS - 1),
        }
    }

    pub fn me(&self) -> Option<PlayerId> {
        self.me
    }

    pub fn my_player(&self) -> Option<&PlayerState> {
        self.me.and_then(|id| self.session.player(id))
    }

    pub fn is_my_turn(&self) -> bool {
        self.session.is_game_started && self.me == Some(self.session.state.turn)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn current_reveal(&self) -> Option<&Reveal> {
        self.reveals.in_flight()
    }

    /// Own cards that answer the last suggestion somebody else made.
    pub fn cards_to_reveal(&self) -> Vec<ClueCard> {
        match (&self.last_guess, self.my_player()) {
            (Some(guess), Some(me)) => {
                me.matching_cards(guess.character, guess.weapon, guess.room)
            }
            _ => vec![],
        }
    }

    /// Called once the UI has dismissed the current reveal. Surfaces the next
    /// queued one, if there is one.
    pub fn acknowledge_reveal(&mut self) -> Option<ClueCard> {
        let next = self.reveals.acknowledge()?;
        self.view.notify(ViewEvent::CardRevealed {
            from: next.send_id,
            card: next.card,
        });
        Some(next.card)
    }

    // Intents ----------------------------------------------------------------

    pub fn request_connect(&mut self, name: &str) {
        self.link.send_message(ToServer::Connect(ConnectRequest {
            name: name.to_string(),
        }));
    }

    pub fn request_ready(&mut self, is_ready: bool) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link
            .send_message(ToServer::Ready(Ready { player_id, is_ready }));
        Ok(())
    }

    pub fn request_start(&mut self) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link
            .send_message(ToServer::GameStart(PlayerRef { player_id }));
        Ok(())
    }

    pub fn request_character(&mut self, character: CharacterType) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link.send_message(ToServer::CharUpdate(CharUpdate {
            player_id,
            character,
            room: None,
        }));
        Ok(())
    }

    pub fn request_move(&mut self, room: RoomType) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link.send_message(ToServer::MoveToRoom(MoveToRoom {
            player_id,
            room,
            is_forced_move: false,
        }));
        Ok(())
    }

    pub fn request_guess(
        &mut self,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        self.send_guess(false, character, weapon, room)
    }

    pub fn request_accusation(
        &mut self,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        self.send_guess(true, character, weapon, room)
    }

    pub fn request_reveal(&mut self, card: ClueCard) -> Result<(), ActionError> {
        let send_id = self.my_id()?;
        let holds = self.my_player().map_or(false, |p| p.holds(&card));
        if !holds {
            return Err(ActionError::CardNotHeld {
                player: send_id,
                card,
            });
        }
        self.link.send_message(ToServer::Reveal(Reveal {
            send_id,
            recv_id: self.session.state.turn,
            card,
        }));
        Ok(())
    }

    pub fn request_end_turn(&mut self) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link
            .send_message(ToServer::TurnDone(PlayerRef { player_id }));
        Ok(())
    }

    pub fn send_chat(&mut self, message: &str) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link.send_message(ToServer::Chat(Chat {
            player_id,
            message: message.to_string(),
        }));
        Ok(())
    }

    fn my_id(&self) -> Result<PlayerId, ActionError> {
        self.me.ok_or(ActionError::NotConnected)
    }

    fn send_guess(
        &mut self,
        is_final: bool,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        let player_id = self.my_id()?;
        self.link.send_message(ToServer::Guess(Guess {
            player_id,
            is_final,
            character,
            weapon,
            room,
        }));
        Ok(())
    }

    // Host packets -------------------------------------------------------------

    fn on_connect(&mut self, response: ConnectResponse) -> Result<(), ActionError> {
        let ConnectResponse {
            is_accepted,
            player_id,
            name,
            character,
            room,
        } = response;
        self.view.notify(ViewEvent::Connected {
            player_id,
            is_accepted,
            character,
        });
        if !is_accepted {
            warn!(target: "network", "The host turned {} away", name);
            self.link.shut_down();
            return Ok(());
        }
        let (Some(character), Some(room)) = (character, room) else {
            warn!(target: "network", "Accepted without a character, ignoring");
            return Ok(());
        };

        self.me = Some(player_id);
        self.seat(PlayerState::new(player_id, name, character, room));
        info!(target: "engine", "Seated as player {} playing {}", player_id, character);
        Ok(())
    }

    fn on_player_joined(&mut self, joined: PlayerJoined) {
        self.view.notify(ViewEvent::PlayerJoined {
            player_id: joined.player_id,
            name: joined.name.clone(),
            character: joined.character,
        });
        info!(target: "engine", "{} joined as {}", joined.name, joined.character);
        self.seat(PlayerState::new(
            joined.player_id,
            joined.name,
            joined.character,
            joined.room,
        ));
    }

    fn seat(&mut self, player: PlayerState) {
        self.session.players.insert(player.player_id, player);
        self.session.resize(self.session.players.len());
    }

    fn on_game_start(&mut self, start: GameStart) -> Result<(), ActionError> {
        if Some(start.player_id) != self.me {
            warn!(target: "network", "Received the hand of player {}", start.player_id);
            return Ok(());
        }
        let cards = match self.session.deck.cards_from_clues(&start.clues) {
            Ok(cards) => cards,
            Err(e) => {
                error!(target: "deck", "Cannot read the dealt hand: {}", e);
                return Err(e.into());
            }
        };

        self.start_game()?;
        if let Some(me) = self.session.players.get_mut(&start.player_id) {
            me.cards = cards.clone();
        }
        self.view.notify(ViewEvent::GameStarted {
            turn: start.turn,
            cards,
        });
        Ok(())
    }

    fn on_char_update(&mut self, update: CharUpdate) -> Result<(), ActionError> {
        let player = self
            .session
            .players
            .get_mut(&update.player_id)
            .ok_or(ActionError::UnknownPlayer(update.player_id))?;
        player.character = update.character;
        if let Some(room) = update.room {
            player.current_room = room;
        }
        self.view.notify(ViewEvent::CharacterChanged {
            player_id: update.player_id,
            character: update.character,
        });
        Ok(())
    }

    fn on_win_lose(&mut self, result: WinLose) -> Result<(), ActionError> {
        let WinLose { player_id, outcome } = result;
        match outcome {
            GameOverType::Win => {
                self.session.is_game_over = true;
                self.reveals.clear();
                info!(target: "engine", "Player {} won", player_id);
            }
            GameOverType::Lose => {
                let player = self
                    .session
                    .players
                    .get_mut(&player_id)
                    .ok_or(ActionError::UnknownPlayer(player_id))?;
                player.is_active = false;
                info!(target: "engine", "Player {} is out", player_id);
            }
            GameOverType::Error => {
                warn!(target: "engine", "Player {} dropped out of the game", player_id);
            }
        }

        let status = match outcome {
            GameOverType::Win => Some(PlayerStatus::Won),
            GameOverType::Lose => Some(PlayerStatus::Lost),
            GameOverType::Error => None,
        };
        if let Some(status) = status {
            self.view
                .notify(ViewEvent::PlayerStatus { player_id, status });
        }
        self.view
            .notify(ViewEvent::GameOver { player_id, outcome });
        Ok(())
    }
}

impl<L: HostLink, V: GuestView> Engine for GuestEngine<L, V> {
    type Inbound = ToClient;

    fn session(&self) -> &Session {
        &self.session
    }

    fn dispatch(&mut self, packet: ToClient) {
        let id = packet.message_id();
        debug!(target: "network", "{} from the host", id);

        let result = match packet {
            ToClient::Connect(p) => self.on_connect(p),
            ToClient::ConnectForward(p) => {
                self.on_player_joined(p);
                Ok(())
            }
            ToClient::Disconnect(p) => {
                info!(target: "network", "Host disconnected: {}", p.reason);
                self.view
                    .notify(ViewEvent::Disconnected { reason: p.reason });
                self.link.shut_down();
                Ok(())
            }
            ToClient::ClientDrop(p) => self.remove_player(p.player_id),
            ToClient::Ready(p) => self.set_player_ready(p.player_id, p.is_ready),
            ToClient::Chat(p) => {
                let name = self.session.player_name(p.player_id).unwrap_or("?");
                info!(target: "chat", "[{}] {}", name, p.message);
                self.view.notify(ViewEvent::Chat {
                    player_id: p.player_id,
                    message: p.message,
                });
                Ok(())
            }
            ToClient::GameStart(p) => self.on_game_start(p),
            ToClient::Turn(p) => {
                self.set_turn(p.turn, p.action);
                Ok(())
            }
            ToClient::CharUpdate(p) => self.on_char_update(p),
            ToClient::MoveToRoom(p) => self.move_player(p.player_id, p.room, p.is_forced_move),
            ToClient::Guess(p) => self.guess(p.player_id, p.is_final, p.character, p.weapon, p.room),
            ToClient::Reveal(p) => self.reveal(p.send_id, p.recv_id, p.card),
            ToClient::WinLose(p) => self.on_win_lose(p),
        };

        if let Err(e) = result {
            warn!(target: "engine", "Could not apply {}: {}", id, e);
        }
    }

    fn start_game(&mut self) -> Result<(), ActionError> {
        if self.session.is_game_started {
            return Err(ActionError::GameStarted);
        }
        self.session.begin(self.session.players.len());
        self.last_guess = None;
        self.reveals.clear();
        info!(target: "engine", "Game started with {} players", self.session.players.len());
        Ok(())
    }

    fn set_turn(&mut self, turn: PlayerId, action: TurnAction) {
        self.session.replace_turn(turn, action);
        if action == TurnAction::MoveRoom {
            self.last_guess = None;
        }

        let (holder, others) = PlayerStatus::for_action(action);
        let statuses = self
            .session
            .players
            .values()
            .filter(|p| p.is_active)
            .map(|p| (p.player_id, if p.player_id == turn { holder } else { others }))
            .collect::<Vec<_>>();
        self.view.notify(ViewEvent::TurnChanged {
            player_id: turn,
            action,
            is_self: self.me == Some(turn),
        });
        for (player_id, status) in statuses {
            self.view
                .notify(ViewEvent::PlayerStatus { player_id, status });
        }
    }

    fn set_player_ready(&mut self, player_id: PlayerId, is_ready: bool) -> Result<(), ActionError> {
        let player = self
            .session
            .players
            .get_mut(&player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        player.is_ready = is_ready;
        let status = if is_ready {
            PlayerStatus::Ready
        } else {
            PlayerStatus::NotReady
        };
        self.view
            .notify(ViewEvent::PlayerStatus { player_id, status });
        Ok(())
    }

    fn remove_player(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        if self.session.is_game_started {
            return Err(ActionError::GameStarted);
        }
        self.session
            .players
            .remove(&player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        self.session.resize(self.session.players.len());
        self.view.notify(ViewEvent::PlayerLeft { player_id });
        info!(target: "engine", "Player {} left", player_id);
        Ok(())
    }

    fn move_player(
        &mut self,
        player_id: PlayerId,
        room: RoomType,
        is_forced_move: bool,
    ) -> Result<(), ActionError> {
        let player = self
            .session
            .players
            .get_mut(&player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        player.current_room = room;
        self.view.notify(ViewEvent::CharacterMoved {
            player_id,
            room,
            is_forced_move,
        });
        Ok(())
    }

    fn guess(
        &mut self,
        player_id: PlayerId,
        is_final: bool,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        self.view.notify(ViewEvent::Guessed {
            player_id,
            is_final,
            character,
            weapon,
            room,
        });
        if is_final || self.me == Some(player_id) {
            return Ok(());
        }

        self.last_guess = Some(Guess {
            player_id,
            is_final,
            character,
            weapon,
            room,
        });
        let is_active = self.my_player().map_or(false, |p| p.is_active);
        let cards = self.cards_to_reveal();
        if is_active && !cards.is_empty() {
            self.view.notify(ViewEvent::RevealRequested {
                guesser: player_id,
                cards,
            });
        }
        Ok(())
    }

    fn reveal(
        &mut self,
        send_id: PlayerId,
        recv_id: PlayerId,
        card: ClueCard,
    ) -> Result<(), ActionError> {
        if Some(recv_id) != self.me {
            return Err(ActionError::NotRevealTarget(recv_id));
        }
        let card = self
            .session
            .deck
            .find_card(&card)
            .ok_or(DeckError::UnknownCard(card))?;

        match self.reveals.push(Reveal {
            send_id,
            recv_id,
            card,
        }) {
            Ok(Some(reveal)) => self.view.notify(ViewEvent::CardRevealed {
                from: reveal.send_id,
                card: reveal.card,
            }),
            Ok(None) => {
                debug!(target: "engine", "Reveal from player {} waits its turn", send_id)
            }
            Err(dropped) => error!(
                target: "engine",
                "Too many reveals waiting, dropped the one from player {}",
                dropped.send_id
            ),
        }
        Ok(())
    }

    fn shut_down(&mut self) {
        if let Some(player_id) = self.me {
            self.link
                .send_message(ToServer::Disconnect(PlayerRef { player_id }));
        }
        self.link.shut_down();
        info!(target: "engine", "Left the session");
    }
}
