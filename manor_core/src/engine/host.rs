use super::{ActionError, Engine, Session};
use crate::{
    board::Board,
    card::{CharacterType, ClueCard, RoomType, WeaponType},
    deck::{DeckConfig, SOLUTION_SIZE},
    game_state::{GameOverType, PlayerId, PlayerState, TurnAction, MAX_PLAYERS, MIN_PLAYERS},
    packet::{
        CharUpdate, Chat, ConnectResponse, Disconnect, GameStart, Guess, MoveToRoom, PlayerJoined,
        PlayerRef, Ready, Reveal, ToClient, ToServer, Turn, WinLose,
    },
    transport::{Audience, Transport},
    utils::share_per_part,
};
use itertools::Itertools;
use log::{debug, error, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;
use strum::IntoEnumIterator;

pub const MAX_NAME_LEN: usize = 64;

pub struct HostEngine<T: Transport, B: Board> {
    session: Session,
    transport: T,
    board: B,
    rng: StdRng,
    pending_reveals: Vec<PlayerId>,
    // seats whose current connection was accepted
    connected: BTreeSet<PlayerId>,
}

impl<T: Transport, B: Board> HostEngine<T, B> {
    pub fn new(transport: T, board: B, deck: DeckConfig) -> Self {
        Self::with_rng(transport, board, deck, StdRng::from_entropy())
    }

    pub fn with_rng(transport: T, board: B, deck: DeckConfig, rng: StdRng) -> Self {
        HostEngine {
            session: Session::new(deck),
            transport,
            board,
            rng,
            pending_reveals: vec![],
            connected: BTreeSet::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn pending_reveals(&self) -> &[PlayerId] {
        &self.pending_reveals
    }

    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<CharacterType, ActionError> {
        if self.session.is_game_started {
            return Err(ActionError::GameStarted);
        }
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(ActionError::InvalidName);
        }
        if self.session.players.values().any(|p| p.player_name == name) {
            return Err(ActionError::DuplicateName(name.to_string()));
        }
        if self.session.players.len() >= MAX_PLAYERS {
            return Err(ActionError::SessionFull);
        }
        if self.session.players.contains_key(&player_id) {
            return Err(ActionError::SeatTaken(player_id));
        }

        let character = CharacterType::iter()
            .find(|c| self.session.players.values().all(|p| p.character != *c))
            .ok_or(ActionError::SessionFull)?;
        let room = self.board.starting_room(character);
        self.session.players.insert(
            player_id,
            PlayerState::new(player_id, name.to_string(), character, room),
        );
        self.session.resize(self.session.players.len());
        self.connected.insert(player_id);

        info!(target: "engine", "{} joined as {} in seat {}", name, character, player_id);
        Ok(character)
    }

    pub fn connect(&mut self, player_id: PlayerId, name: &str) -> Result<(), ActionError> {
        let character = match self.add_player(player_id, name) {
            Ok(character) => character,
            Err(e) => {
                self.transport.send_message(
                    player_id,
                    ToClient::Connect(ConnectResponse {
                        is_accepted: false,
                        player_id,
                        name: name.to_string(),
                        character: None,
                        room: None,
                    }),
                );
                return Err(e);
            }
        };

        let joined = self.joined(player_id);
        let others = self
            .session
            .players
            .keys()
            .filter(|&&id| id != player_id)
            .map(|&id| self.joined(id))
            .collect_vec();
        let ready = self
            .session
            .players
            .values()
            .filter(|p| p.is_ready)
            .map(|p| p.player_id)
            .collect_vec();

        self.transport.send_message(
            player_id,
            ToClient::Connect(ConnectResponse {
                is_accepted: true,
                player_id,
                name: joined.name.clone(),
                character: Some(character),
                room: Some(joined.room),
            }),
        );
        self.transport.broadcast(
            Audience::AllExcept(player_id),
            ToClient::ConnectForward(joined),
        );
        for other in others {
            self.transport
                .send_message(player_id, ToClient::ConnectForward(other));
        }
        for id in ready {
            self.transport.send_message(
                player_id,
                ToClient::Ready(Ready {
                    player_id: id,
                    is_ready: true,
                }),
            );
        }
        Ok(())
    }

    pub fn update_character(
        &mut self,
        player_id: PlayerId,
        character: CharacterType,
    ) -> Result<(), ActionError> {
        if self.session.is_game_started {
            return Err(ActionError::GameStarted);
        }
        if !self.session.players.contains_key(&player_id) {
            return Err(ActionError::UnknownPlayer(player_id));
        }
        if self
            .session
            .players
            .values()
            .any(|p| p.character == character)
        {
            return Err(ActionError::CharacterTaken(character));
        }

        let room = self.board.starting_room(character);
        if let Some(player) = self.session.players.get_mut(&player_id) {
            player.character = character;
            player.current_room = room;
        }
        self.transport.broadcast(
            Audience::All,
            ToClient::CharUpdate(CharUpdate {
                player_id,
                character,
                room: Some(room),
            }),
        );
        info!(target: "engine", "Player {} is now playing {}", player_id, character);
        Ok(())
    }

    pub fn chat(&mut self, player_id: PlayerId, message: &str) -> Result<(), ActionError> {
        let name = self
            .session
            .player_name(player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        info!(target: "chat", "[{}] {}", name, message);
        self.transport.broadcast(
            Audience::All,
            ToClient::Chat(Chat {
                player_id,
                message: message.to_string(),
            }),
        );
        Ok(())
    }

    pub fn end_turn(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        self.check_in_play()?;
        if self.session.state.turn != player_id {
            return Err(ActionError::NotYourTurn(player_id));
        }
        self.advance_turn();
        Ok(())
    }

    /// Passes the turn to the next seat, skipping at most one inactive
    /// player.
    pub fn advance_turn(&mut self) {
        let num_players = self.session.state.num_players;
        if num_players == 0 {
            return;
        }
        let mut next = (self.session.state.turn + 1) % num_players;
        if self
            .session
            .players
            .get(&next)
            .map_or(false, |p| !p.is_active)
        {
            next = (next + 1) % num_players;
        }
        self.pending_reveals.clear();
        self.set_turn(next, TurnAction::MoveRoom);
    }

    fn joined(&self, player_id: PlayerId) -> PlayerJoined {
        let player = &self.session.players[&player_id];
        PlayerJoined {
            player_id,
            name: player.player_name.clone(),
            character: player.character,
            room: player.current_room,
        }
    }

    fn check_in_play(&self) -> Result<(), ActionError> {
        if self.session.is_game_over {
            return Err(ActionError::GameOver);
        }
        if !self.session.is_game_started {
            return Err(ActionError::GameNotStarted);
        }
        Ok(())
    }

    fn check_phase(&self, player_id: PlayerId, action: TurnAction) -> Result<(), ActionError> {
        let state = &self.session.state;
        if state.turn != player_id {
            return Err(ActionError::NotYourTurn(player_id));
        }
        if state.action != action {
            return Err(ActionError::WrongPhase(state.action));
        }
        Ok(())
    }

    fn reveal_order(
        &self,
        guesser: PlayerId,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Vec<PlayerId> {
        let players = &self.session.players;
        players
            .range(guesser + 1..)
            .chain(players.range(..guesser))
            .map(|(_, p)| p)
            .filter(|p| p.is_active)
            .filter(|p| p.cards.iter().any(|c| c.matches_guess(character, weapon, room)))
            .map(|p| p.player_id)
            .collect()
    }

    fn suggest(
        &mut self,
        player_id: PlayerId,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        self.check_phase(player_id, TurnAction::MakeGuess)?;

        self.transport.broadcast(
            Audience::All,
            ToClient::Guess(Guess {
                player_id,
                is_final: false,
                character,
                weapon,
                room,
            }),
        );
        info!(
            target: "engine",
            "Player {} suggests {} with the {} in the {}",
            player_id, character, weapon, room
        );

        self.pending_reveals = self.reveal_order(player_id, character, weapon, room);
        if self.pending_reveals.is_empty() {
            info!(target: "engine", "Nobody can answer the suggestion");
            self.set_turn(player_id, TurnAction::Idle);
        } else {
            self.set_turn(player_id, TurnAction::RevealCards);
        }

        let accused = self
            .session
            .players
            .values()
            .filter(|p| p.player_id != player_id && p.character == character)
            .map(|p| p.player_id)
            .collect_vec();
        for id in accused {
            self.move_player(id, room, true)?;
        }
        Ok(())
    }

    fn accuse(
        &mut self,
        player_id: PlayerId,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Result<(), ActionError> {
        if self.session.state.turn != player_id {
            return Err(ActionError::NotYourTurn(player_id));
        }
        if self.session.player(player_id).map_or(false, |p| !p.is_active) {
            return Err(ActionError::Eliminated(player_id));
        }
        info!(
            target: "engine",
            "Player {} accuses {} with the {} in the {}",
            player_id, character, weapon, room
        );

        if self.session.deck.is_correct_guess(character, weapon, room) {
            self.declare_winner(player_id);
            return Ok(());
        }

        if let Some(player) = self.session.players.get_mut(&player_id) {
            player.is_active = false;
        }
        self.transport.broadcast(
            Audience::All,
            ToClient::WinLose(WinLose {
                player_id,
                outcome: GameOverType::Lose,
            }),
        );
        info!(target: "engine", "Player {} accused wrongly and is out", player_id);

        let active = self
            .session
            .players
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.player_id)
            .collect_vec();
        match active.len() {
            0 => {
                info!(target: "engine", "Nobody is left to solve the case");
                self.end_session();
            }
            1 => {
                let last = active[0];
                info!(target: "engine", "Player {} is the last one standing", last);
                self.declare_winner(last);
            }
            _ => self.advance_turn(),
        }
        Ok(())
    }

    fn declare_winner(&mut self, player_id: PlayerId) {
        self.transport.broadcast(
            Audience::All,
            ToClient::WinLose(WinLose {
                player_id,
                outcome: GameOverType::Win,
            }),
        );
        if let Some(name) = self.session.player_name(player_id) {
            info!(target: "engine", "{} solved the case", name);
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        self.session.is_game_over = true;
        self.pending_reveals.clear();
    }
}

fn check_sender(actual: PlayerId, claimed: PlayerId) -> Result<(), ActionError> {
    if actual != claimed {
        return Err(ActionError::WrongSender { claimed, actual });
    }
    Ok(())
}

impl<T: Transport, B: Board> Engine for HostEngine<T, B> {
    type Inbound = (PlayerId, ToServer);

    fn session(&self) -> &Session {
        &self.session
    }

    fn dispatch(&mut self, (from, packet): (PlayerId, ToServer)) {
        let id = packet.message_id();
        debug!(target: "network", "{} from player {}", id, from);

        let result = match packet {
            ToServer::Connect(p) => self.connect(from, &p.name),
            _ if !self.connected.contains(&from) => Err(ActionError::UnknownPlayer(from)),
            ToServer::Disconnect(p) => {
                check_sender(from, p.player_id).and_then(|_| self.remove_player(from))
            }
            ToServer::Ready(p) => check_sender(from, p.player_id)
                .and_then(|_| self.set_player_ready(from, p.is_ready)),
            ToServer::Chat(p) => {
                check_sender(from, p.player_id).and_then(|_| self.chat(from, &p.message))
            }
            ToServer::GameStart(p) => {
                check_sender(from, p.player_id).and_then(|_| self.start_game())
            }
            ToServer::CharUpdate(p) => check_sender(from, p.player_id)
                .and_then(|_| self.update_character(from, p.character)),
            // guests never get to force a move
            ToServer::MoveToRoom(p) => check_sender(from, p.player_id)
                .and_then(|_| self.move_player(from, p.room, false)),
            ToServer::Guess(p) => check_sender(from, p.player_id).and_then(|_| {
                self.guess(from, p.is_final, p.character, p.weapon, p.room)
            }),
            ToServer::Reveal(p) => check_sender(from, p.send_id)
                .and_then(|_| self.reveal(from, p.recv_id, p.card)),
            ToServer::TurnDone(p) => {
                check_sender(from, p.player_id).and_then(|_| self.end_turn(from))
            }
        };

        if let Err(e) = result {
            warn!(target: "engine", "Rejected {} from player {}: {}", id, from, e);
        }
    }

    fn start_game(&mut self) -> Result<(), ActionError> {
        if self.session.is_game_started {
            return Err(ActionError::GameStarted);
        }
        let num_players = self.session.players.len();
        if num_players < MIN_PLAYERS {
            return Err(ActionError::NotEnoughPlayers(num_players));
        }
        if let Some(gap) = (0..num_players).find(|id| !self.session.players.contains_key(id)) {
            return Err(ActionError::SeatGap(gap));
        }

        if let Err(e) = self.session.deck.initialize(&mut self.rng) {
            error!(target: "deck", "Cannot build the deck: {}", e);
            return Err(e.into());
        }
        self.session.begin(num_players);
        self.pending_reveals.clear();
        for card in self.session.deck.correct_cards() {
            debug!(target: "deck", "Solution card: {}", card);
        }

        let per_player = share_per_part(
            self.session.deck.total_cards().saturating_sub(SOLUTION_SIZE),
            num_players,
        );
        let mut moves = vec![];
        for player in self.session.players.values_mut() {
            player.cards = self.session.deck.get_cards(per_player);
            player.current_room = self.board.starting_room(player.character);
            player.is_active = true;
            moves.push(MoveToRoom {
                player_id: player.player_id,
                room: player.current_room,
                is_forced_move: false,
            });
        }
        for m in moves {
            self.transport.broadcast(Audience::All, ToClient::MoveToRoom(m));
        }

        let turn = self.rng.gen_range(0..num_players);
        let hands = self
            .session
            .players
            .values()
            .map(|p| (p.player_id, self.session.deck.clues_from_cards(&p.cards)))
            .collect_vec();
        for (player_id, clues) in hands {
            match clues {
                Ok(clues) => self.transport.send_message(
                    player_id,
                    ToClient::GameStart(GameStart {
                        player_id,
                        turn,
                        clues,
                    }),
                ),
                Err(e) => {
                    error!(target: "deck", "Cannot describe player {}'s hand: {}", player_id, e)
                }
            }
        }

        info!(
            target: "engine",
            "Game started with {} players holding {} cards each",
            num_players, per_player
        );
        self.set_turn(turn, TurnAction::MoveRoom);
        Ok(())
    }

    fn set_turn(&mut self, turn: PlayerId, action: TurnAction) {
        self.session.replace_turn(turn, action);
        self.transport
            .broadcast(Audience::All, ToClient::Turn(Turn { turn, action }));
    }

    fn set_player_ready(&mut self, player_id: PlayerId, is_ready: bool) -> Result<(), ActionError> {
        let player = self
            .session
            .players
            .get_mut(&player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        player.is_ready = is_ready;
        self.transport.broadcast(
            Audience::All,
            ToClient::Ready(Ready {
                player_id,
                is_ready,
            }),
        );

        if !self.session.is_game_started && self.session.players.values().all(|p| p.is_ready) {
            if let Err(e) = self.start_game() {
                warn!(target: "engine", "Everybody is ready but the game cannot start: {}", e);
            }
        }
        Ok(())
    }

    /// Before the game a leaving player frees the seat. Once cards are dealt
    /// the seat stays taken so the turn order holds, and the others are told
    /// the game broke for that player.
    fn remove_player(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        if !self.session.players.contains_key(&player_id) {
            return Err(ActionError::UnknownPlayer(player_id));
        }
        self.connected.remove(&player_id);

        if self.session.is_game_started {
            warn!(target: "engine", "Player {} left during the game", player_id);
            self.transport.broadcast(
                Audience::AllExcept(player_id),
                ToClient::WinLose(WinLose {
                    player_id,
                    outcome: GameOverType::Error,
                }),
            );
            return Ok(());
        }

        self.session.players.remove(&player_id);
        self.session.resize(self.session.players.len());
        self.transport.broadcast(
            Audience::AllExcept(player_id),
            ToClient::ClientDrop(PlayerRef { player_id }),
        );
        info!(target: "engine", "Player {} left the lobby", player_id);
        Ok(())
    }

    fn move_player(
        &mut self,
        player_id: PlayerId,
        room: RoomType,
        is_forced_move: bool,
    ) -> Result<(), ActionError> {
        let from = self
            .session
            .players
            .get(&player_id)
            .map(|p| p.current_room)
            .ok_or(ActionError::UnknownPlayer(player_id))?;

        if !is_forced_move {
            self.check_in_play()?;
            self.check_phase(player_id, TurnAction::MoveRoom)?;
            if !self.board.is_valid_move(from, room) {
                return Err(ActionError::InvalidMove { from, to: room });
            }
        }

        if let Some(player) = self.session.players.get_mut(&player_id) {
            player.current_room = room;
        }
        self.transport.broadcast(
            Audience::All,
            ToClient::MoveToRoom(MoveToRoom {
                player_id,
                room,
                is_forced_move,
            }),
        );

        if is_forced_move {
            info!(target: "engine", "Player {} was summoned to the {}", player_id, room);
            return Ok(());
        }
        info!(target: "engine", "Player {} moved from {} to {}", player_id, from, room);
        let next = if self.board.is_guess_room(room) {
            TurnAction::MakeGuess
        } else {
            TurnAction::Idle
        };
        self.set_turn(player_id, next);
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
        self.check_in_play()?;
        if !self.session.players.contains_key(&player_id) {
            return Err(ActionError::UnknownPlayer(player_id));
        }
        if is_final {
            self.accuse(player_id, character, weapon, room)
        } else {
            self.suggest(player_id, character, weapon, room)
        }
    }

    fn reveal(
        &mut self,
        send_id: PlayerId,
        recv_id: PlayerId,
        card: ClueCard,
    ) -> Result<(), ActionError> {
        self.check_in_play()?;
        let state = self.session.state;
        if state.turn != recv_id {
            return Err(ActionError::NotRevealTarget(recv_id));
        }
        if state.action != TurnAction::RevealCards {
            return Err(ActionError::WrongPhase(state.action));
        }
        if !self.pending_reveals.contains(&send_id) {
            return Err(ActionError::NotPendingReveal(send_id));
        }
        let holds = self
            .session
            .players
            .get(&send_id)
            .map_or(false, |p| p.holds(&card));
        if !holds {
            return Err(ActionError::CardNotHeld {
                player: send_id,
                card,
            });
        }

        self.pending_reveals.retain(|&id| id != send_id);
        self.transport.send_message(
            recv_id,
            ToClient::Reveal(Reveal {
                send_id,
                recv_id,
                card,
            }),
        );
        info!(target: "engine", "Player {} showed a card to player {}", send_id, recv_id);

        if self.pending_reveals.is_empty() {
            self.set_turn(recv_id, TurnAction::Idle);
        }
        Ok(())
    }

    fn shut_down(&mut self) {
        self.transport.broadcast(
            Audience::All,
            ToClient::Disconnect(Disconnect {
                reason: "the host closed the session".to_string(),
            }),
        );
        self.transport.shut_down();
        info!(target: "engine", "Session closed");
    }
}
