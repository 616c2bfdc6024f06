use manor_core::{
    board::{Board, ClassicBoard},
    card::{CharacterType, RoomType, WeaponType},
    deck::DeckConfig,
    engine::{Engine, GuestEngine, GuestView, HostEngine, ViewEvent},
    game_state::{GameOverType, PlayerId, TurnAction},
    packet::{ToClient, ToServer},
    transport::{Audience, HostLink, Transport},
};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;

#[test]
fn lobby_should_start_once_everybody_is_ready() {
    let table = started_table(3);

    let mut seen = HashSet::new();
    for (seat, guest) in table.guests.iter().enumerate() {
        assert_eq!(guest.me(), Some(seat));
        assert!(guest.session().is_game_started());
        assert_eq!(guest.state(), table.host.state());
        let hand = &guest.my_player().unwrap().cards;
        assert_eq!(hand, &table.host.session().player(seat).unwrap().cards);
        assert_eq!(hand.len(), 6);
        for card in hand {
            assert!(seen.insert(*card));
        }
    }
}

#[test]
fn guests_should_mirror_every_seated_player() {
    let table = started_table(3);

    for guest in &table.guests {
        for player in table.host.session().players() {
            let mirror = guest.session().player(player.player_id).unwrap();
            assert_eq!(mirror.player_name, player.player_name);
            assert_eq!(mirror.character, player.character);
            assert_eq!(mirror.current_room, player.current_room);
        }
    }
}

#[test]
fn suggestion_should_be_answered_only_to_the_guesser() {
    let mut table = started_table(3);
    let turn = table.host.state().turn;
    let target = table.move_turn_holder();
    assert_eq!(table.host.state().action, TurnAction::MakeGuess);

    let next = (turn + 1) % 3;
    let card = table.guests[next].my_player().unwrap().cards[0];
    table.guests[turn]
        .request_guess(
            card.character().unwrap_or(CharacterType::Plum),
            card.weapon().unwrap_or(WeaponType::Rope),
            card.room().unwrap_or(target),
        )
        .unwrap();
    table.pump();

    assert_eq!(table.host.state().action, TurnAction::RevealCards);
    let pending = table.host.pending_reveals().to_vec();
    assert!(pending.contains(&next));
    for seat in pending {
        let card = table.guests[seat].cards_to_reveal()[0];
        table.guests[seat].request_reveal(card).unwrap();
        table.pump();
    }

    assert_eq!(table.host.state().action, TurnAction::Idle);
    for (seat, guest) in table.guests.iter().enumerate() {
        assert_eq!(guest.state(), table.host.state());
        let revealed = guest
            .view()
            .events
            .iter()
            .any(|e| matches!(e, ViewEvent::CardRevealed { .. }));
        assert_eq!(revealed, seat == turn);
    }
}

#[test]
fn wrong_accusation_should_knock_out_the_accuser_everywhere() {
    let mut table = started_table(3);
    let turn = table.host.state().turn;
    let solution = table.host.session().deck().correct_cards();
    let weapon = solution[1].weapon().unwrap();
    let wrong = if weapon == WeaponType::Rope {
        WeaponType::Wrench
    } else {
        WeaponType::Rope
    };

    table.guests[turn]
        .request_accusation(
            solution[0].character().unwrap(),
            wrong,
            solution[2].room().unwrap(),
        )
        .unwrap();
    table.pump();

    assert_eq!(table.host.state().turn, (turn + 1) % 3);
    for guest in &table.guests {
        assert!(!guest.session().player(turn).unwrap().is_active);
        assert_eq!(guest.state(), table.host.state());
        assert!(guest.view().events.contains(&ViewEvent::GameOver {
            player_id: turn,
            outcome: GameOverType::Lose
        }));
    }
}

#[test]
fn correct_accusation_should_end_the_session_everywhere() {
    let mut table = started_table(2);
    let turn = table.host.state().turn;
    let solution = table.host.session().deck().correct_cards();

    table.guests[turn]
        .request_accusation(
            solution[0].character().unwrap(),
            solution[1].weapon().unwrap(),
            solution[2].room().unwrap(),
        )
        .unwrap();
    table.pump();

    assert!(table.host.session().is_game_over());
    for guest in &table.guests {
        assert!(guest.session().is_game_over());
    }
}

#[test]
fn out_of_turn_intents_should_change_nothing() {
    let mut table = started_table(3);
    let turn = table.host.state().turn;
    let before = *table.host.state();

    let other = (turn + 1) % 3;
    table.guests[other].request_end_turn().unwrap();
    table.pump();

    assert_eq!(*table.host.state(), before);
}

#[test]
fn host_shut_down_should_reach_every_guest() {
    let mut table = started_table(2);
    table.host.shut_down();
    table.pump();

    assert!(table.host.transport().is_shut_down);
    for guest in &table.guests {
        assert!(guest.link().is_shut_down);
        assert!(guest
            .view()
            .events
            .iter()
            .any(|e| matches!(e, ViewEvent::Disconnected { .. })));
    }
}

// Infra ----------------------------------------------------------------

#[derive(Default)]
struct HostWire {
    seats: Vec<PlayerId>,
    outbox: Vec<(PlayerId, Vec<u8>)>,
    is_shut_down: bool,
}

impl Transport for HostWire {
    fn send_message(&mut self, player_id: PlayerId, packet: ToClient) {
        self.outbox.push((player_id, packet.encode()));
    }

    fn broadcast(&mut self, audience: Audience, packet: ToClient) {
        let bytes = packet.encode();
        for &seat in &self.seats {
            if audience.includes(seat) {
                self.outbox.push((seat, bytes.clone()));
            }
        }
    }

    fn shut_down(&mut self) {
        self.is_shut_down = true;
    }
}

#[derive(Default)]
struct GuestWire {
    outbox: Vec<Vec<u8>>,
    is_shut_down: bool,
}

impl HostLink for GuestWire {
    fn send_message(&mut self, packet: ToServer) {
        self.outbox.push(packet.encode());
    }

    fn shut_down(&mut self) {
        self.is_shut_down = true;
    }
}

#[derive(Default)]
struct Journal {
    events: Vec<ViewEvent>,
}

impl GuestView for Journal {
    fn notify(&mut self, event: ViewEvent) {
        self.events.push(event);
    }
}

struct Table {
    host: HostEngine<HostWire, ClassicBoard>,
    guests: Vec<GuestEngine<GuestWire, Journal>>,
}

impl Table {
    fn new(count: usize) -> Self {
        let host = HostEngine::with_rng(
            HostWire::default(),
            ClassicBoard,
            DeckConfig::standard(),
            StdRng::seed_from_u64(7),
        );
        let guests = (0..count)
            .map(|_| {
                GuestEngine::new(
                    GuestWire::default(),
                    Journal::default(),
                    DeckConfig::standard(),
                )
            })
            .collect();
        let mut table = Table { host, guests };
        for seat in 0..count {
            table.host.transport_mut().seats.push(seat);
            table.guests[seat].request_connect(&format!("guest{}", seat));
            table.pump();
        }
        table
    }

    /// Delivers every queued frame through the codec until both sides are
    /// quiet.
    fn pump(&mut self) {
        loop {
            let mut is_quiet = true;
            for (seat, guest) in self.guests.iter_mut().enumerate() {
                let frames = guest.link_mut().outbox.drain(..).collect::<Vec<_>>();
                for bytes in frames {
                    is_quiet = false;
                    let packet = ToServer::decode(&bytes).expect("guest sent a bad frame");
                    self.host.dispatch((seat, packet));
                }
            }
            let frames = self
                .host
                .transport_mut()
                .outbox
                .drain(..)
                .collect::<Vec<_>>();
            for (seat, bytes) in frames {
                is_quiet = false;
                let packet = ToClient::decode(&bytes).expect("host sent a bad frame");
                self.guests[seat].dispatch(packet);
            }
            if is_quiet {
                break;
            }
        }
    }

    /// Walks the turn holder out of its hallway into an adjacent room.
    fn move_turn_holder(&mut self) -> RoomType {
        let turn = self.host.state().turn;
        let start = self.host.session().player(turn).unwrap().current_room;
        let target = RoomType::rooms()
            .find(|&room| ClassicBoard.is_valid_move(start, room))
            .unwrap();
        self.guests[turn].request_move(target).unwrap();
        self.pump();
        target
    }
}

fn started_table(count: usize) -> Table {
    let mut table = Table::new(count);
    for guest in table.guests.iter_mut() {
        guest.request_ready(true).unwrap();
    }
    table.pump();
    table
}
