use std::collections::HashMap;

use itertools::Itertools;
use manor_core::{
    card::ClueCard,
    engine::{GuestView, ViewEvent},
    game_state::{GameOverType, PlayerId, TurnAction},
};

pub struct CliView {
    name: String,
    names: HashMap<PlayerId, String>,
}

// the short names are the ones the command parser accepts
fn card_list(cards: &[ClueCard]) -> String {
    cards
        .iter()
        .map(|card| match card {
            ClueCard::Character(c) => c.to_string(),
            ClueCard::Weapon(w) => w.to_string(),
            ClueCard::Room(r) => r.to_string(),
        })
        .join(", ")
}

impl CliView {
    pub fn new(name: &str) -> Self {
        CliView {
            name: name.to_string(),
            names: HashMap::new(),
        }
    }

    fn name(&self, player_id: PlayerId) -> String {
        self.names
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| format!("Player {}", player_id))
    }

    pub fn describe(&mut self, event: &ViewEvent) -> Option<String> {
        let line = match event {
            ViewEvent::Connected {
                player_id,
                is_accepted: true,
                character,
            } => {
                self.names.insert(*player_id, self.name.clone());
                match character {
                    Some(c) => format!("Welcome {}, you are playing {}", self.name, c),
                    None => format!("Welcome {}", self.name),
                }
            }
            ViewEvent::Connected { .. } => "The host turned you away".to_string(),
            ViewEvent::PlayerJoined {
                player_id,
                name,
                character,
            } => {
                self.names.insert(*player_id, name.clone());
                format!("{} joined as {}", name, character)
            }
            ViewEvent::PlayerLeft { player_id } => {
                let line = format!("{} left", self.name(*player_id));
                self.names.remove(player_id);
                line
            }
            ViewEvent::PlayerStatus { .. } => return None,
            ViewEvent::CharacterChanged {
                player_id,
                character,
            } => format!("{} now plays {}", self.name(*player_id), character),
            ViewEvent::GameStarted { turn, cards } => format!(
                "The game is on! {} goes first. Your cards: {}",
                self.name(*turn),
                card_list(cards)
            ),
            ViewEvent::TurnChanged {
                action, is_self: true, ..
            } => match action {
                TurnAction::MoveRoom => "Your turn: \\move <room>".to_string(),
                TurnAction::MakeGuess => {
                    "Make a suggestion with \\guess or accuse with \\accuse".to_string()
                }
                TurnAction::RevealCards => "Waiting for the others to show cards".to_string(),
                TurnAction::Idle => "Type \\done to end your turn".to_string(),
            },
            ViewEvent::TurnChanged {
                player_id,
                action: TurnAction::MoveRoom,
                ..
            } => format!("It is {}'s turn", self.name(*player_id)),
            ViewEvent::TurnChanged { .. } => return None,
            ViewEvent::CharacterMoved {
                player_id,
                room,
                is_forced_move,
            } => {
                if *is_forced_move {
                    format!("{} was summoned to the {}", self.name(*player_id), room)
                } else {
                    format!("{} moved to the {}", self.name(*player_id), room)
                }
            }
            ViewEvent::Guessed {
                player_id,
                is_final,
                character,
                weapon,
                room,
            } => format!(
                "{} {} {} with the {} in the {}",
                self.name(*player_id),
                if *is_final { "accuses" } else { "suggests" },
                character,
                weapon,
                room
            ),
            ViewEvent::RevealRequested { guesser, cards } => format!(
                "Show {} one of: {} (\\reveal <card>)",
                self.name(*guesser),
                card_list(cards)
            ),
            ViewEvent::CardRevealed { from, card } => format!(
                "{} showed you {}. Type \\ack when done",
                self.name(*from),
                card
            ),
            ViewEvent::GameOver { player_id, outcome } => match outcome {
                GameOverType::Win => format!("{} solved the case!", self.name(*player_id)),
                GameOverType::Lose => format!("{} accused wrongly and is out", self.name(*player_id)),
                GameOverType::Error => format!("{} dropped out of the game", self.name(*player_id)),
            },
            ViewEvent::Chat { player_id, message } => {
                format!("[{}] {}", self.name(*player_id), message)
            }
            ViewEvent::Disconnected { reason } => format!("Disconnected: {}", reason),
        };
        Some(line)
    }
}

impl GuestView for CliView {
    fn notify(&mut self, event: ViewEvent) {
        if let Some(line) = self.describe(&event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli_view::CliView;
    use manor_core::{
        card::{CharacterType, ClueCard, RoomType, WeaponType},
        engine::ViewEvent,
        game_state::{GameOverType, PlayerStatus, TurnAction},
    };

    #[test]
    fn joined_players_should_be_named_afterwards() {
        let mut view = CliView::new("ann");
        view.describe(&ViewEvent::PlayerJoined {
            player_id: 2,
            name: "bob".to_string(),
            character: CharacterType::Green,
        });
        assert_eq!(
            view.describe(&ViewEvent::GameOver {
                player_id: 2,
                outcome: GameOverType::Win
            }),
            Some("bob solved the case!".to_string())
        );
    }

    #[test]
    fn status_changes_should_stay_quiet() {
        let mut view = CliView::new("ann");
        assert_eq!(
            view.describe(&ViewEvent::PlayerStatus {
                player_id: 0,
                status: PlayerStatus::Waiting
            }),
            None
        );
    }

    #[test]
    fn own_turn_should_prompt_for_the_next_step() {
        let mut view = CliView::new("ann");
        let line = view
            .describe(&ViewEvent::TurnChanged {
                player_id: 0,
                action: TurnAction::MoveRoom,
                is_self: true,
            })
            .unwrap();
        assert!(line.contains("\\move"));
    }

    #[test]
    fn reveal_request_should_list_the_candidates() {
        let mut view = CliView::new("ann");
        let line = view
            .describe(&ViewEvent::RevealRequested {
                guesser: 1,
                cards: vec![
                    ClueCard::Weapon(WeaponType::Rope),
                    ClueCard::Room(RoomType::Hall),
                ],
            })
            .unwrap();
        assert!(line.starts_with("Show Player 1"));
        assert!(line.contains("Rope"));
        assert!(line.contains("Hall"));
    }
}
