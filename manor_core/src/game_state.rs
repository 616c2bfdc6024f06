use crate::card::{CharacterType, ClueCard, RoomType, WeaponType};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub type PlayerId = usize;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Display, Serialize, Deserialize)]
pub enum TurnAction {
    Idle,
    MoveRoom,
    MakeGuess,
    RevealCards,
}

/// The single turn pointer shared by the whole session. Replaced wholesale,
/// never patched field by field.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub turn: PlayerId,
    pub action: TurnAction,
    pub num_players: usize,
}

impl GameState {
    pub fn new(num_players: usize) -> Self {
        GameState {
            turn: 0,
            action: TurnAction::Idle,
            num_players,
        }
    }

    pub fn is_phase(&self, player_id: PlayerId, action: TurnAction) -> bool {
        self.turn == player_id && self.action == action
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Display, Serialize, Deserialize)]
pub enum GameOverType {
    Win,
    Lose,
    Error,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Display)]
pub enum PlayerStatus {
    NotReady,
    Ready,
    Waiting,
    Moving,
    Guessing,
    Revealing,
    EndingTurn,
    Won,
    Lost,
}

impl PlayerStatus {
    pub fn for_action(action: TurnAction) -> (PlayerStatus, PlayerStatus) {
        match action {
            TurnAction::MoveRoom => (PlayerStatus::Moving, PlayerStatus::Waiting),
            TurnAction::MakeGuess => (PlayerStatus::Guessing, PlayerStatus::Waiting),
            TurnAction::RevealCards => (PlayerStatus::Waiting, PlayerStatus::Revealing),
            TurnAction::Idle => (PlayerStatus::EndingTurn, PlayerStatus::Waiting),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub player_name: String,
    pub character: CharacterType,
    pub cards: Vec<ClueCard>,
    pub current_room: RoomType,
    pub is_active: bool,
    pub is_ready: bool,
}

impl PlayerState {
    pub fn new(
        player_id: PlayerId,
        player_name: String,
        character: CharacterType,
        current_room: RoomType,
    ) -> Self {
        PlayerState {
            player_id,
            player_name,
            character,
            cards: vec![],
            current_room,
            is_active: true,
            is_ready: false,
        }
    }

    pub fn holds(&self, card: &ClueCard) -> bool {
        self.cards.contains(card)
    }

    pub fn matching_cards(
        &self,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> Vec<ClueCard> {
        self.cards
            .iter()
            .filter(|c| c.matches_guess(character, weapon, room))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        card::{CharacterType, ClueCard, RoomType, WeaponType},
        game_state::{GameState, PlayerState, PlayerStatus, TurnAction},
    };

    #[test]
    fn new_player_should_be_active_and_not_ready() {
        let player = PlayerState::new(
            0,
            "Foo".to_string(),
            CharacterType::Green,
            RoomType::ConservatoryToBallroom,
        );
        assert!(player.is_active);
        assert!(!player.is_ready);
        assert!(player.cards.is_empty());
    }

    #[test]
    fn is_phase_should_match_turn_and_action() {
        let state = GameState {
            turn: 2,
            action: TurnAction::MakeGuess,
            num_players: 3,
        };
        assert!(state.is_phase(2, TurnAction::MakeGuess));
        assert!(!state.is_phase(1, TurnAction::MakeGuess));
        assert!(!state.is_phase(2, TurnAction::MoveRoom));
    }

    #[test]
    fn matching_cards_should_return_only_guessed_values() {
        let mut player =
            PlayerState::new(1, "Bar".to_string(), CharacterType::Plum, RoomType::Study);
        player.cards = vec![
            ClueCard::Weapon(WeaponType::Rope),
            ClueCard::Room(RoomType::Kitchen),
            ClueCard::Character(CharacterType::White),
        ];
        assert_eq!(
            player.matching_cards(CharacterType::White, WeaponType::Dagger, RoomType::Kitchen),
            vec![
                ClueCard::Room(RoomType::Kitchen),
                ClueCard::Character(CharacterType::White)
            ]
        );
    }

    #[test]
    fn reveal_phase_should_mark_everybody_else_as_revealing() {
        assert_eq!(
            PlayerStatus::for_action(TurnAction::RevealCards),
            (PlayerStatus::Waiting, PlayerStatus::Revealing)
        );
        assert_eq!(
            PlayerStatus::for_action(TurnAction::Idle),
            (PlayerStatus::EndingTurn, PlayerStatus::Waiting)
        );
    }
}
