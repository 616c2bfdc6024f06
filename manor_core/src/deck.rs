use crate::card::{CharacterType, ClueCard, ClueType, RoomType, WeaponType};
use itertools::Itertools;
use log::debug;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::IntoEnumIterator;
use thiserror::Error;

pub const SOLUTION_SIZE: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("{0} is not part of this deck")]
    UnknownCard(ClueCard),
    #[error("the {0} pool is empty")]
    EmptyPool(ClueType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub characters: Vec<ClueCard>,
    pub weapons: Vec<ClueCard>,
    pub rooms: Vec<ClueCard>,
}

impl DeckConfig {
    pub fn standard() -> Self {
        DeckConfig {
            characters: CharacterType::iter().map(ClueCard::Character).collect(),
            weapons: WeaponType::iter().map(ClueCard::Weapon).collect(),
            rooms: RoomType::rooms().map(ClueCard::Room).collect(),
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig::standard()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clues {
    pub characters: Vec<CharacterType>,
    pub weapons: Vec<WeaponType>,
    pub rooms: Vec<RoomType>,
}

#[derive(Debug, Clone, Copy)]
struct Solution {
    character: ClueCard,
    weapon: ClueCard,
    room: ClueCard,
}

impl Solution {
    fn contains(&self, card: &ClueCard) -> bool {
        *card == self.character || *card == self.weapon || *card == self.room
    }
}

pub struct CardDeck {
    config: DeckConfig,
    solution: Option<Solution>,
    remaining: VecDeque<ClueCard>,
}

impl CardDeck {
    pub fn new(config: DeckConfig) -> Self {
        CardDeck {
            config,
            solution: None,
            remaining: VecDeque::new(),
        }
    }

    pub fn total_cards(&self) -> usize {
        self.config.characters.len() + self.config.weapons.len() + self.config.rooms.len()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Withholds a random solution card per category and queues the rest in
    /// uniformly shuffled order.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DeckError> {
        self.remaining.clear();
        let solution = Solution {
            character: *self
                .config
                .characters
                .choose(rng)
                .ok_or(DeckError::EmptyPool(ClueType::Character))?,
            weapon: *self
                .config
                .weapons
                .choose(rng)
                .ok_or(DeckError::EmptyPool(ClueType::Weapon))?,
            room: *self
                .config
                .rooms
                .choose(rng)
                .ok_or(DeckError::EmptyPool(ClueType::Room))?,
        };

        let mut cards = self
            .config
            .characters
            .iter()
            .chain(self.config.weapons.iter())
            .chain(self.config.rooms.iter())
            .copied()
            .collect_vec();
        cards.shuffle(rng);
        self.remaining
            .extend(cards.into_iter().filter(|c| !solution.contains(c)));
        self.solution = Some(solution);

        debug!(target: "deck", "deck initialized, {} cards to deal", self.remaining.len());
        Ok(())
    }

    pub fn get_cards(&mut self, count: usize) -> Vec<ClueCard> {
        let count = count.min(self.remaining.len());
        self.remaining.drain(..count).collect()
    }

    /// The withheld cards in character, weapon, room order. Empty before the
    /// deck has been initialized.
    pub fn correct_cards(&self) -> Vec<ClueCard> {
        self.solution
            .map(|s| vec![s.character, s.weapon, s.room])
            .unwrap_or_default()
    }

    pub fn is_correct_guess(
        &self,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> bool {
        let Some(solution) = &self.solution else {
            return false;
        };
        // a solution card of the wrong category cannot be matched, so it does not count against the guess
        solution.character.character().map_or(true, |c| c == character)
            && solution.weapon.weapon().map_or(true, |w| w == weapon)
            && solution.room.room().map_or(true, |r| r == room)
    }

    pub fn clues_from_cards(&self, cards: &[ClueCard]) -> Result<Clues, DeckError> {
        let mut clues = Clues::default();
        for card in cards {
            if !self.contains(card) {
                return Err(DeckError::UnknownCard(*card));
            }
            match card {
                ClueCard::Character(c) => clues.characters.push(*c),
                ClueCard::Weapon(w) => clues.weapons.push(*w),
                ClueCard::Room(r) => clues.rooms.push(*r),
            }
        }
        Ok(clues)
    }

    pub fn cards_from_clues(&self, clues: &Clues) -> Result<Vec<ClueCard>, DeckError> {
        let characters = clues.characters.iter().map(|&c| {
            self.character_card(c)
                .ok_or(DeckError::UnknownCard(ClueCard::Character(c)))
        });
        let weapons = clues.weapons.iter().map(|&w| {
            self.weapon_card(w)
                .ok_or(DeckError::UnknownCard(ClueCard::Weapon(w)))
        });
        let rooms = clues
            .rooms
            .iter()
            .map(|&r| self.room_card(r).ok_or(DeckError::UnknownCard(ClueCard::Room(r))));
        characters.chain(weapons).chain(rooms).collect()
    }

    pub fn character_card(&self, character: CharacterType) -> Option<ClueCard> {
        self.config
            .characters
            .iter()
            .find(|c| c.character() == Some(character))
            .copied()
    }

    pub fn weapon_card(&self, weapon: WeaponType) -> Option<ClueCard> {
        self.config
            .weapons
            .iter()
            .find(|c| c.weapon() == Some(weapon))
            .copied()
    }

    pub fn room_card(&self, room: RoomType) -> Option<ClueCard> {
        self.config
            .rooms
            .iter()
            .find(|c| c.room() == Some(room))
            .copied()
    }

    pub fn find_card(&self, card: &ClueCard) -> Option<ClueCard> {
        match card {
            ClueCard::Character(c) => self.character_card(*c),
            ClueCard::Weapon(w) => self.weapon_card(*w),
            ClueCard::Room(r) => self.room_card(*r),
        }
    }

    fn contains(&self, card: &ClueCard) -> bool {
        self.config.characters.contains(card)
            || self.config.weapons.contains(card)
            || self.config.rooms.contains(card)
    }
}
