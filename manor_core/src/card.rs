use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CharacterType {
    #[strum(message = "Miss Scarlet")]
    Scarlet,
    #[strum(message = "Colonel Mustard")]
    Mustard,
    #[strum(message = "Mrs. White")]
    White,
    #[strum(message = "Mr. Green")]
    Green,
    #[strum(message = "Mrs. Peacock")]
    Peacock,
    #[strum(message = "Professor Plum")]
    Plum,
}

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum WeaponType {
    #[strum(message = "Candlestick")]
    Candlestick,
    #[strum(message = "Dagger")]
    Dagger,
    #[strum(message = "Lead Pipe")]
    LeadPipe,
    #[strum(message = "Revolver")]
    Revolver,
    #[strum(message = "Rope")]
    Rope,
    #[strum(message = "Wrench")]
    Wrench,
}

/// Every place a character can stand: the nine rooms of the mansion and the
/// hallways joining neighbouring rooms.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum RoomType {
    #[strum(message = "Study")]
    Study,
    #[strum(message = "Hall")]
    Hall,
    #[strum(message = "Lounge")]
    Lounge,
    #[strum(message = "Library")]
    Library,
    #[strum(message = "Billiard Room")]
    BilliardRoom,
    #[strum(message = "Dining Room")]
    DiningRoom,
    #[strum(message = "Conservatory")]
    Conservatory,
    #[strum(message = "Ballroom")]
    Ballroom,
    #[strum(message = "Kitchen")]
    Kitchen,
    StudyToHall,
    HallToLounge,
    StudyToLibrary,
    HallToBilliard,
    LoungeToDining,
    LibraryToBilliard,
    BilliardToDining,
    LibraryToConservatory,
    BilliardToBallroom,
    DiningToKitchen,
    ConservatoryToBallroom,
    BallroomToKitchen,
}

impl RoomType {
    pub fn is_hallway(&self) -> bool {
        *self >= RoomType::StudyToHall
    }

    pub fn rooms() -> impl Iterator<Item = RoomType> {
        RoomType::iter().filter(|r| !r.is_hallway())
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Display, Serialize, Deserialize)]
pub enum ClueType {
    Character,
    Weapon,
    Room,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum ClueCard {
    Character(CharacterType),
    Weapon(WeaponType),
    Room(RoomType),
}

impl ClueCard {
    pub fn clue_type(&self) -> ClueType {
        match self {
            ClueCard::Character(_) => ClueType::Character,
            ClueCard::Weapon(_) => ClueType::Weapon,
            ClueCard::Room(_) => ClueType::Room,
        }
    }

    pub fn character(&self) -> Option<CharacterType> {
        match self {
            ClueCard::Character(c) => Some(*c),
            _ => None,
        }
    }

    pub fn weapon(&self) -> Option<WeaponType> {
        match self {
            ClueCard::Weapon(w) => Some(*w),
            _ => None,
        }
    }

    pub fn room(&self) -> Option<RoomType> {
        match self {
            ClueCard::Room(r) => Some(*r),
            _ => None,
        }
    }

    pub fn matches_guess(
        &self,
        character: CharacterType,
        weapon: WeaponType,
        room: RoomType,
    ) -> bool {
        self.character() == Some(character)
            || self.weapon() == Some(weapon)
            || self.room() == Some(room)
    }

    pub fn name(&self) -> &'static str {
        let message = match self {
            ClueCard::Character(c) => c.get_message(),
            ClueCard::Weapon(w) => w.get_message(),
            ClueCard::Room(r) => r.get_message(),
        };
        message.unwrap_or("Unknown card")
    }
}

impl fmt::Display for ClueCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use crate::card::{CharacterType, ClueCard, ClueType, RoomType, WeaponType};
    use std::str::FromStr;

    #[test]
    fn rooms_should_exclude_hallways() {
        let rooms: Vec<RoomType> = RoomType::rooms().collect();
        assert_eq!(rooms.len(), 9);
        assert!(rooms.iter().all(|r| !r.is_hallway()));
        assert!(RoomType::BallroomToKitchen.is_hallway());
    }

    #[test]
    fn card_should_expose_only_its_own_category() {
        let card = ClueCard::Weapon(WeaponType::Rope);
        assert_eq!(card.clue_type(), ClueType::Weapon);
        assert_eq!(card.weapon(), Some(WeaponType::Rope));
        assert_eq!(card.character(), None);
        assert_eq!(card.room(), None);
    }

    #[test]
    fn matches_guess_should_check_each_category() {
        let card = ClueCard::Room(RoomType::Kitchen);
        assert!(card.matches_guess(CharacterType::Plum, WeaponType::Rope, RoomType::Kitchen));
        assert!(!card.matches_guess(CharacterType::Plum, WeaponType::Rope, RoomType::Hall));
    }

    #[test]
    fn parsing_should_ignore_case() {
        assert_eq!(CharacterType::from_str("mustard"), Ok(CharacterType::Mustard));
        assert_eq!(WeaponType::from_str("LEADPIPE"), Ok(WeaponType::LeadPipe));
    }

    #[test]
    fn card_name_should_use_full_title() {
        assert_eq!(
            ClueCard::Character(CharacterType::Plum).to_string(),
            "Professor Plum"
        );
    }
}
