use crate::card::{CharacterType, RoomType};

/// Board topology queried by the host. The engines only ask yes/no questions
/// of it and never look at the layout themselves.
pub trait Board {
    fn starting_room(&self, character: CharacterType) -> RoomType;
    fn is_valid_move(&self, from: RoomType, to: RoomType) -> bool;
    fn is_guess_room(&self, room: RoomType) -> bool;
}

// (hallway, one end, other end)
const HALLWAYS: [(RoomType, RoomType, RoomType); 12] = [
    (RoomType::StudyToHall, RoomType::Study, RoomType::Hall),
    (RoomType::HallToLounge, RoomType::Hall, RoomType::Lounge),
    (RoomType::StudyToLibrary, RoomType::Study, RoomType::Library),
    (RoomType::HallToBilliard, RoomType::Hall, RoomType::BilliardRoom),
    (RoomType::LoungeToDining, RoomType::Lounge, RoomType::DiningRoom),
    (RoomType::LibraryToBilliard, RoomType::Library, RoomType::BilliardRoom),
    (RoomType::BilliardToDining, RoomType::BilliardRoom, RoomType::DiningRoom),
    (RoomType::LibraryToConservatory, RoomType::Library, RoomType::Conservatory),
    (RoomType::BilliardToBallroom, RoomType::BilliardRoom, RoomType::Ballroom),
    (RoomType::DiningToKitchen, RoomType::DiningRoom, RoomType::Kitchen),
    (RoomType::ConservatoryToBallroom, RoomType::Conservatory, RoomType::Ballroom),
    (RoomType::BallroomToKitchen, RoomType::Ballroom, RoomType::Kitchen),
];

const SECRET_PASSAGES: [(RoomType, RoomType); 2] = [
    (RoomType::Study, RoomType::Kitchen),
    (RoomType::Lounge, RoomType::Conservatory),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicBoard;

impl Board for ClassicBoard {
    fn starting_room(&self, character: CharacterType) -> RoomType {
        match character {
            CharacterType::Scarlet => RoomType::HallToLounge,
            CharacterType::Mustard => RoomType::LoungeToDining,
            CharacterType::White => RoomType::BallroomToKitchen,
            CharacterType::Green => RoomType::ConservatoryToBallroom,
            CharacterType::Peacock => RoomType::LibraryToConservatory,
            CharacterType::Plum => RoomType::StudyToLibrary,
        }
    }

    fn is_valid_move(&self, from: RoomType, to: RoomType) -> bool {
        let through_hallway = HALLWAYS.iter().any(|&(hallway, a, b)| {
            (from == hallway && (to == a || to == b)) || (to == hallway && (from == a || from == b))
        });
        let through_passage = SECRET_PASSAGES
            .iter()
            .any(|&(a, b)| (from == a && to == b) || (from == b && to == a));
        through_hallway || through_passage
    }

    fn is_guess_room(&self, room: RoomType) -> bool {
        !room.is_hallway()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        board::{Board, ClassicBoard},
        card::{CharacterType, RoomType},
    };
    use strum::IntoEnumIterator;

    #[test]
    fn hallway_should_lead_to_both_rooms() {
        let board = ClassicBoard;
        assert!(board.is_valid_move(RoomType::HallToLounge, RoomType::Hall));
        assert!(board.is_valid_move(RoomType::HallToLounge, RoomType::Lounge));
        assert!(!board.is_valid_move(RoomType::HallToLounge, RoomType::Kitchen));
    }

    #[test]
    fn room_should_lead_into_its_hallways() {
        let board = ClassicBoard;
        let exits = RoomType::iter()
            .filter(|r| board.is_valid_move(RoomType::BilliardRoom, *r))
            .count();
        assert_eq!(exits, 4);
        assert!(!board.is_valid_move(RoomType::BilliardRoom, RoomType::Hall));
    }

    #[test]
    fn secret_passages_should_join_opposite_corners() {
        let board = ClassicBoard;
        assert!(board.is_valid_move(RoomType::Kitchen, RoomType::Study));
        assert!(board.is_valid_move(RoomType::Lounge, RoomType::Conservatory));
        assert!(!board.is_valid_move(RoomType::Hall, RoomType::Ballroom));
    }

    #[test]
    fn every_character_should_start_in_a_distinct_hallway() {
        let board = ClassicBoard;
        let starts: std::collections::HashSet<RoomType> =
            CharacterType::iter().map(|c| board.starting_room(c)).collect();
        assert_eq!(starts.len(), 6);
        assert!(starts.iter().all(|r| r.is_hallway()));
        assert!(starts.iter().all(|r| !board.is_guess_room(*r)));
    }
}
