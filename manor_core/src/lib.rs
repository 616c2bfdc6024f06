pub mod board;
pub mod card;
pub mod deck;
pub mod engine;
pub mod game_state;
pub mod packet;
pub mod transport;
pub mod utils;
