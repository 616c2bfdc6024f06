use std::{
    io::{self, BufRead},
    str::FromStr,
    sync::mpsc::{channel, Receiver},
    thread,
};

use itertools::Itertools;
use manor_core::{
    card::{CharacterType, ClueCard, RoomType, WeaponType},
    engine::{ActionError, GuestEngine, GuestView},
    transport::HostLink,
};
use thiserror::Error;

pub static HELP: &str = "
*** Manor ***
Find out who did it, with what and where. Commands:
  \\ready / \\unready              toggle your ready flag in the lobby
  \\start                         start the game right away
  \\char <character>              pick another character before the game
  \\move <room>                   move to an adjacent room or hallway
  \\guess <character> <weapon> <room>   make a suggestion
  \\accuse <character> <weapon> <room>  make the final accusation
  \\reveal <card>                 show one of your cards to the guesser
  \\ack                           dismiss the card you were shown
  \\done                          end your turn
  \\cards                         list your hand
  \\help                          show this text
  \\quit                          leave the session
Anything else is sent as chat.";

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Help,
    Cards,
    Ready(bool),
    Start,
    Character(CharacterType),
    Move(RoomType),
    Guess(CharacterType, WeaponType, RoomType),
    Accuse(CharacterType, WeaponType, RoomType),
    Reveal(ClueCard),
    Acknowledge,
    Done,
    Chat(String),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("unknown command {0}, try \\help")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a character, weapon or room")]
    UnknownName(String),
}

fn parse_name<T: FromStr>(name: &str) -> Result<T, ParseCommandError> {
    T::from_str(name).map_err(|_| ParseCommandError::UnknownName(name.to_string()))
}

fn parse_card(name: &str) -> Result<ClueCard, ParseCommandError> {
    if let Ok(c) = CharacterType::from_str(name) {
        Ok(ClueCard::Character(c))
    } else if let Ok(w) = WeaponType::from_str(name) {
        Ok(ClueCard::Weapon(w))
    } else if let Ok(r) = RoomType::from_str(name) {
        Ok(ClueCard::Room(r))
    } else {
        Err(ParseCommandError::UnknownName(name.to_string()))
    }
}

fn parse_triple(
    args: &[&str],
    usage: &'static str,
) -> Result<(CharacterType, WeaponType, RoomType), ParseCommandError> {
    match args {
        [c, w, r] => Ok((parse_name(c)?, parse_name(w)?, parse_name(r)?)),
        _ => Err(ParseCommandError::Usage(usage)),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let Some(rest) = line.strip_prefix('\\') else {
            return Ok(Command::Chat(line.to_string()));
        };
        let words = rest.split_whitespace().collect_vec();
        let Some((&name, args)) = words.split_first() else {
            return Err(ParseCommandError::Unknown(line.to_string()));
        };

        match (name, args) {
            ("quit", []) | ("q", []) => Ok(Command::Quit),
            ("help", []) => Ok(Command::Help),
            ("cards", []) => Ok(Command::Cards),
            ("ready", []) => Ok(Command::Ready(true)),
            ("unready", []) => Ok(Command::Ready(false)),
            ("start", []) => Ok(Command::Start),
            ("char", [c]) => Ok(Command::Character(parse_name(c)?)),
            ("char", _) => Err(ParseCommandError::Usage("\\char <character>")),
            ("move", [r]) => Ok(Command::Move(parse_name(r)?)),
            ("move", _) => Err(ParseCommandError::Usage("\\move <room>")),
            ("guess", args) => {
                let (c, w, r) = parse_triple(args, "\\guess <character> <weapon> <room>")?;
                Ok(Command::Guess(c, w, r))
            }
            ("accuse", args) => {
                let (c, w, r) = parse_triple(args, "\\accuse <character> <weapon> <room>")?;
                Ok(Command::Accuse(c, w, r))
            }
            ("reveal", [card]) => Ok(Command::Reveal(parse_card(card)?)),
            ("reveal", _) => Err(ParseCommandError::Usage("\\reveal <card>")),
            ("ack", []) => Ok(Command::Acknowledge),
            ("done", []) => Ok(Command::Done),
            _ => Err(ParseCommandError::Unknown(line.to_string())),
        }
    }
}

impl Command {
    /// Turns a command into an intent on the engine. Commands that only
    /// concern the terminal are handled by the caller.
    pub fn apply<L: HostLink, V: GuestView>(
        self,
        engine: &mut GuestEngine<L, V>,
    ) -> Result<(), ActionError> {
        match self {
            Command::Ready(is_ready) => engine.request_ready(is_ready),
            Command::Start => engine.request_start(),
            Command::Character(c) => engine.request_character(c),
            Command::Move(r) => engine.request_move(r),
            Command::Guess(c, w, r) => engine.request_guess(c, w, r),
            Command::Accuse(c, w, r) => engine.request_accusation(c, w, r),
            Command::Reveal(card) => engine.request_reveal(card),
            Command::Acknowledge => {
                engine.acknowledge_reveal();
                Ok(())
            }
            Command::Done => engine.request_end_turn(),
            Command::Chat(message) => engine.send_chat(&message),
            Command::Quit | Command::Help | Command::Cards => Ok(()),
        }
    }
}

pub fn spawn_reader() -> Receiver<String> {
    let (sender, receiver) = channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}
