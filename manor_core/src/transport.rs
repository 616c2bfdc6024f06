use crate::{
    game_state::PlayerId,
    packet::{ToClient, ToServer},
};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Audience {
    All,
    AllExcept(PlayerId),
}

impl Audience {
    pub fn includes(&self, player_id: PlayerId) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => *excluded != player_id,
        }
    }
}

/// Delivery primitives the host engine needs from the network layer. The
/// layer underneath must deliver packets to each guest reliably and in the
/// order they were sent.
pub trait Transport {
    fn send_message(&mut self, player_id: PlayerId, packet: ToClient);
    fn broadcast(&mut self, audience: Audience, packet: ToClient);
    fn shut_down(&mut self);
}

pub trait HostLink {
    fn send_message(&mut self, packet: ToServer);
    fn shut_down(&mut self);
}
