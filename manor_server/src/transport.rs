use log::warn;
use manor_core::{
    game_state::PlayerId,
    packet::ToClient,
    transport::{Audience, Transport},
};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug)]
pub enum Outgoing {
    To(PlayerId, ToClient),
    Broadcast(Audience, ToClient),
    ShutDown,
}

/// Host transport that hands packets to the network loop over a channel.
pub struct ChannelTransport {
    sender: UnboundedSender<Outgoing>,
}

impl ChannelTransport {
    pub fn new(sender: UnboundedSender<Outgoing>) -> Self {
        ChannelTransport { sender }
    }

    fn push(&self, outgoing: Outgoing) {
        if let Err(e) = self.sender.send(outgoing) {
            warn!(target: "network", "Network loop is gone, dropped {:?}", e.0);
        }
    }
}

impl Transport for ChannelTransport {
    fn send_message(&mut self, player_id: PlayerId, packet: ToClient) {
        self.push(Outgoing::To(player_id, packet));
    }

    fn broadcast(&mut self, audience: Audience, packet: ToClient) {
        self.push(Outgoing::Broadcast(audience, packet));
    }

    fn shut_down(&mut self) {
        self.push(Outgoing::ShutDown);
    }
}
