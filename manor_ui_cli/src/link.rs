use manor_core::{packet::ToServer, transport::HostLink};

/// Encoded frames waiting for the next network tick.
#[derive(Default)]
pub struct OutboundQueue {
    frames: Vec<Vec<u8>>,
    is_closed: bool,
}

impl OutboundQueue {
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }
}

impl HostLink for OutboundQueue {
    fn send_message(&mut self, packet: ToServer) {
        self.frames.push(packet.encode());
    }

    fn shut_down(&mut self) {
        self.is_closed = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::link::OutboundQueue;
    use manor_core::{
        packet::{PlayerRef, ToServer},
        transport::HostLink,
    };

    #[test]
    fn drain_should_hand_over_frames_once() {
        let mut queue = OutboundQueue::default();
        let packet = ToServer::TurnDone(PlayerRef { player_id: 1 });
        queue.send_message(packet.clone());

        let frames = queue.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(ToServer::decode(&frames[0]).unwrap(), packet);
        assert!(queue.drain().is_empty());
        assert!(!queue.is_closed());
    }
}
