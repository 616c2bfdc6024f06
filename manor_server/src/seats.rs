use manor_core::{game_state::PlayerId, packet::ToClient};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Maps network clients to session seats. A new client always gets the
/// lowest free seat so that seats stay contiguous while the lobby fills.
/// Once hands are dealt the map is sealed and nobody new gets a seat.
pub struct SeatMap<C> {
    capacity: usize,
    is_sealed: bool,
    by_client: HashMap<C, PlayerId>,
    by_seat: BTreeMap<PlayerId, C>,
}

impl<C: Copy + Eq + Hash> SeatMap<C> {
    pub fn new(capacity: usize) -> Self {
        SeatMap {
            capacity,
            is_sealed: false,
            by_client: HashMap::new(),
            by_seat: BTreeMap::new(),
        }
    }

    pub fn assign(&mut self, client: C) -> Option<PlayerId> {
        if let Some(&seat) = self.by_client.get(&client) {
            return Some(seat);
        }
        if self.is_sealed {
            return None;
        }
        let seat = (0..self.capacity).find(|seat| !self.by_seat.contains_key(seat))?;
        self.by_client.insert(client, seat);
        self.by_seat.insert(seat, client);
        Some(seat)
    }

    pub fn release(&mut self, client: C) -> Option<PlayerId> {
        let seat = self.by_client.remove(&client)?;
        self.by_seat.remove(&seat);
        Some(seat)
    }

    pub fn seat(&self, client: C) -> Option<PlayerId> {
        self.by_client.get(&client).copied()
    }

    pub fn client(&self, seat: PlayerId) -> Option<C> {
        self.by_seat.get(&seat).copied()
    }

    pub fn is_sealed(&self) -> bool {
        self.is_sealed
    }

    /// Follows a packet on its way to `seat`. Returns the client to drop
    /// when the host turned its connect request away.
    pub fn on_reply(&mut self, seat: PlayerId, packet: &ToClient) -> Option<C> {
        match packet {
            ToClient::GameStart(_) => {
                self.is_sealed = true;
                None
            }
            ToClient::Connect(response) if !response.is_accepted => self.client(seat),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, C)> + '_ {
        self.by_seat.iter().map(|(&seat, &client)| (seat, client))
    }
}
