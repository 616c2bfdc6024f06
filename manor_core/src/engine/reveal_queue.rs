use std::collections::VecDeque;

/// Hands reveals to the UI one at a time.
pub struct RevealQueue<T> {
    in_flight: Option<T>,
    backlog: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RevealQueue<T> {
    pub fn new(capacity: usize) -> Self {
        RevealQueue {
            in_flight: None,
            backlog: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `Ok(Some(item))` when the item should be shown right away,
    /// `Ok(None)` when it was queued behind the one in flight, and gives the
    /// item back when the backlog is full.
    pub fn push(&mut self, item: T) -> Result<Option<T>, T> {
        if self.in_flight.is_none() {
            self.in_flight = Some(item.clone());
            return Ok(Some(item));
        }
        if self.backlog.len() >= self.capacity {
            return Err(item);
        }
        self.backlog.push_back(item);
        Ok(None)
    }

    pub fn acknowledge(&mut self) -> Option<T> {
        self.in_flight = self.backlog.pop_front();
        self.in_flight.clone()
    }

    pub fn in_flight(&self) -> Option<&T> {
        self.in_flight.as_ref()
    }

    pub fn waiting(&self) -> usize {
        self.backlog.len()
    }

    pub fn clear(&mut self) {
        self.in_flight = None;
        self.backlog.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::reveal_queue::RevealQueue;

    #[test]
    fn first_item_should_be_released_immediately() {
        let mut queue = RevealQueue::new(2);
        assert_eq!(queue.push("a"), Ok(Some("a")));
        assert_eq!(queue.in_flight(), Some(&"a"));
    }

    #[test]
    fn later_items_should_wait_for_acknowledgement() {
        let mut queue = RevealQueue::new(2);
        queue.push("a").unwrap();
        assert_eq!(queue.push("b"), Ok(None));
        assert_eq!(queue.push("c"), Ok(None));
        assert_eq!(queue.waiting(), 2);

        assert_eq!(queue.acknowledge(), Some("b"));
        assert_eq!(queue.acknowledge(), Some("c"));
        assert_eq!(queue.acknowledge(), None);
        assert_eq!(queue.in_flight(), None);
    }

    #[test]
    fn push_should_hand_back_items_beyond_capacity() {
        let mut queue = RevealQueue::new(1);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        assert_eq!(queue.push(3), Err(3));
    }

    #[test]
    fn acknowledged_queue_should_release_the_next_push_immediately() {
        let mut queue = RevealQueue::new(1);
        queue.push(1).unwrap();
        queue.acknowledge();
        assert_eq!(queue.push(2), Ok(Some(2)));
    }
}
