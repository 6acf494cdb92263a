//! In-memory store for messages received on the echo endpoint

use parking_lot::Mutex;
use std::collections::VecDeque;
use uuid::Uuid;

/// A message accepted by the echo endpoint
#[derive(Debug, Clone)]
pub struct Message {
    /// Token assigned on receipt, unique per run
    pub id: Uuid,

    /// Text rendering of the submitted value
    pub text: String,
}

/// Bounded ring buffer of received messages.
///
/// Retention is capped at `capacity`; the oldest entry is dropped on overflow.
#[derive(Debug)]
pub struct MessageStore {
    inner: Mutex<VecDeque<Message>>,
    capacity: usize,
}

impl MessageStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Store a message and return its freshly assigned id
    pub fn store(&self, text: String) -> Uuid {
        let id = Uuid::new_v4();
        let mut messages = self.inner.lock();
        if messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(Message { id, text });
        id
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
