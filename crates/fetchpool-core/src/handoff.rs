//! Zero-capacity handoff channel with an explicit close.
//!
//! A receiver waiting in [`HandoffReceiver::recv`] parks a one-shot slot on a
//! ticket queue. [`HandoffSender::send`] pops the oldest ticket and fills it,
//! so a send completes only when some receiver is ready for the value. Nothing
//! is ever buffered.
//!
//! Closing drops the ticket queue: every parked receiver wakes with `None`,
//! later receives return `None` at once, and later sends hand the value back.
//! Any number of receivers may observe the close; it happens once.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

type Ticket<T> = oneshot::Sender<T>;

/// Creates a connected sender/receiver pair. Both halves are cloneable.
pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    // Unbounded is fine: each receiver parks at most one ticket at a time.
    let (tickets_tx, tickets_rx) = mpsc::unbounded_channel();
    let sender = HandoffSender {
        shared: Arc::new(Shared {
            tickets: Mutex::new(Some(tickets_rx)),
        }),
    };
    let receiver = HandoffReceiver {
        tickets: tickets_tx,
    };
    (sender, receiver)
}

struct Shared<T> {
    /// `None` once closed.
    tickets: Mutex<Option<mpsc::UnboundedReceiver<Ticket<T>>>>,
}

/// Returned by [`HandoffSender::send`] when the value could not be handed
/// over: the channel is closed or every receiver is gone. Carries the value
/// back to the caller.
pub struct HandoffClosed<T>(pub T);

impl<T> HandoffClosed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for HandoffClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandoffClosed(..)")
    }
}

impl<T> fmt::Display for HandoffClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handoff channel closed")
    }
}

impl<T> std::error::Error for HandoffClosed<T> {}

/// Producing half.
pub struct HandoffSender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> HandoffSender<T> {
    /// Waits until a receiver is ready, then hands `value` to it.
    ///
    /// Concurrent senders are served one at a time. Do not hold a send open
    /// across [`close`](Self::close): close waits for in-progress sends.
    pub async fn send(&self, value: T) -> Result<(), HandoffClosed<T>> {
        let mut value = value;
        let mut tickets = self.shared.tickets.lock().await;
        loop {
            let Some(queue) = tickets.as_mut() else {
                return Err(HandoffClosed(value));
            };
            let Some(slot) = queue.recv().await else {
                // every receiver dropped
                return Err(HandoffClosed(value));
            };
            match slot.send(value) {
                Ok(()) => return Ok(()),
                // That receiver stopped waiting; offer it to the next one.
                Err(returned) => value = returned,
            }
        }
    }

    /// Closes the channel. Returns `true` if this call closed it and `false`
    /// if it was already closed.
    pub async fn close(&self) -> bool {
        let queue = self.shared.tickets.lock().await.take();
        queue.is_some()
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.tickets.lock().await.is_none()
    }
}

/// Consuming half.
pub struct HandoffReceiver<T> {
    tickets: mpsc::UnboundedSender<Ticket<T>>,
}

impl<T> Clone for HandoffReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            tickets: self.tickets.clone(),
        }
    }
}

impl<T> HandoffReceiver<T> {
    /// Waits for the next value. `None` means closed; since nothing is
    /// buffered, closed is always also empty.
    ///
    /// # Cancel safety
    ///
    /// Not cancel safe. Dropping the future before a sender picks its slot is
    /// harmless: the sender skips the stale slot and offers the value to the
    /// next receiver. Dropping it after the slot was filled loses that value,
    /// even though `send` already returned `Ok`. Do not race `recv` inside
    /// `select!` or under a timeout.
    pub async fn recv(&self) -> Option<T> {
        let (slot, filled) = oneshot::channel();
        self.tickets.send(slot).ok()?;
        filled.await.ok()
    }
}
