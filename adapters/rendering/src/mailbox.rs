use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Source of the work posted to the UI loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Rule engine output.
    Game,
    /// Network transport notifications.
    Network,
    /// Work deferred by the UI itself.
    Ui,
}

impl Channel {
    /// Every channel, in drain order.
    pub const ALL: [Self; 3] = [Self::Game, Self::Network, Self::Ui];

    const fn index(self) -> usize {
        match self {
            Self::Game => 0,
            Self::Network => 1,
            Self::Ui => 2,
        }
    }
}

/// Multi-channel queue drained by the UI loop at idle.
///
/// Each channel is FIFO. Draining empties the channels in [`Channel::ALL`]
/// order.
#[derive(Debug)]
pub struct Mailbox<M> {
    senders: [Sender<M>; 3],
    receivers: [Receiver<M>; 3],
}

/// Posting end of one mailbox channel; cheap to clone and `Send`.
#[derive(Debug)]
pub struct MailboxSender<M> {
    channel: Channel,
    sender: Sender<M>,
}

impl<M> Clone for MailboxSender<M> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel,
            sender: self.sender.clone(),
        }
    }
}

impl<M> MailboxSender<M> {
    /// Channel the sender posts to.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Posts a message. Returns `false` once the mailbox is gone.
    pub fn send(&self, message: M) -> bool {
        self.sender.send(message).is_ok()
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Mailbox<M> {
    /// Creates a mailbox with empty channels.
    #[must_use]
    pub fn new() -> Self {
        let (game_tx, game_rx) = mpsc::channel();
        let (network_tx, network_rx) = mpsc::channel();
        let (ui_tx, ui_rx) = mpsc::channel();
        Self {
            senders: [game_tx, network_tx, ui_tx],
            receivers: [game_rx, network_rx, ui_rx],
        }
    }

    /// Sender posting to a channel.
    #[must_use]
    pub fn sender(&self, channel: Channel) -> MailboxSender<M> {
        MailboxSender {
            channel,
            sender: self.senders[channel.index()].clone(),
        }
    }

    /// Moves every pending message into `out`, channel by channel.
    pub fn drain(&self, out: &mut Vec<(Channel, M)>) {
        for channel in Channel::ALL {
            let receiver = &self.receivers[channel.index()];
            loop {
                match receiver.try_recv() {
                    Ok(message) => out.push((channel, message)),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
    }
}
