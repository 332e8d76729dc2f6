//! Per-session serial context.
//!
//! The driver owns a [`Session`] and is the only thing that touches it:
//! inbound front packets and fired deferred tasks are interleaved on one
//! task, so transaction handling never races a rotation revert.

use bridge_shared::protocol::InboundPacket;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::info;

use crate::{scheduler::ScheduledTask, session::Session};

/// Inbound queue depth per session.
pub const INBOUND_CAPACITY: usize = 64;

pub struct SessionDriver {
    session: Session,
    inbound: mpsc::Receiver<InboundPacket>,
    fired: mpsc::UnboundedReceiver<ScheduledTask>,
}

impl SessionDriver {
    pub fn new(
        session: Session,
        inbound: mpsc::Receiver<InboundPacket>,
        fired: mpsc::UnboundedReceiver<ScheduledTask>,
    ) -> Self {
        Self {
            session,
            inbound,
            fired,
        }
    }

    /// Spawns the driver on the current runtime. Dropping the returned
    /// sender stops it; the join handle yields the session back.
    pub fn spawn(
        session: Session,
        fired: mpsc::UnboundedReceiver<ScheduledTask>,
    ) -> (mpsc::Sender<InboundPacket>, JoinHandle<Session>) {
        let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
        let driver = Self::new(session, rx, fired);
        (tx, tokio::spawn(driver.run()))
    }

    /// Runs until the inbound queue closes.
    pub async fn run(mut self) -> Session {
        info!(session = %self.session.name, "session driver started");
        loop {
            tokio::select! {
                packet = self.inbound.recv() => match packet {
                    Some(packet) => self.session.handle_inbound(packet),
                    None => break,
                },
                Some(task) = self.fired.recv() => self.session.run_deferred(task),
            }
        }
        info!(session = %self.session.name, "session driver stopped");
        self.session
    }
}
