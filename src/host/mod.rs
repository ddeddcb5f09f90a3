//! Host environment signals: surface visibility and network connectivity.
//!
//! The embedding application owns a [`HostHandle`] and reports changes; the
//! pipeline reads the matching [`HostSignals`].

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Backgrounded tab or minimized window
    Hidden,
}

/// Receiving side, cloned into every pipeline
#[derive(Debug, Clone)]
pub struct HostSignals {
    visibility: watch::Receiver<Visibility>,
    online: watch::Receiver<bool>,
    /// Bumped on every offline -> online edge
    recoveries: watch::Receiver<u64>,
}

/// Reporting side, kept by the embedding application
#[derive(Debug)]
pub struct HostHandle {
    visibility: watch::Sender<Visibility>,
    online: watch::Sender<bool>,
    recoveries: watch::Sender<u64>,
}

impl HostSignals {
    /// Starts visible and online.
    pub fn channel() -> (HostSignals, HostHandle) {
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let (online_tx, online_rx) = watch::channel(true);
        let (recoveries_tx, recoveries_rx) = watch::channel(0);
        (
            HostSignals {
                visibility: visibility_rx,
                online: online_rx,
                recoveries: recoveries_rx,
            },
            HostHandle {
                visibility: visibility_tx,
                online: online_tx,
                recoveries: recoveries_tx,
            },
        )
    }

    pub fn visibility(&self) -> Visibility {
        *self.visibility.borrow()
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Waits for the next offline -> online edge. Cancel safe.
    ///
    /// Returns `false` once the reporting side is gone; no edge can follow.
    pub async fn became_online(&mut self) -> bool {
        let result = self.recoveries.changed().await.is_ok();
        self.recoveries.borrow_and_update();
        result
    }
}

impl HostHandle {
    pub fn set_visibility(
        &self,
        visibility: Visibility,
    ) {
        self.visibility.send_replace(visibility);
    }

    pub fn set_online(
        &self,
        online: bool,
    ) {
        let was_online = self.online.send_replace(online);
        if online && !was_online {
            self.recoveries.send_modify(|n| *n += 1);
        }
    }
}
