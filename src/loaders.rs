use std::sync::mpsc::Sender;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::local_store::LocalStore;
use crate::profile::ProfileStatsWidget;
use crate::runtime::ZoneEvent;
use crate::visitor_client::VisitorClient;

/// Background network work for one zone session. Every task watches the same
/// cancellation token; [`Loaders::shutdown`] (or drop) cancels and aborts them.
#[derive(Debug, Default)]
pub struct Loaders {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Loaders {
    /// No background work, for offline sessions
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn spawn(
        rt: &Handle,
        visitors: VisitorClient,
        profile: Arc<ProfileStatsWidget<dyn LocalStore>>,
        store: Arc<dyn LocalStore>,
        tx: Sender<ZoneEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(2);

        let visitors_tx = tx.clone();
        let visitors_cancel = cancel.clone();
        tasks.push(rt.spawn(async move {
            let count = visitors.track(&*store, &visitors_cancel).await;
            if visitors_tx.send(ZoneEvent::Visitors(count)).is_err() {
                debug!("zone closed before visitor count arrived");
            }
        }));

        let profile_cancel = cancel.clone();
        tasks.push(rt.spawn(async move {
            let resolved = profile.refresh(&profile_cancel).await;
            if tx.send(ZoneEvent::Profile(resolved)).is_err() {
                debug!("zone closed before profile stats arrived");
            }
        }));

        Self { cancel, tasks }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Loaders {
    fn drop(&mut self) {
        self.shutdown();
    }
}
