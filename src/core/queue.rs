use crate::core::mailer::Mailer;
use crate::domain::model::Registration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Hand-off point between the submission path and the welcome-email worker.
/// Enqueueing is in-process and never reports failure to the caller.
#[derive(Clone)]
pub struct WelcomeQueue {
    tx: mpsc::UnboundedSender<Registration>,
}

impl WelcomeQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Registration>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue plus a spawned worker draining it through `mailer`.
    pub fn spawn(mailer: Arc<Mailer>) -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::channel();
        let handle = tokio::spawn(run_worker(rx, mailer));
        (queue, handle)
    }

    pub fn enqueue(&self, registration: Registration) {
        let email = registration.email.clone();
        match self.tx.send(registration) {
            Ok(()) => tracing::debug!("Welcome email queued for {}", email),
            Err(_) => tracing::error!("Welcome worker is gone, dropping email for {}", email),
        }
    }
}

pub async fn run_worker(mut rx: mpsc::UnboundedReceiver<Registration>, mailer: Arc<Mailer>) {
    while let Some(registration) = rx.recv().await {
        // outcome is logged inside the mailer
        let _ = mailer.send_welcome(&registration).await;
    }
    tracing::debug!("Welcome queue closed, worker exiting");
}

/// Waits up to `grace` for the worker to send what is already queued.
/// The queue must be closed first. Returns false if welcomes were abandoned.
pub async fn drain(worker: JoinHandle<()>, grace: Duration) -> bool {
    match tokio::time::timeout(grace, worker).await {
        Ok(Ok(())) => {
            tracing::info!("📭 Welcome queue drained");
            true
        }
        Ok(Err(e)) => {
            tracing::error!("❌ Welcome worker failed: {}", e);
            false
        }
        Err(_) => {
            tracing::warn!(
                "Welcome queue not drained within {}s, pending welcome emails abandoned",
                grace.as_secs()
            );
            false
        }
    }
}
