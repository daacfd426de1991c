use crate::domain::model::{OutboundEmail, Registration};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Remote list-store holding registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn save(&self, registration: &Registration) -> Result<()>;
    async fn list_all(&self) -> Result<Vec<Registration>>;
}

/// One transactional-email API. A call is a single attempt: no retries.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// One text-generation API, unwrapped to plain text.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type DynRegistrationStore = Arc<dyn RegistrationStore>;
pub type DynEmailProvider = Arc<dyn EmailProvider>;
pub type DynContentBackend = Arc<dyn ContentBackend>;
pub type DynClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
