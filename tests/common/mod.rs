#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vision_mailer::core::{ContentBackend, EmailProvider, OutboundEmail, Registration, RegistrationStore};
use vision_mailer::domain::model::ReminderDay;
use vision_mailer::{MailerError, Result};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn registration(email: &str, day: ReminderDay) -> Registration {
    Registration {
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or_default().to_string(),
        goals: "Aprender Rust".to_string(),
        reminder_day: day,
    }
}

pub struct MemoryStore {
    pub accept: bool,
    pub rows: Mutex<Vec<Registration>>,
}

impl MemoryStore {
    pub fn accepting(rows: Vec<Registration>) -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            rows: Mutex::new(rows),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            accept: false,
            rows: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn save(&self, registration: &Registration) -> Result<()> {
        if !self.accept {
            return Err(MailerError::store("Sheet unavailable"));
        }
        self.rows.lock().unwrap().push(registration.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Registration>> {
        if !self.accept {
            return Err(MailerError::store("Sheet unavailable"));
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

pub struct ScriptedProvider {
    pub name: String,
    pub healthy: bool,
    pub log: CallLog,
}

impl ScriptedProvider {
    pub fn new(name: &str, healthy: bool, log: &CallLog) -> Arc<dyn EmailProvider> {
        Arc::new(Self {
            name: name.to_string(),
            healthy,
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl EmailProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, email.to));
        if self.healthy {
            Ok(())
        } else {
            Err(MailerError::ProviderError {
                provider: self.name.clone(),
                status: 500,
                detail: "down".to_string(),
            })
        }
    }
}

pub struct ScriptedBackend {
    pub name: String,
    pub reply: Option<String>,
    pub log: CallLog,
}

impl ScriptedBackend {
    pub fn new(name: &str, reply: Option<&str>, log: &CallLog) -> Arc<dyn ContentBackend> {
        Arc::new(Self {
            name: name.to_string(),
            reply: reply.map(str::to_string),
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl ContentBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.log.lock().unwrap().push(self.name.clone());
        self.reply.clone().ok_or_else(|| MailerError::GenerationError {
            backend: self.name.clone(),
            message: "offline".to_string(),
        })
    }
}
