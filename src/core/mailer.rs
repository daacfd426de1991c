use crate::core::dispatcher::FailoverDispatcher;
use crate::core::generator::ContentGenerator;
use crate::domain::model::{ContentContext, MessageKind, Registration, SendResult};
use crate::render;
use chrono::{DateTime, Datelike, Utc};

const TEST_CONTENT: &str =
    "Este es un email de prueba para verificar que el sistema funciona correctamente.";

/// Generate, render and dispatch one message. Every method resolves to a
/// `SendResult`; nothing here returns an error or panics.
#[derive(Clone)]
pub struct Mailer {
    generator: ContentGenerator,
    dispatcher: FailoverDispatcher,
}

impl Mailer {
    pub fn new(generator: ContentGenerator, dispatcher: FailoverDispatcher) -> Self {
        Self {
            generator,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &FailoverDispatcher {
        &self.dispatcher
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    pub async fn send_welcome(&self, registration: &Registration) -> SendResult {
        let context = ContentContext {
            name: registration.display_name.clone(),
            goals: registration.goals.clone(),
            day_name: None,
        };
        let content = self.generator.generate(MessageKind::Welcome, &context).await;

        let message = match render::render_welcome(&registration.display_name, &content, false) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Could not render welcome email for {}: {}", registration.email, e);
                return SendResult::failed(e.to_string());
            }
        };

        let result = self.dispatcher.send(&message, &registration.email).await;
        if result.success {
            tracing::info!("✅ Welcome email sent to {}", registration.email);
        } else {
            tracing::warn!(
                "⚠️ Welcome email to {} failed: {}",
                registration.email,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        result
    }

    pub async fn send_daily(&self, registration: &Registration, now: DateTime<Utc>) -> SendResult {
        let date = now.date_naive();
        let context = ContentContext {
            name: registration.display_name.clone(),
            goals: registration.goals.clone(),
            day_name: Some(render::weekday_name(date.weekday()).to_string()),
        };
        let content = self.generator.generate(MessageKind::Daily, &context).await;

        let message = match render::render_daily(
            &registration.display_name,
            &content,
            registration.reminder_day,
            date,
        ) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Could not render daily email for {}: {}", registration.email, e);
                return SendResult::failed(e.to_string());
            }
        };

        let result = self.dispatcher.send(&message, &registration.email).await;
        if result.success {
            tracing::info!("✅ Daily email sent to {}", registration.email);
        } else {
            tracing::warn!(
                "⚠️ Daily email to {} failed: {}",
                registration.email,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        result
    }

    /// Static welcome copy, no AI call. Used to check the provider chain.
    pub async fn send_test(&self, email: &str, name: &str) -> SendResult {
        match render::render_welcome(name, TEST_CONTENT, true) {
            Ok(message) => self.dispatcher.send(&message, email).await,
            Err(e) => SendResult::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatcher::tests::FakeProvider;
    use crate::core::generator::tests::FakeBackend;
    use crate::domain::model::ReminderDay;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    fn registration() -> Registration {
        Registration {
            email: "a@b.com".to_string(),
            display_name: "Ana".to_string(),
            goals: "Aprender Rust".to_string(),
            reminder_day: ReminderDay::Wednesday,
        }
    }

    #[tokio::test]
    async fn welcome_goes_through_generator_and_dispatcher() {
        let ai_calls = Arc::new(Mutex::new(Vec::new()));
        let sends = Arc::new(Mutex::new(Vec::new()));
        let mailer = Mailer::new(
            ContentGenerator::new(
                vec![FakeBackend::new("deepseek", Some("**Hola** Ana"), &ai_calls)],
                vec![],
            ),
            FailoverDispatcher::new(vec![FakeProvider::new("sendgrid", true, &sends)]),
        );

        let result = mailer.send_welcome(&registration()).await;

        assert!(result.success);
        assert_eq!(*ai_calls.lock().unwrap(), vec!["deepseek"]);
        assert_eq!(*sends.lock().unwrap(), vec!["sendgrid:a@b.com"]);
    }

    #[tokio::test]
    async fn daily_uses_daily_chain() {
        let ai_calls = Arc::new(Mutex::new(Vec::new()));
        let sends = Arc::new(Mutex::new(Vec::new()));
        let mailer = Mailer::new(
            ContentGenerator::new(
                vec![FakeBackend::new("deepseek", Some("welcome"), &ai_calls)],
                vec![FakeBackend::new("gemini", Some("daily"), &ai_calls)],
            ),
            FailoverDispatcher::new(vec![FakeProvider::new("sendgrid", true, &sends)]),
        );
        let now = Utc.with_ymd_and_hms(2026, 1, 7, 8, 0, 0).unwrap();

        let result = mailer.send_daily(&registration(), now).await;

        assert!(result.success);
        assert_eq!(*ai_calls.lock().unwrap(), vec!["gemini"]);
    }

    #[tokio::test]
    async fn send_test_skips_ai() {
        let ai_calls = Arc::new(Mutex::new(Vec::new()));
        let sends = Arc::new(Mutex::new(Vec::new()));
        let mailer = Mailer::new(
            ContentGenerator::new(
                vec![FakeBackend::new("deepseek", Some("x"), &ai_calls)],
                vec![],
            ),
            FailoverDispatcher::new(vec![
                FakeProvider::new("sendgrid", false, &sends),
                FakeProvider::new("mailjet", true, &sends),
            ]),
        );

        let result = mailer.send_test("t@b.com", "Test").await;

        assert!(result.success);
        assert_eq!(result.provider.as_deref(), Some("mailjet"));
        assert!(ai_calls.lock().unwrap().is_empty());
    }
}
