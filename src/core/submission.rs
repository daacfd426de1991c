use crate::core::queue::WelcomeQueue;
use crate::domain::model::{Registration, RegistrationInput, ReminderDay};
use crate::domain::ports::DynRegistrationStore;
use crate::utils::error::Result;
use crate::utils::validation::{require_text, validate_email};
use serde::Serialize;

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "✅ Registro exitoso. Revisa tu email para el mensaje de bienvenida.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// Check required fields and resolve the reminder day (default: Monday).
pub fn validate_input(input: &RegistrationInput) -> Result<Registration> {
    let email = require_text("email", &input.email)?;
    validate_email("email", email)?;
    let display_name = require_text("nombre", &input.nombre)?;
    let goals = require_text("objetivos", &input.objetivos)?;

    let reminder_day = match input.dia_recordatorio.as_deref().map(str::trim) {
        None | Some("") => ReminderDay::default(),
        Some(label) => label.parse()?,
    };

    Ok(Registration {
        email: email.to_string(),
        display_name: display_name.to_string(),
        goals: goals.to_string(),
        reminder_day,
    })
}

pub struct SubmissionHandler {
    store: DynRegistrationStore,
    welcome: WelcomeQueue,
}

impl SubmissionHandler {
    pub fn new(store: DynRegistrationStore, welcome: WelcomeQueue) -> Self {
        Self { store, welcome }
    }

    /// Persist, then queue one welcome email. Only validation and store
    /// failures reach the caller; delivery happens after this returns.
    pub async fn submit(&self, input: RegistrationInput) -> Result<SubmitResponse> {
        let registration = validate_input(&input)?;
        tracing::info!("📝 Registering {}", registration.email);

        if let Err(e) = self.store.save(&registration).await {
            tracing::error!("❌ Could not store {}: {}", registration.email, e);
            return Err(e);
        }

        self.welcome.enqueue(registration);

        Ok(SubmitResponse {
            success: true,
            message: SUBMIT_SUCCESS_MESSAGE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RegistrationStore;
    use crate::utils::error::MailerError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct RecordingStore {
        accept: bool,
        saved: Mutex<Vec<Registration>>,
    }

    #[async_trait]
    impl RegistrationStore for RecordingStore {
        async fn save(&self, registration: &Registration) -> Result<()> {
            if !self.accept {
                return Err(MailerError::store("Sheet is read-only"));
            }
            self.saved.lock().unwrap().push(registration.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<Registration>> {
            Ok(self.saved.lock().unwrap().clone())
        }
    }

    fn input() -> RegistrationInput {
        RegistrationInput {
            email: Some("a@b.com".to_string()),
            nombre: Some("Ana".to_string()),
            objetivos: Some("Aprender Rust".to_string()),
            dia_recordatorio: Some("Martes".to_string()),
        }
    }

    #[tokio::test]
    async fn stores_then_queues_welcome() {
        let store = Arc::new(RecordingStore {
            accept: true,
            saved: Mutex::new(Vec::new()),
        });
        let (queue, mut rx) = WelcomeQueue::channel();
        let handler = SubmissionHandler::new(store.clone(), queue);

        let response = handler.submit(input()).await.unwrap();

        assert!(response.success);
        assert_eq!(response.message, SUBMIT_SUCCESS_MESSAGE);
        let saved = store.saved.lock().unwrap().clone();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].reminder_day, ReminderDay::Tuesday);
        let queued = rx.try_recv().unwrap();
        assert_eq!(queued.email, "a@b.com");
    }

    #[tokio::test]
    async fn store_failure_queues_nothing() {
        let store = Arc::new(RecordingStore {
            accept: false,
            saved: Mutex::new(Vec::new()),
        });
        let (queue, mut rx) = WelcomeQueue::channel();
        let handler = SubmissionHandler::new(store, queue);

        let err = handler.submit(input()).await.unwrap_err();

        assert!(matches!(err, MailerError::StoreError { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_day_defaults_to_monday() {
        let mut raw = input();
        raw.dia_recordatorio = None;
        assert_eq!(validate_input(&raw).unwrap().reminder_day, ReminderDay::Monday);
    }

    #[test]
    fn unknown_day_is_rejected() {
        let mut raw = input();
        raw.dia_recordatorio = Some("Someday".to_string());
        assert!(matches!(
            validate_input(&raw),
            Err(MailerError::ValidationError { .. })
        ));
    }

    #[test]
    fn required_fields_are_enforced() {
        for field in ["email", "nombre", "objetivos"] {
            let mut raw = input();
            match field {
                "email" => raw.email = None,
                "nombre" => raw.nombre = Some("  ".to_string()),
                _ => raw.objetivos = None,
            }
            let err = validate_input(&raw).unwrap_err();
            match err {
                MailerError::ValidationError { field: f, .. } => assert_eq!(f, field),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut raw = input();
        raw.email = Some("ana-at-example".to_string());
        assert!(validate_input(&raw).is_err());
    }
}
