pub mod dispatcher;
pub mod generator;
pub mod mailer;
pub mod queue;
pub mod scheduler;
pub mod submission;

pub use crate::domain::model::{
    ContentContext, MessageKind, OutboundEmail, Registration, RegistrationInput, ReminderDay,
    RenderedMessage, SendResult,
};
pub use crate::domain::ports::{
    ContentBackend, DynContentBackend, DynEmailProvider, DynRegistrationStore, EmailProvider,
    RegistrationStore,
};
pub use crate::utils::error::Result;
