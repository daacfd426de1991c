use crate::adapters::{self, ai, email, store::SheetsStore};
use crate::config::AppConfig;
use crate::core::dispatcher::FailoverDispatcher;
use crate::core::generator::ContentGenerator;
use crate::core::mailer::Mailer;
use crate::core::queue::WelcomeQueue;
use crate::core::scheduler::{BatchScheduler, DailyTrigger};
use crate::core::submission::SubmissionHandler;
use crate::domain::model::MessageKind;
use crate::domain::ports::{DynContentBackend, DynEmailProvider, DynRegistrationStore, SystemClock};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Wired-up components sharing one configuration.
pub struct App {
    pub config: AppConfig,
    pub store: DynRegistrationStore,
    pub mailer: Arc<Mailer>,
    pub scheduler: Arc<BatchScheduler>,
}

impl App {
    /// Production wiring: HTTP store, provider chain and AI back-ends from config.
    pub fn build(config: AppConfig) -> Result<Self> {
        let store_client = adapters::http_client(config.store.timeout_seconds)?;
        let provider_client = adapters::http_client(config.providers.timeout_seconds)?;
        let ai_client = adapters::http_client(config.ai.timeout_seconds)?;

        let store: DynRegistrationStore =
            Arc::new(SheetsStore::new(store_client, config.store.endpoint.clone()));
        let providers = email::default_chain(&provider_client, &config.providers, &config.sender);
        let welcome_chain = ai::chain_for(&ai_client, &config.ai, MessageKind::Welcome);
        let daily_chain = ai::chain_for(&ai_client, &config.ai, MessageKind::Daily);

        Ok(Self::from_parts(config, store, providers, welcome_chain, daily_chain))
    }

    pub fn from_parts(
        config: AppConfig,
        store: DynRegistrationStore,
        providers: Vec<DynEmailProvider>,
        welcome_chain: Vec<DynContentBackend>,
        daily_chain: Vec<DynContentBackend>,
    ) -> Self {
        let mailer = Arc::new(Mailer::new(
            ContentGenerator::new(welcome_chain, daily_chain),
            FailoverDispatcher::new(providers),
        ));
        let scheduler = Arc::new(BatchScheduler::new(
            Arc::clone(&store),
            Arc::clone(&mailer),
            &config.scheduler,
        ));

        Self {
            config,
            store,
            mailer,
            scheduler,
        }
    }

    /// Submission handler plus the worker task that delivers its welcome emails.
    pub fn submission(&self) -> (Arc<SubmissionHandler>, JoinHandle<()>) {
        let (queue, worker) = WelcomeQueue::spawn(Arc::clone(&self.mailer));
        let handler = Arc::new(SubmissionHandler::new(Arc::clone(&self.store), queue));
        (handler, worker)
    }

    pub fn daily_trigger(&self) -> Result<DailyTrigger> {
        Ok(DailyTrigger::new(
            Arc::clone(&self.scheduler),
            Arc::new(SystemClock),
            self.config.scheduler.run_time()?,
        ))
    }

    /// AI back-end names, first-seen order across both chains.
    pub fn ai_backend_names(&self) -> Vec<String> {
        let generator = self.mailer.generator();
        let mut names: Vec<String> = Vec::new();
        for kind in [MessageKind::Welcome, MessageKind::Daily] {
            for backend in generator.chain_for(kind) {
                if !names.iter().any(|n| n == backend.name()) {
                    names.push(backend.name().to_string());
                }
            }
        }
        names
    }
}
