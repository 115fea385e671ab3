//! Hand-written fakes for gateway and webhook tests.

use crate::gateway::Gateway;
use async_trait::async_trait;
use concierge_core::{
    config::{Prompts, RepliesConfig},
    context::{Context, History},
    error::ConciergeError,
    message::OutgoingMessage,
    schedule::{DaySlots, ScheduleSnapshot},
    traits::{AlertSender, HistoryStore, LeadLogger, Provider, ScheduleSource},
};
use concierge_memory::JsonFileStore;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted completion provider. Each call pops the next queued result and
/// records the context it was given.
#[derive(Default)]
pub struct FakeProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub contexts: Mutex<Vec<Context>>,
    /// Sleep before answering, to exercise the timeout.
    delay: Option<Duration>,
}

impl FakeProvider {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            ..Default::default()
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error.to_string())])),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    pub fn last_context(&self) -> Context {
        self.contexts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, ConciergeError> {
        self.contexts.lock().unwrap().push(context.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()));
        match next {
            Ok(text) => Ok(OutgoingMessage {
                text,
                ..Default::default()
            }),
            Err(e) => Err(ConciergeError::Provider(e)),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Fixed schedule.
pub struct FakeSchedule(pub ScheduleSnapshot);

impl FakeSchedule {
    pub fn monday() -> Self {
        Self(ScheduleSnapshot::Slots(vec![DaySlots {
            day: "Monday".into(),
            slots: vec!["09:00".into(), "10:30".into()],
        }]))
    }
}

#[async_trait]
impl ScheduleSource for FakeSchedule {
    async fn snapshot(&self) -> ScheduleSnapshot {
        self.0.clone()
    }
}

/// Records alerts; optionally fails every delivery.
#[derive(Default)]
pub struct RecordingAlert {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl AlertSender for RecordingAlert {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn alert(&self, message: &str, sender_id: &str) -> Result<(), ConciergeError> {
        self.sent
            .lock()
            .unwrap()
            .push((message.to_string(), sender_id.to_string()));
        if self.fail {
            return Err(ConciergeError::Channel("sms gateway down".into()));
        }
        Ok(())
    }
}

/// Records missed leads; optionally fails.
#[derive(Default)]
pub struct RecordingLeads {
    pub logged: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl LeadLogger for RecordingLeads {
    async fn log_missed(&self, sender_id: &str) -> Result<(), ConciergeError> {
        self.logged.lock().unwrap().push(sender_id.to_string());
        if self.fail {
            return Err(ConciergeError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

/// Store whose reads and writes always fail.
pub struct FailingStore;

#[async_trait]
impl HistoryStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _sender_id: &str) -> Result<History, ConciergeError> {
        Err(ConciergeError::Memory("store offline".into()))
    }

    async fn put(&self, _sender_id: &str, _history: &History) -> Result<(), ConciergeError> {
        Err(ConciergeError::Memory("store offline".into()))
    }
}

/// Collaborators for one test gateway, kept so tests can inspect them.
pub struct Harness {
    pub provider: Arc<FakeProvider>,
    pub store: Arc<dyn HistoryStore>,
    pub alerts: Arc<RecordingAlert>,
    pub leads: Arc<RecordingLeads>,
    pub gateway: Arc<Gateway>,
}

impl Harness {
    /// Gateway over a JSON store in `dir` with the Monday schedule.
    pub fn new(dir: &Path, provider: FakeProvider) -> Self {
        let store: Arc<dyn HistoryStore> = Arc::new(JsonFileStore::new(dir.join("memory.json")));
        Self::build(
            provider,
            store,
            FakeSchedule::monday(),
            RecordingAlert::default(),
            RecordingLeads::default(),
        )
    }

    pub fn build(
        provider: FakeProvider,
        store: Arc<dyn HistoryStore>,
        schedule: FakeSchedule,
        alerts: RecordingAlert,
        leads: RecordingLeads,
    ) -> Self {
        let provider = Arc::new(provider);
        let alerts = Arc::new(alerts);
        let leads = Arc::new(leads);
        let gateway = Arc::new(Gateway::new(
            provider.clone(),
            store.clone(),
            Arc::new(schedule),
            alerts.clone(),
            leads.clone(),
            Prompts::default(),
            RepliesConfig::default(),
            Duration::from_millis(500),
        ));
        Self {
            provider,
            store,
            alerts,
            leads,
            gateway,
        }
    }
}
