//! Notification Fan-out Dispatcher
//!
//! Delivers a `lead_captured` event to every active webhook integration.
//! The caller is never blocked: dispatch detaches immediately, each
//! integration is attempted independently and at most once, and failures
//! end up in the log rather than in anyone's response.

use crate::rotation::SmtpRotationPool;
use leadflow_common::config::DispatchConfig;
use leadflow_common::types::{LeadStatus, LEAD_CAPTURED_EVENT};
use leadflow_common::{Error, Result};
use leadflow_storage::models::Lead;
use leadflow_storage::repository::{IntegrationRepository, LeadRepository};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Request context forwarded in the notification payload
#[derive(Debug, Clone, Default)]
pub struct DispatchMeta {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// One delivery handed to the background queue
#[derive(Debug)]
struct DeliveryTask {
    integration_id: String,
    url: String,
    body: String,
}

/// Fan-out dispatcher with a low-durability primary transport (bounded
/// background queue) and a direct-request fallback when the queue cannot
/// accept a task.
pub struct FanoutDispatcher {
    integrations: IntegrationRepository,
    leads: LeadRepository,
    pool: Arc<SmtpRotationPool>,
    client: reqwest::Client,
    queue: mpsc::Sender<DeliveryTask>,
}

impl FanoutDispatcher {
    /// Create the dispatcher and spawn its delivery worker
    pub fn new(
        integrations: IntegrationRepository,
        leads: LeadRepository,
        pool: Arc<SmtpRotationPool>,
        config: &DispatchConfig,
    ) -> Arc<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        tokio::spawn(delivery_worker(client.clone(), rx));

        Arc::new(Self {
            integrations,
            leads,
            pool,
            client,
            queue: tx,
        })
    }

    /// Fire-and-forget entry point: detaches immediately, the caller
    /// proceeds without waiting on any delivery.
    pub fn dispatch(self: &Arc<Self>, lead: Lead, meta: DispatchMeta) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            dispatcher.run(lead, meta).await;
        });
    }

    /// The detached fan-out sequence
    async fn run(&self, lead: Lead, meta: DispatchMeta) {
        let integrations = match self.integrations.list_active(LEAD_CAPTURED_EVENT).await {
            Ok(integrations) => integrations,
            Err(e) => {
                error!("Failed to load integrations, skipping fan-out: {}", e);
                return;
            }
        };
        if integrations.is_empty() {
            debug!("No active integrations, skipping fan-out");
            return;
        }

        let payload = json!({
            "event": LEAD_CAPTURED_EVENT,
            "lead": &lead,
            "meta": {
                "userAgent": meta.user_agent,
                "referrer": meta.referrer,
            },
        });
        let body = payload.to_string();

        let mut any_failed = false;
        for integration in &integrations {
            let task = DeliveryTask {
                integration_id: integration.id.clone(),
                url: integration.webhook_url.clone(),
                body: body.clone(),
            };

            // Primary transport: hand the task to the background queue.
            // When the queue cannot take it, fall back to a direct
            // request so the event still goes out at most once.
            match self.queue.try_send(task) {
                Ok(()) => {
                    debug!(integration = %integration.id, "Delivery scheduled");
                }
                Err(err) => {
                    warn!(
                        integration = %integration.id,
                        "Delivery queue unavailable, falling back to direct request"
                    );
                    let task = match err {
                        mpsc::error::TrySendError::Full(task)
                        | mpsc::error::TrySendError::Closed(task) => task,
                    };
                    if let Err(e) = send_webhook(&self.client, &task).await {
                        error!(integration = %integration.id, "Webhook delivery failed: {}", e);
                        any_failed = true;
                    }
                }
            }
        }

        let status = if any_failed {
            LeadStatus::Failed
        } else {
            LeadStatus::Synced
        };
        if let Err(e) = self.leads.set_status(lead.id, status).await {
            warn!(lead_id = %lead.id, "Failed to update lead status: {}", e);
        }

        // Confirmation-email leg: advance the rotation pool once and log
        // the selected identity. The send itself is simulated.
        match self.pool.rotate().await {
            Ok(Some(profile)) => {
                info!(profile = %profile.id, from = %profile.from_email, "Confirmation send simulated");
            }
            Ok(None) => {
                warn!("No sending profile with remaining quota, confirmation skipped");
            }
            Err(e) => {
                error!("Rotation pool unavailable: {}", e);
            }
        }
    }
}

/// Drains the delivery queue. Each delivery is independent; a failure is
/// logged and the worker moves on.
async fn delivery_worker(client: reqwest::Client, mut rx: mpsc::Receiver<DeliveryTask>) {
    while let Some(task) = rx.recv().await {
        match send_webhook(&client, &task).await {
            Ok(()) => debug!(integration = %task.integration_id, "Webhook delivered"),
            Err(e) => error!(integration = %task.integration_id, "Webhook delivery failed: {}", e),
        }
    }
}

/// One POST, explicit content type, no retry
async fn send_webhook(client: &reqwest::Client, task: &DeliveryTask) -> Result<()> {
    let response = client
        .post(&task.url)
        .header("Content-Type", "application/json")
        .body(task.body.clone())
        .send()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::Transport(format!(
            "endpoint returned status {}",
            response.status()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_common::types::{Attribution, LeadSource};
    use leadflow_storage::kv::MemoryKvStore;
    use leadflow_storage::models::Integration;
    use leadflow_storage::repository::SmtpProfileRepository;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        dispatcher: Arc<FanoutDispatcher>,
        integrations: IntegrationRepository,
        leads: LeadRepository,
        profiles: SmtpProfileRepository,
    }

    /// Build a dispatcher whose primary queue is closed, forcing every
    /// delivery down the awaited fallback path so tests see outcomes
    /// deterministically.
    fn fallback_fixture() -> Fixture {
        let store: Arc<MemoryKvStore> = Arc::new(MemoryKvStore::new());
        let integrations = IntegrationRepository::new(store.clone());
        let leads = LeadRepository::new(store.clone());
        let profiles = SmtpProfileRepository::new(store.clone());
        let pool = Arc::new(SmtpRotationPool::new(profiles.clone()));

        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let dispatcher = Arc::new(FanoutDispatcher {
            integrations: integrations.clone(),
            leads: leads.clone(),
            pool,
            client: reqwest::Client::new(),
            queue: tx,
        });

        Fixture {
            dispatcher,
            integrations,
            leads,
            profiles,
        }
    }

    fn integration(id: &str, url: &str) -> Integration {
        Integration {
            id: id.to_string(),
            provider: "generic".to_string(),
            webhook_url: url.to_string(),
            is_active: true,
            event_trigger: LEAD_CAPTURED_EVENT.to_string(),
        }
    }

    async fn captured_lead(leads: &LeadRepository) -> Lead {
        let lead = Lead::new(
            "a@x.com",
            LeadSource::QuizFlow,
            Attribution::default(),
            None,
        );
        leads.save_all(std::slice::from_ref(&lead)).await.unwrap();
        lead
    }

    #[tokio::test]
    async fn test_fanout_posts_payload_with_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "event": "lead_captured",
                "lead": { "email": "a@x.com" },
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let f = fallback_fixture();
        f.integrations
            .replace_all(&[integration("hook", &server.uri())])
            .await
            .unwrap();
        let lead = captured_lead(&f.leads).await;

        f.dispatcher
            .run(
                lead.clone(),
                DispatchMeta {
                    user_agent: Some("test-agent".to_string()),
                    referrer: None,
                },
            )
            .await;

        let stored = f.leads.list().await.unwrap();
        assert_eq!(stored[0].status, LeadStatus::Synced);
    }

    #[tokio::test]
    async fn test_failing_endpoint_does_not_affect_the_other() {
        let healthy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&healthy)
            .await;

        let broken = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&broken)
            .await;

        let f = fallback_fixture();
        f.integrations
            .replace_all(&[
                integration("broken", &broken.uri()),
                integration("healthy", &healthy.uri()),
            ])
            .await
            .unwrap();
        let lead = captured_lead(&f.leads).await;

        f.dispatcher.run(lead, DispatchMeta::default()).await;

        // The healthy endpoint received its delivery despite the earlier
        // failure; mock expectations verify on drop. Lead status records
        // the partial failure.
        let stored = f.leads.list().await.unwrap();
        assert_eq!(stored[0].status, LeadStatus::Failed);
    }

    #[tokio::test]
    async fn test_no_integrations_skips_fanout_and_rotation() {
        let f = fallback_fixture();
        let lead = captured_lead(&f.leads).await;

        f.dispatcher.run(lead, DispatchMeta::default()).await;

        // Status untouched, no rotation write happened
        let stored = f.leads.list().await.unwrap();
        assert_eq!(stored[0].status, LeadStatus::Captured);
        assert!(f.profiles.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rotation_advances_after_fanout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let f = fallback_fixture();
        f.integrations
            .replace_all(&[integration("hook", &server.uri())])
            .await
            .unwrap();
        f.profiles
            .save_all(&[leadflow_storage::models::SmtpProfile {
                id: "p1".to_string(),
                name: "primary".to_string(),
                host: "smtp.example.com".to_string(),
                port: 587,
                username: "u".to_string(),
                password: "s".to_string(),
                from_email: "noreply@example.com".to_string(),
                daily_limit: 10,
                current_usage: 0,
                is_active: true,
                last_reset_date: chrono::Local::now().date_naive(),
            }])
            .await
            .unwrap();
        let lead = captured_lead(&f.leads).await;

        f.dispatcher.run(lead, DispatchMeta::default()).await;

        let profiles = f.profiles.list().await.unwrap();
        assert_eq!(profiles[0].current_usage, 1);
    }

    #[tokio::test]
    async fn test_queued_deliveries_reach_the_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store: Arc<MemoryKvStore> = Arc::new(MemoryKvStore::new());
        let integrations = IntegrationRepository::new(store.clone());
        let leads = LeadRepository::new(store.clone());
        let pool = Arc::new(SmtpRotationPool::new(SmtpProfileRepository::new(
            store.clone(),
        )));
        let dispatcher = FanoutDispatcher::new(
            integrations.clone(),
            leads.clone(),
            pool,
            &DispatchConfig::default(),
        );

        integrations
            .replace_all(&[integration("hook", &server.uri())])
            .await
            .unwrap();
        let lead = captured_lead(&leads).await;

        dispatcher.run(lead, DispatchMeta::default()).await;

        // The primary transport is asynchronous; poll until the worker
        // has drained the queue.
        for _ in 0..50 {
            if !server.received_requests().await.unwrap_or_default().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("queued delivery never reached the endpoint");
    }
}
