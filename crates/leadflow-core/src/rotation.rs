//! Credential Rotation Pool
//!
//! Selects an outbound-mail identity under per-day quotas. Usage counters
//! reset the first time the pool is consulted on a new calendar day, and
//! selection is first-eligible in stored order, so results stay
//! deterministic for a given profile ordering.

use chrono::{Local, NaiveDate};
use leadflow_storage::models::SmtpProfile;
use leadflow_storage::repository::SmtpProfileRepository;
use leadflow_common::Result;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Quota-governed pool of SMTP sending identities.
///
/// The read-increment-write cycle runs under one mutex so concurrent
/// rotations cannot under-count the quota.
pub struct SmtpRotationPool {
    profiles: SmtpProfileRepository,
    write_lock: Mutex<()>,
}

impl SmtpRotationPool {
    pub fn new(profiles: SmtpProfileRepository) -> Self {
        Self {
            profiles,
            write_lock: Mutex::new(()),
        }
    }

    /// Select the next sending identity, or `None` when every profile is
    /// inactive or exhausted for the day. `None` is an answer, not an
    /// error; storage failures are.
    pub async fn rotate(&self) -> Result<Option<SmtpProfile>> {
        self.rotate_at(Local::now().date_naive()).await
    }

    /// Rotation with an explicit "today", the seam the quota-reset tests
    /// drive.
    pub(crate) async fn rotate_at(&self, today: NaiveDate) -> Result<Option<SmtpProfile>> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.profiles.list().await?;
        let mut mutated = false;

        // Calendar-day reset happens before eligibility is judged, so a
        // profile exhausted yesterday is selectable again today.
        for profile in profiles.iter_mut() {
            if profile.last_reset_date != today {
                profile.current_usage = 0;
                profile.last_reset_date = today;
                mutated = true;
                debug!(profile = %profile.id, "Reset daily usage counter");
            }
        }

        // First eligible in stored order; ties break by position.
        let selected = profiles.iter_mut().find(|p| p.has_quota());

        let selected = match selected {
            Some(profile) => {
                profile.current_usage += 1;
                mutated = true;
                info!(
                    profile = %profile.id,
                    usage = profile.current_usage,
                    limit = profile.daily_limit,
                    "Selected sending profile"
                );
                Some(profile.clone())
            }
            None => {
                debug!("No sending profile with remaining quota");
                None
            }
        };

        if mutated {
            self.profiles.save_all(&profiles).await?;
        }

        Ok(selected)
    }
}
