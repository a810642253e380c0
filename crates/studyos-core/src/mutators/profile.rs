//! Profile mutators

use chrono::Utc;
use tracing::info;

use crate::analytics::advance_streak;
use crate::error::{CoreError, CoreResult};
use crate::models::{ProfileUpdate, UserProfile};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// The user profile, empty when none is stored
    pub fn user_profile(&self) -> UserProfile {
        self.read(DocumentKey::User)
    }

    /// Merge a partial update into the profile
    pub fn update_profile(&self, update: ProfileUpdate) -> CoreResult<UserProfile> {
        if update
            .total_study_hours
            .is_some_and(|h| !h.is_finite() || h < 0.0)
        {
            return Err(CoreError::validation("Total study hours cannot be negative"));
        }
        if let Some(key) = update.extra.keys().find(|k| UserProfile::is_typed_field(k)) {
            return Err(CoreError::validation(format!(
                "Profile field '{}' cannot be set directly",
                key
            )));
        }

        let now = Utc::now();
        self.transact(DocumentKey::User, |profile: &mut UserProfile| {
            if let Some(name) = update.name {
                let name = name.trim().to_string();
                profile.name = (!name.is_empty()).then_some(name);
            }
            if let Some(hours) = update.total_study_hours {
                profile.total_study_hours = hours;
            }
            for (key, value) in update.extra {
                if value.is_null() {
                    profile.extra.remove(&key);
                } else {
                    profile.extra.insert(key, value);
                }
            }
            profile.last_updated = Some(now);
            Ok(profile.clone())
        })
    }

    /// Count today as a study day
    ///
    /// Logging twice on the same day changes nothing; a missed day resets
    /// the current streak to 1.
    pub fn update_streak(&self) -> CoreResult<UserProfile> {
        let today = self.today();
        let profile = self.transact(DocumentKey::User, |profile: &mut UserProfile| {
            if profile.last_study_date != Some(today) {
                advance_streak(profile, today);
                profile.last_updated = Some(Utc::now());
            }
            Ok(profile.clone())
        })?;

        info!("Study streak is {} day(s)", profile.current_streak);
        Ok(profile)
    }
}
