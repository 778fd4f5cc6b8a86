use std::error::Error;
use std::fmt;

use serde::Serialize;
use time::Date;

use crate::db::now_utc_rfc3339;
use crate::domain::schedule::{self, DueState};
use crate::remote::{ReminderDoc, RemoteError, RemoteStore};

/// One evaluation pass over the user's remote plant set. The caller owns the
/// cadence (app start, a debug action, an external scheduler); this service
/// never re-arms itself.
pub struct CheckService<'a> {
    remote: &'a dyn RemoteStore,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckSummary {
    pub user_id: String,
    pub plants_checked: u64,
    pub due_plants: u64,
    pub writes_issued: u64,
    pub writes_suppressed: u64,
    pub completed_at: String,
}

impl<'a> CheckService<'a> {
    pub fn new(remote: &'a dyn RemoteStore) -> Self {
        Self { remote }
    }

    /// Recomputes reminder state for every plant and persists it remotely
    /// only on change. Write volume is therefore bounded by state
    /// transitions, not by how often the caller polls.
    pub fn run_check(&self, user_id: &str, today: Date) -> Result<CheckSummary, CheckError> {
        let plants = self.remote.list_plants(user_id)?;
        let mut summary = CheckSummary {
            user_id: user_id.to_string(),
            plants_checked: plants.len() as u64,
            due_plants: 0,
            writes_issued: 0,
            writes_suppressed: 0,
            completed_at: String::new(),
        };

        for (plant_id, doc) in &plants {
            let computed = DueState {
                need_water: schedule::is_due(
                    &doc.last_watered_date,
                    &doc.watering_frequency,
                    today,
                ),
                need_fertilize: schedule::is_due(
                    &doc.last_fertilized_date,
                    &doc.fertilizing_frequency,
                    today,
                ),
            };
            if computed.any() {
                summary.due_plants += 1;
            }

            let stored = self.remote.get_reminder(user_id, plant_id)?;
            if self.needs_write(&stored, computed) {
                self.remote.put_reminder(
                    user_id,
                    plant_id,
                    &ReminderDoc {
                        plant_name: doc.name.clone(),
                        need_water: computed.need_water,
                        need_fertilize: computed.need_fertilize,
                        is_done: false,
                        timestamp: now_utc_rfc3339(),
                    },
                )?;
                summary.writes_issued += 1;
            } else {
                summary.writes_suppressed += 1;
            }
        }

        summary.completed_at = now_utc_rfc3339();
        Ok(summary)
    }

    fn needs_write(&self, stored: &Option<ReminderDoc>, computed: DueState) -> bool {
        match stored {
            // Nothing stored yet: only a due plant earns a document.
            None => computed.any(),
            // A stale document is updated even when the plant recovered to
            // fully not-due, so the stored state never lies.
            Some(doc) => {
                doc.need_water != computed.need_water
                    || doc.need_fertilize != computed.need_fertilize
            }
        }
    }
}

#[derive(Debug)]
pub enum CheckError {
    Remote(RemoteError),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Remote(err) => write!(f, "{}", err),
        }
    }
}

impl Error for CheckError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CheckError::Remote(err) => Some(err),
        }
    }
}

impl From<RemoteError> for CheckError {
    fn from(value: RemoteError) -> Self {
        CheckError::Remote(value)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use time::{Date, Month};
    use uuid::Uuid;

    use crate::remote::{JsonRemote, PlantDoc, ReminderDoc, RemoteStore};

    use super::CheckService;

    fn unique_remote() -> (PathBuf, JsonRemote) {
        let root = std::env::temp_dir().join(format!("sprig-check-test-{}", Uuid::now_v7()));
        (root.clone(), JsonRemote::new(root))
    }

    fn plant_doc(name: &str, watered: &str, fertilized: &str) -> PlantDoc {
        PlantDoc {
            user_id: "u-1".to_string(),
            name: name.to_string(),
            planting_date: "2026-1-1".to_string(),
            plant_type: "herb".to_string(),
            watering_frequency: "3".to_string(),
            fertilizing_frequency: "14".to_string(),
            last_watered_date: watered.to_string(),
            last_fertilized_date: fertilized.to_string(),
            image: None,
            image_sha256: None,
        }
    }

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::March, 15).expect("test date should be valid")
    }

    #[test]
    fn first_check_writes_a_document_per_due_plant() {
        let (root, remote) = unique_remote();
        remote
            .put_plant("P-due", &plant_doc("Basil", "2026-3-1", "2026-3-14"))
            .expect("seed should succeed");
        remote
            .put_plant("P-ok", &plant_doc("Aloe", "2026-3-14", "2026-3-14"))
            .expect("seed should succeed");

        let summary = CheckService::new(&remote)
            .run_check("u-1", today())
            .expect("check should succeed");
        assert_eq!(summary.plants_checked, 2);
        assert_eq!(summary.due_plants, 1);
        assert_eq!(summary.writes_issued, 1);
        assert_eq!(summary.writes_suppressed, 1);

        let reminder = remote
            .get_reminder("u-1", "P-due")
            .expect("read should succeed")
            .expect("due plant should have a reminder document");
        assert!(reminder.need_water);
        assert!(!reminder.need_fertilize);
        assert!(!reminder.is_done);
        assert!(remote
            .get_reminder("u-1", "P-ok")
            .expect("read should succeed")
            .is_none());

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn second_check_with_unchanged_data_issues_zero_writes() {
        let (root, remote) = unique_remote();
        remote
            .put_plant("P-due", &plant_doc("Basil", "2026-3-1", "2026-3-14"))
            .expect("seed should succeed");

        let service = CheckService::new(&remote);
        service
            .run_check("u-1", today())
            .expect("first check should succeed");
        let stamped = remote
            .get_reminder("u-1", "P-due")
            .expect("read should succeed")
            .expect("reminder should exist");

        let summary = service
            .run_check("u-1", today())
            .expect("second check should succeed");
        assert_eq!(summary.writes_issued, 0);
        assert_eq!(summary.writes_suppressed, 1);

        let unchanged = remote
            .get_reminder("u-1", "P-due")
            .expect("read should succeed")
            .expect("reminder should still exist");
        assert_eq!(unchanged, stamped);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn suppression_does_not_clobber_an_acknowledged_reminder() {
        let (root, remote) = unique_remote();
        remote
            .put_plant("P-due", &plant_doc("Basil", "2026-3-1", "2026-3-14"))
            .expect("seed should succeed");
        remote
            .put_reminder(
                "u-1",
                "P-due",
                &ReminderDoc {
                    plant_name: "Basil".to_string(),
                    need_water: true,
                    need_fertilize: false,
                    is_done: true,
                    timestamp: "2026-03-14T08:00:00Z".to_string(),
                },
            )
            .expect("seed reminder should succeed");

        CheckService::new(&remote)
            .run_check("u-1", today())
            .expect("check should succeed");

        let reminder = remote
            .get_reminder("u-1", "P-due")
            .expect("read should succeed")
            .expect("reminder should exist");
        assert!(reminder.is_done, "equal flags must not reset the ack");

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn recovery_to_not_due_updates_the_stale_document() {
        let (root, remote) = unique_remote();
        remote
            .put_plant("P-1", &plant_doc("Basil", "2026-3-14", "2026-3-14"))
            .expect("seed should succeed");
        remote
            .put_reminder(
                "u-1",
                "P-1",
                &ReminderDoc {
                    plant_name: "Basil".to_string(),
                    need_water: true,
                    need_fertilize: false,
                    is_done: false,
                    timestamp: "2026-03-10T08:00:00Z".to_string(),
                },
            )
            .expect("seed reminder should succeed");

        let summary = CheckService::new(&remote)
            .run_check("u-1", today())
            .expect("check should succeed");
        assert_eq!(summary.writes_issued, 1);

        let reminder = remote
            .get_reminder("u-1", "P-1")
            .expect("read should succeed")
            .expect("reminder should exist");
        assert!(!reminder.need_water);
        assert!(!reminder.need_fertilize);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn plant_without_frequency_never_earns_a_reminder() {
        let (root, remote) = unique_remote();
        let mut doc = plant_doc("Basil", "1999-1-1", "2026-3-14");
        doc.watering_frequency = String::new();
        remote.put_plant("P-1", &doc).expect("seed should succeed");

        let summary = CheckService::new(&remote)
            .run_check("u-1", today())
            .expect("check should succeed");
        assert_eq!(summary.due_plants, 0);
        assert_eq!(summary.writes_issued, 0);
        assert!(remote
            .get_reminder("u-1", "P-1")
            .expect("read should succeed")
            .is_none());

        let _ = std::fs::remove_dir_all(root);
    }
}
