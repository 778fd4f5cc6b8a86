use serde::Serialize;
use time::Date;

use crate::domain::plant::PlantRecord;
use crate::domain::schedule;

/// One entry in the due-list. Emitted only when at least one action is due;
/// fully-satisfied plants are omitted so the list stays sparse.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReminderItem {
    pub plant_id: String,
    pub plant_name: String,
    pub need_water: bool,
    pub need_fertilize: bool,
}

/// Runs the due rule over a snapshot of plants. Output order follows input
/// order, so a deterministically ordered snapshot yields a stable list.
pub fn compute_reminders(plants: &[PlantRecord], today: Date) -> Vec<ReminderItem> {
    plants
        .iter()
        .filter_map(|plant| {
            let state = schedule::evaluate(plant, today);
            state.any().then(|| ReminderItem {
                plant_id: plant.id.clone(),
                plant_name: plant.name.clone(),
                need_water: state.need_water,
                need_fertilize: state.need_fertilize,
            })
        })
        .collect()
}
