use crate::domain::plant::PlantRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantListFilter {
    pub plant_type: Option<String>,
    pub query: Option<String>,
}

pub fn apply_filters(plants: Vec<PlantRecord>, filter: &PlantListFilter) -> Vec<PlantRecord> {
    let plant_type = normalize_scalar(filter.plant_type.as_deref());
    let query = normalize_scalar(filter.query.as_deref());
    if plant_type.is_none() && query.is_none() {
        return plants;
    }

    plants
        .into_iter()
        .filter(|plant| {
            if let Some(expected) = plant_type.as_deref() {
                if plant.plant_type.to_ascii_lowercase() != expected {
                    return false;
                }
            }
            if let Some(needle) = query.as_deref() {
                if !plant.name.to_ascii_lowercase().contains(needle) {
                    return false;
                }
            }
            true
        })
        .collect()
}

fn normalize_scalar(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_ascii_lowercase)
}
