use std::io::{self, IsTerminal};

use crate::domain::plant::PlantRecord;
use crate::domain::schedule::DueState;
use crate::listing::PlantListFilter;
use crate::reminders::ReminderItem;
use crate::remote::UserProfileDoc;
use crate::stats::PlantStats;

pub fn print_plant_list(plants: &[PlantRecord], filter: &PlantListFilter, last_sync: Option<&str>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Plants"));
    if let Some(summary) = filter_summary(filter) {
        println!("{}", palette.dim(&format!("filters: {summary}")));
    }
    if let Some(synced_at) = last_sync {
        println!("{}", palette.dim(&format!("last sync: {synced_at}")));
    }

    if plants.is_empty() {
        println!("{}", palette.dim("no plants matched"));
        return;
    }

    for plant in plants {
        println!("{}", format_plant_row(plant, &palette));
    }
    println!("{}", palette.dim(&format!("{} plant(s)", plants.len())));
}

pub fn print_due_list(items: &[ReminderItem]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Due today"));

    if items.is_empty() {
        println!("{}", palette.dim("all plants are looked after"));
        return;
    }

    for item in items {
        let state = DueState {
            need_water: item.need_water,
            need_fertilize: item.need_fertilize,
        };
        println!(
            "{} {} {}",
            palette.id(&item.plant_id),
            palette.actions(state),
            item.plant_name
        );
    }
    println!("{}", palette.dim(&format!("{} plant(s) due", items.len())));
}

pub fn print_stats(stats: &PlantStats) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Garden stats"));
    println!("{}", palette.dim(&format!("{} plant(s)", stats.plants)));

    for entry in &stats.type_counts {
        println!("  {} {}", palette.type_label(&entry.plant_type), entry.count);
    }
    for week in &stats.weekly_care_load {
        println!(
            "  {} ({}) water={} feed={}",
            week.label,
            palette.dim(&week.week_start),
            week.water_count,
            week.fertilize_count
        );
    }
}

pub fn print_profile(user_id: &str, profile: &UserProfileDoc) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&format!("Profile {user_id}")));
    let name = if profile.name.is_empty() {
        "(unnamed)"
    } else {
        &profile.name
    };
    println!("  name: {name}");
    if !profile.level.is_empty() {
        println!("  level: {}", profile.level);
    }
    println!("  profile completed: {}", profile.profile_completed);
    println!("  activities: {}", profile.activities);
}

fn format_plant_row(plant: &PlantRecord, palette: &Palette) -> String {
    let mut line = format!(
        "{} {} {}",
        palette.id(&plant.id),
        plant.name,
        palette.type_label(&plant.plant_type)
    );
    line.push(' ');
    line.push_str(&palette.dim(&format!(
        "water/{}d feed/{}d",
        schedule_field(&plant.watering_frequency),
        schedule_field(&plant.fertilizing_frequency)
    )));
    if plant.image.is_some() {
        line.push(' ');
        line.push_str(&palette.dim("[img]"));
    }
    line
}

fn schedule_field(raw: &str) -> &str {
    if raw.trim().is_empty() {
        "?"
    } else {
        raw
    }
}

fn filter_summary(filter: &PlantListFilter) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(plant_type) = filter.plant_type.as_deref().and_then(non_empty) {
        parts.push(format!("type={plant_type}"));
    }
    if let Some(query) = filter.query.as_deref().and_then(non_empty) {
        parts.push(format!("query={query}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    pub fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    pub fn type_label(&self, plant_type: &str) -> String {
        self.paint("35", &format!("({plant_type})"))
    }

    pub fn actions(&self, state: DueState) -> String {
        let mut labels = Vec::new();
        if state.need_water {
            labels.push(self.paint("34", "[WATER]"));
        }
        if state.need_fertilize {
            labels.push(self.paint("33", "[FEED]"));
        }
        labels.join(" ")
    }
}
