mod app;
mod check;
mod cli;
mod completions;
mod db;
mod domain;
mod listing;
mod locks;
mod reminders;
mod remote;
mod settings;
mod stats;
mod sync;
mod ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::Commands;

    use crate::app::NewPlantInput;
    use crate::domain::plant::CareAction;
    use crate::domain::schedule;

    let cli = cli::Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        completions::generate(args.shell);
        return Ok(());
    }

    let settings = settings::Settings::load(&cli.state_dir)?;
    let remote_root = cli
        .remote
        .clone()
        .or(settings.remote_root)
        .unwrap_or_else(|| cli.state_dir.join("remote"));
    let user_id = cli.user.clone().or(settings.user_id).ok_or_else(|| {
        app::AppError::InvalidArgument(
            "no user id configured; pass --user, set SPRIG_USER, or add user_id to config.toml"
                .to_string(),
        )
    })?;
    let today = resolve_today(cli.today.as_deref())?;

    let app = app::App::open(
        &cli.db,
        Box::new(remote::JsonRemote::new(remote_root)),
        cli.state_dir.clone(),
    )?;

    match cli.command {
        Commands::Add(args) => {
            let image = match args.image {
                Some(path) => Some(std::fs::read(path)?),
                None => None,
            };
            let plant = app.add_plant(
                &user_id,
                NewPlantInput {
                    name: args.name,
                    plant_type: args.plant_type,
                    planting_date: args.planted,
                    watering_frequency: args.water_every,
                    fertilizing_frequency: args.feed_every,
                    last_watered_date: args.watered,
                    last_fertilized_date: args.fertilized,
                    image,
                },
            )?;
            let palette = ui::Palette::auto();
            println!(
                "added {} {} {}",
                palette.id(&plant.id),
                plant.name,
                palette.type_label(&plant.plant_type)
            );
        }
        Commands::Ls(args) => {
            let filter = listing::PlantListFilter {
                plant_type: args.plant_type.clone(),
                query: args.query.clone(),
            };
            let plants = listing::apply_filters(app.list_plants(&user_id)?, &filter);
            if args.json {
                print_json(&plants);
            } else {
                let last_sync = app.last_sync(&user_id)?;
                ui::print_plant_list(&plants, &filter, last_sync.as_deref());
            }
        }
        Commands::Rm(args) => {
            app.remove_plant(&user_id, &args.id)?;
            println!("removed {}", args.id);
        }
        Commands::Due(args) => {
            let items = app.due_list(&user_id, today)?;
            if args.json {
                print_json(&items);
            } else {
                ui::print_due_list(&items);
            }
        }
        Commands::Check(args) => {
            let summary = app.run_check(&user_id, today)?;
            if args.json {
                print_json(&summary);
            } else {
                println!(
                    "check plants={} due={} writes_issued={} writes_suppressed={}",
                    summary.plants_checked,
                    summary.due_plants,
                    summary.writes_issued,
                    summary.writes_suppressed
                );
            }
        }
        Commands::Sync(args) => {
            let summary = app.sync_user(&user_id)?;
            if args.json {
                print_json(&summary);
            } else {
                println!(
                    "sync fetched={} inserted={} images_dropped={} completed_at={}",
                    summary.fetched, summary.inserted, summary.images_dropped, summary.completed_at
                );
            }
        }
        Commands::Water(args) => {
            let plant = app.record_care(&user_id, &args.id, CareAction::Water, today)?;
            println!("watered {} on {}", plant.name, plant.last_watered_date);
        }
        Commands::Fertilize(args) => {
            let plant = app.record_care(&user_id, &args.id, CareAction::Fertilize, today)?;
            println!("fertilized {} on {}", plant.name, plant.last_fertilized_date);
        }
        Commands::Done(args) => {
            let reminder = app.mark_reminder_done(&user_id, &args.id, today)?;
            println!(
                "done {} (care recorded {})",
                reminder.plant_name,
                schedule::format_plant_date(today)
            );
        }
        Commands::Stats(args) => {
            let stats = app.stats(&user_id)?;
            if args.json {
                print_json(&stats);
            } else {
                ui::print_stats(&stats);
            }
        }
        Commands::Profile(args) => {
            let profile = app.profile(&user_id)?;
            if args.json {
                print_json(&profile);
            } else {
                ui::print_profile(&user_id, &profile);
            }
        }
        Commands::Completions(_) => {
            unreachable!("completions are handled before app initialization")
        }
    }

    Ok(())
}

fn resolve_today(raw: Option<&str>) -> Result<time::Date, app::AppError> {
    match raw {
        Some(text) => domain::schedule::parse_plant_date(text).ok_or_else(|| {
            app::AppError::InvalidArgument(format!(
                "invalid --today date '{text}', expected YYYY-M-D"
            ))
        }),
        None => Ok(time::OffsetDateTime::now_utc().date()),
    }
}
