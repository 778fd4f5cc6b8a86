use std::path::PathBuf;

use uuid::Uuid;

use crate::domain::plant::{CareAction, PlantRecord};

use super::{
    count_by_type, delete_user_plants, get_meta, get_plant, insert_plant, list_user_plants,
    open_connection, set_meta, update_last_action, CURRENT_SCHEMA_VERSION,
};

fn unique_db_path() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sprig-db-test-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir.join("state.sqlite")
}

fn record(id: &str, user_id: &str, plant_type: &str) -> PlantRecord {
    PlantRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: format!("plant {id}"),
        plant_type: plant_type.to_string(),
        planting_date: "2026-2-1".to_string(),
        watering_frequency: "3".to_string(),
        fertilizing_frequency: "14".to_string(),
        last_watered_date: "2026-2-1".to_string(),
        last_fertilized_date: "2026-2-1".to_string(),
        image: None,
    }
}

#[test]
fn migrations_record_schema_version() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    let version = get_meta(&conn, "schema_version")
        .expect("meta read should succeed")
        .expect("schema_version should be set");
    assert_eq!(version, CURRENT_SCHEMA_VERSION.to_string());
}

#[test]
fn open_is_idempotent_across_connections() {
    let path = unique_db_path();
    let db_path = path.to_str().expect("utf8 path");
    {
        let conn = open_connection(db_path).expect("first open should succeed");
        insert_plant(&conn, &record("P-1", "u-1", "herb")).expect("insert should succeed");
    }
    let conn = open_connection(db_path).expect("second open should succeed");
    let plants = list_user_plants(&conn, "u-1").expect("list should succeed");
    assert_eq!(plants.len(), 1);
}

#[test]
fn insert_upserts_on_conflicting_id() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    insert_plant(&conn, &record("P-1", "u-1", "herb")).expect("insert should succeed");

    let mut updated = record("P-1", "u-1", "flower");
    updated.last_watered_date = "2026-3-1".to_string();
    insert_plant(&conn, &updated).expect("upsert should succeed");

    let stored = get_plant(&conn, "P-1")
        .expect("get should succeed")
        .expect("plant should exist");
    assert_eq!(stored.plant_type, "flower");
    assert_eq!(stored.last_watered_date, "2026-3-1");
    assert_eq!(
        list_user_plants(&conn, "u-1")
            .expect("list should succeed")
            .len(),
        1
    );
}

#[test]
fn image_blob_round_trips() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    let mut with_image = record("P-img", "u-1", "herb");
    with_image.image = Some(vec![0xde, 0xad, 0xbe, 0xef]);
    insert_plant(&conn, &with_image).expect("insert should succeed");

    let stored = get_plant(&conn, "P-img")
        .expect("get should succeed")
        .expect("plant should exist");
    assert_eq!(stored.image, Some(vec![0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn listing_is_scoped_to_one_user_and_ordered_by_id() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    insert_plant(&conn, &record("P-b", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-a", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-c", "u-2", "herb")).expect("insert should succeed");

    let plants = list_user_plants(&conn, "u-1").expect("list should succeed");
    let ids: Vec<&str> = plants.iter().map(|plant| plant.id.as_str()).collect();
    assert_eq!(ids, vec!["P-a", "P-b"]);
}

#[test]
fn delete_user_plants_leaves_other_users_alone() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    insert_plant(&conn, &record("P-1", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-2", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-3", "u-2", "herb")).expect("insert should succeed");

    let removed = delete_user_plants(&conn, "u-1").expect("delete should succeed");
    assert_eq!(removed, 2);
    assert!(list_user_plants(&conn, "u-1")
        .expect("list should succeed")
        .is_empty());
    assert_eq!(
        list_user_plants(&conn, "u-2")
            .expect("list should succeed")
            .len(),
        1
    );
}

#[test]
fn update_last_action_touches_only_the_requested_column() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    insert_plant(&conn, &record("P-1", "u-1", "herb")).expect("insert should succeed");

    update_last_action(&conn, "P-1", CareAction::Water, "2026-3-9")
        .expect("update should succeed");

    let stored = get_plant(&conn, "P-1")
        .expect("get should succeed")
        .expect("plant should exist");
    assert_eq!(stored.last_watered_date, "2026-3-9");
    assert_eq!(stored.last_fertilized_date, "2026-2-1");
}

#[test]
fn count_by_type_groups_per_user() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    insert_plant(&conn, &record("P-1", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-2", "u-1", "herb")).expect("insert should succeed");
    insert_plant(&conn, &record("P-3", "u-1", "flower")).expect("insert should succeed");
    insert_plant(&conn, &record("P-4", "u-2", "cactus")).expect("insert should succeed");

    let counts = count_by_type(&conn, "u-1").expect("count should succeed");
    let pairs: Vec<(&str, i64)> = counts
        .iter()
        .map(|entry| (entry.plant_type.as_str(), entry.count))
        .collect();
    assert_eq!(pairs, vec![("flower", 1), ("herb", 2)]);
}

#[test]
fn meta_round_trips_and_overwrites() {
    let path = unique_db_path();
    let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
    set_meta(&conn, "last_sync:u-1", "2026-03-09T10:00:00Z").expect("set should succeed");
    set_meta(&conn, "last_sync:u-1", "2026-03-10T10:00:00Z").expect("overwrite should succeed");
    assert_eq!(
        get_meta(&conn, "last_sync:u-1").expect("get should succeed"),
        Some("2026-03-10T10:00:00Z".to_string())
    );
}
