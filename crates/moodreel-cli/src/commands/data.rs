/// Data management command handlers (list, export, delete)
use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tabled::{Table, Tabled};

use moodreel_storage::{Database, KvEntry};

use super::helpers::truncate_str;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn entry_rows(entries: &[KvEntry]) -> Vec<EntryRow> {
    entries
        .iter()
        .map(|entry| EntryRow {
            key: entry.key.clone(),
            value: truncate_str(&entry.value, 60),
            updated: entry
                .updated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
        .collect()
}

pub fn handle_data_list(db: &Database) -> Result<()> {
    let entries = db.list_entries()?;
    if entries.is_empty() {
        println!("No stored state.");
        return Ok(());
    }
    println!("{}", Table::new(entry_rows(&entries)));
    Ok(())
}

pub fn handle_data_export(db: &Database, output: Option<&Path>) -> Result<()> {
    let entries = db.list_entries()?;
    let json = serde_json::to_string_pretty(&entries)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!("Exported {} entries to {}", entries.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn handle_data_delete(db: &Database, key: &str) -> Result<()> {
    if db.delete_value(key)? {
        println!("Deleted {key}");
    } else {
        println!("No stored value for {key}");
    }
    Ok(())
}
