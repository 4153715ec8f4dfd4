use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;

/// Indexes the configured groups and prints what was found.
pub fn run_scan(config: &Config) -> Result<()> {
    let catalog = Catalog::build(config)?;

    println!("{:<6} {:<24} ITEMS", "GROUP", "NAME");
    for group in catalog.list_groups() {
        let count = catalog.list_by_group(group.id)?.len();
        println!("{:<6} {:<24} {}", group.id, group.name, count);
    }
    println!();

    println!(
        "{:<6} {:<24} {:<40} {:<10} NEXT",
        "ID", "GROUP", "TITLE", "DURATION"
    );
    for item in catalog.list_all() {
        let next = item
            .next_item_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<24} {:<40} {:<10} {}",
            item.id, item.group_name, item.title, item.duration, next
        );
    }

    let stats = catalog.stats();
    println!();
    println!("{} groups, {} items", stats.groups, stats.items);

    Ok(())
}
