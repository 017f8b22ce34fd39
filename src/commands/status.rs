use anyhow::Result;
use bookwise::embedding::EmbeddingStatus;
use colored::*;
use std::path::Path;

use super::open_engine;

pub fn execute(config_path: Option<&Path>, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let status = engine.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let catalog = if status.catalog_books > 0 {
        format!("{} books", status.catalog_books).green()
    } else {
        "empty (content signals off)".yellow()
    };
    println!("Catalog:     {}", catalog);

    match &status.embeddings {
        EmbeddingStatus::Enabled {
            users,
            items,
            dimension,
        } => println!(
            "Embeddings:  {}",
            format!("{users} users, {items} items, dim {dimension}").green()
        ),
        EmbeddingStatus::Disabled { reason } => {
            println!("Embeddings:  {} {}", "disabled".yellow(), reason.dimmed())
        }
    }

    println!("Users:       {}", status.users_observed);
    println!("Borrows:     {}", status.total_borrows);
    Ok(())
}
