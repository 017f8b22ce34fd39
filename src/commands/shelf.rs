use anyhow::Result;
use bookwise::UserId;
use colored::*;
use std::path::Path;

use super::{describe, open_engine};

pub fn execute(config_path: Option<&Path>, user: Option<&str>, count: usize, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let user = user.map(UserId::new);
    let shelf = engine.recommend_shelf(user.as_ref(), count);

    if json {
        println!("{}", serde_json::to_string_pretty(&shelf)?);
        return Ok(());
    }

    if shelf.books.is_empty() {
        println!("Shelf is empty");
        return Ok(());
    }

    for (i, book) in shelf.books.iter().enumerate() {
        let marker = if i == 0 && shelf.personalized {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!("{} {:<12} {}", marker, book.to_string(), describe(engine.catalog(), book));
    }
    Ok(())
}
