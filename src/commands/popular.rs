use anyhow::Result;
use colored::*;
use std::path::Path;

use super::{describe, open_engine};

pub fn execute(config_path: Option<&Path>, count: usize, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let popular = engine.popular(count);

    if json {
        let result: Vec<_> = popular
            .iter()
            .map(|(book, borrows)| serde_json::json!({ "book_id": book, "borrows": borrows }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if popular.is_empty() {
        println!("No borrows recorded yet");
        return Ok(());
    }

    for (book, borrows) in &popular {
        println!(
            "{:>6}  {:<12} {}",
            borrows.to_string().yellow(),
            book.to_string(),
            describe(engine.catalog(), book)
        );
    }
    Ok(())
}
