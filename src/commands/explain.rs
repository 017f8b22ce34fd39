use anyhow::Result;
use bookwise::{BookId, UserId};
use colored::*;
use std::path::Path;

use super::{describe, open_engine};

/// Print each scoring term for one user/book pair
pub fn execute(config_path: Option<&Path>, user: &str, book: &str, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let user = UserId::new(user);
    let book = BookId::new(book);

    let Some(breakdown) = engine.explain(&user, &book) else {
        println!("Book {} is not in the catalog", book);
        return Ok(());
    };

    if json {
        let result = serde_json::json!({
            "user_id": user,
            "book_id": book,
            "score": breakdown.total(),
            "terms": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{} {}", book.to_string().bold(), describe(engine.catalog(), &book));
    println!("  base        {:>8.4}", breakdown.base);
    println!("  repeats     {:>8}", breakdown.repeat_count);
    println!("  author      {:>8.4}", breakdown.author);
    println!("  publisher   {:>8.4}", breakdown.publisher);
    println!("  category1   {:>8.4}", breakdown.category1);
    println!("  category2   {:>8.4}", breakdown.category2);
    match breakdown.latent {
        Some(latent) => println!("  latent      {:>8.4}", latent),
        None => println!("  latent      {:>8}", "-".dimmed()),
    }
    println!("  popularity  {:>8.4}", breakdown.popularity);
    println!("  {}       {:>8.4}", "total".bold(), breakdown.total());
    Ok(())
}
