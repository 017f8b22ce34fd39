use anyhow::Result;
use bookwise::UserId;
use colored::*;
use std::path::Path;

use super::{describe, open_engine};

pub fn execute(config_path: Option<&Path>, user: &str, top_k: usize, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let user = UserId::new(user);
    let picks = engine.recommend(&user, top_k);

    if json {
        let result = serde_json::json!({
            "user_id": user,
            "recommendations": picks,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if picks.is_empty() {
        println!("No recommendation available for user {}", user);
        return Ok(());
    }

    println!("{} {}", "Recommendations for user".bold(), user.to_string().bold());
    for (rank, pick) in picks.iter().enumerate() {
        println!(
            "{:>3}. {:<12} {:>8.4}  {}",
            rank + 1,
            pick.book_id.to_string().green(),
            pick.score,
            describe(engine.catalog(), &pick.book_id)
        );
    }
    Ok(())
}
