use anyhow::Result;
use bookwise::UserId;
use colored::*;
use std::path::Path;

use super::open_engine;

/// Recommend for many users at once, scored in parallel
pub fn execute(config_path: Option<&Path>, users: &[String], top_k: usize, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let users: Vec<UserId> = users.iter().map(|u| UserId::new(u.as_str())).collect();
    let results = engine.recommend_many(&users, top_k);

    if json {
        let result: Vec<_> = results
            .iter()
            .map(|(user, picks)| {
                serde_json::json!({
                    "user_id": user,
                    "recommendations": picks,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for (user, picks) in &results {
        let books: Vec<String> = picks.iter().map(|p| p.book_id.to_string()).collect();
        if books.is_empty() {
            println!("{:<12} {}", user.to_string().bold(), "-".dimmed());
        } else {
            println!("{:<12} {}", user.to_string().bold(), books.join(", "));
        }
    }
    Ok(())
}
