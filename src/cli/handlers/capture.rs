use super::CommandContext;
use anyhow::Result;
use colored::Colorize;

pub fn handle_capture(ctx: &mut CommandContext, text: String) -> Result<()> {
    ctx.repo.capture(&text)?;
    ctx.repo.save()?;
    println!(
        "{} ({} in inbox)",
        "Captured".green(),
        ctx.repo.data().inbox.len()
    );
    Ok(())
}

pub fn handle_inbox(ctx: &CommandContext, json: bool) -> Result<()> {
    let entries: Vec<&str> = ctx.repo.data().inbox.iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Inbox is empty. Nice.");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        let marker = if i == 0 { "→" } else { " " };
        println!("{} {:>3}. {}", marker.cyan(), i + 1, entry);
    }
    Ok(())
}
