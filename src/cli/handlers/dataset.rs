use super::CommandContext;
use anyhow::Result;
use colored::Colorize;

pub fn handle_datasets(ctx: &CommandContext, json: bool) -> Result<()> {
    let names = ctx.repo.list_datasets()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    for name in names {
        if name == ctx.repo.current_name() {
            println!("{} {}", "*".green(), name.bold());
        } else {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Make another dataset the configured default for subsequent commands.
pub fn handle_switch(ctx: &mut CommandContext, name: String) -> Result<()> {
    // The repository enforces the dirty guard; a freshly opened one-shot
    // session is clean, so this mainly validates the target exists
    ctx.repo.switch(&name)?;

    let mut config = ctx.config.clone();
    config.datasets.default_dataset = name.clone();
    config.save(&ctx.root.join(".sift.yml"))?;

    println!("{} to dataset '{}'", "Switched".green(), name.cyan());
    Ok(())
}

/// Re-serialize the dataset. Also normalizes a hand-edited file.
pub fn handle_save(ctx: &mut CommandContext) -> Result<()> {
    ctx.repo.save()?;
    println!("{} dataset '{}'", "Saved".green(), ctx.repo.current_name().cyan());
    Ok(())
}

pub fn handle_status(ctx: &CommandContext, json: bool) -> Result<()> {
    let data = ctx.repo.data();
    let open_tasks = ctx.repo.next_actions(None).len();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "dataset": ctx.repo.current_name(),
                "dirty": ctx.repo.is_dirty(),
                "inbox": data.inbox.len(),
                "goals": data.goals.len(),
                "projects": data.projects.len(),
                "open_tasks": open_tasks,
            }))?
        );
        return Ok(());
    }

    println!("Dataset:  {}", ctx.repo.current_name().bold());
    if ctx.repo.is_dirty() {
        println!("State:    {}", "unsaved changes".yellow());
    } else {
        println!("State:    {}", "clean".green());
    }
    println!("Inbox:    {} entries", data.inbox.len());
    println!("Goals:    {}", data.goals.len());
    println!("Projects: {}", data.projects.len());
    println!("Open:     {} tasks", open_tasks);
    Ok(())
}
