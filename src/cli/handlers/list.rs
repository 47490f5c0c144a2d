use super::CommandContext;
use crate::model::{ItemDetail, Project, ProjectItem};
use anyhow::{Result, anyhow};
use colored::Colorize;

fn item_line(item: &ProjectItem) -> String {
    let marker = match &item.detail {
        ItemDetail::Task { is_completed, .. } => {
            if *is_completed {
                "[x]".green().to_string()
            } else {
                "[ ]".to_string()
            }
        }
        ItemDetail::Resource { is_acquired, .. } => {
            if *is_acquired {
                "[$]".green().to_string()
            } else {
                "[$]".yellow().to_string()
            }
        }
        ItemDetail::Reference { content } => {
            // Links get a distinct marker so they are easy to spot
            if url::Url::parse(content).is_ok() {
                "[@]".blue().to_string()
            } else {
                "[#]".blue().to_string()
            }
        }
    };

    let mut line = format!("{} {} {}", marker, item.id.dimmed(), item.name);
    if !item.tags.is_empty() {
        line.push_str(&format!(" {}", format!("({})", item.tags.join(", ")).dimmed()));
    }
    if let ItemDetail::Task {
        duration: Some(duration),
        ..
    } = &item.detail
    {
        line.push_str(&format!(" {}", format!("~{}", duration).dimmed()));
    }
    line
}

fn print_project_heading(project: &Project) {
    println!(
        "{:>3} {} [{}]",
        project.id,
        project.name.bold(),
        project.status
    );
}

pub fn handle_projects(ctx: &CommandContext, json: bool) -> Result<()> {
    let projects = ctx.repo.data().projects_sorted();

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Triage your inbox to create some.");
        return Ok(());
    }

    for project in projects {
        let open = project
            .items
            .iter()
            .filter(|i| match &i.detail {
                ItemDetail::Task { is_completed, .. } => !is_completed,
                ItemDetail::Resource { is_acquired, .. } => !is_acquired,
                ItemDetail::Reference { .. } => false,
            })
            .count();
        println!(
            "{:>3} {} [{}] {} open / {} items",
            project.id,
            project.name.bold(),
            project.status,
            open,
            project.items.len()
        );
    }
    Ok(())
}

pub fn handle_items(ctx: &CommandContext, project_id: u32, json: bool) -> Result<()> {
    let project = ctx
        .repo
        .data()
        .find_project(project_id)
        .ok_or_else(|| anyhow!("Project {} not found", project_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(project)?);
        return Ok(());
    }

    print_project_heading(project);
    for item in &project.items {
        println!("  {}", item_line(item));
    }
    Ok(())
}

pub fn handle_goals(ctx: &CommandContext, json: bool) -> Result<()> {
    let data = ctx.repo.data();

    if json {
        println!("{}", serde_json::to_string_pretty(&data.goals)?);
        return Ok(());
    }

    for goal in &data.goals {
        println!("{} {} [{}]", goal.id.dimmed(), goal.name.bold(), goal.status);
        for project in data.projects_sorted() {
            if project.goal_id.as_deref() == Some(goal.id.as_str()) {
                println!("  {:>3} {}", project.id, project.name);
            }
        }
    }

    let orphans: Vec<&Project> = data
        .projects_sorted()
        .into_iter()
        .filter(|p| p.goal_id.is_none())
        .collect();
    if !orphans.is_empty() {
        println!("{}", "(no goal)".dimmed());
        for project in orphans {
            println!("  {:>3} {}", project.id, project.name);
        }
    }
    Ok(())
}

pub fn handle_next(ctx: &CommandContext, tag: Option<String>, json: bool) -> Result<()> {
    let actions = ctx.repo.next_actions(tag.as_deref());

    if json {
        let rows: Vec<_> = actions
            .iter()
            .map(|(project, item)| {
                serde_json::json!({
                    "project_id": project.id,
                    "project": project.name,
                    "item": item,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if actions.is_empty() {
        println!("No next actions. Triage your inbox or enjoy the calm.");
        return Ok(());
    }

    for (project, item) in actions {
        println!("{} {}", item_line(item), format!("· {}", project.name).dimmed());
    }
    Ok(())
}

pub fn handle_shopping(ctx: &CommandContext, json: bool) -> Result<()> {
    let trips = ctx.repo.shopping_list();

    if json {
        let rows: Vec<_> = trips
            .iter()
            .map(|(store, items)| {
                serde_json::json!({
                    "store": store,
                    "items": items
                        .iter()
                        .map(|(item, project)| serde_json::json!({
                            "item": item,
                            "project": project,
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if trips.is_empty() {
        println!("Nothing to buy.");
        return Ok(());
    }

    for (store, items) in trips {
        println!("{}", store.bold());
        for (item, project) in items {
            println!("  {} {}", item_line(item), format!("· {}", project).dimmed());
        }
    }
    Ok(())
}
