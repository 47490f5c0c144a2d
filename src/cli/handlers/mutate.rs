use super::CommandContext;
use crate::cli::{DirectionArg, ItemKindArg};
use crate::model::{ItemDetail, ItemKind, ProjectItem, generate_id};
use anyhow::Result;
use colored::Colorize;

#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    ctx: &mut CommandContext,
    project: u32,
    name: String,
    kind: ItemKindArg,
    tags: Vec<String>,
    duration: Option<String>,
    store: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let detail = match ItemKind::from(kind) {
        ItemKind::Task => ItemDetail::task(duration),
        ItemKind::Resource => {
            let mut detail = ItemDetail::resource();
            if let (ItemDetail::Resource { store: s, .. }, Some(wanted)) = (&mut detail, store) {
                *s = wanted;
            }
            detail
        }
        ItemKind::Reference => ItemDetail::reference(content.unwrap_or_else(|| name.clone())),
    };

    let item = ProjectItem::new(generate_id("itm-"), name, detail).with_tags(tags);
    let item_id = ctx.repo.add_item(project, item)?;
    ctx.repo.save()?;

    println!("{} {}", "Added".green(), item_id.cyan());
    Ok(())
}

pub fn handle_done(ctx: &mut CommandContext, project: u32, item: String) -> Result<()> {
    ctx.repo.set_item_completed(project, &item, true)?;
    ctx.repo.save()?;
    println!("{} {}", "Done".green(), item.cyan());
    Ok(())
}

pub fn handle_undone(ctx: &mut CommandContext, project: u32, item: String) -> Result<()> {
    ctx.repo.set_item_completed(project, &item, false)?;
    ctx.repo.save()?;
    println!("{} {} is open again", "Reverted".yellow(), item.cyan());
    Ok(())
}

pub fn handle_acquire(ctx: &mut CommandContext, project: u32, item: String, undo: bool) -> Result<()> {
    ctx.repo.set_item_acquired(project, &item, !undo)?;
    ctx.repo.save()?;
    if undo {
        println!("{} {} back on the list", "Returned".yellow(), item.cyan());
    } else {
        println!("{} {}", "Acquired".green(), item.cyan());
    }
    Ok(())
}

pub fn handle_goal_new(ctx: &mut CommandContext, name: String) -> Result<()> {
    let id = ctx.repo.create_goal(&name)?;
    ctx.repo.save()?;
    println!("{} goal {}", "Created".green(), id.cyan());
    Ok(())
}

pub fn handle_goal_assign(ctx: &mut CommandContext, project: u32, goal: String) -> Result<()> {
    ctx.repo.assign_project_to_goal(project, &goal)?;
    ctx.repo.save()?;
    println!("{} project {} to goal {}", "Assigned".green(), project, goal.cyan());
    Ok(())
}

pub fn handle_reorder(ctx: &mut CommandContext, project: u32, direction: DirectionArg) -> Result<()> {
    ctx.repo.reorder_project(project, direction.into())?;
    ctx.repo.save()?;
    println!("{} project {}", "Moved".green(), project);
    Ok(())
}
