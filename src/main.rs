use anyhow::Result;
use clap::Parser;

use sift::cli::handlers::{
    CommandContext, handle_acquire, handle_add, handle_capture, handle_datasets, handle_done,
    handle_goal_assign, handle_goal_new, handle_goals, handle_inbox, handle_init, handle_items,
    handle_next, handle_projects, handle_reorder, handle_save, handle_shopping, handle_status,
    handle_switch, handle_triage, handle_undone,
};
use sift::cli::{Cli, Commands};
use sift::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, logging::default_log_file());

    let dataset = cli.dataset.as_deref();

    match cli.command {
        // Init runs before any workspace exists
        Commands::Init { name } => handle_init(name),
        Commands::Capture { text } => handle_capture(&mut CommandContext::new(dataset)?, text),
        Commands::Inbox { json } => handle_inbox(&CommandContext::new(dataset)?, json),
        Commands::Triage { manual } => handle_triage(&mut CommandContext::new(dataset)?, manual),
        Commands::Projects { json } => handle_projects(&CommandContext::new(dataset)?, json),
        Commands::Items { project, json } => {
            handle_items(&CommandContext::new(dataset)?, project, json)
        }
        Commands::Goals { json } => handle_goals(&CommandContext::new(dataset)?, json),
        Commands::GoalNew { name } => handle_goal_new(&mut CommandContext::new(dataset)?, name),
        Commands::GoalAssign { project, goal } => {
            handle_goal_assign(&mut CommandContext::new(dataset)?, project, goal)
        }
        Commands::Add {
            project,
            name,
            kind,
            tag,
            duration,
            store,
            content,
        } => handle_add(
            &mut CommandContext::new(dataset)?,
            project,
            name,
            kind,
            tag,
            duration,
            store,
            content,
        ),
        Commands::Done { project, item } => {
            handle_done(&mut CommandContext::new(dataset)?, project, item)
        }
        Commands::Undone { project, item } => {
            handle_undone(&mut CommandContext::new(dataset)?, project, item)
        }
        Commands::Acquire {
            project,
            item,
            undo,
        } => handle_acquire(&mut CommandContext::new(dataset)?, project, item, undo),
        Commands::Next { tag, json } => handle_next(&CommandContext::new(dataset)?, tag, json),
        Commands::Shopping { json } => handle_shopping(&CommandContext::new(dataset)?, json),
        Commands::Reorder { project, direction } => {
            handle_reorder(&mut CommandContext::new(dataset)?, project, direction)
        }
        Commands::Datasets { json } => handle_datasets(&CommandContext::new(dataset)?, json),
        Commands::Switch { name } => handle_switch(&mut CommandContext::new(dataset)?, name),
        Commands::Save => handle_save(&mut CommandContext::new(dataset)?),
        Commands::Status { json } => handle_status(&CommandContext::new(dataset)?, json),
    }
}
