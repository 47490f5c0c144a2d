use super::CommandContext;
use crate::error::SiftError;
use crate::model::{ClassificationType, DatasetContent, Draft, ProjectRef};
use crate::triage::{HttpClassifier, ProposalEngine, TriageState};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

const HELP: &str = "\
  c            confirm the draft
  s            skip (defer to tail)
  t            trash the entry permanently
  m            start a manual draft (no AI)
  r            retry classification after a failure
  k <type>     set kind: task, resource, reference, new-project, incubate
  p <target>   set project: id, name, or a new name
  g <tags>     replace tags (comma-separated)
  d <dur>      set duration estimate
  w            write dataset to disk
  q            quit (q! to discard unsaved changes)
  ?            show this help";

pub fn handle_triage(ctx: &mut CommandContext, manual: bool) -> Result<()> {
    let classifier = if manual {
        None
    } else {
        match HttpClassifier::new(ctx.config.ai.clone()) {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                eprintln!("{}: {} (falling back to manual triage)", "Note".yellow(), e);
                None
            }
        }
    };

    let mut engine = ProposalEngine::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(head) = ctx.repo.data().inbox.peek_head().map(str::to_string) else {
            println!("{}", "Inbox empty. Triage complete.".green());
            break;
        };
        println!();
        println!(
            "{} {} {}",
            "Triaging".bold(),
            format!("({} left)", ctx.repo.data().inbox.len()).dimmed(),
            head.bold()
        );

        if let Some(classifier) = &classifier {
            // Propose only from Idle; a Failed head waits for an
            // explicit retry instead of hammering the API every round
            if engine.draft().is_none() && engine.state() == &TriageState::Idle {
                match engine.propose(&ctx.repo, classifier) {
                    Ok(draft) => print_draft(draft, ctx.repo.data()),
                    Err(e) => eprintln!(
                        "{}: {} ('r' retries, 'm' drafts manually, 's' skips)",
                        "Classification failed".red(),
                        e
                    ),
                }
            } else if let Some(draft) = engine.draft() {
                // Draft survives edit rounds without re-invoking the AI
                print_draft(draft, ctx.repo.data());
            }
        }

        print!("{} ", ">".cyan());
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim().to_string();
        let (cmd, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line.as_str(), ""),
        };

        let outcome = match cmd {
            "" => Ok(()),
            "?" => {
                println!("{}", HELP);
                Ok(())
            }
            "c" => engine.confirm(&mut ctx.repo).map(|item_id| {
                println!("{} {}", "Filed as".green(), item_id.cyan());
            }),
            "s" => engine.skip(&mut ctx.repo).map(|_| {
                println!("{}", "Deferred to tail".yellow());
            }),
            "t" => engine.trash(&mut ctx.repo).map(|text| {
                println!("{} '{}'", "Trashed".red(), text);
            }),
            "m" => engine
                .draft_manual(
                    &ctx.repo,
                    ClassificationType::Task,
                    ProjectRef::Unmatched,
                    Vec::new(),
                    None,
                )
                .map(|draft| print_draft(draft, ctx.repo.data())),
            "r" => match &classifier {
                Some(c) => engine
                    .propose(&ctx.repo, c)
                    .map(|draft| print_draft(draft, ctx.repo.data())),
                None => {
                    println!("No AI collaborator available. Use 'm' instead.");
                    Ok(())
                }
            },
            "k" => edit_draft(&mut engine, |draft| {
                draft.set_classification(rest.parse()?)
            }),
            "p" => {
                let target = match rest.parse::<u32>() {
                    Ok(id) => ProjectRef::Existing(id),
                    Err(_) => match ctx.repo.data().find_project_by_name(rest) {
                        Some(project) => ProjectRef::Existing(project.id),
                        None => ProjectRef::New(rest.to_string()),
                    },
                };
                edit_draft(&mut engine, |draft| draft.set_target(target))
            }
            "g" => edit_draft(&mut engine, |draft| {
                draft.set_tags(rest.split(',').map(str::trim))
            }),
            "d" => edit_draft(&mut engine, |draft| {
                draft.set_duration_estimate(Some(rest.to_string()))
            }),
            "w" => ctx.repo.save().map(|()| {
                println!("{}", "Saved".green());
            }),
            "q" | "q!" => {
                if ctx.repo.is_dirty() && cmd == "q" {
                    println!(
                        "{}: unsaved changes. 'w' to save, 'q!' to discard.",
                        "Blocked".yellow()
                    );
                    continue;
                }
                if cmd == "q!" && ctx.repo.is_dirty() {
                    ctx.repo.discard()?;
                    println!("{}", "Discarded unsaved changes".yellow());
                }
                break;
            }
            other => {
                println!("Unknown command '{}'. Try '?'.", other);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            match e {
                SiftError::StaleDraft => {
                    println!("{}: no live draft. 'm' starts one.", "Nothing to do".yellow())
                }
                e => println!("{}: {}", "Error".red(), e),
            }
        }
    }

    // Only reachable dirty via EOF; don't lose the session silently
    if ctx.repo.is_dirty() {
        ctx.repo.save()?;
        println!("{}", "Saved before exit".green());
    }
    Ok(())
}

fn edit_draft<F>(engine: &mut ProposalEngine, edit: F) -> crate::error::Result<()>
where
    F: FnOnce(&mut Draft) -> crate::error::Result<()>,
{
    let draft = engine.draft_mut().ok_or(SiftError::StaleDraft)?;
    edit(draft)
}

fn print_draft(draft: &Draft, data: &DatasetContent) {
    let target = match draft.target() {
        ProjectRef::Existing(id) => data
            .find_project(*id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("project {}", id)),
        ProjectRef::Unmatched => "unmatched".to_string(),
        ProjectRef::New(name) => format!("{} (new)", name),
    };

    println!(
        "  {} {}  {} {}  {} {:.0}%",
        "kind:".dimmed(),
        draft.classification(),
        "project:".dimmed(),
        target.bold(),
        "confidence:".dimmed(),
        draft.confidence() * 100.0
    );
    if !draft.tags().is_empty() {
        println!("  {} {}", "tags:".dimmed(), draft.tags().join(", "));
    }
    if let Some(duration) = draft.duration_estimate() {
        println!("  {} {}", "duration:".dimmed(), duration);
    }
    if !draft.reasoning().is_empty() {
        println!("  {} {}", "why:".dimmed(), draft.reasoning());
    }
    if !draft.alternative_projects().is_empty() {
        println!(
            "  {} {}",
            "also:".dimmed(),
            draft.alternative_projects().join("; ")
        );
    }
}
