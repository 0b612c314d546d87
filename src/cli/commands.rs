use crate::app::{AppContext, Result};
use crate::domain::target::{registry, target};
use crate::domain::TargetId;

pub async fn send(
    ctx: &AppContext,
    prompt: &str,
    targets: &[TargetId],
    summarize: bool,
) -> Result<()> {
    let enabled: Vec<TargetId> = if targets.is_empty() {
        TargetId::all().to_vec()
    } else {
        targets.to_vec()
    };

    println!("Sending prompt to {} target(s)...", enabled.len());
    let snapshot = ctx.orchestrator.dispatch(prompt, &enabled).await;

    for (id, outcome) in snapshot.iter() {
        println!("\n=== {} ===", target(id).display_name);
        println!("{}", outcome.message());
    }

    if summarize {
        let entries = snapshot.valid_entries();
        println!(
            "\nSummarizing {} valid response(s)...",
            entries.len()
        );
        let summary = ctx.summarizer.summarize(&snapshot.prompt, &entries).await?;
        println!("\n=== Comparison ===\n{}", summary);
    }

    Ok(())
}

pub async fn list_targets(ctx: &AppContext) -> Result<()> {
    for entry in registry() {
        match ctx.host.find_tab(entry).await? {
            Some(tab) => println!("{} ({})\n  tab: {}", entry.display_name, entry.id, tab.url),
            None => println!("{} ({})\n  no tab open", entry.display_name, entry.id),
        }
    }
    Ok(())
}
