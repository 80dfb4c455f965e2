use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use txtad_game::GameConfig;

pub fn run(dir: &Path) -> Result<(), String> {
    let game = super::load_game(dir, GameConfig::default())?;
    game.content().validate().map_err(|e| e.to_string())?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Priority", "Permeable", "Shared", "Listeners"]);

    for (id, ctx) in game.contexts() {
        let ctx = ctx.borrow();
        let name = if ctx.name().is_empty() {
            "-".to_string()
        } else {
            ctx.name().to_string()
        };
        table.add_row(vec![
            id.clone(),
            name,
            ctx.priority().to_string(),
            yes_no(ctx.permeable()),
            yes_no(ctx.shared()),
            ctx.events().len().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  All checks passed for '{}'.", game.name());
    println!(
        "  {} contexts, {} texts, {} initial contexts",
        game.contexts().len(),
        game.texts().len(),
        game.settings().initial_contexts.len()
    );

    Ok(())
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "yes" } else { "no" };
    label.to_string()
}
