use std::error::Error;
use std::io;

use crate::core::context::AppContext;
use crate::ui::render::render_character_list;

pub fn list_characters(context: &AppContext) -> Result<(), Box<dyn Error>> {
    let directory = context.characters();
    let mut out = io::stdout().lock();
    render_character_list(
        &mut out,
        directory.builtin(),
        directory.user_characters(),
        context.session().is_some(),
    )?;

    if context.session().is_some() && !directory.has_repository() {
        println!("\n⚠️  No data backend is configured, so custom characters are unavailable.");
        println!("   kappachat set supabase-url <url>");
        println!("   kappachat set supabase-anon-key <key>");
    }
    Ok(())
}
