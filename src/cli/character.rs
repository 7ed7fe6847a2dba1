use std::error::Error;
use std::io;

use clap::Args;

use crate::character::{Character, CharacterDraft};
use crate::cli::{CharacterCommands, Reported};
use crate::core::context::AppContext;
use crate::ui::prompt::{ConfirmationChoice, Prompter};
use crate::ui::render::render_character;

/// Character fields given on the command line. Missing ones are prompted
/// for.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct DraftArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub personality: Option<String>,
    /// Image URL; leave empty for the default avatar
    #[arg(long)]
    pub image: Option<String>,
}

impl DraftArgs {
    fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.description.is_some()
            && self.personality.is_some()
            && self.image.is_some()
    }

    /// Fill a new draft, prompting for anything not given.
    pub fn into_new_draft<R: io::BufRead, W: io::Write>(
        self,
        prompts: &mut Prompter<R, W>,
    ) -> Result<CharacterDraft, Box<dyn Error>> {
        Ok(CharacterDraft {
            name: take_or(self.name, || prompts.line("Name: "))?,
            description: take_or(self.description, || prompts.line("Description: "))?,
            personality: take_or(self.personality, || prompts.line("Personality: "))?,
            image_url: take_or(self.image, || {
                prompts.line("Image URL (leave empty for default): ")
            })?,
        })
    }

    /// Apply the given fields over `current`. When nothing was given on
    /// the command line every field is prompted with its current value.
    pub fn into_edited_draft<R: io::BufRead, W: io::Write>(
        self,
        current: &Character,
        prompts: &mut Prompter<R, W>,
    ) -> Result<CharacterDraft, Box<dyn Error>> {
        let existing = CharacterDraft::from_character(current);
        if self != DraftArgs::default() && !self.is_complete() {
            return Ok(CharacterDraft {
                name: self.name.unwrap_or(existing.name),
                description: self.description.unwrap_or(existing.description),
                personality: self.personality.unwrap_or(existing.personality),
                image_url: self.image.unwrap_or(existing.image_url),
            });
        }
        Ok(CharacterDraft {
            name: take_or(self.name, || prompts.with_default("Name", &existing.name))?,
            description: take_or(self.description, || {
                prompts.with_default("Description", &existing.description)
            })?,
            personality: take_or(self.personality, || {
                prompts.with_default("Personality", &existing.personality)
            })?,
            image_url: take_or(self.image, || {
                prompts.with_default("Image URL", &existing.image_url)
            })?,
        })
    }
}

fn take_or<E>(
    value: Option<String>,
    prompt: impl FnOnce() -> Result<String, E>,
) -> Result<String, E> {
    match value {
        Some(value) => Ok(value),
        None => prompt(),
    }
}

pub async fn run(
    context: &mut AppContext,
    command: CharacterCommands,
) -> Result<(), Box<dyn Error>> {
    match command {
        CharacterCommands::Create { fields } => {
            let draft = fields.into_new_draft(&mut Prompter::stdio())?;
            let character = context
                .create_character(&draft)
                .await
                .map_err(|_| Reported)?;
            println!("💡 Start chatting with:");
            println!("   kappachat chat {}", character.id);
        }
        CharacterCommands::Edit { id, fields } => {
            let current = resolve(context, &id).await?;
            if current.is_builtin() {
                context.notifier().error(
                    "Error",
                    format!("{} is a built-in character and cannot be edited", current.name),
                );
                return Err(Reported.into());
            }
            let draft = fields.into_edited_draft(&current, &mut Prompter::stdio())?;
            context
                .update_character(&id, &draft)
                .await
                .map_err(|_| Reported)?;
        }
        CharacterCommands::Delete { id, yes } => {
            if !yes {
                let character = resolve(context, &id).await?;
                let prompt = format!(
                    "Delete {} and your conversation with them?",
                    character.name
                );
                if Prompter::stdio().confirmation(&prompt)? != ConfirmationChoice::Yes {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            context
                .delete_character(&id)
                .await
                .map_err(|_| Reported)?;
        }
        CharacterCommands::Show { id } => {
            let character = resolve(context, &id).await?;
            render_character(&mut io::stdout().lock(), &character)?;
        }
    }
    Ok(())
}

async fn resolve(context: &AppContext, id: &str) -> Result<Character, Box<dyn Error>> {
    match context.resolve_character(id).await {
        Ok(character) => Ok(character),
        Err(err) => {
            context.notifier().error("Error", err.to_string());
            Err(Reported.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::builtin::load_builtin_characters;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn new_draft_prompts_only_for_missing_fields() {
        let fields = DraftArgs {
            name: Some("Nova".into()),
            image: Some(String::new()),
            ..DraftArgs::default()
        };
        let draft = fields
            .into_new_draft(&mut prompter("A stargazer.\nCurious\n"))
            .unwrap();
        assert_eq!(draft.name, "Nova");
        assert_eq!(draft.description, "A stargazer.");
        assert_eq!(draft.personality, "Curious");
        assert_eq!(draft.image_url, "");
    }

    #[test]
    fn partial_edit_keeps_other_fields() {
        let current = load_builtin_characters().remove(0);
        let fields = DraftArgs {
            personality: Some("Playful".into()),
            ..DraftArgs::default()
        };
        let draft = fields.into_edited_draft(&current, &mut prompter("")).unwrap();
        assert_eq!(draft.name, current.name);
        assert_eq!(draft.personality, "Playful");
    }

    #[test]
    fn interactive_edit_defaults_to_current_values() {
        let current = load_builtin_characters().remove(0);
        let draft = DraftArgs::default()
            .into_edited_draft(&current, &mut prompter("\nNew description\n\n\n"))
            .unwrap();
        assert_eq!(draft.name, current.name);
        assert_eq!(draft.description, "New description");
        assert_eq!(draft.image_url, current.image_url);
    }
}
