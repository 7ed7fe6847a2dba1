//! Command-line interface parsing and handling
//!
//! Every subcommand maps onto a page of the shell: account commands onto
//! `/auth`, `characters` onto `/characters`, `chat` onto
//! `/conversation/:id` and so on. `open <path>` takes the path directly.

pub mod account;
pub mod character;
pub mod character_list;
pub mod settings;

use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::conversation::TypingReveal;
use crate::core::config::orchestrator::ConfigOrchestrator;
use crate::core::context::{AppContext, AppServices};
use crate::core::notice::{drain_notices, NoticeReceiver, Notifier};
use crate::logging::init_tracing;
use crate::ui::chat_loop::{run_chat, ChatSession};
use crate::ui::render::{
    render_about, render_auth, render_home, render_not_found, render_notice, BuildInfo,
};
use crate::ui::routes::{guard, Route};
use crate::utils::logging::TranscriptLog;

#[derive(Parser)]
#[command(name = "kappachat")]
#[command(version)]
#[command(about = "Chat with AI characters from the terminal")]
#[command(
    long_about = "kappachat lets you browse AI characters and hold conversations with them. \
Conversations are kept on this machine and, when a data backend is configured, synced to \
your account.\n\n\
Environment Variables:\n\
  KAPPACHAT_API_URL        Chat API base URL\n\
  KAPPACHAT_SUPABASE_URL   Data backend URL (optional)\n\
  KAPPACHAT_SUPABASE_KEY   Data backend anon key (optional)\n\
  KAPPACHAT_LOG            Log filter, e.g. kappachat=debug\n\n\
Chat commands:\n\
  /help             Show the chat commands\n\
  /clear            Delete the conversation and start over\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume\n\
  /quit             Leave the conversation"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Record chat transcripts to this file
    #[arg(short = 't', long, global = true)]
    pub transcript: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account (does not log in)
    Register {
        username: Option<String>,
        /// Profile image URL
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Log in and sync your conversations and characters
    Login { username: Option<String> },
    /// Log out; local conversations are kept
    Logout,
    /// Show the logged-in account
    Whoami,
    /// List built-in and custom characters
    Characters,
    /// Manage custom characters
    Character {
        #[command(subcommand)]
        command: CharacterCommands,
    },
    /// Chat with a character
    Chat {
        character: String,
        /// Show replies at once instead of typing them out
        #[arg(long)]
        no_typing: bool,
    },
    /// Delete the conversation with a character
    Clear { character: String },
    /// Open a page by path, e.g. /about or /conversation/coach
    Open { path: String },
    /// About this application
    About,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Unset a configuration value
    Unset { key: String },
    /// Show the current configuration
    Config,
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// Create a custom character
    Create {
        #[command(flatten)]
        fields: character::DraftArgs,
    },
    /// Edit a custom character
    Edit {
        id: String,
        #[command(flatten)]
        fields: character::DraftArgs,
    },
    /// Delete a custom character and its conversation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show one character
    Show { id: String },
}

impl Commands {
    /// Commands that read the user's characters or conversations start
    /// by syncing them.
    fn needs_sync(&self) -> bool {
        matches!(
            self,
            Commands::Characters
                | Commands::Character { .. }
                | Commands::Chat { .. }
                | Commands::Clear { .. }
                | Commands::Open { .. }
        )
    }
}

/// A failure already shown to the user as a notice.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command failed")
    }
}

impl Error for Reported {}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Err(err) = init_tracing(args.log.as_deref().map(Path::new)) {
        eprintln!("⚠️  Could not open log file: {err}");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    if let Err(err) = runtime.block_on(async_main(args)) {
        if !err.is::<Reported>() {
            eprintln!("❌ {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let orchestrator = ConfigOrchestrator::for_user();
    let command = args.command.unwrap_or(Commands::Open {
        path: "/".to_string(),
    });

    match &command {
        Commands::Set { key, value } => return settings::set(&orchestrator, key, value),
        Commands::Unset { key } => return settings::unset(&orchestrator, key),
        Commands::Config => return settings::show(&orchestrator),
        _ => {}
    }

    let config = orchestrator.load()?;
    let services = AppServices::from_config(&config)?;
    let (notifier, mut notices) = Notifier::channel();
    let mut context = AppContext::new(services, notifier);

    if command.needs_sync() {
        context.start().await;
    }

    let chat = ChatOptions {
        typing: TypingReveal::new(config.typing_delay()),
        transcript: args.transcript,
    };
    let result = dispatch(&mut context, &mut notices, command, chat).await;

    context.shutdown().await;
    print_notices(&mut notices)?;
    result
}

struct ChatOptions {
    typing: TypingReveal,
    transcript: Option<String>,
}

async fn dispatch(
    context: &mut AppContext,
    notices: &mut NoticeReceiver,
    command: Commands,
    chat: ChatOptions,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Register { username, image } => {
            account::register(context, username, &image).await
        }
        Commands::Login { username } => account::login(context, username).await,
        Commands::Logout => account::logout(context).await,
        Commands::Whoami => {
            account::whoami(context);
            Ok(())
        }
        Commands::Characters => open_route(context, notices, Route::Characters, chat).await,
        Commands::Character { command } => character::run(context, command).await,
        Commands::Chat {
            character,
            no_typing,
        } => {
            let chat = ChatOptions {
                typing: if no_typing {
                    TypingReveal::instant()
                } else {
                    chat.typing
                },
                ..chat
            };
            open_route(context, notices, Route::Conversation(character), chat).await
        }
        Commands::Clear { character } => context
            .clear_conversation(&character)
            .await
            .map_err(|_| Box::new(Reported) as Box<dyn Error>),
        Commands::Open { path } => open_route(context, notices, Route::parse(&path), chat).await,
        Commands::About => open_route(context, notices, Route::About, chat).await,
        Commands::Set { .. } | Commands::Unset { .. } | Commands::Config => Ok(()),
    }
}

async fn open_route(
    context: &mut AppContext,
    notices: &mut NoticeReceiver,
    route: Route,
    chat: ChatOptions,
) -> Result<(), Box<dyn Error>> {
    let requested = route.clone();
    let route = guard(route, context.session());
    let mut out = io::stdout().lock();

    match route {
        Route::Home => render_home(&mut out)?,
        Route::About => render_about(&mut out, &BuildInfo::current())?,
        Route::Auth => {
            if requested != Route::Auth {
                context.notifier().error(
                    "Authentication required",
                    "Please log in to start a conversation",
                );
            }
            render_auth(&mut out)?;
        }
        Route::NotFound(path) => render_not_found(&mut out, &path)?,
        Route::Characters => {
            drop(out);
            character_list::list_characters(context)?;
        }
        Route::Conversation(id) => {
            drop(out);
            let view = match context.open_conversation(&id).await {
                Ok(view) => view,
                Err(err) => {
                    context.notifier().error("Error", err.to_string());
                    return Err(Reported.into());
                }
            };
            let mut session = ChatSession {
                typing: chat.typing,
                transcript: TranscriptLog::new(chat.transcript)?,
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            run_chat(context, notices, view, &mut session, stdin, &mut stdout).await?;
        }
    }
    Ok(())
}

fn print_notices(notices: &mut NoticeReceiver) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for notice in drain_notices(notices) {
        render_notice(&mut out, &notice)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
