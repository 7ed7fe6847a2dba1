//! Plain-text renderings of the shell's pages.

use std::io::{self, Write};

use crate::character::Character;
use crate::core::message::{Message, Sender};
use crate::core::notice::Notice;

pub const APP_NAME: &str = "KappaAI";

const ABOUT_PARAGRAPHS: [&str; 3] = [
    "KappaAI was created to address a fundamental human need: meaningful conversation. \
In today's fast-paced world, people often find themselves isolated, whether physically \
or emotionally, without access to the kind of interactions that enrich our lives and \
broaden our perspectives.",
    "We believe that AI can play a vital role in meeting this need, not by replacing human \
connection, but by supplementing it. Our platform provides access to diverse AI characters, \
each designed to offer unique conversational experiences that can inspire, comfort, \
challenge, or simply entertain.",
    "Whether you're seeking philosophical discourse, creative inspiration, or just a friendly \
chat, KappaAI is designed to be available whenever and wherever you need it.",
];

const PRIVACY_PARAGRAPH: &str = "All conversations are private and securely stored. \
You can delete your conversation history at any time with `kappachat clear <character>`.";

/// Version details baked in by the build script.
pub struct BuildInfo {
    pub version: &'static str,
    pub describe: &'static str,
    pub sha: &'static str,
    pub built_at: &'static str,
    pub rustc: &'static str,
    pub target: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            describe: option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
            sha: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            built_at: option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            rustc: option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
            target: option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
        }
    }
}

pub fn render_home(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "💬 {APP_NAME}: Meaningful Conversations, Anytime, Anywhere")?;
    writeln!(out)?;
    writeln!(
        out,
        "{APP_NAME} connects you with AI-powered characters, each with unique personalities \
and perspectives."
    )?;
    writeln!(
        out,
        "From philosophical discussions to creative brainstorming, find the perfect \
conversation partner."
    )?;
    writeln!(out)?;
    writeln!(out, "  • Diverse Characters   kappachat characters")?;
    writeln!(out, "  • Start Conversing     kappachat chat <character>")?;
    writeln!(out, "  • Learn More           kappachat about")?;
    Ok(())
}

pub fn render_about(out: &mut impl Write, build: &BuildInfo) -> io::Result<()> {
    writeln!(out, "About {APP_NAME}")?;
    writeln!(out, "Connecting humans with AI for meaningful conversations")?;
    writeln!(out)?;
    writeln!(out, "Our Mission")?;
    for paragraph in ABOUT_PARAGRAPHS {
        writeln!(out, "{paragraph}")?;
        writeln!(out)?;
    }
    writeln!(out, "Privacy")?;
    writeln!(out, "{PRIVACY_PARAGRAPH}")?;
    writeln!(out)?;
    writeln!(out, "kappachat {} ({})", build.version, build.describe)?;
    writeln!(out, "  commit:  {}", build.sha)?;
    writeln!(out, "  built:   {}", build.built_at)?;
    writeln!(out, "  rustc:   {} ({})", build.rustc, build.target)?;
    Ok(())
}

/// One-line summary, used in lists.
pub fn character_line(character: &Character) -> String {
    format!(
        "{} ({}): {}",
        character.name, character.id, character.personality
    )
}

pub fn render_character_list(
    out: &mut impl Write,
    builtin: &[Character],
    custom: &[Character],
    signed_in: bool,
) -> io::Result<()> {
    writeln!(out, "Available characters:\n")?;
    for character in builtin {
        writeln!(out, "  • {}", character_line(character))?;
    }

    writeln!(out, "\nYour characters:\n")?;
    if !signed_in {
        writeln!(out, "  Log in to create and see your own characters.")?;
        writeln!(out, "   kappachat login")?;
    } else if custom.is_empty() {
        writeln!(out, "  No custom characters yet.")?;
        writeln!(out, "\n💡 Create one with:")?;
        writeln!(out, "   kappachat character create")?;
    } else {
        for character in custom {
            writeln!(out, "  • {}", character_line(character))?;
        }
    }

    writeln!(out, "\n💡 Start a conversation with:")?;
    writeln!(out, "   kappachat chat <character-id>")?;
    Ok(())
}

pub fn render_character(out: &mut impl Write, character: &Character) -> io::Result<()> {
    writeln!(out, "{} ({})", character.name, character.id)?;
    writeln!(out, "  Personality: {}", character.personality)?;
    writeln!(out, "  Image: {}", character.image_url)?;
    match character.owner() {
        Some(owner) => writeln!(out, "  Owner: user {owner}")?,
        None => writeln!(out, "  Built-in character")?,
    }
    writeln!(out)?;
    writeln!(out, "{}", character.description)?;
    Ok(())
}

pub fn speaker_label<'a>(message: &Message, counterpart_name: &'a str) -> &'a str {
    match message.sender {
        Sender::User => "You",
        Sender::Counterpart => counterpart_name,
    }
}

pub fn render_message(
    out: &mut impl Write,
    message: &Message,
    counterpart_name: &str,
) -> io::Result<()> {
    let time = message.timestamp.format("%H:%M");
    writeln!(
        out,
        "[{time}] {}: {}",
        speaker_label(message, counterpart_name),
        message.content
    )
}

pub fn render_notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{notice}")
}

pub fn render_not_found(out: &mut impl Write, path: &str) -> io::Result<()> {
    writeln!(out, "404: Oops! Page not found ({path})")?;
    writeln!(out, "   Return home with: kappachat open /")?;
    Ok(())
}

pub fn render_auth(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "🔐 Sign in to {APP_NAME}")?;
    writeln!(out, "   kappachat login       log in to an existing account")?;
    writeln!(out, "   kappachat register    create a new account")?;
    Ok(())
}
