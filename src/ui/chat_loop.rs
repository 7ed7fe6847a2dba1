//! Line-oriented conversation loop.
//!
//! Reads one line at a time, hands plain text to the conversation view and
//! plays the counterpart's reply back through a [`TypingReveal`]. Slash
//! commands control the session; anything else is a message.

use std::error::Error;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::conversation::{ConversationView, SubmitOutcome, TypingReveal};
use crate::core::context::AppContext;
use crate::core::message::Message;
use crate::core::notice::{drain_notices, NoticeReceiver};
use crate::ui::render::{render_message, render_notice, speaker_label};
use crate::utils::logging::TranscriptLog;

const HELP_TEXT: &str = "Commands:
  /help             Show this list
  /clear            Delete this conversation and start over
  /log <filename>   Enable logging to specified file
  /log              Toggle logging pause/resume
  /quit             Leave the conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Quit,
    Clear,
    Help,
    Log(Option<String>),
    Say(String),
}

/// Classify one line of input. Unknown slash commands are sent as text.
pub fn process_input(input: &str) -> ChatCommand {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return ChatCommand::Say(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match name {
        "quit" | "exit" => ChatCommand::Quit,
        "clear" => ChatCommand::Clear,
        "help" => ChatCommand::Help,
        "log" if args.is_empty() => ChatCommand::Log(None),
        "log" => ChatCommand::Log(Some(args.to_string())),
        _ => ChatCommand::Say(input.to_string()),
    }
}

pub struct ChatSession {
    pub typing: TypingReveal,
    pub transcript: TranscriptLog,
}

/// Run the conversation with `view` until `/quit` or end of input.
pub async fn run_chat<R, W>(
    context: &mut AppContext,
    notices: &mut NoticeReceiver,
    mut view: ConversationView,
    session: &mut ChatSession,
    input: R,
    output: &mut W,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let name = view.character().name.clone();
    let character_id = view.character().id.clone();

    write_line(output, &format!("💬 Chatting with {name}. Type /help for commands.\n")).await?;
    let history = view.messages(context.conversations()).to_vec();
    for message in &history {
        write_message(output, message, &name).await?;
    }
    flush_notices(notices, output).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match process_input(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Help => write_line(output, HELP_TEXT).await?,
            ChatCommand::Log(path) => {
                let result = match path {
                    Some(path) => session.transcript.set_log_file(path),
                    None => session.transcript.toggle_logging("Logging paused"),
                };
                match result {
                    Ok(message) => write_line(output, &message).await?,
                    Err(err) => write_line(output, &format!("Error: {err}")).await?,
                }
            }
            ChatCommand::Clear => {
                if context.clear_conversation(&character_id).await.is_ok() {
                    view.mount(context.conversations(), None).await;
                    let greeting = view.messages(context.conversations()).to_vec();
                    for message in &greeting {
                        reveal(output, session, message, &name).await?;
                    }
                }
            }
            ChatCommand::Say(text) => {
                let pending = match view.begin_submit(context.conversations(), &text) {
                    Ok(pending) => pending,
                    Err(SubmitOutcome::Busy) => {
                        write_line(output, "Still waiting for a reply.").await?;
                        continue;
                    }
                    Err(_) => continue,
                };
                if let Some(sent) = view.messages(context.conversations()).last() {
                    log_turn(&session.transcript, sent, &name);
                }

                let replies = context.reply_source();
                let outcome = view
                    .finish_submit(context.conversations(), replies.as_ref(), pending)
                    .await;
                match outcome {
                    SubmitOutcome::Replied(message) | SubmitOutcome::Fallback(message) => {
                        reveal(output, session, &message, &name).await?;
                    }
                    SubmitOutcome::Ignored | SubmitOutcome::Busy => {}
                }
            }
        }
        flush_notices(notices, output).await?;
    }

    debug!(character = %character_id, "leaving conversation");
    Ok(())
}

async fn reveal<W>(
    output: &mut W,
    session: &ChatSession,
    message: &Message,
    name: &str,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let label = format!("{}: ", speaker_label(message, name));
    output.write_all(label.as_bytes()).await?;
    session.typing.play(&message.content, output).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    log_turn(&session.transcript, message, name);
    Ok(())
}

fn log_turn(transcript: &TranscriptLog, message: &Message, name: &str) {
    if let Err(err) = transcript.log_message(message, name) {
        debug!(error = %err, "transcript write failed");
    }
}

async fn write_message<W>(output: &mut W, message: &Message, name: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    render_message(&mut buf, message, name)?;
    output.write_all(&buf).await
}

async fn flush_notices<W>(notices: &mut NoticeReceiver, output: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    for notice in drain_notices(notices) {
        render_notice(&mut buf, &notice)?;
    }
    if !buf.is_empty() {
        output.write_all(&buf).await?;
        output.flush().await?;
    }
    Ok(())
}

async fn write_line<W>(output: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
