use crate::core::message::{Message, Sender};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Optional plain-text transcript of a chat session, toggled with `/log`.
pub struct TranscriptLog {
    file_path: Option<String>,
    is_active: bool,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut transcript = TranscriptLog {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            transcript.set_log_file(path)?;
        }
        Ok(transcript)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(
        &mut self,
        pause_message: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                if self.is_active {
                    self.log_line(&format!("## {pause_message}"))?;
                    self.is_active = false;
                    Ok(format!("Logging paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Logging resumed to: {path}"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Append one chat turn, labelled with who said it.
    pub fn log_message(
        &self,
        message: &Message,
        counterpart_name: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let speaker = match message.sender {
            Sender::User => "You",
            Sender::Counterpart => counterpart_name,
        };
        self.log_line(&format!("{speaker}: {}", message.content))
    }

    fn log_line(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between turns, matching the screen.
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), active) => format!(
                "{} ({})",
                if active { "active" } else { "paused" },
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn logs_turns_with_speaker_labels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        let log = TranscriptLog::new(Some(path.display().to_string())).unwrap();

        log.log_message(&Message::user("coach", "Hi\nthere"), "Alex")
            .unwrap();
        log.log_message(&Message::counterpart("coach", "Hello!"), "Alex")
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: Hi\nthere\n\nAlex: Hello!\n\n");
        assert_eq!(log.get_status_string(), "active (chat.txt)");
    }

    #[test]
    fn paused_log_writes_marker_then_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        let mut log = TranscriptLog::new(None).unwrap();
        assert!(log.toggle_logging("paused").is_err());

        log.set_log_file(path.display().to_string()).unwrap();
        log.toggle_logging("Logging paused").unwrap();
        log.log_message(&Message::user("coach", "secret"), "Alex")
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "## Logging paused\n\n");
        assert!(!log.is_active());
        assert!(log.get_status_string().starts_with("paused"));
    }
}
