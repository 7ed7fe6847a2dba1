use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Character-by-character reveal of counterpart messages. Display only:
/// the stored message is always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingReveal {
    delay: Duration,
}

impl TypingReveal {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn play<W>(&self, text: &str, out: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if self.delay.is_zero() {
            out.write_all(text.as_bytes()).await?;
            return out.flush().await;
        }
        let mut buf = [0u8; 4];
        for c in text.chars() {
            out.write_all(c.encode_utf8(&mut buf).as_bytes()).await?;
            out.flush().await?;
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }
}

impl Default for TypingReveal {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            crate::core::constants::DEFAULT_TYPING_DELAY_MS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delay_is_fifteen_millis() {
        assert_eq!(
            TypingReveal::default(),
            TypingReveal::new(Duration::from_millis(15))
        );
    }

    #[tokio::test]
    async fn play_writes_full_text() {
        let mut out = Vec::new();
        TypingReveal::new(Duration::from_millis(1))
            .play("Hi ✨", &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi ✨");

        let mut out = Vec::new();
        TypingReveal::instant().play("", &mut out).await.unwrap();
        assert!(out.is_empty());
    }
}
