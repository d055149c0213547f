//! Console source — the local terminal as a stand-in for live chat.
//!
//! Every line typed on stdin becomes a chat message. `name: text` attributes
//! the line to `name`; lines starting with `/` are streamer commands
//! (`/voice on`, `/snooze hydration 10`, `/unsnooze all`, `/reset break`).

use async_trait::async_trait;
use chrono::Utc;
use streamcoach_core::error::SourceError;
use streamcoach_core::signal::{ChatCommand, SignalEvent};
use streamcoach_core::source::{SignalSource, SourceId};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const DEFAULT_SENDER: &str = "console";

/// Reads chat and commands from stdin.
pub struct ConsoleSource {
    id: SourceId,
}

impl ConsoleSource {
    pub fn new() -> Self {
        Self {
            id: SourceId("console".into()),
        }
    }
}

impl Default for ConsoleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSource for ConsoleSource {
    fn name(&self) -> &str {
        "console"
    }

    fn id(&self) -> &SourceId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<SignalEvent, SourceError>>, SourceError> {
        Ok(read_lines(BufReader::new(io::stdin())))
    }
}

/// Turn lines from `reader` into events until EOF or an exit command.
pub fn read_lines<R>(reader: R) -> mpsc::Receiver<Result<SignalEvent, SourceError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
                        break;
                    }

                    if tx.send(parse_line(line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    let _ = tx.send(Err(SourceError::ConnectionLost(e.to_string()))).await;
                    break;
                }
            }
        }
    });

    rx
}

fn parse_line(line: &str) -> Result<SignalEvent, SourceError> {
    let now = Utc::now();

    if line.starts_with('/') {
        if ChatCommand::parse(line).is_none() {
            return Err(SourceError::Malformed {
                source_name: "console".into(),
                reason: format!("unknown command '{line}'"),
            });
        }
        return Ok(SignalEvent::Chat {
            timestamp: now,
            sender: DEFAULT_SENDER.into(),
            text: line.to_string(),
            from_streamer: true,
        });
    }

    let (sender, text) = match line.split_once(':') {
        Some((name, text)) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            (name, text.trim())
        }
        _ => (DEFAULT_SENDER, line),
    };

    Ok(SignalEvent::chat(now, sender, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_source_properties() {
        let source = ConsoleSource::new();
        assert_eq!(source.name(), "console");
        assert_eq!(source.id().0, "console");
    }

    #[test]
    fn plain_line_is_chat() {
        let event = parse_line("hello chat").unwrap();
        assert!(matches!(
            event,
            SignalEvent::Chat { sender, text, from_streamer: false, .. }
                if sender == "console" && text == "hello chat"
        ));
    }

    #[test]
    fn named_line_sets_sender() {
        let event = parse_line("viewer42: POGGERS").unwrap();
        assert!(matches!(
            event,
            SignalEvent::Chat { sender, text, .. } if sender == "viewer42" && text == "POGGERS"
        ));

        // A colon later in a sentence is not a sender prefix
        let event = parse_line("note to self: drink water").unwrap();
        assert!(matches!(event, SignalEvent::Chat { sender, .. } if sender == "console"));
    }

    #[test]
    fn slash_commands_come_from_the_streamer() {
        let event = parse_line("/snooze hydration 5").unwrap();
        assert!(matches!(event, SignalEvent::Chat { from_streamer: true, .. }));
    }

    #[test]
    fn unknown_command_is_malformed() {
        let err = parse_line("/dance").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn reader_stops_at_exit() {
        let input: &'static [u8] = b"first\n\n/voice on\nexit\nnever seen\n";
        let mut rx = read_lines(input);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event.unwrap());
        }

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "chat");
    }
}
