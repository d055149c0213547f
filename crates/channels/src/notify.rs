//! Console notifier — reminders as terminal banners.

use async_trait::async_trait;
use streamcoach_config::NotificationConfig;
use streamcoach_core::error::NotifyError;
use streamcoach_core::notifier::{Notifier, Reminder};

/// Prints each reminder as a titled banner on stdout.
pub struct ConsoleNotifier {
    app_name: String,
    sound: bool,
}

impl ConsoleNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            sound: config.sound,
        }
    }

    /// The banner text for `reminder`, without the bell.
    pub fn render(&self, reminder: &Reminder) -> String {
        format!(
            "🔔 [{}] {}  ({})\n   {}\n   ↳ {}",
            self.app_name,
            reminder.title,
            reminder.at.format("%H:%M:%S"),
            reminder.message,
            reminder.reason
        )
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        let bell = if self.sound { "\x07" } else { "" };
        println!("{bell}{}", self.render(reminder));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_has_title_message_and_reason() {
        let notifier = ConsoleNotifier::new(&NotificationConfig::default());
        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(21, 5, 9)
            .unwrap()
            .and_utc();
        let reminder = Reminder::new(
            "hydration",
            "Hydration Check",
            "Stay hydrated! Take a sip of water.",
            "chat is quiet",
            at,
        );

        let banner = notifier.render(&reminder);
        assert!(banner.contains("[Coach] Hydration Check"));
        assert!(banner.contains("21:05:09"));
        assert!(banner.contains("Stay hydrated!"));
        assert!(banner.ends_with("chat is quiet"));
        assert_eq!(notifier.name(), "console");
    }

    #[tokio::test]
    async fn notify_succeeds() {
        let notifier = ConsoleNotifier::new(&NotificationConfig {
            app_name: "Coach".into(),
            sound: false,
        });
        let reminder = Reminder::new("break", "Break Time", "Stretch.", "natural pause", chrono::Utc::now());
        assert!(notifier.notify(&reminder).await.is_ok());
    }
}
