//! Localized notification text.

use crate::settings::Language;

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// Builds the countdown completion notification for `language`.
#[must_use]
pub fn completion_content(language: Language) -> NotificationContent {
    let (title, body) = match language {
        Language::Es => (
            "¡Tiempo cumplido!",
            "Tu sesión de productividad ha finalizado.",
        ),
        Language::En => ("Time's up!", "Your productivity session has finished."),
    };
    NotificationContent {
        title: title.to_string(),
        body: body.to_string(),
    }
}
