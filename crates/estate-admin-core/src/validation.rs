//! Required-field checks run before a form is submitted.

use tracing::debug;

use crate::notify::{NotificationQueue, Severity};

/// Message shown when required fields are blank.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";

/// One form input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
    /// Input name.
    pub name: String,
    /// Current value.
    pub value: String,
    /// Whether the input must be non-blank.
    pub required: bool,
}

impl FormField {
    /// Required input.
    #[must_use]
    pub fn required(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            required: true,
        }
    }

    /// Optional input.
    #[must_use]
    pub fn optional(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, value)
        }
    }
}

/// Validity mark applied to an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMark {
    /// Input passes.
    Valid,
    /// Required input is blank.
    Invalid,
}

/// Per-field marks in form order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    /// `(name, mark)` for every input.
    pub marks: Vec<(String, FieldMark)>,
}

impl ValidationReport {
    /// Whether every input passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.marks.iter().all(|(_, mark)| *mark == FieldMark::Valid)
    }
}

/// Checks forms and reports failures through the notification queue.
#[derive(Clone)]
pub struct FormValidator {
    notifications: NotificationQueue,
}

impl FormValidator {
    /// Validator reporting onto `notifications`.
    #[must_use]
    pub const fn new(notifications: NotificationQueue) -> Self {
        Self { notifications }
    }

    /// Mark every field and emit one error notification if any required
    /// field is blank.
    pub fn validate(&self, fields: &[FormField]) -> ValidationReport {
        let marks = fields
            .iter()
            .map(|field| {
                let mark = if field.required && field.value.trim().is_empty() {
                    FieldMark::Invalid
                } else {
                    FieldMark::Valid
                };
                (field.name.clone(), mark)
            })
            .collect();
        let report = ValidationReport { marks };
        if !report.is_valid() {
            debug!("form rejected locally");
            self.notifications
                .notify(REQUIRED_FIELDS_MESSAGE, Severity::Error);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;
    use std::sync::Arc;
    use std::time::Duration;

    fn validator() -> (FormValidator, NotificationQueue) {
        let queue = NotificationQueue::new(
            Arc::new(RecordingSurface::default()),
            Duration::from_secs(5),
        )
        .expect("runtime");
        (FormValidator::new(queue.clone()), queue)
    }

    #[tokio::test(start_paused = true)]
    async fn blank_required_fields_are_marked_and_reported_once() {
        let (validator, queue) = validator();
        let report = validator.validate(&[
            FormField::required("title", "Villa"),
            FormField::required("price", "   "),
            FormField::required("city", ""),
            FormField::optional("notes", ""),
        ]);

        assert!(!report.is_valid());
        assert_eq!(
            report.marks,
            vec![
                ("title".to_string(), FieldMark::Valid),
                ("price".to_string(), FieldMark::Invalid),
                ("city".to_string(), FieldMark::Invalid),
                ("notes".to_string(), FieldMark::Valid),
            ]
        );
        let visible = queue.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, REQUIRED_FIELDS_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn complete_form_emits_nothing() {
        let (validator, queue) = validator();
        let report = validator.validate(&[FormField::required("title", "Villa")]);
        assert!(report.is_valid());
        assert!(queue.visible().is_empty());
    }
}
