use std::future::Future;

use crate::error::ApiResult;

/// FormModel
///
/// The field values behind one form. `Default` is the cleared state.
pub trait FormModel: Default {
    /// What the gateway call receives: a typed JSON payload or a `RequestBody`.
    type Payload;

    /// `(label, value)` for every field that must not be empty.
    fn required(&self) -> Vec<(&'static str, &str)>;

    fn payload(&self) -> Self::Payload;
}

/// Result of one submit attempt.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome<R> {
    /// The server accepted the mutation; the fields have been cleared.
    Submitted(R),
    /// A required field was empty. No request was made.
    Invalid(String),
    /// The server or network rejected the mutation; the fields are kept.
    Failed(String),
}

impl<R> SubmitOutcome<R> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }

    pub fn into_submitted(self) -> Option<R> {
        match self {
            SubmitOutcome::Submitted(r) => Some(r),
            _ => None,
        }
    }
}

/// MutationForm
///
/// Local field state plus the submit cycle shared by every form on the site.
/// `submit` borrows the form mutably for the whole round trip, so a second
/// submission cannot start while one is pending.
#[derive(Debug, Clone)]
pub struct MutationForm<M> {
    pub fields: M,
    error: Option<String>,
    fallback: String,
}

impl<M: FormModel> MutationForm<M> {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self::with_fields(M::default(), fallback)
    }

    pub fn with_fields(fields: M, fallback: impl Into<String>) -> Self {
        Self {
            fields,
            error: None,
            fallback: fallback.into(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Shows a page-level message in the form's error slot.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        self.fields = M::default();
        self.error = None;
    }

    /// First required field left empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        self.fields
            .required()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label)
    }

    pub async fn submit<R, F, Fut>(&mut self, send: F) -> SubmitOutcome<R>
    where
        F: FnOnce(M::Payload) -> Fut,
        Fut: Future<Output = ApiResult<R>>,
    {
        if let Some(label) = self.missing_field() {
            let message = format!("{} is required.", label);
            self.error = Some(message.clone());
            return SubmitOutcome::Invalid(message);
        }

        self.error = None;
        match send(self.fields.payload()).await {
            Ok(response) => {
                self.fields = M::default();
                SubmitOutcome::Submitted(response)
            }
            Err(e) => {
                let message = e.user_message(&self.fallback);
                tracing::warn!("form submit failed: {}", e);
                self.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}
