use crate::core::preferences::PreferenceStore;
use crate::core::report::{AdviceReport, SubmittedSnapshot};
use crate::domain::model::{AdviceResponse, Field, FormData, ValidationErrors};
use crate::domain::ports::AdviceApi;
use crate::utils::validation::{parse_non_negative_amount, AmountIssue};
use std::sync::Arc;

pub const MISSING_ADVICE_MESSAGE: &str = "Failed to get advice. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

fn amount_message(field: Field, issue: AmountIssue) -> String {
    let label = match field {
        Field::Income => "Income",
        Field::Expenses => "Expenses",
        Field::Deductions => "Deductions",
        Field::Country => "Country",
    };
    match issue {
        AmountIssue::Missing => format!("{} is required.", label),
        AmountIssue::NotANumber | AmountIssue::Negative => {
            format!("{} must be a non-negative number.", label)
        }
    }
}

/// 檢查所有欄位（不短路），回傳各欄位錯誤
pub fn validate_form(form: &FormData) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if form.country.trim().is_empty() {
        errors.set_field(Field::Country, "Please select your country.");
    }

    for field in [Field::Income, Field::Expenses] {
        if let Err(issue) = parse_non_negative_amount(form.get(field)) {
            errors.set_field(field, amount_message(field, issue));
        }
    }

    if !form.deductions.trim().is_empty() {
        if let Err(issue) = parse_non_negative_amount(&form.deductions) {
            errors.set_field(Field::Deductions, amount_message(Field::Deductions, issue));
        }
    }

    errors
}

pub struct FormController {
    api: Arc<dyn AdviceApi>,
    preferences: PreferenceStore,
    form: FormData,
    errors: ValidationErrors,
    phase: FormPhase,
    report: Option<AdviceReport>,
}

impl FormController {
    /// Starts empty, with the country pre-filled from the last selection.
    pub fn new(api: Arc<dyn AdviceApi>, preferences: PreferenceStore) -> Self {
        let form = FormData {
            country: preferences.last_country().unwrap_or_default(),
            ..FormData::default()
        };

        Self {
            api,
            preferences,
            form,
            errors: ValidationErrors::default(),
            phase: FormPhase::Idle,
            report: None,
        }
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn report(&self) -> Option<&AdviceReport> {
        self.report.as_ref()
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();

        if field == Field::Country && !value.is_empty() && value != self.form.country {
            if let Err(e) = self.preferences.remember_country(&value) {
                tracing::warn!("🔶 Could not save country preference: {}", e);
            }
        }

        self.form.set(field, value);
        self.errors.clear_field(field);
        self.errors.clear_general();
    }

    pub async fn submit(&mut self) -> FormPhase {
        self.phase = FormPhase::Validating;
        self.report = None;
        self.errors.clear_general();

        let errors = validate_form(&self.form);
        if errors.has_field_errors() {
            tracing::info!(
                "🔶 Form rejected locally: {}",
                errors
                    .iter_fields()
                    .map(|(field, _)| field.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.errors = errors;
            self.phase = FormPhase::Failed;
            return self.phase;
        }
        self.errors = ValidationErrors::default();

        let payload = self.form.to_payload();
        self.phase = FormPhase::Submitting;
        tracing::info!("📤 Submitting tax figures for country: {}", payload.country);

        match self.api.submit_for_advice(&payload).await {
            Ok(AdviceResponse { advice, message, error }) => match advice.filter(|a| !a.is_empty()) {
                Some(advice) => {
                    tracing::info!("✅ Advice received ({} chars)", advice.len());
                    self.report = Some(AdviceReport::new(advice, SubmittedSnapshot::capture(&payload)));
                    self.phase = FormPhase::Success;
                }
                None => {
                    tracing::warn!("🔶 Response carried no advice: {:?}", message);
                    let reason = error.filter(|e| !e.is_empty());
                    self.errors
                        .set_general(reason.as_deref().unwrap_or(MISSING_ADVICE_MESSAGE));
                    self.phase = FormPhase::Failed;
                }
            },
            Err(e) => {
                tracing::error!("❌ Advice request failed: {}", e);
                self.errors.set_general(e.message());
                self.phase = FormPhase::Failed;
            }
        }

        self.phase
    }

    /// Closes the current report.
    pub fn dismiss_report(&mut self) {
        self.report = None;
        if self.phase == FormPhase::Success {
            self.phase = FormPhase::Idle;
        }
    }
}
