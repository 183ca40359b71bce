use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Income,
    Expenses,
    Deductions,
    Country,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Income,
        Field::Expenses,
        Field::Deductions,
        Field::Country,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Income => "income",
            Field::Expenses => "expenses",
            Field::Deductions => "deductions",
            Field::Country => "country",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw form input. Amounts stay as typed until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub income: String,
    pub expenses: String,
    pub deductions: String,
    pub country: String,
}

impl FormData {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Income => &self.income,
            Field::Expenses => &self.expenses,
            Field::Deductions => &self.deductions,
            Field::Country => &self.country,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Income => self.income = value,
            Field::Expenses => self.expenses = value,
            Field::Deductions => self.deductions = value,
            Field::Country => self.country = value,
        }
    }

    /// Payload sent to the advice endpoint: blank deductions go out as "0".
    pub fn to_payload(&self) -> FormData {
        let mut payload = self.clone();
        if payload.deductions.trim().is_empty() {
            payload.deductions = "0".to_string();
        }
        payload
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, String>,
    general: Option<String>,
}

impl ValidationErrors {
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn set_field(&mut self, field: Field, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.general = Some(message.into());
    }

    pub fn clear_field(&mut self, field: Field) {
        self.fields.remove(&field);
    }

    pub fn clear_general(&mut self) {
        self.general = None;
    }

    pub fn has_field_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    pub fn iter_fields(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    #[serde(default)]
    pub advice: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub project_name: String,
    pub version: String,
    pub description: String,
    pub default_openai_model: String,
    pub configured_openai_model: String,
    pub api: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
}
