use crate::domain::countries;
use crate::domain::model::FormData;
use crate::utils::error::Result;
use std::path::Path;

pub const REPORT_TITLE: &str = "AI Tax Considerations";
pub const DISCLAIMER: &str = "This advice is AI-generated and for informational purposes only. \
It is not a substitute for professional tax advice.";

/// Figures as they were dispatched, plus the country's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSnapshot {
    pub form: FormData,
    pub country_name: String,
}

impl SubmittedSnapshot {
    pub fn capture(payload: &FormData) -> Self {
        Self {
            form: payload.clone(),
            country_name: countries::display_name(&payload.country),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceReport {
    advice: String,
    snapshot: SubmittedSnapshot,
    generated_at: chrono::DateTime<chrono::Local>,
}

impl AdviceReport {
    pub fn new(advice: String, snapshot: SubmittedSnapshot) -> Self {
        Self {
            advice,
            snapshot,
            generated_at: chrono::Local::now(),
        }
    }

    pub fn advice(&self) -> &str {
        &self.advice
    }

    pub fn snapshot(&self) -> &SubmittedSnapshot {
        &self.snapshot
    }

    pub fn country_name(&self) -> &str {
        &self.snapshot.country_name
    }

    pub fn render_text(&self) -> String {
        let form = &self.snapshot.form;
        let lines = [
            REPORT_TITLE.to_string(),
            "=".repeat(REPORT_TITLE.len()),
            format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M")),
            String::new(),
            format!("Country:     {} ({})", self.snapshot.country_name, form.country),
            format!("Income:      {}", form.income),
            format!("Expenses:    {}", form.expenses),
            format!("Deductions:  {}", form.deductions),
            String::new(),
            self.advice.trim_end().to_string(),
            String::new(),
            format!("Note: {}", DISCLAIMER),
        ];
        format!("{}\n", lines.join("\n"))
    }

    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render_text())?;
        tracing::info!("📁 Report saved to: {}", path.display());
        Ok(())
    }
}
