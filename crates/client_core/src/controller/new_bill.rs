use std::sync::Arc;

use chrono::NaiveDate;
use shared::{
    domain::{Bill, BillStatus, Page, ACCEPTED_PROOF_EXTENSIONS, DATE_FORMAT, DEFAULT_PCT},
    protocol::NewBillForm,
};
use tracing::{error, info, warn};

use crate::{
    controller::events::{FileInput, SelectedFile, SubmitEvent, SubmitOutcome},
    session::session_email,
    view::{lock_document, SharedDocument, FILE_ERROR_MESSAGE},
    BillService, Navigator, ProofStore, SessionStore,
};

/// True when the extension after the last `.` is an accepted image type.
pub fn is_accepted_proof(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_PROOF_EXTENSIONS.contains(&ext.as_str()))
}

/// Builds a pending bill from raw form values. Unparsable numbers fall back
/// instead of blocking the submission.
pub fn bill_from_form(form: &NewBillForm, email: String, file_name: Option<String>) -> Bill {
    let amount = match form.amount.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
        _ => {
            warn!(amount = %form.amount, "unusable amount, recording 0");
            0.0
        }
    };
    let vat = parse_optional_number(&form.vat);
    let pct = parse_optional_number(&form.pct).or(Some(DEFAULT_PCT));
    let date = form.date.trim().to_string();
    if NaiveDate::parse_from_str(&date, DATE_FORMAT).is_err() {
        warn!(date = %date, "bill date is not YYYY-MM-DD");
    }
    let commentary = Some(form.commentary.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Bill {
        id: None,
        date,
        amount,
        vat,
        pct,
        expense_type: form.expense_type.clone(),
        name: form.name.trim().to_string(),
        commentary,
        file_url: None,
        file_name,
        status: BillStatus::Pending,
        comment_admin: None,
        email,
    }
}

fn parse_optional_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub struct NewBillController {
    service: Arc<dyn BillService>,
    proofs: Arc<dyn ProofStore>,
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionStore>,
    document: SharedDocument,
    proof: Option<SelectedFile>,
    file_error: bool,
    pending: Option<Bill>,
}

impl NewBillController {
    pub fn new(
        service: Arc<dyn BillService>,
        proofs: Arc<dyn ProofStore>,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStore>,
        document: SharedDocument,
    ) -> Self {
        Self {
            service,
            proofs,
            navigator,
            session,
            document,
            proof: None,
            file_error: false,
            pending: None,
        }
    }

    /// Name of the last accepted proof file.
    pub fn file_name(&self) -> Option<&str> {
        self.proof.as_ref().map(|file| file.name.as_str())
    }

    pub fn has_file_error(&self) -> bool {
        self.file_error
    }

    /// Local copy of the bill most recently handed to the store.
    pub fn pending_bill(&self) -> Option<&Bill> {
        self.pending.as_ref()
    }

    /// Accepts or rejects the selected proof. A rejected file is dropped and
    /// the input is emptied, so it can never reach a bill.
    pub fn handle_change_file(&mut self, input: &mut FileInput) -> bool {
        let accepted = input
            .files
            .first()
            .filter(|file| is_accepted_proof(&file.name))
            .cloned();

        match accepted {
            Some(file) => {
                info!(file_name = %file.name, "proof file accepted");
                self.proof = Some(file);
                self.file_error = false;
            }
            None => {
                warn!(file_name = %input.value, "proof file rejected");
                self.proof = None;
                self.file_error = true;
                input.clear();
            }
        }
        self.render_file_state();
        !self.file_error
    }

    /// Builds a pending bill from the form, stores it, then returns to the
    /// bills page whatever the store answered.
    pub async fn handle_submit(&mut self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();

        let email = session_email(self.session.as_ref()).unwrap_or_default();
        let file_name = self.file_name().map(str::to_string);
        let mut bill = bill_from_form(&event.form, email, file_name);
        self.pending = Some(bill.clone());
        info!(
            email = %bill.email,
            has_proof = self.proof.is_some(),
            "submitting bill"
        );

        if let Some(file) = &self.proof {
            match self
                .proofs
                .upload(&file.name, file.mime_type.as_deref(), &file.content)
                .await
            {
                Ok(url) => {
                    bill.file_url = Some(url);
                    self.pending = Some(bill.clone());
                }
                Err(err) => {
                    warn!(error = %err, file_name = %file.name, "proof upload failed");
                }
            }
        }

        let outcome = match self.service.create(&bill).await {
            Ok(response) => {
                info!(total = response.data.len(), "bill created");
                SubmitOutcome::Created {
                    total: response.data.len(),
                }
            }
            Err(err) => {
                error!(code = ?err.code, error = %err, "failed to create bill");
                SubmitOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };

        self.navigator.navigate(Page::Bills);
        outcome
    }

    fn render_file_state(&self) {
        let mut document = lock_document(&self.document);
        if let Some(input) = document.get_by_test_id_mut("file") {
            match self.file_name() {
                Some(name) => {
                    input.set_attr("value", name);
                    input.remove_class("is-invalid");
                }
                None => {
                    input.set_attr("value", "");
                    input.add_class("is-invalid");
                }
            }
        }
        if let Some(indicator) = document.get_by_test_id_mut("file-error") {
            if self.file_error {
                indicator.text = Some(FILE_ERROR_MESSAGE.to_string());
                indicator.remove_class("hidden");
            } else {
                indicator.text = None;
                indicator.add_class("hidden");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
