use std::sync::Arc;

use shared::domain::{Bill, Page};
use tracing::{debug, error, info, warn};

use crate::{
    controller::events::ViewState,
    session::session_email,
    view::{self, lock_document, SharedDocument, BILL_URL_ATTR, MODAL_ID},
    BillService, Element, Navigator, SessionStore,
};

/// Newest first. Stable, so bills sharing a date keep their input order.
pub fn sort_descending(mut bills: Vec<Bill>) -> Vec<Bill> {
    bills.sort_by(|a, b| b.date.cmp(&a.date));
    bills
}

pub struct BillsController {
    service: Arc<dyn BillService>,
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionStore>,
    document: SharedDocument,
    state: ViewState,
}

impl BillsController {
    pub fn new(
        service: Arc<dyn BillService>,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStore>,
        document: SharedDocument,
    ) -> Self {
        Self {
            service,
            navigator,
            session,
            document,
            state: ViewState::Loading,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Fetches the collection and renders the outcome. A failure replaces
    /// whatever was shown before; nothing is retried.
    pub async fn load(&mut self) -> &ViewState {
        self.state = ViewState::Loading;
        self.render();

        let email = session_email(self.session.as_ref());
        debug!(email = email.as_deref().unwrap_or(""), "loading bills");
        self.state = match self.service.list().await {
            Ok(response) => {
                let bills = match email.as_deref() {
                    Some(email) => response
                        .data
                        .into_iter()
                        .filter(|bill| bill.email == email)
                        .collect(),
                    None => response.data,
                };
                let bills = sort_descending(bills);
                info!(count = bills.len(), "bills loaded");
                ViewState::Ready(bills)
            }
            Err(err) => {
                error!(code = ?err.code, error = %err, "failed to load bills");
                ViewState::Error(err.to_string())
            }
        };
        self.render();
        &self.state
    }

    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(Page::NewBill);
    }

    /// Shows the proof behind `icon` in the preview modal. An icon without
    /// a URL yields an image with an empty source.
    pub fn handle_click_icon_eye(&self, icon: &Element) {
        let url = icon.attr(BILL_URL_ATTR).unwrap_or_default().to_string();
        if url.is_empty() {
            warn!("eye icon carries no proof url");
        }

        let mut document = lock_document(&self.document);
        if document.get_element_by_id(MODAL_ID).is_none() {
            document.body.children.push(view::proof_modal());
        }
        if let Some(modal) = document.get_element_by_id_mut(MODAL_ID) {
            let image = Element::new("img")
                .with_attr("src", url.clone())
                .with_attr("alt", "Bill");
            match modal.find_mut(&|el| el.has_class("modal-body")) {
                Some(body) => body.children = vec![image],
                None => modal
                    .children
                    .push(Element::new("div").with_class("modal-body").with_child(image)),
            }
            modal.add_class("show");
        }
        debug!(url = %url, "proof preview opened");
    }

    fn render(&self) {
        *lock_document(&self.document) = view::bills_page(&self.state.props());
    }
}

#[cfg(test)]
#[path = "tests/bills_tests.rs"]
mod tests;
