//! Single-threaded page loop: UI actions arrive one at a time, go to the
//! active page controller, and navigation swaps in a fresh controller.

use std::sync::Arc;

use shared::{domain::Page, protocol::NewBillForm};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    controller::{
        bills::BillsController,
        events::{FileInput, SubmitEvent},
        new_bill::NewBillController,
    },
    view::{self, lock_document, shared_document, Document, SharedDocument},
    BillService, Navigator, ProofStore, SessionStore,
};

#[derive(Clone)]
pub struct AppContext {
    pub bills: Arc<dyn BillService>,
    pub proofs: Arc<dyn ProofStore>,
    pub session: Arc<dyn SessionStore>,
}

#[derive(Debug, Clone)]
pub enum UiAction {
    Navigate(Page),
    Reload,
    ClickNewBill,
    /// Eye icon of the `row`-th displayed bill, counted from zero.
    ClickIconEye { row: usize },
    ChangeFile(FileInput),
    Submit(NewBillForm),
}

impl UiAction {
    fn name(&self) -> &'static str {
        match self {
            UiAction::Navigate(_) => "navigate",
            UiAction::Reload => "reload",
            UiAction::ClickNewBill => "click_new_bill",
            UiAction::ClickIconEye { .. } => "click_icon_eye",
            UiAction::ChangeFile(_) => "change_file",
            UiAction::Submit(_) => "submit",
        }
    }
}

/// Navigator that queues page changes for the owning [`App`].
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: UnboundedSender<Page>,
}

impl ChannelNavigator {
    pub fn new(tx: UnboundedSender<Page>) -> Self {
        Self { tx }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, page: Page) {
        debug!(path = page.path(), "navigation requested");
        if self.tx.send(page).is_err() {
            warn!(path = page.path(), "navigation dropped; app loop is gone");
        }
    }
}

pub enum ActivePage {
    Bills(BillsController),
    NewBill(NewBillController),
    Static(Page),
}

impl ActivePage {
    pub fn page(&self) -> Page {
        match self {
            ActivePage::Bills(_) => Page::Bills,
            ActivePage::NewBill(_) => Page::NewBill,
            ActivePage::Static(page) => *page,
        }
    }
}

pub struct App {
    ctx: AppContext,
    document: SharedDocument,
    nav_tx: UnboundedSender<Page>,
    nav_rx: UnboundedReceiver<Page>,
    active: Option<ActivePage>,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            document: shared_document(Document::default()),
            nav_tx,
            nav_rx,
            active: None,
        }
    }

    pub fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    pub fn snapshot(&self) -> Document {
        lock_document(&self.document).clone()
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::new(ChannelNavigator::new(self.nav_tx.clone()))
    }

    pub fn current_page(&self) -> Option<Page> {
        self.active.as_ref().map(ActivePage::page)
    }

    pub fn active(&self) -> Option<&ActivePage> {
        self.active.as_ref()
    }

    /// Replaces the document with `page` and a fresh controller for it.
    pub async fn visit(&mut self, page: Page) {
        info!(path = page.path(), "visiting page");
        *lock_document(&self.document) = view::render_route(page);

        let active = match page {
            Page::Bills => {
                let mut controller = BillsController::new(
                    self.ctx.bills.clone(),
                    self.navigator(),
                    self.ctx.session.clone(),
                    self.document.clone(),
                );
                controller.load().await;
                ActivePage::Bills(controller)
            }
            Page::NewBill => ActivePage::NewBill(NewBillController::new(
                self.ctx.bills.clone(),
                self.ctx.proofs.clone(),
                self.navigator(),
                self.ctx.session.clone(),
                self.document.clone(),
            )),
            other => ActivePage::Static(other),
        };
        self.active = Some(active);
    }

    /// Applies one action, then any navigation it requested.
    pub async fn dispatch(&mut self, action: UiAction) {
        let name = action.name();
        match (action, self.active.as_mut()) {
            (UiAction::Navigate(page), _) => {
                ChannelNavigator::new(self.nav_tx.clone()).navigate(page);
            }
            (UiAction::Reload, Some(ActivePage::Bills(controller))) => {
                controller.load().await;
            }
            (UiAction::ClickNewBill, Some(ActivePage::Bills(controller))) => {
                controller.handle_click_new_bill();
            }
            (UiAction::ClickIconEye { row }, Some(ActivePage::Bills(controller))) => {
                let icon = lock_document(&self.document)
                    .get_all_by_test_id("icon-eye")
                    .get(row)
                    .map(|icon| (*icon).clone());
                match icon {
                    Some(icon) => controller.handle_click_icon_eye(&icon),
                    None => warn!(row, "no eye icon at this row"),
                }
            }
            (UiAction::ChangeFile(mut input), Some(ActivePage::NewBill(controller))) => {
                controller.handle_change_file(&mut input);
            }
            (UiAction::Submit(form), Some(ActivePage::NewBill(controller))) => {
                let mut event = SubmitEvent::new(form);
                controller.handle_submit(&mut event).await;
            }
            (_, active) => {
                debug!(
                    action = name,
                    page = active.map(|a| a.page().path()).unwrap_or("none"),
                    "action ignored on this page"
                );
            }
        }
        self.follow_navigation().await;
    }

    async fn follow_navigation(&mut self) {
        while let Ok(page) = self.nav_rx.try_recv() {
            self.visit(page).await;
        }
    }

    /// Drains `actions` until every sender is dropped and returns the final document.
    pub async fn run(mut self, mut actions: mpsc::Receiver<UiAction>) -> Document {
        while let Some(action) = actions.recv().await {
            self.dispatch(action).await;
        }
        self.snapshot()
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
