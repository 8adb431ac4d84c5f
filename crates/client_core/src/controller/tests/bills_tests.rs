use super::*;
use crate::{
    fixtures,
    test_support::{employee_session, empty_document, RecordingNavigator, TestBillService},
    view::lock_document,
    MemorySessionStore,
};
use shared::{domain::BillStatus, error::ApiException};

fn controller(
    service: Arc<TestBillService>,
    navigator: RecordingNavigator,
    session: Arc<dyn SessionStore>,
) -> (BillsController, SharedDocument) {
    let document = empty_document();
    let controller = BillsController::new(
        service,
        Arc::new(navigator),
        session,
        document.clone(),
    );
    (controller, document)
}

fn dates(bills: &[Bill]) -> Vec<&str> {
    bills.iter().map(|bill| bill.date.as_str()).collect()
}

#[test]
fn sorts_newest_first() {
    let sorted = sort_descending(fixtures::bills());
    assert_eq!(
        dates(&sorted),
        ["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]
    );
    assert!(sorted.windows(2).all(|pair| pair[0].date >= pair[1].date));
}

#[test]
fn sort_is_stable_and_idempotent() {
    let mut bills = fixtures::bills();
    bills[1].date = "2004-04-04".to_string();
    bills[1].name = "same day, later in input".to_string();

    let once = sort_descending(bills);
    assert_eq!(once[0].name, "encore");
    assert_eq!(once[1].name, "same day, later in input");

    let twice = sort_descending(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn sorting_nothing_yields_nothing() {
    assert!(sort_descending(Vec::new()).is_empty());
}

#[tokio::test]
async fn load_renders_sorted_bills_for_the_session_user() {
    let service = Arc::new(TestBillService::seeded());
    let (mut controller, document) =
        controller(service.clone(), RecordingNavigator::default(), employee_session("a@a"));

    let state = controller.load().await.clone();
    let bills = state.bills().expect("ready");
    assert_eq!(
        dates(bills),
        ["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]
    );
    assert_eq!(service.list_calls(), 1);

    let document = lock_document(&document);
    assert!(!document.contains_text("Loading..."));
    assert_eq!(document.get_all_by_test_id("icon-eye").len(), 4);
    assert!(document.contains_text("Refusé"));
}

#[tokio::test]
async fn load_hides_bills_of_other_submitters() {
    let mut bills = fixtures::bills();
    bills[2].email = "someone@else".to_string();
    let service = Arc::new(TestBillService::with_bills(bills));
    let (mut controller, _document) =
        controller(service, RecordingNavigator::default(), employee_session("a@a"));

    let state = controller.load().await;
    let bills = state.bills().expect("ready");
    assert_eq!(bills.len(), 3);
    assert!(bills.iter().all(|bill| bill.email == "a@a"));
}

#[tokio::test]
async fn load_without_session_shows_everything() {
    let service = Arc::new(TestBillService::seeded());
    let (mut controller, _document) = controller(
        service,
        RecordingNavigator::default(),
        Arc::new(MemorySessionStore::new()),
    );
    assert_eq!(controller.load().await.bills().map(<[Bill]>::len), Some(4));
}

#[tokio::test]
async fn load_failure_with_404_renders_message() {
    let service =
        Arc::new(TestBillService::seeded().failing_list(ApiException::from_status(404)));
    let (mut controller, document) =
        controller(service, RecordingNavigator::default(), employee_session("a@a"));

    assert_eq!(
        controller.load().await,
        &ViewState::Error("Erreur 404".to_string())
    );
    assert!(lock_document(&document).contains_text("Erreur 404"));
}

#[tokio::test]
async fn load_failure_with_500_renders_message() {
    let service =
        Arc::new(TestBillService::seeded().failing_list(ApiException::from_status(500)));
    let (mut controller, document) =
        controller(service.clone(), RecordingNavigator::default(), employee_session("a@a"));

    controller.load().await;
    let document = lock_document(&document);
    assert!(document.contains_text("Erreur 500"));
    assert!(document.get_by_test_id("tbody").is_none());
    assert_eq!(service.list_calls(), 1, "failures are not retried");
}

#[tokio::test]
async fn failed_reload_drops_previous_data() {
    let service = Arc::new(TestBillService::seeded());
    let navigator = RecordingNavigator::default();
    let session = employee_session("a@a");
    let (mut controller, document) = controller(service.clone(), navigator, session.clone());
    controller.load().await;
    assert!(matches!(controller.state(), ViewState::Ready(_)));

    let failing = Arc::new(
        TestBillService::with_bills(service.bills.lock().expect("bills").clone())
            .failing_list(ApiException::from_status(500)),
    );
    let mut reloaded = BillsController::new(
        failing,
        Arc::new(RecordingNavigator::default()),
        session,
        document.clone(),
    );
    reloaded.load().await;
    assert_eq!(reloaded.state(), &ViewState::Error("Erreur 500".to_string()));
    assert!(lock_document(&document).get_all_by_test_id("icon-eye").is_empty());
}

#[tokio::test]
async fn click_new_bill_only_navigates() {
    let navigator = RecordingNavigator::default();
    let (mut controller, document) = controller(
        Arc::new(TestBillService::seeded()),
        navigator.clone(),
        employee_session("a@a"),
    );
    controller.load().await;
    let before = lock_document(&document).clone();

    controller.handle_click_new_bill();

    assert_eq!(navigator.pages(), vec![Page::NewBill]);
    assert_eq!(*lock_document(&document), before);
}

#[tokio::test]
async fn click_icon_eye_opens_modal_with_proof() {
    let (mut controller, document) = controller(
        Arc::new(TestBillService::seeded()),
        RecordingNavigator::default(),
        employee_session("a@a"),
    );
    controller.load().await;
    let icon = lock_document(&document).get_all_by_test_id("icon-eye")[0].clone();
    let url = icon.attr(BILL_URL_ATTR).expect("url").to_string();

    controller.handle_click_icon_eye(&icon);

    let document = lock_document(&document);
    let modal = document.get_element_by_id(MODAL_ID).expect("modal");
    assert!(modal.has_class("show"));
    let image = modal.find(&|el| el.tag == "img").expect("image");
    assert_eq!(image.attr("src"), Some(url.as_str()));
}

#[tokio::test]
async fn click_icon_eye_without_url_still_opens_modal() {
    let mut bills = fixtures::bills();
    for bill in &mut bills {
        bill.file_url = None;
    }
    let (mut controller, document) = controller(
        Arc::new(TestBillService::with_bills(bills)),
        RecordingNavigator::default(),
        employee_session("a@a"),
    );
    controller.load().await;
    let icon = lock_document(&document).get_all_by_test_id("icon-eye")[0].clone();

    controller.handle_click_icon_eye(&icon);

    let document = lock_document(&document);
    let modal = document.get_element_by_id(MODAL_ID).expect("modal");
    let image = modal.find(&|el| el.tag == "img").expect("image");
    assert_eq!(image.attr("src"), Some(""));
}

#[test]
fn click_icon_eye_adds_modal_when_page_has_none() {
    let (controller, document) = controller(
        Arc::new(TestBillService::seeded()),
        RecordingNavigator::default(),
        employee_session("a@a"),
    );
    assert!(lock_document(&document).get_element_by_id(MODAL_ID).is_none());

    let icon = Element::new("div")
        .with_test_id("icon-eye")
        .with_attr(BILL_URL_ATTR, "https://files.example.com/proofs/a.png");
    controller.handle_click_icon_eye(&icon);

    assert!(lock_document(&document).get_element_by_id(MODAL_ID).is_some());
}

#[tokio::test]
async fn statuses_come_from_the_store_untouched() {
    let (mut controller, _document) = controller(
        Arc::new(TestBillService::seeded()),
        RecordingNavigator::default(),
        employee_session("a@a"),
    );
    let state = controller.load().await;
    let statuses: Vec<BillStatus> = state
        .bills()
        .expect("ready")
        .iter()
        .map(|bill| bill.status)
        .collect();
    assert_eq!(
        statuses,
        [
            BillStatus::Pending,
            BillStatus::Accepted,
            BillStatus::Refused,
            BillStatus::Refused
        ]
    );
}
