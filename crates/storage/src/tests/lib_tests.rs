use super::*;

fn sample_bill(email: &str, date: &str, name: &str) -> Bill {
    Bill {
        id: None,
        date: date.to_string(),
        amount: 348.0,
        vat: Some(70.0),
        pct: Some(20.0),
        expense_type: "Hôtel et logement".to_string(),
        name: name.to_string(),
        commentary: Some("séminaire billed".to_string()),
        file_url: None,
        file_name: Some("facture.jpg".to_string()),
        status: BillStatus::Pending,
        comment_admin: None,
        email: email.to_string(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn create_bill_assigns_id_and_returns_full_collection() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .create_bill(&sample_bill("a@a", "2004-04-04", "encore"))
        .await
        .expect("first");
    let bills = storage
        .create_bill(&sample_bill("a@a", "2001-01-01", "test1"))
        .await
        .expect("second");

    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0].name, "encore");
    assert_eq!(bills[1].name, "test1");
    assert!(bills.iter().all(|bill| bill.id.is_some()));
    assert_ne!(bills[0].id, bills[1].id);
    assert_eq!(bills[1].status, BillStatus::Pending);
    assert_eq!(bills[1].vat, Some(70.0));
    assert_eq!(bills[1].commentary.as_deref(), Some("séminaire billed"));
}

#[tokio::test]
async fn keeps_caller_supplied_id() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut bill = sample_bill("a@a", "2002-02-02", "test2");
    bill.id = Some(BillId("qcCK3SzECmaZAGRrHjaC".to_string()));
    storage.create_bill(&bill).await.expect("create");

    let loaded = storage
        .load_bill(&BillId("qcCK3SzECmaZAGRrHjaC".to_string()))
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, bill);
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut bill = sample_bill("a@a", "2002-02-02", "test2");
    bill.id = Some(BillId("dup".to_string()));
    storage.create_bill(&bill).await.expect("create");
    assert!(storage.create_bill(&bill).await.is_err());
}

#[tokio::test]
async fn new_bills_are_stored_pending_whatever_the_caller_sends() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut bill = sample_bill("a@a", "2003-03-03", "self-approved");
    bill.status = BillStatus::Accepted;
    bill.comment_admin = Some("ok".to_string());

    let bills = storage.create_bill(&bill).await.expect("create");
    assert_eq!(bills[0].status, BillStatus::Pending);
    assert_eq!(bills[0].comment_admin, None);
}

#[tokio::test]
async fn imported_bills_keep_their_review_outcome() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut bill = sample_bill("a@a", "2001-01-01", "test1");
    bill.status = BillStatus::Refused;
    bill.comment_admin = Some("justificatif illisible".to_string());

    let bills = storage.import_bill(&bill).await.expect("import");
    assert_eq!(bills[0].status, BillStatus::Refused);
    assert_eq!(
        bills[0].comment_admin.as_deref(),
        Some("justificatif illisible")
    );
}

#[tokio::test]
async fn review_moves_pending_bill_forward_only() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let bills = storage
        .create_bill(&sample_bill("a@a", "2004-04-04", "encore"))
        .await
        .expect("create");
    let bill_id = bills[0].id.clone().expect("id");

    let reviewed = storage
        .review_bill(&bill_id, BillStatus::Accepted, Some("ok"))
        .await
        .expect("review");
    assert_eq!(reviewed.status, BillStatus::Accepted);
    assert_eq!(reviewed.comment_admin.as_deref(), Some("ok"));

    let err = storage
        .review_bill(&bill_id, BillStatus::Refused, None)
        .await
        .expect_err("decided bills stay decided");
    assert!(err.to_string().contains("cannot move"));

    let stored = storage.load_bill(&bill_id).await.expect("load").expect("bill");
    assert_eq!(stored.status, BillStatus::Accepted);
}

#[tokio::test]
async fn review_of_unknown_bill_fails() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let err = storage
        .review_bill(&BillId("missing".to_string()), BillStatus::Accepted, None)
        .await
        .expect_err("missing bill");
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn stores_proof_and_resolves_its_url() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let url = storage
        .store_proof("note de frais.png", Some("image/png"), b"\x89PNG")
        .await
        .expect("store proof");
    assert_eq!(url.scheme(), "proof");

    let proof_id = proof_id_from_url(&url).expect("proof id");
    let proof = storage
        .load_proof(&proof_id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(proof.file_name, "note de frais.png");
    assert_eq!(proof.mime_type.as_deref(), Some("image/png"));
    assert_eq!(proof.content, b"\x89PNG");
    assert_eq!(proof.size_bytes, 4);
}

#[test]
fn foreign_urls_have_no_proof_id() {
    let url = Url::parse("https://files.example.com/proofs/a.jpg").expect("url");
    assert_eq!(proof_id_from_url(&url), None);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("bills.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}
