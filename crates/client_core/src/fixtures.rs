//! Sample bills used to seed a local store and to drive tests.

use shared::domain::{Bill, BillId, BillStatus};
use url::Url;

pub const FIXTURE_EMAIL: &str = "a@a";

fn proof_url(file_name: &str) -> Option<Url> {
    Url::parse("https://files.example.com/proofs/")
        .and_then(|base| base.join(file_name))
        .ok()
}

pub fn bills() -> Vec<Bill> {
    vec![
        Bill {
            id: Some(BillId("47qAXb6fIm2zOKkLzMro".into())),
            date: "2004-04-04".into(),
            amount: 400.0,
            vat: Some(80.0),
            pct: Some(20.0),
            expense_type: "Hôtel et logement".into(),
            name: "encore".into(),
            commentary: Some("séminaire billed".into()),
            file_url: proof_url("preview-facture-free-201801-pdf-1.jpg"),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".into()),
            status: BillStatus::Pending,
            comment_admin: Some("ok".into()),
            email: FIXTURE_EMAIL.into(),
        },
        Bill {
            id: Some(BillId("BeKy5Mo4jkmdfPGYpTxZ".into())),
            date: "2001-01-01".into(),
            amount: 100.0,
            vat: None,
            pct: Some(20.0),
            expense_type: "Transports".into(),
            name: "test1".into(),
            commentary: Some("plop".into()),
            file_url: proof_url("1592770761.jpeg"),
            file_name: Some("1592770761.jpeg".into()),
            status: BillStatus::Refused,
            comment_admin: Some("en fait non".into()),
            email: FIXTURE_EMAIL.into(),
        },
        Bill {
            id: Some(BillId("UIUZtnPQvnbFnB0ozvJh".into())),
            date: "2003-03-03".into(),
            amount: 300.0,
            vat: Some(60.0),
            pct: Some(20.0),
            expense_type: "Services en ligne".into(),
            name: "test3".into(),
            commentary: None,
            file_url: proof_url("facture-client-php-exportee.png"),
            file_name: Some("facture-client-php-exportee.png".into()),
            status: BillStatus::Accepted,
            comment_admin: Some("bon bah d'accord".into()),
            email: FIXTURE_EMAIL.into(),
        },
        Bill {
            id: Some(BillId("qcCK3SzECmaZAGRrHjaC".into())),
            date: "2002-02-02".into(),
            amount: 200.0,
            vat: Some(40.0),
            pct: Some(20.0),
            expense_type: "Restaurants et bars".into(),
            name: "test2".into(),
            commentary: Some("test2".into()),
            file_url: proof_url("preview-facture-free-201801-pdf-1.jpg"),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".into()),
            status: BillStatus::Refused,
            comment_admin: Some("pas la bonne facture".into()),
            email: FIXTURE_EMAIL.into(),
        },
    ]
}
