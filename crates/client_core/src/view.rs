//! Minimal document model plus the page renderers. Controllers never build
//! elements themselves; they hand props to these functions.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{
    domain::{Page, ACCEPTED_PROOF_EXTENSIONS, EXPENSE_TYPES},
    protocol::{BillRow, BillsPageProps},
};

pub const MODAL_ID: &str = "modaleFile";
pub const FILE_ERROR_MESSAGE: &str = "Seuls les fichiers jpg, jpeg et png sont acceptés";
pub const BILL_URL_ATTR: &str = "data-bill-url";

pub type SharedDocument = Arc<Mutex<Document>>;

pub fn shared_document(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}

pub fn lock_document(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_test_id(mut self, test_id: &str) -> Self {
        self.test_id = Some(test_id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(pred))
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(pred, out);
        }
    }

    /// Text of this element and its descendants, one node per line.
    pub fn text_content(&self) -> String {
        let mut lines = Vec::new();
        self.push_text(&mut lines);
        lines.join("\n")
    }

    fn push_text<'a>(&'a self, lines: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            lines.push(text);
        }
        for child in &self.children {
            child.push_text(lines);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub body: Element,
}

impl Document {
    pub fn new(children: impl IntoIterator<Item = Element>) -> Self {
        Self {
            body: Element::new("body").with_children(children),
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find(&|el| el.id.as_deref() == Some(id))
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_mut(&|el| el.id.as_deref() == Some(id))
    }

    pub fn get_by_test_id(&self, test_id: &str) -> Option<&Element> {
        self.body.find(&|el| el.test_id.as_deref() == Some(test_id))
    }

    pub fn get_by_test_id_mut(&mut self, test_id: &str) -> Option<&mut Element> {
        self.body
            .find_mut(&|el| el.test_id.as_deref() == Some(test_id))
    }

    pub fn get_all_by_test_id(&self, test_id: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.body
            .collect(&|el| el.test_id.as_deref() == Some(test_id), &mut found);
        found
    }

    pub fn text_content(&self) -> String {
        self.body.text_content()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_content().contains(needle)
    }
}

/// Renders the document shown right after navigating to `page`.
pub fn render_route(page: Page) -> Document {
    match page {
        Page::Login => login_page(),
        Page::Bills => bills_page(&BillsPageProps {
            loading: true,
            ..BillsPageProps::default()
        }),
        Page::NewBill => new_bill_page(),
        Page::Dashboard => dashboard_page(),
    }
}

pub fn bills_page(props: &BillsPageProps) -> Document {
    if props.loading {
        return loading_page();
    }
    if let Some(error) = &props.error {
        return error_page(error);
    }

    let rows = props
        .data
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(bill_row);

    Document::new([
        vertical_layout(Page::Bills),
        Element::new("div")
            .with_class("content")
            .with_child(
                Element::new("div")
                    .with_class("content-header")
                    .with_child(
                        Element::new("div")
                            .with_class("content-title")
                            .with_text("Mes notes de frais"),
                    )
                    .with_child(
                        Element::new("button")
                            .with_test_id("btn-new-bill")
                            .with_class("btn")
                            .with_text("Nouvelle note de frais"),
                    ),
            )
            .with_child(
                Element::new("table")
                    .with_id("example")
                    .with_child(Element::new("thead").with_child(
                        Element::new("tr").with_children(
                            ["Type", "Nom", "Date", "Montant", "Statut", "Actions"]
                                .into_iter()
                                .map(|h| Element::new("th").with_text(h)),
                        ),
                    ))
                    .with_child(Element::new("tbody").with_test_id("tbody").with_children(rows)),
            ),
        proof_modal(),
    ])
}

fn bill_row(row: &BillRow) -> Element {
    let mut icon = Element::new("div").with_test_id("icon-eye").with_id("eye");
    if let Some(url) = &row.file_url {
        icon.set_attr(BILL_URL_ATTR, url.as_str());
    }
    let mut tr = Element::new("tr");
    if let Some(id) = &row.id {
        tr.set_attr("data-bill-id", id.0.clone());
    }
    tr.with_children([
        Element::new("td").with_text(row.expense_type.clone()),
        Element::new("td").with_text(row.name.clone()),
        Element::new("td").with_text(row.date.clone()),
        Element::new("td").with_text(format!("{} €", row.amount)),
        Element::new("td").with_text(row.status.label()),
        Element::new("td").with_child(icon),
    ])
}

/// The hidden preview dialog every bills page carries.
pub fn proof_modal() -> Element {
    Element::new("div")
        .with_id(MODAL_ID)
        .with_class("modal")
        .with_attr("role", "dialog")
        .with_child(
            Element::new("div")
                .with_class("modal-title")
                .with_text("Justificatif"),
        )
        .with_child(Element::new("div").with_class("modal-body"))
}

pub fn loading_page() -> Document {
    Document::new([
        vertical_layout(Page::Bills),
        Element::new("div")
            .with_id("loading")
            .with_class("content")
            .with_text("Loading..."),
    ])
}

pub fn error_page(message: &str) -> Document {
    Document::new([
        vertical_layout(Page::Bills),
        Element::new("div")
            .with_class("content")
            .with_child(Element::new("div").with_class("content-header").with_text("Erreur"))
            .with_child(
                Element::new("div")
                    .with_test_id("error-message")
                    .with_text(message.to_string()),
            ),
    ])
}

pub fn new_bill_page() -> Document {
    let options = EXPENSE_TYPES
        .iter()
        .map(|label| Element::new("option").with_text(*label));
    let field = |test_id: &str, input_type: &str, label: &str| {
        Element::new("label").with_text(label).with_child(
            Element::new("input")
                .with_test_id(test_id)
                .with_attr("type", input_type),
        )
    };
    let accept = ACCEPTED_PROOF_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    Document::new([
        vertical_layout(Page::NewBill),
        Element::new("div")
            .with_class("content")
            .with_child(
                Element::new("div")
                    .with_class("content-title")
                    .with_text("Envoyer une note de frais"),
            )
            .with_child(
                Element::new("form")
                    .with_test_id("form-new-bill")
                    .with_child(
                        Element::new("label").with_text("Type de dépense").with_child(
                            Element::new("select")
                                .with_test_id("expense-type")
                                .with_children(options),
                        ),
                    )
                    .with_child(field("expense-name", "text", "Nom de la dépense"))
                    .with_child(field("datepicker", "date", "Date"))
                    .with_child(field("amount", "number", "Montant TTC"))
                    .with_child(field("vat", "number", "TVA"))
                    .with_child(field("pct", "number", "%"))
                    .with_child(
                        Element::new("label").with_text("Commentaire").with_child(
                            Element::new("textarea").with_test_id("commentary"),
                        ),
                    )
                    .with_child(
                        Element::new("label").with_text("Justificatif").with_child(
                            Element::new("input")
                                .with_test_id("file")
                                .with_attr("type", "file")
                                .with_attr("accept", accept),
                        ),
                    )
                    .with_child(
                        Element::new("div")
                            .with_test_id("file-error")
                            .with_class("hidden"),
                    )
                    .with_child(
                        Element::new("button")
                            .with_id("btn-send-bill")
                            .with_attr("type", "submit")
                            .with_text("Envoyer"),
                    ),
            ),
    ])
}

pub fn login_page() -> Document {
    Document::new([
        Element::new("form")
            .with_test_id("form-employee")
            .with_text("Employé"),
        Element::new("form")
            .with_test_id("form-admin")
            .with_text("Administration"),
    ])
}

pub fn dashboard_page() -> Document {
    Document::new([Element::new("div")
        .with_class("content")
        .with_text("Validations")])
}

fn vertical_layout(active: Page) -> Element {
    let icon = |test_id: &str, page: Page| {
        let el = Element::new("div").with_test_id(test_id);
        if page == active {
            el.with_class("active-icon")
        } else {
            el
        }
    };
    Element::new("div")
        .with_class("vertical-navbar")
        .with_child(icon("icon-window", Page::Bills))
        .with_child(icon("icon-mail", Page::NewBill))
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
