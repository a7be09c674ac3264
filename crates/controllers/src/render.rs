//! Markup for controller state, rendered through autoescaped tera templates.
//! Nothing here touches a collaborator.

use serde::Serialize;
use shared::domain::{Bill, BillStatus};
use tera::{Context, Tera};

use crate::{
    bills::{AttachmentDialog, BillRow, BillsPage},
    dashboard::{DashboardState, PanelState, TicketView},
    error::ControllerError,
    format::format_date,
};

const ACTIVE_CARD_COLOR: &str = "#2A2B35";
const CARD_COLOR: &str = "#0D5AE5";
const TICKET_PLACEHOLDER: &str = "<div id=\"big-billed-icon\" data-testid=\"big-billed-icon\"></div>";

const TEMPLATES: [(&str, &str); 7] = [
    ("bills_page.html", include_str!("../templates/bills_page.html")),
    ("error_page.html", include_str!("../templates/error_page.html")),
    ("attachment_modal.html", include_str!("../templates/attachment_modal.html")),
    ("file_format_error.html", include_str!("../templates/file_format_error.html")),
    ("cards.html", include_str!("../templates/cards.html")),
    ("dashboard_form.html", include_str!("../templates/dashboard_form.html")),
    ("dashboard_page.html", include_str!("../templates/dashboard_page.html")),
];

#[derive(Serialize)]
struct RowView<'a> {
    expense_type: &'a str,
    name: &'a str,
    date: String,
    amount: u64,
    status: &'a str,
    file_url: &'a str,
}

#[derive(Serialize)]
struct CardView<'a> {
    id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    name: &'a str,
    amount: u64,
    date: String,
    expense_type: &'a str,
    background: &'static str,
}

impl<'a> CardView<'a> {
    fn new(bill: &'a Bill, highlighted: bool) -> Self {
        let (first_name, last_name) = employee_names(&bill.employee_email);
        Self {
            id: bill.id.as_ref().map(|id| id.as_str()).unwrap_or_default(),
            first_name,
            last_name,
            name: &bill.name,
            amount: bill.amount,
            date: format_date(&bill.date),
            expense_type: &bill.expense_type,
            background: if highlighted {
                ACTIVE_CARD_COLOR
            } else {
                CARD_COLOR
            },
        }
    }
}

#[derive(Serialize)]
struct FormView<'a> {
    expense_type: &'a str,
    name: &'a str,
    date: String,
    amount: u64,
    vat: &'a str,
    pct: u32,
    commentary: &'a str,
    file_name: &'a str,
    file_url: &'a str,
    pending: bool,
    comment_admin: &'a str,
}

#[derive(Serialize)]
struct PanelView {
    index: u8,
    title: &'static str,
    expanded: bool,
    content: String,
}

/// Compiled page templates. Build once and share.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, ControllerError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    fn render(&self, name: &str, context: &Context) -> Result<String, ControllerError> {
        Ok(self.tera.render(name, context)?)
    }

    /// Rows with the latest date first. ISO dates order correctly as text.
    pub fn bills_page(&self, page: &BillsPage) -> Result<String, ControllerError> {
        let rows = match page {
            BillsPage::Loaded(rows) => rows,
            BillsPage::Error(message) => return self.error_page(message),
        };
        let mut sorted: Vec<&BillRow> = rows.iter().collect();
        sorted.sort_by(|a, b| b.bill.date.cmp(&a.bill.date));
        let rows: Vec<RowView> = sorted
            .into_iter()
            .map(|row| RowView {
                expense_type: &row.bill.expense_type,
                name: &row.bill.name,
                date: format_date(&row.bill.date),
                amount: row.bill.amount,
                status: row.status_label,
                file_url: row.bill.file_url.as_deref().unwrap_or_default(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("rows", &rows);
        self.render("bills_page.html", &context)
    }

    pub fn error_page(&self, message: &str) -> Result<String, ControllerError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("error_page.html", &context)
    }

    pub fn attachment_modal(&self, dialog: &AttachmentDialog) -> Result<String, ControllerError> {
        let mut context = Context::new();
        context.insert("url", &dialog.url);
        self.render("attachment_modal.html", &context)
    }

    /// Empty when there is no message.
    pub fn file_format_error(&self, message: &str) -> Result<String, ControllerError> {
        if message.is_empty() {
            return Ok(String::new());
        }
        let mut context = Context::new();
        context.insert("message", message);
        self.render("file_format_error.html", &context)
    }

    pub fn card(&self, bill: &Bill, highlighted: bool) -> Result<String, ControllerError> {
        self.render_cards(vec![CardView::new(bill, highlighted)])
    }

    pub fn cards(&self, bills: &[Bill], state: &DashboardState) -> Result<String, ControllerError> {
        let cards = bills
            .iter()
            .map(|bill| CardView::new(bill, is_highlighted(bill, state)))
            .collect();
        self.render_cards(cards)
    }

    fn render_cards(&self, cards: Vec<CardView<'_>>) -> Result<String, ControllerError> {
        let mut context = Context::new();
        context.insert("cards", &cards);
        self.render("cards.html", &context)
    }

    pub fn dashboard_form(&self, bill: &Bill) -> Result<String, ControllerError> {
        let form = FormView {
            expense_type: &bill.expense_type,
            name: &bill.name,
            date: format_date(&bill.date),
            amount: bill.amount,
            vat: &bill.vat,
            pct: bill.pct,
            commentary: &bill.commentary,
            file_name: bill.file_name.as_deref().unwrap_or_default(),
            file_url: bill.file_url.as_deref().unwrap_or_default(),
            pending: bill.status == BillStatus::Pending,
            comment_admin: bill.comment_admin.as_deref().unwrap_or_default(),
        };
        let mut context = Context::new();
        context.insert("form", &form);
        self.render("dashboard_form.html", &context)
    }

    /// Content of a panel's container; empty while collapsed.
    pub fn panel_content(
        &self,
        state: &DashboardState,
        status: BillStatus,
    ) -> Result<String, ControllerError> {
        self.cards(state.panel_bills(status), state)
    }

    pub fn right_pane(&self, state: &DashboardState) -> Result<String, ControllerError> {
        match state.active_ticket() {
            Some((bill, TicketView::EditForm)) => self.dashboard_form(bill),
            _ => Ok(TICKET_PLACEHOLDER.to_string()),
        }
    }

    pub fn dashboard_page(&self, state: &DashboardState) -> Result<String, ControllerError> {
        let panels = BillStatus::ALL
            .iter()
            .map(|&status| -> Result<PanelView, ControllerError> {
                Ok(PanelView {
                    index: status.panel_index(),
                    title: panel_title(status),
                    expanded: state.panel(status) == PanelState::Expanded,
                    content: self.panel_content(state, status)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut context = Context::new();
        context.insert("panels", &panels);
        context.insert("navbar_height", navbar_height(state));
        context.insert("right_pane", &self.right_pane(state)?);
        self.render("dashboard_page.html", &context)
    }
}

/// First and last name from the email local part. Without a dot the whole
/// local part is the last name.
pub fn employee_names(email: &str) -> (&str, &str) {
    let local = email.split('@').next().unwrap_or_default();
    match local.split_once('.') {
        Some((first, rest)) => (first, rest.split('.').next().unwrap_or(rest)),
        None => ("", local),
    }
}

/// Layout height of the vertical navbar.
pub fn navbar_height(state: &DashboardState) -> &'static str {
    match state.active_ticket() {
        Some((_, TicketView::EditForm)) => "150vh",
        _ => "120vh",
    }
}

fn is_highlighted(bill: &Bill, state: &DashboardState) -> bool {
    matches!(
        state.active_ticket(),
        Some((active, TicketView::EditForm)) if active.id.is_some() && active.id == bill.id
    )
}

fn panel_title(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Validé",
        BillStatus::Refused => "Refusé",
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
