//! Admin triage dashboard.
//!
//! Bills are grouped in three status panels (1 pending, 2 accepted,
//! 3 refused). Each panel toggles between collapsed and expanded; expanding
//! binds the panel's cards. Clicking a bound card opens its ticket, the inline
//! edit form, and clicking the same card again swaps the form for a
//! placeholder. All toggle state lives in [`DashboardState`], which callers
//! own and pass to every handler; a fresh state is a freshly mounted view.

use std::{collections::HashMap, sync::Arc};

use client_core::BillStore;
use shared::{
    domain::{Bill, BillId, BillStatus, Session, UserType},
    protocol::UpdateRequest,
};
use tracing::{debug, info, warn};

use crate::{
    bills::AttachmentDialog,
    error::ControllerError,
    navigation::{Navigator, Route},
    session_guard::SessionGuard,
};

/// Internal accounts hidden from triage outside test runs.
pub const TEST_ACCOUNTS: [&str; 8] = [
    "employee@test.tld",
    "employee@company.tld",
    "admin@test.tld",
    "test1@test.tld",
    "test2@test.tld",
    "test3@test.tld",
    "test4@test.tld",
    "test5@test.tld",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    excluded_emails: Vec<String>,
}

impl BillFilter {
    /// Matches on status alone.
    pub fn status_only() -> Self {
        Self::default()
    }

    /// Also hides test accounts and the viewer's own bills.
    pub fn production(viewer_email: &str) -> Self {
        let mut excluded_emails: Vec<String> =
            TEST_ACCOUNTS.iter().map(|email| email.to_string()).collect();
        excluded_emails.push(viewer_email.to_string());
        Self { excluded_emails }
    }

    pub fn matches(&self, bill: &Bill, status: BillStatus) -> bool {
        bill.status == status
            && !self
                .excluded_emails
                .iter()
                .any(|email| *email == bill.employee_email)
    }
}

pub fn filtered_bills(bills: &[Bill], status: BillStatus, filter: &BillFilter) -> Vec<Bill> {
    bills
        .iter()
        .filter(|bill| filter.matches(bill, status))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Collapsed => PanelState::Expanded,
            PanelState::Expanded => PanelState::Collapsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketView {
    EditForm,
    Placeholder,
}

impl TicketView {
    pub fn toggled(self) -> Self {
        match self {
            TicketView::EditForm => TicketView::Placeholder,
            TicketView::Placeholder => TicketView::EditForm,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    panels: HashMap<BillStatus, PanelState>,
    panel_bills: HashMap<BillStatus, Vec<Bill>>,
    tickets: HashMap<BillId, TicketView>,
    active: Option<Bill>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel(&self, status: BillStatus) -> PanelState {
        self.panels.get(&status).copied().unwrap_or_default()
    }

    /// Cards rendered in a panel; empty while collapsed.
    pub fn panel_bills(&self, status: BillStatus) -> &[Bill] {
        self.panel_bills
            .get(&status)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn ticket(&self, id: &BillId) -> Option<TicketView> {
        self.tickets.get(id).copied()
    }

    /// Bill whose card was clicked last, with its current view.
    pub fn active_ticket(&self) -> Option<(&Bill, TicketView)> {
        let bill = self.active.as_ref()?;
        let view = bill.id.as_ref().and_then(|id| self.ticket(id))?;
        Some((bill, view))
    }

    pub fn is_bound(&self, id: &BillId) -> bool {
        self.find_bound(id).is_some()
    }

    fn find_bound(&self, id: &BillId) -> Option<&Bill> {
        self.panel_bills
            .values()
            .flatten()
            .find(|bill| bill.id.as_ref() == Some(id))
    }

    pub fn toggle_panel(
        &mut self,
        status: BillStatus,
        bills: &[Bill],
        filter: &BillFilter,
    ) -> PanelState {
        let next = self.panel(status).toggled();
        self.panels.insert(status, next);
        match next {
            PanelState::Expanded => {
                self.panel_bills
                    .insert(status, filtered_bills(bills, status, filter));
            }
            PanelState::Collapsed => {
                self.panel_bills.remove(&status);
            }
        }
        next
    }

    /// Same bound card twice alternates the view; another card starts over
    /// on the edit form. Cards of collapsed panels are not bound.
    pub fn toggle_ticket(&mut self, id: &BillId) -> Option<TicketView> {
        let bill = self.find_bound(id)?.clone();
        let same_card = self
            .active
            .as_ref()
            .and_then(|active| active.id.as_ref())
            .is_some_and(|active_id| active_id == id);
        let next = match (same_card, self.ticket(id)) {
            (true, Some(view)) => view.toggled(),
            _ => TicketView::EditForm,
        };
        self.tickets.insert(id.clone(), next);
        self.active = Some(bill);
        Some(next)
    }
}

pub struct DashboardController {
    store: Arc<dyn BillStore>,
    navigator: Arc<dyn Navigator>,
    session: Session,
    bills: Vec<Bill>,
    filter: BillFilter,
}

impl DashboardController {
    pub fn new(
        store: Arc<dyn BillStore>,
        navigator: Arc<dyn Navigator>,
        session: Session,
        filter: BillFilter,
    ) -> Self {
        Self {
            store,
            navigator,
            session,
            bills: Vec::new(),
            filter,
        }
    }

    /// Opens the dashboard for an admin session. With `exclude_test_accounts`
    /// the panels hide test accounts and the admin's own bills.
    pub fn mount(
        guard: &SessionGuard,
        store: Arc<dyn BillStore>,
        navigator: Arc<dyn Navigator>,
        exclude_test_accounts: bool,
    ) -> Result<Self, ControllerError> {
        let session = guard.require_role(UserType::Admin)?;
        let filter = if exclude_test_accounts {
            BillFilter::production(&session.email)
        } else {
            BillFilter::status_only()
        };
        Ok(Self::new(store, navigator, session, filter))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn with_bills(mut self, bills: Vec<Bill>) -> Self {
        self.bills = bills;
        self
    }

    /// Lists every bill, unfiltered. Only store rejections fail the call; a
    /// record with an unknown status belongs to no panel and is skipped.
    pub async fn get_bills_all_users(&self) -> Result<Vec<Bill>, ControllerError> {
        let records = self.store.list().await?;
        let total = records.len();
        let bills: Vec<Bill> = records
            .into_iter()
            .filter_map(|record| {
                let bill_id = record.id.clone();
                Bill::try_from(record)
                    .map_err(|err| warn!(bill_id = ?bill_id, "skipping bill: {err}"))
                    .ok()
            })
            .collect();
        debug!(count = bills.len(), skipped = total - bills.len(), "dashboard bills fetched");
        Ok(bills)
    }

    /// Fetches all bills and keeps them as the panels' source collection.
    pub async fn load(&mut self) -> Result<&[Bill], ControllerError> {
        self.bills = self.get_bills_all_users().await?;
        Ok(&self.bills)
    }

    /// Disclosure arrow of panel `index`. `None` for an index outside 1..=3.
    pub fn handle_show_tickets(&self, state: &mut DashboardState, index: u8) -> Option<PanelState> {
        let status = BillStatus::from_panel_index(index)?;
        let next = state.toggle_panel(status, &self.bills, &self.filter);
        debug!(
            panel = index,
            state = ?next,
            cards = state.panel_bills(status).len(),
            "panel toggled"
        );
        Some(next)
    }

    /// Card click. `None` when no expanded panel shows that card.
    pub fn handle_edit_ticket(&self, state: &mut DashboardState, id: &BillId) -> Option<TicketView> {
        let view = state.toggle_ticket(id)?;
        debug!(bill_id = %id, view = ?view, "ticket toggled");
        Some(view)
    }

    /// Eye icon on the open ticket form.
    pub fn handle_click_icon_eye(&self, state: &DashboardState) -> Option<AttachmentDialog> {
        match state.active_ticket()? {
            (bill, TicketView::EditForm) => AttachmentDialog::for_bill(bill),
            (_, TicketView::Placeholder) => None,
        }
    }

    pub async fn handle_accept_submit(&self, bill: &Bill, comment_admin: &str) -> Bill {
        self.decide(bill, BillStatus::Accepted, comment_admin).await
    }

    pub async fn handle_refuse_submit(&self, bill: &Bill, comment_admin: &str) -> Bill {
        self.decide(bill, BillStatus::Refused, comment_admin).await
    }

    async fn decide(&self, bill: &Bill, status: BillStatus, comment_admin: &str) -> Bill {
        if let Err(err) = bill.status.transition_to(status) {
            warn!(bill_id = ?bill.id, "overwriting a decided bill: {err}");
        }
        let decided = bill.with_decision(status, Some(comment_admin.to_string()));
        self.update_bill(&decided).await;
        info!(bill_id = ?decided.id, status = %status, "bill decided");
        self.navigator.on_navigate(Route::Dashboard);
        decided
    }

    /// Keyed overwrite. Failures are logged and otherwise ignored.
    async fn update_bill(&self, bill: &Bill) {
        let request = match UpdateRequest::for_bill(bill, bill.id.clone()) {
            Ok(request) => request,
            Err(err) => {
                warn!(bill_id = ?bill.id, "failed to encode bill update: {err}");
                return;
            }
        };
        if let Err(err) = self.store.update(request).await {
            warn!(bill_id = ?bill.id, "bill update failed: {err}");
        }
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
