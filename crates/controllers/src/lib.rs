//! Bill lifecycle controllers: session gating, the employee bill list, the
//! new-bill submission pipeline and the admin triage dashboard.
//!
//! Controllers own no markup. They return state values, and a
//! [`Renderer`] turns those values into HTML.

pub mod bills;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod navigation;
pub mod new_bill;
pub mod render;
pub mod session_guard;

pub use bills::{AttachmentDialog, BillRow, BillsController, BillsPage};
pub use dashboard::{BillFilter, DashboardController, DashboardState, PanelState, TicketView};
pub use error::{ControllerError, ValidationError};
pub use navigation::{Navigator, RecordingNavigator, Route};
pub use new_bill::{
    DraftState, FileChangeOutcome, NewBillController, NewBillForm, RequiredField, SelectedFile,
    SubmitOutcome,
};
pub use render::Renderer;
pub use session_guard::SessionGuard;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
