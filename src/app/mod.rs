mod state;

pub use state::{
    App, ConfirmDeletePopup, NewCategoryPopup, NewIssueField, NewIssuePopup, NewUserPopup,
    SetStatePopup,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppView {
    Dashboard,
    Issues,
    IssueDetail,
    Categories,
    Users,
    Help,
}

/// Views reachable from the tab bar, in display order.
pub const TABS: [AppView; 4] = [
    AppView::Dashboard,
    AppView::Issues,
    AppView::Categories,
    AppView::Users,
];
