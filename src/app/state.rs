use std::collections::HashMap;

use chrono::Local;
use crossterm::event::KeyCode;
use rusqlite::Connection;

use crate::db;
use crate::resolving::{self, ResolvingTimes};
use crate::types::{
    ALL_STATES, Category, CategoryId, Issue, IssueId, IssueQuery, NewIssue, State, User, UserId,
};

use super::{AppView, TABS};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub db: Connection,
    pub view: AppView,
    view_history: Vec<AppView>,
    pub issues: Vec<Issue>,
    pub categories_list: Vec<Category>,
    pub users_list: Vec<User>,
    pub categories: HashMap<CategoryId, Category>,
    pub users: HashMap<UserId, User>,
    pub state_counts: Vec<(State, usize)>,
    pub resolving_times: ResolvingTimes,
    pub status: Option<String>,
    pub selected_issue_index: usize,
    pub selected_issue: Option<Issue>,
    pub selected_category_index: usize,
    pub selected_user_index: usize,
    pub selected_tab_index: usize,
    pub category_filter: Option<CategoryId>,
    pub issues_search_query: String,
    pub issues_search_active: bool,
    pub new_issue_popup: Option<NewIssuePopup>,
    pub set_state_popup: Option<SetStatePopup>,
    pub new_category_popup: Option<NewCategoryPopup>,
    pub new_user_popup: Option<NewUserPopup>,
    pub confirm_popup: Option<ConfirmDeletePopup>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewIssueField {
    Title,
    Description,
    Category,
    Reporter,
    Assignee,
    State,
}

#[derive(Clone, Debug)]
pub struct NewIssuePopup {
    pub title: String,
    pub description: String,
    pub category_index: usize,
    pub categories: Vec<Category>,
    pub reporter_index: usize,
    pub assignee_index: usize,
    pub users: Vec<User>,
    pub state_index: usize,
    pub field: NewIssueField,
}

/// The state-change form: choices cycled with the arrow keys, pre-filled
/// with the issue's current state.
#[derive(Clone, Debug)]
pub struct SetStatePopup {
    pub issue_id: IssueId,
    pub title: String,
    pub state_index: usize,
}

#[derive(Clone, Debug)]
pub struct NewCategoryPopup {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct NewUserPopup {
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct ConfirmDeletePopup {
    pub issue_id: IssueId,
    pub title: String,
}

fn select_prev(index: &mut usize, len: usize) {
    if len == 0 {
        return;
    }
    if *index == 0 {
        *index = len - 1;
    } else {
        *index -= 1;
    }
}

fn select_next(index: &mut usize, len: usize) {
    if len == 0 {
        return;
    }
    *index = (*index + 1) % len;
}

impl App {
    pub fn new(db: Connection) -> Self {
        let mut app = Self {
            running: true,
            db,
            view: AppView::Dashboard,
            view_history: Vec::new(),
            issues: Vec::new(),
            categories_list: Vec::new(),
            users_list: Vec::new(),
            categories: HashMap::new(),
            users: HashMap::new(),
            state_counts: Vec::new(),
            resolving_times: ResolvingTimes::default(),
            status: None,
            selected_issue_index: 0,
            selected_issue: None,
            selected_category_index: 0,
            selected_user_index: 0,
            selected_tab_index: 0,
            category_filter: None,
            issues_search_query: String::new(),
            issues_search_active: false,
            new_issue_popup: None,
            set_state_popup: None,
            new_category_popup: None,
            new_user_popup: None,
            confirm_popup: None,
        };
        app.refresh_lookups();
        app.load_dashboard();
        app
    }

    /// Central key handler - popups first, then global navigation.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.new_issue_popup.is_some() {
            self.handle_new_issue_key(key);
            return;
        }
        if self.set_state_popup.is_some() {
            self.handle_set_state_key(key);
            return;
        }
        if self.new_category_popup.is_some() {
            self.handle_new_category_key(key);
            return;
        }
        if self.new_user_popup.is_some() {
            self.handle_new_user_key(key);
            return;
        }
        if self.confirm_popup.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.issues_search_active {
            self.handle_search_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('h') => self.navigate_to(AppView::Dashboard),
            KeyCode::Char('i') => {
                self.navigate_to(AppView::Issues);
                self.selected_issue = None;
            }
            KeyCode::Char('c') => self.navigate_to(AppView::Categories),
            KeyCode::Char('u') => self.navigate_to(AppView::Users),
            KeyCode::Char('?') => {
                if self.view == AppView::Help {
                    self.go_back();
                } else {
                    self.navigate_to(AppView::Help);
                }
            }
            KeyCode::Char('/') => {
                if self.view == AppView::Issues {
                    self.issues_search_active = true;
                }
            }
            KeyCode::Char('f') => {
                if self.view == AppView::Issues {
                    self.cycle_category_filter();
                }
            }
            KeyCode::Char('r') => self.load_content_for_view(),
            KeyCode::Up => self.move_selection_up(),
            KeyCode::Down => self.move_selection_down(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('s') => self.open_set_state_popup(),
            KeyCode::Char('d') => self.open_confirm_popup(),
            KeyCode::Char('n') => match self.view {
                AppView::Issues => self.open_new_issue_popup(),
                AppView::Categories => self.open_new_category_popup(),
                AppView::Users => self.open_new_user_popup(),
                _ => {}
            },
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view.clone());
            self.view = view;
            self.load_content_for_view();
            if let Some(index) = TABS.iter().position(|v| {
                *v == self.view || (self.view == AppView::IssueDetail && *v == AppView::Issues)
            }) {
                self.selected_tab_index = index;
            }
        }
    }

    fn go_back(&mut self) {
        if let Some(view) = self.view_history.pop() {
            self.view = view;
            self.load_content_for_view();
        }
    }

    fn load_content_for_view(&mut self) {
        self.clear_status();
        match self.view {
            AppView::Dashboard => self.load_dashboard(),
            AppView::Issues => self.load_issues(),
            AppView::IssueDetail => self.refresh_issue_detail(),
            AppView::Categories => self.load_categories(),
            AppView::Users => self.load_users(),
            AppView::Help => {}
        }
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn report_error(&mut self, err: anyhow::Error) {
        self.status = Some(err.to_string());
    }

    // --- data loading ---

    fn refresh_lookups(&mut self) {
        if let Ok(categories) = db::query_categories(&self.db) {
            self.categories = categories
                .iter()
                .filter_map(|c| c.id.map(|id| (id, c.clone())))
                .collect();
            self.categories_list = categories;
        }
        if let Ok(users) = db::query_users(&self.db) {
            self.users = users
                .iter()
                .filter_map(|u| u.id.map(|id| (id, u.clone())))
                .collect();
            self.users_list = users;
        }
    }

    fn load_dashboard(&mut self) {
        match db::query_state_counts(&self.db) {
            Ok(counts) => self.state_counts = counts,
            Err(err) => self.report_error(err),
        }
        match db::query_state_records(&self.db) {
            Ok(records) => self.resolving_times = resolving::compute(&records),
            Err(err) => self.report_error(err),
        }
    }

    fn load_issues(&mut self) {
        let query = if let Some(category_id) = self.category_filter {
            IssueQuery::ByCategoryId(category_id)
        } else if !self.issues_search_query.is_empty() {
            IssueQuery::ByDescriptionPrefix(self.issues_search_query.clone())
        } else {
            IssueQuery::All
        };
        match db::query_issues(query, &self.db) {
            Ok(issues) => {
                self.issues = issues;
                if self.selected_issue_index >= self.issues.len() {
                    self.selected_issue_index = self.issues.len().saturating_sub(1);
                }
            }
            Err(err) => self.report_error(err),
        }
        self.refresh_lookups();
    }

    fn load_categories(&mut self) {
        self.refresh_lookups();
        if self.selected_category_index >= self.categories_list.len() {
            self.selected_category_index = self.categories_list.len().saturating_sub(1);
        }
    }

    fn load_users(&mut self) {
        self.refresh_lookups();
        if self.selected_user_index >= self.users_list.len() {
            self.selected_user_index = self.users_list.len().saturating_sub(1);
        }
    }

    fn refresh_issue_detail(&mut self) {
        if let Some(id) = self.selected_issue.as_ref().and_then(|issue| issue.id) {
            match db::query_issue_by_id(id, &self.db) {
                Ok(issue) => self.selected_issue = issue,
                Err(err) => self.report_error(err),
            }
        }
    }

    // --- selection / navigation ---

    fn move_selection_up(&mut self) {
        match self.view {
            AppView::Issues => select_prev(&mut self.selected_issue_index, self.issues.len()),
            AppView::Categories => {
                select_prev(&mut self.selected_category_index, self.categories_list.len())
            }
            AppView::Users => select_prev(&mut self.selected_user_index, self.users_list.len()),
            _ => {}
        }
    }

    fn move_selection_down(&mut self) {
        match self.view {
            AppView::Issues => select_next(&mut self.selected_issue_index, self.issues.len()),
            AppView::Categories => {
                select_next(&mut self.selected_category_index, self.categories_list.len())
            }
            AppView::Users => select_next(&mut self.selected_user_index, self.users_list.len()),
            _ => {}
        }
    }

    fn open_selected(&mut self) {
        if self.view == AppView::Issues {
            if let Some(issue) = self.issues.get(self.selected_issue_index) {
                self.selected_issue = Some(issue.clone());
                self.navigate_to(AppView::IssueDetail);
            }
        }
    }

    fn cycle_category_filter(&mut self) {
        let ids: Vec<CategoryId> = self.categories_list.iter().filter_map(|c| c.id).collect();
        self.category_filter = match self.category_filter {
            None => ids.first().copied(),
            Some(current) => match ids.iter().position(|id| *id == current) {
                Some(pos) if pos + 1 < ids.len() => Some(ids[pos + 1]),
                _ => None,
            },
        };
        self.load_issues();
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.issues_search_active = false;
                self.issues_search_query.clear();
                self.load_issues();
            }
            KeyCode::Enter => {
                self.issues_search_active = false;
                self.load_issues();
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.issues_search_query.pop();
                self.load_issues();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                self.issues_search_query.push(ch);
                self.load_issues();
            }
            _ => {}
        }
    }

    // --- popups ---

    fn open_new_issue_popup(&mut self) {
        self.refresh_lookups();
        if self.categories_list.is_empty() {
            self.status = Some("Create a category first ('c', then 'n').".to_string());
            return;
        }
        if self.users_list.is_empty() {
            self.status = Some("Create a user first ('u', then 'n').".to_string());
            return;
        }
        self.new_issue_popup = Some(NewIssuePopup {
            title: String::new(),
            description: String::new(),
            category_index: 0,
            categories: self.categories_list.clone(),
            reporter_index: 0,
            assignee_index: 0,
            users: self.users_list.clone(),
            // Pre-filled with the default state, like the form for a
            // brand-new issue.
            state_index: ALL_STATES
                .iter()
                .position(|s| *s == State::DEFAULT)
                .unwrap_or(0),
            field: NewIssueField::Title,
        });
    }

    fn selected_issue_for_action(&self) -> Option<&Issue> {
        match self.view {
            AppView::Issues => self.issues.get(self.selected_issue_index),
            AppView::IssueDetail => self.selected_issue.as_ref(),
            _ => None,
        }
    }

    fn open_set_state_popup(&mut self) {
        let Some(issue) = self.selected_issue_for_action() else {
            return;
        };
        let Some(issue_id) = issue.id else {
            return;
        };
        let current = match issue.current_state() {
            Ok(state) => state,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };
        self.set_state_popup = Some(SetStatePopup {
            issue_id,
            title: issue.title.clone(),
            state_index: ALL_STATES.iter().position(|s| *s == current).unwrap_or(0),
        });
    }

    fn open_new_category_popup(&mut self) {
        self.new_category_popup = Some(NewCategoryPopup {
            name: String::new(),
        });
    }

    fn open_new_user_popup(&mut self) {
        self.new_user_popup = Some(NewUserPopup {
            username: String::new(),
        });
    }

    fn open_confirm_popup(&mut self) {
        let Some(issue) = self.selected_issue_for_action() else {
            return;
        };
        let Some(issue_id) = issue.id else {
            return;
        };
        self.confirm_popup = Some(ConfirmDeletePopup {
            issue_id,
            title: issue.title.clone(),
        });
    }

    fn handle_new_issue_key(&mut self, key: KeyCode) {
        let Some(popup) = self.new_issue_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.new_issue_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_new_issue_popup(),
            KeyCode::Tab => {
                popup.field = match popup.field {
                    NewIssueField::Title => NewIssueField::Description,
                    NewIssueField::Description => NewIssueField::Category,
                    NewIssueField::Category => NewIssueField::Reporter,
                    NewIssueField::Reporter => NewIssueField::Assignee,
                    NewIssueField::Assignee => NewIssueField::State,
                    NewIssueField::State => NewIssueField::Title,
                };
            }
            KeyCode::Up => match popup.field {
                NewIssueField::Category => {
                    select_prev(&mut popup.category_index, popup.categories.len())
                }
                NewIssueField::Reporter => select_prev(&mut popup.reporter_index, popup.users.len()),
                NewIssueField::Assignee => select_prev(&mut popup.assignee_index, popup.users.len()),
                NewIssueField::State => select_prev(&mut popup.state_index, ALL_STATES.len()),
                _ => {}
            },
            KeyCode::Down => match popup.field {
                NewIssueField::Category => {
                    select_next(&mut popup.category_index, popup.categories.len())
                }
                NewIssueField::Reporter => select_next(&mut popup.reporter_index, popup.users.len()),
                NewIssueField::Assignee => select_next(&mut popup.assignee_index, popup.users.len()),
                NewIssueField::State => select_next(&mut popup.state_index, ALL_STATES.len()),
                _ => {}
            },
            KeyCode::Backspace | KeyCode::Delete => match popup.field {
                NewIssueField::Title => {
                    popup.title.pop();
                }
                NewIssueField::Description => {
                    popup.description.pop();
                }
                _ => {}
            },
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                match popup.field {
                    NewIssueField::Title => popup.title.push(ch),
                    NewIssueField::Description => popup.description.push(ch),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn apply_new_issue_popup(&mut self) {
        let Some(popup) = self.new_issue_popup.clone() else {
            return;
        };
        if popup.title.trim().is_empty() {
            self.status = Some("Title must not be empty.".to_string());
            return;
        }
        let (Some(category), Some(reporter), Some(assignee)) = (
            popup.categories.get(popup.category_index),
            popup.users.get(popup.reporter_index),
            popup.users.get(popup.assignee_index),
        ) else {
            return;
        };
        let description = if popup.description.trim().is_empty() {
            None
        } else {
            Some(popup.description.clone())
        };
        let new_issue = NewIssue {
            title: popup.title.trim().to_string(),
            description,
            category_id: category.id.unwrap_or(0),
            reporter_id: reporter.id.unwrap_or(0),
            assignee_id: assignee.id.unwrap_or(0),
            initial_state: ALL_STATES[popup.state_index],
        };
        match db::create_issue(new_issue, Local::now(), &self.db) {
            Ok(_) => {
                self.new_issue_popup = None;
                self.clear_status();
                self.load_issues();
            }
            Err(err) => self.report_error(err),
        }
    }

    fn handle_set_state_key(&mut self, key: KeyCode) {
        let Some(popup) = self.set_state_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.set_state_popup = None;
                self.clear_status();
            }
            KeyCode::Up => select_prev(&mut popup.state_index, ALL_STATES.len()),
            KeyCode::Down => select_next(&mut popup.state_index, ALL_STATES.len()),
            KeyCode::Enter => self.apply_set_state_popup(),
            _ => {}
        }
    }

    fn apply_set_state_popup(&mut self) {
        let Some(popup) = self.set_state_popup.clone() else {
            return;
        };
        let new_state = ALL_STATES[popup.state_index];
        match db::update_issue_state(popup.issue_id, new_state, Local::now(), &self.db) {
            Ok(_) => {
                self.set_state_popup = None;
                self.clear_status();
                self.load_issues();
                self.refresh_issue_detail();
            }
            Err(err) => self.report_error(err),
        }
    }

    fn handle_new_category_key(&mut self, key: KeyCode) {
        let Some(popup) = self.new_category_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.new_category_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_new_category_popup(),
            KeyCode::Backspace | KeyCode::Delete => {
                popup.name.pop();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                popup.name.push(ch);
            }
            _ => {}
        }
    }

    fn apply_new_category_popup(&mut self) {
        let Some(popup) = self.new_category_popup.clone() else {
            return;
        };
        if popup.name.trim().is_empty() {
            self.status = Some("Name must not be empty.".to_string());
            return;
        }
        let category = Category {
            id: None,
            name: popup.name.trim().to_string(),
            created_at: Local::now(),
        };
        match db::create_category(category, &self.db) {
            Ok(_) => {
                self.new_category_popup = None;
                self.clear_status();
                self.load_categories();
            }
            Err(err) => self.report_error(err),
        }
    }

    fn handle_new_user_key(&mut self, key: KeyCode) {
        let Some(popup) = self.new_user_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.new_user_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_new_user_popup(),
            KeyCode::Backspace | KeyCode::Delete => {
                popup.username.pop();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                popup.username.push(ch);
            }
            _ => {}
        }
    }

    fn apply_new_user_popup(&mut self) {
        let Some(popup) = self.new_user_popup.clone() else {
            return;
        };
        if popup.username.trim().is_empty() {
            self.status = Some("Username must not be empty.".to_string());
            return;
        }
        let user = User {
            id: None,
            username: popup.username.trim().to_string(),
            created_at: Local::now(),
        };
        match db::create_user(user, &self.db) {
            Ok(_) => {
                self.new_user_popup = None;
                self.clear_status();
                self.load_users();
            }
            Err(err) => self.report_error(err),
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(popup) = self.confirm_popup.take() {
                    match db::delete_issue(popup.issue_id, &self.db) {
                        Ok(()) => {
                            if self.view == AppView::IssueDetail {
                                self.selected_issue = None;
                                self.go_back();
                            }
                            self.load_issues();
                        }
                        Err(err) => self.report_error(err),
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.confirm_popup = None;
                self.clear_status();
            }
            _ => {}
        }
    }

    // --- lookups used by the ui ---

    pub fn category_name(&self, id: CategoryId) -> &str {
        self.categories
            .get(&id)
            .map(|c| c.name.as_str())
            .unwrap_or("unknown")
    }

    pub fn username(&self, id: UserId) -> &str {
        self.users
            .get(&id)
            .map(|u| u.username.as_str())
            .unwrap_or("unknown")
    }
}
