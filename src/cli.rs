/// CLI argument parsing and command handling.
use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::types::{IssueQuery, State};
use crate::ui::helpers::format_duration;
use crate::{db, resolving, types};

#[derive(Parser)]
#[command(
    name = "trackr",
    version,
    about = "Trackr - A terminal-based issue tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Issue {
        #[command(subcommand)]
        command: IssueCommand,
    },
    /// Print the resolving-time report for currently DONE issues.
    Report,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add { name: String },
    List,
    /// Remove a category; fails while issues still reference it.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add { username: String },
    List,
    /// Remove a user; fails while issues still reference them.
    Delete { username: String },
}

#[derive(Subcommand, Debug)]
pub enum IssueCommand {
    Add {
        title: String,
        #[arg(short = 'c', long = "category")]
        category: String,
        #[arg(short = 'r', long = "reporter")]
        reporter: String,
        #[arg(short = 'a', long = "assignee")]
        assignee: String,
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
        /// Initial state (TO_DO, IN_PROGRESS, DONE or CANCELED); defaults to TO_DO.
        #[arg(short = 's', long = "state")]
        state: Option<String>,
    },
    /// Record a state change (TO_DO, IN_PROGRESS, DONE or CANCELED).
    State { title: String, new_state: String },
    List {
        #[arg(short = 'c', long = "category")]
        category: Option<String>,
        /// Match issues whose description starts with the given text.
        #[arg(long = "search")]
        search: Option<String>,
    },
    Show {
        title: String,
    },
    Delete {
        title: String,
    },
}

/// Execute a CLI command (category, user, issue or report).
pub fn run(command: Command, conn: &Connection) -> Result<()> {
    match command {
        Command::Category {
            command: CategoryCommand::Add { name },
        } => handle_category_add(name, conn)?,
        Command::Category {
            command: CategoryCommand::List,
        } => handle_category_list(conn)?,
        Command::Category {
            command: CategoryCommand::Delete { name },
        } => handle_category_delete(name, conn)?,
        Command::User {
            command: UserCommand::Add { username },
        } => handle_user_add(username, conn)?,
        Command::User {
            command: UserCommand::List,
        } => handle_user_list(conn)?,
        Command::User {
            command: UserCommand::Delete { username },
        } => handle_user_delete(username, conn)?,
        Command::Issue {
            command:
                IssueCommand::Add {
                    title,
                    category,
                    reporter,
                    assignee,
                    description,
                    state,
                },
        } => handle_issue_add(title, category, reporter, assignee, description, state, conn)?,
        Command::Issue {
            command: IssueCommand::State { title, new_state },
        } => handle_issue_state(title, new_state, conn)?,
        Command::Issue {
            command: IssueCommand::List { category, search },
        } => handle_issue_list(category, search, conn)?,
        Command::Issue {
            command: IssueCommand::Show { title },
        } => handle_issue_show(title, conn)?,
        Command::Issue {
            command: IssueCommand::Delete { title },
        } => handle_issue_delete(title, conn)?,
        Command::Report => handle_report(conn)?,
    }
    Ok(())
}

fn handle_category_add(name: String, conn: &Connection) -> Result<()> {
    if db::query_category_by_name(&name, conn)?.is_some() {
        println!("Category '{name}' already exists.");
        return Ok(());
    }
    db::create_category(
        types::Category {
            id: None,
            name,
            created_at: Local::now(),
        },
        conn,
    )?;
    Ok(())
}

fn handle_category_list(conn: &Connection) -> Result<()> {
    for category in db::query_categories(conn)? {
        println!("{}", category.name);
    }
    Ok(())
}

fn handle_category_delete(name: String, conn: &Connection) -> Result<()> {
    let Some(category) = db::query_category_by_name(&name, conn)? else {
        println!("Category '{name}' not found");
        return Ok(());
    };
    db::delete_category(category.id.unwrap(), conn)?;
    println!("Deleted category '{name}'.");
    Ok(())
}

fn handle_user_add(username: String, conn: &Connection) -> Result<()> {
    if db::query_user_by_name(&username, conn)?.is_some() {
        println!("User '{username}' already exists.");
        return Ok(());
    }
    db::create_user(
        types::User {
            id: None,
            username,
            created_at: Local::now(),
        },
        conn,
    )?;
    Ok(())
}

fn handle_user_list(conn: &Connection) -> Result<()> {
    for user in db::query_users(conn)? {
        println!("{}", user.username);
    }
    Ok(())
}

fn handle_user_delete(username: String, conn: &Connection) -> Result<()> {
    let Some(user) = db::query_user_by_name(&username, conn)? else {
        println!("User '{username}' not found");
        return Ok(());
    };
    db::delete_user(user.id.unwrap(), conn)?;
    println!("Deleted user '{username}'.");
    Ok(())
}

fn handle_issue_add(
    title: String,
    category: String,
    reporter: String,
    assignee: String,
    description: Option<String>,
    state: Option<String>,
    conn: &Connection,
) -> Result<()> {
    let Some(category) = db::query_category_by_name(&category, conn)? else {
        println!("Category '{category}' not found");
        return Ok(());
    };
    let Some(reporter) = db::query_user_by_name(&reporter, conn)? else {
        println!("User '{reporter}' not found");
        return Ok(());
    };
    let Some(assignee) = db::query_user_by_name(&assignee, conn)? else {
        println!("User '{assignee}' not found");
        return Ok(());
    };
    let initial_state = match state {
        Some(raw) => raw.parse::<State>()?,
        None => State::DEFAULT,
    };

    db::create_issue(
        types::NewIssue {
            title: title.clone(),
            description,
            category_id: category.id.unwrap(),
            reporter_id: reporter.id.unwrap(),
            assignee_id: assignee.id.unwrap(),
            initial_state,
        },
        Local::now(),
        conn,
    )?;
    println!("Created issue '{title}' ({})", initial_state.label());
    Ok(())
}

fn handle_issue_state(title: String, new_state: String, conn: &Connection) -> Result<()> {
    let Some(issue) = db::query_issue_by_title(&title, conn)? else {
        println!("Issue '{title}' not found");
        return Ok(());
    };
    let new_state = new_state.parse::<State>()?;
    let current = db::update_issue_state(issue.id.unwrap(), new_state, Local::now(), conn)?;
    println!("Issue '{title}' is now {}", current.label());
    Ok(())
}

fn handle_issue_list(
    category: Option<String>,
    search: Option<String>,
    conn: &Connection,
) -> Result<()> {
    let query = if let Some(name) = category {
        let Some(category) = db::query_category_by_name(&name, conn)? else {
            println!("Category '{name}' not found");
            return Ok(());
        };
        IssueQuery::ByCategoryId(category.id.unwrap())
    } else if let Some(prefix) = search {
        IssueQuery::ByDescriptionPrefix(prefix)
    } else {
        IssueQuery::All
    };

    let issues = db::query_issues(query, conn)?;
    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    for issue in &issues {
        let state = issue.current_state()?;
        let category = db::query_category_by_id(issue.category_id, conn)?
            .map(|c| c.name)
            .unwrap_or_else(|| "unknown".to_string());
        println!("{:<12} {:<20} {}", state.label(), category, issue.title);
    }
    Ok(())
}

fn handle_issue_show(title: String, conn: &Connection) -> Result<()> {
    let Some(issue) = db::query_issue_by_title(&title, conn)? else {
        println!("Issue '{title}' not found");
        return Ok(());
    };
    let category = db::query_category_by_id(issue.category_id, conn)?
        .map(|c| c.name)
        .unwrap_or_else(|| "unknown".to_string());
    let reporter = db::query_user_by_id(issue.reporter_id, conn)?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_string());
    let assignee = db::query_user_by_id(issue.assignee_id, conn)?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_string());

    println!("Issue #{}: {}", issue.id.unwrap_or(0), issue.title);
    println!("State:       {}", issue.current_state()?.label());
    println!("Category:    {category}");
    println!("Reporter:    {reporter}");
    println!("Assignee:    {assignee}");
    println!(
        "Description: {}",
        issue.description.as_deref().unwrap_or("-")
    );
    println!("History:");
    for change in &issue.history {
        println!(
            "  {} -> {}",
            change.occurred_at.format("%Y-%m-%d %H:%M:%S"),
            change.new_state.label()
        );
    }
    Ok(())
}

fn handle_issue_delete(title: String, conn: &Connection) -> Result<()> {
    let Some(issue) = db::query_issue_by_title(&title, conn)? else {
        println!("Issue '{title}' not found");
        return Ok(());
    };
    db::delete_issue(issue.id.unwrap(), conn)?;
    println!("Deleted issue '{title}' and its history.");
    Ok(())
}

fn handle_report(conn: &Connection) -> Result<()> {
    let records = db::query_state_records(conn)?;
    let times = resolving::compute(&records);
    match (times.shortest(), times.longest(), times.average()) {
        (Some(shortest), Some(longest), Some(average)) => {
            println!("Resolved issues: {}", times.times.len());
            println!("Shortest: {}", format_duration(shortest));
            println!("Longest:  {}", format_duration(longest));
            println!("Average:  {}", format_duration(average));
        }
        _ => println!("No resolved issues yet."),
    }
    Ok(())
}
