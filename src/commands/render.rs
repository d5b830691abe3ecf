//! Plain-text rendering of list and detail views.

use std::fmt::Write;

use crate::api::types::{Comment, Issue, Project, ProjectOverview, UserProfile};
use crate::list::{ListView, Pagination};

/// One line of a list.
pub trait Row {
    fn row(&self) -> String;
}

impl Row for Project {
    fn row(&self) -> String {
        if self.description.is_empty() {
            format!("{}  {}", self.id, self.name)
        } else {
            format!("{}  {}  ({})", self.id, self.name, self.description)
        }
    }
}

impl Row for Issue {
    fn row(&self) -> String {
        format!(
            "{}  [{} / {}]  {}",
            self.id,
            self.status.label(),
            self.priority.as_str(),
            self.title
        )
    }
}

impl Row for Comment {
    fn row(&self) -> String {
        let author = self.user_id.as_deref().unwrap_or("unknown");
        format!("{}  {} ({}): {}", self.id, author, self.created_at, self.content)
    }
}

impl Row for UserProfile {
    fn row(&self) -> String {
        format!(
            "{}  {} <{}>  {}",
            self.id,
            self.display_name(),
            self.email,
            self.role
        )
    }
}

/// Wording for the two kinds of empty list.
#[derive(Debug, Clone, Copy)]
pub struct EmptyHints {
    /// Nothing exists yet.
    pub empty: &'static str,
    /// Search or filters exclude everything.
    pub no_matches: &'static str,
}

pub const PROJECT_HINTS: EmptyHints = EmptyHints {
    empty: "No projects yet. Create one with 'trackmybugs projects create'.",
    no_matches: "No projects match your search. Try clearing it.",
};

pub const ISSUE_HINTS: EmptyHints = EmptyHints {
    empty: "No issues yet. Create one with 'trackmybugs issues create'.",
    no_matches: "No issues match your search or filters. Try clearing them.",
};

pub const COMMENT_HINTS: EmptyHints = EmptyHints {
    empty: "No comments yet. Add one with 'trackmybugs comments add'.",
    no_matches: "No comments match.",
};

pub const LOGIN_HINT: &str = "You are not logged in. Run 'trackmybugs login' first.";

pub fn list<T: Row>(view: ListView<'_, T>, pagination: Pagination, hints: EmptyHints) -> String {
    match view {
        ListView::Unauthenticated => LOGIN_HINT.to_string(),
        ListView::Loading => "Loading...".to_string(),
        ListView::Error(message) => format!("Error: {}", message),
        ListView::Empty => hints.empty.to_string(),
        ListView::NoMatches => hints.no_matches.to_string(),
        ListView::Items { items, total } => {
            let mut out = String::new();
            for item in items {
                let _ = writeln!(out, "{}", item.row());
            }
            let _ = write!(out, "{} ({} total)", pagination.label(), total);
            out
        }
    }
}

pub fn rows<T: Row>(items: &[T]) -> String {
    items.iter().map(Row::row).collect::<Vec<_>>().join("\n")
}

pub fn issue_detail(issue: &Issue) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", issue);
    let _ = writeln!(out, "Status:   {}", issue.status.label());
    let _ = writeln!(out, "Priority: {}", issue.priority.as_str());
    let _ = writeln!(out, "Project:  {}", issue.project_id);
    let _ = writeln!(
        out,
        "Assignee: {}",
        issue.assigned_to.as_deref().unwrap_or("unassigned")
    );
    let _ = writeln!(out, "Updated:  {}", issue.updated_at);
    if !issue.description.is_empty() {
        let _ = write!(out, "\n{}", issue.description);
    }
    out.trim_end().to_string()
}

pub fn project_overview(overview: &ProjectOverview) -> String {
    let project = &overview.project;
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", project.id, project.name);
    if !project.description.is_empty() {
        let _ = writeln!(out, "{}", project.description);
    }
    let _ = writeln!(out, "\nIssues ({} total):", overview.issue_total);
    if overview.issues.is_empty() {
        let _ = write!(out, "  none");
    } else {
        for issue in &overview.issues {
            let _ = writeln!(out, "  {}", issue.row());
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::project_json;

    fn project(id: &str, name: &str) -> Project {
        serde_json::from_value(project_json(id, name)).unwrap()
    }

    #[test]
    fn test_items_with_page_label() {
        let projects = vec![project("p-1", "Apollo"), project("p-2", "Gemini")];
        let text = list(
            ListView::Items {
                items: projects.as_slice(),
                total: 7,
            },
            Pagination::new(0, 2, 7),
            PROJECT_HINTS,
        );

        assert_eq!(text, "p-1  Apollo\np-2  Gemini\nPage 1 of 4 (7 total)");
    }

    #[test]
    fn test_empty_and_no_matches_differ() {
        let p = Pagination::new(0, 10, 0);
        let empty = list::<Project>(ListView::Empty, p, PROJECT_HINTS);
        let none = list::<Project>(ListView::NoMatches, p, PROJECT_HINTS);

        assert!(empty.contains("Create one"));
        assert!(none.contains("clearing"));
    }

    #[test]
    fn test_unauthenticated_prints_login_hint() {
        let text = list::<Issue>(ListView::Unauthenticated, Pagination::new(0, 10, 0), ISSUE_HINTS);
        assert_eq!(text, LOGIN_HINT);
    }
}
