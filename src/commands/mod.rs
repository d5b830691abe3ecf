//! Command-line front end.
//!
//! Each subcommand maps onto one client operation or one list view. List
//! commands run through a [`ListController`](crate::list::ListController) so
//! they page, search and filter exactly as an interactive screen would.

pub mod render;

use clap::{Args, Parser, Subcommand};

use crate::api::types::{
    IssuePriority, IssueStatus, IssueUpdate, NewComment, NewIssue, ProfileUpdate, ProjectInput,
    Registration, Role,
};
use crate::app::{App, ListOptions};
use crate::error::{AppError, Result};

#[derive(Debug, Parser)]
#[command(name = "trackmybugs", version, about = "TrackMyBugs issue tracker client")]
pub struct Cli {
    /// Server profile to use (see config.toml).
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Forget the current session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Show or update your profile.
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    #[command(subcommand)]
    Projects(ProjectAction),
    #[command(subcommand)]
    Issues(IssueAction),
    #[command(subcommand)]
    Comments(CommentAction),
    #[command(subcommand)]
    Users(UserAction),
}

/// Paging and search shared by list commands.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Free-text search.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u64,
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectAction {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show a project with its first page of issues.
    Show { id: String },
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum IssueAction {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        status: Option<IssueStatus>,
        #[arg(long)]
        priority: Option<IssuePriority>,
        #[arg(long)]
        assignee: Option<String>,
    },
    Show { id: String },
    Create {
        #[arg(long)]
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        status: Option<IssueStatus>,
        #[arg(long)]
        priority: Option<IssuePriority>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<IssueStatus>,
        #[arg(long)]
        priority: Option<IssuePriority>,
        #[arg(long)]
        assignee: Option<String>,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CommentAction {
    List {
        issue: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    Add { issue: String, content: String },
    Edit { id: String, content: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    List,
    /// Change a user's role (admin only).
    SetRole { id: String, role: Role },
}

/// Run one command and return what to print.
pub async fn execute(app: &mut App, command: Command) -> Result<String> {
    let client = app.client().clone();

    let output = match command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            format!("Logged in as {} <{}>", user.display_name(), user.email)
        }
        Command::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = Registration {
                email,
                password,
                first_name,
                last_name,
            };
            let user = client.register(&registration).await?;
            format!("Registered and logged in as {}", user.display_name())
        }
        Command::Logout => {
            client.logout();
            "Logged out.".to_string()
        }
        Command::Whoami => match client.session().get().user() {
            Some(user) => format!(
                "{} <{}> ({}) on profile '{}'",
                user.display_name(),
                user.email,
                user.role,
                app.profile().name
            ),
            None => render::LOGIN_HINT.to_string(),
        },
        Command::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => render::rows(&[client.get_profile().await?]),
            ProfileAction::Update {
                first_name,
                last_name,
                email,
            } => {
                let update = ProfileUpdate {
                    first_name,
                    last_name,
                    email,
                };
                let profile = client.update_profile(&update).await?;
                format!("Profile updated: {}", profile.display_name())
            }
        },
        Command::Projects(action) => projects(app, action).await?,
        Command::Issues(action) => issues(app, action).await?,
        Command::Comments(action) => comments(app, action).await?,
        Command::Users(UserAction::List) => render::rows(&client.list_users().await?),
        Command::Users(UserAction::SetRole { id, role }) => {
            let user = client.set_user_role(&id, role).await?;
            format!("{} is now {}", user.display_name(), user.role)
        }
    };

    Ok(output)
}

async fn projects(app: &mut App, action: ProjectAction) -> Result<String> {
    let client = app.client().clone();
    Ok(match action {
        ProjectAction::List { page } => {
            app.open_projects(&list_options(page, Vec::new()));
            app.settle().await;
            let list = opened(app.projects())?;
            render::list(list.view(), list.pagination(), render::PROJECT_HINTS)
        }
        ProjectAction::Show { id } => {
            app.open_project_overview(id);
            app.settle().await;
            match app.overview() {
                Some(Ok(overview)) => render::project_overview(overview),
                Some(Err(e)) => return Err(e.clone().into()),
                None => return Err(AppError::other("Project overview was not loaded")),
            }
        }
        ProjectAction::Create { name, description } => {
            let project = client
                .create_project(&ProjectInput { name, description })
                .await?;
            format!("Created project {}", project)
        }
        ProjectAction::Update {
            id,
            name,
            description,
        } => {
            let project = client
                .update_project(&id, &ProjectInput { name, description })
                .await?;
            format!("Updated project {}", project)
        }
        ProjectAction::Delete { id } => {
            client.delete_project(&id).await?;
            format!("Deleted project {}", id)
        }
    })
}

async fn issues(app: &mut App, action: IssueAction) -> Result<String> {
    let client = app.client().clone();
    Ok(match action {
        IssueAction::List {
            page,
            project,
            status,
            priority,
            assignee,
        } => {
            let filters = [
                ("status", status.map(|s| s.as_str().to_string())),
                ("priority", priority.map(|p| p.as_str().to_string())),
                ("assigned_to", assignee),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
            .collect();
            app.open_issues(project, &list_options(page, filters));
            app.settle().await;
            let list = opened(app.issues())?;
            render::list(list.view(), list.pagination(), render::ISSUE_HINTS)
        }
        IssueAction::Show { id } => render::issue_detail(&client.get_issue(&id).await?),
        IssueAction::Create {
            project,
            title,
            description,
            status,
            priority,
        } => {
            let issue = client
                .create_issue(&NewIssue {
                    title,
                    description,
                    project_id: project,
                    status,
                    priority,
                })
                .await?;
            format!("Created issue {}", issue)
        }
        IssueAction::Update {
            id,
            title,
            description,
            status,
            priority,
            assignee,
        } => {
            let update = IssueUpdate {
                title,
                description,
                status,
                priority,
                assigned_to: assignee,
            };
            if update.is_empty() {
                return Err(AppError::other("Nothing to update"));
            }
            render::issue_detail(&client.update_issue(&id, &update).await?)
        }
        IssueAction::Delete { id } => {
            client.delete_issue(&id).await?;
            format!("Deleted issue {}", id)
        }
    })
}

async fn comments(app: &mut App, action: CommentAction) -> Result<String> {
    let client = app.client().clone();
    Ok(match action {
        CommentAction::List { issue, page } => {
            let options = ListOptions {
                page,
                ..Default::default()
            };
            app.open_comments(issue, &options);
            app.settle().await;
            let list = opened(app.comments())?;
            render::list(list.view(), list.pagination(), render::COMMENT_HINTS)
        }
        CommentAction::Add { issue, content } => {
            let comment = client
                .create_comment(&NewComment {
                    content,
                    issue_id: issue,
                })
                .await?;
            format!("Added comment {}", comment.id)
        }
        CommentAction::Edit { id, content } => {
            client.update_comment(&id, &content).await?;
            format!("Updated comment {}", id)
        }
        CommentAction::Delete { id } => {
            client.delete_comment(&id).await?;
            format!("Deleted comment {}", id)
        }
    })
}

fn list_options(page: PageArgs, filters: Vec<(String, String)>) -> ListOptions {
    ListOptions {
        search: page.search,
        filters,
        page: page.page,
    }
}

fn opened<T>(list: Option<&T>) -> Result<&T> {
    list.ok_or_else(|| AppError::other("List was not opened"))
}
