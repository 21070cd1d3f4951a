use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use techblog_client::models::{Comment, Post};
use techblog_client::{
    AccessPolicy, BlogApiError, BlogClient, FileStore, GuardOutcome, DEFAULT_PAGE_LIMIT,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the blog API (overrides TECHBLOG_API_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Directory holding the saved session (default: ~/.techblog)
    #[arg(long)]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log in and save the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Clear the saved session
    Logout,

    /// Show the current session
    Whoami,

    /// Post operations
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Comment operations
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Admin operations (admin role required)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    List {
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(short, long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: i64,
    },

    Get {
        id: String,
    },

    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    Update {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },

    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// List comments on a post, newest first
    List {
        post_id: String,
    },

    Add {
        post_id: String,

        #[arg(short, long)]
        content: String,
    },

    Update {
        id: String,

        #[arg(short, long)]
        content: String,
    },

    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    Dashboard,
    Users,
    DeleteUser { id: String },
    Comments,
    DeleteComment { id: String },
    DeletePost { id: String },
}

fn session_dir(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(dir) => Ok(dir),
        None => {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".techblog"))
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len).collect();
        format!("{}...", cut)
    }
}

fn print_post(post: &Post) {
    println!("  [{}] {}", post.id, post.title.bold());
    println!("      By {} on {}", post.author_name(), format_date(&post.created_at));
    println!("      {}", truncate(&post.content, 80));
}

fn print_comment(comment: &Comment) {
    println!("  [{}] {}", comment.id, truncate(&comment.content, 80));
    let post_note = comment
        .post
        .as_ref()
        .and_then(|p| p.title())
        .unwrap_or("Deleted Post");
    println!(
        "      By {} on {} ({})",
        comment.author_name(),
        format_date(&comment.created_at),
        post_note
    );
}

fn fail(err: BlogApiError) -> ! {
    if err.is_unauthorized() {
        eprintln!("{} {}", "✗".red(), "Unauthorized. Please login first.".red());
    } else if err.is_not_found() {
        eprintln!("{} {}", "✗".red(), "Not found.".red());
    } else {
        eprintln!("{} {}", "✗".red(), err.to_string().red());
    }
    std::process::exit(1);
}

/// Evaluate the login guard locally before hitting the network, the same
/// decision the route guard makes for authenticated-only pages.
fn require_login(client: &BlogClient) {
    if let GuardOutcome::RedirectToLogin = client.authorize(AccessPolicy::Authenticated) {
        eprintln!("{} {}", "✗".red(), "Please login first.".red());
        std::process::exit(1);
    }
}

/// Evaluate the admin guard locally before hitting the network, the same
/// decision the route guard makes.
fn require_admin(client: &BlogClient) {
    match client.authorize(AccessPolicy::AdminOnly) {
        GuardOutcome::Allow => {}
        GuardOutcome::RedirectToLogin => {
            eprintln!("{} {}", "✗".red(), "Please login first.".red());
            std::process::exit(1);
        }
        GuardOutcome::RedirectHome => {
            eprintln!("{} {}", "✗".red(), "Admin access required.".red());
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let store = Arc::new(FileStore::new(session_dir(cli.session_dir)?));
    let base_url = cli
        .server
        .unwrap_or_else(techblog_client::base_url_from_env);
    tracing::debug!(%base_url, "Connecting to blog API");
    let client = BlogClient::new(base_url, store);

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => match client.register(name, email, password).await {
            Ok(user) => {
                println!("{} Registered and logged in as {}", "✓".green(), user.name.bold());
                println!("  Email: {}", user.email);
            }
            Err(e) => fail(e),
        },

        Commands::Login { email, password } => match client.login(email, password).await {
            Ok(user) => {
                println!("{} Logged in as {}", "✓".green(), user.name.bold());
                println!("  Email: {}", user.email);
                if client.is_admin() {
                    println!("  Role: {}", "ADMIN".yellow());
                }
            }
            Err(e) => fail(e),
        },

        Commands::Logout => {
            client.logout();
            println!("{} Logged out", "✓".green());
        }

        Commands::Whoami => match client.current_user() {
            Some(user) => {
                println!("{} ({})", user.name.bold(), user.email);
                if client.is_admin() {
                    println!("Role: {}", "ADMIN".yellow());
                }
            }
            None => println!("Not logged in"),
        },

        Commands::Post { command } => match command {
            PostCommands::List { page, limit } => {
                match client.list_posts(page, limit).await {
                    Ok(feed) => {
                        println!(
                            "Page {}/{} ({} posts total)",
                            feed.page,
                            feed.total_pages(),
                            feed.total
                        );
                        if feed.posts.is_empty() {
                            println!("  No posts found.");
                        }
                        for post in &feed.posts {
                            print_post(post);
                        }
                    }
                    Err(e) => fail(e),
                }
            }

            PostCommands::Get { id } => match client.get_post(&id).await {
                Ok(post) => {
                    println!("{}", post.title.bold());
                    println!(
                        "By {} on {}",
                        post.author_name(),
                        format_date(&post.created_at)
                    );
                    println!();
                    println!("{}", post.content);

                    // Comments render below the post, newest first.
                    if let Ok(thread) = client.comments_for_post(&post.id).await {
                        println!();
                        println!("Comments ({}):", thread.len());
                        for comment in thread.iter() {
                            print_comment(comment);
                        }
                    }
                }
                Err(e) => fail(e),
            },

            PostCommands::Create { title, content } => {
                require_login(&client);
                match client.create_post(title, content).await {
                    Ok(post) => {
                        println!("{} Post created: [{}] {}", "✓".green(), post.id, post.title);
                    }
                    Err(e) => fail(e),
                }
            }

            PostCommands::Update { id, title, content } => {
                require_login(&client);
                match client.update_post(&id, title, content).await {
                    Ok(post) => {
                        println!("{} Post updated: [{}] {}", "✓".green(), post.id, post.title);
                    }
                    Err(e) => fail(e),
                }
            }

            PostCommands::Delete { id } => {
                require_login(&client);
                match client.delete_post(&id).await {
                    Ok(()) => println!("{} Post deleted", "✓".green()),
                    Err(e) => fail(e),
                }
            }
        },

        Commands::Comment { command } => match command {
            CommentCommands::List { post_id } => {
                let me = client.current_user();
                match client.comments_for_post(&post_id).await {
                    Ok(thread) => {
                        if thread.is_empty() {
                            println!("No comments yet.");
                        }
                        for comment in thread.iter() {
                            print_comment(comment);
                            // Same gating as the edit/delete controls:
                            // owner or admin.
                            if me.as_ref().map(|u| comment.can_modify(u)).unwrap_or(false) {
                                println!("      {}", "editable".dimmed());
                            }
                        }
                    }
                    Err(e) => fail(e),
                }
            }

            CommentCommands::Add { post_id, content } => {
                require_login(&client);
                match client.add_comment(post_id, content).await {
                    Ok(comment) => {
                        println!("{} Comment added: [{}]", "✓".green(), comment.id);
                    }
                    Err(e) => fail(e),
                }
            }

            CommentCommands::Update { id, content } => {
                require_login(&client);
                match client.update_comment(&id, content).await {
                    Ok(comment) => {
                        println!("{} Comment updated: [{}]", "✓".green(), comment.id);
                    }
                    Err(e) => fail(e),
                }
            }

            CommentCommands::Delete { id } => {
                require_login(&client);
                match client.delete_comment(&id).await {
                    Ok(()) => println!("{} Comment deleted", "✓".green()),
                    Err(e) => fail(e),
                }
            }
        },

        Commands::Admin { command } => {
            require_admin(&client);

            match command {
                AdminCommands::Dashboard => match client.dashboard().await {
                    Ok(stats) => {
                        println!("{}", "Admin Dashboard".bold());
                        println!("  Total Users:    {}", stats.users);
                        println!("  Total Posts:    {}", stats.posts);
                        println!("  Total Comments: {}", stats.comments);
                    }
                    Err(e) => fail(e),
                },

                AdminCommands::Users => match client.list_users().await {
                    Ok(users) => {
                        if users.is_empty() {
                            println!("No users found.");
                        }
                        for user in users {
                            let role = if user.role.is_admin() {
                                "ADMIN".yellow()
                            } else {
                                "USER".normal()
                            };
                            println!("  [{}] {} <{}> {}", user.id, user.name, user.email, role);
                        }
                    }
                    Err(e) => fail(e),
                },

                AdminCommands::DeleteUser { id } => match client.delete_user(&id).await {
                    Ok(()) => println!("{} User deleted", "✓".green()),
                    Err(e) => fail(e),
                },

                AdminCommands::Comments => match client.list_all_comments().await {
                    Ok(comments) => {
                        if comments.is_empty() {
                            println!("No comments found.");
                        }
                        for comment in &comments {
                            print_comment(comment);
                        }
                    }
                    Err(e) => fail(e),
                },

                AdminCommands::DeleteComment { id } => {
                    match client.admin_delete_comment(&id).await {
                        Ok(()) => println!("{} Comment deleted", "✓".green()),
                        Err(e) => fail(e),
                    }
                }

                AdminCommands::DeletePost { id } => match client.admin_delete_post(&id).await {
                    Ok(()) => println!("{} Post deleted", "✓".green()),
                    Err(e) => fail(e),
                },
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn date_renders_dd_mm_yyyy() {
        use chrono::TimeZone;
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(&date), "05/03/2024");
    }
}
