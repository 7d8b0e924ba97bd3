use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use widget_console::authz::Capabilities;
use widget_console::catalog::PermissionCatalog;
use widget_console::config::{load_env, ConsoleConfig};
use widget_console::console::AdminConsole;
use widget_console::draft::RoleDraft;
use widget_console::models::{PermissionCategory, Role};
use widget_console::notify::LogNotifier;
use widget_console::selection::{summarize, SelectionStatus};
use widget_console::services::HttpAdminGateway;

#[derive(Parser, Debug)]
#[command(author, version, about = "Operator console for the chat-widget admin backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse the permission catalog grouped by category
    Permissions,
    /// Manage roles and their granted permissions
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },
}

#[derive(Subcommand, Debug)]
enum RoleCommands {
    /// List all roles
    List,
    /// Show one role with per-category selection badges
    Show { role: String },
    /// Create a role
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Grant a single permission (id or name); repeatable
        #[arg(long = "grant")]
        grants: Vec<String>,
        /// Grant every permission in a category; repeatable
        #[arg(long = "grant-category")]
        grant_categories: Vec<String>,
    },
    /// Edit an existing role (matched by id or name)
    Edit {
        role: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "grant")]
        grants: Vec<String>,
        #[arg(long = "revoke")]
        revokes: Vec<String>,
        #[arg(long = "grant-category")]
        grant_categories: Vec<String>,
        #[arg(long = "revoke-category")]
        revoke_categories: Vec<String>,
    },
    /// Delete a role (matched by id or name)
    Delete { role: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();

    let config = ConsoleConfig::from_env()?;
    let gateway = Arc::new(HttpAdminGateway::new(&config)?);
    // The CLI is trusted operator tooling: the backend enforces the real
    // policy, so no local capability gating.
    let console = AdminConsole::new(
        gateway.clone(),
        gateway,
        Capabilities::unrestricted(),
        Arc::new(LogNotifier),
    );

    match cli.command {
        Commands::Permissions => {
            let categories = console.permission_categories().await?;
            print_categories(&categories);
        }
        Commands::Roles { command } => match command {
            RoleCommands::List => {
                let roles = console.list_roles().await?;
                print_roles(&roles);
            }
            RoleCommands::Show { role } => {
                let role = console.find_role(&role).await?;
                let catalog = console.load_catalog().await?;
                print_role(&role, &catalog);
            }
            RoleCommands::Create {
                name,
                description,
                grants,
                grant_categories,
            } => {
                let catalog = console.load_catalog().await?;

                let mut draft = RoleDraft::create();
                draft.set_name(name)?;
                if let Some(description) = description {
                    draft.set_description(description)?;
                }
                apply_grants(&mut draft, &catalog, &grants, true)?;
                apply_category_grants(&mut draft, &catalog, &grant_categories, true)?;

                let saved = console.save_draft(&mut draft).await?;
                println!("Created role '{}' ({})", saved.name, saved.id);
                print_roles(&console.list_roles().await?);
            }
            RoleCommands::Edit {
                role,
                name,
                description,
                grants,
                revokes,
                grant_categories,
                revoke_categories,
            } => {
                let role = console.find_role(&role).await?;
                let catalog = console.load_catalog().await?;

                let mut draft = RoleDraft::edit(&role, &catalog);
                if let Some(name) = name {
                    draft.set_name(name)?;
                }
                if let Some(description) = description {
                    draft.set_description(description)?;
                }
                apply_grants(&mut draft, &catalog, &grants, true)?;
                apply_grants(&mut draft, &catalog, &revokes, false)?;
                apply_category_grants(&mut draft, &catalog, &grant_categories, true)?;
                apply_category_grants(&mut draft, &catalog, &revoke_categories, false)?;

                let saved = console.save_draft(&mut draft).await?;
                println!("Updated role '{}' ({})", saved.name, saved.id);
                print_roles(&console.list_roles().await?);
            }
            RoleCommands::Delete { role } => {
                let role = console.find_role(&role).await?;
                console.delete_role(&role).await?;
                println!("Deleted role '{}'", role.name);
            }
        },
    }

    Ok(())
}

fn apply_grants(
    draft: &mut RoleDraft,
    catalog: &PermissionCatalog,
    keys: &[String],
    checked: bool,
) -> anyhow::Result<()> {
    for key in keys {
        let id = resolve_permission_id(catalog, key)
            .with_context(|| format!("no permission matching '{key}'"))?;
        draft.toggle_permission(&id, checked)?;
    }
    Ok(())
}

fn apply_category_grants(
    draft: &mut RoleDraft,
    catalog: &PermissionCatalog,
    labels: &[String],
    checked: bool,
) -> anyhow::Result<()> {
    let categories = catalog.categories();
    for label in labels {
        let category = categories
            .iter()
            .find(|c| c.category == *label || c.id == *label)
            .with_context(|| format!("no permission category matching '{label}'"))?;
        draft.toggle_category(&category.permissions, checked)?;
    }
    Ok(())
}

fn resolve_permission_id(catalog: &PermissionCatalog, key: &str) -> Option<String> {
    if catalog.contains_id(key) {
        return Some(key.to_string());
    }
    catalog.id_for_name(key).map(str::to_string)
}

fn print_categories(categories: &[PermissionCategory]) {
    for category in categories {
        println!("{} ({})", category.category, category.permissions.len());
        for permission in &category.permissions {
            match &permission.description {
                Some(description) => println!("  {:<28} {}", permission.label(), description),
                None => println!("  {}", permission.label()),
            }
        }
    }
}

fn print_roles(roles: &[Role]) {
    println!("{:<38} {:<24} {:<8} {}", "Id", "Name", "System", "Permissions");
    for role in roles {
        println!(
            "{:<38} {:<24} {:<8} {}",
            role.id,
            role.name,
            if role.is_system { "yes" } else { "no" },
            role.permissions.len()
        );
    }
}

fn print_role(role: &Role, catalog: &PermissionCatalog) {
    let selection = catalog.seed_selection(&role.permissions);

    println!("{} ({})", role.name, role.id);
    if let Some(description) = &role.description {
        println!("{description}");
    }

    for category in catalog.categories() {
        let summary = summarize(&category.permissions, &selection);
        let mark = match summary.status {
            SelectionStatus::All => "x",
            SelectionStatus::Partial => "~",
            SelectionStatus::None => " ",
        };
        println!(
            "[{}] {:<24} {}/{}",
            mark, category.category, summary.selected, summary.total
        );
    }
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
