//! Budget CLI
//!
//! Command-line front end for the budget service:
//! - Log in, register and log out (the session survives restarts)
//! - Show the dashboard
//! - Manage categories, transactions and budgets

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budget_client::config::generate_default_config;
use budget_client::render;
use budget_client::{
    BudgetClient, BudgetForm, BudgetPeriod, CategoryForm, CategoryType, Config, DashboardView,
    Form, FormState, LoggingConfig, RegisterRequest, TransactionForm, TransactionQuery, User,
};

#[derive(Parser)]
#[command(name = "budget")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal budget tracker client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and BUDGET_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: platform config dir, then ./budget.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and load the dashboard
    Login {
        username: String,
        /// Password (default: BUDGET_PASSWORD)
        #[arg(short, long, env = "BUDGET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        username: String,
        #[arg(short, long)]
        email: String,
        /// Password (default: BUDGET_PASSWORD)
        #[arg(short, long, env = "BUDGET_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Log out and forget the saved session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Ask the server instead of reading the saved session
        #[arg(long)]
        remote: bool,
    },

    /// Show totals, categories and recent transactions
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage transactions
    #[command(subcommand)]
    Tx(TxCommand),

    /// Manage budgets
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Print a default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
pub struct FilterArgs {
    /// Start of the date window (YYYY-MM-DD); needs --to
    #[arg(long)]
    from: Option<NaiveDate>,
    /// End of the date window (YYYY-MM-DD); needs --from
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Only this category ID
    #[arg(long)]
    category: Option<i64>,
}

impl FilterArgs {
    fn query(&self) -> TransactionQuery {
        TransactionQuery {
            start_date: self.from,
            end_date: self.to,
            category: self.category,
        }
    }
}

#[derive(clap::Args)]
pub struct CategoryArgs {
    name: String,
    /// income or expense
    #[arg(short = 't', long = "type", default_value = "expense")]
    category_type: CategoryType,
    /// Hex color, e.g. #3B82F6
    #[arg(long)]
    color: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
}

impl CategoryArgs {
    fn form(self) -> CategoryForm {
        let defaults = CategoryForm::default();
        CategoryForm {
            name: self.name,
            category_type: self.category_type,
            color: self.color.unwrap_or(defaults.color),
            description: self.description.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    List,
    Add(CategoryArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        category: CategoryArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(clap::Args)]
pub struct TxArgs {
    /// Category ID
    #[arg(short, long)]
    category: String,
    amount: String,
    #[arg(short, long)]
    description: Option<String>,
    /// YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,
}

impl TxArgs {
    fn form(self) -> TransactionForm {
        let defaults = TransactionForm::default();
        TransactionForm {
            category: self.category,
            amount: self.amount,
            description: self.description.unwrap_or_default(),
            date: self.date.unwrap_or(defaults.date),
        }
    }
}

#[derive(Subcommand)]
pub enum TxCommand {
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Add(TxArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        transaction: TxArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommand {
    List,
    Add {
        /// Category ID
        #[arg(short, long)]
        category: String,
        amount: String,
        /// weekly, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        period: BudgetPeriod,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    Delete {
        id: i64,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_dashboard(client: &BudgetClient, format: OutputFormat) -> anyhow::Result<()> {
    let user = client.session().current_user().await;
    let view = client.view().await;

    match format {
        OutputFormat::Json => print_json(&dashboard_json(user.as_ref(), &view)),
        OutputFormat::Table => {
            print!("{}", render::render_dashboard(user.as_ref(), &view));
            Ok(())
        }
    }
}

fn dashboard_json(user: Option<&User>, view: &DashboardView) -> serde_json::Value {
    let errors: serde_json::Map<String, serde_json::Value> = view
        .errors
        .iter()
        .map(|(resource, message)| (resource.to_string(), message.clone().into()))
        .collect();

    serde_json::json!({
        "user": user,
        "summary": view.summary,
        "categories": view.categories,
        "transactions": view.transactions,
        "errors": errors,
        "last_refreshed": view.last_refreshed,
    })
}

/// Submit a form through the given request, exiting with its error on failure
async fn submit<F, T, E, S, Fut>(form: F, send: S) -> anyhow::Result<T>
where
    F: Form,
    S: FnOnce(F::Output) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut state = FormState::<F>::new();
    state.form = form;
    state.open();
    Ok(state.submit(send).await?)
}

/// Restore the saved session or bail with a hint
async fn require_session(client: &BudgetClient) -> anyhow::Result<User> {
    match client.session().initialize().await {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run `budget login <username>` first."),
    }
}

/// Refresh and report partial failures without aborting
async fn refresh(client: &BudgetClient) {
    if let Err(e) = client.dashboard().refresh_all().await {
        tracing::warn!(error = %e, "Dashboard refresh incomplete");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, &content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config.logging);
    tracing::debug!(base_url = %config.api.base_url, "Budget CLI v{}", env!("CARGO_PKG_VERSION"));

    let client = BudgetClient::from_config(&config)?;
    let format = cli.format;

    match cli.command {
        Commands::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            println!("Logged in as {}", user.display_name());
            print_dashboard(&client, format).await?;
        }

        Commands::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password2: password.clone(),
                password,
                first_name,
                last_name,
            };
            let user = client.register(&request).await?;
            println!("Registered {}", user.display_name());
            print_dashboard(&client, format).await?;
        }

        Commands::Logout => {
            client.session().initialize().await;
            client.logout().await?;
            println!("Logged out");
        }

        Commands::Whoami { remote } => {
            let mut user = require_session(&client).await?;
            if remote {
                user = client.session().refresh_profile().await?;
            }
            match format {
                OutputFormat::Json => print_json(&user)?,
                OutputFormat::Table => {
                    println!("{} (@{}, id {})", user.display_name(), user.username, user.id);
                    println!("{}", user.email);
                }
            }
        }

        Commands::Dashboard { filter } => {
            require_session(&client).await?;
            client.dashboard().set_filter(filter.query()).await;
            refresh(&client).await;
            print_dashboard(&client, format).await?;
        }

        Commands::Category(command) => {
            require_session(&client).await?;
            let dashboard = client.dashboard().clone();

            match command {
                CategoryCommand::List => {
                    refresh(&client).await;
                    let view = client.view().await;
                    match format {
                        OutputFormat::Json => print_json(&view.categories)?,
                        OutputFormat::Table => print!("{}", render::render_categories(&view.categories)),
                    }
                    return Ok(());
                }
                CategoryCommand::Add(args) => {
                    let created =
                        submit(args.form(), |c| async move { dashboard.create_category(&c).await })
                            .await?;
                    println!("Created category {} ({})", created.name, created.id);
                }
                CategoryCommand::Edit { id, category } => {
                    let updated = submit(category.form(), |c| async move {
                        dashboard.update_category(id, &c).await
                    })
                    .await?;
                    println!("Updated category {} ({})", updated.name, updated.id);
                }
                CategoryCommand::Delete { id } => {
                    dashboard.delete_category(id).await?;
                    println!("Deleted category {}", id);
                }
            }
            print_dashboard(&client, format).await?;
        }

        Commands::Tx(command) => {
            require_session(&client).await?;
            let dashboard = client.dashboard().clone();

            match command {
                TxCommand::List { filter } => {
                    dashboard.set_filter(filter.query()).await;
                    refresh(&client).await;
                    let view = client.view().await;
                    match format {
                        OutputFormat::Json => print_json(&view.transactions)?,
                        OutputFormat::Table => {
                            print!("{}", render::render_transactions(&view.transactions))
                        }
                    }
                    return Ok(());
                }
                TxCommand::Add(args) => {
                    let created = submit(args.form(), |t| async move {
                        dashboard.create_transaction(&t).await
                    })
                    .await?;
                    println!("Created transaction {}", created.id);
                }
                TxCommand::Edit { id, transaction } => {
                    let updated = submit(transaction.form(), |t| async move {
                        dashboard.update_transaction(id, &t).await
                    })
                    .await?;
                    println!("Updated transaction {}", updated.id);
                }
                TxCommand::Delete { id } => {
                    dashboard.delete_transaction(id).await?;
                    println!("Deleted transaction {}", id);
                }
            }
            print_dashboard(&client, format).await?;
        }

        Commands::Budget(command) => {
            require_session(&client).await?;
            let dashboard = client.dashboard().clone();

            match command {
                BudgetCommand::List => {
                    let budgets = dashboard.list_budgets().await?;
                    match format {
                        OutputFormat::Json => print_json(&budgets)?,
                        OutputFormat::Table => print!("{}", render::render_budgets(&budgets)),
                    }
                }
                BudgetCommand::Add {
                    category,
                    amount,
                    period,
                    start,
                    end,
                } => {
                    let form = BudgetForm {
                        category,
                        amount,
                        period,
                        start_date: start,
                        end_date: end,
                    };
                    let created =
                        submit(form, |b| async move { dashboard.create_budget(&b).await }).await?;
                    println!("Created budget {}", created.id);
                }
                BudgetCommand::Delete { id } => {
                    dashboard.delete_budget(id).await?;
                    println!("Deleted budget {}", id);
                }
            }
        }

        // Printed before the client was built
        Commands::Config { .. } => {}
    }

    Ok(())
}
