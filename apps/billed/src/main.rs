use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    fixture_bills, BillStore, FileSessionStorage, FileUploader, MemoryStore, RestStore,
};
use controllers::{
    new_bill::file_name_from_path, BillsController, BillsPage, DashboardController,
    DashboardState, FileChangeOutcome, NewBillController, NewBillForm, RecordingNavigator,
    Renderer, SelectedFile, SessionGuard, SubmitOutcome,
};
use shared::domain::{BillId, BillStatus, Session};
use tracing::info;

mod config;

use config::{load_settings, prepare_session_path};

#[derive(Parser, Debug)]
#[command(name = "billed", about = "Expense reports for employees and admins")]
struct Cli {
    /// Use an in-memory store seeded with sample bills instead of the API.
    #[arg(long)]
    demo: bool,
    /// Print page markup instead of a text summary.
    #[arg(long)]
    html: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = Role::Employee)]
        role: Role,
    },
    Logout,
    Bills,
    NewBill {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "type", default_value = "Transports")]
        expense_type: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
    },
    Dashboard {
        #[arg(long, value_parser = BillStatus::from_code)]
        expand: Vec<BillStatus>,
    },
    Accept {
        id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Refuse {
        id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Employee,
    Admin,
}

#[derive(Clone, Copy, Debug)]
enum Decision {
    Accept,
    Refuse,
}

struct Backend {
    store: Arc<dyn BillStore>,
    uploader: Arc<dyn FileUploader>,
}

impl Backend {
    fn connect(demo: bool, settings: &config::Settings) -> Result<Self> {
        if demo {
            info!("using the in-memory demo store");
            let store = Arc::new(MemoryStore::with_records(fixture_bills()));
            return Ok(Self {
                store: store.clone(),
                uploader: store,
            });
        }
        let store = Arc::new(
            RestStore::new(&settings.api_url, settings.request_timeout())
                .context("failed to build bill api client")?,
        );
        info!(api_url = %store.base_url(), "using the bill api");
        Ok(Self {
            store: store.clone(),
            uploader: store,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_level.as_str())
        .init();

    prepare_session_path(&settings.session_path)?;
    let navigator = Arc::new(RecordingNavigator::new());
    let storage = Arc::new(FileSessionStorage::new(settings.session_path.clone()));
    let guard = SessionGuard::new(storage, navigator.clone());
    let backend = Backend::connect(cli.demo, &settings)?;

    match cli.command {
        Command::Login { email, role } => {
            let session = match role {
                Role::Employee => Session::employee(email),
                Role::Admin => Session::admin(email),
            };
            guard.login(&session)?;
            println!("logged in as {} ({:?})", session.email, session.user_type);
        }
        Command::Logout => {
            guard.logout()?;
            println!("logged out");
        }
        Command::Bills => {
            let controller = BillsController::mount(&guard, backend.store, navigator)?;
            let page = controller.load_page().await;
            if cli.html {
                println!("{}", Renderer::new()?.bills_page(&page)?);
            } else {
                print_bills(&page);
            }
        }
        Command::NewBill {
            file,
            expense_type,
            name,
            amount,
            date,
            vat,
            pct,
            commentary,
        } => {
            let mut controller =
                NewBillController::mount(&guard, backend.store, backend.uploader, navigator)?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read attachment '{}'", file.display()))?;
            let selected = SelectedFile {
                name: file_name_from_path(&file.to_string_lossy()).to_string(),
                content_type: None,
                bytes,
            };
            match controller.handle_file_change([selected]).await {
                FileChangeOutcome::Uploaded(uploaded) => println!("attachment: {}", uploaded.file_url),
                FileChangeOutcome::Rejected(err) => return Err(err.into()),
                FileChangeOutcome::UploadFailed(message) => {
                    return Err(anyhow!("attachment upload failed: {message}"))
                }
                FileChangeOutcome::Ignored => {}
            }

            let form = NewBillForm {
                expense_type,
                name,
                date,
                amount,
                vat,
                pct,
                commentary,
            };
            match controller.handle_submit(&form).await {
                SubmitOutcome::Submitted(record) => {
                    let id = record.id.map(|id| id.to_string()).unwrap_or_default();
                    println!("bill {id} submitted");
                }
                SubmitOutcome::Incomplete(missing) => {
                    return Err(anyhow!("missing or invalid fields: {missing:?}"))
                }
                SubmitOutcome::Failed(message) => return Err(anyhow!(message)),
            }
        }
        Command::Dashboard { expand } => {
            let mut controller = DashboardController::mount(
                &guard,
                backend.store,
                navigator,
                settings.exclude_test_accounts,
            )?;
            controller.load().await?;
            let mut state = DashboardState::new();
            for status in expand {
                controller.handle_show_tickets(&mut state, status.panel_index());
            }
            if cli.html {
                println!("{}", Renderer::new()?.dashboard_page(&state)?);
            } else {
                print_dashboard(&controller, &state);
            }
        }
        Command::Accept { id, comment } => {
            decide(&guard, backend, navigator, &settings, Decision::Accept, id, comment).await?;
        }
        Command::Refuse { id, comment } => {
            decide(&guard, backend, navigator, &settings, Decision::Refuse, id, comment).await?;
        }
    }

    Ok(())
}

async fn decide(
    guard: &SessionGuard,
    backend: Backend,
    navigator: Arc<RecordingNavigator>,
    settings: &config::Settings,
    decision: Decision,
    id: String,
    comment: String,
) -> Result<()> {
    let mut controller = DashboardController::mount(
        guard,
        backend.store,
        navigator,
        settings.exclude_test_accounts,
    )?;
    controller.load().await?;
    let id = BillId::new(id);
    let bill = controller
        .bills()
        .iter()
        .find(|bill| bill.id.as_ref() == Some(&id))
        .cloned()
        .ok_or_else(|| anyhow!("no bill with id {id}"))?;

    let decided = match decision {
        Decision::Accept => controller.handle_accept_submit(&bill, &comment).await,
        Decision::Refuse => controller.handle_refuse_submit(&bill, &comment).await,
    };
    println!("bill {id} is now {}", decided.status.label());
    Ok(())
}

fn print_bills(page: &BillsPage) {
    match page {
        BillsPage::Loaded(rows) => {
            for row in rows {
                let bill = &row.bill;
                println!(
                    "{:<22} {:<12} {:<20} {:>8} €  {}",
                    bill.id.as_ref().map(BillId::as_str).unwrap_or("-"),
                    controllers::format::format_date(&bill.date),
                    bill.name,
                    bill.amount,
                    row.status_label
                );
            }
        }
        BillsPage::Error(message) => println!("Erreur: {message}"),
    }
}

fn print_dashboard(controller: &DashboardController, state: &DashboardState) {
    println!(
        "{} bills for {}",
        controller.bills().len(),
        controller.session().email
    );
    for status in BillStatus::ALL {
        let bills = state.panel_bills(status);
        println!("[{}] {} ({:?})", status.panel_index(), status.label(), state.panel(status));
        for bill in bills {
            println!(
                "    {} {} {} €",
                bill.id.as_ref().map(BillId::as_str).unwrap_or("-"),
                bill.employee_email,
                bill.amount
            );
        }
    }
}
