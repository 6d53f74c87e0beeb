//! Waitline CLI — command-line companion to the launch landing page.
//!
//! Everything the page does, minus the DOM: resolve the vendor API key,
//! subscribe an email to the waitlist, look up a contact, run the 50/30/20
//! budget demo, and watch the launch countdown.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::Write as _;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};

use waitline_core::budget::{self, Frequency};
use waitline_core::countdown::{Countdown, next_launch_date};
use waitline_core::keysource::KeyStore;
use waitline_core::resolver::default_resolver;
use waitline_core::signup::{SignupController, SubmissionStatus};
use waitline_core::vendor::{ContactQuery, VendorConfig, build_client};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
}

// ── CLI structure ────────────────────────────────────────────────────

/// Waitline — the launch waitlist, from your terminal.
#[derive(Parser)]
#[command(
    name = "waitline",
    version,
    about = "Waitline CLI — waitlist signups, budget demo, launch countdown",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         WAITLINE_VENDOR      Mailing-list vendor: brevo (default) or resend\n  \
         WAITLINE_API_KEY     Vendor API key (also BREVO_API_KEY / RESEND_API_KEY)\n  \
         BREVO_LIST_ID        Brevo list id (default: 5)\n  \
         RESEND_AUDIENCE_ID   Resend audience id (required for resend)\n\n\
         {DIM}Examples:{RESET}\n  \
         waitline status\n  \
         waitline subscribe ada@example.com\n  \
         waitline budget --income 5500 --spending 3200\n  \
         waitline countdown --watch"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show vendor configuration and where (if anywhere) the key resolves.
    Status,
    /// Subscribe an email address to the waitlist.
    Subscribe {
        /// Email address to subscribe.
        email: String,
        /// Optional first name passed to the vendor.
        #[arg(long, default_value = "")]
        first_name: String,
        /// Optional last name passed to the vendor.
        #[arg(long, default_value = "")]
        last_name: String,
        /// One-shot API key override; persisted to the key store for reuse.
        #[arg(long)]
        key: Option<String>,
    },
    /// Look up an existing contact by id or email.
    Contact {
        /// Vendor contact id.
        #[arg(long)]
        id: Option<String>,
        /// Contact email address.
        #[arg(long)]
        email: Option<String>,
    },
    /// Run the 50/30/20 budget breakdown.
    Budget {
        /// Income amount (currency symbols and separators are fine).
        #[arg(long)]
        income: String,
        /// Spending amount.
        #[arg(long)]
        spending: String,
        /// Frequency of the income figure: monthly or weekly.
        #[arg(long, default_value = "monthly")]
        income_frequency: Frequency,
        /// Frequency of the spending figure: monthly or weekly.
        #[arg(long, default_value = "monthly")]
        spending_frequency: Frequency,
    },
    /// Show time remaining until launch (next December 1).
    Countdown {
        /// Re-render every second until launch.
        #[arg(long)]
        watch: bool,
    },
    /// Manage the persisted vendor API key.
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Persist a key to the store.
    Set { value: String },
    /// Show whether a key is stored (the value itself is not printed).
    Show,
    /// Remove the stored key.
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Status => cmd_status(),
        Commands::Subscribe {
            email,
            first_name,
            last_name,
            key,
        } => cmd_subscribe(&email, first_name, last_name, key).await,
        Commands::Contact { id, email } => cmd_contact(id, email).await,
        Commands::Budget {
            income,
            spending,
            income_frequency,
            spending_frequency,
        } => cmd_budget(&income, &spending, income_frequency, spending_frequency),
        Commands::Countdown { watch } => cmd_countdown(watch).await,
        Commands::Key { action } => cmd_key(&action),
    }
}

// ── Command handlers ─────────────────────────────────────────────────

fn cmd_status() -> Result<()> {
    println!();
    header("📋", "Waitline Status");
    println!();

    match VendorConfig::from_env() {
        Ok(config) => {
            kv_line("Vendor", config.vendor_name());
            match &config {
                VendorConfig::Brevo { list_id } => kv_line("List ID", &list_id.to_string()),
                VendorConfig::Resend { audience_id } => kv_line("Audience ID", audience_id),
            }
            kv_line("API base", &config.base_url());

            let resolver = default_resolver(config.vendor_name(), None);
            match resolver.resolve() {
                Some(resolved) => {
                    kv_line("API key", &format!("{GREEN}resolved{RESET} ({})", resolved.source));
                }
                None => {
                    kv_line("API key", &format!("{RED}not configured{RESET}"));
                }
            }

            if let Some(store) = KeyStore::default_for(config.vendor_name()) {
                kv_line("Key store", &store.path().display().to_string());
            }
        }
        Err(e) => {
            warning(&format!("vendor misconfigured: {e}"));
        }
    }

    println!();
    Ok(())
}

async fn cmd_subscribe(
    email: &str,
    first_name: String,
    last_name: String,
    key: Option<String>,
) -> Result<()> {
    let config = VendorConfig::from_env()?;

    println!();
    header("✉️", "Join the waitlist");
    println!();
    kv_line("Vendor", config.vendor_name());
    kv_line("Email", email);
    println!();

    // --key is the one-shot override: consumed here, persisted to the
    // store for future runs.
    let resolver = default_resolver(config.vendor_name(), key);
    let client = resolver
        .resolve()
        .map(|resolved| build_client(&config, resolved.key));

    let mut controller = SignupController::new(client).with_names(first_name, last_name);
    controller.on_edit(email);

    println!("  {DIM}Submitting…{RESET}");
    let status = controller.submit().await;
    println!();

    match status {
        SubmissionStatus::Success => {
            success(controller.message().unwrap_or("You're on the list!"));
            println!();
            Ok(())
        }
        _ => {
            bail!("{}", controller.message().unwrap_or("subscription failed"))
        }
    }
}

async fn cmd_contact(id: Option<String>, email: Option<String>) -> Result<()> {
    let config = VendorConfig::from_env()?;

    let resolver = default_resolver(config.vendor_name(), None);
    let Some(resolved) = resolver.resolve() else {
        bail!("mailing-list API key is not configured — set WAITLINE_API_KEY or run `waitline key set`");
    };
    let client = build_client(&config, resolved.key);

    let contact = client
        .get_contact(&ContactQuery { id, email })
        .await
        .context("contact lookup failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&contact).unwrap_or_else(|_| contact.to_string())
    );
    Ok(())
}

fn cmd_budget(
    income: &str,
    spending: &str,
    income_frequency: Frequency,
    spending_frequency: Frequency,
) -> Result<()> {
    let breakdown = budget::compute_raw(income, spending, income_frequency, spending_frequency)?;

    println!();
    header("💰", "50/30/20 Budget Breakdown");
    println!();
    kv_line("Monthly income", &format!("${:.2}", breakdown.monthly_income));
    if breakdown.income_scaled {
        println!("  {DIM}(scaled ×4 from weekly){RESET}");
    }
    kv_line(
        "Monthly spending",
        &format!("${:.2}", breakdown.monthly_spending),
    );
    if breakdown.spending_scaled {
        println!("  {DIM}(scaled ×4 from weekly){RESET}");
    }
    println!();
    kv_line("Essentials (50%)", &format!("${:.2}", breakdown.essentials));
    kv_line("Wants (30%)", &format!("${:.2}", breakdown.wants));
    kv_line("Savings (20%)", &format!("${:.2}", breakdown.savings));
    kv_line(
        "Debt-to-income",
        &format!("{:.2}%", breakdown.debt_to_income),
    );
    println!();
    Ok(())
}

async fn cmd_countdown(watch: bool) -> Result<()> {
    let target = next_launch_date(Utc::now());

    if !watch {
        let cd = Countdown::until(Utc::now(), target);
        println!();
        header("🚀", "Launch Countdown");
        println!();
        kv_line("Launch date", &target.format("%Y-%m-%d").to_string());
        kv_line("Remaining", &cd.to_string());
        println!();
        return Ok(());
    }

    println!();
    println!("  {DIM}Counting down to {} — ctrl-c to stop{RESET}", target.format("%Y-%m-%d"));
    println!();

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let cd = Countdown::until(Utc::now(), target);
        print!("\r  {BOLD}{cd}{RESET}  ");
        let _ = std::io::stdout().flush();
        if cd.is_elapsed() {
            println!();
            success("Launched!");
            return Ok(());
        }
    }
}

fn cmd_key(action: &KeyCommands) -> Result<()> {
    let config = VendorConfig::from_env()?;
    let store = KeyStore::default_for(config.vendor_name())
        .context("could not determine home directory")?;

    match action {
        KeyCommands::Set { value } => {
            if value.trim().is_empty() {
                bail!("refusing to store an empty key");
            }
            store
                .save(value.trim())
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            success(&format!(
                "Key stored at {DIM}{}{RESET}",
                store.path().display()
            ));
            Ok(())
        }
        KeyCommands::Show => {
            if store.load().is_some() {
                success(&format!("Key present at {}", store.path().display()));
            } else {
                warning("no key stored");
            }
            Ok(())
        }
        KeyCommands::Clear => {
            store
                .clear()
                .with_context(|| format!("failed to remove {}", store.path().display()))?;
            success("Stored key removed.");
            Ok(())
        }
    }
}
