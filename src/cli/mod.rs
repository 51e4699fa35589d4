//! CLI module for the RepayKaro portal.
//!
//! With no subcommand (or `serve`) the binary starts the portal server. Every
//! other subcommand drives a running portal through [`PortalSession`], the
//! same way the portal's pages do:
//! - `login` - Request an OTP, or sign in with one
//! - `whoami` - Revalidate both sessions
//! - `breakdown` - Show the payment options and rewards
//! - `cards`, `scratch`, `redeem` - Scratch-card rewards
//! - `screenshots` - List, upload or delete payment proof
//! - `admin` - Admin sign-in and the customer list
//! - `logout` - End the customer (or admin) session
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{CustomerQuery, Upload};
use crate::client::otp::{validate_otp, validate_phone, RESEND_COOLDOWN};
use crate::client::pagination::{page_window, total_pages};
use crate::client::{CardAction, FileStore, HttpPortalApi, LoginPayload, PortalSession};
use crate::models::{format_inr, parse_decimal, Customer};
use crate::session::SessionKind;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "repaykaro")]
#[command(author, version, about = "Loan repayment portal gateway", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "repaykaro.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the external backend base URL
    #[arg(long, env = "REPAYKARO_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Portal to connect to for client commands
    #[arg(long, env = "REPAYKARO_PORTAL_URL", default_value = "http://localhost:3000")]
    pub portal_url: String,

    /// File that keeps the session between invocations
    #[arg(
        long,
        env = "REPAYKARO_SESSION_FILE",
        default_value = ".repaykaro-session.json"
    )]
    pub session_file: PathBuf,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether this invocation starts the server
    pub fn is_serve(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the portal server
    Serve,

    /// Sign in with phone and OTP. Without --otp an OTP is sent.
    Login {
        /// 10-digit phone number
        #[arg(long)]
        phone: String,
        /// 4-digit OTP received by SMS
        #[arg(long)]
        otp: Option<String>,
    },

    /// Revalidate the stored sessions
    Whoami,

    /// Show payment options and rewards
    Breakdown,

    /// List scratch cards
    Cards,

    /// Scratch a card
    Scratch {
        /// Card ID
        id: String,
    },

    /// Redeem a scratched card
    Redeem {
        /// Card ID
        id: String,
    },

    /// Payment proof screenshots
    #[command(subcommand)]
    Screenshots(ScreenshotCommands),

    /// Admin commands
    #[command(subcommand)]
    Admin(AdminCommands),

    /// End a session
    Logout {
        /// End the admin session instead of the customer one
        #[arg(long)]
        admin: bool,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ScreenshotCommands {
    /// List uploaded screenshots
    List,
    /// Upload an image as payment proof
    Upload {
        /// Image file
        path: PathBuf,
    },
    /// Delete a screenshot
    Delete {
        /// Screenshot ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Sign in as admin
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REPAYKARO_ADMIN_PASSWORD")]
        password: String,
    },
    /// List customers
    Customers {
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long, default_value = "10")]
        per_page: u64,
        /// Backend filter code (-1 for all)
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        filter: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Open the portal session stored in the session file
fn open_session(cli: &Cli) -> Result<PortalSession> {
    let api = HttpPortalApi::new(&cli.portal_url)?;
    let store = FileStore::open(&cli.session_file)?;
    let session = PortalSession::new(Arc::new(api), Arc::new(store));
    session.restore();
    Ok(session)
}

/// Fail with the portal's message when a reply is not a success
fn ensure_success(success: bool, message: Option<String>, fallback: &str) -> Result<()> {
    if success {
        return Ok(());
    }
    anyhow::bail!("{}", message.unwrap_or_else(|| fallback.to_string()))
}

/// Run a CLI command
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Login { phone, otp }) => cmd_login(cli, phone, otp.as_deref()).await,
        Some(Commands::Whoami) => cmd_whoami(cli).await,
        Some(Commands::Breakdown) => cmd_breakdown(cli).await,
        Some(Commands::Cards) => cmd_cards(cli).await,
        Some(Commands::Scratch { id }) => cmd_card_action(cli, id, CardAction::Scratch).await,
        Some(Commands::Redeem { id }) => cmd_card_action(cli, id, CardAction::Redeem).await,
        Some(Commands::Screenshots(ScreenshotCommands::List)) => cmd_screenshots_list(cli).await,
        Some(Commands::Screenshots(ScreenshotCommands::Upload { path })) => {
            cmd_screenshots_upload(cli, path).await
        }
        Some(Commands::Screenshots(ScreenshotCommands::Delete { id })) => {
            cmd_screenshots_delete(cli, id).await
        }
        Some(Commands::Admin(AdminCommands::Login { email, password })) => {
            cmd_admin_login(cli, email, password).await
        }
        Some(Commands::Admin(AdminCommands::Customers {
            page,
            per_page,
            filter,
        })) => cmd_admin_customers(cli, *page, *per_page, filter).await,
        Some(Commands::Logout { admin }) => cmd_logout(cli, *admin).await,
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        Some(Commands::Serve) | None => {
            // Server start is handled in main.rs
            Ok(())
        }
    }
}

async fn cmd_login(cli: &Cli, phone: &str, otp: Option<&str>) -> Result<()> {
    validate_phone(phone).map_err(anyhow::Error::msg)?;
    if let Some(otp) = otp {
        validate_otp(otp).map_err(anyhow::Error::msg)?;
    }

    let session = open_session(cli)?;
    let reply = session.api().login(phone, otp).await?;
    ensure_success(reply.success, reply.message.clone(), "Login failed")?;

    if otp.is_none() {
        println!(
            "[OK] {}",
            reply.message.as_deref().unwrap_or("OTP sent successfully")
        );
        println!(
            "Run `repaykaro login --phone {} --otp <code>` to sign in. A new OTP can be requested in {}s.",
            phone,
            RESEND_COOLDOWN.as_secs()
        );
        return Ok(());
    }

    let user = reply.user.context("Portal reply is missing the user")?;
    let token = reply.token.context("Portal reply is missing the token")?;
    let name = user
        .customer_name()
        .unwrap_or(user.phone.as_str())
        .to_string();
    session.login(LoginPayload::User { user, token })?;

    println!("[OK] Signed in as {}", name);
    Ok(())
}

async fn cmd_whoami(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let check = session.check_auth("/").await;

    println!();
    match session.user() {
        Some(user) if check.user_valid => {
            println!("Customer:   [OK] {} ({})", user.display_name(), user.phone)
        }
        _ => println!("Customer:   not signed in"),
    }
    match session.admin() {
        Some(admin) if check.admin_valid => {
            println!("Admin:      [OK] {} <{}>", admin.name, admin.email)
        }
        _ => println!("Admin:      not signed in"),
    }
    println!();
    Ok(())
}

/// Fetch the signed-in customer's full record
async fn current_customer(session: &PortalSession) -> Result<Customer> {
    let reply = session.api().user_status().await?;
    ensure_success(
        reply.success,
        reply.message,
        "Not signed in. Run `repaykaro login` first.",
    )?;
    reply.user.context("Portal reply is missing the user")
}

async fn cmd_breakdown(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let customer = current_customer(&session).await?;
    let breakdown = customer.breakdown();

    println!();
    println!("=== Payment Options: {} ===", customer.display_name());
    println!();
    println!("{:<18}  {:>14}  {:>14}", "OPTION", "AMOUNT", "REWARD");
    println!("{}", "-".repeat(50));
    for (label, amount, reward) in breakdown.rows() {
        println!(
            "{:<18}  {:>14}  {:>14}",
            label,
            format_inr(amount),
            format_inr(reward)
        );
    }
    println!("{}", "-".repeat(50));
    println!("{:<18}  {:>14}", "Total", format_inr(breakdown.total()));
    println!();
    println!("Status:     {}", customer.status_label());
    if let Some(url) = &customer.payment_url {
        println!("Pay at:     {}", url);
    }
    println!();
    Ok(())
}

async fn cmd_cards(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let reply = session.api().scratch_cards().await?;
    ensure_success(reply.success, reply.message, "Failed to fetch scratch cards")?;

    if reply.data.is_empty() {
        println!("No scratch cards yet.");
        return Ok(());
    }

    let now = Utc::now();
    println!();
    println!(
        "{:<26}  {:<16}  {:>12}  {:<12}  {:<20}",
        "ID", "CODE", "AMOUNT", "STATE", "EXPIRES"
    );
    println!("{}", "-".repeat(94));
    for card in reply.data {
        let expires = match card.expires_at() {
            Some(at) if card.is_expired(now) => format!("expired {}", at.format("%Y-%m-%d")),
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "-".to_string(),
        };
        println!(
            "{:<26}  {:<16}  {:>12}  {:<12}  {:<20}",
            truncate(&card.id, 26),
            truncate(&card.coupon_code, 16),
            format_inr(card.amount.value()),
            card.state().to_string(),
            expires
        );
    }
    println!();
    Ok(())
}

async fn cmd_card_action(cli: &Cli, id: &str, action: CardAction) -> Result<()> {
    let session = open_session(cli)?;
    let reply = session.api().card_action(id, action).await?;
    ensure_success(reply.success, reply.message.clone(), "Card action failed")?;

    println!("[OK] {}", reply.message.as_deref().unwrap_or("Done"));
    Ok(())
}

async fn cmd_screenshots_list(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let reply = session.api().screenshots().await?;
    ensure_success(reply.success, reply.message, "Failed to fetch screenshots")?;

    if reply.screenshots.is_empty() {
        println!("No screenshots uploaded.");
        return Ok(());
    }

    println!();
    println!("{:<26}  {:<8}  {:<26}  URL", "ID", "ACTIVE", "UPLOADED");
    println!("{}", "-".repeat(100));
    for shot in reply.screenshots {
        println!(
            "{:<26}  {:<8}  {:<26}  {}",
            truncate(&shot.id, 26),
            if shot.is_active.is_set() { "yes" } else { "no" },
            shot.created_at.as_deref().unwrap_or("-"),
            shot.url
        );
    }
    println!();
    Ok(())
}

/// Read an image from disk, guessing its content type from the extension
pub fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("screenshot")
        .to_string();
    let content_type = mime_guess::from_path(path).first().map(|m| m.to_string());

    Ok(Upload {
        file_name,
        content_type,
        bytes: bytes.into(),
    })
}

async fn cmd_screenshots_upload(cli: &Cli, path: &Path) -> Result<()> {
    let upload = read_upload(path)?;
    let session = open_session(cli)?;
    let reply = session.api().upload_screenshot(upload).await?;
    ensure_success(reply.success, reply.message.clone(), "Upload failed")?;

    println!(
        "[OK] {}",
        reply
            .message
            .as_deref()
            .unwrap_or("Screenshot uploaded successfully")
    );
    if let Some(shot) = reply.screen_shot {
        println!("     {} {}", shot.id, shot.url);
    }
    Ok(())
}

async fn cmd_screenshots_delete(cli: &Cli, id: &str) -> Result<()> {
    let session = open_session(cli)?;
    let reply = session.api().delete_screenshot(id).await?;
    ensure_success(reply.success, reply.message.clone(), "Delete failed")?;

    println!(
        "[OK] {}",
        reply
            .message
            .as_deref()
            .unwrap_or("Screenshot deleted successfully")
    );
    Ok(())
}

async fn cmd_admin_login(cli: &Cli, email: &str, password: &str) -> Result<()> {
    let session = open_session(cli)?;
    let reply = session.api().admin_login(email, password).await?;
    ensure_success(reply.success, reply.message, "Login failed")?;

    let summary = reply.user.context("Portal reply is missing the admin")?;
    let name = summary.name.clone();
    session.login(LoginPayload::Admin(summary))?;

    println!("[OK] Signed in as admin {}", name);
    Ok(())
}

async fn cmd_admin_customers(cli: &Cli, page: u64, per_page: u64, filter: &str) -> Result<()> {
    let session = open_session(cli)?;
    let query = CustomerQuery {
        page: page.to_string(),
        per_page: per_page.to_string(),
        filter: filter.to_string(),
    };
    let body = session.api().customers(&query).await?;

    let success = body.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    ensure_success(success, message, "Failed to fetch customers")?;

    let customers: Vec<Customer> = match body.get("data") {
        Some(data) => serde_json::from_value(data.clone()).context("Unexpected customer list")?,
        None => Vec::new(),
    };
    let records = body
        .get("totalRecords")
        .map(parse_decimal)
        .unwrap_or(0.0)
        .max(0.0) as u64;

    if customers.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6}  {:<20}  {:<12}  {:>12}  {:>12}  {:>12}  {:<32}  {:<8}  {:>5}",
        "SR.",
        "CUSTOMER",
        "PHONE",
        "FORECLOSURE",
        "SETTLEMENT",
        "MIN. PART",
        "REWARDS (F/S/M)",
        "STATUS",
        "PROOF"
    );
    println!("{}", "-".repeat(142));
    let offset = row_offset(page, per_page);
    for (i, customer) in customers.iter().enumerate() {
        println!("{}", customer_row(offset.saturating_add(i as u64 + 1), customer));
    }
    println!();

    let pages = total_pages(records, per_page);
    println!(
        "Page {} of {} ({} customers)   {}",
        page.min(pages),
        pages,
        records,
        render_pages(page, pages)
    );
    println!();
    Ok(())
}

/// Number of rows on the pages before `page`
fn row_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// One line of the admin customer table
fn customer_row(sr: u64, customer: &Customer) -> String {
    let breakdown = customer.breakdown();
    let rewards = format!(
        "{}/{}/{}",
        format_inr(breakdown.foreclosure_reward),
        format_inr(breakdown.settlement_reward),
        format_inr(breakdown.minimum_part_payment_reward)
    );
    format!(
        "{:<6}  {:<20}  {:<12}  {:>12}  {:>12}  {:>12}  {:<32}  {:<8}  {:>5}",
        sr,
        truncate(customer.display_name(), 20),
        customer.phone,
        format_inr(breakdown.foreclosure),
        format_inr(breakdown.settlement),
        format_inr(breakdown.minimum_part_payment),
        rewards,
        customer.status_label(),
        customer.payments.len()
    )
}

/// Page strip with the current page bracketed, e.g. `1 2 [3] 4 5`
fn render_pages(current: u64, total: u64) -> String {
    page_window(current, total)
        .into_iter()
        .map(|p| {
            if p == current {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn cmd_logout(cli: &Cli, admin: bool) -> Result<()> {
    let session = open_session(cli)?;
    let kind = if admin {
        SessionKind::Admin
    } else {
        SessionKind::User
    };

    let next = session.logout(kind).await;
    println!("[OK] Signed out. Next page: {}", next);
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    use crate::config::Config;

    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Server:");
            println!("  Host:         {}", config.server.host);
            println!("  Port:         {}", config.server.port);
            println!("  Static Dir:   {}", config.server.static_dir.display());
            println!();
            println!("Backend:");
            println!("  Base URL:     {}", config.backend.base_url);
            println!("  Timeout:      {}s", config.backend.timeout_secs);
            println!();
            println!("Session:");
            println!("  Max Age:      {} days", config.session.max_age_days);
            println!(
                "  Secure:       {}",
                if config.session.secure_cookies {
                    "Enabled"
                } else {
                    "Disabled"
                }
            );
            println!();

            let mut warnings = Vec::new();
            if !config.session.secure_cookies {
                warnings.push("Session cookies are not marked Secure - serve over HTTPS in production");
            }
            if !config.server.static_dir.exists() {
                warnings.push("Static directory does not exist - pages will not be served");
            }

            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["repaykaro"]).unwrap();
        assert!(cli.is_serve());
        assert_eq!(cli.config, PathBuf::from("repaykaro.toml"));

        let cli = Cli::try_parse_from(["repaykaro", "serve"]).unwrap();
        assert!(cli.is_serve());
    }

    #[test]
    fn test_parse_login_and_admin_commands() {
        let cli = Cli::try_parse_from([
            "repaykaro",
            "--portal-url",
            "http://portal.local",
            "login",
            "--phone",
            "9999999999",
            "--otp",
            "1234",
        ])
        .unwrap();
        assert!(!cli.is_serve());
        assert_eq!(cli.portal_url, "http://portal.local");
        match cli.command {
            Some(Commands::Login { phone, otp }) => {
                assert_eq!(phone, "9999999999");
                assert_eq!(otp.as_deref(), Some("1234"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "repaykaro",
            "admin",
            "customers",
            "--page",
            "2",
            "--filter",
            "-1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Admin(AdminCommands::Customers {
                page,
                per_page,
                filter,
            })) => {
                assert_eq!(page, 2);
                assert_eq!(per_page, 10);
                assert_eq!(filter, "-1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_row_offset_saturates() {
        assert_eq!(row_offset(1, 10), 0);
        assert_eq!(row_offset(3, 25), 50);
        assert_eq!(row_offset(0, 10), 0);
        assert_eq!(row_offset(u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_customer_row_counts_payment_proofs_and_rewards() {
        let customer: Customer = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "customer": "Asha",
            "phone": "9999999999",
            "fore_closure": "1000",
            "foreclosure_reward": {"$numberDecimal": "10.5"},
            "settlement_reward": {"$numberDecimal": "8"},
            "minimum_part_payment_reward": {"$numberDecimal": "2"},
            "isPaid": true,
            "payments": [
                {"_id": "p1", "screen_shot": "https://cdn/p1.png"},
                {"_id": "p2", "screen_shot": "https://cdn/p2.png"}
            ]
        }))
        .unwrap();

        let row = customer_row(11, &customer);
        assert!(row.starts_with("11 "));
        assert!(row.contains("Asha"));
        assert!(row.contains("₹1000.00"));
        assert!(row.contains("₹10.50/₹8.00/₹2.00"));
        assert!(row.contains("Paid"));
        assert!(row.trim_end().ends_with('2'));
    }

    #[test]
    fn test_render_pages() {
        assert_eq!(render_pages(1, 1), "[1]");
        assert_eq!(render_pages(5, 10), "3 4 [5] 6 7");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Asha", 20), "Asha");
        assert_eq!(truncate("Ashalata Raghunathan", 10), "Ashalat...");
    }

    #[test]
    fn test_read_upload_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let upload = read_upload(&path).unwrap();
        assert_eq!(upload.file_name, "proof.png");
        assert_eq!(upload.content_type.as_deref(), Some("image/png"));
        assert_eq!(&upload.bytes[..], b"\x89PNG");

        assert!(read_upload(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(true, None, "x").is_ok());
        let err = ensure_success(false, Some("Invalid OTP".into()), "x").unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP");
        let err = ensure_success(false, None, "Login failed").unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }
}
