//! `zoom`, the command-line front end for the Zoom property manager.
//!
//! # Usage
//!
//! ```
//! zoom login --role admin zoom4404
//! zoom tenants add --name "John Doe" --username tenant1 --building "Building A" --apartment 101
//! zoom complaints list
//! zoom --config ~/.config/zoom/config.toml dashboard
//! ```
//!
//! The identity from `zoom login` is kept in a session file until
//! `zoom logout`; every other command refreshes from the server first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use zoom_cli::{
  ApiClient, ApiConfig, ReconcilePolicy, StateCache, password::generate_password,
};
use zoom_core::{
  Role,
  auth::Identity,
  complaint::ComplaintStatus,
  staff::{NewStaff, StaffPatch, StaffRole},
  tenant::{NewTenant, TenantPatch},
};

const DEFAULT_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION: &str = "~/.config/zoom/session.json";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "zoom", about = "Command-line front end for the Zoom property manager")]
struct Args {
  /// Path to a TOML config file (url, session_file, policy).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the zoom server (default: http://localhost:5000).
  #[arg(long, env = "ZOOM_URL")]
  url: Option<String>,

  /// Where the logged-in identity is kept between invocations.
  #[arg(long, env = "ZOOM_SESSION", value_name = "FILE")]
  session: Option<PathBuf>,

  /// How the local snapshot catches up after a change
  /// (confirmed-patch or full-refresh).
  #[arg(long)]
  policy: Option<ReconcilePolicy>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Log in and remember the identity.
  Login {
    username: String,
    #[arg(long, default_value = "tenant")]
    role:     Role,
    /// Read from stdin when omitted.
    #[arg(long, env = "ZOOM_PASSWORD")]
    password: Option<String>,
  },
  /// Forget the remembered identity.
  Logout,
  /// Show the logged-in identity.
  Whoami,
  /// Summary figures for the logged-in role.
  Dashboard,
  #[command(subcommand)]
  Tenants(TenantCommand),
  #[command(subcommand)]
  Staff(StaffCommand),
  #[command(subcommand)]
  Complaints(ComplaintCommand),
}

#[derive(Subcommand, Debug)]
enum TenantCommand {
  List {
    /// Fuzzy filter over name, username, building and apartment.
    #[arg(long)]
    filter: Option<String>,
  },
  Add {
    #[arg(long)]
    name:      String,
    #[arg(long)]
    username:  String,
    #[arg(long)]
    building:  String,
    #[arg(long)]
    apartment: String,
    #[arg(long)]
    email:     Option<String>,
    /// Generated when omitted.
    #[arg(long)]
    password:  Option<String>,
  },
  Edit {
    id:        Uuid,
    #[arg(long)]
    name:      Option<String>,
    #[arg(long)]
    username:  Option<String>,
    #[arg(long)]
    building:  Option<String>,
    #[arg(long)]
    apartment: Option<String>,
    /// An empty value clears the address.
    #[arg(long)]
    email:     Option<String>,
  },
  Remove {
    id: Uuid,
  },
  ResetPassword {
    id:       Uuid,
    /// Generated when omitted.
    #[arg(long)]
    password: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum StaffCommand {
  List,
  Add {
    #[arg(long)]
    name:     String,
    #[arg(long)]
    role:     StaffRole,
    #[arg(long)]
    building: String,
    #[arg(long)]
    salary:   f64,
  },
  Edit {
    id:       Uuid,
    #[arg(long)]
    name:     Option<String>,
    #[arg(long)]
    role:     Option<StaffRole>,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    salary:   Option<f64>,
  },
  Remove {
    id: Uuid,
  },
  /// Flip the paid flag for the current period.
  TogglePaid {
    id: Uuid,
  },
}

#[derive(Subcommand, Debug)]
enum ComplaintCommand {
  List,
  /// File a complaint as the logged-in tenant.
  File {
    #[arg(long = "type")]
    kind:        String,
    #[arg(long)]
    description: String,
  },
  /// Set a complaint's status (pending, inprogress, resolved).
  Status {
    id:     Uuid,
    status: ComplaintStatus,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  url:          Option<String>,
  session_file: Option<PathBuf>,
  policy:       Option<ReconcilePolicy>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or(file_cfg.url)
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let session_path = expand_home(
    &args
      .session
      .or(file_cfg.session_file)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION)),
  );
  let policy = args.policy.or(file_cfg.policy).unwrap_or_default();

  let client = ApiClient::new(ApiConfig::new(base_url))?;
  let cache = StateCache::new(client, policy);

  match args.command {
    Command::Login { username, role, password } => {
      let password = match password {
        Some(p) => p,
        None => read_password()?,
      };
      if cache.login(&username, &password, role).await.is_err() {
        let message = cache.take_login_error().await.unwrap_or_default();
        bail!(message);
      }
      let identity = cache.identity().await.context("login left no identity")?;
      save_session(&session_path, &identity)?;
      println!("Welcome, {}", identity.display_name());
      Ok(())
    }
    Command::Logout => {
      cache.logout().await;
      if session_path.exists() {
        std::fs::remove_file(&session_path)
          .with_context(|| format!("removing {}", session_path.display()))?;
      }
      println!("Logged out");
      Ok(())
    }
    command => {
      let identity = load_session(&session_path)?
        .context("not logged in; run `zoom login` first")?;
      cache.restore(identity).await;
      cache.refresh().await.context("loading data from the server")?;
      run(&cache, command).await
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run(cache: &StateCache<ApiClient>, command: Command) -> Result<()> {
  let identity = cache.identity().await.context("not logged in")?;

  match command {
    // Handled in `main` before a session is required.
    Command::Login { .. } | Command::Logout => {}
    Command::Whoami => print_identity(&identity),
    Command::Dashboard => dashboard(cache, &identity).await,
    Command::Tenants(cmd) => tenants(cache, cmd).await?,
    Command::Staff(cmd) => staff(cache, cmd).await?,
    Command::Complaints(cmd) => complaints(cache, &identity, cmd).await?,
  }
  Ok(())
}

async fn tenants(cache: &StateCache<ApiClient>, cmd: TenantCommand) -> Result<()> {
  match cmd {
    TenantCommand::List { filter } => {
      let snap = cache.snapshot().await;
      for t in snap.search_tenants(filter.as_deref().unwrap_or_default()) {
        println!(
          "{}  {:<20} {:<12} {:<14} {:<6} {}",
          t.id,
          t.name,
          t.username,
          t.building,
          t.apartment,
          t.email.as_deref().unwrap_or("-"),
        );
      }
    }
    TenantCommand::Add { name, username, building, apartment, email, password } => {
      let generated = password.is_none();
      let password = password.unwrap_or_else(generate_password);
      let t = cache
        .create_tenant(NewTenant { name, username, password, building, apartment, email })
        .await?;
      println!("Created tenant {} ({})", t.username, t.id);
      if generated {
        println!("Password: {}", t.password);
      }
    }
    TenantCommand::Edit { id, name, username, building, apartment, email } => {
      let patch = TenantPatch { name, username, password: None, building, apartment, email };
      let t = cache.update_tenant(id, patch).await?;
      println!("Updated tenant {}", t.username);
    }
    TenantCommand::Remove { id } => {
      cache.delete_tenant(id).await?;
      println!("Tenant deleted");
    }
    TenantCommand::ResetPassword { id, password } => {
      let password = password.unwrap_or_else(generate_password);
      let t = cache.reset_tenant_password(id, &password).await?;
      println!("New password for {}: {}", t.username, t.password);
    }
  }
  Ok(())
}

async fn staff(cache: &StateCache<ApiClient>, cmd: StaffCommand) -> Result<()> {
  match cmd {
    StaffCommand::List => {
      let snap = cache.snapshot().await;
      for s in &snap.staff {
        println!(
          "{}  {:<20} {:<8} {:<14} {:>10.2} {}",
          s.id,
          s.name,
          s.role,
          s.building,
          s.salary,
          if s.paid { "paid" } else { "unpaid" },
        );
      }
    }
    StaffCommand::Add { name, role, building, salary } => {
      let s = cache
        .create_staff(NewStaff { name, role, building, salary, paid: false })
        .await?;
      println!("Created staff {} ({})", s.name, s.id);
    }
    StaffCommand::Edit { id, name, role, building, salary } => {
      let patch = StaffPatch { name, role, building, salary, paid: None };
      let s = cache.update_staff(id, patch).await?;
      println!("Updated staff {}", s.name);
    }
    StaffCommand::Remove { id } => {
      cache.delete_staff(id).await?;
      println!("Staff deleted");
    }
    StaffCommand::TogglePaid { id } => {
      let s = cache.toggle_salary_payment(id).await?;
      println!("{} is now {}", s.name, if s.paid { "paid" } else { "unpaid" });
    }
  }
  Ok(())
}

async fn complaints(
  cache: &StateCache<ApiClient>,
  identity: &Identity,
  cmd: ComplaintCommand,
) -> Result<()> {
  match cmd {
    ComplaintCommand::List => {
      let snap = cache.snapshot().await;
      for c in snap.visible_complaints(identity) {
        println!(
          "{}  {}  {:<10} {:<12} {:<20} {}",
          c.id,
          c.date,
          c.status,
          c.kind,
          snap.tenant_name(c.tenant_id),
          c.description,
        );
      }
    }
    ComplaintCommand::File { kind, description } => {
      let c = cache.file_complaint(&kind, &description).await?;
      println!("Filed complaint {} on {}", c.id, c.date);
    }
    ComplaintCommand::Status { id, status } => {
      let c = cache.set_complaint_status(id, status).await?;
      println!("Complaint {} is now {}", c.id, c.status);
    }
  }
  Ok(())
}

fn print_identity(identity: &Identity) {
  match identity {
    Identity::Admin(a) => println!("{} (admin)", a.username),
    Identity::Tenant(t) => println!(
      "{} ({}, tenant) {} apt {}",
      t.name, t.username, t.building, t.apartment
    ),
  }
}

async fn dashboard(cache: &StateCache<ApiClient>, identity: &Identity) {
  let snap = cache.snapshot().await;
  println!("Welcome back, {}  ({})", identity.display_name(), chrono::Local::now().date_naive());
  match identity.tenant_id() {
    None => {
      let stats = snap.stats();
      println!("Total tenants:      {}", stats.total_tenants);
      println!("Total staff:        {}", stats.total_staff);
      println!("Active complaints:  {}", stats.pending_complaints);
      println!("Pending payroll:    ${:.2}", stats.unpaid_salary);
    }
    Some(id) => {
      print_identity(identity);
      println!("Pending requests:   {}", snap.pending_for(id));
      println!("Total requests:     {}", snap.complaints_for(id).len());
    }
  }
}

// ─── Session file ─────────────────────────────────────────────────────────────

fn load_session(path: &Path) -> Result<Option<Identity>> {
  if !path.exists() {
    return Ok(None);
  }
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading session file {}", path.display()))?;
  let identity = serde_json::from_str(&raw).context("parsing session file")?;
  Ok(Some(identity))
}

/// Persist `identity`, without the tenant's password.
fn save_session(path: &Path, identity: &Identity) -> Result<()> {
  let mut identity = identity.clone();
  if let Identity::Tenant(t) = &mut identity {
    t.password.clear();
  }
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let json = serde_json::to_vec_pretty(&identity)?;
  std::fs::write(path, json)
    .with_context(|| format!("writing session file {}", path.display()))
}

/// Prompt for a password on stdin.
fn read_password() -> Result<String> {
  use std::io::Write as _;
  eprint!("Password: ");
  std::io::stderr().flush().ok();
  password_line(std::io::stdin().lock())
}

/// One line of `input` with only its line ending removed; other trailing
/// whitespace belongs to the password.
fn password_line(mut input: impl std::io::BufRead) -> Result<String> {
  let mut line = String::new();
  input.read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Resolve a leading `~` against `$HOME`.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
