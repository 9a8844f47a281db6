use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fundwatch::cli::{
    handle_ad_command, handle_alloc_command, handle_archive_command, handle_audit_command,
    handle_budget_command, handle_export_command, handle_pr_command, handle_pre_command,
    handle_realign_command, handle_report_command, handle_savings_command, AdCommands,
    AllocCommands, ArchiveCommands, AuditCommands, BudgetCommands, ExportCommands, PrCommands,
    PreCommands, RealignCommands, ReportCommands, SavingsCommands,
};
use fundwatch::config::{paths::FundwatchPaths, settings::Settings};
use fundwatch::storage::Storage;

#[derive(Parser)]
#[command(
    name = "fundwatch",
    version,
    about = "Terminal-based campus budget monitoring",
    long_about = "fundwatch tracks fiscal-year budgets, department allocations, \
                  PRE planning documents, purchase requests, activity designs, \
                  and budget realignments through a shared approval workflow, \
                  with full audit trails and fund deduction on approval."
)]
struct Cli {
    /// Who is performing this action (recorded in audit entries)
    #[arg(long, global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Approved budget management
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Department allocation management
    #[command(subcommand)]
    Alloc(AllocCommands),

    /// PRE (Program of Receipts and Expenditures) management
    #[command(subcommand)]
    Pre(PreCommands),

    /// Purchase request management
    #[command(subcommand)]
    Pr(PrCommands),

    /// Activity design management
    #[command(subcommand)]
    Ad(AdCommands),

    /// Budget realignment between PRE line items
    #[command(subcommand)]
    Realign(RealignCommands),

    /// Archive and restore operations
    #[command(subcommand)]
    Archive(ArchiveCommands),

    /// Savings snapshots
    #[command(subcommand)]
    Savings(SavingsCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export reports and records
    #[command(subcommand)]
    Export(ExportCommands),

    /// Audit log
    #[command(subcommand)]
    Audit(AuditCommands),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = FundwatchPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let actor = settings.resolve_actor(cli.actor.as_deref());

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing fundwatch at: {}", paths.base_dir().display());
            fundwatch::storage::init::initialize_storage(&paths)?;
            let mut settings = settings;
            settings.setup_completed = true;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Start by recording a budget:");
            println!("  fundwatch budget add \"General Appropriations\" 2025 5,000,000");
            println!("then carve department allocations:");
            println!("  fundwatch alloc add 2025 \"College of Engineering\" 1,200,000");
        }
        Some(Commands::Config) => {
            println!("fundwatch Configuration");
            println!("=======================");
            println!("Config directory: {}", paths.config_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:         {}", settings.currency_symbol);
            println!(
                "  Low balance threshold:   {}%",
                settings.low_balance_threshold_percent
            );
            println!("  Default actor:           {}", actor);
        }
        Some(Commands::Budget(cmd)) => handle_budget_command(&storage, &actor, cmd)?,
        Some(Commands::Alloc(cmd)) => handle_alloc_command(&storage, &actor, cmd)?,
        Some(Commands::Pre(cmd)) => handle_pre_command(&storage, &actor, cmd)?,
        Some(Commands::Pr(cmd)) => handle_pr_command(&storage, &actor, cmd)?,
        Some(Commands::Ad(cmd)) => handle_ad_command(&storage, &actor, cmd)?,
        Some(Commands::Realign(cmd)) => handle_realign_command(&storage, &actor, cmd)?,
        Some(Commands::Archive(cmd)) => handle_archive_command(&storage, &actor, cmd)?,
        Some(Commands::Savings(cmd)) => handle_savings_command(&storage, &actor, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, &settings, cmd)?,
        Some(Commands::Audit(cmd)) => handle_audit_command(&storage, cmd)?,
        None => {
            println!("fundwatch - Terminal-based campus budget monitoring");
            println!();
            println!("Run 'fundwatch --help' for usage information.");
            println!("Run 'fundwatch init' to set up a fresh data directory.");
        }
    }

    Ok(())
}
