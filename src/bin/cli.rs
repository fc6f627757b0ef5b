//! The command line interface for spendlog.

use std::{fs::File, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use spendlog::{
    Error,
    aggregation::{category_breakdown, compare_to_budget, compute_kpis},
    backup::{backup, restore},
    csv::{export_csv, import_csv},
    models::{Category, CategoryName, Month, Recurrence, Transaction, format_cents, parse_amount},
    recurring::post_due,
    stores::{
        BudgetStore, CategoryDeleteMode, CategoryStore, RecurringStore, SortOrder,
        TransactionKind, TransactionQuery, TransactionStore,
        sqlite::{SqlAppState, create_app_state},
    },
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A personal finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "spendlog.db")]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and seed the default categories.
    Init,
    /// Record a transaction.
    Add {
        /// The amount, e.g. "-50" or "2000.00". Negative amounts are
        /// expenses.
        amount: String,
        /// The category name.
        category: String,
        /// The transaction date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// A free-form note.
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List transactions, optionally filtered.
    List {
        /// Include transactions dated on or after this date (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Include transactions dated on or before this date (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
        /// Include only transactions in this category.
        #[arg(long)]
        category: Option<String>,
        /// Include only income or only expenses.
        #[arg(long)]
        kind: Option<KindArg>,
        /// Include only transactions of at least this absolute amount.
        #[arg(long)]
        min: Option<String>,
        /// Include only transactions of at most this absolute amount.
        #[arg(long)]
        max: Option<String>,
        /// Include only transactions whose note contains this text.
        #[arg(long)]
        search: Option<String>,
        /// Sort newest first instead of oldest first.
        #[arg(long)]
        desc: bool,
        /// Show at most this many transactions.
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Change fields of an existing transaction.
    Edit {
        /// The id of the transaction to edit.
        id: i64,
        /// A new date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
        /// A new amount.
        #[arg(long)]
        amount: Option<String>,
        /// A new category name.
        #[arg(long)]
        category: Option<String>,
        /// A new note.
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a transaction.
    Remove {
        /// The id of the transaction to delete.
        id: i64,
    },
    /// Manage categories.
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Manage monthly budgets.
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
    /// Manage recurring transaction templates.
    Recurring {
        #[command(subcommand)]
        command: RecurringCommand,
    },
    /// Post transactions for every recurring template that is due.
    PostDue {
        /// Treat this date (YYYY-MM-DD) as today.
        #[arg(long)]
        today: Option<String>,
    },
    /// Show income, expense and net totals.
    Kpis {
        /// Limit the summary to one month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,
    },
    /// Show totals per category.
    Breakdown {
        /// Limit the breakdown to one month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,
    },
    /// Compare actual spend against each budget for a month.
    BudgetReport {
        /// The month to report on (YYYY-MM).
        month: String,
    },
    /// Export transactions to a CSV file.
    Export {
        /// The file to write.
        path: PathBuf,
        /// Export only transactions dated on or after this date.
        #[arg(long)]
        from: Option<String>,
        /// Export only transactions dated on or before this date.
        #[arg(long)]
        to: Option<String>,
    },
    /// Import transactions from a CSV file.
    Import {
        /// The file to read.
        path: PathBuf,
    },
    /// Copy the database file to a backup location.
    Backup {
        /// The file to write the backup to.
        dest: PathBuf,
    },
    /// Overwrite the database file with a backup.
    Restore {
        /// The backup file to restore from.
        src: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Create a category.
    Add {
        /// The category name.
        name: String,
        /// An optional grouping label, e.g. "Essentials".
        #[arg(long)]
        group: Option<String>,
    },
    /// List all categories.
    List,
    /// Delete a category.
    Remove {
        /// The name of the category to delete.
        name: String,
        /// Also delete the transactions, budgets and recurring templates
        /// that reference the category.
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Set the budget for a category and month, overwriting any existing
    /// amount.
    Set {
        /// The category name.
        category: String,
        /// The month the budget applies to (YYYY-MM).
        month: String,
        /// The target spend, e.g. "300.00".
        amount: String,
    },
    /// List budgets.
    List {
        /// Show only the budgets for one month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum RecurringCommand {
    /// Create a recurring transaction template.
    Add {
        /// The amount posted each period.
        amount: String,
        /// The category name.
        category: String,
        /// How often the template posts.
        #[arg(long)]
        recurrence: RecurrenceArg,
        /// The first due date (YYYY-MM-DD).
        #[arg(long)]
        next_due: String,
        /// A free-form note.
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List all recurring templates.
    List,
    /// Delete a recurring template.
    Remove {
        /// The id of the template to delete.
        id: i64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RecurrenceArg {
    Weekly,
    Monthly,
}

impl From<RecurrenceArg> for Recurrence {
    fn from(value: RecurrenceArg) -> Self {
        match value {
            RecurrenceArg::Weekly => Recurrence::Weekly,
            RecurrenceArg::Monthly => Recurrence::Monthly,
        }
    }
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn run(args: Args) -> Result<(), Error> {
    // Backup and restore copy the database file, so they run before a
    // connection is opened.
    match &args.command {
        Command::Backup { dest } => {
            backup(&args.db_path, dest)?;
            println!("backed up {} to {}", args.db_path.display(), dest.display());
            return Ok(());
        }
        Command::Restore { src } => {
            restore(src, &args.db_path)?;
            println!("restored {} from {}", args.db_path.display(), src.display());
            return Ok(());
        }
        _ => {}
    }

    let connection = Connection::open(&args.db_path)?;
    let mut state = create_app_state(connection)?;

    match args.command {
        Command::Init => {
            // Initialization happened while opening; report the result.
            let categories = state.category_store.get_all()?;
            println!(
                "initialized {} with {} categories",
                args.db_path.display(),
                categories.len()
            );
        }
        Command::Add {
            amount,
            category,
            date,
            note,
        } => {
            let category = resolve_category(&state, &category)?;
            let date = match date {
                Some(text) => parse_date(&text)?,
                None => OffsetDateTime::now_utc().date(),
            };

            let transaction = state.transaction_store.create(
                Transaction::build(parse_amount(&amount)?, category.id())
                    .date(date)
                    .note(&note),
            )?;

            println!("added transaction {}", transaction.id());
        }
        Command::List {
            from,
            to,
            category,
            kind,
            min,
            max,
            search,
            desc,
            limit,
        } => {
            let category_id = category
                .map(|name| resolve_category(&state, &name).map(|category| category.id()))
                .transpose()?;

            let query = TransactionQuery {
                date_range: parse_date_range(from.as_deref(), to.as_deref())?,
                category_id,
                kind: kind.map(Into::into),
                min_amount: min.as_deref().map(parse_amount).transpose()?,
                max_amount: max.as_deref().map(parse_amount).transpose()?,
                note_contains: search,
                sort_date: Some(if desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                }),
                limit,
                offset: 0,
            };

            let transactions = state.transaction_store.get_query(query)?;
            let categories = state.category_store.get_all()?;

            for transaction in &transactions {
                println!(
                    "{}\t{}\t{:>12}\t{}\t{}",
                    transaction.id(),
                    transaction.date(),
                    format_cents(transaction.amount()),
                    category_name(&categories, transaction.category_id()),
                    transaction.note()
                );
            }
        }
        Command::Edit {
            id,
            date,
            amount,
            category,
            note,
        } => {
            let mut transaction = state.transaction_store.get(id)?;

            if let Some(text) = date {
                transaction = transaction.with_date(parse_date(&text)?);
            }
            if let Some(text) = amount {
                transaction = transaction.with_amount(parse_amount(&text)?);
            }
            if let Some(name) = category {
                transaction = transaction.with_category(resolve_category(&state, &name)?.id());
            }
            if let Some(note) = note {
                transaction = transaction.with_note(&note);
            }

            state.transaction_store.update(&transaction)?;
            println!("updated transaction {id}");
        }
        Command::Remove { id } => {
            state.transaction_store.delete(id)?;
            println!("removed transaction {id}");
        }
        Command::Category { command } => run_category(&mut state, command)?,
        Command::Budget { command } => run_budget(&mut state, command)?,
        Command::Recurring { command } => run_recurring(&mut state, command)?,
        Command::PostDue { today } => {
            let today = match today {
                Some(text) => parse_date(&text)?,
                None => OffsetDateTime::now_utc().date(),
            };

            let posted = post_due(&mut state, today)?;

            println!("posted {} transaction(s)", posted.len());
            for transaction in &posted {
                println!(
                    "{}\t{}\t{:>12}\t{}",
                    transaction.id(),
                    transaction.date(),
                    format_cents(transaction.amount()),
                    transaction.note()
                );
            }
        }
        Command::Kpis { month } => {
            let transactions = state
                .transaction_store
                .get_query(month_query(month.as_deref())?)?;
            let kpis = compute_kpis(&transactions);

            println!("income:  {:>12}", format_cents(kpis.total_income));
            println!("expense: {:>12}", format_cents(kpis.total_expense));
            println!("net:     {:>12}", format_cents(kpis.net));
            println!("count:   {:>12}", kpis.count);
        }
        Command::Breakdown { month } => {
            let transactions = state
                .transaction_store
                .get_query(month_query(month.as_deref())?)?;
            let categories = state.category_store.get_all()?;

            let breakdown = category_breakdown(&transactions);
            let mut rows: Vec<_> = breakdown.into_iter().collect();
            rows.sort_by_key(|&(_, total)| total);

            for (id, total) in rows {
                println!("{}\t{:>12}", category_name(&categories, id), format_cents(total));
            }
        }
        Command::BudgetReport { month } => {
            let month = Month::parse(&month)?;
            let budgets = state.budget_store.get_for_month(month)?;
            let transactions = state
                .transaction_store
                .get_query(TransactionQuery::for_dates(
                    month.first_day()..=month.last_day(),
                ))?;
            let categories = state.category_store.get_all()?;

            for comparison in compare_to_budget(&budgets, &transactions) {
                let status = if comparison.variance > 0 { "OVER" } else { "ok" };
                println!(
                    "{}\ttarget {:>12}\tactual {:>12}\t{}",
                    category_name(&categories, comparison.category_id),
                    format_cents(comparison.target),
                    format_cents(comparison.actual),
                    status
                );
            }
        }
        Command::Export { path, from, to } => {
            let query = TransactionQuery {
                date_range: parse_date_range(from.as_deref(), to.as_deref())?,
                sort_date: Some(SortOrder::Ascending),
                ..Default::default()
            };
            let transactions = state.transaction_store.get_query(query)?;
            let categories = state.category_store.get_all()?;

            export_csv(&transactions, &categories, File::create(&path)?)?;
            println!("exported {} transaction(s) to {}", transactions.len(), path.display());
        }
        Command::Import { path } => {
            let summary = import_csv(File::open(&path)?, &mut state)?;

            println!("imported {} transaction(s)", summary.imported.len());
            for row in &summary.rejected {
                eprintln!("line {}: {}", row.line, row.reason);
            }
            if !summary.rejected.is_empty() {
                return Err(Error::InvalidCsv(format!(
                    "{} row(s) were rejected",
                    summary.rejected.len()
                )));
            }
        }
        // Handled before the database was opened.
        Command::Backup { .. } | Command::Restore { .. } => {}
    }

    Ok(())
}

fn run_category(state: &mut SqlAppState, command: CategoryCommand) -> Result<(), Error> {
    match command {
        CategoryCommand::Add { name, group } => {
            let category = state.category_store.create(CategoryName::new(&name)?, group)?;
            println!("added category {} ({})", category.name(), category.id());
        }
        CategoryCommand::List => {
            for category in state.category_store.get_all()? {
                match category.group() {
                    Some(group) => println!("{}\t{}", category.name(), group),
                    None => println!("{}", category.name()),
                }
            }
        }
        CategoryCommand::Remove { name, cascade } => {
            let category = resolve_category(state, &name)?;
            let mode = if cascade {
                CategoryDeleteMode::Cascade
            } else {
                CategoryDeleteMode::Block
            };

            state.category_store.delete(category.id(), mode)?;
            println!("removed category {name}");
        }
    }

    Ok(())
}

fn run_budget(state: &mut SqlAppState, command: BudgetCommand) -> Result<(), Error> {
    match command {
        BudgetCommand::Set {
            category,
            month,
            amount,
        } => {
            let category = resolve_category(state, &category)?;
            let budget = state.budget_store.upsert(
                category.id(),
                Month::parse(&month)?,
                parse_amount(&amount)?,
            )?;

            println!(
                "budget for {} in {} set to {}",
                category.name(),
                budget.month(),
                format_cents(budget.amount())
            );
        }
        BudgetCommand::List { month } => {
            let budgets = match month {
                Some(text) => state.budget_store.get_for_month(Month::parse(&text)?)?,
                None => state.budget_store.get_all()?,
            };
            let categories = state.category_store.get_all()?;

            for budget in &budgets {
                println!(
                    "{}\t{}\t{:>12}",
                    budget.month(),
                    category_name(&categories, budget.category_id()),
                    format_cents(budget.amount())
                );
            }
        }
    }

    Ok(())
}

fn run_recurring(state: &mut SqlAppState, command: RecurringCommand) -> Result<(), Error> {
    match command {
        RecurringCommand::Add {
            amount,
            category,
            recurrence,
            next_due,
            note,
        } => {
            let category = resolve_category(state, &category)?;
            let template = state.recurring_store.create(
                category.id(),
                parse_amount(&amount)?,
                &note,
                recurrence.into(),
                parse_date(&next_due)?,
            )?;

            println!("added recurring template {}", template.id());
        }
        RecurringCommand::List => {
            let categories = state.category_store.get_all()?;

            for template in state.recurring_store.get_all()? {
                println!(
                    "{}\t{}\t{:>12}\t{}\tnext due {}\t{}",
                    template.id(),
                    template.recurrence().as_str(),
                    format_cents(template.amount()),
                    category_name(&categories, template.category_id()),
                    template.next_due(),
                    template.note()
                );
            }
        }
        RecurringCommand::Remove { id } => {
            state.recurring_store.delete(id)?;
            println!("removed recurring template {id}");
        }
    }

    Ok(())
}

fn resolve_category(state: &SqlAppState, name: &str) -> Result<Category, Error> {
    state.category_store.get_by_name(&CategoryName::new(name)?)
}

fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_string()))
}

fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<std::ops::RangeInclusive<Date>>, Error> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }

    let from = match from {
        Some(text) => parse_date(text)?,
        None => Date::MIN,
    };
    let to = match to {
        Some(text) => parse_date(text)?,
        None => Date::MAX,
    };

    Ok(Some(from..=to))
}

fn month_query(month: Option<&str>) -> Result<TransactionQuery, Error> {
    match month {
        Some(text) => {
            let month = Month::parse(text)?;

            Ok(TransactionQuery::for_dates(
                month.first_day()..=month.last_day(),
            ))
        }
        None => Ok(TransactionQuery::default()),
    }
}

fn category_name(categories: &[Category], id: i64) -> String {
    categories
        .iter()
        .find(|category| category.id() == id)
        .map(|category| category.name().to_string())
        .unwrap_or_else(|| format!("category {id}"))
}
