use expense_manager::config::{self, AppConfig};
use expense_manager::db::store::{Snapshot, SqliteStore, Store};
use expense_manager::models::budget::Budget;
use expense_manager::models::category;
use expense_manager::models::period::Period;
use expense_manager::models::transaction::{Transaction, TransactionType};
use expense_manager::operations::add::{add_transaction_to_store, INPUT_FORMAT};
use expense_manager::operations::aggregate::{self, CategoryOrder};
use expense_manager::operations::budget::{self, add_budget_to_store, remove_budget_from_store};
use expense_manager::operations::dashboard::{self, build_dashboard, format_percent};
use expense_manager::operations::export::{self, format_amount, ExportOptions};
use expense_manager::operations::filter::{self, FilterCriteria};
use expense_manager::operations::remove::remove_transaction_from_store;
use expense_manager::Result;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tracing::{error, info, warn};

pub enum UserCommands {
    Add,
    Remove,
    List,
    Month,
    Category,
    Text,
    Search,
    Summary,
    Budget,
    Export,
    Dashboard,
    Help,
    Exit,
    Unknown,
}

/// Local view of the owner's data, replaced wholesale whenever the store
/// publishes a new snapshot.
struct Session {
    config: AppConfig,
    transactions: Snapshot<Transaction>,
    budgets: Snapshot<Budget>,
    transaction_feed: Receiver<Snapshot<Transaction>>,
    budget_feed: Receiver<Snapshot<Budget>>,
    criteria: FilterCriteria,
}

impl Session {
    fn refresh(&mut self) {
        if let Some(snapshot) = self.transaction_feed.try_iter().last() {
            self.transactions = snapshot;
        }
        if let Some(snapshot) = self.budget_feed.try_iter().last() {
            self.budgets = snapshot;
        }
    }

    fn filtered(&self) -> Vec<&Transaction> {
        filter::filter(&self.transactions, &self.criteria)
    }

    fn symbol(&self) -> &str {
        &self.config.currency_symbol
    }
}

fn main() {
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: AppConfig) -> Result<()> {
    println!("Welcome to the expense manager!");
    let mut store = SqliteStore::open(&config.database_path)?;
    let owner = config.owner.clone();
    info!(owner = %owner, "session started");

    let mut session = Session {
        transaction_feed: store.subscribe_transactions(&owner)?,
        budget_feed: store.subscribe_budgets(&owner)?,
        transactions: Vec::new(),
        budgets: Vec::new(),
        criteria: FilterCriteria::new().with_month(Period::current()),
        config,
    };

    loop {
        session.refresh();
        println!(
            "Please enter a command (add, remove, list, month, category, text, search, summary, budget, export, dashboard, help, exit):"
        );

        let input = match read_user_input() {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (input.as_str(), ""),
        };
        if command.is_empty() {
            continue;
        }

        match check_for_command(command) {
            UserCommands::Add => {
                println!("Please enter transaction details in the format:\n{}", INPUT_FORMAT);
                println!(
                    "Suggested categories - expense: {} | income: {}",
                    category::suggestions(TransactionType::Expense).join(", "),
                    category::suggestions(TransactionType::Income).join(", ")
                );
                let details = match read_user_input() {
                    Ok(details) => details,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match add_transaction_to_store(&mut store, &owner, &details) {
                    Ok(tx) => println!("Transaction {} added successfully!", tx.id),
                    Err(e) => {
                        warn!("rejected transaction: {}", e);
                        println!("Error adding transaction: {}", e);
                        println!("Please try again.");
                    }
                }
            }
            UserCommands::Remove => {
                let id = if argument.is_empty() {
                    println!("Provide the transaction ID to remove:");
                    match read_user_input() {
                        Ok(id) => id,
                        Err(e) => {
                            println!("Error reading input: {}", e);
                            continue;
                        }
                    }
                } else {
                    argument.to_string()
                };
                match remove_transaction_from_store(&mut store, &owner, &id) {
                    Ok(_) => println!("Transaction removed successfully."),
                    Err(e) => println!("Error: {}", e),
                }
            }
            UserCommands::List => print_transactions(&session, &session.filtered()),
            UserCommands::Month => match session.criteria.clone().with_month_str(argument) {
                Ok(criteria) => {
                    session.criteria = criteria;
                    println!("Showing {}", dashboard::describe_criteria(&session.criteria));
                }
                Err(e) => println!("Error: {}", e),
            },
            UserCommands::Category => {
                session.criteria.category = clear_or_set(argument);
                println!("Showing {}", dashboard::describe_criteria(&session.criteria));
            }
            UserCommands::Text => {
                session.criteria.search_text = clear_or_set(argument);
                println!("Showing {}", dashboard::describe_criteria(&session.criteria));
            }
            UserCommands::Search => {
                let results = filter::search(&session.transactions, argument);
                if results.is_empty() {
                    println!("No transactions found for: {}", argument);
                } else {
                    print_transactions(&session, &results);
                }
            }
            UserCommands::Summary => print_summary(&session),
            UserCommands::Budget => handle_budget(&mut store, &mut session, &owner, argument),
            UserCommands::Export => {
                let path = if argument.is_empty() {
                    PathBuf::from(export::export_file_name(session.criteria.month))
                } else {
                    PathBuf::from(argument)
                };
                let options = ExportOptions::from(&session.config);
                match export::write_csv(&path, session.filtered(), &options) {
                    Ok(rows) => {
                        info!(path = %path.display(), rows, "exported transactions");
                        println!("Exported {} transactions to {}", rows, path.display());
                    }
                    Err(e) => println!("Error exporting transactions: {}", e),
                }
            }
            UserCommands::Dashboard => {
                let data = build_dashboard(
                    &session.transactions,
                    &session.criteria,
                    &session.budgets,
                    &session.config,
                );
                if let Err(e) = dashboard::run_dashboard(&data) {
                    println!("Error showing dashboard: {}", e);
                }
            }
            UserCommands::Help => print_help(&session),
            UserCommands::Exit => {
                println!("Exiting the application.");
                break;
            }
            UserCommands::Unknown => println!("No valid command found. Type 'help' for the list."),
        }
    }
    Ok(())
}

fn handle_budget(store: &mut SqliteStore, session: &mut Session, owner: &str, argument: &str) {
    let (action, rest) = match argument.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim()),
        None => (argument, ""),
    };

    match action {
        "add" => {
            println!("Please enter budget details in the format:\ncategory, limit");
            let details = match read_user_input() {
                Ok(details) => details,
                Err(e) => {
                    println!("Error reading input: {}", e);
                    return;
                }
            };
            match add_budget_to_store(store, owner, &details) {
                Ok(budget) => println!("Budget {} for {} added.", budget.id, budget.category),
                Err(e) => println!("Error adding budget: {}", e),
            }
        }
        "remove" => match remove_budget_from_store(store, owner, rest) {
            Ok(_) => println!("Budget removed successfully."),
            Err(e) => println!("Error: {}", e),
        },
        "" | "list" => {
            session.refresh();
            print_budgets(session);
        }
        _ => println!("Usage: budget [list | add | remove <id>]"),
    }
}

fn clear_or_set(argument: &str) -> Option<String> {
    if argument.is_empty() || argument.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(argument.to_string())
    }
}

fn print_transactions(session: &Session, transactions: &[&Transaction]) {
    if transactions.is_empty() {
        println!("No transactions match {}", dashboard::describe_criteria(&session.criteria));
        return;
    }
    for tx in transactions {
        let sign = match tx.transaction_type {
            TransactionType::Income => "+",
            TransactionType::Expense => "-",
        };
        println!(
            "{}  {:8} {:15} {}{:>14}  {}  [{}]",
            tx.date.format("%Y-%m-%d"),
            tx.transaction_type,
            tx.category,
            sign,
            format_amount(session.symbol(), tx.amount),
            tx.description_or_empty(),
            tx.id
        );
    }
}

fn print_summary(session: &Session) {
    let filtered = session.filtered();
    let totals = aggregate::totals(filtered.iter().copied());
    let symbol = session.symbol();

    println!("Summary for {}", dashboard::describe_criteria(&session.criteria));
    println!("  Income:   {}", format_amount(symbol, totals.income));
    println!("  Expenses: {}", format_amount(symbol, totals.expense));
    println!(
        "  Balance:  {} ({})",
        format_amount(symbol, totals.balance),
        dashboard::balance_label(&totals)
    );

    let categories = aggregate::by_category(
        filtered.iter().copied(),
        TransactionType::Expense,
        CategoryOrder::TotalDescending,
    );
    for c in &categories {
        println!("    {:15} {}", c.category, format_amount(symbol, c.total));
    }

    match aggregate::top_category(&session.transactions) {
        Some(top) => println!("  Top category: {} ({})", top.category, format_amount(symbol, top.total)),
        None => println!("  Top category: -"),
    }
    println!(
        "  Average per category: {} over {} categories",
        format_amount(symbol, aggregate::average_per_category(&session.transactions)),
        aggregate::expense_category_count(&session.transactions)
    );
    print_budgets(session);
}

fn print_budgets(session: &Session) {
    if session.budgets.is_empty() {
        println!("No budgets set.");
        return;
    }
    let statuses = budget::evaluate_all(
        &session.budgets,
        &session.transactions,
        session.config.budget_warning_percent,
    );
    let symbol = session.symbol();
    for status in statuses {
        let mut line = format!(
            "  {:15} {} / {}  {}  [{}]",
            status.category,
            format_amount(symbol, status.spent),
            format_amount(symbol, status.limit),
            format_percent(status.percentage),
            status.budget_id
        );
        if status.over_budget {
            line.push_str(&format!("  limit exceeded by {}", format_amount(symbol, status.overage)));
        }
        println!("{}", line);
    }
}

fn print_help(session: &Session) {
    println!("Commands:");
    println!("  add                      record a transaction");
    println!("  remove [id]              delete a transaction");
    println!("  list                     show transactions matching the filters");
    println!("  month <YYYY-MM|all>      filter by month");
    println!("  category <name|all>      filter by category");
    println!("  text <text|all>          filter by description or category text");
    println!("  search <text>            quick search over all transactions");
    println!("  summary                  totals, categories and budgets");
    println!("  budget [list|add|remove <id>]");
    println!("  export [path]            write the filtered transactions as CSV");
    println!("  dashboard                open the terminal dashboard");
    println!("  exit");

    let months: Vec<String> = filter::available_months(&session.transactions)
        .iter()
        .map(|m| m.to_string())
        .collect();
    if !months.is_empty() {
        println!("Months with data: {}", months.join(", "));
    }
    let categories = filter::expense_categories(&session.transactions);
    if !categories.is_empty() {
        println!("Expense categories: {}", categories.join(", "));
    }
}

fn read_user_input() -> std::result::Result<String, String> {
    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    if bytes == 0 {
        // stdin closed
        return Ok("exit".to_string());
    }
    Ok(input.trim().to_string())
}

fn check_for_command(input: &str) -> UserCommands {
    match input.to_lowercase().as_str() {
        "add" => UserCommands::Add,
        "remove" => UserCommands::Remove,
        "list" | "print" => UserCommands::List,
        "month" => UserCommands::Month,
        "category" => UserCommands::Category,
        "text" => UserCommands::Text,
        "search" => UserCommands::Search,
        "summary" => UserCommands::Summary,
        "budget" => UserCommands::Budget,
        "export" => UserCommands::Export,
        "dashboard" => UserCommands::Dashboard,
        "help" => UserCommands::Help,
        "exit" | "quit" => UserCommands::Exit,
        _ => UserCommands::Unknown,
    }
}
