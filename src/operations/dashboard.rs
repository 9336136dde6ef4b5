use crate::config::{AppConfig, Theme};
use crate::error::{AppError, Result};
use crate::models::budget::Budget;
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::aggregate::{self, CategoryOrder, CategoryTotal, DailyTotal, Totals, TrendPoint};
use crate::operations::budget::{self, BudgetLevel, BudgetStatus};
use crate::operations::export::format_amount;
use crate::operations::filter::{self, FilterCriteria};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io;

pub const TREND_DAYS: usize = 7;
const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    /// Percentage of the period's total expense.
    pub share: Decimal,
}

/// Everything the dashboard shows, computed up front so rendering is a
/// pure layout step.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub title: String,
    pub currency_symbol: String,
    pub theme: Theme,
    pub totals: Totals,
    pub categories: Vec<CategoryShare>,
    pub daily: Vec<DailyTotal>,
    pub top_category: Option<CategoryTotal>,
    pub average_per_category: Decimal,
    pub category_count: usize,
    pub trend: Vec<TrendPoint>,
    pub budgets: Vec<BudgetStatus>,
}

/// Summary cards and charts follow the active filters. Analytics and
/// budgets look at the whole snapshot.
pub fn build_dashboard(
    transactions: &[Transaction],
    criteria: &FilterCriteria,
    budgets: &[Budget],
    config: &AppConfig,
) -> DashboardData {
    let filtered = filter::filter(transactions, criteria);
    let totals = aggregate::totals(filtered.iter().copied());

    let categories = aggregate::by_category(
        filtered.iter().copied(),
        TransactionType::Expense,
        CategoryOrder::TotalDescending,
    )
    .into_iter()
    .map(|c| CategoryShare {
        share: share_of(c.total, totals.expense),
        category: c.category,
        total: c.total,
    })
    .collect();

    DashboardData {
        title: describe_criteria(criteria),
        currency_symbol: config.currency_symbol.clone(),
        theme: config.theme,
        totals,
        categories,
        daily: aggregate::by_day(filtered.iter().copied()),
        top_category: aggregate::top_category(transactions),
        average_per_category: aggregate::average_per_category(transactions),
        category_count: aggregate::expense_category_count(transactions),
        trend: aggregate::recent_expense_trend(transactions, TREND_DAYS),
        budgets: budget::evaluate_all(budgets, transactions, config.budget_warning_percent),
    }
}

pub fn describe_criteria(criteria: &FilterCriteria) -> String {
    let mut parts = vec![match criteria.month {
        Some(month) => month.to_string(),
        None => "all months".to_string(),
    }];
    if let Some(category) = criteria.category.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("category {}", category));
    }
    if let Some(text) = criteria.search_text.as_deref().filter(|t| !t.is_empty()) {
        parts.push(format!("matching \"{}\"", text));
    }
    parts.join(" | ")
}

fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ONE_HUNDRED)
}

pub fn format_percent(value: Decimal) -> String {
    format!(
        "{}%",
        value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn balance_label(totals: &Totals) -> &'static str {
    if totals.balance >= Decimal::ZERO {
        "surplus"
    } else {
        "deficit"
    }
}

pub fn progress_bar(percentage: Decimal, width: usize) -> String {
    let clamped = percentage.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED);
    let filled = (clamped * Decimal::from(width) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let filled = filled.to_usize().unwrap_or(0).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    income: Color,
    expense: Color,
    warning: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            text: Color::Black,
            background: Color::White,
            accent: Color::Blue,
            muted: Color::DarkGray,
            income: Color::Green,
            expense: Color::Red,
            warning: Color::Yellow,
        },
        Theme::Dark => Palette {
            text: Color::White,
            background: Color::Black,
            accent: Color::Cyan,
            muted: Color::Gray,
            income: Color::LightGreen,
            expense: Color::LightRed,
            warning: Color::LightYellow,
        },
    }
}

pub fn run_dashboard(data: &DashboardData) -> Result<()> {
    enable_raw_mode().map_err(|e| terminal_error("enable raw mode", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| terminal_error("enter alternate screen", e))?;

    let result = (|| -> Result<()> {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal =
            ratatui::Terminal::new(backend).map_err(|e| terminal_error("initialize terminal", e))?;

        loop {
            terminal
                .draw(|frame| render(frame, data))
                .map_err(|e| terminal_error("draw terminal UI", e))?;

            if event::poll(std::time::Duration::from_millis(250))
                .map_err(|e| terminal_error("poll input", e))?
            {
                match event::read().map_err(|e| terminal_error("read input", e))? {
                    Event::Key(key) if key.kind == KeyEventKind::Release => {}
                    Event::Key(key) if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) => break,
                    _ => {}
                }
            }
        }
        Ok(())
    })();

    // Both restore steps always run; the first error wins.
    let raw_mode = disable_raw_mode().map_err(|e| terminal_error("disable raw mode", e));
    let mut stdout = io::stdout();
    let screen = execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| terminal_error("leave alternate screen", e));

    finish_session(result, raw_mode, screen)
}

fn finish_session(loop_result: Result<()>, raw_mode: Result<()>, screen: Result<()>) -> Result<()> {
    if let Err(e) = &raw_mode {
        tracing::warn!(error = %e, "terminal restore failed");
    }
    if let Err(e) = &screen {
        tracing::warn!(error = %e, "terminal restore failed");
    }
    loop_result.and(raw_mode).and(screen)
}

fn terminal_error(action: &str, err: io::Error) -> AppError {
    AppError::Terminal(format!("Failed to {}: {}", action, err))
}

fn render(frame: &mut ratatui::Frame, data: &DashboardData) {
    let colors = palette(data.theme);
    let base = Style::default().fg(colors.text).bg(colors.background);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Min(6),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Expense Manager",
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(data.title.clone()),
        Span::styled("  (press q to exit)", Style::default().fg(colors.muted)),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .style(base);
    frame.render_widget(header, rows[0]);

    render_cards(frame, rows[1], data, &colors, base);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    render_categories(frame, middle[0], data, &colors, base);
    render_daily(frame, middle[1], data, &colors, base);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[3]);
    render_analytics(frame, bottom[0], data, &colors, base);
    render_budgets(frame, bottom[1], data, &colors, base);
}

fn render_cards(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData, colors: &Palette, base: Style) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let balance_color = if data.totals.balance >= Decimal::ZERO {
        colors.accent
    } else {
        colors.expense
    };
    let entries = [
        ("Income", data.totals.income, colors.income, "money in this period"),
        ("Expenses", data.totals.expense, colors.expense, "money out this period"),
        ("Balance", data.totals.balance, balance_color, balance_label(&data.totals)),
    ];

    for ((title, amount, color, caption), area) in entries.into_iter().zip(cards.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                format_amount(&data.currency_symbol, amount),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(caption, Style::default().fg(colors.muted))),
        ];
        let card = Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(base);
        frame.render_widget(card, *area);
    }
}

fn render_categories(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData, colors: &Palette, base: Style) {
    let block = Block::default().title("Expenses by Category").borders(Borders::ALL);

    if data.categories.is_empty() {
        let empty = Paragraph::new("No expenses in this period")
            .alignment(Alignment::Center)
            .block(block)
            .style(base);
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = data
        .categories
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::raw(format!("{:15.15} ", c.category)),
                Span::styled(progress_bar(c.share, BAR_WIDTH), Style::default().fg(colors.expense)),
                Span::raw(format!(
                    " {:>14} {:>5}",
                    format_amount(&data.currency_symbol, c.total),
                    format_percent(c.share)
                )),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block).style(base), area);
}

fn render_daily(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData, colors: &Palette, base: Style) {
    let block = Block::default().title("Daily Trend").borders(Borders::ALL);

    // Newest days first so the most recent activity stays visible.
    let lines: Vec<Line> = data
        .daily
        .iter()
        .rev()
        .map(|day| {
            Line::from(vec![
                Span::raw(format!("{}  ", day.date.format("%Y-%m-%d"))),
                Span::styled(
                    format!("+{:>13}", format_amount(&data.currency_symbol, day.income)),
                    Style::default().fg(colors.income),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("-{:>13}", format_amount(&data.currency_symbol, day.expense)),
                    Style::default().fg(colors.expense),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block).style(base), area);
}

fn render_analytics(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData, colors: &Palette, base: Style) {
    let block = Block::default().title("Analytics").borders(Borders::ALL);

    let top = match &data.top_category {
        Some(top) => format!("{} ({})", top.category, format_amount(&data.currency_symbol, top.total)),
        None => "-".to_string(),
    };
    let mut lines = vec![
        Line::from(format!("Top category: {}", top)),
        Line::from(format!(
            "Average per category: {}",
            format_amount(&data.currency_symbol, data.average_per_category)
        )),
        Line::from(format!("Categories: {}", data.category_count)),
        Line::from(""),
        Line::from(Span::styled(
            format!("Last {} days of spending", TREND_DAYS),
            Style::default().fg(colors.muted),
        )),
    ];
    lines.extend(data.trend.iter().map(|point| {
        Line::from(format!(
            "{}  {}",
            point.date.format("%m-%d"),
            format_amount(&data.currency_symbol, point.amount)
        ))
    }));

    frame.render_widget(Paragraph::new(lines).block(block).style(base), area);
}

fn render_budgets(frame: &mut ratatui::Frame, area: Rect, data: &DashboardData, colors: &Palette, base: Style) {
    let block = Block::default().title("Budgets").borders(Borders::ALL);

    if data.budgets.is_empty() {
        let empty = Paragraph::new("No budgets set")
            .alignment(Alignment::Center)
            .block(block)
            .style(base);
        frame.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::new();
    for status in &data.budgets {
        let color = match status.level {
            BudgetLevel::OnTrack => colors.income,
            BudgetLevel::Warning => colors.warning,
            BudgetLevel::OverBudget => colors.expense,
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{:12.12} ", status.category)),
            Span::styled(progress_bar(status.percentage, BAR_WIDTH), Style::default().fg(color)),
            Span::raw(format!(
                " {} / {} ",
                format_amount(&data.currency_symbol, status.spent),
                format_amount(&data.currency_symbol, status.limit)
            )),
            Span::styled(format_percent(status.percentage), Style::default().fg(color)),
        ]));
        if status.over_budget {
            lines.push(Line::from(Span::styled(
                format!(
                    "  limit exceeded by {}",
                    format_amount(&data.currency_symbol, status.overage)
                ),
                Style::default().fg(colors.expense),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block).style(base), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn create_test_transaction(kind: TransactionType, category: &str, amount: &str, date: &str) -> Transaction {
        Transaction {
            id: format!("{}-{}", category, date),
            owner_id: "owner".to_string(),
            transaction_type: kind,
            category: category.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            description: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot() -> Vec<Transaction> {
        vec![
            create_test_transaction(TransactionType::Expense, "Food", "30", "2024-01-05"),
            create_test_transaction(TransactionType::Income, "Salary", "1000", "2024-01-01"),
            create_test_transaction(TransactionType::Expense, "Food", "20", "2024-01-06"),
            create_test_transaction(TransactionType::Expense, "Bills", "150", "2023-12-20"),
        ]
    }

    fn food_budget() -> Budget {
        Budget {
            id: "b1".to_string(),
            owner_id: "owner".to_string(),
            category: "Food".to_string(),
            limit: Decimal::from(40),
        }
    }

    #[test]
    fn test_build_dashboard_for_month() {
        let criteria = FilterCriteria::new().with_month_str("2024-01").unwrap();
        let data = build_dashboard(&snapshot(), &criteria, &[food_budget()], &AppConfig::default());

        assert_eq!(data.title, "2024-01");
        assert_eq!(data.totals.income, dec("1000"));
        assert_eq!(data.totals.expense, dec("50"));
        assert_eq!(data.totals.balance, dec("950"));
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.categories[0].share, dec("100"));
        assert_eq!(data.daily.len(), 3);
    }

    #[test]
    fn test_analytics_and_budgets_ignore_filters() {
        let criteria = FilterCriteria::new().with_month_str("2024-01").unwrap();
        let data = build_dashboard(&snapshot(), &criteria, &[food_budget()], &AppConfig::default());

        let top = data.top_category.unwrap();
        assert_eq!(top.category, "Bills");
        assert_eq!(top.total, dec("150"));
        assert_eq!(data.category_count, 2);
        assert_eq!(data.average_per_category, dec("100"));
        assert_eq!(data.trend.len(), 3);

        assert_eq!(data.budgets.len(), 1);
        assert_eq!(data.budgets[0].spent, dec("50"));
        assert!(data.budgets[0].over_budget);
    }

    #[test]
    fn test_build_dashboard_empty_snapshot() {
        let data = build_dashboard(&[], &FilterCriteria::new(), &[], &AppConfig::default());
        assert_eq!(data.totals, Totals::default());
        assert!(data.categories.is_empty());
        assert!(data.daily.is_empty());
        assert_eq!(data.top_category, None);
        assert_eq!(data.average_per_category, Decimal::ZERO);
        assert_eq!(data.title, "all months");
    }

    #[test]
    fn test_category_shares() {
        let data = build_dashboard(&snapshot(), &FilterCriteria::new(), &[], &AppConfig::default());
        let shares: Vec<(&str, String)> = data
            .categories
            .iter()
            .map(|c| (c.category.as_str(), format_percent(c.share)))
            .collect();
        assert_eq!(shares, vec![("Bills", "75%".to_string()), ("Food", "25%".to_string())]);
    }

    #[test]
    fn test_describe_criteria() {
        let criteria = FilterCriteria::new()
            .with_month_str("2024-02")
            .unwrap()
            .with_category("Food")
            .with_search_text("pizza");
        assert_eq!(describe_criteria(&criteria), "2024-02 | category Food | matching \"pizza\"");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(Decimal::ZERO, 4), "░░░░");
        assert_eq!(progress_bar(dec("50"), 4), "██░░");
        assert_eq!(progress_bar(dec("100"), 4), "████");
        assert_eq!(progress_bar(dec("250"), 4), "████");
        assert_eq!(progress_bar(dec("-10"), 4), "░░░░");
    }

    #[test]
    fn test_balance_label() {
        let mut totals = Totals::default();
        assert_eq!(balance_label(&totals), "surplus");
        totals.balance = dec("-0.01");
        assert_eq!(balance_label(&totals), "deficit");
    }

    #[test]
    fn test_finish_session_prefers_loop_error() {
        let loop_err = || Err(AppError::Terminal("draw".to_string()));
        let restore_err = || Err(AppError::Terminal("restore".to_string()));

        assert!(finish_session(Ok(()), Ok(()), Ok(())).is_ok());
        assert!(matches!(
            finish_session(loop_err(), restore_err(), restore_err()),
            Err(AppError::Terminal(msg)) if msg == "draw"
        ));
        assert!(matches!(
            finish_session(Ok(()), restore_err(), Ok(())),
            Err(AppError::Terminal(msg)) if msg == "restore"
        ));
        assert!(matches!(
            finish_session(Ok(()), Ok(()), restore_err()),
            Err(AppError::Terminal(msg)) if msg == "restore"
        ));
    }

    #[test]
    fn test_share_of_handles_degenerate_inputs() {
        assert_eq!(share_of(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(share_of(Decimal::MAX, Decimal::new(1, 28)), Decimal::ONE_HUNDRED);
        assert_eq!(share_of(Decimal::from(25), Decimal::from(100)), Decimal::from(25));
    }

    #[test]
    fn test_format_percent_rounds() {
        assert_eq!(format_percent(dec("62.5")), "63%");
        assert_eq!(format_percent(dec("33.3333")), "33%");
        assert_eq!(format_percent(dec("100")), "100%");
    }
}
