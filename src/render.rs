//! Terminal rendering of the dashboard view

use rust_decimal::Decimal;
use std::fmt::Write;

use crate::dashboard::{DashboardView, Resource, ViewPhase};
use crate::models::{Budget, Category, Transaction, User};

/// Format an amount as currency with two decimals, e.g. `-$12.50`
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Full dashboard: header, totals, categories, transactions, errors
pub fn render_dashboard(user: Option<&User>, view: &DashboardView) -> String {
    let mut out = String::new();

    let greeting = user
        .map(|u| format!("Welcome, {}!", u.display_name()))
        .unwrap_or_else(|| "Not logged in".to_string());
    let _ = writeln!(out, "Budget Dashboard  |  {}", greeting);

    match view.phase {
        ViewPhase::Unauthenticated => {
            let _ = writeln!(out, "\nLog in to see your budget.");
            return out;
        }
        ViewPhase::Loading => {
            let _ = writeln!(out, "(refreshing...)");
        }
        ViewPhase::Ready => {}
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total Income:    {:>14}", format_money(view.summary.income));
    let _ = writeln!(out, "Total Expenses:  {:>14}", format_money(view.summary.expenses));
    let _ = writeln!(out, "Balance:         {:>14}", format_money(view.summary.balance));

    let _ = writeln!(out);
    out.push_str(&render_categories(&view.categories));
    let _ = writeln!(out);
    out.push_str(&render_transactions(&view.transactions));

    if view.has_errors() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Errors:");
        for resource in Resource::ALL {
            if let Some(message) = view.errors.get(&resource) {
                let _ = writeln!(out, "  {}: {}", resource, message);
            }
        }
    }

    if let Some(at) = view.last_refreshed {
        let _ = writeln!(out);
        let _ = writeln!(out, "Last refreshed {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    out
}

pub fn render_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Categories ({})", categories.len());

    if categories.is_empty() {
        let _ = writeln!(out, "  No categories yet.");
        return out;
    }

    let _ = writeln!(out, "  {:>5}  {:<24}  {:<8}  {:>6}", "ID", "Name", "Type", "Txns");
    for category in categories {
        let _ = writeln!(
            out,
            "  {:>5}  {:<24}  {:<8}  {:>6}",
            category.id,
            truncate(&category.name, 24),
            category.category_type,
            category.transaction_count
        );
    }
    out
}

pub fn render_transactions(transactions: &[Transaction]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Transactions ({})", transactions.len());

    if transactions.is_empty() {
        let _ = writeln!(out, "  No transactions yet.");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:>5}  {:<10}  {:<18}  {:<24}  {:>12}",
        "ID", "Date", "Category", "Description", "Amount"
    );
    for txn in transactions {
        let category = txn.category_name.as_deref().unwrap_or("Uncategorized");
        let description = txn.description.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "  {:>5}  {:<10}  {:<18}  {:<24}  {:>12}",
            txn.id,
            txn.date.format("%Y-%m-%d"),
            truncate(category, 18),
            truncate(description, 24),
            format_money(txn.signed_amount())
        );
    }
    out
}

pub fn render_budgets(budgets: &[Budget]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Budgets ({})", budgets.len());

    if budgets.is_empty() {
        let _ = writeln!(out, "  No budgets yet.");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:>5}  {:<18}  {:<8}  {:>12}  {:>12}  {:>12}  {:<23}",
        "ID", "Category", "Period", "Limit", "Spent", "Remaining", "Window"
    );
    for budget in budgets {
        let marker = if budget.is_over_budget() { " !" } else { "" };
        let _ = writeln!(
            out,
            "  {:>5}  {:<18}  {:<8}  {:>12}  {:>12}  {:>12}  {} - {}{}",
            budget.id,
            truncate(budget.category_name.as_deref().unwrap_or("-"), 18),
            budget.period,
            format_money(budget.amount),
            format_money(budget.spent),
            format_money(budget.remaining),
            budget.start_date.format("%Y-%m-%d"),
            budget.end_date.format("%Y-%m-%d"),
            marker
        );
    }
    out
}
