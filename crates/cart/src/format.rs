//! Display formatting for amounts and dates, matching the storefront's en-IN locale.

use chrono::NaiveDate;

use crate::money::Money;

/// Formats an amount as Indian rupees, e.g. `₹1,23,456.78`.
///
/// Uses Indian digit grouping: the last three digits, then groups of two.
/// Always renders two decimals.
pub fn format_inr(amount: Money) -> String {
    let paise = amount.paise();
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    format!("{sign}₹{}.{:02}", group_indian(abs / 100), abs % 100)
}

/// Formats a date the way the storefront shows delivery estimates, e.g. `21 October 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
