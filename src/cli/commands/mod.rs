pub mod call;
pub mod profile;
pub mod purchase;
pub mod stats;
pub mod system;

use chrono::NaiveDate;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;
use crate::domain::{Category, PurchaseDraft};

/// Category names as typed at the prompt; any spelling of a label parses.
pub(crate) const CATEGORY_CHOICES: &[&str] = &[
    "fast-food",
    "groceries",
    "dining",
    "electronics",
    "clothing",
    "entertainment",
    "health",
    "home",
    "transport",
    "travel",
    "subscriptions",
    "other",
];

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(profile::definitions())
        .chain(purchase::definitions())
        .chain(call::definitions())
        .chain(stats::definitions())
    {
        registry.register(entry);
    }
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned = input.trim().trim_start_matches('$').replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn require_arg<'a>(
    args: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

/// Parses `<item> <amount> [category] [--returnable] [--return-by DATE]
/// [--why TEXT] [--feeling TEXT]`.
pub(crate) fn parse_purchase(args: &[&str], usage: &str) -> Result<PurchaseDraft, CommandError> {
    let item = require_arg(args, 0, usage)?;
    let amount = parse_amount(require_arg(args, 1, usage)?)?;
    let mut rest = args.iter().skip(2).copied().peekable();

    let category = match rest.peek() {
        Some(token) if !token.starts_with("--") => {
            let raw = *token;
            rest.next();
            raw.parse::<Category>()?
        }
        _ => Category::DEFAULT,
    };
    let mut draft = PurchaseDraft::new(item, amount, category);

    while let Some(flag) = rest.next() {
        match flag {
            "--returnable" | "-r" => draft.is_returnable = true,
            "--return-by" => {
                let value = rest.next().ok_or_else(|| {
                    CommandError::InvalidArguments("--return-by needs a date".into())
                })?;
                draft = draft.returnable(Some(parse_date(value)?));
            }
            "--why" => {
                let value = rest.next().ok_or_else(|| {
                    CommandError::InvalidArguments("--why needs a justification".into())
                })?;
                draft = draft.with_justification(value);
            }
            "--feeling" => {
                let value = rest.next().ok_or_else(|| {
                    CommandError::InvalidArguments("--feeling needs a description".into())
                })?;
                draft = draft.with_emotional_context(value);
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{}`; usage: {}",
                    other, usage
                )))
            }
        }
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGE: &str = "log <item> <amount>";

    #[test]
    fn purchase_flags_are_applied() {
        let draft = parse_purchase(
            &[
                "Jacket",
                "$1,200.50",
                "clothing",
                "--return-by",
                "2024-12-01",
                "--why",
                "winter",
            ],
            USAGE,
        )
        .unwrap();
        assert_eq!(draft.amount, 1200.5);
        assert_eq!(draft.category, Category::Clothing);
        assert!(draft.is_returnable);
        assert_eq!(draft.return_by, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(draft.justification.as_deref(), Some("winter"));
    }

    #[test]
    fn category_defaults_when_only_flags_follow() {
        let draft = parse_purchase(&["Mug", "12", "--returnable"], USAGE).unwrap();
        assert_eq!(draft.category, Category::Other);
        assert!(draft.is_returnable);
    }

    #[test]
    fn missing_amount_reports_usage() {
        let err = parse_purchase(&["Mug"], USAGE).unwrap_err();
        assert!(err.to_string().contains("usage"));
    }

    #[test]
    fn every_category_choice_parses() {
        let parsed: Vec<Category> = CATEGORY_CHOICES
            .iter()
            .map(|choice| choice.parse().unwrap())
            .collect();
        assert_eq!(parsed, Category::ALL.to_vec());
    }
}
