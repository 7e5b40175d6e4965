//! Account classifier (C3): an ordered table of anchored regex patterns
//! mapping account numbers to their semantic [`AccountType`].

use regex::Regex;
use std::sync::OnceLock;

use crate::models::AccountType;

struct Rule {
    account_type: AccountType,
    pattern: &'static str,
}

/// Ordered so that more specific prefixes (`tva_deductible`, `tva_collectee`)
/// are tried before the broader `charges`/`ventes` buckets they would
/// otherwise fall into — a future narrower pattern can always be inserted
/// ahead of a broader one without touching the matching code.
const TABLE: &[Rule] = &[
    Rule { account_type: AccountType::Banque, pattern: r"^512\d*" },
    Rule { account_type: AccountType::Clients, pattern: r"^411\d*" },
    Rule { account_type: AccountType::Fournisseurs, pattern: r"^401\d*" },
    Rule { account_type: AccountType::TvaDeductible, pattern: r"^445661\d*" },
    Rule { account_type: AccountType::TvaCollectee, pattern: r"^445711\d*" },
    Rule { account_type: AccountType::Ventes, pattern: r"^70\d*" },
    Rule { account_type: AccountType::Achats, pattern: r"^60\d*" },
    Rule { account_type: AccountType::Charges, pattern: r"^6\d*" },
    Rule { account_type: AccountType::Immobilisations, pattern: r"^2\d*" },
    Rule { account_type: AccountType::Stocks, pattern: r"^3\d*" },
    Rule { account_type: AccountType::Capitaux, pattern: r"^1\d*" },
];

fn compiled() -> &'static [(AccountType, Regex)] {
    static COMPILED: OnceLock<Vec<(AccountType, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        TABLE
            .iter()
            .map(|rule| (rule.account_type, Regex::new(rule.pattern).expect("static pattern is valid")))
            .collect()
    })
}

/// Classify an account number by the first matching rule; falls back to
/// [`AccountType::Autres`] when nothing matches.
pub fn classify_account(account: &str) -> AccountType {
    compiled()
        .iter()
        .find(|(_, re)| re.is_match(account))
        .map(|(t, _)| *t)
        .unwrap_or(AccountType::Autres)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_bank_account() {
        assert_eq!(classify_account("512200"), AccountType::Banque);
    }

    #[test]
    fn classifies_vat_deductible_ahead_of_charges() {
        assert_eq!(classify_account("445661000"), AccountType::TvaDeductible);
    }

    #[test]
    fn classifies_vat_collected_ahead_of_sales() {
        assert_eq!(classify_account("445711000"), AccountType::TvaCollectee);
    }

    #[test]
    fn classifies_generic_expense() {
        assert_eq!(classify_account("611000"), AccountType::Charges);
    }

    #[test]
    fn classifies_purchases_ahead_of_charges() {
        assert_eq!(classify_account("601000"), AccountType::Achats);
    }

    #[test]
    fn unknown_prefix_falls_back_to_autres() {
        assert_eq!(classify_account("999"), AccountType::Autres);
    }

    #[test]
    fn classification_is_total_over_all_variants() {
        for account in ["512100", "411000", "401000", "445661000", "445711000", "701000", "601000", "611000", "211000", "311000", "101000", "999999"] {
            // Every retained entry gets exactly one type — classify_account never panics
            // and always returns a single AccountType variant.
            let _ = classify_account(account);
        }
    }
}
