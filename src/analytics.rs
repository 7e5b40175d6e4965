//! Ledger analytics (C4): aggregates, movements, ratios, date analysis and
//! anomaly signals computed over an in-memory canonical entry list.

use std::collections::BTreeMap;

use crate::classifier::classify_account;
use crate::config::AnomalyConfig;
use crate::models::{
    AccountDetail, AccountType, Anomaly, BalanceByType, DateAnalysis, LedgerEntry, LedgerSnapshot,
    Movements, Ratios,
};

const SIGNIFICANT_THRESHOLD: f64 = 10_000.0;
const SIGNIFICANT_LABEL_CAP: usize = 50;
const SIGNIFICANT_ENTRY_CAP: usize = 10;
const MOST_ACTIVE_CAP: usize = 10;
const ANOMALY_CAP: usize = 20;

/// Compute the full ledger characteristics snapshot (C4) for a normalized
/// entry list. `source_file` and `processed_at` are caller-supplied so the
/// snapshot stays reproducible (this module performs no wall-clock reads).
/// `config`'s `alert_on_duplicate_transactions` flag gates the duplicate
/// anomaly signal.
pub fn compute_snapshot(
    entries: &[LedgerEntry],
    source_file: Option<String>,
    processed_at: Option<String>,
    config: &AnomalyConfig,
) -> LedgerSnapshot {
    let entry_count = entries.len();
    let total_debit: f64 = entries.iter().map(|e| e.debit).sum();
    let total_credit: f64 = entries.iter().map(|e| e.credit).sum();
    let balance = total_debit - total_credit;

    let accounts_by_type = group_by_type(entries);
    let balances_by_type = balances_by_type(&accounts_by_type);
    let movements = movements(entries);
    let ratios = ratios(&balances_by_type);
    let date_analysis = date_analysis(entries);
    let anomalies = anomalies(entries, config);
    let account_details = account_details(entries);

    LedgerSnapshot {
        entry_count,
        total_debit,
        total_credit,
        balance,
        accounts_by_type,
        balances_by_type,
        movements,
        ratios,
        date_analysis,
        anomalies,
        account_details,
        source_file,
        processed_at,
        error: None,
    }
}

/// The zero snapshot used for empty input and input-shape error states.
pub fn empty_snapshot(error: Option<String>) -> LedgerSnapshot {
    LedgerSnapshot {
        error,
        ..Default::default()
    }
}

fn group_by_type(entries: &[LedgerEntry]) -> BTreeMap<String, Vec<LedgerEntry>> {
    let mut map: BTreeMap<String, Vec<LedgerEntry>> = BTreeMap::new();
    for entry in entries {
        let account_type = classify_account(&entry.account);
        map.entry(account_type.key().to_string()).or_default().push(entry.clone());
    }
    map
}

fn balances_by_type(accounts_by_type: &BTreeMap<String, Vec<LedgerEntry>>) -> BTreeMap<String, BalanceByType> {
    accounts_by_type
        .iter()
        .map(|(k, entries)| {
            let total_debit: f64 = entries.iter().map(|e| e.debit).sum();
            let total_credit: f64 = entries.iter().map(|e| e.credit).sum();
            (
                k.clone(),
                BalanceByType {
                    total_debit,
                    total_credit,
                    balance: total_debit - total_credit,
                    entry_count: entries.len(),
                },
            )
        })
        .collect()
}

fn movements(entries: &[LedgerEntry]) -> Movements {
    let debits: Vec<f64> = entries.iter().map(|e| e.debit).filter(|v| *v > 0.0).collect();
    let credits: Vec<f64> = entries.iter().map(|e| e.credit).filter(|v| *v > 0.0).collect();

    let largest_debit = debits.iter().cloned().fold(0.0, f64::max);
    let largest_credit = credits.iter().cloned().fold(0.0, f64::max);
    let mean_debit = if debits.is_empty() { 0.0 } else { debits.iter().sum::<f64>() / debits.len() as f64 };
    let mean_credit = if credits.is_empty() { 0.0 } else { credits.iter().sum::<f64>() / credits.len() as f64 };

    let mut significant_entries: Vec<LedgerEntry> = entries
        .iter()
        .filter(|e| e.net().abs() > SIGNIFICANT_THRESHOLD)
        .map(|e| {
            let mut e = e.clone();
            // chars().take() keeps the cut on a char boundary; labels are
            // free-text French and byte-index truncation can land mid-character.
            if e.label.chars().count() > SIGNIFICANT_LABEL_CAP {
                e.label = e.label.chars().take(SIGNIFICANT_LABEL_CAP).collect();
            }
            e
        })
        .collect();
    significant_entries.truncate(SIGNIFICANT_ENTRY_CAP);

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.account.clone()).or_insert(0) += 1;
    }
    let mut most_active_accounts: Vec<(String, usize)> = counts.into_iter().collect();
    most_active_accounts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    most_active_accounts.truncate(MOST_ACTIVE_CAP);

    Movements {
        largest_debit,
        largest_credit,
        mean_debit,
        mean_credit,
        significant_entries,
        most_active_accounts,
    }
}

fn type_balance(balances_by_type: &BTreeMap<String, BalanceByType>, account_type: AccountType) -> f64 {
    balances_by_type.get(account_type.key()).map(|b| b.balance).unwrap_or(0.0)
}

fn ratios(balances_by_type: &BTreeMap<String, BalanceByType>) -> Ratios {
    let bank = type_balance(balances_by_type, AccountType::Banque);
    let suppliers = type_balance(balances_by_type, AccountType::Fournisseurs);
    let equity = type_balance(balances_by_type, AccountType::Capitaux);
    let stocks = type_balance(balances_by_type, AccountType::Stocks);
    let purchases = type_balance(balances_by_type, AccountType::Achats);
    let total_debit: f64 = balances_by_type.values().map(|b| b.total_debit).sum();
    let total_credit: f64 = balances_by_type.values().map(|b| b.total_credit).sum();

    Ratios {
        balance_ratio: non_zero(total_debit).map(|d| total_credit / d),
        liquidity_ratio: non_zero(suppliers.abs()).map(|s| bank / s),
        debt_ratio: non_zero(equity).map(|e| bank / e),
        stock_rotation_ratio: non_zero(stocks).map(|s| purchases / s),
    }
}

fn non_zero(v: f64) -> Option<f64> {
    if v == 0.0 {
        None
    } else {
        Some(v)
    }
}

fn date_analysis(entries: &[LedgerEntry]) -> DateAnalysis {
    let mut dated: Vec<&str> = entries.iter().map(|e| e.date.as_str()).filter(|d| !d.is_empty()).collect();
    dated.sort_unstable();
    let entries_without_date = entries.len() - dated.len();

    let period_start = dated.first().map(|s| s.to_string());
    let period_end = dated.last().map(|s| s.to_string());
    let duration_days = match (&period_start, &period_end) {
        (Some(start), Some(end)) => {
            let start = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d").ok();
            let end = chrono::NaiveDate::parse_from_str(end, "%Y-%m-%d").ok();
            match (start, end) {
                (Some(s), Some(e)) => Some((e - s).num_days()),
                _ => None,
            }
        }
        _ => None,
    };

    let mut monthly_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for date in &dated {
        if date.len() >= 7 {
            *monthly_distribution.entry(date[0..7].to_string()).or_insert(0) += 1;
        }
    }

    DateAnalysis {
        period_start,
        period_end,
        duration_days,
        monthly_distribution,
        entries_without_date,
    }
}

fn percentile_95(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let rank = (0.95 * (values.len() - 1) as f64).round() as usize;
    Some(values[rank.min(values.len() - 1)])
}

fn anomalies(entries: &[LedgerEntry], config: &AnomalyConfig) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    // Duplicates: identical (account, date, net), one anomaly per occurrence
    // beyond the first. Gated by the duplicate-transactions feature flag.
    if config.alert_on_duplicate_transactions {
        let mut seen: BTreeMap<(String, String, String), usize> = BTreeMap::new();
        for entry in entries {
            let key = (entry.account.clone(), entry.date.clone(), format!("{:.2}", entry.net()));
            let count = seen.entry(key).or_insert(0);
            *count += 1;
            if *count > 1 {
                anomalies.push(Anomaly {
                    kind: "duplicate".to_string(),
                    description: format!(
                        "Duplicate entry on account {} dated {} for {:.2}",
                        entry.account, entry.date, entry.net()
                    ),
                    account: Some(entry.account.clone()),
                    date: Some(entry.date.clone()),
                    net: Some(entry.net()),
                });
                if anomalies.len() >= ANOMALY_CAP {
                    return anomalies;
                }
            }
        }
    }

    // Large amounts: |net| above the 95th percentile of nonzero |net|.
    let nonzero_abs: Vec<f64> = entries.iter().map(|e| e.net().abs()).filter(|v| *v > 0.0).collect();
    if let Some(p95) = percentile_95(nonzero_abs) {
        for entry in entries {
            if entry.net().abs() > p95 {
                anomalies.push(Anomaly {
                    kind: "large_amount".to_string(),
                    description: format!(
                        "Amount {:.2} on account {} exceeds the 95th percentile ({:.2})",
                        entry.net(),
                        entry.account,
                        p95
                    ),
                    account: Some(entry.account.clone()),
                    date: Some(entry.date.clone()),
                    net: Some(entry.net()),
                });
                if anomalies.len() >= ANOMALY_CAP {
                    return anomalies;
                }
            }
        }
    }

    // Unusual accounts: no classifier pattern matches.
    for entry in entries {
        if classify_account(&entry.account) == AccountType::Autres {
            anomalies.push(Anomaly {
                kind: "unusual_account".to_string(),
                description: format!("Account {} does not match any known account type", entry.account),
                account: Some(entry.account.clone()),
                date: Some(entry.date.clone()),
                net: Some(entry.net()),
            });
            if anomalies.len() >= ANOMALY_CAP {
                return anomalies;
            }
        }
    }

    anomalies
}

fn account_details(entries: &[LedgerEntry]) -> BTreeMap<String, AccountDetail> {
    let mut details: BTreeMap<String, AccountDetail> = BTreeMap::new();
    let mut label_counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for entry in entries {
        let detail = details.entry(entry.account.clone()).or_default();
        detail.entry_count += 1;
        detail.total_debit += entry.debit;
        detail.total_credit += entry.credit;
        detail.balance = detail.total_debit - detail.total_credit;

        if !entry.date.is_empty() {
            detail.earliest_date = Some(match &detail.earliest_date {
                Some(current) if current.as_str() <= entry.date.as_str() => current.clone(),
                _ => entry.date.clone(),
            });
            detail.latest_date = Some(match &detail.latest_date {
                Some(current) if current.as_str() >= entry.date.as_str() => current.clone(),
                _ => entry.date.clone(),
            });
        }

        if !entry.label.is_empty() {
            *label_counts
                .entry(entry.account.clone())
                .or_default()
                .entry(entry.label.clone())
                .or_insert(0) += 1;
        }
    }

    for (account, counts) in label_counts {
        if let Some(detail) = details.get_mut(&account) {
            if let Some((label, _)) = counts.into_iter().max_by_key(|(_, count)| *count) {
                detail.principal_label = label;
            }
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(account: &str, date: &str, debit: f64, credit: f64) -> LedgerEntry {
        LedgerEntry {
            account: account.to_string(),
            label: String::new(),
            date: date.to_string(),
            debit,
            credit,
        }
    }

    #[test]
    fn empty_input_yields_zero_snapshot() {
        let snapshot = compute_snapshot(&[], None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.entry_count, 0);
        assert_eq!(snapshot.balance, 0.0);
        assert!(snapshot.accounts_by_type.is_empty());
    }

    #[test]
    fn balance_identity_holds() {
        let entries = vec![entry("512100", "2024-01-05", 100.0, 0.0), entry("411000", "2024-01-05", 0.0, 100.0)];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.balance, snapshot.total_debit - snapshot.total_credit);
        assert_eq!(snapshot.balance, 0.0);
        assert_eq!(snapshot.balances_by_type["banque"].balance, 100.0);
        assert_eq!(snapshot.balances_by_type["clients"].balance, -100.0);
        assert_eq!(snapshot.entry_count, 2);
    }

    #[test]
    fn partition_invariant_sums_to_entry_count() {
        let entries = vec![
            entry("512100", "2024-01-05", 100.0, 0.0),
            entry("411000", "2024-01-06", 0.0, 50.0),
            entry("999999", "2024-01-07", 10.0, 0.0),
        ];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        let total: usize = snapshot.balances_by_type.values().map(|b| b.entry_count).sum();
        assert_eq!(total, snapshot.entry_count);
    }

    #[test]
    fn duplicate_anomalies_count_one_per_extra_occurrence() {
        let entries = vec![
            entry("401000", "2024-01-03", 0.0, 500.0),
            entry("401000", "2024-01-03", 0.0, 500.0),
            entry("401000", "2024-01-03", 0.0, 500.0),
        ];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        let dup_count = snapshot.anomalies.iter().filter(|a| a.kind == "duplicate").count();
        assert_eq!(dup_count, 2);
    }

    #[test]
    fn anomaly_count_is_capped_at_twenty() {
        let mut entries = Vec::new();
        for i in 0..30 {
            entries.push(entry("401000", "2024-01-03", 0.0, 500.0));
            let _ = i;
        }
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert!(snapshot.anomalies.len() <= 20);
    }

    #[test]
    fn duplicate_flag_disabled_suppresses_duplicate_anomalies() {
        let entries = vec![
            entry("401000", "2024-01-03", 0.0, 500.0),
            entry("401000", "2024-01-03", 0.0, 500.0),
        ];
        let mut config = AnomalyConfig::default();
        config.alert_on_duplicate_transactions = false;
        let snapshot = compute_snapshot(&entries, None, None, &config);
        assert!(!snapshot.anomalies.iter().any(|a| a.kind == "duplicate"));
    }

    #[test]
    fn significant_entries_are_truncated_and_capped() {
        let long_label = "x".repeat(80);
        let mut entries = Vec::new();
        for i in 0..12 {
            let mut e = entry("512100", "2024-01-05", 20_000.0 + i as f64, 0.0);
            e.label = long_label.clone();
            entries.push(e);
        }
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.movements.significant_entries.len(), 10);
        assert!(snapshot.movements.significant_entries[0].label.len() <= 50);
    }

    #[test]
    fn significant_entry_truncation_does_not_panic_on_multibyte_label() {
        // 50 "é" characters is 100 bytes; byte-index truncation at 50 would
        // land mid-character and panic. Char-based truncation must not.
        let mut e = entry("512100", "2024-01-05", 20_000.0, 0.0);
        e.label = "é".repeat(60);
        let snapshot = compute_snapshot(&[e], None, None, &AnomalyConfig::default());
        let truncated = &snapshot.movements.significant_entries[0].label;
        assert_eq!(truncated.chars().count(), 50);
    }

    #[test]
    fn most_active_accounts_ranked_descending() {
        let mut entries = Vec::new();
        for _ in 0..5 {
            entries.push(entry("512100", "2024-01-05", 10.0, 0.0));
        }
        for _ in 0..2 {
            entries.push(entry("411000", "2024-01-05", 10.0, 0.0));
        }
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.movements.most_active_accounts[0], ("512100".to_string(), 5));
    }

    #[test]
    fn ratios_omit_when_denominator_is_zero() {
        let entries = vec![entry("512100", "2024-01-05", 100.0, 0.0)];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert!(snapshot.ratios.liquidity_ratio.is_none());
        assert!(snapshot.ratios.debt_ratio.is_none());
    }

    #[test]
    fn date_analysis_tracks_period_and_missing_dates() {
        let entries = vec![
            entry("512100", "2024-01-05", 10.0, 0.0),
            entry("512100", "2024-02-10", 10.0, 0.0),
            entry("512100", "", 10.0, 0.0),
        ];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.date_analysis.period_start, Some("2024-01-05".to_string()));
        assert_eq!(snapshot.date_analysis.period_end, Some("2024-02-10".to_string()));
        assert_eq!(snapshot.date_analysis.entries_without_date, 1);
        assert_eq!(snapshot.date_analysis.monthly_distribution["2024-01"], 1);
    }

    #[test]
    fn unusual_account_anomaly_fires_for_unmatched_prefix() {
        let entries = vec![entry("999999", "2024-01-05", 10.0, 0.0)];
        let snapshot = compute_snapshot(&entries, None, None, &AnomalyConfig::default());
        assert!(snapshot.anomalies.iter().any(|a| a.kind == "unusual_account"));
    }

    #[test]
    fn account_details_track_principal_label() {
        let mut e1 = entry("512100", "2024-01-05", 10.0, 0.0);
        e1.label = "Adobe".to_string();
        let mut e2 = entry("512100", "2024-01-06", 5.0, 0.0);
        e2.label = "Adobe".to_string();
        let mut e3 = entry("512100", "2024-01-07", 5.0, 0.0);
        e3.label = "Github".to_string();
        let snapshot = compute_snapshot(&[e1, e2, e3], None, None, &AnomalyConfig::default());
        assert_eq!(snapshot.account_details["512100"].principal_label, "Adobe");
        assert_eq!(snapshot.account_details["512100"].entry_count, 3);
    }
}
