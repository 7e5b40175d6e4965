use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One line of the general ledger, after C2 normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub debit: f64,
    #[serde(default)]
    pub credit: f64,
}

impl LedgerEntry {
    pub fn net(&self) -> f64 {
        self.debit - self.credit
    }
}

/// One line of the bank statement, after C2 normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankOperation {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub nature: String,
    #[serde(default)]
    pub montant: f64,
    #[serde(default)]
    pub r#type: String,
}

/// An opaque key/value source document (invoice or cheque). Unknown keys
/// round-trip untouched.
pub type SourceDocument = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Banque,
    Clients,
    Fournisseurs,
    TvaDeductible,
    TvaCollectee,
    Ventes,
    Achats,
    Charges,
    Immobilisations,
    Stocks,
    Capitaux,
    Autres,
}

impl AccountType {
    pub const ALL: [AccountType; 12] = [
        AccountType::Banque,
        AccountType::Clients,
        AccountType::Fournisseurs,
        AccountType::TvaDeductible,
        AccountType::TvaCollectee,
        AccountType::Ventes,
        AccountType::Achats,
        AccountType::Charges,
        AccountType::Immobilisations,
        AccountType::Stocks,
        AccountType::Capitaux,
        AccountType::Autres,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AccountType::Banque => "banque",
            AccountType::Clients => "clients",
            AccountType::Fournisseurs => "fournisseurs",
            AccountType::TvaDeductible => "tva_deductible",
            AccountType::TvaCollectee => "tva_collectee",
            AccountType::Ventes => "ventes",
            AccountType::Achats => "achats",
            AccountType::Charges => "charges",
            AccountType::Immobilisations => "immobilisations",
            AccountType::Stocks => "stocks",
            AccountType::Capitaux => "capitaux",
            AccountType::Autres => "autres",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    FactureNonRapprocheeGl,
    ChequeNonComptabiliseGl,
    ChequeEmisNonEncaisseGl,
    ChequeEncaisseNonEmisGl,
    ChequeIncoherentGl,
    EcartMontant,
    NumeroManquant,
    JourNonOuvrable,
}

impl AlertKind {
    pub fn code(&self) -> &'static str {
        match self {
            AlertKind::FactureNonRapprocheeGl => "FACTURE_NON_RAPPROCHEE_GL",
            AlertKind::ChequeNonComptabiliseGl => "CHEQUE_NON_COMPTABILISE_GL",
            AlertKind::ChequeEmisNonEncaisseGl => "CHEQUE_EMIS_NON_ENCAISSE_GL",
            AlertKind::ChequeEncaisseNonEmisGl => "CHEQUE_ENCAISSE_NON_EMIS_GL",
            AlertKind::ChequeIncoherentGl => "CHEQUE_INCOHERENT_GL",
            AlertKind::EcartMontant => "ECART_MONTANT",
            AlertKind::NumeroManquant => "NUMERO_MANQUANT",
            AlertKind::JourNonOuvrable => "JOUR_NON_OUVRABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Gl,
    Rl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub severity: Severity,
    #[serde(rename = "ref")]
    pub reference: String,
    pub document_id: String,
    pub source: Source,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub montant: Option<f64>,
    #[serde(default)]
    pub montant_gl: Option<f64>,
    #[serde(default)]
    pub montant_releve: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub nom_client: Option<String>,
    #[serde(default)]
    pub type_facture: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    pub description: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    pub title: String,
    pub action: String,
    pub suggested_account: String,
    pub counter_entry_hint: String,
    /// The template embeds `{ref}` and `{name}` placeholders; use
    /// [`Guide::label`] rather than formatting this field directly.
    pub label_template: String,
}

impl Guide {
    pub fn label(&self, reference: &str, counterparty_name: &str) -> String {
        self.label_template
            .replace("{ref}", reference)
            .replace("{name}", counterparty_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceByType {
    pub total_debit: f64,
    pub total_credit: f64,
    pub balance: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movements {
    pub largest_debit: f64,
    pub largest_credit: f64,
    pub mean_debit: f64,
    pub mean_credit: f64,
    pub significant_entries: Vec<LedgerEntry>,
    pub most_active_accounts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ratios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_rotation_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateAnalysis {
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub duration_days: Option<i64>,
    pub monthly_distribution: BTreeMap<String, usize>,
    pub entries_without_date: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub net: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountDetail {
    pub entry_count: usize,
    pub total_debit: f64,
    pub total_credit: f64,
    pub balance: f64,
    pub earliest_date: Option<String>,
    pub latest_date: Option<String>,
    pub principal_label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub entry_count: usize,
    pub total_debit: f64,
    pub total_credit: f64,
    pub balance: f64,
    pub accounts_by_type: BTreeMap<String, Vec<LedgerEntry>>,
    pub balances_by_type: BTreeMap<String, BalanceByType>,
    pub movements: Movements,
    pub ratios: Ratios,
    pub date_analysis: DateAnalysis,
    pub anomalies: Vec<Anomaly>,
    pub account_details: BTreeMap<String, AccountDetail>,
    pub source_file: Option<String>,
    pub processed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
