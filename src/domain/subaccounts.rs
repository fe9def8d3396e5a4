//! Subaccounts API: account records, credit and balance transfers, number moves.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::lenient;
use crate::domain::pagination::HalLinks;
use crate::domain::validation::{ValidationError, check_length, check_positive};
use crate::domain::value::{ApiKey, PhoneNumber};

pub const SUBACCOUNT_NAME_MAX: usize = 80;
pub const TRANSFER_REFERENCE_MAX: usize = 1024;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Primary account or subaccount.
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Only returned when the subaccount is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_account_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_primary_account_balance: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubaccountsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_account: Option<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subaccounts: Option<Vec<Account>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Result of listing subaccounts.
pub struct SubaccountsOverview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_credit_limit: Option<f64>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<SubaccountsEmbedded>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SubaccountsOverview {
    pub fn primary_account(&self) -> Option<&Account> {
        self.embedded.as_ref()?.primary_account.as_ref()
    }

    /// `None` when the response carried no subaccount collection at all.
    pub fn subaccounts(&self) -> Option<&[Account]> {
        self.embedded.as_ref()?.subaccounts.as_deref()
    }
}

fn check_secret(secret: &str) -> Result<(), ValidationError> {
    check_length("secret", secret, 8, 25)?;
    let lower = secret.chars().any(|c| c.is_ascii_lowercase());
    let upper = secret.chars().any(|c| c.is_ascii_uppercase());
    let digit = secret.chars().any(|c| c.is_ascii_digit());
    if !(lower && upper && digit) {
        return Err(ValidationError::Invalid {
            field: "secret",
            reason: "needs a lowercase letter, an uppercase letter and a digit",
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubaccount {
    name: String,
    secret: Option<String>,
    use_primary_account_balance: Option<bool>,
}

impl CreateSubaccount {
    pub fn new(
        name: impl Into<String>,
        secret: Option<String>,
        use_primary_account_balance: Option<bool>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        check_length("name", &name, 1, SUBACCOUNT_NAME_MAX)?;
        if let Some(secret) = secret.as_deref() {
            check_secret(secret)?;
        }
        Ok(Self {
            name,
            secret,
            use_primary_account_balance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn use_primary_account_balance(&self) -> Option<bool> {
        self.use_primary_account_balance
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateSubaccountOptions {
    pub name: Option<String>,
    pub suspended: Option<bool>,
    pub use_primary_account_balance: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
/// Partial update of a subaccount. At least one field must be set.
pub struct UpdateSubaccount {
    subaccount: ApiKey,
    options: UpdateSubaccountOptions,
}

impl UpdateSubaccount {
    pub fn new(subaccount: ApiKey, options: UpdateSubaccountOptions) -> Result<Self, ValidationError> {
        if options.name.is_none()
            && options.suspended.is_none()
            && options.use_primary_account_balance.is_none()
        {
            return Err(ValidationError::Empty { field: "update" });
        }
        if let Some(name) = options.name.as_deref() {
            check_length("name", name, 1, SUBACCOUNT_NAME_MAX)?;
        }
        Ok(Self {
            subaccount,
            options,
        })
    }

    pub fn subaccount(&self) -> &ApiKey {
        &self.subaccount
    }

    pub fn options(&self) -> &UpdateSubaccountOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Credit or balance transfer record.
pub struct MoneyTransfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreditTransfersEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_transfers: Option<Vec<MoneyTransfer>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceTransfersEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_transfers: Option<Vec<MoneyTransfer>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// Query filter of the transfer listings. `start_date` is required.
pub struct TransfersFilter {
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    subaccount: Option<ApiKey>,
}

impl TransfersFilter {
    pub fn new(
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        subaccount: Option<ApiKey>,
    ) -> Result<Self, ValidationError> {
        if matches!(end_date, Some(end) if end < start_date) {
            return Err(ValidationError::Invalid {
                field: "end_date",
                reason: "must not precede start_date",
            });
        }
        Ok(Self {
            start_date,
            end_date,
            subaccount,
        })
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn subaccount(&self) -> Option<&ApiKey> {
        self.subaccount.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Move credit or balance between two accounts.
pub struct TransferMoney {
    from: ApiKey,
    to: ApiKey,
    amount: f64,
    reference: Option<String>,
}

impl TransferMoney {
    pub fn new(
        from: ApiKey,
        to: ApiKey,
        amount: f64,
        reference: Option<String>,
    ) -> Result<Self, ValidationError> {
        check_positive("amount", amount)?;
        if let Some(reference) = reference.as_deref() {
            check_length("reference", reference, 0, TRANSFER_REFERENCE_MAX)?;
        }
        Ok(Self {
            from,
            to,
            amount,
            reference,
        })
    }

    pub fn from(&self) -> &ApiKey {
        &self.from
    }

    pub fn to(&self) -> &ApiKey {
        &self.to
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Move a virtual number between two accounts.
pub struct TransferNumber {
    from: ApiKey,
    to: ApiKey,
    number: PhoneNumber,
    country: String,
}

impl TransferNumber {
    pub fn new(
        from: ApiKey,
        to: ApiKey,
        number: PhoneNumber,
        country: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let country = country.into();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::Invalid {
                field: "country",
                reason: "expected an ISO 3166-1 alpha-2 code",
            });
        }
        Ok(Self {
            from,
            to,
            number,
            country,
        })
    }

    pub fn from(&self) -> &ApiKey {
        &self.from
    }

    pub fn to(&self) -> &ApiKey {
        &self.to
    }

    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberTransfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
