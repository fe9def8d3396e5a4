use serde::Serialize;

use super::{
    ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, Query, TransportError, decode_json,
    endpoint, format_instant,
};
use crate::domain::ApiKey;
use crate::domain::subaccounts::{
    Account, BalanceTransfersEmbedded, CreateSubaccount, CreditTransfersEmbedded, MoneyTransfer,
    NumberTransfer, SubaccountsOverview, TransferMoney, TransferNumber, TransfersFilter,
    UpdateSubaccount,
};
use crate::domain::HalPage;

const AUTH: &[AuthScheme] = &[AuthScheme::Basic];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Ledger a money transfer moves between.
pub(crate) enum TransferKind {
    Credit,
    Balance,
}

impl TransferKind {
    fn segment(self) -> &'static str {
        match self {
            Self::Credit => "credit-transfers",
            Self::Balance => "balance-transfers",
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateSubaccountWire<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_primary_account_balance: Option<bool>,
}

#[derive(Debug, Serialize)]
struct UpdateSubaccountWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suspended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_primary_account_balance: Option<bool>,
}

#[derive(Debug, Serialize)]
struct TransferMoneyWire<'a> {
    from: &'a str,
    to: &'a str,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TransferNumberWire<'a> {
    from: &'a str,
    to: &'a str,
    number: &'a str,
    country: &'a str,
}

fn account_endpoint(
    base: &BaseUris,
    account: &ApiKey,
    rest: &[&str],
) -> Result<url::Url, TransportError> {
    let mut segments = vec!["accounts", account.as_str()];
    segments.extend_from_slice(rest);
    endpoint(&base.api, &segments)
}

pub(crate) fn create_subaccount_request(
    base: &BaseUris,
    account: &ApiKey,
    request: &CreateSubaccount,
) -> Result<HttpRequest, TransportError> {
    let wire = CreateSubaccountWire {
        name: request.name(),
        secret: request.secret(),
        use_primary_account_balance: request.use_primary_account_balance(),
    };
    let url = account_endpoint(base, account, &["subaccounts"])?;
    HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Post, url, AUTH).json(&wire)
}

pub(crate) fn list_subaccounts_request(
    base: &BaseUris,
    account: &ApiKey,
) -> Result<HttpRequest, TransportError> {
    let url = account_endpoint(base, account, &["subaccounts"])?;
    Ok(HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Get, url, AUTH))
}

pub(crate) fn get_subaccount_request(
    base: &BaseUris,
    account: &ApiKey,
    subaccount: &ApiKey,
) -> Result<HttpRequest, TransportError> {
    let url = account_endpoint(base, account, &["subaccounts", subaccount.as_str()])?;
    Ok(HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Get, url, AUTH))
}

pub(crate) fn update_subaccount_request(
    base: &BaseUris,
    account: &ApiKey,
    request: &UpdateSubaccount,
) -> Result<HttpRequest, TransportError> {
    let options = request.options();
    let wire = UpdateSubaccountWire {
        name: options.name.as_deref(),
        suspended: options.suspended,
        use_primary_account_balance: options.use_primary_account_balance,
    };
    let url = account_endpoint(
        base,
        account,
        &["subaccounts", request.subaccount().as_str()],
    )?;
    HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Patch, url, AUTH).json(&wire)
}

pub(crate) fn list_transfers_request(
    base: &BaseUris,
    account: &ApiKey,
    kind: TransferKind,
    filter: &TransfersFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = account_endpoint(base, account, &[kind.segment()])?;
    Query::new()
        .set("start_date", format_instant(filter.start_date()))
        .opt("end_date", filter.end_date().map(format_instant))
        .opt("subaccount", filter.subaccount().map(ApiKey::as_str))
        .apply(&mut url);
    Ok(HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Get, url, AUTH))
}

pub(crate) fn transfer_money_request(
    base: &BaseUris,
    account: &ApiKey,
    kind: TransferKind,
    transfer: &TransferMoney,
) -> Result<HttpRequest, TransportError> {
    let wire = TransferMoneyWire {
        from: transfer.from().as_str(),
        to: transfer.to().as_str(),
        amount: transfer.amount(),
        reference: transfer.reference(),
    };
    let url = account_endpoint(base, account, &[kind.segment()])?;
    HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Post, url, AUTH).json(&wire)
}

pub(crate) fn transfer_number_request(
    base: &BaseUris,
    account: &ApiKey,
    transfer: &TransferNumber,
) -> Result<HttpRequest, TransportError> {
    let wire = TransferNumberWire {
        from: transfer.from().as_str(),
        to: transfer.to().as_str(),
        number: transfer.number().as_str(),
        country: transfer.country(),
    };
    let url = account_endpoint(base, account, &["transfer-number"])?;
    HttpRequest::new(ApiFamily::Subaccounts, HttpMethod::Post, url, AUTH).json(&wire)
}

pub(crate) fn decode_account(body: &[u8]) -> Result<Account, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_overview(body: &[u8]) -> Result<SubaccountsOverview, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_credit_transfers(
    body: &[u8],
) -> Result<HalPage<CreditTransfersEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_balance_transfers(
    body: &[u8],
) -> Result<HalPage<BalanceTransfersEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_money_transfer(body: &[u8]) -> Result<MoneyTransfer, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_number_transfer(body: &[u8]) -> Result<NumberTransfer, TransportError> {
    decode_json(body)
}
