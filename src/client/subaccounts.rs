use super::{VonageClient, VonageError};
use crate::domain::subaccounts::{
    Account, CreateSubaccount, MoneyTransfer, NumberTransfer, SubaccountsOverview, TransferMoney,
    TransferNumber, TransfersFilter, UpdateSubaccount,
};
use crate::domain::ApiKey;
use crate::transport::subaccounts::TransferKind;
use crate::transport::{self, ApiFamily, AuthScheme};

#[derive(Debug, Clone, Copy)]
/// Subaccounts API. Paths are scoped to the API key of the configured credentials.
pub struct SubaccountsApi<'a> {
    client: &'a VonageClient,
}

impl<'a> SubaccountsApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    fn account(&self) -> Result<&'a ApiKey, VonageError> {
        self.client
            .credentials
            .api_key()
            .ok_or(VonageError::MissingCredentials {
                family: ApiFamily::Subaccounts,
                accepted: &[AuthScheme::Basic],
            })
    }

    /// Create a subaccount. The response carries its generated secret.
    pub async fn create(&self, request: &CreateSubaccount) -> Result<Account, VonageError> {
        let http =
            transport::subaccounts::create_subaccount_request(self.client.base(), self.account()?, request)?;
        self.client
            .json(http, transport::subaccounts::decode_account)
            .await
    }

    /// Primary account, its subaccounts and the aggregate balances.
    pub async fn list(&self) -> Result<SubaccountsOverview, VonageError> {
        let http =
            transport::subaccounts::list_subaccounts_request(self.client.base(), self.account()?)?;
        self.client
            .json(http, transport::subaccounts::decode_overview)
            .await
    }

    pub async fn get(&self, subaccount: &ApiKey) -> Result<Account, VonageError> {
        let http = transport::subaccounts::get_subaccount_request(
            self.client.base(),
            self.account()?,
            subaccount,
        )?;
        self.client
            .json(http, transport::subaccounts::decode_account)
            .await
    }

    pub async fn update(&self, request: &UpdateSubaccount) -> Result<Account, VonageError> {
        let http =
            transport::subaccounts::update_subaccount_request(self.client.base(), self.account()?, request)?;
        self.client
            .json(http, transport::subaccounts::decode_account)
            .await
    }

    /// Credit transfers in the filter window, or `None` when the response has
    /// no `credit_transfers` collection.
    pub async fn list_credit_transfers(
        &self,
        filter: &TransfersFilter,
    ) -> Result<Option<Vec<MoneyTransfer>>, VonageError> {
        let http = transport::subaccounts::list_transfers_request(
            self.client.base(),
            self.account()?,
            TransferKind::Credit,
            filter,
        )?;
        let page = self
            .client
            .json(http, transport::subaccounts::decode_credit_transfers)
            .await?;
        Ok(page.embedded.and_then(|embedded| embedded.credit_transfers))
    }

    /// Balance transfers in the filter window, or `None` when the response has
    /// no `balance_transfers` collection.
    pub async fn list_balance_transfers(
        &self,
        filter: &TransfersFilter,
    ) -> Result<Option<Vec<MoneyTransfer>>, VonageError> {
        let http = transport::subaccounts::list_transfers_request(
            self.client.base(),
            self.account()?,
            TransferKind::Balance,
            filter,
        )?;
        let page = self
            .client
            .json(http, transport::subaccounts::decode_balance_transfers)
            .await?;
        Ok(page.embedded.and_then(|embedded| embedded.balance_transfers))
    }

    pub async fn transfer_credit(
        &self,
        transfer: &TransferMoney,
    ) -> Result<MoneyTransfer, VonageError> {
        self.transfer(TransferKind::Credit, transfer).await
    }

    pub async fn transfer_balance(
        &self,
        transfer: &TransferMoney,
    ) -> Result<MoneyTransfer, VonageError> {
        self.transfer(TransferKind::Balance, transfer).await
    }

    async fn transfer(
        &self,
        kind: TransferKind,
        transfer: &TransferMoney,
    ) -> Result<MoneyTransfer, VonageError> {
        let http = transport::subaccounts::transfer_money_request(
            self.client.base(),
            self.account()?,
            kind,
            transfer,
        )?;
        self.client
            .json(http, transport::subaccounts::decode_money_transfer)
            .await
    }

    /// Move a virtual number between the primary account and a subaccount.
    pub async fn transfer_number(
        &self,
        transfer: &TransferNumber,
    ) -> Result<NumberTransfer, VonageError> {
        let http = transport::subaccounts::transfer_number_request(
            self.client.base(),
            self.account()?,
            transfer,
        )?;
        self.client
            .json(http, transport::subaccounts::decode_number_transfer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::super::Credentials;
    use super::super::fake::{FakeTransport, make_client};
    use super::*;
    use crate::domain::ApiSecret;

    fn key(value: &str) -> ApiKey {
        ApiKey::new(value).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::key_secret(key("bbe6222f"), ApiSecret::new("s3cr3t").unwrap())
    }

    #[tokio::test]
    async fn list_uses_basic_auth_and_account_path() {
        let json = r#"{
            "total_balance": 9.9999,
            "total_credit_limit": 0.0,
            "_links": {"self": {"href": "/accounts/bbe6222f/subaccounts"}},
            "_embedded": {
                "primary_account": {"api_key": "bbe6222f", "name": "Primary"},
                "subaccounts": [{"api_key": "aaa111", "name": "Sub", "suspended": false}]
            }
        }"#;
        let transport = FakeTransport::new(200, json);
        let client = make_client(credentials(), transport.clone());

        let overview = client.subaccounts().list().await.unwrap();
        assert_eq!(overview.total_balance, Some(9.9999));
        assert_eq!(
            overview.primary_account().and_then(|a| a.name.as_deref()),
            Some("Primary")
        );
        assert_eq!(overview.subaccounts().map(<[Account]>::len), Some(1));

        assert_eq!(
            transport.last_request().url.as_str(),
            "https://api.nexmo.com/accounts/bbe6222f/subaccounts"
        );
        assert_eq!(
            transport.header("Authorization").as_deref(),
            Some("Basic YmJlNjIyMmY6czNjcjN0")
        );
    }

    #[tokio::test]
    async fn transfers_without_collection_are_none() {
        let client = make_client(credentials(), FakeTransport::new(200, r#"{"_embedded":{}}"#));
        let start: DateTime<Utc> = DateTime::parse_from_rfc3339("2023-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let filter = TransfersFilter::new(start, None, None).unwrap();

        let transfers = client
            .subaccounts()
            .list_credit_transfers(&filter)
            .await
            .unwrap();
        assert_eq!(transfers, None);
    }

    #[tokio::test]
    async fn transfer_balance_posts_to_balance_ledger() {
        let transport = FakeTransport::new(
            200,
            r#"{"id":"297016f8","amount":12.5,"from":"bbe6222f","to":"aaa111","created_at":"2019-03-02T16:34:49Z"}"#,
        );
        let client = make_client(credentials(), transport.clone());
        let transfer = TransferMoney::new(key("bbe6222f"), key("aaa111"), 12.5, None).unwrap();

        let result = client.subaccounts().transfer_balance(&transfer).await.unwrap();
        assert_eq!(result.id.as_deref(), Some("297016f8"));
        assert!(
            transport
                .last_request()
                .url
                .path()
                .ends_with("/balance-transfers")
        );
    }

    #[tokio::test]
    async fn key_secret_is_required() {
        let transport = FakeTransport::new(200, "{}");
        let credentials = Credentials::new().with_bearer_token("eyJ.token").unwrap();
        let client = make_client(credentials, transport.clone());

        let err = client.subaccounts().list().await.unwrap_err();
        assert!(matches!(
            err,
            VonageError::MissingCredentials {
                family: ApiFamily::Subaccounts,
                ..
            }
        ));
        assert_eq!(transport.request_count(), 0);
    }
}
