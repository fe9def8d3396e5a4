use std::path::Path;

use serde_json::{Map, Value};

use super::{VonageClient, VonageError};
use crate::domain::proactive_connect::{
    ContactsList, EventsEmbedded, EventsFilter, ItemsEmbedded, ListItem, ListsEmbedded,
    PAGE_LIMITS, ProactiveEvent, UploadResponse,
};
use crate::domain::{HalPage, ItemId, ListId, PageFilter, SortOrder};
use crate::transport;

#[derive(Debug, Clone, Copy)]
/// Proactive Connect bulk API: lists, list items and run events.
///
/// Listings take `page` (≥ 1), `page_size` (1..=1000) and `order`; bounds are
/// checked before any request is made. The `*_page` variants return the whole
/// HAL page with its counts and links.
pub struct ProactiveConnectApi<'a> {
    client: &'a VonageClient,
}

impl<'a> ProactiveConnectApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    pub async fn create_list(&self, list: &ContactsList) -> Result<ContactsList, VonageError> {
        let http = transport::proactive_connect::create_list_request(self.client.base(), list)?;
        self.client
            .json(http, transport::proactive_connect::decode_list)
            .await
    }

    /// Lists on the requested page, or `None` when the response has no `lists`
    /// collection.
    pub async fn list_lists(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        order: Option<SortOrder>,
    ) -> Result<Option<Vec<ContactsList>>, VonageError> {
        let page = self.list_lists_page(page, page_size, order).await?;
        Ok(page.embedded.and_then(|embedded| embedded.lists))
    }

    pub async fn list_lists_page(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        order: Option<SortOrder>,
    ) -> Result<HalPage<ListsEmbedded>, VonageError> {
        let filter = PageFilter::new(page, page_size, order, PAGE_LIMITS)?;
        let http = transport::proactive_connect::list_lists_request(self.client.base(), &filter)?;
        self.client
            .json(http, transport::proactive_connect::decode_lists_page)
            .await
    }

    pub async fn get_list(&self, list: &ListId) -> Result<ContactsList, VonageError> {
        let http = transport::proactive_connect::get_list_request(self.client.base(), list)?;
        self.client
            .json(http, transport::proactive_connect::decode_list)
            .await
    }

    /// Replace the list definition.
    pub async fn update_list(
        &self,
        id: &ListId,
        list: &ContactsList,
    ) -> Result<ContactsList, VonageError> {
        let http = transport::proactive_connect::update_list_request(self.client.base(), id, list)?;
        self.client
            .json(http, transport::proactive_connect::decode_list)
            .await
    }

    pub async fn delete_list(&self, list: &ListId) -> Result<(), VonageError> {
        let http = transport::proactive_connect::delete_list_request(self.client.base(), list)?;
        self.client.empty(http).await
    }

    /// Delete every item of the list, keeping the list itself.
    pub async fn clear_list(&self, list: &ListId) -> Result<(), VonageError> {
        let http = transport::proactive_connect::clear_list_request(self.client.base(), list)?;
        self.client.empty(http).await
    }

    /// Re-fetch items from the list's datasource.
    pub async fn fetch_list(&self, list: &ListId) -> Result<(), VonageError> {
        let http = transport::proactive_connect::fetch_list_request(self.client.base(), list)?;
        self.client.empty(http).await
    }

    pub async fn create_item(
        &self,
        list: &ListId,
        data: &Map<String, Value>,
    ) -> Result<ListItem, VonageError> {
        let http =
            transport::proactive_connect::create_item_request(self.client.base(), list, data)?;
        self.client
            .json(http, transport::proactive_connect::decode_item)
            .await
    }

    pub async fn list_items(
        &self,
        list: &ListId,
        page: Option<u32>,
        page_size: Option<u32>,
        order: Option<SortOrder>,
    ) -> Result<Option<Vec<ListItem>>, VonageError> {
        let page = self.list_items_page(list, page, page_size, order).await?;
        Ok(page.embedded.and_then(|embedded| embedded.items))
    }

    pub async fn list_items_page(
        &self,
        list: &ListId,
        page: Option<u32>,
        page_size: Option<u32>,
        order: Option<SortOrder>,
    ) -> Result<HalPage<ItemsEmbedded>, VonageError> {
        let filter = PageFilter::new(page, page_size, order, PAGE_LIMITS)?;
        let http =
            transport::proactive_connect::list_items_request(self.client.base(), list, &filter)?;
        self.client
            .json(http, transport::proactive_connect::decode_items_page)
            .await
    }

    pub async fn get_item(&self, list: &ListId, item: &ItemId) -> Result<ListItem, VonageError> {
        let http = transport::proactive_connect::get_item_request(self.client.base(), list, item)?;
        self.client
            .json(http, transport::proactive_connect::decode_item)
            .await
    }

    pub async fn update_item(
        &self,
        list: &ListId,
        item: &ItemId,
        data: &Map<String, Value>,
    ) -> Result<ListItem, VonageError> {
        let http = transport::proactive_connect::update_item_request(
            self.client.base(),
            list,
            item,
            data,
        )?;
        self.client
            .json(http, transport::proactive_connect::decode_item)
            .await
    }

    pub async fn delete_item(&self, list: &ListId, item: &ItemId) -> Result<(), VonageError> {
        let http =
            transport::proactive_connect::delete_item_request(self.client.base(), list, item)?;
        self.client.empty(http).await
    }

    /// Download every item of the list as CSV.
    pub async fn download_items(&self, list: &ListId) -> Result<Vec<u8>, VonageError> {
        let http = transport::proactive_connect::download_items_request(self.client.base(), list)?;
        self.client.bytes(http).await
    }

    /// Download the list items as CSV and write them to `path`.
    pub async fn save_items(
        &self,
        list: &ListId,
        path: impl AsRef<Path>,
    ) -> Result<(), VonageError> {
        let csv = self.download_items(list).await?;
        tokio::fs::write(path, csv).await?;
        Ok(())
    }

    /// Import items from CSV. The first row names the list attributes.
    pub async fn upload_items(
        &self,
        list: &ListId,
        file_name: impl Into<String>,
        csv: Vec<u8>,
    ) -> Result<UploadResponse, VonageError> {
        let http = transport::proactive_connect::upload_items_request(
            self.client.base(),
            list,
            file_name.into(),
            csv,
        )?;
        self.client
            .json(http, transport::proactive_connect::decode_upload)
            .await
    }

    /// Read a CSV file from `path` and import it.
    pub async fn upload_items_file(
        &self,
        list: &ListId,
        path: impl AsRef<Path>,
    ) -> Result<UploadResponse, VonageError> {
        let path = path.as_ref();
        let csv = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "items.csv".to_owned());
        self.upload_items(list, file_name, csv).await
    }

    pub async fn list_events(
        &self,
        filter: &EventsFilter,
    ) -> Result<Option<Vec<ProactiveEvent>>, VonageError> {
        let page = self.list_events_page(filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.events))
    }

    pub async fn list_events_page(
        &self,
        filter: &EventsFilter,
    ) -> Result<HalPage<EventsEmbedded>, VonageError> {
        let http = transport::proactive_connect::list_events_request(self.client.base(), filter)?;
        self.client
            .json(http, transport::proactive_connect::decode_events_page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::Credentials;
    use super::super::fake::{FakeTransport, make_client};
    use super::*;
    use crate::domain::ValidationError;
    use crate::domain::proactive_connect::{ContactsListOptions, Datasource};
    use crate::transport::{HttpMethod, RequestBody};

    fn credentials() -> Credentials {
        Credentials::new().with_bearer_token("eyJ.token").unwrap()
    }

    fn list_id() -> ListId {
        ListId::new("29192c4a-4058-49da-86c2-3e349d1065b7").unwrap()
    }

    #[tokio::test]
    async fn create_list_round_trips_datasource() {
        let json = r#"{
            "id": "29192c4a-4058-49da-86c2-3e349d1065b7",
            "name": "Recipients",
            "datasource": {"type": "manual"},
            "items_count": 0,
            "sync_status": {"value": "configured", "dirty": false}
        }"#;
        let transport = FakeTransport::new(201, json);
        let client = make_client(credentials(), transport.clone());
        let list = ContactsList::new(
            "Recipients",
            ContactsListOptions {
                datasource: Some(Datasource::Manual),
                ..Default::default()
            },
        )
        .unwrap();

        let created = client.proactive_connect().create_list(&list).await.unwrap();
        assert_eq!(created.id(), Some("29192c4a-4058-49da-86c2-3e349d1065b7"));
        assert_eq!(created.datasource(), Some(&Datasource::Manual));
        assert_eq!(
            transport.json_body(),
            json!({"name": "Recipients", "datasource": {"type": "manual"}})
        );
    }

    #[tokio::test]
    async fn page_bounds_are_checked_before_io() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(credentials(), transport.clone());

        let err = client
            .proactive_connect()
            .list_lists(Some(0), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VonageError::Validation(ValidationError::OutOfRange { field: "page", .. })
        ));

        let err = client
            .proactive_connect()
            .list_items(&list_id(), None, Some(1001), None)
            .await
            .unwrap_err();
        assert!(matches!(err, VonageError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn list_items_unwraps_embedded_collection() {
        let json = r#"{
            "page": 1,
            "page_size": 100,
            "total_items": 1,
            "total_pages": 1,
            "_embedded": {"items": [
                {"id": "4cb98f71-a879-49f7-b5cf-2314353eb52c", "data": {"phone": "447700900000"}}
            ]}
        }"#;
        let client = make_client(credentials(), FakeTransport::new(200, json));
        let items = client
            .proactive_connect()
            .list_items(&list_id(), Some(1), Some(100), Some(SortOrder::Asc))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].data.as_ref().and_then(|d| d.get("phone")),
            Some(&json!("447700900000"))
        );

        let client = make_client(credentials(), FakeTransport::new(200, r#"{"page":1}"#));
        let items = client
            .proactive_connect()
            .list_items(&list_id(), None, None, None)
            .await
            .unwrap();
        assert_eq!(items, None);
    }

    #[tokio::test]
    async fn list_lists_page_exposes_counts_and_links() {
        let json = r#"{
            "page": 2,
            "page_size": 1,
            "total_items": 3,
            "total_pages": 3,
            "_links": {
                "self": {"href": "https://api-eu.vonage.com/v0.1/bulk/lists?page=2&page_size=1"},
                "next": {"href": "https://api-eu.vonage.com/v0.1/bulk/lists?page=3&page_size=1"}
            },
            "_embedded": {"lists": [{"id": "29192c4a-4058-49da-86c2-3e349d1065b7", "name": "Recipients"}]}
        }"#;
        let transport = FakeTransport::new(200, json);
        let client = make_client(credentials(), transport.clone());

        let page = client
            .proactive_connect()
            .list_lists_page(Some(2), Some(1), None)
            .await
            .unwrap();
        assert_eq!(page.page, Some(2));
        assert_eq!(page.total_pages, Some(3));
        assert!(page.links.and_then(|links| links.next).is_some());
        assert_eq!(page.embedded.and_then(|e| e.lists).map(|l| l.len()), Some(1));
        assert_eq!(
            transport.last_request().url.query(),
            Some("page=2&page_size=1")
        );
    }

    #[tokio::test]
    async fn delete_and_clear_accept_empty_bodies() {
        let transport = FakeTransport::new(204, "");
        let client = make_client(credentials(), transport.clone());

        client.proactive_connect().delete_list(&list_id()).await.unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Delete);

        client.proactive_connect().clear_list(&list_id()).await.unwrap();
        assert!(transport.last_request().url.path().ends_with("/clear"));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn upload_items_sends_multipart_csv() {
        let transport = FakeTransport::new(200, r#"{"inserted":2}"#);
        let client = make_client(credentials(), transport.clone());

        let result = client
            .proactive_connect()
            .upload_items(&list_id(), "items.csv", b"phone\n447700900000\n447700900001\n".to_vec())
            .await
            .unwrap();
        assert_eq!(result.inserted, Some(2));
        match transport.last_request().body {
            RequestBody::Multipart {
                field,
                file_name,
                content_type,
                ..
            } => {
                assert_eq!(field, "file");
                assert_eq!(file_name, "items.csv");
                assert_eq!(content_type, "text/csv");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_items_returns_csv() {
        let transport = FakeTransport::new(200, "phone\n447700900000\n");
        let client = make_client(credentials(), transport.clone());

        let csv = client
            .proactive_connect()
            .download_items(&list_id())
            .await
            .unwrap();
        assert_eq!(csv, b"phone\n447700900000\n");
        assert_eq!(transport.header("Accept").as_deref(), Some("text/csv"));
    }

    #[tokio::test]
    async fn items_csv_round_trips_through_files() {
        let dir = std::env::temp_dir().join(format!("vonage-items-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("recipients.csv");

        let transport = FakeTransport::new(200, "phone\n447700900000\n");
        let client = make_client(credentials(), transport.clone());
        client
            .proactive_connect()
            .save_items(&list_id(), &path)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"phone\n447700900000\n");

        let transport = FakeTransport::new(200, r#"{"inserted":1}"#);
        let client = make_client(credentials(), transport.clone());
        let result = client
            .proactive_connect()
            .upload_items_file(&list_id(), &path)
            .await
            .unwrap();
        assert_eq!(result.inserted, Some(1));
        match transport.last_request().body {
            RequestBody::Multipart {
                file_name, bytes, ..
            } => {
                assert_eq!(file_name, "recipients.csv");
                assert_eq!(bytes, b"phone\n447700900000\n");
            }
            other => panic!("unexpected body: {other:?}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_upload_file_is_io_error() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(credentials(), transport.clone());
        let err = client
            .proactive_connect()
            .upload_items_file(&list_id(), "/nonexistent/vonage/items.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, VonageError::Io(_)));
        assert_eq!(transport.request_count(), 0);
    }
}
