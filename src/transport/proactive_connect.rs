use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, Query, RequestBody, TransportError,
    decode_json, endpoint, format_instant,
};
use crate::domain::proactive_connect::{
    ContactsList, EventsEmbedded, EventsFilter, ItemsEmbedded, ListItem, ListsEmbedded,
    UploadResponse,
};
use crate::domain::{HalPage, ItemId, ListId, PageFilter};

const AUTH: &[AuthScheme] = &[AuthScheme::Jwt];
const BULK: &str = "v0.1";

#[derive(Debug, Serialize)]
struct ItemWire<'a> {
    data: &'a Map<String, Value>,
}

fn bulk(base: &BaseUris, segments: &[&str]) -> Result<url::Url, TransportError> {
    let mut path = vec![BULK, "bulk"];
    path.extend_from_slice(segments);
    endpoint(&base.api_eu, &path)
}

fn page_query(page: &PageFilter) -> Query {
    Query::new()
        .opt("page", page.page())
        .opt("page_size", page.page_size())
        .opt("order", page.order().map(|order| order.as_str()))
}

fn request(method: HttpMethod, url: url::Url) -> HttpRequest {
    HttpRequest::new(ApiFamily::ProactiveConnect, method, url, AUTH)
}

pub(crate) fn create_list_request(
    base: &BaseUris,
    list: &ContactsList,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Post, bulk(base, &["lists"])?).json(list)
}

pub(crate) fn list_lists_request(
    base: &BaseUris,
    page: &PageFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = bulk(base, &["lists"])?;
    page_query(page).apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn get_list_request(base: &BaseUris, list: &ListId) -> Result<HttpRequest, TransportError> {
    Ok(request(HttpMethod::Get, bulk(base, &["lists", list.as_str()])?))
}

pub(crate) fn update_list_request(
    base: &BaseUris,
    id: &ListId,
    list: &ContactsList,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Put, bulk(base, &["lists", id.as_str()])?).json(list)
}

pub(crate) fn delete_list_request(
    base: &BaseUris,
    list: &ListId,
) -> Result<HttpRequest, TransportError> {
    Ok(request(HttpMethod::Delete, bulk(base, &["lists", list.as_str()])?))
}

pub(crate) fn clear_list_request(
    base: &BaseUris,
    list: &ListId,
) -> Result<HttpRequest, TransportError> {
    Ok(request(
        HttpMethod::Post,
        bulk(base, &["lists", list.as_str(), "clear"])?,
    ))
}

pub(crate) fn fetch_list_request(
    base: &BaseUris,
    list: &ListId,
) -> Result<HttpRequest, TransportError> {
    Ok(request(
        HttpMethod::Post,
        bulk(base, &["lists", list.as_str(), "fetch"])?,
    ))
}

pub(crate) fn create_item_request(
    base: &BaseUris,
    list: &ListId,
    data: &Map<String, Value>,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Post, bulk(base, &["lists", list.as_str(), "items"])?)
        .json(&ItemWire { data })
}

pub(crate) fn list_items_request(
    base: &BaseUris,
    list: &ListId,
    page: &PageFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = bulk(base, &["lists", list.as_str(), "items"])?;
    page_query(page).apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn get_item_request(
    base: &BaseUris,
    list: &ListId,
    item: &ItemId,
) -> Result<HttpRequest, TransportError> {
    let url = bulk(base, &["lists", list.as_str(), "items", item.as_str()])?;
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn update_item_request(
    base: &BaseUris,
    list: &ListId,
    item: &ItemId,
    data: &Map<String, Value>,
) -> Result<HttpRequest, TransportError> {
    let url = bulk(base, &["lists", list.as_str(), "items", item.as_str()])?;
    request(HttpMethod::Put, url).json(&ItemWire { data })
}

pub(crate) fn delete_item_request(
    base: &BaseUris,
    list: &ListId,
    item: &ItemId,
) -> Result<HttpRequest, TransportError> {
    let url = bulk(base, &["lists", list.as_str(), "items", item.as_str()])?;
    Ok(request(HttpMethod::Delete, url))
}

pub(crate) fn download_items_request(
    base: &BaseUris,
    list: &ListId,
) -> Result<HttpRequest, TransportError> {
    let url = bulk(base, &["lists", list.as_str(), "items", "download"])?;
    Ok(request(HttpMethod::Get, url).accept("text/csv"))
}

pub(crate) fn upload_items_request(
    base: &BaseUris,
    list: &ListId,
    file_name: String,
    csv: Vec<u8>,
) -> Result<HttpRequest, TransportError> {
    let url = bulk(base, &["lists", list.as_str(), "items", "import"])?;
    let mut http = request(HttpMethod::Post, url);
    http.body = RequestBody::Multipart {
        field: "file",
        file_name,
        content_type: "text/csv",
        bytes: csv,
    };
    Ok(http)
}

pub(crate) fn list_events_request(
    base: &BaseUris,
    filter: &EventsFilter,
) -> Result<HttpRequest, TransportError> {
    let options = filter.options();
    let mut url = bulk(base, &["events"])?;
    page_query(filter.page())
        .opt("run_id", options.run_id.as_deref())
        .opt("invocation_id", options.invocation_id.as_deref())
        .opt("action_id", options.action_id.as_deref())
        .opt("trace_id", options.trace_id.as_deref())
        .opt("recipient_id", options.recipient_id.as_deref())
        .opt("src_ctx", options.src_ctx.as_deref())
        .opt("src_type", options.src_type.as_deref())
        .opt("start_date", options.start_date.map(format_instant))
        .opt("end_date", options.end_date.map(format_instant))
        .apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn decode_list(body: &[u8]) -> Result<ContactsList, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_lists_page(body: &[u8]) -> Result<HalPage<ListsEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_item(body: &[u8]) -> Result<ListItem, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_items_page(body: &[u8]) -> Result<HalPage<ItemsEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_upload(body: &[u8]) -> Result<UploadResponse, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_events_page(body: &[u8]) -> Result<HalPage<EventsEmbedded>, TransportError> {
    decode_json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortOrder;
    use crate::domain::proactive_connect::{
        ContactsListOptions, Datasource, EventsFilterOptions, PAGE_LIMITS, ProactiveEventType,
    };

    fn list_id() -> ListId {
        ListId::new("29192c4a-4058-49da-86c2-3e349d1065b7").unwrap()
    }

    fn json_body(request: &HttpRequest) -> String {
        match &request.body {
            RequestBody::Json(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn list_requests_target_eu_host() {
        let base = BaseUris::defaults().unwrap();
        let list = ContactsList::new(
            "Recipients",
            ContactsListOptions {
                tags: vec!["vip".to_owned(), "vip".to_owned()],
                datasource: Some(Datasource::Manual),
                ..Default::default()
            },
        )
        .unwrap();
        let http = create_list_request(&base, &list).unwrap();
        assert_eq!(http.url.as_str(), "https://api-eu.vonage.com/v0.1/bulk/lists");
        assert_eq!(
            json_body(&http),
            r#"{"name":"Recipients","tags":["vip"],"datasource":{"type":"manual"}}"#
        );

        let page = PageFilter::new(Some(2), Some(50), Some(SortOrder::Desc), PAGE_LIMITS).unwrap();
        let http = list_lists_request(&base, &page).unwrap();
        assert_eq!(
            http.url.as_str(),
            "https://api-eu.vonage.com/v0.1/bulk/lists?page=2&page_size=50&order=desc"
        );

        let http = clear_list_request(&base, &list_id()).unwrap();
        assert_eq!(http.method, HttpMethod::Post);
        assert!(http.url.path().ends_with("/clear"));
    }

    #[test]
    fn item_requests() {
        let base = BaseUris::defaults().unwrap();
        let mut data = Map::new();
        data.insert("phone".to_owned(), Value::from("447700900000"));
        let http = create_item_request(&base, &list_id(), &data).unwrap();
        assert_eq!(json_body(&http), r#"{"data":{"phone":"447700900000"}}"#);

        let http = download_items_request(&base, &list_id()).unwrap();
        assert!(http.headers.contains(&("Accept", "text/csv".to_owned())));
        assert!(!http.headers.contains(&("Accept", "application/json".to_owned())));

        let http = upload_items_request(&base, &list_id(), "items.csv".to_owned(), b"phone\n1".to_vec())
            .unwrap();
        assert!(http.url.path().ends_with("/items/import"));
        assert!(matches!(http.body, RequestBody::Multipart { field: "file", .. }));
    }

    #[test]
    fn events_query_and_lenient_decoding() {
        let filter = EventsFilter::new(EventsFilterOptions {
            page_size: Some(10),
            run_id: Some("run-1".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let http = list_events_request(&BaseUris::defaults().unwrap(), &filter).unwrap();
        assert_eq!(
            http.url.as_str(),
            "https://api-eu.vonage.com/v0.1/bulk/events?page_size=10&run_id=run-1"
        );

        let page = decode_events_page(
            br#"{"page":1,"_embedded":{"events":[
                {"id":"e1","type":"run-started"},
                {"id":"e2","type":"run-teleported"}
            ]}}"#,
        )
        .unwrap();
        let events = page.embedded.and_then(|e| e.events).unwrap();
        assert_eq!(events[0].kind, Some(ProactiveEventType::RunStarted));
        assert_eq!(events[1].kind, None);
    }
}
