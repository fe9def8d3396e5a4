//! In-memory transport recording every request, for façade tests.

use std::error::Error as StdError;
use std::sync::{Arc, Mutex};

use super::{BoxFuture, Credentials, HttpResponse, HttpTransport, VonageClient};
use crate::transport::{BaseUris, HttpRequest, RequestBody};

#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

#[derive(Debug)]
struct FakeTransportState {
    requests: Vec<HttpRequest>,
    response: Result<HttpResponse, String>,
}

impl FakeTransport {
    pub(crate) fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with(Ok(HttpResponse {
            status,
            body: body.into(),
        }))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with(Err(message.to_owned()))
    }

    fn with(response: Result<HttpResponse, String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                requests: Vec::new(),
                response,
            })),
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.state
            .lock()
            .unwrap()
            .requests
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.last_request()
            .headers
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn json_body(&self) -> serde_json::Value {
        match self.last_request().body {
            RequestBody::Json(bytes) => serde_json::from_slice(&bytes).unwrap(),
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }

    pub(crate) fn form_param(&self, key: &str) -> Option<String> {
        match self.last_request().body {
            RequestBody::Form(params) => params
                .into_iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            other => panic!("expected a form body, got {other:?}"),
        }
    }
}

impl HttpTransport for FakeTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.response.clone().map_err(Into::into)
        })
    }
}

pub(crate) fn make_client(credentials: Credentials, transport: FakeTransport) -> VonageClient {
    VonageClient {
        credentials,
        base: BaseUris::defaults().unwrap(),
        http: Arc::new(transport),
    }
}
