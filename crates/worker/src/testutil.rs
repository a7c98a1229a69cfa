//! Test support: scripted network, recording host, and a worker rig
//! over the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cachet_client::{FetchError, FetchedResponse, Network};
use cachet_core::{CacheStore, MemoryStore, StoredResponse, WorkerConfig};
use url::Url;

use crate::host::Host;
use crate::worker::Worker;

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, body: Vec<u8>, content_type: String, final_url: Option<String> },
    Fail,
}

/// Scripted network. Unrouted URLs fail like an offline host.
#[derive(Default)]
pub struct MockNet {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a URL to a 200 text/html response.
    pub fn ok(&self, url: &str, body: &[u8]) {
        self.status(url, 200, body);
    }

    /// Route a URL to a response with the given status.
    pub fn status(&self, url: &str, status: u16, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond {
                status,
                body: body.to_vec(),
                content_type: "text/html".into(),
                final_url: None,
            },
        );
    }

    /// Route a URL to a 200 application/json response.
    pub fn json(&self, url: &str, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond {
                status: 200,
                body: body.to_vec(),
                content_type: "application/json".into(),
                final_url: None,
            },
        );
    }

    /// Route a URL to a 200 that landed on a different final URL.
    pub fn moved(&self, url: &str, final_url: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond {
                status: 200,
                body: b"moved".to_vec(),
                content_type: "text/html".into(),
                final_url: Some(final_url.to_string()),
            },
        );
    }

    /// Route a URL to a network failure.
    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for MockNet {
    async fn fetch(&self, url: &Url) -> Result<FetchedResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let route = self.routes.lock().unwrap().get(url.as_str()).cloned();
        match route {
            Some(Route::Respond { status, body, content_type, final_url }) => {
                let final_url = match final_url {
                    Some(u) => Url::parse(&u).unwrap(),
                    None => url.clone(),
                };
                Ok(FetchedResponse {
                    url: url.clone(),
                    final_url,
                    status,
                    content_type: Some(content_type.clone()),
                    headers: vec![("content-type".into(), content_type)],
                    bytes: Bytes::from(body),
                    fetch_ms: 1,
                })
            }
            Some(Route::Fail) | None => Err(FetchError::Network("connection refused".into())),
        }
    }
}

/// Host that counts claims and records opened windows.
#[derive(Default)]
pub struct RecordingHost {
    claims: Mutex<u32>,
    opened: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn claims(&self) -> u32 {
        *self.claims.lock().unwrap()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Host for RecordingHost {
    fn claim_clients(&self) {
        *self.claims.lock().unwrap() += 1;
    }

    fn open_window(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

/// A worker over the in-memory store with handles to its collaborators.
pub struct Rig {
    pub worker: Worker,
    pub store: MemoryStore,
    pub net: Arc<MockNet>,
    pub host: Arc<RecordingHost>,
}

/// Build a worker rig from the default config and the given network.
pub fn rig(net: MockNet) -> Rig {
    rig_with_config(WorkerConfig::default(), net)
}

pub fn rig_with_config(config: WorkerConfig, net: MockNet) -> Rig {
    let store = MemoryStore::new();
    let net = Arc::new(net);
    let host = Arc::new(RecordingHost::default());
    let worker = Worker::new(config, Arc::new(store.clone()), net.clone(), host.clone())
        .expect("test config must be valid");
    Rig { worker, store, net, host }
}

/// A network scripted with 200s for every default preload path.
pub fn preloaded_net() -> MockNet {
    let net = MockNet::new();
    net.ok("https://mycitynews.ca/", b"<html>home</html>");
    net.ok("https://mycitynews.ca/index.html", b"<html>index</html>");
    net.ok("https://mycitynews.ca/ad-redirect.html", b"<html>ads</html>");
    net.json("https://mycitynews.ca/articles.json", br#"{"articles":[]}"#);
    net.json("https://mycitynews.ca/manifest.json", br#"{"name":"MyCityNews"}"#);
    net
}

/// Poll the store until the detached cache write lands, or give up.
pub async fn wait_for_entry(store: &MemoryStore, cache: &str, key: &str) -> Option<StoredResponse> {
    for _ in 0..100 {
        if let Some(entry) = store.get(cache, key).await.unwrap() {
            return Some(entry);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    None
}
