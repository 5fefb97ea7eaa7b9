mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use common::{json_response, serve_script, CapturedRequest};
use infoblox_azure_setup::{
    discover, ArmClient, DiscoveryMode, Error, StaticTokenCredential, TokenCredential,
};
use serde_json::json;
use std::io::Write;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

fn arm_client(base_url: &str, token: &str) -> ArmClient {
    let credential: Arc<dyn TokenCredential> = Arc::new(StaticTokenCredential::new(token));
    ArmClient::builder(base_url)
        .expect("builder")
        .credential(credential)
        .build()
        .expect("client")
}

fn jwt_with_tid(tid: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"tid":"{tid}"}}"#));
    format!("eyJhbGciOiJSUzI1NiJ9.{payload}.c2ln")
}

fn subscriptions_page(tenant_id: Option<&str>) -> String {
    let mut sub = json!({
        "subscriptionId": "aaaa-1",
        "displayName": "sub-A",
        "state": "Enabled"
    });
    if let Some(tenant_id) = tenant_id {
        sub["tenantId"] = json!(tenant_id);
    }
    json!({ "value": [sub] }).to_string()
}

#[test]
fn tenant_comes_from_token_claims_first() {
    let responses = vec![json_response(
        "200 OK",
        &subscriptions_page(Some("tenant-meta")),
    )];
    let (base_url, _rx, handle) = serve_script(responses);

    let token = jwt_with_tid("tenant-from-token");
    let context = discover(&arm_client(&base_url, &token), None).expect("context");
    assert_eq!(context.tenant_id, "tenant-from-token");
    assert_eq!(context.mode, DiscoveryMode::AutoDiscover);
    assert_eq!(context.subscriptions.len(), 1);

    handle.join().expect("server");
}

#[test]
fn undecodable_token_falls_back_to_subscription_metadata() {
    let responses = vec![json_response(
        "200 OK",
        &subscriptions_page(Some("tenant-meta")),
    )];
    let (base_url, _rx, handle) = serve_script(responses);

    let context = discover(&arm_client(&base_url, "not-a-jwt"), None).expect("context");
    assert_eq!(context.tenant_id, "tenant-meta");

    handle.join().expect("server");
}

#[test]
fn unresolvable_tenant_is_fatal() {
    let responses = vec![json_response("200 OK", &subscriptions_page(None))];
    let (base_url, _rx, handle) = serve_script(responses);

    let err = discover(&arm_client(&base_url, "not-a-jwt"), None).unwrap_err();
    assert!(matches!(err, Error::TenantUnresolved));

    handle.join().expect("server");
}

#[test]
fn empty_subscription_list_is_fatal() {
    let responses = vec![json_response("200 OK", r#"{"value":[]}"#)];
    let (base_url, _rx, handle) = serve_script(responses);

    let err = discover(&arm_client(&base_url, "not-a-jwt"), None).unwrap_err();
    assert!(matches!(err, Error::NoSubscriptions));

    handle.join().expect("server");
}

#[test]
fn subscription_listing_follows_next_link() {
    let (base_url, rx, handle) = serve_paged_subscriptions();

    let token = jwt_with_tid("tenant-1");
    let context = discover(&arm_client(&base_url, &token), None).expect("context");
    assert_eq!(context.subscriptions.len(), 2);
    assert_eq!(context.subscriptions[0].subscription_id, "aaaa-1");
    assert_eq!(context.subscriptions[1].subscription_id, "bbbb-2");

    handle.join().expect("server");
    let requests: Vec<CapturedRequest> = rx.try_iter().collect();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].path, "/page-two");
}

/// Two-page subscription listing; the listener is bound first so the
/// first page's `nextLink` can name the mock's own address.
fn serve_paged_subscriptions() -> (String, Receiver<CapturedRequest>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));

    let page_one = json!({
        "value": [{ "subscriptionId": "aaaa-1", "displayName": "sub-A", "state": "Enabled" }],
        "nextLink": format!("{base_url}/page-two?api-version=2020-08-01")
    })
    .to_string();
    let page_two = json!({
        "value": [{ "subscriptionId": "bbbb-2", "displayName": "sub-B", "state": "Enabled" }]
    })
    .to_string();
    let responses = vec![
        json_response("200 OK", &page_one),
        json_response("200 OK", &page_two),
    ];

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let req = common::read_request(&mut stream);
            let _ = tx.send(req);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (base_url, rx, handle)
}
