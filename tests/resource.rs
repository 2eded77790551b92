mod common;

use common::*;
use crowbar_api::{Error, Resource, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    #[serde(default)]
    alive: bool,
}

impl Resource for Node {
    fn api_name() -> &'static str {
        "nodes"
    }

    fn id(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        let id = id
            .parse()
            .map_err(|_| Error::InvalidId(id.to_string()))?;
        self.id = Some(id);
        Ok(())
    }
}

fn node(id: i64, name: &str, alive: bool) -> Node {
    Node { id: Some(id), name: name.to_string(), alive }
}

#[tokio::test]
async fn list_and_match() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "admin", "alive": true},
            {"id": 2, "name": "worker", "alive": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/nodes/match"))
        .and(body_json(json!({"alive": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "admin", "alive": true}])))
        .mount(&server)
        .await;

    let nodes: Vec<Node> = session.list().await.unwrap();
    assert_eq!(nodes, vec![node(1, "admin", true), node(2, "worker", false)]);

    let alive: Vec<Node> = session.matching(&json!({"alive": true})).await.unwrap();
    assert_eq!(alive, vec![node(1, "admin", true)]);
}

#[tokio::test]
async fn sample_read_create() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/nodes/sample"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "", "alive": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/nodes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "name": "five", "alive": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/nodes"))
        .and(body_json(json!({"name": "new", "alive": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9, "name": "new.example.com", "alive": false})))
        .mount(&server)
        .await;

    let sample: Node = session.sample().await.unwrap();
    assert_eq!(sample, Node::default());

    let mut five = Node::default();
    five.set_id("5").unwrap();
    session.read(&mut five).await.unwrap();
    assert_eq!(five, node(5, "five", true));

    let mut created = Node { name: "new".into(), ..Default::default() };
    session.create(&mut created).await.unwrap();
    assert_eq!(created, node(9, "new.example.com", false));
}

#[tokio::test]
async fn update_patch_destroy() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/nodes/3"))
        .and(body_json(json!({"id": 3, "name": "three", "alive": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "three", "alive": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v2/nodes/3"))
        .and(body_json(json!([{"op": "replace", "path": "/alive", "value": false}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "three", "alive": false})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/nodes/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut three = node(3, "three", true);
    session.update(&mut three).await.unwrap();

    let patch = json!([{"op": "replace", "path": "/alive", "value": false}]);
    session.apply_patch(&mut three, &patch).await.unwrap();
    assert!(!three.alive);

    session.destroy(&three).await.unwrap();
}

#[tokio::test]
async fn missing_id_is_rejected_locally() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    let mut unsaved = Node { name: "draft".into(), ..Default::default() };
    assert!(matches!(session.read(&mut unsaved).await, Err(Error::MissingId("nodes"))));
    assert!(matches!(session.destroy(&unsaved).await, Err(Error::MissingId("nodes"))));

    // only the bootstrap probe reached the server
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
