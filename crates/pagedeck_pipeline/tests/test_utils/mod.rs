//! Scripted service used by the pipeline tests.
//!
//! [`Harness::happy`] answers every call and exchange the way a healthy
//! backend would; tests then override individual routes or scripts.

#![allow(dead_code)]

use pagedeck_client::testing::{MockTransport, Script, ScriptedConnector};
use pagedeck_client::{AlaiApi, Credentials, Method};
use pagedeck_pipeline::{Pipeline, RunRequest, RunRequestBuilder};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const SHARE_CODE: &str = "CODE123";

pub struct Harness {
    pub transport: MockTransport,
    pub connector: ScriptedConnector,
    pub dir: TempDir,
}

impl Harness {
    /// Transport and connector with no routes or scripts.
    pub fn empty() -> Self {
        Self {
            transport: MockTransport::new(),
            connector: ScriptedConnector::new(),
            dir: TempDir::new().expect("tempdir"),
        }
    }

    /// Every call succeeds; three slides arrive in order 3, 1, 2.
    pub fn happy() -> Self {
        let harness = Self::empty();
        harness.route_auth();
        harness.route_presentation();
        harness.route_questions(3);
        harness.route_late_steps();
        harness.script_outline(vec![
            json!({"slide_title": "Intro", "slide_order": 0, "layout_hint": "hero"}),
            json!({"slide_title": "Body", "slide_order": 1}),
        ]);
        harness.script_slides(&[3, 1, 2]);
        for order in [1, 2, 3] {
            harness.script_variant_ok(order);
        }
        harness
    }

    pub fn route_auth(&self) {
        self.transport
            .respond(Method::Post, "/auth/v1/token", 200, r#"{"access_token":"tok"}"#);
    }

    pub fn route_presentation(&self) {
        self.transport
            .respond(Method::Get, "/get-presentations-list", 200, r#"[{"id":"existing"}]"#)
            .respond(Method::Post, "/create-new-presentation", 200, r#"{"created":true}"#)
            .respond(
                Method::Get,
                "/get-presentation/",
                200,
                r#"{"slides":[{"id":"primary-slide"}]}"#,
            );
    }

    pub fn route_questions(&self, count: usize) {
        let questions: Vec<Value> = (0..count)
            .map(|i| json!({"question": format!("q{}", i)}))
            .collect();
        self.transport.respond(
            Method::Get,
            "/get-presentation-questions/",
            200,
            Value::Array(questions).to_string(),
        );
    }

    pub fn route_late_steps(&self) {
        self.transport
            .respond(Method::Post, "/get-calibration-sample-text", 200, r#"{"sample":"s"}"#)
            .respond(Method::Post, "/set-active-variant", 200, "")
            .respond(Method::Post, "/update-slide-entity", 200, r#"{"ok":true}"#)
            .respond(
                Method::Post,
                "/upsert-presentation-share",
                200,
                format!("\"{}\"", SHARE_CODE),
            );
    }

    pub fn script_outline(&self, messages: Vec<Value>) {
        self.connector
            .script("generate-slides-outline", Script::messages(messages));
    }

    /// Create-slides reply carrying `records` verbatim as its slides.
    pub fn script_slide_records(&self, records: Vec<Value>) {
        self.connector.script(
            "create-slides-from-outlines",
            Script::messages([json!({"slides": records})]),
        );
    }

    pub fn script_slides(&self, orders: &[i64]) {
        let slides: Vec<Value> = orders
            .iter()
            .map(|order| {
                json!({
                    "id": format!("s{}", order),
                    "slide_order": order,
                    "slide_outline": {
                        "slide_title": format!("Slide {}", order),
                        "slide_context": format!("context {}", order),
                        "slide_instructions": null
                    }
                })
            })
            .collect();
        self.connector.script(
            "create-slides-from-outlines",
            Script::messages([json!({"slides": slides})]),
        );
    }

    pub fn script_variant_ok(&self, order: i64) {
        self.connector.script(
            "create-and-stream-slide-variants",
            Script::messages([
                json!({"id": format!("s{}", order), "entity": true}),
                json!({"id": format!("v{}", order), "layout": "grid"}),
            ]),
        );
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            AlaiApi::new(Arc::new(self.transport.clone())),
            Arc::new(self.connector.clone()),
            Credentials {
                api_key: "key".to_string(),
                email: "user@example.com".to_string(),
                password: "pw".to_string(),
            },
        )
        .with_audit_dir(self.dir.path())
    }

    pub fn request(&self, images: Vec<PathBuf>) -> RunRequest {
        RunRequestBuilder::default()
            .content("Scraped article text")
            .instructions("Make five slides. ")
            .image_paths(images)
            .build()
            .expect("valid request")
    }

    /// The single audit document written into the harness directory.
    pub fn audit_document(&self) -> Value {
        let path = audit_files(self.dir.path())
            .into_iter()
            .next()
            .expect("audit file written");
        let body = std::fs::read_to_string(path).expect("read audit file");
        serde_json::from_str(&body).expect("audit file is json")
    }

    /// JSON sent on the n-th session to an endpoint containing `fragment`.
    pub fn sent(&self, fragment: &str, n: usize) -> Value {
        let sessions = self.connector.sessions_to(fragment);
        serde_json::from_str(&sessions[n].sent[0]).expect("sent json")
    }
}

pub fn audit_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("presentation_responses_") && n.ends_with(".json"))
        })
        .collect()
}

pub fn steps(document: &Value) -> Vec<String> {
    document["responses"]
        .as_array()
        .expect("responses array")
        .iter()
        .map(|entry| entry["step"].as_str().unwrap_or_default().to_string())
        .collect()
}
