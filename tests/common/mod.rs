#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use image::DynamicImage;
use ocr_agent::api;
use ocr_agent::domain::{Agent, DomainError, TextRecognizer};
#[cfg(feature = "email")]
use ocr_agent::domain::{EmailMessage, Notifier};
use ocr_agent::{AppState, Config};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----ocr-agent-test-boundary";

pub fn test_config() -> Config {
    let vars: HashMap<String, String> = [
        ("SMTP_SERVER", "smtp.test.local"),
        ("SMTP_PORT", "587"),
        ("EMAIL_USER", "bot@test.local"),
        ("EMAIL_PASSWORD", "super-secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Config::from_map(&vars).expect("test config")
}

/// Recognizer returning a fixed outcome.
pub struct StubRecognizer(Result<String, DomainError>);

impl StubRecognizer {
    pub fn text(text: &str) -> Self {
        Self(Ok(text.to_string()))
    }

    pub fn failing(msg: &str) -> Self {
        Self(Err(DomainError::Ocr(msg.to_string())))
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, DomainError> {
        self.0.clone()
    }
}

/// Agent returning a fixed outcome and recording every prompt.
pub struct StubAgent {
    answer: Result<String, DomainError>,
    prompts: Mutex<Vec<String>>,
}

impl StubAgent {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            answer: Err(DomainError::Agent(msg.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn run(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }
}

/// Notifier with a fixed delivery result and connection check outcome.
#[cfg(feature = "email")]
pub struct StubNotifier {
    delivers: bool,
    connection: Result<(), DomainError>,
    sent: Mutex<Vec<EmailMessage>>,
}

#[cfg(feature = "email")]
impl StubNotifier {
    pub fn delivering() -> Self {
        Self {
            delivers: true,
            connection: Ok(()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn broken(msg: &str) -> Self {
        Self {
            delivers: false,
            connection: Err(DomainError::Email(msg.to_string())),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(feature = "email")]
#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, message: EmailMessage) -> bool {
        self.sent.lock().unwrap().push(message);
        self.delivers
    }

    async fn check_connection(&self) -> Result<(), DomainError> {
        self.connection.clone()
    }
}

#[cfg(feature = "email")]
pub type NotifierSlot = Arc<StubNotifier>;
#[cfg(not(feature = "email"))]
pub type NotifierSlot = ();

pub struct TestApp {
    pub router: Router,
    pub agent: Arc<StubAgent>,
    pub notifier: NotifierSlot,
}

impl TestApp {
    pub fn new(recognizer: StubRecognizer, agent: StubAgent) -> Self {
        #[cfg(feature = "email")]
        let notifier = Arc::new(StubNotifier::delivering());
        #[cfg(not(feature = "email"))]
        let notifier = ();

        Self::assemble(recognizer, agent, notifier)
    }

    #[cfg(feature = "email")]
    pub fn with_notifier(notifier: StubNotifier) -> Self {
        Self::assemble(
            StubRecognizer::text("unused"),
            StubAgent::answering("unused"),
            Arc::new(notifier),
        )
    }

    fn assemble(recognizer: StubRecognizer, agent: StubAgent, notifier: NotifierSlot) -> Self {
        let agent = Arc::new(agent);
        let state = AppState {
            config: Arc::new(test_config()),
            recognizer: Arc::new(recognizer),
            agent: agent.clone(),
            #[cfg(feature = "email")]
            notifier: notifier.clone(),
        };

        Self {
            router: api::api_router(state),
            agent,
            notifier,
        }
    }
}

/// One part of a multipart/form-data body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]))
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A TCP server that accepts connections and never writes a byte.
pub async fn silent_server() -> (u16, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (port, handle)
}
