#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crmkit_api_client::ApiClient;
use crmkit_core::{Notice, NoticeLevel, Notifier, PipelineConfig};
use crmkit_upload::{UploadEvent, UploadPipeline, UploadTask};

/// Notifier that keeps every notice for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn config_from(pairs: &[(&str, &str)]) -> PipelineConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    PipelineConfig::from_lookup(|key| vars.get(key).cloned())
}

/// Pipeline over `config` with a recording notifier
pub fn setup_pipeline(config: PipelineConfig) -> (UploadPipeline, Arc<RecordingNotifier>) {
    let client = ApiClient::new(Duration::from_secs(10)).unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = UploadPipeline::new(client, config).with_notifier(notifier.clone());
    (pipeline, notifier)
}

/// Everything a task emitted, in order
pub struct Outcome {
    pub progress: Vec<u8>,
    pub terminals: Vec<UploadEvent>,
}

impl Outcome {
    pub fn terminal(&self) -> &UploadEvent {
        assert_eq!(self.terminals.len(), 1, "expected exactly one terminal event");
        &self.terminals[0]
    }
}

pub async fn drain(mut task: UploadTask) -> Outcome {
    let mut progress = Vec::new();
    let mut terminals = Vec::new();
    while let Some(event) = task.next_event().await {
        match event {
            UploadEvent::Progress(p) => {
                assert!(terminals.is_empty(), "progress after terminal event");
                progress.push(p.percent_complete);
            }
            other => terminals.push(other),
        }
    }
    Outcome {
        progress,
        terminals,
    }
}

/// Address of a server that accepts connections and never answers
pub async fn stalled_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}
