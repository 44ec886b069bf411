// Scripted classifier shared by the integration tests

use phishlens_client::{Classifier, ClientError, PredictResponse, RetrainResponse, Verdict};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedClassifier {
    predictions: Mutex<VecDeque<Result<PredictResponse, ClientError>>>,
    retrains: Mutex<VecDeque<Result<RetrainResponse, ClientError>>>,
    pub submitted: Mutex<Vec<String>>,
    pub retrain_calls: Mutex<usize>,
}

#[allow(dead_code)]
impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verdict(self, is_malicious: bool, confidence: f64, explanation: &[&str]) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .push_back(Ok(PredictResponse::Verdict(Verdict {
                is_malicious,
                confidence,
                explanation: explanation.iter().map(|s| s.to_string()).collect(),
            })));
        self
    }

    pub fn rejection(self, message: &str) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .push_back(Ok(PredictResponse::Rejected(message.to_string())));
        self
    }

    pub fn predict_failure(self) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Decode("not json".to_string())));
        self
    }

    pub fn retrain_message(self, message: &str) -> Self {
        self.retrains.lock().unwrap().push_back(Ok(RetrainResponse {
            message: message.to_string(),
        }));
        self
    }

    pub fn retrain_failure(self) -> Self {
        self.retrains
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Status(502)));
        self
    }
}

impl Classifier for ScriptedClassifier {
    async fn predict(&self, url: &str) -> Result<PredictResponse, ClientError> {
        self.submitted.lock().unwrap().push(url.to_string());
        self.predictions
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted prediction left")
    }

    async fn retrain(&self) -> Result<RetrainResponse, ClientError> {
        *self.retrain_calls.lock().unwrap() += 1;
        self.retrains
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted retrain left")
    }
}
