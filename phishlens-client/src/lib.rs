pub mod client;
pub mod error;
pub mod response;

pub use client::{Classifier, ClassifierClient};
pub use error::ClientError;
pub use response::{PredictResponse, RetrainResponse, Verdict};
