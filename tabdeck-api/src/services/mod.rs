//! Outbound service clients

pub mod classifier;

pub use classifier::{Classification, Classifier, ClassifierError, OpenAiClassifier};
