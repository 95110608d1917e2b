pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod logistic;

pub use classifier_trait::RiskPredictor;
pub use factory::load_predictor;
