pub(crate) mod answer_ledger;
pub(crate) mod attempt_manager;
pub(crate) mod authorization;
pub(crate) mod errors;
pub(crate) mod exam_registry;
pub(crate) mod exam_window;
pub(crate) mod scoring;
pub(crate) mod store;
