use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("trigger already registered: {0}")]
    DuplicateTrigger(String),

    #[error("input parameter declared twice on trigger '{trigger}': {parameter}")]
    DuplicateInput { trigger: String, parameter: String },

    #[error("path error: {0}")]
    Path(#[from] blobbind_path::PathError),

    #[error("store error: {0}")]
    Store(#[from] blobbind_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type TriggerResult<T> = Result<T, TriggerError>;
