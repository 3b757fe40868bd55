pub mod sync;
pub mod validate;

/// How a run that got as far as execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    CompletedWithErrors,
}
