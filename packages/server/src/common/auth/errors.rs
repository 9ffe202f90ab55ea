use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Approver access required")]
    ApproverRequired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}
