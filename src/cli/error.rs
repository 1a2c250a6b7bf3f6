//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } | InfraError::Prompt { .. } => crate::exitcode::IOERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(DomainError::InvalidMultiplier { .. }) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(DomainError::InvalidCount { .. })
                    | ApplicationError::MalformedDocument { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ElementKind;
    use std::path::PathBuf;

    #[test]
    fn given_data_errors_when_mapping_exit_code_then_dataerr() {
        let invalid: CliError = ApplicationError::Domain(DomainError::InvalidCount {
            kind: ElementKind::Block,
            value: "1,2".into(),
            reason: "block counts cannot be ranges".into(),
        })
        .into();
        let malformed: CliError = ApplicationError::MalformedDocument {
            path: PathBuf::from("loot.xml"),
            position: 3,
            message: "bad".into(),
        }
        .into();

        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(malformed.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_other_errors_when_mapping_exit_code_then_matching_codes() {
        let config: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        let prompt = CliError::Infra(InfraError::Prompt {
            message: "eof".into(),
        });

        assert_eq!(config.exit_code(), crate::exitcode::CONFIG);
        assert_eq!(prompt.exit_code(), crate::exitcode::IOERR);
        assert_eq!(
            CliError::InvalidArgs("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
