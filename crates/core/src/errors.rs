use thiserror::Error;

/// Structural failures of the mining pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MiningError {
    #[error("no transactions to mine: the observation sequence is empty")]
    EmptyInput,
    #[error("no itemset reached the minimum support of {min_support}")]
    NoFrequentItemsets { min_support: f64 },
    #[error("invalid threshold `{name}` = {value}: {expected}")]
    InvalidThreshold { name: &'static str, value: f64, expected: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    Mining(#[from] MiningError),
    #[error("invalid item identifier `{0}` (expected `<service>_<category>`)")]
    InvalidItem(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<MiningError> for ApplicationError {
    fn from(value: MiningError) -> Self {
        Self::Domain(DomainError::Mining(value))
    }
}

impl ApplicationError {
    /// Stable machine-readable class used in operator-facing payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Mining(MiningError::EmptyInput)) => "empty_input",
            Self::Domain(DomainError::Mining(MiningError::NoFrequentItemsets { .. })) => {
                "no_frequent_itemsets"
            }
            Self::Domain(DomainError::Mining(MiningError::InvalidThreshold { .. })) => {
                "invalid_threshold"
            }
            Self::Domain(DomainError::InvalidItem(_)) => "invalid_item",
            Self::Input(_) => "input",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Input(_) | Self::Domain(DomainError::InvalidItem(_)) => 3,
            Self::Domain(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Fix the reported value and retry.",
            Self::Input(_) | Self::Domain(DomainError::InvalidItem(_)) => {
                "The input could not be processed. Check the file and arguments and try again."
            }
            Self::Domain(_) => "Rule mining could not complete with the given data and thresholds.",
        }
    }
}
