use thiserror::Error;

/// Rejected calculator input, named by its command-line flag.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("--{arg} must be {requirement}")]
    OutOfRange {
        arg: &'static str,
        requirement: &'static str,
    },

    #[error("--{arg} is required")]
    Missing { arg: &'static str },

    #[error("--{arg} must be a finite number")]
    NotFinite { arg: &'static str },

    #[error("invalid debt `{spec}`: {reason}")]
    Debt { spec: String, reason: String },

    #[error("invalid --{arg} `{item}`: {reason}")]
    Item {
        arg: &'static str,
        item: String,
        reason: String,
    },

    #[error("--{arg} must be >= --{other}")]
    Ordering {
        arg: &'static str,
        other: &'static str,
    },
}

impl InputError {
    pub fn out_of_range(arg: &'static str, requirement: &'static str) -> Self {
        InputError::OutOfRange { arg, requirement }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_flag() {
        assert_eq!(
            InputError::out_of_range("annual-rate", "between 0 and 100").to_string(),
            "--annual-rate must be between 0 and 100"
        );
        assert_eq!(
            InputError::Ordering {
                arg: "retirement-age",
                other: "current-age"
            }
            .to_string(),
            "--retirement-age must be >= --current-age"
        );
        assert_eq!(
            InputError::Item {
                arg: "lot",
                item: "10".to_string(),
                reason: "expected price:shares".to_string(),
            }
            .to_string(),
            "invalid --lot `10`: expected price:shares"
        );
    }
}
