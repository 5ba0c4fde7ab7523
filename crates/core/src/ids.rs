#![forbid(unsafe_code)]

/// Owning-company identifier. Every store operation is scoped by one of
/// these; jobs never leak across companies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompanyId(String);

impl CompanyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, CompanyIdError> {
        let value = value.into();
        validate_company_id(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompanyIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    InvalidChar { ch: char, index: usize },
}

impl std::fmt::Display for CompanyIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "company id must not be empty"),
            Self::TooLong => write!(f, "company id is too long"),
            Self::InvalidFirstChar => {
                write!(f, "company id must start with an ascii alphanumeric")
            }
            Self::InvalidChar { ch, index } => {
                write!(f, "company id has invalid char {ch:?} at index {index}")
            }
        }
    }
}

impl std::error::Error for CompanyIdError {}

fn validate_company_id(value: &str) -> Result<(), CompanyIdError> {
    if value.is_empty() {
        return Err(CompanyIdError::Empty);
    }
    if value.len() > 128 {
        return Err(CompanyIdError::TooLong);
    }
    let Some(first) = value.chars().next() else {
        return Err(CompanyIdError::Empty);
    };
    if !first.is_ascii_alphanumeric() {
        return Err(CompanyIdError::InvalidFirstChar);
    }
    for (index, ch) in value.chars().enumerate() {
        if index == 0 {
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            continue;
        }
        return Err(CompanyIdError::InvalidChar { ch, index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_ids() {
        assert!(CompanyId::try_new("co_123").is_ok());
        assert!(CompanyId::try_new("acme.field-services").is_ok());
    }

    #[test]
    fn rejects_bad_ids() {
        assert_eq!(CompanyId::try_new("").unwrap_err(), CompanyIdError::Empty);
        assert_eq!(
            CompanyId::try_new("_leading").unwrap_err(),
            CompanyIdError::InvalidFirstChar
        );
        assert!(matches!(
            CompanyId::try_new("bad id").unwrap_err(),
            CompanyIdError::InvalidChar { ch: ' ', index: 3 }
        ));
    }
}
