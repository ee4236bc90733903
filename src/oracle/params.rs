use crate::error::ValidationErrors;

/// Validated inputs for one connection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    from: String,
    to: String,
    api_key: String,
}

impl QueryParameters {
    /// Validate and build query inputs.
    ///
    /// Every violation is reported, not just the first. An empty field yields
    /// `"<field> must be present"`; equal endpoints are reported against
    /// `from`.
    pub fn configure(
        from: impl Into<String>,
        to: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ValidationErrors> {
        let params = Self {
            from: from.into(),
            to: to.into(),
            api_key: api_key.into(),
        };

        let errors = params.validate();
        if errors.is_empty() {
            Ok(params)
        } else {
            Err(errors)
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        for (field, value) in [("from", &self.from), ("to", &self.to), ("api_key", &self.api_key)] {
            if value.trim().is_empty() {
                errors.add(field, format!("{} must be present", field));
            }
        }

        if self.from == self.to {
            errors.add("from", "From cannot be the same as To");
        }

        errors
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
