//! MISRA obligation tiers and the severity levels they are mapped to.

use std::fmt;

/// Obligation tier of a MISRA rule, as tagged in the tool's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Obligation {
    Mandatory,
    Required,
    Advisory,
}

impl Obligation {
    /// Looks for `[Mandatory]`, `[Required]` and `[Advisory]` in that order.
    pub fn classify(message: &str) -> Option<Self> {
        [Self::Mandatory, Self::Required, Self::Advisory]
            .into_iter()
            .find(|obligation| message.contains(obligation.marker()))
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Mandatory => "[Mandatory]",
            Self::Required => "[Required]",
            Self::Advisory => "[Advisory]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warning,
    Information,
    Hint,
}

impl Level {
    /// Unknown names fall back to [`Level::Warning`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "information" => Self::Information,
            "hint" => Self::Hint,
            _ => Self::Warning,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeverityMapping {
    pub mandatory: Level,
    pub required: Level,
    pub advisory: Level,
}

impl Default for SeverityMapping {
    fn default() -> Self {
        Self {
            mandatory: Level::Error,
            required: Level::Warning,
            advisory: Level::Information,
        }
    }
}

impl SeverityMapping {
    pub fn from_names(mandatory: &str, required: &str, advisory: &str) -> Self {
        Self {
            mandatory: Level::from_name(mandatory),
            required: Level::from_name(required),
            advisory: Level::from_name(advisory),
        }
    }

    pub fn level(&self, obligation: Obligation) -> Level {
        match obligation {
            Obligation::Mandatory => self.mandatory,
            Obligation::Required => self.required,
            Obligation::Advisory => self.advisory,
        }
    }

    /// Messages without an obligation marker are always warnings.
    pub fn severity(&self, message: &str) -> Level {
        Obligation::classify(message)
            .map_or(Level::Warning, |obligation| self.level(obligation))
    }
}
