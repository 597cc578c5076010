use std::fmt;

use misra_report::SeverityMapping;
use serde::Deserialize;

use crate::helper::Language;

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Configuration {
    #[serde(default, rename = "cppcheck-misra")]
    pub(crate) cppcheck_misra: Settings,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Settings {
    pub(crate) cppcheck_path: String,
    pub(crate) c_std: String,
    pub(crate) cpp_std: String,
    pub(crate) enable: String,
    pub(crate) check_level: String,
    pub(crate) platform: String,
    pub(crate) force: bool,
    pub(crate) max_configs: Verbatim,
    pub(crate) safety: bool,
    pub(crate) jobs: Verbatim,
    pub(crate) suppress_missing_include_system: bool,
    pub(crate) c_report_type: String,
    pub(crate) cpp_report_type: String,
    pub(crate) severity_mapping: SeverityLevels,
    pub(crate) enable_on_save: bool,

    // Flattened spellings some clients send instead of a nested object.
    #[serde(rename = "severityMapping.mandatory")]
    pub(crate) mandatory_level: Option<String>,
    #[serde(rename = "severityMapping.required")]
    pub(crate) required_level: Option<String>,
    #[serde(rename = "severityMapping.advisory")]
    pub(crate) advisory_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cppcheck_path: "cppcheck".into(),
            c_std: "c99".into(),
            cpp_std: "c++17".into(),
            enable: "all".into(),
            check_level: "exhaustive".into(),
            platform: "unix32".into(),
            force: true,
            max_configs: Verbatim::from(64),
            safety: true,
            jobs: Verbatim::from(4),
            suppress_missing_include_system: true,
            c_report_type: DEFAULT_C_REPORT_TYPE.into(),
            cpp_report_type: DEFAULT_CPP_REPORT_TYPE.into(),
            severity_mapping: SeverityLevels::default(),
            enable_on_save: true,
            mandatory_level: None,
            required_level: None,
            advisory_level: None,
        }
    }
}

/// A numeric option handed to the tool as written, negative or fractional
/// values and strings included.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub(crate) enum Verbatim {
    Number(serde_json::Number),
    Text(String),
}

impl From<u32> for Verbatim {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl fmt::Display for Verbatim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

const DEFAULT_C_REPORT_TYPE: &str = "misra-c-2012";
const DEFAULT_CPP_REPORT_TYPE: &str = "misra-cpp-2023";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub(crate) struct SeverityLevels {
    pub(crate) mandatory: String,
    pub(crate) required: String,
    pub(crate) advisory: String,
}

impl Default for SeverityLevels {
    fn default() -> Self {
        Self {
            mandatory: "error".into(),
            required: "warning".into(),
            advisory: "information".into(),
        }
    }
}

impl Settings {
    pub(crate) fn std(&self, language: Language) -> &str {
        match language {
            Language::C => &self.c_std,
            Language::Cpp => &self.cpp_std,
        }
    }

    /// An empty override means the language default.
    pub(crate) fn report_type(&self, language: Language) -> &str {
        let (configured, default) = match language {
            Language::C => (&self.c_report_type, DEFAULT_C_REPORT_TYPE),
            Language::Cpp => (&self.cpp_report_type, DEFAULT_CPP_REPORT_TYPE),
        };
        if configured.is_empty() {
            default
        } else {
            configured.as_str()
        }
    }

    pub(crate) fn severity_mapping(&self) -> SeverityMapping {
        let levels = &self.severity_mapping;
        SeverityMapping::from_names(
            self.mandatory_level.as_deref().unwrap_or(&levels.mandatory),
            self.required_level.as_deref().unwrap_or(&levels.required),
            self.advisory_level.as_deref().unwrap_or(&levels.advisory),
        )
    }
}
