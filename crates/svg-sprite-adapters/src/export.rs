//! Supported export flavors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::preact::PreactAdapter;
use crate::react::ReactAdapter;
use crate::traits::{AdapterError, FrameworkAdapter};
use crate::vanilla::VanillaAdapter;
use crate::vue::VueAdapter;

/// The closed set of UI targets a generated module can export for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    #[default]
    Vanilla,
    React,
    Preact,
    Vue,
}

impl ExportType {
    pub const ALL: [ExportType; 4] = [
        ExportType::Vanilla,
        ExportType::React,
        ExportType::Preact,
        ExportType::Vue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportType::Vanilla => "vanilla",
            ExportType::React => "react",
            ExportType::Preact => "preact",
            ExportType::Vue => "vue",
        }
    }

    /// The adapter implementing this export type.
    pub fn adapter(self) -> &'static dyn FrameworkAdapter {
        match self {
            ExportType::Vanilla => &VanillaAdapter,
            ExportType::React => &ReactAdapter,
            ExportType::Preact => &PreactAdapter,
            ExportType::Vue => &VueAdapter,
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AdapterError::InvalidExportType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!("vanilla".parse::<ExportType>().unwrap(), ExportType::Vanilla);
        assert_eq!("react".parse::<ExportType>().unwrap(), ExportType::React);
        assert_eq!("preact".parse::<ExportType>().unwrap(), ExportType::Preact);
        assert_eq!("vue".parse::<ExportType>().unwrap(), ExportType::Vue);
    }

    #[test]
    fn rejects_unknown_types() {
        let err = "svelte".parse::<ExportType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid export type: svelte");
    }

    #[test]
    fn defaults_to_vanilla() {
        assert_eq!(ExportType::default(), ExportType::Vanilla);
    }

    #[test]
    fn every_type_has_a_matching_adapter() {
        for export_type in ExportType::ALL {
            assert_eq!(export_type.adapter().export_type(), export_type);
            assert_eq!(export_type.adapter().name(), export_type.as_str());
        }
    }
}
