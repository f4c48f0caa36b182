//! Output format policy for enumerated fields
//!
//! Fields backed by a description table (cause codes, RAT types, PCO
//! protocol identifiers, ...) render in one of three modes: the raw
//! numeric code, the description text, or both. The mode is carried by
//! value in [`crate::Decoder`] rather than held in shared state, so
//! concurrent decodes with different modes never interfere.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Rendering mode for fields with a description table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// Raw numeric code
    #[default]
    Numeric,
    /// Description text only
    Text,
    /// Description text with the decimal code appended
    Mixed,
}

impl FormatMode {
    /// Lowercase name, matching the CLI flag values
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatMode::Numeric => "numeric",
            FormatMode::Text => "text",
            FormatMode::Mixed => "mixed",
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(FormatMode::Numeric),
            "text" => Ok(FormatMode::Text),
            "mixed" => Ok(FormatMode::Mixed),
            other => Err(format!(
                "invalid format mode '{other}': expected numeric, text or mixed"
            )),
        }
    }
}

/// A field rendered under a [`FormatMode`]
///
/// Serializes untagged, so numeric mode yields a JSON number and the
/// other modes a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormatValue {
    /// Raw code, numeric mode
    Code(u64),
    /// Description text, text and mixed modes
    Text(String),
}

impl FormatValue {
    /// Render `code` with its table `description` under `mode`
    pub fn render(mode: FormatMode, code: impl Into<u64>, description: &str) -> Self {
        let code = code.into();
        match mode {
            FormatMode::Numeric => FormatValue::Code(code),
            FormatMode::Text => FormatValue::Text(description.to_owned()),
            FormatMode::Mixed => FormatValue::Text(format!("{description} ({code})")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("numeric".parse::<FormatMode>(), Ok(FormatMode::Numeric));
        assert_eq!("text".parse::<FormatMode>(), Ok(FormatMode::Text));
        assert_eq!("mixed".parse::<FormatMode>(), Ok(FormatMode::Mixed));
        assert!("verbose".parse::<FormatMode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [FormatMode::Numeric, FormatMode::Text, FormatMode::Mixed] {
            assert_eq!(mode.to_string().parse::<FormatMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_render_modes() {
        assert_eq!(
            FormatValue::render(FormatMode::Numeric, 6u8, "EUTRAN"),
            FormatValue::Code(6)
        );
        assert_eq!(
            FormatValue::render(FormatMode::Text, 6u8, "EUTRAN"),
            FormatValue::Text("EUTRAN".to_owned())
        );
        assert_eq!(
            FormatValue::render(FormatMode::Mixed, 6u8, "EUTRAN"),
            FormatValue::Text("EUTRAN (6)".to_owned())
        );
    }

    #[test]
    fn test_serialize_untagged() {
        let code = serde_json::to_string(&FormatValue::Code(16)).unwrap();
        assert_eq!(code, "16");
        let text = serde_json::to_string(&FormatValue::Text("Request accepted".into())).unwrap();
        assert_eq!(text, "\"Request accepted\"");
    }
}
