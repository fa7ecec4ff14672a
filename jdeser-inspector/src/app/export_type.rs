use std::fmt::Display;

/// Output formats the inspector can render decoded payloads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportType {
    /// Indented plain text tree
    Txt,
    /// One JSON document per payload
    Json,
}

impl ExportType {
    /// Given user's input, return a variant if the input matches one
    pub fn from_cli(platform: &str) -> Option<Self> {
        match platform.to_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Display for ExportType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportType::Txt => write!(fmt, "txt"),
            ExportType::Json => write!(fmt, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::export_type::ExportType;

    #[test]
    fn can_parse_txt_any_case() {
        assert_eq!(ExportType::from_cli("txt"), Some(ExportType::Txt));
        assert_eq!(ExportType::from_cli("TXT"), Some(ExportType::Txt));
        assert_eq!(ExportType::from_cli("JsOn"), Some(ExportType::Json));
    }

    #[test]
    fn cant_parse_invalid() {
        assert_eq!(ExportType::from_cli("html"), None);
        assert_eq!(ExportType::from_cli(""), None);
    }
}
