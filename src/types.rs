use encoding_rs::Encoding;
use serde::Deserialize;

/// What to do when the supervised command exits with a nonzero code.
///
/// - `Escalate`: report the failure, then terminate the host process with the
///   command's exit code (default behaviour).
/// - `Tolerate`: report the failure and hand `(output, code)` back to the
///   caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    #[default]
    Escalate,
    Tolerate,
}

impl OnFailure {
    /// Map the `failure_ok` flag used by configuration and the CLI.
    pub fn from_failure_ok(failure_ok: bool) -> Self {
        if failure_ok {
            OnFailure::Tolerate
        } else {
            OnFailure::Escalate
        }
    }
}

/// Encoding used when none is configured.
pub const DEFAULT_ENCODING: &Encoding = encoding_rs::UTF_8;

/// Look up a console encoding by its label (`"utf-8"`, `"cp1252"`,
/// `"latin1"`, `"shift_jis"`, ...). Labels are matched case-insensitively.
pub fn parse_encoding(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| format!("invalid encoding: {label} (not a known encoding label)"))
}

/// Serde adapter for an encoding given by label.
pub(crate) fn deserialize_encoding<'de, D>(deserializer: D) -> Result<&'static Encoding, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    parse_encoding(&label).map_err(serde::de::Error::custom)
}

/// Behaviour of the hook registry when a category has no registered hook.
///
/// - `Print`: errors go to stderr and process output to stdout; info and
///   success messages are dropped with a warning (default).
/// - `Warn`: every category is dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHookPolicy {
    #[default]
    Print,
    Warn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_code_page_labels_resolve() {
        assert_eq!(parse_encoding("cp1252").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(parse_encoding("CP866").unwrap(), encoding_rs::IBM866);
        assert_eq!(parse_encoding(" utf8 ").unwrap(), encoding_rs::UTF_8);
        assert_eq!(parse_encoding("latin1").unwrap(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = parse_encoding("klingon").unwrap_err();
        assert!(err.contains("klingon"));
    }
}
