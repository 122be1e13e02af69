//! Human-readable error descriptions and structured JSON error formatting.

use crate::run::RunError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use cover_core::error::BuildError;

    // Typed matches first
    if let Some(re) = err.downcast_ref::<RunError>() {
        return match re {
            RunError::UnknownCover(name) => format!(
                "What happened: No cover named {name:?} is configured.\nLikely causes: Typo in --cover, or the [[covers]] entry is missing.\nHow to fix: Run `cover list` to see the configured names."
            ),
            RunError::RejectedCover { name, reason } => format!(
                "What happened: Cover {name:?} failed validation ({reason}).\nLikely causes: A packet that is not valid base64, or a travel time outside 0..=300 seconds.\nHow to fix: Fix the [[covers]] entry, then run `cover self-check`."
            ),
            RunError::InvalidCovers(n) => format!(
                "What happened: {n} cover(s) failed validation.\nLikely causes: Bad packets, duplicate names, or out-of-range travel times.\nHow to fix: See the `invalid:` lines above and edit the config."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransport | BuildError::MissingScheduler => format!(
                "What happened: The cover could not be assembled ({be}).\nLikely causes: Internal wiring error.\nHow to fix: Re-run with --log-level=debug and report the output."
            ),
            BuildError::MissingConfig => {
                "What happened: No cover configuration was provided.\nLikely causes: The [[covers]] entry could not be read.\nHow to fix: Check the config file.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/cover_config.toml for a sample."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML for this tool ({}).\nLikely causes: Syntax error, a missing [device] table, or a misspelled key.\nHow to fix: Compare with etc/cover_config.toml.",
            te.message()
        );
    }

    // String-based heuristics for errors coming from config and state files
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("reading config") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config pointing at an existing TOML file."
        );
    }

    if lower.contains("device.mac") {
        return "What happened: The device MAC address is invalid.\nLikely causes: Missing digits or a wrong separator in [device].mac.\nHow to fix: Write it as aa:bb:cc:dd:ee:ff.".to_string();
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({err:#}).\nLikely causes: Unknown log level or rotation, or an empty [device].host.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("state file") {
        return format!(
            "What happened: {err:#}.\nLikely causes: The state file was edited by hand or truncated.\nHow to fix: Fix or delete the file; covers then start with an unknown position."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for invalid covers, 4 for an unknown cover, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::InvalidCovers(_) | RunError::RejectedCover { .. }) => 3,
        Some(RunError::UnknownCover(_)) => 4,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    use cover_core::error::BuildError;
    match err.downcast_ref::<RunError>() {
        Some(RunError::UnknownCover(_)) => return "UnknownCover",
        Some(RunError::RejectedCover { .. }) => return "RejectedCover",
        Some(RunError::InvalidCovers(_)) => return "InvalidCovers",
        None => {}
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    if err.downcast_ref::<toml::de::Error>().is_some() {
        return "ConfigParse";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(RunError::UnknownCover(name) | RunError::RejectedCover { name, .. }) =
        err.downcast_ref::<RunError>()
    {
        obj["details"] = json!({ "cover": name });
    }
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_cover_maps_to_exit_code_and_json() {
        let err = eyre::Report::new(RunError::UnknownCover("Attic".into()));
        assert_eq!(exit_code_for_error(&err), 4);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "UnknownCover");
        assert_eq!(v["details"]["cover"], "Attic");
        assert!(humanize(&err).contains("cover list"));
    }

    #[test]
    fn generic_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).starts_with("Something went wrong."));
    }
}
