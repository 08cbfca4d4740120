use super::{ConfigError, FilterDeclaration, parse_declarations};
use crate::level::{Severity, resolve_level};
use crate::registry::{Filter, Registry};
use crate::sink::{BuildContext, SinkKind, SinkOutline};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a successful load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Tags installed into the registry, in declaration order.
    pub installed: Vec<String>,
    /// Tags of disabled filters that were only validated.
    pub disabled: Vec<String>,
    /// Non-fatal diagnostics, such as unknown properties.
    pub warnings: Vec<String>,
}

/// A declaration that passed validation, described without building its sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedFilter {
    pub tag: String,
    pub enabled: bool,
    #[serde(rename = "level")]
    pub severity: Severity,
    #[serde(flatten)]
    pub sink: SinkOutline,
}

/// Outcome of [`validate_from_path`] / [`validate_from_reader`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Every declared filter, enabled or not, in declaration order.
    pub filters: Vec<ValidatedFilter>,
    pub warnings: Vec<String>,
}

/// Replace the registry's filters with those declared in the file at `path`.
///
/// Installed filters are released before the file is even opened.
pub fn load_from_path(
    registry: &mut Registry,
    path: impl AsRef<Path>,
) -> Result<LoadReport, ConfigError> {
    let path = path.as_ref();
    let source_label = path.display().to_string();

    registry.close_all();

    let file = open_document(path, &source_label)?;
    install_declarations(registry, BufReader::new(file), &source_label)
}

/// Replace the registry's filters with those declared in `reader`.
///
/// `source_label` names the document in error messages.
pub fn load_from_reader<R: Read>(
    registry: &mut Registry,
    reader: R,
    source_label: &str,
) -> Result<LoadReport, ConfigError> {
    registry.close_all();
    install_declarations(registry, reader, source_label)
}

/// Check the file at `path` the way a load would, without opening any sink.
///
/// Errors that only surface when a sink is opened (an unreachable endpoint,
/// an unsupported protocol, an unwritable file) are not detected.
pub fn validate_from_path(path: impl AsRef<Path>) -> Result<ValidationReport, ConfigError> {
    let path = path.as_ref();
    let source_label = path.display().to_string();

    let file = open_document(path, &source_label)?;
    validate_from_reader(BufReader::new(file), &source_label)
}

pub fn validate_from_reader<R: Read>(
    reader: R,
    source_label: &str,
) -> Result<ValidationReport, ConfigError> {
    let document = read_document(reader, source_label)?;
    let declarations = parse_declarations(&document, source_label)?;
    let mut ctx = BuildContext::new(source_label);
    let mut report = ValidationReport::default();

    for decl in &declarations {
        let filter = validate_declaration(&mut ctx, decl)?;
        debug!(tag = %filter.tag, enabled = filter.enabled, "filter validated");
        report.filters.push(filter);
    }

    report.warnings = ctx.into_warnings();
    info!(
        source = source_label,
        filters = report.filters.len(),
        "configuration validated"
    );
    Ok(report)
}

fn open_document(path: &Path, source_label: &str) -> Result<File, ConfigError> {
    File::open(path).map_err(|source| ConfigError::Open {
        source_label: source_label.to_string(),
        source,
    })
}

// Undecodable bytes are a malformed document, not a failed read.
fn read_document<R: Read>(mut reader: R, source_label: &str) -> Result<String, ConfigError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| ConfigError::Read {
            source_label: source_label.to_string(),
            source,
        })?;

    String::from_utf8(bytes).map_err(|err| ConfigError::Encoding {
        source_label: source_label.to_string(),
        source: err.utf8_error(),
    })
}

// Filters are installed as they are validated: an error on a later filter
// leaves the earlier ones in place.
fn install_declarations<R: Read>(
    registry: &mut Registry,
    reader: R,
    source_label: &str,
) -> Result<LoadReport, ConfigError> {
    let document = read_document(reader, source_label)?;
    let declarations = parse_declarations(&document, source_label)?;
    let mut ctx = BuildContext::new(source_label);
    let mut report = LoadReport::default();

    for decl in &declarations {
        match compile_declaration(&mut ctx, decl)? {
            Some(filter) => {
                debug!(
                    tag = %decl.tag,
                    level = %filter.severity,
                    kind = %filter.sink.kind(),
                    "installing filter"
                );
                registry.install(decl.tag.clone(), filter);
                report.installed.push(decl.tag.clone());
            }
            None => {
                debug!(tag = %decl.tag, "filter disabled, validated only");
                report.disabled.push(decl.tag.clone());
            }
        }
    }

    report.warnings = ctx.into_warnings();
    info!(
        source = source_label,
        installed = report.installed.len(),
        disabled = report.disabled.len(),
        "configuration loaded"
    );
    Ok(report)
}

/// Validate one declaration and build its filter.
///
/// Returns `None` for a valid but disabled declaration.
pub fn compile_declaration(
    ctx: &mut BuildContext<'_>,
    decl: &FilterDeclaration,
) -> Result<Option<Filter>, ConfigError> {
    let (enabled, severity, kind) = check_header(ctx.source_label(), decl)?;
    let sink = kind.build(ctx, &decl.properties, enabled)?;
    Ok(sink.map(|sink| Filter::new(severity, sink)))
}

/// Run every check [`compile_declaration`] runs, but only describe the sink.
pub fn validate_declaration(
    ctx: &mut BuildContext<'_>,
    decl: &FilterDeclaration,
) -> Result<ValidatedFilter, ConfigError> {
    let (enabled, severity, kind) = check_header(ctx.source_label(), decl)?;
    let sink = kind.outline(ctx, &decl.properties)?;
    Ok(ValidatedFilter {
        tag: decl.tag.clone(),
        enabled,
        severity,
        sink,
    })
}

// Presence of `enabled`, tag, type, level (in that order), then level before type.
fn check_header(
    source_label: &str,
    decl: &FilterDeclaration,
) -> Result<(bool, Severity, SinkKind), ConfigError> {
    if decl.enabled.is_empty() {
        return Err(ConfigError::MissingAttribute {
            attribute: "enabled",
            source_label: source_label.to_string(),
        });
    }
    for (child, value) in [
        ("tag", &decl.tag),
        ("type", &decl.kind),
        ("level", &decl.level),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingChild {
                child,
                source_label: source_label.to_string(),
            });
        }
    }

    // Only the exact string "false" disables a filter.
    let enabled = decl.enabled != "false";

    let severity = resolve_level(&decl.level).map_err(|_| ConfigError::UnknownLevel {
        value: decl.level.clone(),
        source_label: source_label.to_string(),
    })?;

    let kind = SinkKind::from_type_name(&decl.kind).ok_or_else(|| ConfigError::UnknownType {
        value: decl.kind.clone(),
        source_label: source_label.to_string(),
    })?;

    Ok((enabled, severity, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorCategory;
    use crate::level::Severity;
    use crate::sink::Property;

    fn decl(enabled: &str, tag: &str, kind: &str, level: &str) -> FilterDeclaration {
        FilterDeclaration {
            enabled: enabled.to_string(),
            tag: tag.to_string(),
            level: level.to_string(),
            kind: kind.to_string(),
            properties: Vec::new(),
        }
    }

    #[test]
    fn test_required_fields_are_checked_in_order() {
        let mut ctx = BuildContext::new("inline");

        let err = compile_declaration(&mut ctx, &decl("", "", "", "")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAttribute {
                attribute: "enabled",
                ..
            }
        ));

        let err = compile_declaration(&mut ctx, &decl("true", "", "", "")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingChild { child: "tag", .. }));

        let err = compile_declaration(&mut ctx, &decl("true", "t", "", "")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingChild { child: "type", .. }));

        let err = compile_declaration(&mut ctx, &decl("true", "t", "console", "")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingChild { child: "level", .. }));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_only_literal_false_disables() {
        for enabled in ["true", "no", "0", "1", "x", "False"] {
            let mut ctx = BuildContext::new("inline");
            let filter = compile_declaration(&mut ctx, &decl(enabled, "t", "console", "INFO"))
                .unwrap()
                .unwrap_or_else(|| panic!("'{}' should enable the filter", enabled));
            assert_eq!(filter.severity, Severity::Info);
        }

        let mut ctx = BuildContext::new("inline");
        assert!(
            compile_declaration(&mut ctx, &decl("false", "t", "console", "INFO"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_unknown_level_and_type_are_named_in_the_error() {
        let mut ctx = BuildContext::new("app.xml");

        let err = compile_declaration(&mut ctx, &decl("true", "t", "console", "VERBOSE"))
            .unwrap_err();
        assert!(matches!(&err, ConfigError::UnknownLevel { value, .. } if value == "VERBOSE"));
        assert!(err.to_string().contains("app.xml"));

        let err =
            compile_declaration(&mut ctx, &decl("false", "t", "syslog", "INFO")).unwrap_err();
        assert!(matches!(&err, ConfigError::UnknownType { value, .. } if value == "syslog"));
        assert!(err.to_string().contains("syslog"));
    }

    #[test]
    fn test_level_is_resolved_before_type() {
        let mut ctx = BuildContext::new("inline");
        let err =
            compile_declaration(&mut ctx, &decl("true", "t", "syslog", "LOUD")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLevel { .. }));
    }

    #[test]
    fn test_validation_describes_disabled_and_enabled_filters_alike() {
        let mut ctx = BuildContext::new("inline");
        let mut file = decl("true", "file", "file", "WARNING");
        file.properties
            .push(Property::new("filename", "/nonexistent/dir/app.log"));
        file.properties.push(Property::new("maxsize", "2K"));

        let filter = validate_declaration(&mut ctx, &file).unwrap();
        assert!(filter.enabled);
        assert_eq!(filter.severity, Severity::Warning);
        assert_eq!(filter.sink.kind, SinkKind::File);
        assert_eq!(filter.sink.target, "/nonexistent/dir/app.log");
        assert_eq!(filter.sink.settings["max_size"], 2048);

        let quiet = validate_declaration(&mut ctx, &decl("false", "q", "console", "INFO")).unwrap();
        assert!(!quiet.enabled);
        assert_eq!(quiet.tag, "q");
    }

    #[test]
    fn test_validation_applies_the_same_checks() {
        let mut ctx = BuildContext::new("inline");
        let err = validate_declaration(&mut ctx, &decl("true", "t", "syslog", "LOUD")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLevel { .. }));

        let err = validate_declaration(&mut ctx, &decl("false", "net", "socket", "ERROR"))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingProperty {
                property: "endpoint",
                ..
            }
        ));
    }

    #[test]
    fn test_builder_errors_abort_disabled_filters() {
        let mut ctx = BuildContext::new("inline");
        let mut socket = decl("false", "net", "socket", "ERROR");
        socket.properties.push(Property::new("protocol", "tcp"));

        let err = compile_declaration(&mut ctx, &socket).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingProperty {
                property: "endpoint",
                ..
            }
        ));
    }
}
