use log_provisioner::config::{
    ConfigError, ErrorCategory, load_from_path, load_from_reader, validate_from_path,
};
use log_provisioner::level::Severity;
use log_provisioner::registry::{Filter, Registry};
use log_provisioner::sink::{ConsoleSink, Sink, SinkKind};
use std::fs;
use std::path::Path;

use tempfile::tempdir;

fn load_str(registry: &mut Registry, doc: &str) -> Result<log_provisioner::LoadReport, ConfigError> {
    load_from_reader(registry, doc.as_bytes(), "inline.xml")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[test]
fn test_single_console_filter_end_to_end() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>stdout</tag>
    <type>console</type>
    <level>INFO</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let report = load_str(&mut registry, doc).expect("load should succeed");

    assert_eq!(report.installed, vec!["stdout".to_string()]);
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("stdout"),
        Some(&Filter::new(
            Severity::Info,
            Sink::Console(ConsoleSink::new())
        ))
    );
}

#[test]
fn test_file_filter_sizes_are_expanded() {
    let dir = tempdir().expect("temp dir");
    let log_path = dir.path().join("app.log");
    let doc = format!(
        r#"<logging>
  <filter enabled="true">
    <tag>file</tag>
    <type>file</type>
    <level>FINEST</level>
    <property name="filename">{}</property>
    <property name="maxlines">10K</property>
    <property name="maxsize">100M</property>
    <property name="daily">true</property>
  </filter>
</logging>"#,
        path_str(&log_path)
    );

    let mut registry = Registry::new();
    load_str(&mut registry, &doc).expect("load should succeed");

    let filter = registry.get("file").expect("file filter installed");
    assert_eq!(filter.severity, Severity::Finest);
    match &filter.sink {
        Sink::File(sink) => {
            assert_eq!(sink.config().max_lines, 10_000);
            assert_eq!(sink.config().max_size, 104_857_600);
            assert!(sink.config().daily);
            assert!(!sink.config().rotate);
            assert_eq!(sink.config().format, "[%D %T] [%L] (%S) %M");
        }
        other => panic!("expected file sink, got {}", other.kind()),
    }
    assert!(log_path.exists());
}

#[test]
fn test_disabled_filter_is_validated_but_not_installed() {
    let dir = tempdir().expect("temp dir");
    let log_path = dir.path().join("disabled.log");
    let doc = format!(
        r#"<logging>
  <filter enabled="false">
    <tag>quiet</tag>
    <type>file</type>
    <level>DEBUG</level>
    <property name="filename">{}</property>
  </filter>
</logging>"#,
        path_str(&log_path)
    );

    let mut registry = Registry::new();
    let report = load_str(&mut registry, &doc).expect("load should succeed");

    assert!(registry.is_empty());
    assert!(!registry.contains("quiet"));
    assert_eq!(report.disabled, vec!["quiet".to_string()]);
    assert!(!log_path.exists());
}

#[test]
fn test_disabled_socket_without_endpoint_fails() {
    let doc = r#"<logging>
  <filter enabled="false">
    <tag>net</tag>
    <type>socket</type>
    <level>ERROR</level>
    <property name="protocol">udp</property>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let err = load_str(&mut registry, doc).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(matches!(
        err,
        ConfigError::MissingProperty {
            property: "endpoint",
            kind: SinkKind::Socket,
            ..
        }
    ));
}

#[test]
fn test_duplicate_tags_keep_the_last_filter() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>main</tag>
    <type>console</type>
    <level>DEBUG</level>
  </filter>
  <filter enabled="true">
    <tag>main</tag>
    <type>console</type>
    <level>CRITICAL</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let report = load_str(&mut registry, doc).expect("load should succeed");

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("main"),
        Some(&Filter::new(
            Severity::Critical,
            Sink::Console(ConsoleSink::new())
        ))
    );
    assert_eq!(report.installed, vec!["main".to_string(), "main".to_string()]);
}

#[test]
fn test_unknown_type_aborts_the_load() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>sys</tag>
    <type>syslog</type>
    <level>INFO</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let err = load_str(&mut registry, doc).unwrap_err();
    assert!(matches!(&err, ConfigError::UnknownType { value, .. } if value == "syslog"));
    assert_eq!(err.source_label(), "inline.xml");
}

#[test]
fn test_unknown_property_warns_and_continues() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>stdout</tag>
    <type>console</type>
    <level>WARNING</level>
    <property name="colour">blue</property>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let report = load_str(&mut registry, doc).expect("unknown properties are not fatal");

    assert!(registry.contains("stdout"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("colour"));
    assert!(report.warnings[0].contains("console filter"));
}

#[test]
fn test_later_error_keeps_earlier_filters() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>first</tag>
    <type>console</type>
    <level>INFO</level>
  </filter>
  <filter enabled="true">
    <tag>second</tag>
    <type>console</type>
    <level>LOUD</level>
  </filter>
  <filter enabled="true">
    <tag>third</tag>
    <type>console</type>
    <level>INFO</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let err = load_str(&mut registry, doc).unwrap_err();

    assert!(matches!(&err, ConfigError::UnknownLevel { value, .. } if value == "LOUD"));
    assert!(registry.contains("first"));
    assert!(!registry.contains("second"));
    assert!(!registry.contains("third"));
}

#[test]
fn test_missing_enabled_attribute_is_reported() {
    let doc = r#"<logging>
  <filter>
    <tag>stdout</tag>
    <type>console</type>
    <level>INFO</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let err = load_str(&mut registry, doc).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingAttribute {
            attribute: "enabled",
            ..
        }
    ));
    assert!(err.to_string().contains("enabled"));
}

#[test]
fn test_reload_releases_previous_filters_even_on_parse_failure() {
    let mut registry = Registry::new();
    registry.install(
        "old",
        Filter::new(Severity::Info, Sink::Console(ConsoleSink::new())),
    );

    let err = load_str(&mut registry, "<logging><filter>").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(registry.is_empty());
}

#[test]
fn test_reload_replaces_the_whole_registry() {
    let first = r#"<logging>
  <filter enabled="true"><tag>a</tag><type>console</type><level>INFO</level></filter>
  <filter enabled="true"><tag>b</tag><type>console</type><level>INFO</level></filter>
</logging>"#;
    let second = r#"<logging>
  <filter enabled="true"><tag>c</tag><type>console</type><level>ERROR</level></filter>
</logging>"#;

    let mut registry = Registry::new();
    load_str(&mut registry, first).unwrap();
    assert_eq!(registry.len(), 2);

    load_str(&mut registry, second).unwrap();
    let tags: Vec<&str> = registry.iter().map(|(tag, _)| tag).collect();
    assert_eq!(tags, vec!["c"]);
}

#[test]
fn test_load_from_path_reads_the_file() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("logging.xml");
    fs::write(
        &config_path,
        r#"<logging>
  <filter enabled="yes"><tag>stdout</tag><type>console</type><level>TRACE</level></filter>
</logging>"#,
    )
    .unwrap();

    let mut registry = Registry::new();
    let report = load_from_path(&mut registry, &config_path).expect("load should succeed");
    assert_eq!(report.installed, vec!["stdout".to_string()]);
    assert_eq!(registry.get("stdout").unwrap().severity, Severity::Trace);
}

#[test]
fn test_missing_config_file_is_a_resource_error() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("nope.xml");

    let mut registry = Registry::new();
    registry.install(
        "old",
        Filter::new(Severity::Info, Sink::Console(ConsoleSink::new())),
    );

    let err = registry.load_configuration(&missing).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resource);
    assert!(matches!(err, ConfigError::Open { .. }));
    assert!(err.to_string().contains("nope.xml"));
    assert!(registry.is_empty());
}

#[test]
fn test_xml_and_file_filters_write_records() {
    let dir = tempdir().expect("temp dir");
    let text_path = dir.path().join("app.log");
    let xml_path = dir.path().join("app.xml");
    let doc = format!(
        r#"<logging>
  <filter enabled="true">
    <tag>text</tag>
    <type>file</type>
    <level>WARNING</level>
    <property name="filename">{}</property>
    <property name="format">%L|%M</property>
  </filter>
  <filter enabled="true">
    <tag>records</tag>
    <type>xml</type>
    <level>DEBUG</level>
    <property name="filename">{}</property>
    <property name="maxrecords">1K</property>
  </filter>
</logging>"#,
        path_str(&text_path),
        path_str(&xml_path)
    );

    let mut registry = Registry::new();
    registry
        .load_configuration_from_reader(doc.as_bytes(), "inline.xml")
        .unwrap();

    assert_eq!(registry.log(Severity::Info, "svc", "started"), 1);
    assert_eq!(registry.log(Severity::Error, "svc", "failed"), 2);
    registry.close_all();

    assert_eq!(fs::read_to_string(&text_path).unwrap(), "EROR|failed\n");
    let xml = fs::read_to_string(&xml_path).unwrap();
    assert_eq!(xml.matches("<record ").count(), 2);
    assert!(xml.trim_end().ends_with("</log>"));
}

#[test]
fn test_shipped_example_configuration_is_valid() {
    use log_provisioner::config::{compile_declaration, parse_declarations};
    use log_provisioner::sink::BuildContext;

    let document = fs::read_to_string("config/example.xml").expect("example config");
    let declarations = parse_declarations(&document, "config/example.xml").unwrap();
    let tags: Vec<&str> = declarations.iter().map(|d| d.tag.as_str()).collect();
    assert_eq!(tags, vec!["stdout", "file", "xmllog", "donotopen"]);

    // Validate everything without opening any file or socket.
    let mut ctx = BuildContext::new("config/example.xml");
    for mut decl in declarations {
        decl.enabled = "false".to_string();
        assert!(compile_declaration(&mut ctx, &decl).unwrap().is_none());
    }
    assert!(ctx.warnings().is_empty(), "warnings: {:?}", ctx.warnings());
}

#[test]
fn test_invalid_utf8_is_a_parse_error() {
    let doc: &[u8] = b"<logging><filter enabled=\"true\"><tag>a\xff</tag></filter></logging>";

    let mut registry = Registry::new();
    let err = load_from_reader(&mut registry, doc, "latin1.xml").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(matches!(err, ConfigError::Encoding { .. }));
    assert_eq!(err.source_label(), "latin1.xml");
}

#[test]
fn test_repeated_children_use_the_last_occurrence() {
    let doc = r#"<logging>
  <filter enabled="true">
    <tag>old</tag>
    <tag>stdout</tag>
    <type>console</type>
    <level>DEBUG</level>
    <level>ERROR</level>
  </filter>
</logging>"#;

    let mut registry = Registry::new();
    let report = load_str(&mut registry, doc).expect("repeated children are accepted");
    assert_eq!(report.installed, vec!["stdout".to_string()]);
    assert_eq!(registry.get("stdout").unwrap().severity, Severity::Error);
}

#[test]
fn test_validation_opens_nothing() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("logging.xml");
    let log_path = dir.path().join("app.log");
    fs::write(
        &config_path,
        format!(
            r#"<logging>
  <filter enabled="true">
    <tag>file</tag><type>file</type><level>INFO</level>
    <property name="filename">{}</property>
    <property name="maxlines">2K</property>
  </filter>
  <filter enabled="true">
    <tag>net</tag><type>socket</type><level>ERROR</level>
    <property name="endpoint">127.0.0.1:9</property>
    <property name="protocol">sctp</property>
  </filter>
</logging>"#,
            path_str(&log_path)
        ),
    )
    .unwrap();

    let report = validate_from_path(&config_path).expect("validation should succeed");
    let tags: Vec<&str> = report.filters.iter().map(|f| f.tag.as_str()).collect();
    assert_eq!(tags, vec!["file", "net"]);
    assert_eq!(report.filters[0].sink.settings["max_lines"], 2000);
    assert_eq!(report.filters[1].sink.target, "sctp://127.0.0.1:9");
    assert!(!log_path.exists());
}
