//! Parser for JaCoCo XML coverage reports.
//!
//! JaCoCo XML structure:
//!   <report name="...">
//!     <sessioninfo id="..." start="..." dump="..."/>
//!     <package name="com/example">
//!       <class name="com/example/Foo" sourcefilename="Foo.java">
//!         <method name="doStuff" desc="()V" line="10">
//!           <counter type="INSTRUCTION" missed="0" covered="5"/>
//!         </method>
//!         <counter type="INSTRUCTION" missed="2" covered="10"/>
//!         <counter type="METHOD" missed="0" covered="2"/>
//!         ...
//!       </class>
//!       <sourcefile name="Foo.java">
//!         <line nr="10" mi="0" ci="3" mb="0" cb="2"/>
//!         <line nr="11" mi="2" ci="0" mb="1" cb="1"/>
//!         ...
//!         <counter type="LINE" missed="1" covered="5"/>
//!       </sourcefile>
//!       <counter type="LINE" missed="1" covered="5"/>
//!     </package>
//!     <counter type="LINE" missed="1" covered="5"/>
//!   </report>
//!
//! Counters appear at several nesting levels and each level is an
//! independently complete counting system, so every counter is attributed
//! to the innermost open element only:
//!   - counters inside `<method>` are dropped (the enclosing class already
//!     aggregates them),
//!   - class > sourcefile > package > report otherwise,
//!   - counters directly under a `<group>` wrapper are dropped (group
//!     aggregates would double-count report totals).
//! Packages nested inside `<group>` elements are still discovered.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CovgateError, Result};
use crate::model::{Counter, Metric};

/// Per-line instruction and branch counts for one source line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRecord {
    pub mi: u64,
    pub ci: u64,
    pub mb: u64,
    pub cb: u64,
}

/// A `<sourcefile>` node: counters plus line records.
#[derive(Debug, Default)]
pub struct SourceFile {
    /// Missing in malformed reports; such entries are skipped at indexing.
    pub name: Option<String>,
    pub counters: Vec<(Metric, Counter)>,
    pub lines: Vec<LineRecord>,
}

/// A `<class>` node: counters keyed to a declaring source file.
#[derive(Debug, Default)]
pub struct Class {
    pub source_file_name: Option<String>,
    pub counters: Vec<(Metric, Counter)>,
}

/// A `<package>` node with its sourcefile and class children in
/// declaration order.
#[derive(Debug, Default)]
pub struct Package {
    pub name: String,
    pub counters: Vec<(Metric, Counter)>,
    pub source_files: Vec<SourceFile>,
    pub classes: Vec<Class>,
}

/// The parsed report tree. Consumed by the index builder.
#[derive(Debug, Default)]
pub struct Report {
    /// Counters that are direct children of `<report>`.
    pub counters: Vec<(Metric, Counter)>,
    pub packages: Vec<Package>,
}

/// Read and parse a report file.
pub fn parse_file(path: &Path) -> Result<Report> {
    let content = std::fs::read(path)?;
    parse(&content)
}

/// Parse JaCoCo XML from raw bytes.
pub fn parse(input: &[u8]) -> Result<Report> {
    let mut xml = Reader::from_reader(input);
    xml.trim_text(true);
    let mut buf = Vec::new();

    let mut report = Report::default();
    let mut package: Option<Package> = None;
    let mut source_file: Option<SourceFile> = None;
    let mut class: Option<Class> = None;
    let mut method_depth: usize = 0;
    let mut group_depth: usize = 0;

    loop {
        let event = xml.read_event_into(&mut buf);
        let is_empty_event = matches!(&event, Ok(Event::Empty(_)));
        match event {
            Err(e) => {
                return Err(CovgateError::Xml {
                    source: e,
                    position: xml.buffer_position(),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"group" => {
                    if !is_empty_event {
                        group_depth += 1;
                    }
                }
                b"package" => {
                    let pkg = Package {
                        name: get_attr(e, b"name").unwrap_or_default(),
                        ..Package::default()
                    };
                    if is_empty_event {
                        report.packages.push(pkg);
                    } else {
                        package = Some(pkg);
                    }
                }
                b"sourcefile" => {
                    let sf = SourceFile {
                        name: get_attr(e, b"name"),
                        ..SourceFile::default()
                    };
                    if is_empty_event {
                        if let Some(pkg) = package.as_mut() {
                            pkg.source_files.push(sf);
                        }
                    } else {
                        source_file = Some(sf);
                    }
                }
                b"class" => {
                    let cls = Class {
                        source_file_name: get_attr(e, b"sourcefilename"),
                        ..Class::default()
                    };
                    if is_empty_event {
                        if let Some(pkg) = package.as_mut() {
                            pkg.classes.push(cls);
                        }
                    } else {
                        class = Some(cls);
                    }
                }
                b"method" => {
                    if !is_empty_event {
                        method_depth += 1;
                    }
                }
                b"line" => {
                    if let Some(sf) = source_file.as_mut() {
                        sf.lines.push(LineRecord {
                            mi: num_attr(e, b"mi"),
                            ci: num_attr(e, b"ci"),
                            mb: num_attr(e, b"mb"),
                            cb: num_attr(e, b"cb"),
                        });
                    }
                }
                b"counter" => {
                    if method_depth == 0 {
                        if let Some(counter) = parse_counter(e) {
                            if let Some(cls) = class.as_mut() {
                                cls.counters.push(counter);
                            } else if let Some(sf) = source_file.as_mut() {
                                sf.counters.push(counter);
                            } else if let Some(pkg) = package.as_mut() {
                                pkg.counters.push(counter);
                            } else if group_depth == 0 {
                                report.counters.push(counter);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"group" => group_depth = group_depth.saturating_sub(1),
                b"package" => {
                    if let Some(pkg) = package.take() {
                        report.packages.push(pkg);
                    }
                }
                b"sourcefile" => {
                    if let Some(sf) = source_file.take() {
                        if let Some(pkg) = package.as_mut() {
                            pkg.source_files.push(sf);
                        }
                    }
                }
                b"class" => {
                    if let Some(cls) = class.take() {
                        if let Some(pkg) = package.as_mut() {
                            pkg.classes.push(cls);
                        }
                    }
                }
                b"method" => method_depth = method_depth.saturating_sub(1),
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    Ok(report)
}

/// Get an attribute value from an element, unescaped.
fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Numeric attribute, absent or malformed values read as 0. Malformed
/// values are not expected in well-formed reports; warn rather than abort.
fn num_attr(e: &BytesStart, name: &[u8]) -> u64 {
    match get_attr(e, name) {
        None => 0,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!(
                "[WARN] invalid numeric attribute {}=\"{}\", treating as 0",
                String::from_utf8_lossy(name),
                raw
            );
            0
        }),
    }
}

/// Parse a `<counter>` element; returns `None` for types we do not consume.
fn parse_counter(e: &BytesStart) -> Option<(Metric, Counter)> {
    let metric = Metric::from_name(&get_attr(e, b"type")?)?;
    Some((
        metric,
        Counter::new(num_attr(e, b"missed"), num_attr(e, b"covered")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample() {
        let input = include_bytes!("../tests/fixtures/sample_jacoco.xml");
        let report = parse(input).unwrap();

        // Report-level counters
        assert_eq!(report.counters.len(), 5);
        assert!(report
            .counters
            .contains(&(Metric::Line, Counter::new(4, 12))));

        assert_eq!(report.packages.len(), 2);
        let acme = &report.packages[0];
        assert_eq!(acme.name, "com/acme");
        assert_eq!(acme.source_files.len(), 2);
        assert_eq!(acme.classes.len(), 3);

        let foo = &acme.source_files[0];
        assert_eq!(foo.name.as_deref(), Some("Foo.java"));
        assert!(foo.counters.contains(&(Metric::Line, Counter::new(2, 8))));
        assert_eq!(foo.lines.len(), 4);
        assert_eq!(
            foo.lines[1],
            LineRecord {
                mi: 2,
                ci: 0,
                mb: 1,
                cb: 1
            }
        );
    }

    #[test]
    fn test_method_counters_are_not_attributed_to_class() {
        let input = include_bytes!("../tests/fixtures/sample_jacoco.xml");
        let report = parse(input).unwrap();

        // Foo's class carries INSTRUCTION missed=5 covered=15; the METHOD
        // counter nested inside its <method> child must not leak in.
        let cls = &report.packages[0].classes[0];
        assert_eq!(cls.source_file_name.as_deref(), Some("Foo.java"));
        assert!(cls
            .counters
            .contains(&(Metric::Instruction, Counter::new(5, 15))));
        let method_counters: Vec<_> = cls
            .counters
            .iter()
            .filter(|(m, _)| *m == Metric::Method)
            .collect();
        assert_eq!(method_counters, vec![&(Metric::Method, Counter::new(1, 2))]);
    }

    #[test]
    fn test_parse_empty_package_element() {
        let input = br#"<?xml version="1.0"?><report name="t"><package name="com/empty"/></report>"#;
        let report = parse(input).unwrap();
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.packages[0].name, "com/empty");
        assert!(report.packages[0].source_files.is_empty());
    }

    #[test]
    fn test_parse_ignores_complexity_counters() {
        let input = br#"<?xml version="1.0"?>
<report name="t">
  <package name="p">
    <sourcefile name="A.java">
      <counter type="COMPLEXITY" missed="3" covered="4"/>
      <counter type="LINE" missed="1" covered="2"/>
    </sourcefile>
  </package>
</report>"#;
        let report = parse(input).unwrap();
        let sf = &report.packages[0].source_files[0];
        assert_eq!(sf.counters, vec![(Metric::Line, Counter::new(1, 2))]);
    }

    #[test]
    fn test_parse_group_wrapped_packages() {
        let input = br#"<?xml version="1.0"?>
<report name="t">
  <group name="server">
    <package name="com/acme">
      <sourcefile name="A.java"><counter type="LINE" missed="0" covered="1"/></sourcefile>
    </package>
    <counter type="LINE" missed="0" covered="1"/>
  </group>
</report>"#;
        let report = parse(input).unwrap();
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.packages[0].name, "com/acme");
        // The group-level aggregate must not land in report counters.
        assert!(report.counters.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let input = include_bytes!("../tests/fixtures/malformed_jacoco.xml");
        let result = parse(input);
        assert!(result.is_err());
        let err_msg = format!("{}", result.unwrap_err());
        assert!(
            err_msg.contains("position"),
            "Error should contain position info: {err_msg}",
        );
    }

    #[test]
    fn test_malformed_numeric_attribute_reads_as_zero() {
        let input = br#"<?xml version="1.0"?>
<report name="t">
  <package name="p">
    <sourcefile name="A.java">
      <counter type="LINE" missed="oops" covered="3"/>
    </sourcefile>
  </package>
</report>"#;
        let report = parse(input).unwrap();
        let sf = &report.packages[0].source_files[0];
        assert_eq!(sf.counters, vec![(Metric::Line, Counter::new(0, 3))]);
    }
}
