use crate::types::{DEFAULT_SEVERITY, LintIssue, Location};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use tracing::{debug, trace};

const ISSUES_TAG: &[u8] = b"issues";
const ISSUE_TAG: &[u8] = b"issue";
const LOCATION_TAG: &[u8] = b"location";

/// The lint report is not well-formed XML
#[derive(Debug)]
pub enum ParseError {
    /// Syntax error reported by the XML reader
    Xml {
        position: u64,
        source: quick_xml::Error,
    },
    /// Document has no root element
    MissingRoot,
    /// A second top-level element follows the root
    MultipleRoots { position: u64 },
    /// Character data outside the root element
    TextOutsideRoot { position: u64 },
    /// Document ended while an element was still open
    UnclosedElement(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Xml { position, source } => {
                write!(f, "Malformed lint XML at byte {}: {}", position, source)
            }
            ParseError::MissingRoot => write!(f, "Malformed lint XML: no root element"),
            ParseError::MultipleRoots { position } => write!(
                f,
                "Malformed lint XML at byte {}: more than one root element",
                position
            ),
            ParseError::TextOutsideRoot { position } => write!(
                f,
                "Malformed lint XML at byte {}: text outside the root element",
                position
            ),
            ParseError::UnclosedElement(name) => {
                write!(f, "Malformed lint XML: element <{}> is never closed", name)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Xml { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Issue being assembled while its children are read
struct PendingIssue {
    issue: LintIssue,
    has_location: bool,
}

/// Parse an Android Lint XML report into issues, in document order
///
/// Only `<issue>` elements directly under an `<issues>` root are read. A
/// well-formed document with any other root yields no issues. General
/// entities declared in an internal DTD subset are resolved; references to
/// external entities are rejected.
pub fn parse(xml: &str) -> Result<Vec<LintIssue>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut issues = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut root_seen = false;
    let mut issues_root = false;
    let mut pending: Option<PendingIssue> = None;
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|source| ParseError::Xml { position, source })?;

        let (start, is_empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                let name = open.pop().unwrap_or_default();
                trace!("Closed <{}>", String::from_utf8_lossy(e.name().as_ref()));
                if open.len() == 1 && name == ISSUE_TAG {
                    if let Some(done) = pending.take() {
                        issues.push(done.issue);
                    }
                }
                continue;
            }
            Event::Text(_) | Event::CData(_) if open.is_empty() => {
                return Err(ParseError::TextOutsideRoot { position });
            }
            Event::DocType(doctype) => {
                entities = internal_entities(&String::from_utf8_lossy(&doctype));
                debug!("Declared entities: {:?}", entities.keys());
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = start.name().as_ref().to_vec();
        match open.len() {
            0 => {
                if root_seen {
                    return Err(ParseError::MultipleRoots { position });
                }
                root_seen = true;
                issues_root = name == ISSUES_TAG;
                if !issues_root {
                    debug!(
                        "Root element is <{}>, not <issues>; no issues will be read",
                        String::from_utf8_lossy(&name)
                    );
                }
            }
            1 if issues_root && name == ISSUE_TAG => {
                let issue = read_issue(&start, position, &entities)?;
                if is_empty {
                    issues.push(issue);
                } else {
                    pending = Some(PendingIssue {
                        issue,
                        has_location: false,
                    });
                }
            }
            2 if name == LOCATION_TAG => {
                if let Some(p) = pending.as_mut().filter(|p| !p.has_location) {
                    p.issue.location = read_location(&start, position, &entities)?;
                    p.has_location = true;
                }
            }
            _ => {}
        }

        if !is_empty {
            open.push(name);
        }
    }

    if let Some(name) = open.last() {
        return Err(ParseError::UnclosedElement(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    if !root_seen {
        return Err(ParseError::MissingRoot);
    }

    debug!("Parsed {} lint issues", issues.len());
    Ok(issues)
}

fn read_issue(
    element: &BytesStart<'_>,
    position: u64,
    entities: &HashMap<String, String>,
) -> Result<LintIssue, ParseError> {
    let mut issue = LintIssue {
        id: String::new(),
        message: String::new(),
        severity: String::new(),
        location: Location::default(),
    };

    for (key, value) in attributes(element, position, entities)? {
        match key.as_slice() {
            b"id" => issue.id = value,
            b"message" => issue.message = value,
            b"severity" => issue.severity = value,
            _ => {}
        }
    }

    if issue.severity.is_empty() {
        issue.severity = DEFAULT_SEVERITY.to_string();
    }
    Ok(issue)
}

fn read_location(
    element: &BytesStart<'_>,
    position: u64,
    entities: &HashMap<String, String>,
) -> Result<Location, ParseError> {
    let mut location = Location::default();
    for (key, value) in attributes(element, position, entities)? {
        match key.as_slice() {
            b"file" => location.file = value,
            b"line" => location.line = parse_number("line", &value),
            b"column" => location.column = parse_number("column", &value),
            _ => {}
        }
    }
    Ok(location)
}

/// Decode all attributes of an element into owned key/value pairs
fn attributes(
    element: &BytesStart<'_>,
    position: u64,
    entities: &HashMap<String, String>,
) -> Result<Vec<(Vec<u8>, String)>, ParseError> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| ParseError::Xml {
                position,
                source: quick_xml::Error::from(e),
            })?;
            let value = attr
                .unescape_value_with(|name| {
                    resolve_predefined_entity(name)
                        .or_else(|| entities.get(name).map(String::as_str))
                })
                .map_err(|source| ParseError::Xml { position, source })?;
            Ok((attr.key.as_ref().to_vec(), value.into_owned()))
        })
        .collect()
}

/// General entities declared in an internal DTD subset
///
/// The first declaration of a name wins. Parameter and external entities are
/// not collected.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    const DECLARATION: &str = "<!ENTITY";
    let mut entities = HashMap::new();
    let mut rest = doctype;

    while let Some(start) = rest.find(DECLARATION) {
        rest = rest[start + DECLARATION.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(value_len) = rest[1..].find(quote) else {
            break;
        };
        entities
            .entry(name.to_string())
            .or_insert_with(|| rest[1..1 + value_len].to_string());
        rest = &rest[value_len + 2..];
    }

    entities
}

/// Non-numeric values are treated as unknown
fn parse_number(name: &str, value: &str) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            debug!("Ignoring non-numeric {} attribute '{}'", name, value);
            None
        }
    }
}
