//! XML persistence for [`Configuration`].
//!
//! The on-disk document looks like:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <resourceConfig>
//!   <squad name="Alpha">
//!     <engineers BE="2.0" FE="0.5"/>
//!     <efficiency BE="0.8" FE="1.0"/>
//!     <startDate>2024-01-01</startDate>
//!     <projects>
//!       <project id="P1" name="Proj1" priority="1">
//!         <effort BE="5.0"/>
//!         <concurrency BE="1"/>
//!       </project>
//!     </projects>
//!   </squad>
//! </resourceConfig>
//! ```
//!
//! Every attribute on `engineers`, `efficiency`, `effort`, and
//! `concurrency` is a category label. Loading is strict about numbers and
//! required elements; saving replaces the whole file atomically.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use sha2::{Digest, Sha256};

use crate::model::{CategoryMap, Configuration, Project, Squad};
use crate::{Error, Result};

/// Name of the document's root element.
pub const ROOT_ELEMENT: &str = "resourceConfig";

/// Which category labels a configuration may use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Any label that is a valid XML attribute name.
    #[default]
    Any,
    /// Only the listed labels.
    AllowList(BTreeSet<String>),
}

impl CategoryPolicy {
    /// Build a policy from a comma-separated list; `None` or a blank list
    /// means [`CategoryPolicy::Any`].
    pub fn from_list(list: Option<&str>) -> Self {
        let labels: BTreeSet<String> = list
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            CategoryPolicy::Any
        } else {
            CategoryPolicy::AllowList(labels)
        }
    }

    /// Whether `label` is permitted.
    pub fn allows(&self, label: &str) -> bool {
        match self {
            CategoryPolicy::Any => true,
            CategoryPolicy::AllowList(labels) => labels.contains(label),
        }
    }

    /// First label in `config` the policy rejects, if any.
    pub fn first_violation<'a>(&self, config: &'a Configuration) -> Option<&'a str> {
        config
            .category_labels()
            .into_iter()
            .find(|label| !self.allows(label))
    }
}

/// A configuration together with the version token of the bytes it was
/// decoded from.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    /// Decoded configuration.
    pub config: Configuration,
    /// [`version_token`] of the file content.
    pub version: String,
}

/// Load the configuration at `path`, accepting any category label.
pub fn load(path: &Path) -> Result<Configuration> {
    load_with(path, &CategoryPolicy::Any)
}

/// Load the configuration at `path`, enforcing `policy`.
pub fn load_with(path: &Path, policy: &CategoryPolicy) -> Result<Configuration> {
    load_versioned(path, policy).map(|loaded| loaded.config)
}

/// Load the configuration and compute its version token in one read.
pub fn load_versioned(path: &Path, policy: &CategoryPolicy) -> Result<Loaded> {
    let bytes = read_raw(path)?;
    let config = decode_bytes(&bytes)?;
    if let Some(label) = policy.first_violation(&config) {
        return Err(Error::parse(format!(
            "category label {label:?} is not in the allowed list"
        )));
    }
    tracing::debug!(
        path = %path.display(),
        squads = config.len(),
        "Loaded configuration"
    );
    Ok(Loaded {
        config,
        version: version_token(&bytes),
    })
}

/// Read the file at `path` verbatim.
pub fn read_raw(path: &Path) -> Result<Vec<u8>> {
    if path.is_dir() {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Save `config` to `path`, accepting any valid category label.
pub fn save(path: &Path, config: &Configuration) -> Result<()> {
    save_with(path, config, &CategoryPolicy::Any).map(|_| ())
}

/// Save `config` to `path`, enforcing `policy`. Returns the version token
/// of the written content.
pub fn save_with(path: &Path, config: &Configuration, policy: &CategoryPolicy) -> Result<String> {
    if let Some(label) = policy.first_violation(config) {
        return Err(Error::InvalidLabel {
            label: label.to_string(),
        });
    }
    let xml = encode(config)?;
    write_atomic(path, xml.as_bytes())?;
    tracing::debug!(
        path = %path.display(),
        squads = config.len(),
        "Saved configuration"
    );
    Ok(version_token(xml.as_bytes()))
}

/// Save `config` only if the file still has version `expected`.
///
/// With `expected = None` this is [`save_with`]. A missing file has the
/// empty version token.
pub fn save_checked(
    path: &Path,
    config: &Configuration,
    policy: &CategoryPolicy,
    expected: Option<&str>,
) -> Result<String> {
    if let Some(expected) = expected {
        let actual = match read_raw(path) {
            Ok(bytes) => version_token(&bytes),
            Err(Error::NotFound { .. }) => String::new(),
            Err(e) => return Err(e),
        };
        if actual != expected {
            return Err(Error::VersionConflict {
                expected: expected.to_string(),
                actual,
            });
        }
    }
    save_with(path, config, policy)
}

/// Hex SHA-256 of `bytes`, used as an opaque content version.
pub fn version_token(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decode a document from raw bytes (UTF-8, optional BOM).
pub fn decode_bytes(bytes: &[u8]) -> Result<Configuration> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| Error::parse(format!("document is not valid UTF-8: {e}")))?;
    decode(xml)
}

/// Decode a document from a string.
pub fn decode(xml: &str) -> Result<Configuration> {
    let root = parse_document(xml)?;
    if root.name != ROOT_ELEMENT {
        return Err(Error::parse(format!(
            "root element is <{}>, expected <{ROOT_ELEMENT}>",
            root.name
        )));
    }

    let mut config = Configuration::new();
    for element in root.descendants("squad") {
        let (name, squad) = decode_squad(element)?;
        config.insert(name, squad);
    }
    Ok(config)
}

/// Encode `config` as a complete XML document.
pub fn encode(config: &Configuration) -> Result<String> {
    if let Some(label) = config
        .category_labels()
        .into_iter()
        .find(|label| !is_valid_label(label))
    {
        return Err(Error::InvalidLabel {
            label: label.to_string(),
        });
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    emit(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

    for (name, squad) in config.iter() {
        let mut start = BytesStart::new("squad");
        start.push_attribute(("name", name));
        emit(&mut writer, Event::Start(start))?;

        emit_map(&mut writer, "engineers", &squad.engineers, format_float)?;
        emit_map(&mut writer, "efficiency", &squad.efficiency, format_float)?;
        if squad.start_date.is_empty() {
            emit(&mut writer, Event::Empty(BytesStart::new("startDate")))?;
        } else {
            emit(&mut writer, Event::Start(BytesStart::new("startDate")))?;
            emit(&mut writer, Event::Text(BytesText::new(&squad.start_date)))?;
            emit(&mut writer, Event::End(BytesEnd::new("startDate")))?;
        }

        if squad.projects.is_empty() {
            emit(&mut writer, Event::Empty(BytesStart::new("projects")))?;
        } else {
            emit(&mut writer, Event::Start(BytesStart::new("projects")))?;
            for project in &squad.projects {
                emit_project(&mut writer, project)?;
            }
            emit(&mut writer, Event::End(BytesEnd::new("projects")))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("squad")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(|e| Error::Encode {
        message: e.to_string(),
    })?;
    xml.push('\n');
    Ok(xml)
}

/// Whether `label` is an XML attribute name. Decoding and encoding apply
/// the same rule, so any loaded document can be saved back.
pub fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || matches!(first, '_' | ':') => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_squad(element: &Element) -> Result<(String, Squad)> {
    let name = required_attribute(element, "name", "squad")?.to_string();
    let context = format!("squad {name:?}");

    let engineers = float_map(
        required_child(element, "engineers", &context)?,
        &context,
    )?;
    let efficiency = float_map(
        required_child(element, "efficiency", &context)?,
        &context,
    )?;
    let start = required_child(element, "startDate", &context)?;
    let start_date = if start.text.trim().is_empty() {
        start
            .attribute("text")
            .map(str::to_string)
            .unwrap_or_else(|| start.text.clone())
    } else {
        start.text.clone()
    };

    let projects = required_child(element, "projects", &context)?
        .descendants("project")
        .into_iter()
        .map(|project| decode_project(project, &context))
        .collect::<Result<Vec<_>>>()?;

    Ok((
        name,
        Squad {
            engineers,
            efficiency,
            start_date,
            projects,
        },
    ))
}

fn decode_project(element: &Element, squad_context: &str) -> Result<Project> {
    let context = format!("{squad_context} project");
    let id = required_attribute(element, "id", &context)?.to_string();
    let context = format!("{squad_context} project {id:?}");
    let name = required_attribute(element, "name", &context)?.to_string();
    let raw_priority = required_attribute(element, "priority", &context)?;
    let priority = parse_int(raw_priority).ok_or_else(|| Error::Type {
        field: format!("{context} priority"),
        value: raw_priority.to_string(),
        expected: "integer",
    })?;

    let effort = float_map(required_child(element, "effort", &context)?, &context)?;
    let concurrency = int_map(
        required_child(element, "concurrency", &context)?,
        &context,
    )?;

    Ok(Project {
        id,
        name,
        priority,
        effort,
        concurrency,
    })
}

fn required_attribute<'a>(element: &'a Element, key: &str, context: &str) -> Result<&'a str> {
    element
        .attribute(key)
        .ok_or_else(|| Error::parse(format!("{context} is missing the {key:?} attribute")))
}

fn required_child<'a>(element: &'a Element, name: &str, context: &str) -> Result<&'a Element> {
    element
        .child(name)
        .ok_or_else(|| Error::parse(format!("{context} is missing <{name}>")))
}

fn float_map(element: &Element, context: &str) -> Result<CategoryMap<f64>> {
    category_map(element, context, parse_float, "float")
}

fn int_map(element: &Element, context: &str) -> Result<CategoryMap<i64>> {
    category_map(element, context, parse_int, "integer")
}

fn category_map<V>(
    element: &Element,
    context: &str,
    parse: fn(&str) -> Option<V>,
    expected: &'static str,
) -> Result<CategoryMap<V>> {
    element
        .attributes
        .iter()
        .map(|(label, raw)| {
            if !is_valid_label(label) {
                return Err(Error::parse(format!(
                    "{context} <{}> has invalid category label {label:?}",
                    element.name
                )));
            }
            parse(raw)
                .map(|value| (label.clone(), value))
                .ok_or_else(|| Error::Type {
                    field: format!("{context} {}.{label}", element.name),
                    value: raw.clone(),
                    expected,
                })
        })
        .collect()
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

// ============================================================================
// Encoding
// ============================================================================

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| Error::Encode {
        message: e.to_string(),
    })
}

fn emit_map<V>(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    map: &CategoryMap<V>,
    format: fn(&V) -> String,
) -> Result<()> {
    let mut element = BytesStart::new(name);
    for (label, value) in map {
        let value = format(value);
        element.push_attribute((label.as_str(), value.as_str()));
    }
    emit(writer, Event::Empty(element))
}

fn emit_project(writer: &mut Writer<Vec<u8>>, project: &Project) -> Result<()> {
    let priority = project.priority.to_string();
    let mut start = BytesStart::new("project");
    start.push_attribute(("id", project.id.as_str()));
    start.push_attribute(("name", project.name.as_str()));
    start.push_attribute(("priority", priority.as_str()));
    emit(writer, Event::Start(start))?;
    emit_map(writer, "effort", &project.effort, format_float)?;
    emit_map(writer, "concurrency", &project.concurrency, i64::to_string)?;
    emit(writer, Event::End(BytesEnd::new("project")))
}

/// Shortest round-trip form, always with a fractional part for integral
/// values (`2.0`, not `2`).
fn format_float(value: &f64) -> String {
    format!("{value:?}")
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if path.is_dir() {
        return Err(Error::write(
            path,
            std::io::Error::other("destination is a directory"),
        ));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".squadplan-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::write(path, e))?;
    tmp.write_all(contents).map_err(|e| Error::write(path, e))?;
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::write(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| Error::write(path, e))?;
    tmp.persist(path).map_err(|e| Error::write(path, e.error))?;
    Ok(())
}

// ============================================================================
// Minimal element tree
// ============================================================================

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::parse(format!("element name is not UTF-8: {e}")))?
            .to_string();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| Error::parse(format!("<{name}>: {e}")))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| Error::parse(format!("<{name}> attribute name: {e}")))?
                .to_string();
            let value = attribute
                .unescape_value()
                .map_err(|e| Error::parse(format!("<{name}> attribute {key:?}: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            ..Element::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child named `name`.
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All elements named `name` below this one, in document order.
    fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse(format!(
                "malformed XML near byte {}: {e}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse("closing tag without an open element"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::parse(format!("invalid text content: {e}")))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| Error::parse(format!("CDATA is not UTF-8: {e}")))?;
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::parse("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(Error::parse(format!(
                "unexpected second root element <{}>",
                element.name
            )));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(Error::parse("text outside the root element")),
    }
    Ok(())
}
