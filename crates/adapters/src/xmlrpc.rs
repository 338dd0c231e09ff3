//! XML-RPC value model and wire codec
//!
//! Encodes `methodCall` documents and decodes `methodResponse` documents,
//! including faults. Only the subset of the format used by blog APIs is
//! covered: scalar types, `base64`, arrays and structs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error type for encoding and decoding XML-RPC documents
#[derive(Debug, Error)]
pub enum XmlRpcError {
    #[error("Failed to encode request: {0}")]
    Encode(String),
    #[error("Malformed XML: {0}")]
    Xml(String),
    #[error("Unexpected document structure: {0}")]
    Structure(String),
    #[error("Invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: String },
}

/// An XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(Vec<u8>),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Build a struct value from `(name, value)` pairs
    pub fn structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Member of a struct value
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(name),
            _ => None,
        }
    }

    /// Identifier sent either as `<int>` or `<string>`
    pub fn as_id(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A fault returned in place of a method result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> Result<String, XmlRpcError> {
    let mut writer = Writer::new(Vec::new());
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    open(&mut writer, "methodCall")?;
    open(&mut writer, "methodName")?;
    write(&mut writer, Event::Text(BytesText::new(method)))?;
    close(&mut writer, "methodName")?;
    open(&mut writer, "params")?;
    for param in params {
        open(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        close(&mut writer, "param")?;
    }
    close(&mut writer, "params")?;
    close(&mut writer, "methodCall")?;

    String::from_utf8(writer.into_inner()).map_err(|e| XmlRpcError::Encode(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlRpcError> {
    writer
        .write_event(event)
        .map_err(|e| XmlRpcError::Encode(e.to_string()))
}

fn open(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), XmlRpcError> {
    write(writer, Event::Start(BytesStart::new(name)))
}

fn close(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), XmlRpcError> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), XmlRpcError> {
    open(writer, name)?;
    write(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<(), XmlRpcError> {
    open(writer, "value")?;
    match value {
        Value::Int(i) => leaf(writer, "int", &i.to_string())?,
        Value::Bool(b) => leaf(writer, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => leaf(writer, "string", s)?,
        Value::Double(d) => leaf(writer, "double", &d.to_string())?,
        Value::DateTime(d) => leaf(writer, "dateTime.iso8601", d)?,
        Value::Base64(bytes) => leaf(writer, "base64", &STANDARD.encode(bytes))?,
        Value::Array(items) => {
            open(writer, "array")?;
            open(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            close(writer, "data")?;
            close(writer, "array")?;
        }
        Value::Struct(members) => {
            open(writer, "struct")?;
            for (name, member) in members {
                open(writer, "member")?;
                leaf(writer, "name", name)?;
                write_value(writer, member)?;
                close(writer, "member")?;
            }
            close(writer, "struct")?;
        }
        Value::Nil => write(writer, Event::Empty(BytesStart::new("nil")))?,
    }
    close(writer, "value")
}

/// Minimal element tree; text is kept escaped until read
#[derive(Debug, Default)]
struct Element {
    name: String,
    raw_text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> Result<&Element, XmlRpcError> {
        self.child(name).ok_or_else(|| {
            XmlRpcError::Structure(format!("<{}> has no <{}>", self.name, name))
        })
    }

    fn text(&self) -> Result<String, XmlRpcError> {
        quick_xml::escape::unescape(&self.raw_text)
            .map(|s| s.into_owned())
            .map_err(|e| XmlRpcError::Xml(e.to_string()))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlRpcError> {
    std::str::from_utf8(bytes).map_err(|e| XmlRpcError::Xml(e.to_string()))
}

fn parse_tree(xml: &str) -> Result<Element, XmlRpcError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = vec![];
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlRpcError::Xml(e.to_string()))?;

        match event {
            Event::Start(start) => stack.push(Element {
                name: utf8(start.name().as_ref())?.to_string(),
                ..Default::default()
            }),
            Event::Empty(start) => {
                let element = Element {
                    name: utf8(start.name().as_ref())?.to_string(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlRpcError::Xml("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.raw_text.push_str(utf8(&text)?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    current.raw_text.push('&');
                    current.raw_text.push_str(utf8(&reference)?);
                    current.raw_text.push(';');
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .raw_text
                        .push_str(&quick_xml::escape::escape(utf8(&data)?));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| XmlRpcError::Structure("empty document".to_string()))
}

fn parse_value(value: &Element) -> Result<Value, XmlRpcError> {
    let Some(typed) = value.children.first() else {
        // Untyped values are strings
        return Ok(Value::String(value.text()?));
    };

    let invalid = |kind: &'static str, text: &str| XmlRpcError::InvalidValue {
        kind,
        value: text.to_string(),
    };

    match typed.name.as_str() {
        "int" | "i4" | "i8" => {
            let text = typed.text()?;
            text.trim()
                .parse()
                .map(Value::Int)
                .map_err(|_| invalid("int", &text))
        }
        "boolean" => match typed.text()?.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(invalid("boolean", other)),
        },
        "string" => Ok(Value::String(typed.text()?)),
        "double" => {
            let text = typed.text()?;
            text.trim()
                .parse()
                .map(Value::Double)
                .map_err(|_| invalid("double", &text))
        }
        "dateTime.iso8601" => Ok(Value::DateTime(typed.text()?.trim().to_string())),
        "base64" => {
            let text: String = typed
                .text()?
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            STANDARD
                .decode(&text)
                .map(Value::Base64)
                .map_err(|_| invalid("base64", &text))
        }
        "array" => typed
            .require("data")?
            .children
            .iter()
            .filter(|c| c.name == "value")
            .map(parse_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text()?;
                let value = parse_value(member.require("value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        "nil" => Ok(Value::Nil),
        other => Err(XmlRpcError::Structure(format!("unknown value type <{}>", other))),
    }
}

/// Decode a `methodResponse` document into either its result or its fault
pub fn parse_response(xml: &str) -> Result<Result<Value, Fault>, XmlRpcError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(XmlRpcError::Structure(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = parse_value(fault.require("value")?)?;
        let code = value
            .member("faultCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| XmlRpcError::Structure("fault without faultCode".to_string()))?;
        let message = value
            .member("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(Err(Fault { code, message }));
    }

    let value = root
        .require("params")?
        .require("param")?
        .require("value")?;
    Ok(Ok(parse_value(value)?))
}
