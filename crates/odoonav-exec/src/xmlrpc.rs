use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use odoonav_core::error::StoreError;

const SCALAR_TAGS: &[&str] = &[
    "int",
    "i4",
    "i8",
    "boolean",
    "double",
    "string",
    "nil",
    "dateTime.iso8601",
    "base64",
];

const TRANSPARENT_TAGS: &[&str] = &["methodResponse", "params", "param", "data", "fault"];

pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(param, &mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(value: &Value, out: &mut String) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(flag) => {
            out.push_str("<boolean>");
            out.push_str(if *flag { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(number) => encode_number(number, out),
        Value::String(text) => {
            out.push_str("<string>");
            out.push_str(&escape(text.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(member, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

fn encode_number(number: &Number, out: &mut String) {
    let (tag, text) = match number.as_i64() {
        Some(int) if i32::try_from(int).is_ok() => ("int", int.to_string()),
        Some(int) => ("i8", int.to_string()),
        None => match number.as_u64() {
            Some(unsigned) => ("i8", unsigned.to_string()),
            None => ("double", number.to_string()),
        },
    };
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&text);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

pub fn decode_response(body: &str) -> Result<Value, StoreError> {
    let mut reader = Reader::from_str(body);
    let mut decoder = ResponseDecoder::default();

    loop {
        match reader.read_event().map_err(|err| decode_error(err.to_string()))? {
            Event::Start(start) => {
                let tag = tag_name(start.local_name().as_ref())?;
                decoder.open(&tag)?;
            }
            Event::Empty(start) => {
                let tag = tag_name(start.local_name().as_ref())?;
                decoder.open(&tag)?;
                decoder.close(&tag)?;
            }
            Event::End(end) => {
                let tag = tag_name(end.local_name().as_ref())?;
                decoder.close(&tag)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| decode_error(err.to_string()))?;
                decoder.text(&text);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                decoder.text(&String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    decoder.finish()
}

fn decode_error(message: impl Into<String>) -> StoreError {
    StoreError::Decode(message.into())
}

fn tag_name(raw: &[u8]) -> Result<String, StoreError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| decode_error(format!("element name is not utf-8: {err}")))
}

enum Frame {
    Value { text: String, typed: Option<Value> },
    Scalar { tag: String, text: String },
    Array(Vec<Value>),
    Struct(Map<String, Value>),
    Member { name: Option<String>, value: Option<Value> },
    Name(String),
}

impl Frame {
    fn tag(&self) -> &str {
        match self {
            Self::Value { .. } => "value",
            Self::Scalar { tag, .. } => tag,
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Member { .. } => "member",
            Self::Name(_) => "name",
        }
    }
}

#[derive(Default)]
struct ResponseDecoder {
    stack: Vec<Frame>,
    values: Vec<Value>,
    fault: bool,
}

impl ResponseDecoder {
    fn open(&mut self, tag: &str) -> Result<(), StoreError> {
        if tag == "fault" {
            self.fault = true;
        }
        if TRANSPARENT_TAGS.contains(&tag) {
            return Ok(());
        }
        let frame = match tag {
            "value" => Frame::Value {
                text: String::new(),
                typed: None,
            },
            "array" => Frame::Array(Vec::new()),
            "struct" => Frame::Struct(Map::new()),
            "member" => Frame::Member {
                name: None,
                value: None,
            },
            "name" => Frame::Name(String::new()),
            scalar if SCALAR_TAGS.contains(&scalar) => Frame::Scalar {
                tag: scalar.to_string(),
                text: String::new(),
            },
            other => return Err(decode_error(format!("unexpected element <{other}>"))),
        };
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self, tag: &str) -> Result<(), StoreError> {
        if TRANSPARENT_TAGS.contains(&tag) {
            return Ok(());
        }
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| decode_error(format!("unbalanced </{tag}>")))?;
        if frame.tag() != tag {
            return Err(decode_error(format!(
                "expected </{}>, found </{tag}>",
                frame.tag()
            )));
        }

        match frame {
            Frame::Value { text, typed } => self.deliver(typed.unwrap_or(Value::String(text))),
            Frame::Scalar { tag, text } => {
                let value = scalar_value(&tag, &text)?;
                self.set_typed(value)
            }
            Frame::Array(items) => self.set_typed(Value::Array(items)),
            Frame::Struct(members) => self.set_typed(Value::Object(members)),
            Frame::Member { name, value } => match (self.stack.last_mut(), name) {
                (Some(Frame::Struct(members)), Some(name)) => {
                    members.insert(name, value.unwrap_or(Value::Null));
                    Ok(())
                }
                _ => Err(decode_error("struct member without a name")),
            },
            Frame::Name(text) => match self.stack.last_mut() {
                Some(Frame::Member { name, .. }) => {
                    *name = Some(text);
                    Ok(())
                }
                _ => Err(decode_error("<name> outside a struct member")),
            },
        }
    }

    fn text(&mut self, chunk: &str) {
        match self.stack.last_mut() {
            Some(Frame::Value { text, .. })
            | Some(Frame::Scalar { text, .. })
            | Some(Frame::Name(text)) => text.push_str(chunk),
            _ => {}
        }
    }

    fn set_typed(&mut self, value: Value) -> Result<(), StoreError> {
        match self.stack.last_mut() {
            Some(Frame::Value { typed, .. }) => {
                *typed = Some(value);
                Ok(())
            }
            _ => Err(decode_error("typed content outside <value>")),
        }
    }

    fn deliver(&mut self, value: Value) -> Result<(), StoreError> {
        match self.stack.last_mut() {
            None => self.values.push(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Member { value: slot, .. }) => *slot = Some(value),
            Some(other) => {
                return Err(decode_error(format!(
                    "<value> nested directly in <{}>",
                    other.tag()
                )))
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Value, StoreError> {
        if let Some(open) = self.stack.last() {
            return Err(decode_error(format!(
                "response ended inside <{}>",
                open.tag()
            )));
        }
        let value = self.values.into_iter().next();
        if self.fault {
            return Err(fault_error(value.unwrap_or(Value::Null)));
        }
        value.ok_or_else(|| decode_error("response carries no value"))
    }
}

fn scalar_value(tag: &str, text: &str) -> Result<Value, StoreError> {
    match tag {
        "int" | "i4" | "i8" => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|err| decode_error(format!("bad <{tag}> {text:?}: {err}"))),
        "boolean" => match text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(decode_error(format!("bad <boolean> {other:?}"))),
        },
        "double" => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| decode_error(format!("bad <double> {text:?}"))),
        "nil" => Ok(Value::Null),
        "string" => Ok(Value::String(text.to_string())),
        _ => Ok(Value::String(text.trim().to_string())),
    }
}

fn fault_error(detail: Value) -> StoreError {
    let code = detail
        .get("faultCode")
        .and_then(|code| match code {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0);
    let message = detail
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("unknown fault")
        .to_string();
    StoreError::Fault { code, message }
}
