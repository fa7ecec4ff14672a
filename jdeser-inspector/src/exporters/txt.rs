use std::{io::Write, iter::once};

use jdeser::{
    known_types::KnownType,
    util::objectstream::{
        handles::HandleTable,
        models::{
            signature_to_type_name, ClassChain, Content, DecodedArray, DecodedObject,
            DescriptorKind, Value,
        },
    },
};

use crate::{
    app::{error::RuntimeError, runtime::DecodedPayload, sanitizers::sanitize_control},
    exporters::exporter::{Exporter, Writer},
};

const INDENT: &str = "  ";
/// Block data longer than this is cut short in the tree
const BLOCK_DATA_PREVIEW: usize = 64;

pub struct TXT<'a> {
    /// Where rendered payloads are written
    out: &'a mut dyn Write,
}

impl<'a> Exporter<'a> for TXT<'a> {
    fn new(out: &'a mut dyn Write) -> Self {
        TXT { out }
    }

    fn export(&mut self, decoded: &DecodedPayload) -> Result<(), RuntimeError> {
        let text = self.format_payload(decoded);
        TXT::write_to_file(self.out, &text)
    }
}

impl TXT<'_> {
    /// Render a payload header followed by each content element
    fn format_payload(&self, decoded: &DecodedPayload) -> String {
        let mut lines = vec![format!(
            "{}: {} bytes",
            sanitize_control(decoded.source),
            decoded.size
        )];
        if let Some(digest) = &decoded.digest {
            lines.push(format!("{INDENT}sha1: {digest}"));
        }
        for diagnostic in decoded.reader.diagnostics() {
            lines.push(format!("{INDENT}! {diagnostic}"));
        }

        let handles = decoded.reader.handles();
        for content in &decoded.contents {
            lines.extend(indent(self.format_content(content, handles)));
        }

        let trailing = decoded.trailing();
        if trailing > 0 {
            lines.push(format!("{INDENT}{trailing} trailing bytes not decoded"));
        }

        let mut text = lines.join("\n");
        text.push_str("\n\n");
        text
    }
}

impl Writer for TXT<'_> {
    type Output = Vec<String>;

    fn format_content(&self, content: &Content, handles: &HandleTable) -> Vec<String> {
        match content {
            Content::Value(value) => self.format_value(value, handles),
            Content::ClassDescriptor(chain) => self.format_class_chain(chain),
            Content::BlockData(bytes) => self.format_block_data(bytes),
        }
    }

    fn format_value(&self, value: &Value, handles: &HandleTable) -> Vec<String> {
        let line = match value {
            Value::Null => "null".to_string(),
            Value::String(string) => match &string.raw {
                Some(raw) => format!(
                    "\"{}\" @{} (lossy, raw {})",
                    sanitize_control(&string.value),
                    string.handle,
                    hex::encode(raw)
                ),
                None => format!("\"{}\" @{}", sanitize_control(&string.value), string.handle),
            },
            Value::Array(array) => return self.format_array(array, handles),
            Value::Object(object) => return self.format_object(object, handles),
            Value::Enum(constant) => format!(
                "{}.{} @{}",
                constant.class_name, constant.constant, constant.handle
            ),
            Value::Class(class) => format!(
                "class {} @{}",
                class.chain.name().unwrap_or_default(),
                class.handle
            ),
            Value::Reference(handle) => match handles.get(*handle) {
                Some(entry) => format!("-> {handle} ({entry})"),
                None => format!("-> {handle}"),
            },
            primitive => format_primitive(primitive),
        };
        vec![line]
    }

    fn format_object(&self, object: &DecodedObject, handles: &HandleTable) -> Vec<String> {
        let mut header = format!("{} @{}", object.class_name(), object.handle);
        let mut children = vec![];

        match KnownType::from_object(object) {
            Ok(Some(known)) => {
                header.push_str(&format!(" = {known}"));
                children.extend(self.format_known(&known, handles));
                return once(header).chain(indent(children)).collect();
            }
            Ok(None) => {}
            Err(why) => children.push(format!("! {why}")),
        }

        for data in &object.class_data {
            for field in &data.values {
                children.extend(nest(
                    &format!("{}: ", field.name),
                    self.format_value(&field.value, handles),
                ));
            }
            if let Some(annotations) = data.annotations.as_ref().filter(|a| !a.is_empty()) {
                children.push(format!("{} annotations:", data.class_name));
                for content in annotations {
                    children.extend(indent(nest(
                        "- ",
                        self.format_content(content, handles),
                    )));
                }
            }
        }

        once(header).chain(indent(children)).collect()
    }

    fn format_array(&self, array: &DecodedArray, handles: &HandleTable) -> Vec<String> {
        let header = format!(
            "{} @{} ({} elements)",
            signature_to_type_name(&array.class_name),
            array.handle,
            array.elements.len()
        );

        if array.element_type.primitive_name().is_some() {
            let elements: Vec<String> = array.elements.iter().map(format_primitive).collect();
            return vec![format!("{header} [{}]", elements.join(", "))];
        }

        let children = array
            .elements
            .iter()
            .enumerate()
            .flat_map(|(idx, element)| nest(&format!("[{idx}] "), self.format_value(element, handles)));
        once(header).chain(indent(children.collect())).collect()
    }

    fn format_class_chain(&self, chain: &ClassChain) -> Vec<String> {
        let mut lines = vec![];
        for (depth, class) in chain.iter().enumerate() {
            let keyword = if depth == 0 { "class" } else { "extends" };
            let header = match &class.kind {
                DescriptorKind::Proxy(interfaces) => format!(
                    "{keyword} {} @{} implements {}",
                    class.name,
                    class.handle,
                    interfaces.join(", ")
                ),
                DescriptorKind::Class => format!(
                    "{keyword} {} @{} suid {:#018x} flags {}",
                    class.name, class.handle, class.serial_version_uid, class.flags
                ),
            };
            lines.push(header);
            lines.extend(indent(
                class
                    .fields
                    .iter()
                    .map(|field| format!("{} {}", field.type_name(), field.name))
                    .collect(),
            ));
        }
        lines
    }

    fn format_known(&self, known: &KnownType, handles: &HandleTable) -> Vec<String> {
        match known {
            KnownType::List(values) | KnownType::Set(values) => values
                .iter()
                .enumerate()
                .flat_map(|(idx, value)| nest(&format!("[{idx}] "), self.format_value(value, handles)))
                .collect(),
            KnownType::Map(entries) => entries
                .iter()
                .enumerate()
                .flat_map(|(idx, (key, value))| {
                    let key = self.format_value(key, handles);
                    let value = self.format_value(value, handles);
                    match key.as_slice() {
                        [key] => nest(&format!("{key} => "), value),
                        _ => nest(&format!("[{idx}] key: "), key)
                            .into_iter()
                            .chain(nest(&format!("[{idx}] value: "), value))
                            .collect(),
                    }
                })
                .collect(),
            _ => vec![],
        }
    }

    fn format_block_data(&self, bytes: &[u8]) -> Vec<String> {
        let preview = &bytes[..bytes.len().min(BLOCK_DATA_PREVIEW)];
        let ellipsis = if preview.len() < bytes.len() { "..." } else { "" };
        vec![format!(
            "block data ({} bytes) {}{ellipsis}",
            bytes.len(),
            hex::encode(preview)
        )]
    }
}

/// Render a primitive; chars are quoted like strings
fn format_primitive(value: &Value) -> String {
    match (value, value.primitive_to_string()) {
        (Value::Char(_), Some(rendered)) => format!("'{}'", sanitize_control(&rendered)),
        (_, Some(rendered)) => rendered,
        (other, None) => format!("{other:?}"),
    }
}

/// Prefix the first line with `label` and indent the rest beneath it
fn nest(label: &str, lines: Vec<String>) -> Vec<String> {
    let mut lines = lines.into_iter();
    let first = lines.next().unwrap_or_default();
    once(format!("{label}{first}"))
        .chain(lines.map(|line| format!("{INDENT}{line}")))
        .collect()
}

fn indent(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| format!("{INDENT}{line}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use jdeser::util::objectstream::{
        handles::HandleTable,
        models::{Content, Handle, JavaString, Value},
        parser::DecoderOptions,
    };

    use crate::{
        app::{
            export_type::ExportType, input::InputFormat, options::Options, runtime::Config,
        },
        exporters::{
            exporter::{Exporter, Writer},
            txt::TXT,
        },
    };

    fn fake_config() -> Config {
        Config::new(Options {
            paths: vec![],
            input_format: InputFormat::Auto,
            export_type: ExportType::Txt,
            decode_all: true,
            decoder: DecoderOptions::default(),
            digest: false,
            verbosity: 0,
        })
        .unwrap()
    }

    fn render(bytes: &[u8]) -> String {
        let config = fake_config();
        let decoded = config.decode("payload", bytes).unwrap();
        let mut out = vec![];
        TXT::new(&mut out).export(&decoded).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn can_format_null() {
        let mut out = vec![];
        let exporter = TXT::new(&mut out);

        assert_eq!(
            exporter.format_value(&Value::Null, &HandleTable::new()),
            vec!["null"]
        );
    }

    #[test]
    fn can_format_string_with_control_chars() {
        let mut out = vec![];
        let exporter = TXT::new(&mut out);
        let value = Value::String(JavaString {
            handle: Handle(0x7E0000),
            value: "a\nb".to_string(),
            raw: None,
        });

        assert_eq!(
            exporter.format_value(&value, &HandleTable::new()),
            vec!["\"a\\nb\" @0x7e0000"]
        );
    }

    #[test]
    fn can_format_lossy_string_with_raw_bytes() {
        let mut out = vec![];
        let exporter = TXT::new(&mut out);
        let value = Value::String(JavaString {
            handle: Handle(0x7E0000),
            value: "a\u{FFFD}b".to_string(),
            raw: Some(vec![0x61, 0xFF, 0x62]),
        });

        assert_eq!(
            exporter.format_value(&value, &HandleTable::new()),
            vec!["\"a\u{FFFD}b\" @0x7e0000 (lossy, raw 61ff62)"]
        );
    }

    #[test]
    fn can_render_class_and_reference_to_it() {
        let bytes = hex::decode(concat!(
            "aced0005",
            "76",
            "7200034261720000000000000001020000",
            "7870",
            "71007e0001"
        ))
        .unwrap();

        let expected = [
            "payload: 29 bytes",
            "  class Bar @0x7e0001",
            "  -> 0x7e0001 (class Bar)",
            "",
            "",
        ]
        .join("\n");

        assert_eq!(render(&bytes), expected);
    }

    #[test]
    fn can_format_chars() {
        let mut out = vec![];
        let exporter = TXT::new(&mut out);

        assert_eq!(
            exporter.format_value(&Value::Char(0xE9), &HandleTable::new()),
            vec!["'é'"]
        );
        assert_eq!(
            exporter.format_value(&Value::Char(0xD800), &HandleTable::new()),
            vec!["'\\\\ud800'"]
        );
    }

    #[test]
    fn can_format_block_data() {
        let mut out = vec![];
        let exporter = TXT::new(&mut out);

        assert_eq!(
            exporter.format_content(&Content::BlockData(vec![0xCA, 0xFE]), &HandleTable::new()),
            vec!["block data (2 bytes) cafe"]
        );
        assert_eq!(
            exporter.format_block_data(&[0; 65])[0],
            format!("block data (65 bytes) {}...", "00".repeat(64))
        );
    }

    #[test]
    fn can_render_object() {
        // Test object with an int, a string, and a byte array
        let bytes = hex::decode(concat!(
            "aced0005737200045465737400000000000000010200034900016",
            "24c00016174001",
            "24c6a6176612f6c616e672f537472696e673b5b000163740002",
            "5b42787000000001740002616175720002",
            "5b42acf317f8060854e002000078700000000401020304"
        ))
        .unwrap();

        let expected = [
            "payload: 99 bytes",
            "  Test @0x7e0003",
            "    b: 1",
            "    a: \"aa\" @0x7e0004",
            "    c: byte[] @0x7e0006 (4 elements) [1, 2, 3, 4]",
            "",
            "",
        ]
        .join("\n");

        assert_eq!(render(&bytes), expected);
    }

    #[test]
    fn can_render_known_type() {
        let bytes = hex::decode(concat!(
            "aced00057372000e6a6176612e7574696c2e44617465686a81014b59741903",
            "00007870770800",
            "00016b6e146e0078"
        ))
        .unwrap();

        assert_eq!(
            render(&bytes),
            "payload: 46 bytes\n  java.util.Date @0x7e0001 = 2019-06-19T04:52:41.088Z\n\n"
        );
    }

    #[test]
    fn can_render_references_and_descriptors() {
        // A class descriptor followed by an object of that class and a reference to the object
        let bytes = hex::decode(concat!(
            "aced0005",
            "7200034261720000000000000001020000",
            "7870",
            "7371007e0000",
            "71007e0001"
        ))
        .unwrap();

        let expected = [
            "payload: 34 bytes",
            "  class Bar @0x7e0000 suid 0x0000000000000001 flags 0x02 (SC_SERIALIZABLE)",
            "  Bar @0x7e0001",
            "  -> 0x7e0001 (object Bar)",
            "",
            "",
        ]
        .join("\n");

        assert_eq!(render(&bytes), expected);
    }

    #[test]
    fn can_render_nested_annotations() {
        let bytes = hex::decode(concat!(
            "aced0005",
            "73720006437573746f6d0000000000000001030000",
            "7870",
            "7702cafe",
            "74000179",
            "78"
        ))
        .unwrap();

        let expected = [
            "payload: 36 bytes",
            "  Custom @0x7e0001",
            "    Custom annotations:",
            "      - block data (2 bytes) cafe",
            "      - \"y\" @0x7e0002",
            "",
            "",
        ]
        .join("\n");

        assert_eq!(render(&bytes), expected);
    }
}
