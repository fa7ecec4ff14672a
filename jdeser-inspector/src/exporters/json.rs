use std::io::Write;

use base64::{prelude::BASE64_STANDARD, Engine};
use json::{from, object, JsonValue};

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
    app::{error::RuntimeError, runtime::DecodedPayload},
    exporters::exporter::{Exporter, Writer},
};

/// Writes one JSON document per payload, one per line
pub struct JSON<'a> {
    out: &'a mut dyn Write,
}

impl<'a> Exporter<'a> for JSON<'a> {
    fn new(out: &'a mut dyn Write) -> Self {
        JSON { out }
    }

    fn export(&mut self, decoded: &DecodedPayload) -> Result<(), RuntimeError> {
        let document = self.format_payload(decoded);
        JSON::write_to_file(self.out, &(document.dump() + "\n"))
    }
}

impl JSON<'_> {
    fn format_payload(&self, decoded: &DecodedPayload) -> JsonValue {
        let handles = decoded.reader.handles();

        let mut document = object! {
            source: decoded.source,
            size: decoded.size,
            diagnostics: decoded
                .reader
                .diagnostics()
                .iter()
                .map(|diagnostic| from(diagnostic.to_string()))
                .collect::<Vec<_>>(),
            contents: decoded
                .contents
                .iter()
                .map(|content| self.format_content(content, handles))
                .collect::<Vec<_>>(),
            trailing: decoded.trailing(),
        };
        if let Some(digest) = &decoded.digest {
            document["sha1"] = from(digest.as_str());
        }
        document
    }
}

impl Writer for JSON<'_> {
    type Output = JsonValue;

    fn format_content(&self, content: &Content, handles: &HandleTable) -> JsonValue {
        match content {
            Content::Value(value) => self.format_value(value, handles),
            Content::ClassDescriptor(chain) => self.format_class_chain(chain),
            Content::BlockData(bytes) => self.format_block_data(bytes),
        }
    }

    fn format_value(&self, value: &Value, handles: &HandleTable) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Byte(value) => from(*value),
            Value::Char(_) => from(value.primitive_to_string()),
            Value::Double(value) => from(*value),
            Value::Float(value) => from(*value),
            Value::Int(value) => from(*value),
            Value::Long(value) => from(*value),
            Value::Short(value) => from(*value),
            Value::Boolean(value) => from(*value),
            Value::String(string) => {
                let mut json_string = object! {
                    type: "string",
                    handle: string.handle.to_string(),
                    value: string.value.as_str(),
                };
                if let Some(raw) = &string.raw {
                    json_string["raw"] = from(BASE64_STANDARD.encode(raw));
                }
                json_string
            }
            Value::Array(array) => self.format_array(array, handles),
            Value::Object(object) => self.format_object(object, handles),
            Value::Enum(constant) => object! {
                type: "enum",
                handle: constant.handle.to_string(),
                class: constant.class_name.as_str(),
                constant: constant.constant.as_str(),
            },
            Value::Class(class) => object! {
                type: "class",
                class: class.chain.name(),
                handle: class.handle.to_string(),
                descriptor: self.format_class_chain(&class.chain),
            },
            Value::Reference(handle) => {
                let mut reference = object! {
                    type: "reference",
                    handle: handle.to_string(),
                };
                if let Some(entry) = handles.get(*handle) {
                    reference["target"] = from(entry.to_string());
                }
                reference
            }
        }
    }

    fn format_object(&self, object: &DecodedObject, handles: &HandleTable) -> JsonValue {
        let mut json_object = object! {
            type: "object",
            class: object.class_name(),
            handle: object.handle.to_string(),
        };

        match KnownType::from_object(object) {
            Ok(Some(known)) => json_object["known"] = self.format_known(&known, handles),
            Ok(None) => {}
            Err(why) => json_object["known_error"] = from(why.to_string()),
        }

        json_object["class_data"] = JsonValue::Array(
            object
                .class_data
                .iter()
                .map(|data| {
                    let mut fields = object! {};
                    for field in &data.values {
                        fields[field.name.as_str()] = self.format_value(&field.value, handles);
                    }
                    let mut json_data = object! {
                        class: data.class_name.as_str(),
                        fields: fields,
                    };
                    if let Some(annotations) = &data.annotations {
                        json_data["annotations"] = JsonValue::Array(
                            annotations
                                .iter()
                                .map(|content| self.format_content(content, handles))
                                .collect(),
                        );
                    }
                    json_data
                })
                .collect(),
        );

        json_object
    }

    fn format_array(&self, array: &DecodedArray, handles: &HandleTable) -> JsonValue {
        object! {
            type: "array",
            class: signature_to_type_name(&array.class_name),
            handle: array.handle.to_string(),
            elements: array
                .elements
                .iter()
                .map(|element| self.format_value(element, handles))
                .collect::<Vec<_>>(),
        }
    }

    fn format_class_chain(&self, chain: &ClassChain) -> JsonValue {
        let classes = chain
            .iter()
            .map(|class| {
                let mut json_class = object! {
                    name: class.name.as_str(),
                    handle: class.handle.to_string(),
                    flags: class.flags.bits(),
                    fields: class
                        .fields
                        .iter()
                        .map(|field| object! {
                            name: field.name.as_str(),
                            type: field.type_name(),
                        })
                        .collect::<Vec<_>>(),
                };
                match &class.kind {
                    DescriptorKind::Proxy(interfaces) => {
                        json_class["interfaces"] = JsonValue::Array(
                            interfaces.iter().map(|name| from(name.as_str())).collect(),
                        );
                    }
                    DescriptorKind::Class => {
                        json_class["serial_version_uid"] =
                            from(format!("{:#018x}", class.serial_version_uid));
                    }
                }
                json_class
            })
            .collect::<Vec<_>>();

        object! {
            type: "class_descriptor",
            classes: classes,
        }
    }

    fn format_known(&self, known: &KnownType, handles: &HandleTable) -> JsonValue {
        let mut json_known = object! {
            kind: known.kind(),
        };
        match known {
            KnownType::List(values) | KnownType::Set(values) => {
                json_known["elements"] = JsonValue::Array(
                    values
                        .iter()
                        .map(|value| self.format_value(value, handles))
                        .collect(),
                );
            }
            KnownType::Map(entries) => {
                json_known["entries"] = JsonValue::Array(
                    entries
                        .iter()
                        .map(|(key, value)| object! {
                            key: self.format_value(key, handles),
                            value: self.format_value(value, handles),
                        })
                        .collect(),
                );
            }
            KnownType::Boxed(value) => json_known["value"] = self.format_value(value, handles),
            KnownType::UnsupportedTime(kind) => json_known["time_type"] = from(*kind),
            KnownType::Date(_)
            | KnownType::Instant(_)
            | KnownType::Duration(_)
            | KnownType::LocalDate(_) => json_known["value"] = from(known.to_string()),
        }
        json_known
    }

    fn format_block_data(&self, bytes: &[u8]) -> JsonValue {
        object! {
            type: "block_data",
            size: bytes.len(),
            data: BASE64_STANDARD.encode(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use jdeser::util::objectstream::{
        handles::HandleTable,
        models::{Handle, JavaString, Value},
        parser::DecoderOptions,
    };

    use crate::{
        app::{export_type::ExportType, input::InputFormat, options::Options, runtime::Config},
        exporters::{
            exporter::{Exporter, Writer},
            json::JSON,
        },
    };

    fn fake_config(digest: bool) -> Config {
        Config::new(Options {
            paths: vec![],
            input_format: InputFormat::Auto,
            export_type: ExportType::Json,
            decode_all: true,
            decoder: DecoderOptions::default(),
            digest,
            verbosity: 0,
        })
        .unwrap()
    }

    fn render(bytes: &[u8], digest: bool) -> json::JsonValue {
        let config = fake_config(digest);
        let decoded = config.decode("payload", bytes).unwrap();
        let mut out = vec![];
        JSON::new(&mut out).export(&decoded).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        json::parse(&text).unwrap()
    }

    #[test]
    fn can_format_primitives() {
        let mut out = vec![];
        let exporter = JSON::new(&mut out);
        let handles = HandleTable::new();

        assert!(exporter.format_value(&Value::Null, &handles).is_null());
        assert_eq!(exporter.format_value(&Value::Int(-7), &handles), -7);
        assert_eq!(exporter.format_value(&Value::Boolean(true), &handles), true);
        assert_eq!(exporter.format_value(&Value::Char(0x41), &handles), "A");
    }

    #[test]
    fn can_format_lossy_string_with_raw_bytes() {
        let mut out = vec![];
        let exporter = JSON::new(&mut out);
        let value = Value::String(JavaString {
            handle: Handle(0x7E0000),
            value: "a\u{FFFD}b".to_string(),
            raw: Some(vec![0x61, 0xFF, 0x62]),
        });

        let string = exporter.format_value(&value, &HandleTable::new());

        assert_eq!(string["value"], "a\u{FFFD}b");
        assert_eq!(string["raw"], "Yf9i");
    }

    #[test]
    fn can_export_class_and_reference_to_it() {
        let bytes = hex::decode(concat!(
            "aced0005",
            "76",
            "7200034261720000000000000001020000",
            "7870",
            "71007e0001"
        ))
        .unwrap();

        let document = render(&bytes, false);
        let contents = &document["contents"];

        assert_eq!(contents[0]["type"], "class");
        assert_eq!(contents[0]["class"], "Bar");
        assert_eq!(contents[0]["handle"], "0x7e0001");
        assert_eq!(contents[1]["handle"], "0x7e0001");
        assert_eq!(contents[1]["target"], "class Bar");
    }

    #[test]
    fn can_format_block_data() {
        let mut out = vec![];
        let exporter = JSON::new(&mut out);

        let block = exporter.format_block_data(&[0xCA, 0xFE]);

        assert_eq!(block["type"], "block_data");
        assert_eq!(block["size"], 2);
        assert_eq!(block["data"], "yv4=");
    }

    #[test]
    fn can_export_object() {
        let bytes = hex::decode(concat!(
            "aced0005737200045465737400000000000000010200034900016",
            "24c00016174001",
            "24c6a6176612f6c616e672f537472696e673b5b000163740002",
            "5b42787000000001740002616175720002",
            "5b42acf317f8060854e002000078700000000401020304"
        ))
        .unwrap();

        let document = render(&bytes, false);

        assert_eq!(document["source"], "payload");
        assert_eq!(document["size"], 99);
        assert_eq!(document["trailing"], 0);
        assert!(document["sha1"].is_null());

        let object = &document["contents"][0];
        assert_eq!(object["type"], "object");
        assert_eq!(object["class"], "Test");
        assert_eq!(object["handle"], "0x7e0003");

        let fields = &object["class_data"][0]["fields"];
        assert_eq!(fields["b"], 1);
        assert_eq!(fields["a"]["value"], "aa");
        assert_eq!(fields["c"]["class"], "byte[]");
        assert_eq!(fields["c"]["elements"].len(), 4);
        assert_eq!(fields["c"]["elements"][3], 4);
    }

    #[test]
    fn can_export_known_type() {
        let bytes = hex::decode(concat!(
            "aced00057372000e6a6176612e7574696c2e44617465686a81014b59741903",
            "00007870770800",
            "00016b6e146e0078"
        ))
        .unwrap();

        let document = render(&bytes, true);

        let known = &document["contents"][0]["known"];
        assert_eq!(known["kind"], "date");
        assert_eq!(known["value"], "2019-06-19T04:52:41.088Z");
        assert_eq!(document["sha1"].as_str().map(str::len), Some(40));

        let annotations = &document["contents"][0]["class_data"][0]["annotations"];
        assert_eq!(annotations[0]["type"], "block_data");
        assert_eq!(annotations[0]["size"], 8);
    }

    #[test]
    fn can_export_references_and_descriptors() {
        let bytes = hex::decode(concat!(
            "aced0005",
            "7200034261720000000000000001020000",
            "7870",
            "7371007e0000",
            "71007e0001"
        ))
        .unwrap();

        let document = render(&bytes, false);
        let contents = &document["contents"];

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["type"], "class_descriptor");
        assert_eq!(contents[0]["classes"][0]["name"], "Bar");
        assert_eq!(
            contents[0]["classes"][0]["serial_version_uid"],
            "0x0000000000000001"
        );
        assert_eq!(contents[1]["class"], "Bar");
        assert_eq!(contents[2]["type"], "reference");
        assert_eq!(contents[2]["handle"], "0x7e0001");
        assert_eq!(contents[2]["target"], "object Bar");
    }
}
