/*!
 Boxed primitives from `java.lang`.
*/

use crate::{
    error::known_type::KnownTypeError,
    known_types::KnownType,
    util::objectstream::models::DecodedObject,
};

/// Classes that store their primitive in a single `value` field
pub(crate) const BOXED_CLASSES: [&str; 8] = [
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Double",
    "java.lang.Float",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Short",
];

pub(crate) fn boxed_from_object(
    object: &DecodedObject,
    class_name: &str,
) -> Result<KnownType, KnownTypeError> {
    object
        .class_data_for(class_name)
        .and_then(|data| data.values.iter().find(|field| field.name == "value"))
        .map(|field| KnownType::Boxed(field.value.clone()))
        .ok_or_else(|| KnownTypeError::MissingField(class_name.to_string(), "value".to_string()))
}

#[cfg(test)]
mod boxed_tests {
    use crate::{
        error::known_type::KnownTypeError,
        known_types::KnownType,
        util::objectstream::{
            constants::TC_OBJECT,
            models::{Content, Value},
            parser::StreamReader,
            tests::builder::StreamBuilder,
        },
    };

    #[test]
    fn can_read_integer() {
        let bytes = StreamBuilder::new()
            .byte(TC_OBJECT)
            .class_desc("java.lang.Integer", 0x02, &[(b'I', "value", None)])
            .class_desc("java.lang.Number", 0x02, &[])
            .null()
            .int(-7)
            .build();
        let Content::Value(Value::Object(object)) = StreamReader::new(&bytes).parse().unwrap()
        else {
            panic!("Expected an object");
        };

        assert_eq!(
            KnownType::from_object(&object).unwrap(),
            Some(KnownType::Boxed(Value::Int(-7)))
        );
    }

    #[test]
    fn cant_read_boxed_without_value() {
        let bytes = StreamBuilder::new()
            .byte(TC_OBJECT)
            .class_desc("java.lang.Long", 0x02, &[])
            .null()
            .build();
        let Content::Value(Value::Object(object)) = StreamReader::new(&bytes).parse().unwrap()
        else {
            panic!("Expected an object");
        };

        assert_eq!(
            KnownType::from_object(&object),
            Err(KnownTypeError::MissingField(
                "java.lang.Long".to_string(),
                "value".to_string()
            ))
        );
    }

    #[test]
    fn can_ignore_number() {
        let bytes = StreamBuilder::new()
            .byte(TC_OBJECT)
            .class_desc("java.lang.Number", 0x02, &[])
            .null()
            .build();
        let Content::Value(Value::Object(object)) = StreamReader::new(&bytes).parse().unwrap()
        else {
            panic!("Expected an object");
        };

        assert_eq!(KnownType::from_object(&object), Ok(None));
    }
}
