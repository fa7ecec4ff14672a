/*!
 Interpretation of JDK classes whose custom serialized form is public.

 Classes such as `java.util.HashMap` or `java.time.Instant` keep their state in transient fields
 and write it by hand, so the decoded object only holds opaque annotation contents. This module
 reads those contents back into the values they represent.

 ```
 use jdeser::{
     known_types::KnownType,
     util::objectstream::{models::{Content, Value}, parser::StreamReader},
 };

 // A java.util.Date
 let bytes = [
     0xAC, 0xED, 0x00, 0x05, 0x73, 0x72, 0x00, 0x0E, 0x6A, 0x61, 0x76, 0x61, 0x2E, 0x75, 0x74,
     0x69, 0x6C, 0x2E, 0x44, 0x61, 0x74, 0x65, 0x68, 0x6A, 0x81, 0x01, 0x4B, 0x59, 0x74, 0x19,
     0x03, 0x00, 0x00, 0x78, 0x70, 0x77, 0x08, 0x00, 0x00, 0x01, 0x6B, 0x6E, 0x14, 0x6E, 0x00,
     0x78,
 ];
 let Content::Value(Value::Object(object)) = StreamReader::new(&bytes).parse().unwrap() else {
     panic!("Expected an object");
 };
 let known = KnownType::from_object(&object).unwrap().unwrap();
 assert_eq!(known.to_string(), "2019-06-19T04:52:41.088Z");
 ```
*/

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::{
    error::known_type::KnownTypeError,
    util::{
        dates::{format, format_duration},
        objectstream::models::{DecodedObject, Value},
    },
};

pub mod annotation;
pub mod boxed;
pub mod collections;
pub mod time;

/// A value recovered from the custom serialized form of a JDK class
#[derive(Debug, Clone, PartialEq)]
pub enum KnownType {
    /// `java.util.Date`
    Date(DateTime<Utc>),
    /// `java.time.Instant`
    Instant(DateTime<Utc>),
    /// `java.time.Duration`
    Duration(TimeDelta),
    /// `java.time.LocalDate`
    LocalDate(NaiveDate),
    /// A `java.time` type this crate does not interpret, by its serial type byte
    UnsupportedTime(i8),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    /// A boxed primitive such as `java.lang.Integer`
    Boxed(Value),
}

impl KnownType {
    /// Interpret `object` if any class in its hierarchy is one this module understands
    ///
    /// The most derived recognized class wins, so a `java.util.LinkedHashMap` is read as the
    /// `java.util.HashMap` it extends. Returns `Ok(None)` for everything else.
    pub fn from_object(object: &DecodedObject) -> Result<Option<Self>, KnownTypeError> {
        use collections::*;

        for class in object.chain.iter() {
            let known = match class.name.as_str() {
                time::DATE_CLASS => time::date_from_object(object)?,
                time::TIME_PROXY_CLASS => time::time_from_object(object)?,
                ARRAY_LIST_CLASS => array_list_from_object(object)?,
                LINKED_LIST_CLASS => linked_list_from_object(object)?,
                HASH_MAP_CLASS => hash_map_from_object(object)?,
                HASHTABLE_CLASS => hashtable_from_object(object)?,
                TREE_MAP_CLASS => tree_map_from_object(object)?,
                HASH_SET_CLASS => hash_set_from_object(object)?,
                TREE_SET_CLASS => tree_set_from_object(object)?,
                name if boxed::BOXED_CLASSES.contains(&name) => {
                    boxed::boxed_from_object(object, name)?
                }
                _ => continue,
            };
            return Ok(Some(known));
        }
        Ok(None)
    }

    /// A short name for the kind of value, for display
    pub fn kind(&self) -> &'static str {
        match self {
            KnownType::Date(_) => "date",
            KnownType::Instant(_) => "instant",
            KnownType::Duration(_) => "duration",
            KnownType::LocalDate(_) => "local date",
            KnownType::UnsupportedTime(_) => "time",
            KnownType::List(_) => "list",
            KnownType::Map(_) => "map",
            KnownType::Set(_) => "set",
            KnownType::Boxed(_) => "boxed",
        }
    }
}

impl Display for KnownType {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            KnownType::Date(date) | KnownType::Instant(date) => write!(fmt, "{}", format(date)),
            KnownType::Duration(duration) => write!(fmt, "{}", format_duration(duration)),
            KnownType::LocalDate(date) => write!(fmt, "{}", date.format("%Y-%m-%d")),
            KnownType::UnsupportedTime(kind) => write!(fmt, "java.time value of type {kind}"),
            KnownType::List(values) | KnownType::Set(values) => {
                write!(fmt, "{} of {} elements", self.kind(), values.len())
            }
            KnownType::Map(entries) => write!(fmt, "map of {} entries", entries.len()),
            KnownType::Boxed(value) => match value.primitive_to_string() {
                Some(primitive) => write!(fmt, "{primitive}"),
                None => write!(fmt, "{value:?}"),
            },
        }
    }
}

#[cfg(test)]
mod known_type_tests {
    use chrono::{NaiveDate, TimeDelta};

    use crate::{
        known_types::KnownType,
        util::{dates::from_epoch_millis, objectstream::models::Value},
    };

    #[test]
    fn can_display_known_types() {
        assert_eq!(
            KnownType::Date(from_epoch_millis(0).unwrap()).to_string(),
            "1970-01-01T00:00:00.000Z"
        );
        assert_eq!(
            KnownType::Duration(TimeDelta::seconds(61)).to_string(),
            "PT61S"
        );
        assert_eq!(
            KnownType::LocalDate(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()).to_string(),
            "1999-12-31"
        );
        assert_eq!(
            KnownType::List(vec![Value::Null, Value::Null]).to_string(),
            "list of 2 elements"
        );
        assert_eq!(KnownType::Map(vec![]).to_string(), "map of 0 entries");
        assert_eq!(KnownType::Boxed(Value::Double(2.0)).to_string(), "2.0");
    }
}
