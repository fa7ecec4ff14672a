/*!
 Dates and times from `java.util` and `java.time`.
*/

use crate::{
    error::known_type::KnownTypeError,
    known_types::{annotation::AnnotationReader, KnownType},
    util::{
        dates::{duration, from_epoch_millis, from_epoch_seconds, local_date},
        objectstream::models::DecodedObject,
    },
};

pub(crate) const DATE_CLASS: &str = "java.util.Date";
/// The serialization proxy every `java.time` value is written through
pub(crate) const TIME_PROXY_CLASS: &str = "java.time.Ser";

const DURATION_TYPE: i8 = 1;
const INSTANT_TYPE: i8 = 2;
const LOCAL_DATE_TYPE: i8 = 3;

/// `java.util.Date` writes milliseconds since the epoch
pub(crate) fn date_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, DATE_CLASS)?;
    Ok(KnownType::Date(from_epoch_millis(reader.read_i64()?)?))
}

/// `java.time.Ser` writes a type byte followed by the fields of that type
pub(crate) fn time_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, TIME_PROXY_CLASS)?;
    Ok(match reader.read_i8()? {
        DURATION_TYPE => {
            let seconds = reader.read_i64()?;
            KnownType::Duration(duration(seconds, reader.read_i32()?)?)
        }
        INSTANT_TYPE => {
            let seconds = reader.read_i64()?;
            KnownType::Instant(from_epoch_seconds(seconds, reader.read_i32()?)?)
        }
        LOCAL_DATE_TYPE => {
            let year = reader.read_i32()?;
            let month = reader.read_i8()?;
            KnownType::LocalDate(local_date(year, month, reader.read_i8()?)?)
        }
        other => KnownType::UnsupportedTime(other),
    })
}

#[cfg(test)]
mod time_tests {
    use std::env::current_dir;
    use std::fs::File;
    use std::io::Read;

    use chrono::{NaiveDate, TimeDelta};

    use crate::{
        error::known_type::KnownTypeError,
        known_types::KnownType,
        util::{
            dates::format,
            objectstream::{
                constants::TC_OBJECT,
                models::{Content, DecodedObject, Value},
                parser::StreamReader,
                tests::builder::StreamBuilder,
            },
        },
    };

    fn read_fixture(name: &str) -> Vec<u8> {
        let fixture_path = current_dir()
            .unwrap()
            .as_path()
            .join("test_data/objectstream")
            .join(name);
        let mut file = File::open(fixture_path).unwrap();
        let mut bytes = vec![];
        file.read_to_end(&mut bytes).unwrap();
        bytes
    }

    fn parse_object(bytes: &[u8]) -> DecodedObject {
        match StreamReader::new(bytes).parse().unwrap() {
            Content::Value(Value::Object(object)) => *object,
            other => panic!("Expected an object, got {other:?}"),
        }
    }

    /// A `java.time.Ser` object wrapping the given block data
    fn time_proxy(block: &str) -> Vec<u8> {
        StreamBuilder::new()
            .byte(TC_OBJECT)
            .class_desc("java.time.Ser", 0x0C, &[])
            .null()
            .hex(block)
            .end_block()
            .build()
    }

    #[test]
    fn can_read_date() {
        let object = parse_object(&read_fixture("Date"));

        let Some(KnownType::Date(date)) = KnownType::from_object(&object).unwrap() else {
            panic!("Expected a date");
        };
        assert_eq!(format(&date), "2019-06-19T04:52:41.088Z");
    }

    #[test]
    fn can_read_instants() {
        let object = parse_object(&read_fixture("GroupDialogStateSnapshot"));

        let dates: Vec<String> = ["lastMessageDate", "lastReadDate", "lastReceiveDate"]
            .iter()
            .map(|name| {
                let instant = object.field(name).and_then(Value::as_object).unwrap();
                match KnownType::from_object(instant).unwrap() {
                    Some(KnownType::Instant(date)) => format(&date),
                    other => panic!("Expected an instant, got {other:?}"),
                }
            })
            .collect();

        assert_eq!(
            dates,
            vec![
                "2018-06-09T13:44:27.892Z",
                "2018-05-23T13:20:55.704Z",
                "2018-06-09T13:44:27.892Z"
            ]
        );
    }

    #[test]
    fn can_read_duration() {
        let object = parse_object(&time_proxy("77 0D 01 0000000000000005 1DCD6500"));

        assert_eq!(
            KnownType::from_object(&object).unwrap(),
            Some(KnownType::Duration(TimeDelta::milliseconds(5_500)))
        );
    }

    #[test]
    fn can_read_local_date() {
        let object = parse_object(&time_proxy("77 07 03 000007E8 02 1D"));

        assert_eq!(
            KnownType::from_object(&object).unwrap(),
            Some(KnownType::LocalDate(
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
            ))
        );
    }

    #[test]
    fn can_flag_unsupported_time() {
        let object = parse_object(&time_proxy("77 01 05"));

        assert_eq!(
            KnownType::from_object(&object).unwrap(),
            Some(KnownType::UnsupportedTime(5))
        );
    }

    #[test]
    fn cant_read_truncated_instant() {
        let object = parse_object(&time_proxy("77 05 02 00000000"));

        assert!(matches!(
            KnownType::from_object(&object),
            Err(KnownTypeError::Stream(_))
        ));
    }
}
