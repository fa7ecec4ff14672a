/*!
 Lists, maps, and sets from `java.util`.

 These classes mark their element storage `transient` and write the elements themselves,
 so the values live in the annotations rather than in the declared fields.
*/

use crate::{
    error::known_type::KnownTypeError,
    known_types::{annotation::AnnotationReader, KnownType},
    util::objectstream::models::{DecodedObject, Value},
};

pub(crate) const ARRAY_LIST_CLASS: &str = "java.util.ArrayList";
pub(crate) const LINKED_LIST_CLASS: &str = "java.util.LinkedList";
pub(crate) const HASH_MAP_CLASS: &str = "java.util.HashMap";
pub(crate) const HASHTABLE_CLASS: &str = "java.util.Hashtable";
pub(crate) const TREE_MAP_CLASS: &str = "java.util.TreeMap";
pub(crate) const HASH_SET_CLASS: &str = "java.util.HashSet";
pub(crate) const TREE_SET_CLASS: &str = "java.util.TreeSet";

/// `size` field, then the capacity, then each element
pub(crate) fn array_list_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let size = match object
        .class_data_for(ARRAY_LIST_CLASS)
        .and_then(|data| data.values.iter().find(|field| field.name == "size"))
        .map(|field| &field.value)
    {
        Some(Value::Int(size)) => usize::try_from(*size)
            .map_err(|_| KnownTypeError::InvalidCount(ARRAY_LIST_CLASS.to_string(), *size))?,
        _ => {
            return Err(KnownTypeError::MissingField(
                ARRAY_LIST_CLASS.to_string(),
                "size".to_string(),
            ))
        }
    };

    let mut reader = AnnotationReader::for_class(object, ARRAY_LIST_CLASS)?;
    reader.read_i32()?;
    Ok(KnownType::List(reader.read_values(size)?))
}

/// The element count, then each element
pub(crate) fn linked_list_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, LINKED_LIST_CLASS)?;
    let size = reader.read_count()?;
    Ok(KnownType::List(reader.read_values(size)?))
}

/// Bucket count, entry count, then alternating keys and values
pub(crate) fn hash_map_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, HASH_MAP_CLASS)?;
    reader.read_i32()?;
    read_entries(&mut reader)
}

/// Original table length, entry count, then alternating keys and values
pub(crate) fn hashtable_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, HASHTABLE_CLASS)?;
    reader.read_i32()?;
    read_entries(&mut reader)
}

/// Entry count, then alternating keys and values
pub(crate) fn tree_map_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, TREE_MAP_CLASS)?;
    read_entries(&mut reader)
}

/// Capacity, load factor, element count, then each element
pub(crate) fn hash_set_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, HASH_SET_CLASS)?;
    reader.read_i32()?;
    reader.read_f32()?;
    let size = reader.read_count()?;
    Ok(KnownType::Set(reader.read_values(size)?))
}

/// The comparator object, element count, then each element
pub(crate) fn tree_set_from_object(object: &DecodedObject) -> Result<KnownType, KnownTypeError> {
    let mut reader = AnnotationReader::for_class(object, TREE_SET_CLASS)?;
    reader.read_value()?;
    let size = reader.read_count()?;
    Ok(KnownType::Set(reader.read_values(size)?))
}

fn read_entries(reader: &mut AnnotationReader<'_>) -> Result<KnownType, KnownTypeError> {
    let size = reader.read_count()?;
    let mut entries = Vec::with_capacity(size.min(u16::MAX as usize));
    for _ in 0..size {
        let key = reader.read_value()?;
        entries.push((key, reader.read_value()?));
    }
    Ok(KnownType::Map(entries))
}
