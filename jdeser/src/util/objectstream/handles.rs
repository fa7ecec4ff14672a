/*!
 The table of handles assigned while decoding a stream.
*/

use std::fmt::{Display, Formatter, Result};

use crate::util::objectstream::{constants::BASE_WIRE_HANDLE, models::Handle};

/// Summary of the element a handle was assigned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleEntry {
    ClassDescriptor(String),
    Object(String),
    Array(String),
    String(String),
    Enum(String),
    Class(String),
}

impl HandleEntry {
    /// The kind of element, for display
    pub fn kind(&self) -> &'static str {
        match self {
            HandleEntry::ClassDescriptor(_) => "class descriptor",
            HandleEntry::Object(_) => "object",
            HandleEntry::Array(_) => "array",
            HandleEntry::String(_) => "string",
            HandleEntry::Enum(_) => "enum",
            HandleEntry::Class(_) => "class",
        }
    }
}

impl Display for HandleEntry {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            HandleEntry::String(value) => write!(fmt, "string {value:?}"),
            HandleEntry::ClassDescriptor(name)
            | HandleEntry::Object(name)
            | HandleEntry::Array(name)
            | HandleEntry::Enum(name)
            | HandleEntry::Class(name) => write!(fmt, "{} {name}", self.kind()),
        }
    }
}

/// Assigns handles in encounter order and resolves them back to what they identify
///
/// Handles start at `0x7E0000` and increase by one for every class descriptor, object, array,
/// string, enum constant, and class read from the stream. They are never reused.
#[derive(Debug, Default)]
pub struct HandleTable {
    entries: Vec<HandleEntry>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle the next call to [`HandleTable::assign`] will return
    pub fn next_handle(&self) -> Handle {
        // The table cannot hold more entries than the stream has bytes
        Handle(BASE_WIRE_HANDLE + self.entries.len() as u32)
    }

    /// Assign the next handle to `entry`
    pub fn assign(&mut self, entry: HandleEntry) -> Handle {
        let handle = self.next_handle();
        self.entries.push(entry);
        handle
    }

    /// Look up an already-assigned handle
    pub fn get(&self, handle: Handle) -> Option<&HandleEntry> {
        self.entries.get(handle.index()?)
    }

    /// The string a handle was assigned to, if it was assigned to a string
    pub fn get_string(&self, handle: Handle) -> Option<&str> {
        match self.get(handle)? {
            HandleEntry::String(value) => Some(value),
            _ => None,
        }
    }

    /// Replace the summary of an already-assigned handle, i.e. once an enum's constant name is known
    pub(crate) fn update(&mut self, handle: Handle, entry: HandleEntry) {
        if let Some(slot) = handle.index().and_then(|idx| self.entries.get_mut(idx)) {
            *slot = entry;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every assigned handle in order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &HandleEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (Handle(BASE_WIRE_HANDLE + idx as u32), entry))
    }
}

#[cfg(test)]
mod handle_tests {
    use crate::util::objectstream::{
        handles::{HandleEntry, HandleTable},
        models::Handle,
    };

    #[test]
    fn can_assign_sequential_handles() {
        let mut table = HandleTable::new();

        let first = table.assign(HandleEntry::ClassDescriptor("Foo".to_string()));
        let second = table.assign(HandleEntry::String("abc".to_string()));
        let third = table.assign(HandleEntry::Object("Foo".to_string()));

        assert_eq!(first, Handle(0x7E0000));
        assert_eq!(second, Handle(0x7E0001));
        assert_eq!(third, Handle(0x7E0002));
        assert_eq!(table.next_handle(), Handle(0x7E0003));
    }

    #[test]
    fn can_resolve_handles() {
        let mut table = HandleTable::new();
        table.assign(HandleEntry::ClassDescriptor("Foo".to_string()));
        let string = table.assign(HandleEntry::String("Ljava/lang/String;".to_string()));

        assert_eq!(table.get_string(string), Some("Ljava/lang/String;"));
        assert_eq!(table.get_string(Handle(0x7E0000)), None);
        assert_eq!(table.get(Handle(0x7E0002)), None);
        assert_eq!(table.get(Handle(0x00)), None);
    }

    #[test]
    fn can_display_entries() {
        assert_eq!(
            HandleEntry::String("abc".to_string()).to_string(),
            "string \"abc\""
        );
        assert_eq!(
            HandleEntry::Object("java.util.Date".to_string()).to_string(),
            "object java.util.Date"
        );
    }
}
