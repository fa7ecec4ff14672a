/*!
 Contains logic and data structures used to decode Java object serialization streams into native Rust data structures.

 ## Overview

 The stream protocol is the binary format written by `java.io.ObjectOutputStream` and read by
 `java.io.ObjectInputStream`. It is also the payload format of Java RMI calls and return values.

 A stream is self-referential: every class descriptor, object, array, string, class and enum constant
 is assigned a handle as it is read, and later elements may point back at any of them instead of
 encoding them again.

 ## Features

 - Pure Rust, single-pass decoding with no class definitions required
 - Never executes `readObject`, `readExternal`, or any other class code
 - Handle table and class descriptor registry scoped to one decode session
 - Typed errors for malformed, truncated, or hostile input
*/

pub mod constants;
pub mod cursor;
pub mod handles;
pub mod models;
pub mod parser;
pub mod registry;
#[cfg(test)]
pub(crate) mod tests;
