/*!
 Errors that can happen while decoding serialized streams and interpreting their contents.
*/

pub mod known_type;
pub mod stream;
