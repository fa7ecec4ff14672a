/*!
 This module defines the stream decoder and the helpers shared by its consumers.
*/

pub mod dates;
pub mod objectstream;
