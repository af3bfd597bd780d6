//! JSON output shared by every persisted artifact.

use serde::Serialize;

use crate::error::Result;

/// Serializes `value` as JSON indented by four spaces.
///
/// Map keys come out in the order the value yields them; the workspace uses
/// `BTreeMap`s and alphabetically declared fields so keys end up sorted.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_vec_indented<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
