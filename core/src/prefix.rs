/*!
Output prefix format.

Prefixed outputs start with a one byte format marker followed by the key id
as a big-endian `u32`, so every non-empty prefix is exactly [`PREFIX_SIZE`]
bytes and can be split off a candidate output without further parsing.

| Prefix type         | Layout                       |
|---------------------|------------------------------|
| `Raw`               | empty                        |
| `Tink`              | `0x01 \|\| key_id`           |
| `Legacy`, `Crunchy` | `0x00 \|\| key_id`           |
*/

use super::key::OutputPrefixType;

/// Width in bytes of every non-empty prefix.
pub const PREFIX_SIZE: usize = 5;

/// Format marker for `Tink` prefixes.
pub const TINK_START_BYTE: u8 = 0x01;

/// Format marker for `Legacy` and `Crunchy` prefixes.
pub const LEGACY_START_BYTE: u8 = 0x00;

/// The prefix of `Raw` outputs, and the bucket raw entries are indexed under.
pub const RAW_PREFIX: &[u8] = &[];

/// Byte appended to the input of `Legacy` keys before a MAC is computed or verified.
pub const LEGACY_FORMAT_VERSION: u8 = 0x00;

pub fn output_prefix(prefix_type: OutputPrefixType, key_id: u32) -> Box<[u8]> {
    let start = match prefix_type {
        OutputPrefixType::Raw => return RAW_PREFIX.into(),
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
    };
    let mut prefix = Vec::with_capacity(PREFIX_SIZE);
    prefix.push(start);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    prefix.into()
}

/// Splits a candidate output into `(prefix, remainder)`, or `None` if it is too short to carry a prefix.
pub fn split(output: &[u8]) -> Option<(&[u8], &[u8])> {
    if output.len() >= PREFIX_SIZE {
        Some(output.split_at(PREFIX_SIZE))
    } else {
        None
    }
}
