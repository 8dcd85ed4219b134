//! Minimal reader for NumPy `.npy` string arrays.
//!
//! Fixed-width string dtypes are decoded directly: `U` (UTF-32 code units)
//! and `S` (bytes). Object arrays (`|O`) carry a pickle payload, which is
//! accepted when it holds a flat sequence of strings.

use crate::error::{Error, Result};
use serde_pickle::{DeOptions, Value as Pickled};
use std::path::Path;

const MAGIC: &[u8] = b"\x93NUMPY";

/// Parsed `.npy` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Dtype descriptor, e.g. `<U12`.
    pub descr: String,
    /// Whether data is stored column-major.
    pub fortran_order: bool,
    /// Array shape; empty for a scalar.
    pub shape: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Unicode { big_endian: bool },
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    Fixed { kind: StringKind, width: usize },
    Object,
}

/// Read a string array from a `.npy` file, flattened in storage order.
pub fn read_string_array(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    decode_string_array(&bytes).map_err(|reason| Error::RegisteredList {
        path: path.to_path_buf(),
        reason,
    })
}

/// Decode a string array from `.npy` bytes.
pub fn decode_string_array(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    let (header, data) = split_header(bytes)?;
    let count = header
        .shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
        .ok_or_else(|| "array shape overflows".to_string())?;

    match parse_descr(&header.descr)? {
        Dtype::Object => decode_object_array(data, count),
        Dtype::Fixed { kind, width } => decode_fixed_array(data, count, kind, width),
    }
}

fn decode_fixed_array(
    data: &[u8],
    count: usize,
    kind: StringKind,
    width: usize,
) -> std::result::Result<Vec<String>, String> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if width == 0 {
        return Err("zero-width string dtype".to_string());
    }

    let item_size = match kind {
        StringKind::Unicode { .. } => width.checked_mul(4),
        StringKind::Bytes => Some(width),
    }
    .ok_or_else(|| "dtype width overflows".to_string())?;
    let needed = count
        .checked_mul(item_size)
        .ok_or_else(|| "array size overflows".to_string())?;
    if data.len() < needed {
        return Err(format!(
            "truncated data: expected {needed} bytes, found {}",
            data.len()
        ));
    }

    data[..needed]
        .chunks_exact(item_size)
        .map(|item| decode_item(item, kind))
        .collect()
}

fn decode_object_array(data: &[u8], count: usize) -> std::result::Result<Vec<String>, String> {
    let options = DeOptions::new()
        .decode_strings()
        .replace_unresolved_globals();
    let value = serde_pickle::value_from_slice(data, options)
        .map_err(|e| format!("cannot unpickle object array: {e}"))?;

    // A bare list is what `tolist()` would give; anything else must contain
    // a list with exactly one string per array element.
    string_items(&value)
        .or_else(|| find_string_list(&value, count))
        .ok_or_else(|| "object array does not hold a flat sequence of strings".to_string())
}

fn string_items(value: &Pickled) -> Option<Vec<String>> {
    let (Pickled::List(items) | Pickled::Tuple(items)) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| match item {
            Pickled::String(s) => Some(s.clone()),
            Pickled::Bytes(b) => String::from_utf8(b.clone()).ok(),
            _ => None,
        })
        .collect()
}

fn find_string_list(value: &Pickled, count: usize) -> Option<Vec<String>> {
    if let Some(items) = string_items(value)
        && items.len() == count
    {
        return Some(items);
    }
    match value {
        Pickled::List(items) | Pickled::Tuple(items) => items
            .iter()
            .find_map(|item| find_string_list(item, count)),
        Pickled::Dict(map) => map.values().find_map(|item| find_string_list(item, count)),
        _ => None,
    }
}

fn split_header(bytes: &[u8]) -> std::result::Result<(Header, &[u8]), String> {
    if !bytes.starts_with(MAGIC) {
        return Err("missing NUMPY magic".to_string());
    }
    let major = *bytes.get(6).ok_or("truncated header")?;

    let (len, start): (usize, usize) = match major {
        1 => {
            let raw = bytes.get(8..10).ok_or("truncated header")?;
            (usize::from(u16::from_le_bytes([raw[0], raw[1]])), 10)
        }
        2 | 3 => {
            let raw = bytes.get(8..12).ok_or("truncated header")?;
            let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            (
                usize::try_from(len).map_err(|_| "header too large".to_string())?,
                12,
            )
        }
        other => return Err(format!("unsupported format version {other}")),
    };

    let end = start
        .checked_add(len)
        .ok_or_else(|| "header too large".to_string())?;
    let text = bytes
        .get(start..end)
        .ok_or_else(|| "truncated header".to_string())?;
    let text = std::str::from_utf8(text).map_err(|_| "header is not valid text".to_string())?;
    Ok((parse_header(text)?, &bytes[end..]))
}

/// Parse the Python dict literal that forms the header.
pub fn parse_header(text: &str) -> std::result::Result<Header, String> {
    let descr = dict_value(text, "descr")?;
    let descr = descr
        .strip_prefix('\'')
        .and_then(|rest| rest.split_once('\''))
        .map(|(inner, _)| inner.to_string())
        .ok_or_else(|| "structured dtypes are not supported".to_string())?;

    let fortran_order = match dict_value(text, "fortran_order")? {
        v if v.starts_with("True") => true,
        v if v.starts_with("False") => false,
        _ => return Err("invalid fortran_order".to_string()),
    };

    let shape_text = dict_value(text, "shape")?;
    let inner = shape_text
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| "invalid shape".to_string())?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| format!("invalid dimension '{dim}'"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Header {
        descr,
        fortran_order,
        shape,
    })
}

fn dict_value<'a>(text: &'a str, key: &str) -> std::result::Result<&'a str, String> {
    let quoted = format!("'{key}'");
    let after = text
        .find(&quoted)
        .map(|i| &text[i + quoted.len()..])
        .ok_or_else(|| format!("header has no '{key}'"))?;
    after
        .trim_start()
        .strip_prefix(':')
        .map(str::trim_start)
        .ok_or_else(|| format!("malformed '{key}' entry"))
}

fn parse_descr(descr: &str) -> std::result::Result<Dtype, String> {
    let mut chars = descr.chars();
    let (order, rest) = match chars.next() {
        Some(c @ ('<' | '>' | '|' | '=')) => (c, chars.as_str()),
        _ => ('=', descr),
    };
    let Some(kind) = rest.chars().next() else {
        return Err(format!("invalid dtype '{descr}'"));
    };
    let width = &rest[kind.len_utf8()..];

    let kind = match kind {
        'U' => StringKind::Unicode {
            big_endian: order == '>',
        },
        'S' | 'a' => StringKind::Bytes,
        'O' if width.is_empty() => return Ok(Dtype::Object),
        _ => return Err(format!("dtype '{descr}' is not a string type")),
    };
    let width = width
        .parse::<usize>()
        .map_err(|_| format!("invalid dtype width in '{descr}'"))?;
    Ok(Dtype::Fixed { kind, width })
}

fn decode_item(item: &[u8], kind: StringKind) -> std::result::Result<String, String> {
    match kind {
        StringKind::Unicode { big_endian } => {
            let mut units: Vec<u32> = item
                .chunks_exact(4)
                .map(|unit| {
                    let raw = [unit[0], unit[1], unit[2], unit[3]];
                    if big_endian {
                        u32::from_be_bytes(raw)
                    } else {
                        u32::from_le_bytes(raw)
                    }
                })
                .collect();
            while units.last() == Some(&0) {
                units.pop();
            }
            units
                .into_iter()
                .map(|code| char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}")))
                .collect()
        }
        StringKind::Bytes => {
            let end = item.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            String::from_utf8(item[..end].to_vec()).map_err(|_| "entry is not valid UTF-8".to_string())
        }
    }
}
