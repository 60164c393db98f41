//! Parser for the header of a `.npy` array file.
//!
//! Layout: `\x93NUMPY`, major and minor version bytes, a little-endian header
//! length (u16 for v1, u32 for v2/v3), then an ASCII Python dict literal such as
//! `{'descr': '|u1', 'fortran_order': False, 'shape': (120, 80, 3, 42), }`.

const MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NpyHeader {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Offset of the first data byte from the start of the `.npy` payload.
    pub data_offset: usize,
}

impl NpyHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < 10 || &bytes[..MAGIC.len()] != MAGIC {
            return Err("missing NUMPY magic".to_string());
        }
        let major = bytes[6];
        let (header_len, header_start) = match major {
            1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
            2 | 3 => {
                if bytes.len() < 12 {
                    return Err("header length field truncated".to_string());
                }
                let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
                (len as usize, 12)
            }
            other => return Err(format!("unsupported format version {other}")),
        };
        let data_offset = header_start + header_len;
        let dict = bytes
            .get(header_start..data_offset)
            .ok_or_else(|| "header extends past end of data".to_string())?;
        let dict = std::str::from_utf8(dict).map_err(|_| "header is not ASCII".to_string())?;

        let descr = parse_quoted(dict_value(dict, "descr")?)?;
        let fortran_order = parse_bool(dict_value(dict, "fortran_order")?)?;
        let shape = parse_shape(dict_value(dict, "shape")?)?;

        Ok(Self {
            descr,
            fortran_order,
            shape,
            data_offset,
        })
    }

    /// True for one-byte unsigned integer arrays (`|u1`, `<u1`, `u1`).
    pub fn is_u8(&self) -> bool {
        self.descr.trim_start_matches(['|', '<', '>', '=']) == "u1"
    }

    /// Number of elements the shape declares, or `None` if it overflows `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
    }
}

fn dict_value<'a>(dict: &'a str, key: &str) -> Result<&'a str, String> {
    for quote in ['\'', '"'] {
        let needle = format!("{quote}{key}{quote}");
        if let Some(pos) = dict.find(&needle) {
            let rest = dict[pos + needle.len()..].trim_start();
            let rest = rest
                .strip_prefix(':')
                .ok_or_else(|| format!("missing ':' after '{key}'"))?;
            return Ok(rest.trim_start());
        }
    }
    Err(format!("missing key '{key}'"))
}

fn parse_quoted(value: &str) -> Result<String, String> {
    let quote = value
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| "descr is not a string".to_string())?;
    let body = &value[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| "unterminated descr string".to_string())?;
    Ok(body[..end].to_string())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    if value.starts_with("True") {
        Ok(true)
    } else if value.starts_with("False") {
        Ok(false)
    } else {
        Err("fortran_order is not a boolean".to_string())
    }
}

fn parse_shape(value: &str) -> Result<Vec<usize>, String> {
    let body = value
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| "shape is not a tuple".to_string())?;
    body.split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| format!("invalid shape dimension '{dim}'"))
        })
        .collect()
}

/// Serialises a v1 header for `shape`, padded so data starts on a 64-byte boundary.
#[cfg(test)]
pub(crate) fn encode_u8_header(shape: &[usize], fortran_order: bool) -> Vec<u8> {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    let shape_text = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let order = if fortran_order { "True" } else { "False" };
    let mut dict = format!("{{'descr': '|u1', 'fortran_order': {order}, 'shape': {shape_text}, }}");
    let unpadded = MAGIC.len() + 4 + dict.len() + 1;
    dict.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    dict.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + dict.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(dict: &str) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out
    }

    #[test]
    fn test_parses_numpy_written_header() {
        let bytes = raw_header(
            "{'descr': '|u1', 'fortran_order': False, 'shape': (120, 80, 3, 42), }          \n",
        );
        let header = NpyHeader::parse(&bytes).unwrap();
        assert_eq!(header.descr, "|u1");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![120, 80, 3, 42]);
        assert_eq!(header.data_offset, bytes.len());
        assert!(header.is_u8());
        assert_eq!(header.element_count(), Some(120 * 80 * 3 * 42));
    }

    #[test]
    fn test_encoded_header_is_aligned_and_round_trips() {
        let bytes = encode_u8_header(&[2, 3, 3, 5], true);
        assert_eq!(bytes.len() % 64, 0);
        let header = NpyHeader::parse(&bytes).unwrap();
        assert!(header.fortran_order);
        assert_eq!(header.shape, vec![2, 3, 3, 5]);
        assert_eq!(header.data_offset, bytes.len());
    }

    #[test]
    fn test_single_dimension_tuple() {
        let bytes = raw_header("{'descr': '<f8', 'fortran_order': False, 'shape': (7,), }\n");
        let header = NpyHeader::parse(&bytes).unwrap();
        assert_eq!(header.shape, vec![7]);
        assert!(!header.is_u8());
    }

    #[test]
    fn test_overflowing_shape_has_no_element_count() {
        let bytes = encode_u8_header(&[1 << 32, 1 << 32, 3, 2], false);
        let header = NpyHeader::parse(&bytes).unwrap();
        assert_eq!(header.element_count(), None);
    }

    #[test]
    fn test_rejects_missing_magic() {
        assert!(NpyHeader::parse(b"not a numpy file at all").is_err());
    }

    #[test]
    fn test_rejects_truncated_header() {
        let mut bytes = raw_header("{'descr': '|u1', 'fortran_order': False, 'shape': (1,), }\n");
        bytes.truncate(20);
        assert!(NpyHeader::parse(&bytes).is_err());
    }

    #[test]
    fn test_rejects_missing_shape() {
        let bytes = raw_header("{'descr': '|u1', 'fortran_order': False, }\n");
        let err = NpyHeader::parse(&bytes).unwrap_err();
        assert!(err.contains("shape"));
    }
}
