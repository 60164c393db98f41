use serde::{Deserialize, Serialize};

use crate::shared::resolution::Resolution;

/// Derived state recorded once a full extraction pass completes.
///
/// Serialised as `{"largest_res": [max_height, max_width]}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    largest_res: [u32; 2],
}

impl CorpusMetadata {
    pub fn new(largest: Resolution) -> Self {
        Self {
            largest_res: largest.into(),
        }
    }

    pub fn largest_resolution(&self) -> Resolution {
        self.largest_res.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_height_then_width() {
        let meta = CorpusMetadata::new(Resolution::new(120, 90));
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"largest_res":[120,90]}"#);
    }

    #[test]
    fn test_deserialises_record_with_extra_whitespace() {
        let meta: CorpusMetadata =
            serde_json::from_str("{\n    \"largest_res\": [\n        240,\n        320\n    ]\n}")
                .unwrap();
        assert_eq!(meta.largest_resolution(), Resolution::new(240, 320));
    }
}
