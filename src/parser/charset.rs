//! Text decoding for HTML parts.

use encoding_rs::{Encoding, GB18030, UTF_8, WINDOWS_1252};

/// Decode HTML bytes to a string.
///
/// Tries a byte-order mark first, then the declared charset, then UTF-8,
/// GB18030 and finally windows-1252. The first lossless decode wins.
pub fn decode_html(data: &[u8], declared_charset: Option<&str>) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        if let Some(text) = decode_strict(encoding, &data[bom_len..]) {
            return text;
        }
    }

    let declared = declared_charset.and_then(|label| Encoding::for_label(label.trim().as_bytes()));
    if let Some(encoding) = declared {
        match decode_strict(encoding, data) {
            Some(text) => return text,
            None => log::debug!(
                "Declared charset {} does not decode cleanly, trying fallbacks",
                encoding.name()
            ),
        }
    }

    for encoding in [UTF_8, GB18030] {
        if let Some(text) = decode_strict(encoding, data) {
            return text;
        }
    }

    let (text, _, _) = WINDOWS_1252.decode(data);
    text.into_owned()
}

fn decode_strict(encoding: &'static Encoding, data: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_html("名称".as_bytes(), None), "名称");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice("<p>x</p>".as_bytes());
        assert_eq!(decode_html(&data, None), "<p>x</p>");
    }

    #[test]
    fn test_declared_gbk() {
        let (bytes, _, _) = GB18030.encode("数量");
        assert_eq!(decode_html(&bytes, Some("gb2312")), "数量");
    }

    #[test]
    fn test_gb18030_fallback() {
        let (bytes, _, _) = GB18030.encode("螺丝");
        assert_eq!(decode_html(&bytes, None), "螺丝");
    }

    #[test]
    fn test_unknown_label_ignored() {
        assert_eq!(decode_html(b"plain", Some("x-made-up")), "plain");
    }
}
