//! HTTP Range request parsing module
//!
//! Single `bytes` range parsing per RFC 7233.

/// Inclusive byte range, already clamped to the file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total_size: usize) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    Valid(ByteRange),
    /// Syntactically valid but outside the file - should return 416
    NotSatisfiable,
    /// No Range header, other unit, multi-range or malformed: serve the full body
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(byte_ranges) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if byte_ranges.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = byte_ranges.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        parse_suffix_range(end_str, file_size)
    } else {
        parse_standard_range(start_str, end_str, file_size)
    }
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeParseResult::None;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    // Suffix larger than the file selects the whole file
    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: usize) -> RangeParseResult {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParseResult::None;
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<usize>() {
            Ok(e) => Some(e),
            Err(_) => return RangeParseResult::None,
        }
    };

    // A reversed range is invalid syntax and gets ignored
    if end.is_some_and(|e| e < start) {
        return RangeParseResult::None;
    }

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = file_size - 1;
    RangeParseResult::Valid(ByteRange {
        start,
        end: end.map_or(last, |e| e.min(last)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
        assert_eq!(
            parse_range_header(Some("items=0-9"), 100),
            RangeParseResult::None
        );
    }

    #[test]
    fn test_standard_range() {
        let RangeParseResult::Valid(r) = parse_range_header(Some("bytes=0-9"), 100) else {
            panic!("Expected Valid");
        };
        assert_eq!((r.start, r.end, r.len()), (0, 9, 10));
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_and_clamped_range() {
        assert_eq!(
            parse_range_header(Some("bytes=50-"), 100),
            RangeParseResult::Valid(ByteRange { start: 50, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=90-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range_header(Some("bytes=-20"), 100),
            RangeParseResult::Valid(ByteRange { start: 80, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
        );
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            parse_range_header(Some("bytes=200-"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=-0"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=-5"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(parse_range_header(Some("bytes=a-b"), 100), RangeParseResult::None);
        assert_eq!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeParseResult::None
        );
        assert_eq!(parse_range_header(Some("bytes=9-3"), 100), RangeParseResult::None);
        assert_eq!(parse_range_header(Some("bytes=5"), 100), RangeParseResult::None);
    }
}
