//! Percent-encoding of user-supplied URL path segments.

use url::Url;

/// Base used only to borrow `url`'s path-segment encoder.
const SEGMENT_BASE: &str = "http://segments.invalid/";

/// Joins `segments` with `/`, percent-encoding each one so that `?`, `#`,
/// `%`, spaces and embedded `/` cannot change the shape of the path.
pub(crate) fn encode_segments<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    Url::parse(SEGMENT_BASE)
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut().ok()?.clear().extend(segments);
            Some(url.path().trim_start_matches('/').to_owned())
        })
        .unwrap_or_default()
}

/// Encodes a name such as `feature/login fix`, keeping its `/` separators.
pub(crate) fn encode_slashed(value: &str) -> String {
    encode_segments(value.split('/'))
}
