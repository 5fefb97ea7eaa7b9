use crate::error::Error;
use url::Url;

/// Appends path segments to a base URL, trimming a trailing empty segment
/// so `https://host/` and `https://host` build the same request path.
pub(crate) fn build_url(base_url: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base_url.clone();
    {
        let mut path_segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        path_segments.pop_if_empty();
        for segment in segments {
            path_segments.push(segment);
        }
    }
    Ok(url)
}
