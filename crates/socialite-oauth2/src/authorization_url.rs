// Authorization URL builder.
//
// Appends query pairs in the order given, form-urlencoded, and skips pairs
// whose value is `None` so optional parameters never appear empty.

use url::Url;

/// Build a redirect URL from an endpoint, ordered query pairs and an optional
/// fragment.
pub fn build_url(
    endpoint: &str,
    pairs: &[(&str, Option<String>)],
    fragment: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(endpoint)?;

    let present: Vec<(&str, &str)> = pairs
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
        .collect();

    // Opening the serializer with nothing to write would leave a bare "?".
    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }

    url.set_fragment(fragment);

    Ok(url)
}
