use url::Url;

/// Returns the network location (`host[:port]`) of a URL, lowercased
///
/// This is the key the site router matches against. No `www.` stripping
/// or suffix matching happens here.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitesift::url::network_location;
///
/// let url = Url::parse("https://Mp.Weixin.QQ.com/s/abc").unwrap();
/// assert_eq!(network_location(&url), Some("mp.weixin.qq.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(network_location(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns the bare origin of a URL (`scheme://host[:port]`, no trailing slash)
///
/// Relative links on a page are resolved against this origin.
pub fn origin_of(url: &Url) -> Option<String> {
    let location = network_location(url)?;
    Some(format!("{}://{}", url.scheme(), location))
}
