//! Host/path classification of source URLs.

const MUSIC_HOST: &str = "music.youtube.com";

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// True when the URL points at the music domain (entries become audio jobs).
pub fn is_music_domain(url: &str) -> bool {
    match host_of(url) {
        Some(host) => host == MUSIC_HOST,
        None => url.contains(MUSIC_HOST),
    }
}

/// True for `youtube.com` and its subdomains (thumbnail embedding applies).
pub fn is_youtube(url: &str) -> bool {
    match host_of(url) {
        Some(host) => host == "youtube.com" || host.ends_with(".youtube.com"),
        None => url.contains("youtube.com/"),
    }
}

/// True for an http(s) locator whose path denotes a playlist.
pub fn is_playlist_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http") && url.contains("/playlist")
}

/// True for Instagram reel URLs, which carry no usable title.
pub fn is_instagram_reel(url: &str) -> bool {
    url.contains("instagram.com/reel/")
}
