use crate::error::{LoopcastError, Result};
use m3u8_rs::{Playlist, parse_playlist_res};
use tracing::debug;

/// Parse HLS playlist from string content
pub fn parse_hls_playlist(content: &str) -> Result<Playlist> {
    debug!("Parsing HLS playlist");

    parse_playlist_res(content.as_bytes())
        .map_err(|e| LoopcastError::PlaylistParseError(format!("{:?}", e)))
}

/// Serialize playlist to string
pub fn serialize_playlist(playlist: &Playlist) -> Result<String> {
    let mut output = Vec::new();
    playlist
        .write_to(&mut output)
        .map_err(|e| LoopcastError::PlaylistModifyError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| {
        LoopcastError::ConversionError(format!("playlist is not UTF-8: {}", e))
    })
}
