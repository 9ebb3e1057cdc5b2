use crate::llm::GroundingChunk;

use super::types::{GroundingSource, MapSource};

/// Both fields present and non-empty, or nothing.
fn complete(title: Option<&String>, uri: Option<&String>) -> Option<(String, String)> {
    match (title, uri) {
        (Some(t), Some(u)) if !t.is_empty() && !u.is_empty() => Some((t.clone(), u.clone())),
        _ => None,
    }
}

/// Web citations from a search-grounded answer, in API order.
pub fn extract_web_sources(chunks: Option<&[GroundingChunk]>) -> Vec<GroundingSource> {
    chunks
        .unwrap_or_default()
        .iter()
        .filter_map(|chunk| {
            let web = chunk.web.as_ref()?;
            let (title, uri) = complete(web.title.as_ref(), web.uri.as_ref())?;
            Some(GroundingSource { title, uri })
        })
        .collect()
}

/// Place citations from a maps-grounded answer.
///
/// A chunk carrying a `maps` object is read from it (address included when
/// present); otherwise its `web` object is the fallback and never yields an
/// address. Incomplete entries are dropped, not patched from the other object.
pub fn extract_map_sources(chunks: Option<&[GroundingChunk]>) -> Vec<MapSource> {
    chunks
        .unwrap_or_default()
        .iter()
        .filter_map(|chunk| {
            if let Some(maps) = &chunk.maps {
                let (title, uri) = complete(maps.title.as_ref(), maps.uri.as_ref())?;
                return Some(MapSource {
                    title,
                    uri,
                    address: maps.address.clone().filter(|a| !a.is_empty()),
                });
            }
            let web = chunk.web.as_ref()?;
            let (title, uri) = complete(web.title.as_ref(), web.uri.as_ref())?;
            Some(MapSource {
                title,
                uri,
                address: None,
            })
        })
        .collect()
}
