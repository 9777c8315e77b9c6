//! Drops records the catalog returns but that cannot be shown.

use kanime_api::{CatalogEntry, CharacterEntry};

/// Marker in the URL of the catalog's placeholder cover.
const PLACEHOLDER_IMAGE: &str = "questionmark";
const UNAVAILABLE_TITLE: &str = "not available";

/// Whether a record has enough data to be displayed.
pub trait Displayable {
    fn is_displayable(&self) -> bool;
}

impl Displayable for CatalogEntry {
    fn is_displayable(&self) -> bool {
        !self.title.is_empty()
            && !self.title.to_lowercase().contains(UNAVAILABLE_TITLE)
            && !self
                .image_url
                .as_deref()
                .is_some_and(|url| url.contains(PLACEHOLDER_IMAGE))
    }
}

impl Displayable for CharacterEntry {
    fn is_displayable(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Order-preserving filter. Never grows the list; applying it twice is the
/// same as applying it once.
pub fn sanitize<T: Displayable>(items: Vec<T>) -> Vec<T> {
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(Displayable::is_displayable).collect();
    if kept.len() < before {
        tracing::debug!(dropped = before - kept.len(), "dropped undisplayable entries");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, title: &str, image: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.into(),
            image_url: image.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_unavailable_title() {
        let mut items: Vec<CatalogEntry> = (1..=12)
            .map(|id| entry(id, &format!("Title {id}"), Some("https://cdn.example/a.webp")))
            .collect();
        items[4].title = "Not Available".into();

        let kept = sanitize(items);
        assert_eq!(kept.len(), 11);
        assert!(kept.iter().all(|e| e.id != 5));
        // Order preserved.
        assert_eq!(kept[4].id, 6);
    }

    #[test]
    fn test_drops_placeholder_and_empty() {
        let items = vec![
            entry(1, "Monster", None),
            entry(2, "", Some("x.jpg")),
            entry(
                3,
                "Unknown",
                Some("https://cdn.myanimelist.net/img/sp/icon/apple-touch-icon-256.png?questionmark"),
            ),
            entry(4, "Title not available yet", Some("x.jpg")),
            entry(5, "Mushishi", Some("x.jpg")),
        ];
        let ids: Vec<u64> = sanitize(items).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_idempotent() {
        let items = vec![
            entry(1, "A", Some("questionmark.gif")),
            entry(2, "B", None),
            entry(3, "not available", None),
        ];
        let once = sanitize(items);
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_character_requires_name() {
        let items = vec![
            CharacterEntry {
                id: 1,
                name: "Levi".into(),
                ..Default::default()
            },
            CharacterEntry {
                id: 2,
                ..Default::default()
            },
        ];
        assert_eq!(sanitize(items).len(), 1);
    }
}
