use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_URL: &str = "/placeholder-1.jpg";
pub const PLACEHOLDER_LABEL: &str = "Profile";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AvatarEntry {
    Url(String),
    Labeled {
        url: String,
        #[serde(default)]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AvatarSource {
    One(AvatarEntry),
    Many(Vec<AvatarEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarItem {
    pub url: String,
    pub label: Option<String>,
}

impl AvatarItem {
    fn placeholder() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            label: Some(PLACEHOLDER_LABEL.to_string()),
        }
    }

    pub fn display_label(&self, index: usize) -> String {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => format!("Image {}", index + 1),
        }
    }
}

impl From<&AvatarEntry> for AvatarItem {
    fn from(entry: &AvatarEntry) -> Self {
        let (url, label) = match entry {
            AvatarEntry::Url(url) => (url.as_str(), None),
            AvatarEntry::Labeled { url, label } => (url.as_str(), label.clone()),
        };
        let url = if url.trim().is_empty() {
            PLACEHOLDER_URL.to_string()
        } else {
            url.to_string()
        };
        Self { url, label }
    }
}

impl From<AvatarItem> for AvatarEntry {
    fn from(item: AvatarItem) -> Self {
        AvatarEntry::Labeled {
            url: item.url,
            label: item.label,
        }
    }
}

pub fn normalize(source: Option<&AvatarSource>) -> Vec<AvatarItem> {
    let items: Vec<AvatarItem> = match source {
        Some(AvatarSource::One(entry)) => vec![AvatarItem::from(entry)],
        Some(AvatarSource::Many(entries)) => entries.iter().map(AvatarItem::from).collect(),
        None => Vec::new(),
    };
    if items.is_empty() {
        return vec![AvatarItem::placeholder()];
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(url: &str, label: Option<&str>) -> AvatarEntry {
        AvatarEntry::Labeled {
            url: url.into(),
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn absent_source_yields_placeholder() {
        let items = normalize(None);
        assert_eq!(
            items,
            vec![AvatarItem {
                url: PLACEHOLDER_URL.into(),
                label: Some("Profile".into()),
            }]
        );
    }

    #[test]
    fn empty_list_yields_placeholder() {
        let items = normalize(Some(&AvatarSource::Many(Vec::new())));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label.as_deref(), Some(PLACEHOLDER_LABEL));
    }

    #[test]
    fn single_string_keeps_url_without_label() {
        let items = normalize(Some(&AvatarSource::One(AvatarEntry::Url("me.png".into()))));
        assert_eq!(
            items,
            vec![AvatarItem {
                url: "me.png".into(),
                label: None
            }]
        );
    }

    #[test]
    fn single_object_keeps_label() {
        let items = normalize(Some(&AvatarSource::One(labeled("me.png", Some("Me")))));
        assert_eq!(items[0].label.as_deref(), Some("Me"));
    }

    #[test]
    fn mixed_list_preserves_order() {
        let source = AvatarSource::Many(vec![
            AvatarEntry::Url("a.png".into()),
            labeled("b.png", Some("B")),
            AvatarEntry::Url("c.png".into()),
        ]);
        let urls: Vec<String> = normalize(Some(&source)).into_iter().map(|i| i.url).collect();
        assert_eq!(urls, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn blank_url_gets_placeholder_image() {
        let items = normalize(Some(&AvatarSource::One(labeled("  ", Some("Me")))));
        assert_eq!(items[0].url, PLACEHOLDER_URL);
        assert_eq!(items[0].label.as_deref(), Some("Me"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let source = AvatarSource::Many(vec![
            AvatarEntry::Url("a.png".into()),
            labeled("", None),
        ]);
        let once = normalize(Some(&source));
        let again = normalize(Some(&AvatarSource::Many(
            once.iter().cloned().map(AvatarEntry::from).collect(),
        )));
        assert_eq!(once, again);
    }

    #[test]
    fn display_label_numbers_unlabeled_items() {
        let item = AvatarItem {
            url: "x".into(),
            label: None,
        };
        assert_eq!(item.display_label(1), "Image 2");
    }

    #[test]
    fn deserializes_every_shape() {
        let one: AvatarSource = serde_yaml::from_str("\"a.png\"").unwrap();
        assert_eq!(one, AvatarSource::One(AvatarEntry::Url("a.png".into())));
        let obj: AvatarSource = serde_yaml::from_str("url: a.png\nlabel: A").unwrap();
        assert_eq!(obj, AvatarSource::One(labeled("a.png", Some("A"))));
        let many: AvatarSource = serde_yaml::from_str("- a.png\n- url: b.png").unwrap();
        assert_eq!(
            many,
            AvatarSource::Many(vec![AvatarEntry::Url("a.png".into()), labeled("b.png", None)])
        );
    }
}
