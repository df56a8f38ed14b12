use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// A scalar handed to the skin: either a number or a short string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f32),
    Text(Arc<str>),
}

#[allow(dead_code)]
impl Value {
    #[inline(always)]
    pub const fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    #[inline(always)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(n as f32)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::Text(s)
    }
}

/// One frame's flat render data. Built fresh every frame and never mutated
/// after it is handed to the rendering context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: FxHashMap<String, Value>,
}

impl Snapshot {
    pub(super) fn with_capacity(cap: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(cap, Default::default()),
        }
    }

    #[inline(always)]
    pub(super) fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }
}

// Read side, for skins that consume snapshots in-process.
#[allow(dead_code)]
impl Snapshot {
    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[inline(always)]
    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(Value::as_number)
    }

    #[inline(always)]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    #[inline(always)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::default();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::{Snapshot, Value};

    #[test]
    fn typed_getters_reject_the_other_kind() {
        let snap: Snapshot = [("t", Value::from(1.5_f32)), ("tutorial", Value::from("no"))]
            .into_iter()
            .collect();
        assert_eq!(snap.number("t"), Some(1.5));
        assert_eq!(snap.text("t"), None);
        assert_eq!(snap.text("tutorial"), Some("no"));
        assert_eq!(snap.number("tutorial"), None);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn serializes_as_a_flat_object() {
        let snap: Snapshot = [("song_time", Value::from("0:10 / 3:20"))].into_iter().collect();
        let json = serde_json::to_string(&snap).expect("snapshot should serialize");
        assert_eq!(json, r#"{"song_time":"0:10 / 3:20"}"#);

        let snap: Snapshot = [("ready", Value::from(0.25_f32))].into_iter().collect();
        let json = serde_json::to_value(&snap).expect("snapshot should serialize");
        assert_eq!(json["ready"].as_f64(), Some(0.25));
    }
}
