//! A dictionary that can hold multiple values per key.
//!
//! [`MultiValueDict`] holds submitted form data, where a single key may
//! appear multiple times (multi-selects, checkbox groups).

use std::borrow::Borrow;
use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;

/// A dictionary that maps keys to lists of values.
///
/// [`get`](MultiValueDict::get) returns the **last** value for a key,
/// while [`get_list`](MultiValueDict::get_list) returns all values.
///
/// # Examples
///
/// ```
/// use formcraft_core::utils::MultiValueDict;
///
/// let mut d = MultiValueDict::new();
/// d.append("color".to_string(), "red");
/// d.append("color".to_string(), "blue");
///
/// assert_eq!(d.get("color"), Some(&"blue"));
/// assert_eq!(d.get_list("color"), Some(&vec!["red", "blue"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueDict<K: Eq + Hash, V> {
    inner: HashMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V> Default for MultiValueDict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> MultiValueDict<K, V> {
    /// Creates an empty `MultiValueDict`.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Returns a reference to the **last** value associated with the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key).and_then(|v| v.last())
    }

    /// Returns a reference to all values associated with the key.
    pub fn get_list<Q>(&self, key: &Q) -> Option<&Vec<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key)
    }

    /// Sets the value for a key, replacing any existing values.
    pub fn set(&mut self, key: K, value: V) {
        self.inner.insert(key, vec![value]);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().push(value);
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> hash_map::Keys<'_, K, Vec<V>> {
        self.inner.keys()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the dictionary contains the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(key)
    }

    /// Returns an iterator over (key, value-list) pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, K, Vec<V>> {
        self.inner.iter()
    }
}

impl MultiValueDict<String, String> {
    /// Parses a URL-encoded body (e.g. `"name=Joe&tags=a&tags=b"`).
    ///
    /// `+` decodes to a space and percent escapes are decoded as UTF-8.
    pub fn parse(encoded: &str) -> Self {
        let mut data = Self::new();
        for pair in encoded.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));
            data.append(percent_decode(key), percent_decode(value));
        }
        data
    }
}

fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for MultiValueDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        for (k, v) in iter {
            d.append(k, v);
        }
        d
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a MultiValueDict<K, V> {
    type Item = (&'a K, &'a Vec<V>);
    type IntoIter = hash_map::Iter<'a, K, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let d: MultiValueDict<String, String> = MultiValueDict::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_append_and_get_returns_last() {
        let mut d = MultiValueDict::new();
        d.append("color", "red");
        d.append("color", "blue");
        d.append("color", "green");

        assert_eq!(d.get(&"color"), Some(&"green"));
        assert_eq!(d.get_list(&"color"), Some(&vec!["red", "blue", "green"]));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut d = MultiValueDict::new();
        d.append("k", "a");
        d.append("k", "b");
        d.set("k", "c");
        assert_eq!(d.get_list(&"k"), Some(&vec!["c"]));
    }

    #[test]
    fn test_get_by_str_on_string_keys() {
        let d: MultiValueDict<String, String> =
            [("name".to_string(), "Joe".to_string())].into_iter().collect();
        assert_eq!(d.get("name").map(String::as_str), Some("Joe"));
        assert!(d.contains_key("name"));
        assert!(!d.contains_key("email"));
    }

    #[test]
    fn test_parse_multiple_values_and_decoding() {
        let d = MultiValueDict::parse("tags=a&tags=b&title=Hello+World&q=%C3%A9t%C3%A9&empty=");
        assert_eq!(
            d.get_list("tags"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(d.get("title").map(String::as_str), Some("Hello World"));
        assert_eq!(d.get("q").map(String::as_str), Some("été"));
        assert_eq!(d.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_empty() {
        assert!(MultiValueDict::parse("").is_empty());
    }
}
