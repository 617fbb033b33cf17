use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Named values a router pulled out of the request path, e.g. `id` in `/users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

pub(crate) static EMPTY_PATH_PARAMS: PathParams = PathParams::new();

impl PathParams {
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Shared empty set, handed out when no parameters were resolved.
    pub fn empty() -> &'static PathParams {
        &EMPTY_PATH_PARAMS
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<HashMap<String, String>> for PathParams {
    fn from(params: HashMap<String, String>) -> Self {
        params.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for PathParams {
    fn from(params: BTreeMap<String, String>) -> Self {
        Self(params)
    }
}

type DataValue = Box<dyn Any + Send + Sync>;

/// Values attached to one request for the stages of its pipeline to share.
///
/// Path parameters are a typed field of their own; everything else lives in a
/// string-keyed map whose lookups are typed and never fail: asking for a key
/// with the wrong type behaves like asking for a missing key.
#[derive(Default)]
pub struct ContextData {
    path_params: Option<PathParams>,
    values: HashMap<String, DataValue>,
}

impl ContextData {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means no parameters were resolved for this request.
    pub fn path_params(&self) -> Option<&PathParams> {
        self.path_params.as_ref()
    }

    pub fn path_params_mut(&mut self) -> &mut PathParams {
        self.path_params.get_or_insert_with(PathParams::new)
    }

    pub fn set_path_params(&mut self, params: PathParams) -> Option<PathParams> {
        self.path_params.replace(params)
    }

    pub fn clear_path_params(&mut self) -> Option<PathParams> {
        self.path_params.take()
    }

    /// Stores `value` under `key`, replacing whatever was there. Returns whether a
    /// value was replaced.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Box::new(value)).is_some()
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Removes the value only when it holds a `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key)?.is::<T>() {
            return None;
        }
        self.values
            .remove(key)?
            .downcast::<T>()
            .ok()
            .map(|boxed| *boxed)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.path_params.is_none()
    }
}

impl fmt::Debug for ContextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ContextData")
            .field("path_params", &self.path_params)
            .field("keys", &keys)
            .finish()
    }
}
