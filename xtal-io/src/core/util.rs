use std::collections::HashMap as StdHashMap;

use ahash::RandomState;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;
