//! Update combinators
//!
//! A combinator merges the stored value with an incoming one when a key is
//! written again. It runs under the cache's write lock, so it must be cheap.

/// Merge function applied on every update of an existing key: `(old, new) -> merged`.
pub type Combinator<V> = Box<dyn Fn(&V, V) -> V + Send + Sync>;

/// Keeps the larger of the stored and incoming values.
pub fn keep_max<V: Ord + Clone>(old: &V, new: V) -> V {
    if *old > new {
        old.clone()
    } else {
        new
    }
}

/// Keeps the smaller of the stored and incoming values.
pub fn keep_min<V: Ord + Clone>(old: &V, new: V) -> V {
    if *old < new {
        old.clone()
    } else {
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_max() {
        assert_eq!(keep_max(&1, 2), 2);
        assert_eq!(keep_max(&5, 2), 5);
        assert_eq!(keep_max(&"b".to_string(), "a".to_string()), "b");
    }

    #[test]
    fn test_keep_min() {
        assert_eq!(keep_min(&1, 2), 1);
        assert_eq!(keep_min(&5, 2), 2);
    }

    #[test]
    fn test_boxed_combinator() {
        let append: Combinator<String> = Box::new(|old, new| format!("{old},{new}"));
        assert_eq!(append(&"a".to_string(), "b".to_string()), "a,b");
    }
}
