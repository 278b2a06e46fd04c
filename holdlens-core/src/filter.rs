//! Client-side name filtering.

/// Case-insensitive substring match. An empty query matches everything.
pub fn matches(name: &str, query: &str) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Names matching `query`, in their original order.
pub fn filter_names<'a, I>(names: I, query: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .map(String::as_str)
        .filter(|name| matches(name, query))
        .collect()
}
