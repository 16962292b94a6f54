//! "Did you mean" suggestions for unknown names

/// Edit distance between two strings, counted in chars
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Up to `max_results` candidates within `max_distance` of `input`
/// (case-insensitive), closest first
pub fn similar_names<'a, I>(
    input: &str,
    candidates: I,
    max_results: usize,
    max_distance: usize,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input = input.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (levenshtein(&input, &candidate.to_lowercase()), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();

    // Stable, so equal distances keep candidate order.
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(max_results)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("actors", "actor"), 1);
    }

    #[test]
    fn test_similar_names() {
        let candidates = ["Infrastructure", "Actors", "Assets", "Materials"];
        assert_eq!(
            similar_names("actor", candidates, 3, 5),
            vec!["Actors", "Assets"]
        );
        assert_eq!(similar_names("ASSETS", candidates, 3, 0), vec!["Assets"]);
        assert!(similar_names("zzzzzzzzzzzz", candidates, 3, 2).is_empty());
        assert_eq!(similar_names("a", candidates, 1, 10).len(), 1);
    }
}
