//! Catalog search: scores products against a free-text query.
//!
//! Single-pass, stateless scoring over the in-memory catalog. Matching is
//! case-insensitive whole-string-contains, not word-boundary-aware ("mat"
//! matches "format"). A product accumulates every signal that fires; ties
//! keep the original catalog order.

use crate::domain::catalog::Product;

/// Known misspellings and synonyms, keyed by the canonical term they stand
/// for. A query containing any variant boosts products whose name, category
/// or brand carries the canonical term.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("goggles", &["gogles", "googles", "gogle", "gogals", "sunglasses", "sunglass", "shades", "chashma"]),
    ("watches", &["watch", "wach", "watchs", "wrist watch", "ghadi"]),
    ("wallets", &["wallet", "walet", "purse"]),
    ("belts", &["belt", "beltt"]),
];

const FUZZY_BONUS: u32 = 25;

/// Rank `products` against `query`: products with a nonzero score, ordered by
/// score descending, ties in catalog order. A blank query matches nothing.
pub fn rank(products: Vec<Product>, query: &str) -> Vec<Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(u32, Product)> = products
        .into_iter()
        .filter_map(|p| {
            let s = score(&p, &query);
            (s > 0).then_some((s, p))
        })
        .collect();
    // sort_by is stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p).collect()
}

/// Additive relevance score for one product. `query` must already be trimmed
/// and lowercased.
fn score(product: &Product, query: &str) -> u32 {
    let name = product.name.to_lowercase();
    let category = product.category.to_lowercase();
    let brand = product.brand.as_deref().unwrap_or("").to_lowercase();
    let description = product.description.to_lowercase();

    let mut score = 0;

    if name == query {
        score += 100;
    } else if name.starts_with(query) {
        score += 50;
    } else if name.contains(query) {
        score += 30;
    }

    if category == query {
        score += 40;
    } else if category.contains(query) {
        score += 20;
    }

    if !brand.is_empty() {
        if brand == query {
            score += 35;
        } else if brand.contains(query) {
            score += 15;
        }
    }

    if !description.is_empty() && description.contains(query) {
        score += 10;
    }

    for (canonical, variants) in SYNONYMS {
        if variants.iter().any(|v| query.contains(v))
            && (name.contains(canonical) || category.contains(canonical) || brand.contains(canonical))
        {
            score += FUZZY_BONUS;
        }
    }

    score
}
