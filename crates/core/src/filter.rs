use crate::catalog::{Catalog, Product};

/// Compute the visible subset of the catalog.
///
/// Category is an exact match (`None` disables it); the search term is a
/// literal case-insensitive substring match (whitespace included) against
/// name, brand, or description, and the empty term matches everything. The
/// two predicates AND-compose and the result preserves catalog order.
pub fn compute_visible<'a>(
    catalog: &'a Catalog,
    category: Option<&str>,
    search: &str,
) -> Vec<&'a Product> {
    let needle = search.to_lowercase();
    catalog
        .products()
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.brand.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"products": [
                {"name": "Vitamin C Serum", "brand": "X", "category": "serum",
                 "description": "Brightening antioxidant.", "image": ""},
                {"name": "Hydra Cream", "brand": "Vitaminworks", "category": "moisturizer",
                 "description": "Rich barrier cream.", "image": ""},
                {"name": "Clay Mask", "brand": "Z", "category": "mask",
                 "description": "Deep cleansing with vitamins.", "image": ""}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn no_filters_returns_whole_catalog_in_order() {
        let cat = catalog();
        let vis = compute_visible(&cat, None, "");
        assert_eq!(vis.len(), 3);
        assert_eq!(vis[0].name, "Vitamin C Serum");
        assert_eq!(vis[2].name, "Clay Mask");
    }

    #[test]
    fn search_matches_name_brand_or_description_case_insensitively() {
        let cat = catalog();
        // "vitamin" hits all three: name, brand, description.
        assert_eq!(compute_visible(&cat, None, "vitamin").len(), 3);
        assert_eq!(compute_visible(&cat, None, "VITAMIN C").len(), 1);
        assert_eq!(compute_visible(&cat, None, "barrier").len(), 1);
        assert!(compute_visible(&cat, None, "retinol").is_empty());
    }

    #[test]
    fn whitespace_in_the_term_is_matched_literally() {
        let cat = catalog();
        // "vitamin " excludes the "Vitaminworks" brand hit; " vitamin"
        // only survives inside the Clay Mask description.
        assert_eq!(compute_visible(&cat, None, "vitamin ").len(), 1);
        assert_eq!(compute_visible(&cat, None, " vitamin").len(), 1);
        assert!(compute_visible(&cat, None, "  ").is_empty());
    }

    #[test]
    fn category_is_exact_and_composes_with_search() {
        let cat = catalog();
        assert_eq!(compute_visible(&cat, Some("serum"), "").len(), 1);
        assert!(compute_visible(&cat, Some("ser"), "").is_empty());
        assert_eq!(compute_visible(&cat, Some("mask"), "vitamin").len(), 1);
        assert!(compute_visible(&cat, Some("mask"), "barrier").is_empty());
    }

    #[test]
    fn result_is_a_subset_satisfying_both_predicates() {
        let cat = catalog();
        for (category, search) in [
            (None, ""),
            (None, "cream"),
            (Some("mask"), ""),
            (Some("serum"), "vitamin"),
            (Some("moisturizer"), "zzz"),
        ] {
            let vis = compute_visible(&cat, category, search);
            assert!(vis.len() <= cat.len());
            let needle = search.to_lowercase();
            for p in vis {
                assert!(cat.get(&p.id).is_some());
                if let Some(c) = category {
                    assert_eq!(p.category, c);
                }
                if !needle.is_empty() {
                    let hay = format!("{} {} {}", p.name, p.brand, p.description).to_lowercase();
                    assert!(hay.contains(&needle));
                }
            }
        }
    }
}
