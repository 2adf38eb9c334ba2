//! Client-side product list filtering.

use crate::types::{Mode, Product};

/// Filters applied to a fetched product list before display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// Exact (trimmed) weight label. Only honoured in wholesale mode.
    pub weight: Option<String>,
}

impl ProductFilter {
    /// Whether `product` passes the filter in `mode`.
    #[must_use]
    pub fn matches(&self, product: &Product, mode: Mode) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .is_none_or(|needle| {
                product
                    .name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            });

        let weight_ok = mode != Mode::Wholesale
            || self
                .weight
                .as_deref()
                .map(str::trim)
                .filter(|w| !w.is_empty() && !w.eq_ignore_ascii_case("all"))
                .is_none_or(|w| product.weight.as_deref() == Some(w));

        search_ok && weight_ok
    }

    /// Products passing the filter, in input order.
    pub fn apply<'a>(&self, products: &'a [Product], mode: Mode) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p, mode)).collect()
    }
}

/// Distinct weight labels offered as filter options, sorted.
///
/// Empty in retail mode, which does not sell by pack weight.
#[must_use]
pub fn weight_options(products: &[Product], mode: Mode) -> Vec<String> {
    if mode != Mode::Wholesale {
        return Vec::new();
    }
    let mut options: Vec<String> = products
        .iter()
        .filter_map(|p| p.weight.clone())
        .collect();
    options.sort();
    options.dedup();
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(name: &str, weight: Option<&str>) -> Product {
        serde_json::from_value(json!({ "_id": name, "name": name, "weight": weight }))
            .expect("product parses")
    }

    fn names<'a>(products: &[&'a Product]) -> Vec<&'a str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let products = vec![product("Basmati Rice", None), product("Toor Dal", None)];
        let filter = ProductFilter {
            search: Some("RICE".to_string()),
            weight: None,
        };
        assert_eq!(names(&filter.apply(&products, Mode::Retail)), vec!["Basmati Rice"]);
    }

    #[test]
    fn test_weight_filter_only_in_wholesale() {
        let products = vec![product("Rice 1kg", Some("1kg")), product("Rice 5kg", Some("5kg"))];
        let filter = ProductFilter {
            search: None,
            weight: Some("5kg".to_string()),
        };
        assert_eq!(names(&filter.apply(&products, Mode::Wholesale)), vec!["Rice 5kg"]);
        assert_eq!(filter.apply(&products, Mode::Retail).len(), 2);
    }

    #[test]
    fn test_all_weight_means_no_filter() {
        let products = vec![product("a", Some("1kg")), product("b", None)];
        let filter = ProductFilter {
            search: Some("  ".to_string()),
            weight: Some("all".to_string()),
        };
        assert_eq!(filter.apply(&products, Mode::Wholesale).len(), 2);
    }

    #[test]
    fn test_weight_options_sorted_and_distinct() {
        let products = vec![
            product("a", Some("5kg")),
            product("b", Some(" 1kg ")),
            product("c", Some("5kg")),
            product("d", None),
        ];
        assert_eq!(weight_options(&products, Mode::Wholesale), vec!["1kg", "5kg"]);
        assert!(weight_options(&products, Mode::Retail).is_empty());
    }
}
