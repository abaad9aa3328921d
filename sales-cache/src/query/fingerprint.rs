//! Cache key derivation from query shape
//!
//! Keys look like `<type>:<filter>:page:<p>,size:<s>:<order>`, all lowercase.
//! The filter segment is the filter's token and the order segment is the
//! ordering's name, so two queries whose filters behave identically but carry
//! different tokens get different keys. The reverse is the caller's
//! responsibility: reusing a token for a different predicate yields false hits.
//!
//! Tokens and order names are case-sensitive. Before folding, an uppercase
//! letter is written as `^` plus its lowercase form and a literal `^` as `^^`,
//! so `name==ABC` and `name==abc` keep distinct keys. Page 0 is keyed as
//! page 1, matching the window it selects.

use crate::cache::types::CacheKey;
use crate::domain::entity::Entity;
use crate::query::descriptor::QueryDescriptor;

pub const NO_FILTER: &str = "nofilter";
pub const NO_ORDER: &str = "noorder";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Derive the cache key for a query. Pure function of its input.
pub fn fingerprint<T: Entity>(query: &QueryDescriptor<T>) -> CacheKey {
    let filter = query
        .filter_ref()
        .map(|f| fold_case(f.token()))
        .unwrap_or_else(|| NO_FILTER.to_string());
    let order = query
        .order_ref()
        .map(|o| fold_case(o.name()))
        .unwrap_or_else(|| NO_ORDER.to_string());
    let page = query.page_number().unwrap_or(DEFAULT_PAGE).max(1);
    let size = query.page_size_value().unwrap_or(DEFAULT_PAGE_SIZE);

    format!(
        "{}:{}:page:{},size:{}:{}",
        T::NAME.to_lowercase(),
        filter,
        page,
        size,
        order
    )
}

/// Lowercase `segment` without merging strings that differ only by case
fn fold_case(segment: &str) -> String {
    let mut folded = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == '^' {
            folded.push_str("^^");
        } else if c.is_uppercase() {
            folded.push('^');
            folded.extend(c.to_lowercase());
        } else {
            folded.extend(c.to_lowercase());
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExternalBranch, ExternalProduct, Sale};
    use crate::query::descriptor::{Filter, SortOrder};
    use uuid::Uuid;

    #[test]
    fn test_no_filter_no_order() {
        let query: QueryDescriptor<Sale> = QueryDescriptor::new();
        assert_eq!(query.cache_key(), "sale:nofilter:page:1,size:10:noorder");
    }

    #[test]
    fn test_id_filter_key() {
        let id = Uuid::parse_str("6F9619FF-8B86-D011-B42D-00CF4FC964FF").unwrap();
        let query: QueryDescriptor<Sale> = QueryDescriptor::new().filter(Filter::id_eq(id));

        assert_eq!(
            query.cache_key(),
            "sale:id==6f9619ff-8b86-d011-b42d-00cf4fc964ff:page:1,size:10:noorder"
        );
    }

    #[test]
    fn test_structurally_identical_queries_share_key() {
        let build = || {
            QueryDescriptor::<ExternalProduct>::new()
                .filter(Filter::new("price>10", |p: &ExternalProduct| p.price > 10.0))
                .order_by(SortOrder::by_key("by_name", |p: &ExternalProduct| p.product_name.clone()))
                .paginate(2, 25)
        };

        assert_eq!(build().cache_key(), build().cache_key());
        assert_eq!(
            build().cache_key(),
            "externalproduct:price>10:page:2,size:25:by_name"
        );
    }

    #[test]
    fn test_page_and_size_change_key() {
        let base = QueryDescriptor::<ExternalBranch>::new();
        let p1 = base.clone().paginate(1, 10).cache_key();
        let p2 = base.clone().paginate(2, 10).cache_key();
        let s20 = base.clone().paginate(1, 20).cache_key();

        assert_ne!(p1, p2);
        assert_ne!(p1, s20);
        assert_ne!(p2, s20);
    }

    #[test]
    fn test_defaults_fill_missing_pagination() {
        let only_page = QueryDescriptor::<Sale>::new().page(3).cache_key();
        assert_eq!(only_page, "sale:nofilter:page:3,size:10:noorder");

        let only_size = QueryDescriptor::<Sale>::new().page_size(50).cache_key();
        assert_eq!(only_size, "sale:nofilter:page:1,size:50:noorder");
    }

    #[test]
    fn test_key_is_lowercase() {
        let query = QueryDescriptor::<Sale>::new()
            .filter(Filter::new("SaleNumber==S-ABC", |s: &Sale| s.sale_number == "S-ABC"))
            .order_by(SortOrder::by_key("BySaleDate", |s: &Sale| s.sale_date));

        let key = query.cache_key();
        assert_eq!(key, key.to_lowercase());
        assert_eq!(
            key,
            "sale:^sale^number==^s-^a^b^c:page:1,size:10:^by^sale^date"
        );
    }

    #[test]
    fn test_tokens_differing_by_case_keep_distinct_keys() {
        let upper = QueryDescriptor::<ExternalProduct>::new()
            .filter(Filter::new("name==ABC", |p: &ExternalProduct| p.product_name == "ABC"));
        let lower = QueryDescriptor::<ExternalProduct>::new()
            .filter(Filter::new("name==abc", |p: &ExternalProduct| p.product_name == "abc"));

        assert_ne!(upper.cache_key(), lower.cache_key());
        assert_eq!(lower.cache_key(), "externalproduct:name==abc:page:1,size:10:noorder");
    }

    #[test]
    fn test_case_escape_is_unambiguous() {
        assert_eq!(fold_case("A"), "^a");
        assert_eq!(fold_case("^a"), "^^a");
        assert_ne!(fold_case("A"), fold_case("^a"));
        assert_eq!(fold_case("by_name"), "by_name");
    }

    #[test]
    fn test_page_zero_keyed_as_first_page() {
        let zero = QueryDescriptor::<Sale>::new().paginate(0, 10);
        let first = QueryDescriptor::<Sale>::new().paginate(1, 10);

        assert_eq!(zero.window(), first.window());
        assert_eq!(zero.cache_key(), first.cache_key());
        assert_eq!(zero.cache_key(), "sale:nofilter:page:1,size:10:noorder");
    }
}
