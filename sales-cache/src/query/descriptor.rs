//! Query descriptors: filter, ordering and pagination over an entity type

use crate::cache::types::CacheKey;
use crate::domain::entity::Entity;
use crate::query::fingerprint;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A filter predicate paired with the token that fingerprints it.
///
/// The token must change whenever the predicate's logic changes; two filters
/// with the same token are assumed to select the same rows. Tokens are
/// case-sensitive: `name==ABC` and `name==abc` fingerprint differently.
pub struct Filter<T> {
    token: String,
    predicate: Predicate<T>,
}

impl<T> Filter<T> {
    pub fn new<F>(token: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            token: token.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }
}

impl<T: Entity> Filter<T> {
    /// Select the entity with the given identity
    pub fn id_eq(id: Uuid) -> Self {
        Filter::new(format!("id=={}", id), move |entity: &T| entity.id() == id)
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("token", &self.token).finish()
    }
}

/// A named ordering strategy
pub struct SortOrder<T> {
    name: String,
    compare: Comparator<T>,
}

impl<T> SortOrder<T> {
    pub fn new<F>(name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            compare: Arc::new(compare),
        }
    }

    /// Ascending order on an extracted key
    pub fn by_key<K, F>(name: impl Into<String>, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::new(name, move |a: &T, b: &T| key(a).cmp(&key(b)))
    }

    /// The same strategy in the opposite direction, named `<name>_desc`
    pub fn reversed(self) -> Self
    where
        T: 'static,
    {
        let compare = self.compare;
        Self {
            name: format!("{}_desc", self.name),
            compare: Arc::new(move |a: &T, b: &T| compare(b, a)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

impl<T> Clone for SortOrder<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for SortOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOrder").field("name", &self.name).finish()
    }
}

/// Rows to skip and take for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: usize,
    pub take: usize,
}

impl Window {
    /// Page numbers start at 1; page 0 is treated as page 1
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let size = page_size as usize;
        Self {
            skip: (page.max(1) as usize - 1).saturating_mul(size),
            take: size,
        }
    }
}

/// An immutable description of one query over `T`
pub struct QueryDescriptor<T> {
    filter: Option<Filter<T>>,
    order: Option<SortOrder<T>>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl<T> QueryDescriptor<T> {
    pub fn new() -> Self {
        Self {
            filter: None,
            order: None,
            page: None,
            page_size: None,
        }
    }

    pub fn filter(mut self, filter: Filter<T>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order: SortOrder<T>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn paginate(self, page: u32, page_size: u32) -> Self {
        self.page(page).page_size(page_size)
    }

    pub fn filter_ref(&self) -> Option<&Filter<T>> {
        self.filter.as_ref()
    }

    pub fn order_ref(&self) -> Option<&SortOrder<T>> {
        self.order.as_ref()
    }

    pub fn page_number(&self) -> Option<u32> {
        self.page
    }

    pub fn page_size_value(&self) -> Option<u32> {
        self.page_size
    }

    /// Skip/take window, only when both page and page size were given
    pub fn window(&self) -> Option<Window> {
        match (self.page, self.page_size) {
            (Some(page), Some(size)) => Some(Window::for_page(page, size)),
            _ => None,
        }
    }
}

impl<T: Entity> QueryDescriptor<T> {
    /// Deterministic cache key for this query shape
    pub fn cache_key(&self) -> CacheKey {
        fingerprint::fingerprint(self)
    }
}

impl<T> Default for QueryDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for QueryDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            order: self.order.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl<T> fmt::Debug for QueryDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("filter", &self.filter)
            .field("order", &self.order)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .finish()
    }
}
