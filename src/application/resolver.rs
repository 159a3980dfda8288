//! Category slug → ID resolution with fuzzy fallback.
//!
//! The exact-slug query is the fast path. When it does not yield exactly one
//! row, candidates (the ambiguous rows, or a free-text search) are ranked by
//! an ordered list of [`MatchStrategy`] tiers. Failures resolve to not-found:
//! a missing category is a normal authoring state.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::source::{CategoryQuery, TaxonomySource};
use crate::domain::posts::Category;
use crate::domain::slug::fold;

const SOURCE: &str = "application::resolver";

/// Fallback tiers, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Folded candidate slug equals the folded input.
    NormalizedSlug,
    /// Folded candidate name contains the folded input.
    NameContains,
    /// First row the CMS returned.
    FirstResult,
}

pub const MATCH_ORDER: [MatchStrategy; 3] = [
    MatchStrategy::NormalizedSlug,
    MatchStrategy::NameContains,
    MatchStrategy::FirstResult,
];

impl MatchStrategy {
    /// Pick a candidate according to this tier. `needle` must already be folded.
    pub fn select<'a>(self, needle: &str, candidates: &'a [Category]) -> Option<&'a Category> {
        match self {
            MatchStrategy::NormalizedSlug => candidates
                .iter()
                .find(|category| fold(&category.slug) == needle),
            MatchStrategy::NameContains => candidates
                .iter()
                .find(|category| fold(&category.name).contains(needle)),
            MatchStrategy::FirstResult => candidates.first(),
        }
    }
}

/// Run the tiers over `candidates`, returning the winner and its tier.
pub fn best_match<'a>(
    slug: &str,
    candidates: &'a [Category],
) -> Option<(MatchStrategy, &'a Category)> {
    let needle = fold(slug);
    MATCH_ORDER
        .iter()
        .find_map(|strategy| strategy.select(&needle, candidates).map(|hit| (*strategy, hit)))
}

#[derive(Clone)]
pub struct CategoryResolver {
    taxonomy: Arc<dyn TaxonomySource>,
}

impl CategoryResolver {
    pub fn new(taxonomy: Arc<dyn TaxonomySource>) -> Self {
        Self { taxonomy }
    }

    pub async fn resolve_category_id(&self, slug: &str) -> Option<u64> {
        self.resolve(slug).await.map(|category| category.id)
    }

    pub async fn resolve(&self, slug: &str) -> Option<Category> {
        let slug = slug.trim();
        if slug.is_empty() {
            return None;
        }

        let mut candidates = self.lookup(CategoryQuery::Slug(slug.to_string())).await;
        if candidates.len() == 1 {
            return candidates.pop();
        }

        if candidates.is_empty() {
            candidates = self.lookup(CategoryQuery::Search(slug.to_string())).await;
        }

        if candidates.is_empty() {
            debug!(source = SOURCE, slug, "category not found");
            return None;
        }

        let (strategy, category) = best_match(slug, &candidates)?;
        debug!(
            source = SOURCE,
            slug,
            category_id = category.id,
            strategy = ?strategy,
            "category resolved by fallback"
        );
        Some(category.clone())
    }

    async fn lookup(&self, query: CategoryQuery) -> Vec<Category> {
        match self.taxonomy.categories(&query).await {
            Ok(categories) => categories,
            Err(err) => {
                warn!(source = SOURCE, query = ?query, error = %err, "category lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::source::SourceError;

    fn category(id: u64, slug: &str, name: &str) -> Category {
        Category {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }

    /// Taxonomy backed by a fixed list; `slug` matches exactly, `search`
    /// matches folded substrings of slug or name.
    #[derive(Default)]
    struct FakeTaxonomy {
        rows: Vec<Category>,
        search_rows: Option<Vec<Category>>,
        fail: bool,
        queries: Mutex<Vec<CategoryQuery>>,
    }

    impl FakeTaxonomy {
        fn with_rows(rows: Vec<Category>) -> Self {
            Self {
                rows,
                ..Default::default()
            }
        }

        fn queries(&self) -> Vec<CategoryQuery> {
            self.queries.lock().expect("queries lock").clone()
        }
    }

    #[async_trait]
    impl TaxonomySource for FakeTaxonomy {
        async fn categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, SourceError> {
            self.queries.lock().expect("queries lock").push(query.clone());
            if self.fail {
                return Err(SourceError::transport("connection refused"));
            }
            Ok(match query {
                CategoryQuery::Slug(slug) => self
                    .rows
                    .iter()
                    .filter(|row| row.slug == *slug)
                    .cloned()
                    .collect(),
                CategoryQuery::Search(text) => match &self.search_rows {
                    Some(rows) => rows.clone(),
                    None => self
                        .rows
                        .iter()
                        .filter(|row| {
                            fold(&row.slug).contains(&fold(text))
                                || fold(&row.name).contains(&fold(text))
                        })
                        .cloned()
                        .collect(),
                },
            })
        }
    }

    fn resolver(taxonomy: FakeTaxonomy) -> (CategoryResolver, Arc<FakeTaxonomy>) {
        let taxonomy = Arc::new(taxonomy);
        (CategoryResolver::new(taxonomy.clone()), taxonomy)
    }

    #[tokio::test]
    async fn exact_slug_is_the_fast_path() {
        let (resolver, taxonomy) =
            resolver(FakeTaxonomy::with_rows(vec![category(42, "politica", "Política")]));

        assert_eq!(resolver.resolve_category_id("politica").await, Some(42));
        assert_eq!(
            taxonomy.queries(),
            vec![CategoryQuery::Slug("politica".to_string())]
        );
    }

    #[tokio::test]
    async fn accented_and_plain_slugs_resolve_identically() {
        let (resolver, _) =
            resolver(FakeTaxonomy::with_rows(vec![category(42, "politica", "Política")]));

        let plain = resolver.resolve_category_id("politica").await;
        let accented = resolver.resolve_category_id("política").await;
        assert_eq!(plain, Some(42));
        assert_eq!(accented, plain);
    }

    #[tokio::test]
    async fn resolution_is_stable_across_calls() {
        let (resolver, _) = resolver(FakeTaxonomy::with_rows(vec![
            category(7, "deportes", "Deportes"),
            category(42, "politica", "Política"),
        ]));

        let first = resolver.resolve_category_id("Política").await;
        let second = resolver.resolve_category_id("Política").await;
        assert_eq!(first, Some(42));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn name_substring_tier_applies_when_slug_differs() {
        let (resolver, _) = resolver(FakeTaxonomy {
            search_rows: Some(vec![
                category(1, "mundo", "Mundo"),
                category(9, "noticias-economia", "Noticias de Economía"),
            ]),
            ..Default::default()
        });

        assert_eq!(resolver.resolve_category_id("economia").await, Some(9));
    }

    #[tokio::test]
    async fn first_result_is_the_last_tier() {
        let (resolver, _) = resolver(FakeTaxonomy {
            search_rows: Some(vec![category(3, "tres", "Tres"), category(4, "cuatro", "Cuatro")]),
            ..Default::default()
        });

        assert_eq!(resolver.resolve_category_id("sin-match").await, Some(3));
    }

    #[tokio::test]
    async fn empty_search_is_not_found() {
        let (resolver, taxonomy) = resolver(FakeTaxonomy::default());

        assert_eq!(resolver.resolve_category_id("nada").await, None);
        assert_eq!(taxonomy.queries().len(), 2);
    }

    #[tokio::test]
    async fn lookup_failure_is_not_found() {
        let (resolver, _) = resolver(FakeTaxonomy {
            fail: true,
            ..Default::default()
        });

        assert_eq!(resolver.resolve_category_id("politica").await, None);
    }

    #[tokio::test]
    async fn blank_slug_skips_the_network() {
        let (resolver, taxonomy) = resolver(FakeTaxonomy::default());

        assert_eq!(resolver.resolve_category_id("  ").await, None);
        assert!(taxonomy.queries().is_empty());
    }

    #[test]
    fn tiers_are_ordered() {
        let candidates = vec![
            category(1, "first", "Contains Politica"),
            category(2, "politica", "Other"),
        ];
        let (strategy, hit) = best_match("Política", &candidates).expect("match");
        assert_eq!(strategy, MatchStrategy::NormalizedSlug);
        assert_eq!(hit.id, 2);

        let candidates = vec![category(1, "a", "A"), category(2, "b", "La Politica Hoy")];
        let (strategy, hit) = best_match("politica", &candidates).expect("match");
        assert_eq!(strategy, MatchStrategy::NameContains);
        assert_eq!(hit.id, 2);

        assert!(best_match("x", &[]).is_none());
    }
}
