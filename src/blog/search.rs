//! Free-text search and category classification over blog posts.
//!
//! Categories are not stored with posts; they are inferred from keywords in
//! the post text.

use std::collections::HashMap;

use tracing::debug;

use super::index::BlogPost;

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DrivingTips,
    TestPreparation,
    Licensing,
    Safety,
    Insurance,
    Maintenance,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::DrivingTips,
        Category::TestPreparation,
        Category::Licensing,
        Category::Safety,
        Category::Insurance,
        Category::Maintenance,
    ];

    #[must_use]
    pub fn parse(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::DrivingTips => "driving-tips",
            Self::TestPreparation => "test-preparation",
            Self::Licensing => "licensing",
            Self::Safety => "safety",
            Self::Insurance => "insurance",
            Self::Maintenance => "maintenance",
        }
    }

    /// `text` must already be lower-cased.
    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        let has = |needle: &str| text.contains(needle);
        let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        match self {
            Self::DrivingTips => any(&[
                "parallel park",
                "defensive driving",
                "roundabout",
                "highway merging",
                "top 5 tips",
            ]),
            Self::TestPreparation => {
                let hit = (has("g2") && any(&["pass", "test", "exam"]))
                    || (has("g test") && has("fail"))
                    || has("examination sheet")
                    || has("test routes")
                    || (has("g1") && has("fail"));
                hit && !has("teen driver")
            }
            Self::Licensing => {
                let hit = has("licensing roadmap")
                    || has("graduated licensing")
                    || (has("g1") && has("g2") && has("complete"));
                hit && !has("teen driver")
            }
            Self::Safety => any(&[
                "teen driver safety",
                "emergency driving",
                "winter driving safety",
                "night driving safety",
            ]),
            Self::Insurance => {
                has("insurance") && any(&["save money", "new driver insurance"])
            }
            Self::Maintenance => any(&["vehicle maintenance", "car care"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(Category),
    /// A slug no rule exists for; it matches nothing.
    Unrecognized(String),
}

impl CategoryFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let slug = raw.trim();
        if slug.is_empty() || slug == ALL_CATEGORIES {
            return Self::All;
        }
        Category::parse(slug).map_or_else(|| Self::Unrecognized(slug.to_string()), Self::Only)
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => category.matches(text),
            Self::Unrecognized(_) => false,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(category) => category.slug(),
            Self::Unrecognized(slug) => slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    category: CategoryFilter,
}

impl SearchQuery {
    #[must_use]
    pub fn new(query: &str, category: CategoryFilter) -> Self {
        Self {
            text: query.trim().to_lowercase(),
            category,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// `post_text` must already be lower-cased.
    #[must_use]
    pub fn matches(&self, post_text: &str) -> bool {
        let matches_search = self.text.is_empty() || post_text.contains(&self.text);
        matches_search && self.category.matches(post_text)
    }

    /// Posts matching both the query and the category, in original order.
    #[must_use]
    pub fn filter<'a>(&self, posts: &'a [BlogPost]) -> Vec<&'a BlogPost> {
        let hits: Vec<&BlogPost> = posts
            .iter()
            .filter(|post| self.matches(&post.searchable_text()))
            .collect();
        debug!(
            "Search: \"{}\", Category: \"{}\", Results: {}",
            self.text,
            self.category.slug(),
            hits.len()
        );
        hits
    }
}

/// Listing parameters taken from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogParams {
    pub query: String,
    pub category: String,
    pub page: usize,
}

impl BlogParams {
    /// `q` wins over `search`; a missing or unparseable `page` is page one.
    #[must_use]
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let query = params
            .get("q")
            .filter(|q| !q.is_empty())
            .or_else(|| params.get("search"))
            .cloned()
            .unwrap_or_default();
        let category = params
            .get("category")
            .filter(|c| !c.is_empty())
            .cloned()
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());
        let page = params
            .get("page")
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        Self {
            query,
            category,
            page,
        }
    }

    #[must_use]
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new(&self.query, CategoryFilter::parse(&self.category))
    }
}
