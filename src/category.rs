//! Keyword-based auto-categorization of expense descriptions.

/// The category assigned when no keyword matches a description.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// The recommended set of categories for manual expense entry.
///
/// Storage does not enforce membership in this set: the expense table accepts
/// any category string, and bulk import preserves whatever the file says.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Food",
    "Transport",
    "Groceries",
    "Entertainment",
    "Bills",
    "Shopping",
    "Health",
    "Education",
    "Rent",
    "Misc",
];

/// The keyword table driving auto-categorization.
///
/// Order matters: [categorize] returns the category of the first keyword that
/// matches, so a description containing several keywords resolves to whichever
/// entry comes first here.
const KEYWORD_CATEGORIES: [(&str, &str); 30] = [
    ("uber", "Transport"),
    ("taxi", "Transport"),
    ("bus", "Transport"),
    ("fuel", "Transport"),
    ("coffee", "Food"),
    ("restaurant", "Food"),
    ("dinner", "Food"),
    ("lunch", "Food"),
    ("breakfast", "Food"),
    ("grocery", "Groceries"),
    ("supermarket", "Groceries"),
    ("walmart", "Groceries"),
    ("netflix", "Entertainment"),
    ("movie", "Entertainment"),
    ("spotify", "Entertainment"),
    ("electricity", "Bills"),
    ("water", "Bills"),
    ("internet", "Bills"),
    ("bill", "Bills"),
    ("shirt", "Shopping"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("buy", "Shopping"),
    ("doctor", "Health"),
    ("hospital", "Health"),
    ("medicine", "Health"),
    ("tuition", "Education"),
    ("course", "Education"),
    ("books", "Education"),
    ("rent", "Rent"),
];

/// Derive a category label from a free-text expense description.
///
/// The description is lowercased and checked against the keyword table in
/// order; the first keyword contained in the description decides the
/// category. Descriptions matching no keyword get [DEFAULT_CATEGORY].
pub fn categorize(description: &str) -> &'static str {
    let description = description.to_lowercase();

    for (keyword, category) in KEYWORD_CATEGORIES {
        if description.contains(keyword) {
            return category;
        }
    }

    DEFAULT_CATEGORY
}

#[cfg(test)]
mod categorize_tests {
    use crate::category::{DEFAULT_CATEGORIES, DEFAULT_CATEGORY, KEYWORD_CATEGORIES, categorize};

    #[test]
    fn returns_mapped_category_for_known_keyword() {
        assert_eq!(categorize("Uber ride home"), "Transport");
        assert_eq!(categorize("weekly grocery run"), "Groceries");
        assert_eq!(categorize("tuition fees"), "Education");
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(categorize("NETFLIX Subscription"), "Entertainment");
        assert_eq!(categorize("Dinner At Luigi's"), "Food");
    }

    #[test]
    fn returns_default_for_empty_description() {
        assert_eq!(categorize(""), DEFAULT_CATEGORY);
    }

    #[test]
    fn returns_default_when_no_keyword_matches() {
        assert_eq!(categorize("misc sundries 123"), DEFAULT_CATEGORY);
    }

    #[test]
    fn table_order_decides_between_multiple_matches() {
        // "bus" comes before "movie" in the table even though "movie" appears
        // first in the description.
        assert_eq!(categorize("movie night, took a bus home"), "Transport");
    }

    #[test]
    fn matches_keyword_inside_longer_word() {
        assert_eq!(categorize("Business trip"), "Transport");
    }

    #[test]
    fn every_keyword_maps_to_its_category() {
        for (keyword, category) in KEYWORD_CATEGORIES {
            assert_eq!(
                categorize(keyword),
                category,
                "keyword {keyword} should map to {category}"
            );
        }
    }

    #[test]
    fn every_mapped_category_is_a_default_category() {
        for (keyword, category) in KEYWORD_CATEGORIES {
            assert!(
                DEFAULT_CATEGORIES.contains(&category),
                "category {category} for keyword {keyword} is not a default category"
            );
        }
    }
}
