//! Per-listing acceptance rules applied before any listing reaches the
//! selector. Three independent checks; failing any one rejects the listing.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::catalog::{Category, Component};

/// Titles containing any of these describe accessories, parts, or
/// non-functional units rather than the component itself.
static GPU_BANNED_TERMS: Lazy<HashSet<String>> = Lazy::new(|| {
    normalize(&[
        "shroud",
        "cable",
        "bracket",
        "empty",
        "shield",
        "kit",
        "powerlink",
        "bios",
        "block",
        "backplate",
        "back plate",
        "box-only",
        "box only",
        "mining",
        "cooling fan",
        "graphics card fan",
        "cooler fan",
        "only fan",
        "parts only",
        "no gpu",
        "heatsink",
        "heat sink",
    ])
});

static CPU_BANNED_TERMS: Lazy<HashSet<String>> = Lazy::new(|| {
    normalize(&["cooling fan", "untested", "cooler fan", "1700 cooler"])
});

fn normalize(terms: &[&str]) -> HashSet<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

fn banned_terms(category: Category) -> &'static HashSet<String> {
    match category {
        Category::Gpu => &GPU_BANNED_TERMS,
        Category::Cpu => &CPU_BANNED_TERMS,
    }
}

/// Acceptance predicate for one component's listings, built once per fetch.
/// The query-side tokens are extracted up front so each listing costs one
/// pass over its title.
pub struct ListingFilter {
    banned: &'static HashSet<String>,
    qualifiers: &'static [&'static str],
    /// 4-5 digit model token from the query, when present.
    model_token: Option<String>,
    /// Which of the category's qualifiers the query itself carries.
    query_qualifiers: Vec<&'static str>,
}

impl ListingFilter {
    pub fn for_component(component: &Component) -> Self {
        let name_lc = component.name.to_lowercase();
        let qualifiers = component.category.qualifier_tokens();
        let name_tokens: Vec<&str> = word_tokens(&name_lc);

        let model_token = digit_runs(&name_lc)
            .into_iter()
            .find(|run| run.len() >= 4 && run.len() <= 5);

        let query_qualifiers = qualifiers
            .iter()
            .copied()
            .filter(|q| has_qualifier(&name_tokens, q))
            .collect();

        Self {
            banned: banned_terms(component.category),
            qualifiers,
            model_token,
            query_qualifiers,
        }
    }

    pub fn accepts(&self, title: &str) -> bool {
        let title_lc = title.to_lowercase();

        if self.banned.iter().any(|term| title_lc.contains(term.as_str())) {
            return false;
        }

        // A "3080" query must not match a "3090" listing: the query's model
        // token has to appear in the title as a maximal digit run, so it also
        // never matches inside a longer number like "30800".
        if let Some(token) = &self.model_token {
            if !digit_runs(&title_lc).iter().any(|run| run == token) {
                return false;
            }
        }

        // Qualifier presence must agree in both directions, or a base-model
        // query drifts onto Ti/Super listings and vice versa.
        let title_tokens: Vec<&str> = word_tokens(&title_lc);
        for qualifier in self.qualifiers {
            let in_query = self.query_qualifiers.contains(qualifier);
            let in_title = has_qualifier(&title_tokens, qualifier);
            if in_query != in_title {
                return false;
            }
        }

        true
    }
}

fn word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Maximal runs of consecutive ASCII digits, so "rtx3080ti" yields "3080".
fn digit_runs(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// A qualifier matches as its own token ("3080 ti") or glued onto the model
/// number ("3080ti", "7800x3d"). Plain substring matching is too loose:
/// "ti" occurs inside words like "edition".
fn has_qualifier(tokens: &[&str], qualifier: &str) -> bool {
    tokens.iter().any(|t| {
        *t == qualifier
            || t.strip_suffix(qualifier)
                .is_some_and(|prefix| !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()))
    })
}
