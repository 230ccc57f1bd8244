use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::favorites::{FavoritesIndex, RecordRef};
use crate::model::{Catalog, CommandRecord, Tab};

/// Text the search box shows before anything is typed. A query containing it matches everything.
pub const QUERY_PLACEHOLDER: &str = "Search...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facet {
    #[default]
    All,
    FileSystem,
    Networking,
    SystemManagement,
    PackageManagement,
    Permissions,
    TextProcessing,
    Utilities,
}

impl Facet {
    pub const ALL: [Facet; 8] = [
        Facet::All,
        Facet::FileSystem,
        Facet::Networking,
        Facet::SystemManagement,
        Facet::PackageManagement,
        Facet::Permissions,
        Facet::TextProcessing,
        Facet::Utilities,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Facet::All => "All",
            Facet::FileSystem => "File System",
            Facet::Networking => "Networking",
            Facet::SystemManagement => "System Management",
            Facet::PackageManagement => "Package Management",
            Facet::Permissions => "Permissions",
            Facet::TextProcessing => "Text Processing",
            Facet::Utilities => "Utilities",
        }
    }

    pub fn next(self) -> Facet {
        let index = Facet::ALL.iter().position(|facet| *facet == self).unwrap_or(0);
        Facet::ALL[(index + 1) % Facet::ALL.len()]
    }

    pub fn previous(self) -> Facet {
        let index = Facet::ALL.iter().position(|facet| *facet == self).unwrap_or(0);
        Facet::ALL[(index + Facet::ALL.len() - 1) % Facet::ALL.len()]
    }

    pub fn admits(self, category: &str) -> bool {
        match self {
            Facet::All => true,
            other => category == other.label(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ViewEntry<'a> {
    pub source: RecordRef,
    pub record: &'a CommandRecord,
}

pub fn active_sequence<'a>(
    tab: Tab,
    catalog: &'a Catalog,
    favorites: &FavoritesIndex,
) -> Vec<ViewEntry<'a>> {
    match tab {
        Tab::Platform(platform) => catalog
            .records_for(platform)
            .iter()
            .enumerate()
            .map(|(position, record)| ViewEntry {
                source: RecordRef::new(platform, position),
                record,
            })
            .collect(),
        Tab::Favorites => favorites
            .resolved_view(catalog)
            .map(|(source, record)| ViewEntry { source, record })
            .collect(),
    }
}

pub fn query_is_blank(query: &str) -> bool {
    query.is_empty() || query.contains(QUERY_PLACEHOLDER)
}

pub fn matches(record: &CommandRecord, query: &str, facet: Facet) -> bool {
    if !facet.admits(&record.category) {
        return false;
    }
    if query_is_blank(query) {
        return true;
    }

    let needle = query.to_lowercase();
    [&record.name, &record.description, &record.category]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn apply<'a>(sequence: &[ViewEntry<'a>], query: &str, facet: Facet) -> Vec<ViewEntry<'a>> {
    sequence
        .iter()
        .filter(|entry| matches(entry.record, query, facet))
        .copied()
        .collect()
}

pub fn closest_name<'a>(
    matcher: &SkimMatcherV2,
    sequence: &[ViewEntry<'a>],
    query: &str,
) -> Option<&'a str> {
    if query_is_blank(query) {
        return None;
    }

    let needle = query.trim().to_lowercase();
    sequence
        .iter()
        .filter_map(|entry| {
            matcher
                .fuzzy_match(&entry.record.name.to_lowercase(), &needle)
                .map(|score| (score, entry.record.name.as_str()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, name)| name)
}
