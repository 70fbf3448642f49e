//! Registry of known tools and tooling-link resolution.
//!
//! Topics and scopes name tools loosely (`nextjs`, `TailwindCSS`). The
//! registry maps those names to a canonical key and an authoritative
//! documentation URL, which [`apply_tooling_links`] stores on every index
//! entry under `toolingLinks`.

use std::collections::BTreeMap;

use crate::entry::{DocsIndex, IndexEntry};

/// A known tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Canonical key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Home page.
    pub url: &'static str,
    /// Documentation entry point, preferred over `url` when present.
    pub docs_url: Option<&'static str>,
    /// Other names that resolve to this tool.
    pub synonyms: &'static [&'static str],
}

impl Tool {
    /// The documentation URL, or the home page.
    pub fn link(&self) -> &'static str {
        self.docs_url.unwrap_or(self.url)
    }

    /// Display name for a reference link, e.g. `React docs`.
    pub fn reference_name(&self) -> String {
        format!("{} docs", self.name)
    }
}

/// All known tools.
pub const TOOLS: &[Tool] = &[
    Tool {
        key: "next",
        name: "Next.js",
        url: "https://nextjs.org/",
        docs_url: Some("https://nextjs.org/docs"),
        synonyms: &["nextjs"],
    },
    Tool {
        key: "react",
        name: "React",
        url: "https://react.dev/",
        docs_url: Some("https://react.dev"),
        synonyms: &[],
    },
    Tool {
        key: "vite",
        name: "Vite",
        url: "https://vitejs.dev/",
        docs_url: Some("https://vitejs.dev/guide/"),
        synonyms: &[],
    },
    Tool {
        key: "tailwind",
        name: "Tailwind CSS",
        url: "https://tailwindcss.com/",
        docs_url: Some("https://tailwindcss.com/docs"),
        synonyms: &[],
    },
    Tool {
        key: "prisma",
        name: "Prisma",
        url: "https://www.prisma.io/",
        docs_url: Some("https://www.prisma.io/docs"),
        synonyms: &[],
    },
    Tool {
        key: "supabase",
        name: "Supabase",
        url: "https://supabase.com/",
        docs_url: Some("https://supabase.com/docs"),
        synonyms: &[],
    },
    Tool {
        key: "playwright",
        name: "Playwright",
        url: "https://playwright.dev/",
        docs_url: Some("https://playwright.dev/docs/intro"),
        synonyms: &[],
    },
    Tool {
        key: "storybook",
        name: "Storybook",
        url: "https://storybook.js.org/",
        docs_url: Some("https://storybook.js.org/docs"),
        synonyms: &[],
    },
    Tool {
        key: "trpc",
        name: "tRPC",
        url: "https://trpc.io/",
        docs_url: Some("https://trpc.io/"),
        synonyms: &[],
    },
    Tool {
        key: "react-router",
        name: "React Router",
        url: "https://reactrouter.com",
        docs_url: Some("https://reactrouter.com"),
        synonyms: &[],
    },
];

/// Built-in spellings that resolve to a registry key.
const ALIASES: &[(&str, &str)] = &[
    ("nextjs", "next"),
    ("tailwindcss", "tailwind"),
    ("tailwindcss3", "tailwind"),
    ("tailwindcss4", "tailwind"),
];

/// Canonical key for a topic.
///
/// The input is trimmed and lowercased, then matched against registry keys,
/// synonyms, and built-in aliases. Unknown topics come back lowercased.
///
/// ```
/// use quire_index::tooling::canonicalize;
///
/// assert_eq!(canonicalize(" NextJS "), "next");
/// assert_eq!(canonicalize("TailwindCSS4"), "tailwind");
/// assert_eq!(canonicalize("Zod"), "zod");
/// ```
pub fn canonicalize(topic: &str) -> String {
    let t = topic.trim().to_lowercase();
    if TOOLS.iter().any(|tool| tool.key == t) {
        return t;
    }
    if let Some(tool) = TOOLS.iter().find(|tool| tool.synonyms.contains(&t.as_str())) {
        return tool.key.to_string();
    }
    if let Some((_, key)) = ALIASES.iter().find(|(alias, _)| *alias == t) {
        return (*key).to_string();
    }
    t
}

/// Look up a tool by key or loose name.
pub fn find_tool(key_or_topic: &str) -> Option<&'static Tool> {
    let key = canonicalize(key_or_topic);
    TOOLS.iter().find(|tool| tool.key == key)
}

/// Preferred URL for a tool by key or loose name.
pub fn tool_url(key_or_topic: &str) -> Option<&'static str> {
    find_tool(key_or_topic).map(Tool::link)
}

/// Tooling links for one entry: canonical key to URL for every topic and
/// scope tag that names a known tool.
pub fn resolve_tooling_links(entry: &IndexEntry) -> BTreeMap<String, String> {
    entry
        .topics()
        .into_iter()
        .chain(entry.scope())
        .filter_map(|raw| {
            let tool = find_tool(&raw)?;
            Some((tool.key.to_string(), tool.link().to_string()))
        })
        .collect()
}

/// Resolve and store tooling links on every entry.
///
/// Entries with no known tools get an empty map. Returns the number of
/// entries updated.
pub fn apply_tooling_links(index: &mut DocsIndex) -> usize {
    for entry in &mut index.entries {
        entry.tooling_links = Some(resolve_tooling_links(entry));
    }
    log::debug!("Resolved tooling links for {} entries", index.len());
    index.len()
}

/// Every `(file, url)` pair recorded under `toolingLinks`.
pub fn collect_tooling_links(index: &DocsIndex) -> Vec<(String, String)> {
    index
        .iter()
        .flat_map(|entry| {
            entry
                .tooling_links
                .iter()
                .flat_map(|links| links.values())
                .map(move |url| (entry.file.clone(), url.clone()))
        })
        .collect()
}
