// src/robots/rules.rs
// =============================================================================
// This module reads robots.txt (RFC 9309).
//
// How a file is read:
// 1. Consecutive `User-agent` lines open one group; the rules below them
//    belong to every agent named
// 2. The group naming our product token is used; otherwise the `*` group
// 3. `Sitemap:` lines belong to no group and are collected for discovery
//
// How a path is checked:
// - Every matching pattern is a candidate; the longest one decides
// - On a tie in length, Allow beats Disallow
// - `*` matches any run of characters, a trailing `$` pins the end
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Rule {
    allow: bool,
    pattern: String,
}

/// Parsed robots.txt rules for one user agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsRules {
    rules: Vec<Rule>,
    /// `Sitemap:` directives, in file order. These apply to every agent.
    pub sitemaps: Vec<String>,
}

impl RobotsRules {
    /// Rules that permit everything (missing or unreadable robots.txt).
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether `path` (query included) may be fetched
    pub fn is_allowed(&self, path: &str) -> bool {
        let mut best: Option<(usize, bool)> = None;

        for rule in &self.rules {
            if !path_matches(path, &rule.pattern) {
                continue;
            }
            let len = rule.pattern.len();
            best = match best {
                // Longer match wins; on equal length Allow wins
                Some((best_len, best_allow))
                    if best_len > len || (best_len == len && best_allow) =>
                {
                    Some((best_len, best_allow))
                }
                _ => Some((len, rule.allow)),
            };
        }

        best.map_or(true, |(_, allow)| allow)
    }
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Reads a robots.txt body and keeps the rules that apply to `user_agent`.
///
/// Only the product token of `user_agent` is compared, so
/// `"sitemap-walker/0.1.0"` selects a `User-agent: sitemap-walker` group.
pub fn parse_robots(txt: &str, user_agent: &str) -> RobotsRules {
    let mut groups: Vec<Group> = Vec::new();
    let mut sitemaps = Vec::new();
    let mut last_was_agent = false;

    for line in txt.trim_start_matches('\u{feff}').lines() {
        let line = match line.find('#') {
            Some(hash) => &line[..hash],
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !last_was_agent || groups.is_empty() {
                    groups.push(Group::default());
                }
                if let Some(group) = groups.last_mut() {
                    group.agents.push(value.to_lowercase());
                }
                last_was_agent = true;
            }
            "allow" | "disallow" => {
                // An empty pattern matches nothing
                if let (Some(group), false) = (groups.last_mut(), value.is_empty()) {
                    group.rules.push(Rule {
                        allow: key == "allow",
                        pattern: value.to_string(),
                    });
                }
                last_was_agent = false;
            }
            "sitemap" => {
                // Not tied to the current group
                if !value.is_empty() {
                    sitemaps.push(value.to_string());
                }
            }
            _ => last_was_agent = false,
        }
    }

    let token = product_token(user_agent);
    let named: Vec<&Group> = groups
        .iter()
        .filter(|g| !token.is_empty() && g.agents.iter().any(|a| *a == token))
        .collect();
    let selected = if named.is_empty() {
        groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| a == "*"))
            .collect()
    } else {
        named
    };

    RobotsRules {
        rules: selected
            .into_iter()
            .flat_map(|g| g.rules.iter().cloned())
            .collect(),
        sitemaps,
    }
}

fn product_token(user_agent: &str) -> String {
    user_agent
        .split(['/', ' '])
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

// One robots.txt pattern against one path
fn path_matches(path: &str, pattern: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(head) => (head, true),
        None => (pattern, false),
    };

    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    if !path.starts_with(first) {
        return false;
    }
    if parts.len() == 1 {
        return !anchored || path.len() == first.len();
    }

    let mut pos = first.len();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate().skip(1) {
        if i == last && anchored {
            return path.len() >= pos + part.len() && path.ends_with(part);
        }
        match path[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_lines_and_blocked_archive() {
        let txt = r#"
# maps for crawlers
User-agent: *
Disallow: /maps/archive/
Crawl-delay: 10

Sitemap: https://shop.example/maps/products.xml.gz
sitemap: /maps/pages.xml
"#;

        let rules = parse_robots(txt, "sitemap-walker/0.1.0");
        assert_eq!(
            rules.sitemaps,
            vec!["https://shop.example/maps/products.xml.gz", "/maps/pages.xml"]
        );

        assert!(rules.is_allowed("/maps/pages.xml"));
        assert!(!rules.is_allowed("/maps/archive/2019.xml"));
        assert!(rules.is_allowed("/maps/archive"));
    }

    #[test]
    fn test_longer_allow_reopens_subtree() {
        let txt = "User-agent: *\nDisallow: /maps/\nAllow: /maps/public/\n";
        let rules = parse_robots(txt, "sitemap-walker");
        assert!(!rules.is_allowed("/maps/internal.xml"));
        assert!(rules.is_allowed("/maps/public/index.xml"));
        assert!(rules.is_allowed("/sitemap.xml"));
    }

    #[test]
    fn test_allow_wins_tie() {
        let rules = parse_robots("User-agent: *\nDisallow: /page\nAllow: /page\n", "bot");
        assert!(rules.is_allowed("/page"));
    }

    #[test]
    fn test_named_group_replaces_star() {
        let txt = "User-agent: *\nDisallow: /\n\nUser-agent: other\nUser-agent: Sitemap-Walker\nDisallow: /secret\n";
        let rules = parse_robots(txt, "sitemap-walker/1.0");
        assert!(rules.is_allowed("/sitemap.xml"));
        assert!(!rules.is_allowed("/secret/map.xml"));

        let fallback = parse_robots(txt, "somebody-else");
        assert!(!fallback.is_allowed("/sitemap.xml"));
    }

    #[test]
    fn test_wildcards_and_anchor() {
        let rules = parse_robots("User-agent: *\nDisallow: /*.xml.gz$\nDisallow: /tmp*/maps\n", "bot");
        assert!(!rules.is_allowed("/maps/sitemap.xml.gz"));
        assert!(rules.is_allowed("/maps/sitemap.xml.gz?v=2"));
        assert!(rules.is_allowed("/maps/sitemap.xml"));
        assert!(!rules.is_allowed("/tmp-old/maps/a.xml"));
    }

    #[test]
    fn test_empty_disallow_and_missing_file() {
        let rules = parse_robots("User-agent: *\nDisallow:\n", "bot");
        assert!(rules.is_allowed("/anything"));
        assert!(RobotsRules::allow_all().is_allowed("/anything"));
        assert!(parse_robots("", "bot").is_allowed("/"));
    }

    #[test]
    fn test_exact_match_pattern() {
        assert!(path_matches("/sitemap.xml", "/sitemap.xml$"));
        assert!(!path_matches("/sitemap.xml.gz", "/sitemap.xml$"));
        assert!(path_matches("/anything", "*"));
    }
}
