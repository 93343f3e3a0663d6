//! Curated tables for rule-based tag inference.

use std::collections::HashMap;

use once_cell::sync::Lazy;

type TagTable = HashMap<&'static str, &'static [&'static str]>;

/// Known hostnames (and `host/first-segment` keys) with their tags.
const KNOWN_DOMAIN_ENTRIES: &[(&str, &[&str])] = &[
    // Development & code
    ("github.com", &["development", "code", "repository", "programming"]),
    ("gitlab.com", &["development", "code", "repository", "programming"]),
    ("bitbucket.org", &["development", "code", "repository", "programming"]),
    ("stackoverflow.com", &["development", "Q&A", "programming", "help"]),
    ("stackexchange.com", &["development", "Q&A", "programming", "help"]),
    ("codepen.io", &["development", "code", "demo", "frontend"]),
    ("jsfiddle.net", &["development", "code", "demo", "frontend"]),
    ("repl.it", &["development", "code", "online-editor"]),
    ("glitch.com", &["development", "code", "web-apps"]),
    ("npmjs.com", &["development", "javascript", "packages"]),
    ("pypi.org", &["development", "python", "packages"]),
    // Documentation
    ("developer.mozilla.org", &["documentation", "web", "reference", "development"]),
    ("w3schools.com", &["documentation", "tutorial", "web", "development"]),
    ("docs.python.org", &["documentation", "python", "programming"]),
    ("nodejs.org", &["documentation", "javascript", "node"]),
    ("reactjs.org", &["documentation", "javascript", "react", "frontend"]),
    ("vuejs.org", &["documentation", "javascript", "vue", "frontend"]),
    // Learning
    ("udemy.com", &["learning", "courses", "education", "tutorial"]),
    ("coursera.org", &["learning", "courses", "education", "university"]),
    ("edx.org", &["learning", "courses", "education", "university"]),
    ("khanacademy.org", &["learning", "education", "tutorial", "free"]),
    ("freecodecamp.org", &["learning", "programming", "tutorial", "free"]),
    ("codecademy.com", &["learning", "programming", "tutorial", "interactive"]),
    ("pluralsight.com", &["learning", "courses", "technology", "professional"]),
    ("linkedin.com/learning", &["learning", "courses", "professional"]),
    // News & articles
    ("medium.com", &["articles", "blog", "reading", "writing"]),
    ("dev.to", &["articles", "blog", "development", "community"]),
    ("hackernews.com", &["news", "technology", "startups"]),
    ("reddit.com", &["community", "discussion", "social"]),
    ("twitter.com", &["social", "news", "microblog"]),
    ("news.ycombinator.com", &["news", "technology", "startups"]),
    // Design
    ("dribbble.com", &["design", "inspiration", "portfolio"]),
    ("behance.net", &["design", "portfolio", "creative"]),
    ("figma.com", &["design", "tool", "ui-ux", "collaboration"]),
    ("sketch.com", &["design", "tool", "ui-ux"]),
    ("canva.com", &["design", "tool", "graphics"]),
    ("unsplash.com", &["images", "photos", "free", "stock"]),
    ("pexels.com", &["images", "photos", "free", "stock"]),
    // Video & entertainment
    ("youtube.com", &["video", "entertainment", "streaming"]),
    ("vimeo.com", &["video", "creative", "streaming"]),
    ("twitch.tv", &["video", "streaming", "gaming", "live"]),
    ("netflix.com", &["video", "streaming", "entertainment"]),
    ("spotify.com", &["music", "streaming", "audio"]),
    // Shopping
    ("amazon.com", &["shopping", "e-commerce", "retail"]),
    ("ebay.com", &["shopping", "e-commerce", "auction"]),
    ("etsy.com", &["shopping", "handmade", "creative"]),
    ("aliexpress.com", &["shopping", "e-commerce", "international"]),
    // Productivity
    ("google.com/drive", &["productivity", "storage", "cloud", "documents"]),
    ("dropbox.com", &["productivity", "storage", "cloud"]),
    ("notion.so", &["productivity", "notes", "workspace"]),
    ("trello.com", &["productivity", "project-management", "kanban"]),
    ("asana.com", &["productivity", "project-management", "team"]),
    ("slack.com", &["productivity", "communication", "team"]),
    ("gmail.com", &["email", "communication", "google"]),
    // Reference
    ("wikipedia.org", &["reference", "encyclopedia", "information"]),
    ("wikihow.com", &["reference", "how-to", "tutorial"]),
    ("imdb.com", &["reference", "movies", "entertainment"]),
    ("goodreads.com", &["reference", "books", "reading"]),
    // Cloud & hosting
    ("aws.amazon.com", &["cloud", "hosting", "infrastructure"]),
    ("cloud.google.com", &["cloud", "hosting", "infrastructure"]),
    ("azure.microsoft.com", &["cloud", "hosting", "infrastructure"]),
    ("heroku.com", &["cloud", "hosting", "platform"]),
    ("vercel.com", &["cloud", "hosting", "frontend"]),
    ("netlify.com", &["cloud", "hosting", "frontend"]),
];

pub static KNOWN_DOMAINS: Lazy<TagTable> =
    Lazy::new(|| KNOWN_DOMAIN_ENTRIES.iter().copied().collect());

/// Path substrings and the content types they indicate.
pub static PATH_PATTERNS: &[(&str, &[&str])] = &[
    ("/blog", &["blog", "articles"]),
    ("/blogs", &["blog", "articles"]),
    ("/post", &["blog", "articles"]),
    ("/posts", &["blog", "articles"]),
    ("/article", &["articles", "reading"]),
    ("/articles", &["articles", "reading"]),
    ("/news", &["news", "articles"]),
    ("/docs", &["documentation", "reference"]),
    ("/documentation", &["documentation", "reference"]),
    ("/wiki", &["wiki", "reference", "documentation"]),
    ("/tutorial", &["tutorial", "learning"]),
    ("/tutorials", &["tutorial", "learning"]),
    ("/guide", &["guide", "tutorial"]),
    ("/guides", &["guide", "tutorial"]),
    ("/learn", &["learning", "education"]),
    ("/course", &["course", "learning"]),
    ("/courses", &["course", "learning"]),
    ("/shop", &["shopping", "e-commerce"]),
    ("/store", &["shopping", "e-commerce"]),
    ("/products", &["products", "shopping"]),
    ("/product", &["products", "shopping"]),
    ("/video", &["video", "media"]),
    ("/videos", &["video", "media"]),
    ("/watch", &["video", "media"]),
    ("/forum", &["forum", "community", "discussion"]),
    ("/forums", &["forum", "community", "discussion"]),
    ("/community", &["community", "discussion"]),
    ("/support", &["support", "help"]),
    ("/help", &["help", "support"]),
    ("/faq", &["help", "reference"]),
    ("/api", &["api", "development", "reference"]),
    ("/download", &["download", "software"]),
    ("/downloads", &["download", "software"]),
];

/// First hostname label (only for hosts with more than two labels).
const SUBDOMAIN_ENTRIES: &[(&str, &[&str])] = &[
    ("docs", &["documentation", "reference"]),
    ("doc", &["documentation", "reference"]),
    ("wiki", &["wiki", "reference"]),
    ("blog", &["blog", "articles"]),
    ("news", &["news", "articles"]),
    ("shop", &["shopping", "e-commerce"]),
    ("store", &["shopping", "e-commerce"]),
    ("support", &["support", "help"]),
    ("help", &["help", "support"]),
    ("api", &["api", "development"]),
    ("developer", &["development", "documentation"]),
    ("dev", &["development"]),
    ("forum", &["forum", "community"]),
    ("community", &["community", "discussion"]),
    ("learn", &["learning", "education"]),
    ("www", &[]),
];

pub static SUBDOMAIN_PATTERNS: Lazy<TagTable> =
    Lazy::new(|| SUBDOMAIN_ENTRIES.iter().copied().collect());

/// Top-level domains, keyed with their leading dot.
const TLD_ENTRIES: &[(&str, &[&str])] = &[
    (".edu", &["education", "academic"]),
    (".gov", &["government", "official"]),
    (".org", &["organization", "non-profit"]),
    (".io", &["technology", "startup"]),
    (".dev", &["development", "technology"]),
    (".app", &["application", "software"]),
    (".blog", &["blog", "articles"]),
];

pub static TLD_PATTERNS: Lazy<TagTable> =
    Lazy::new(|| TLD_ENTRIES.iter().copied().collect());

/// Title keywords (matched as lower-case substrings).
pub static KEYWORD_PATTERNS: &[(&str, &[&str])] = &[
    ("github", &["development", "code", "git"]),
    ("stackoverflow", &["development", "programming", "Q&A"]),
    ("tutorial", &["tutorial", "learning"]),
    ("documentation", &["documentation", "reference"]),
    ("blog", &["blog", "articles"]),
    ("news", &["news"]),
    ("video", &["video", "media"]),
    ("shop", &["shopping"]),
    ("store", &["shopping"]),
    ("download", &["download", "software"]),
    ("forum", &["forum", "community"]),
    ("wiki", &["wiki", "reference"]),
    ("learn", &["learning", "education"]),
    ("course", &["course", "learning"]),
    ("api", &["api", "development"]),
    ("recipe", &["cooking", "food", "recipe"]),
    ("travel", &["travel", "lifestyle"]),
    ("finance", &["finance", "money"]),
    ("health", &["health", "wellness"]),
    ("fitness", &["fitness", "health"]),
    ("gaming", &["gaming", "entertainment"]),
    ("music", &["music", "audio"]),
    ("podcast", &["podcast", "audio"]),
    ("job", &["career", "jobs"]),
    ("career", &["career", "professional"]),
];

/// Folder suggested for a tag.
const FOLDER_ENTRIES: &[(&str, &str)] = &[
    ("development", "Development"),
    ("code", "Development"),
    ("programming", "Development"),
    ("documentation", "Development/Documentation"),
    ("learning", "Education"),
    ("education", "Education"),
    ("tutorial", "Education/Tutorials"),
    ("course", "Education/Courses"),
    ("shopping", "Shopping"),
    ("e-commerce", "Shopping"),
    ("video", "Media/Video"),
    ("music", "Media/Music"),
    ("blog", "Reading/Blogs"),
    ("articles", "Reading/Articles"),
    ("news", "Reading/News"),
    ("reference", "Reference"),
    ("wiki", "Reference/Wiki"),
    ("productivity", "Productivity"),
    ("design", "Design"),
    ("social", "Social Media"),
];

pub static FOLDER_PRIORITY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| FOLDER_ENTRIES.iter().copied().collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_loaded() {
        assert_eq!(KNOWN_DOMAINS["github.com"].len(), 4);
        assert!(KNOWN_DOMAINS.contains_key("linkedin.com/learning"));
        assert!(SUBDOMAIN_PATTERNS["www"].is_empty());
        assert_eq!(TLD_PATTERNS[".edu"], &["education", "academic"]);
        assert_eq!(FOLDER_PRIORITY["social"], "Social Media");
    }

    #[test]
    fn test_path_patterns_start_with_slash() {
        assert!(PATH_PATTERNS.iter().all(|(p, _)| p.starts_with('/')));
        assert!(TLD_PATTERNS.keys().all(|k| k.starts_with('.')));
    }
}
