//! `robots.txt` crawler policy.

use crate::domain::site::SiteConfig;

struct RuleGroup {
    agents: &'static [&'static str],
    allow: &'static [&'static str],
    disallow: &'static [&'static str],
}

const COMMON_DISALLOW: &[&str] = &[
    "/api/*",
    "/admin/*",
    "/_next/*",
    "/*/api/*",
    "*/maintenance*",
    "/privacy/internal/*",
    "/draft/*",
    "/preview/*",
    "/login/*",
    "/register/*",
    "/account/*",
    "/temp/*",
    "/test/*",
];

const SEARCH_ENGINE_DISALLOW: &[&str] = &[
    "/api/*", "/_next/*", "/admin/*", "/draft/*", "/preview/*", "/temp/*", "/test/*",
];

const SEARCH_ENGINE_ALLOW: &[&str] = &[
    "/",
    "/images/",
    "/blog/",
    "/case/",
    "/service/",
    "/team/",
    "/service/medical-ad-compliance/",
    "/blog/dental-advertising-regulations/",
    "/privacy/medical-compliance/",
];

const SOCIAL_ALLOW: &[&str] = &["/", "/blog/*", "/case/*", "/service/*", "/team/*"];
const SOCIAL_DISALLOW: &[&str] = &["/api/*", "/_next/*", "/admin/*"];

const AI_ALLOW: &[&str] = &["/", "/blog/*", "/service/*"];
const AI_DISALLOW: &[&str] = &["/api/*", "/admin/*", "/contact/*", "/team/*", "/case/*"];

const RULES: &[RuleGroup] = &[
    RuleGroup {
        agents: &["*"],
        allow: &[
            "/",
            "/images/",
            "/blog/",
            "/case/",
            "/service/",
            "/team/",
            "/contact/",
            "/service/medical-ad-compliance/",
        ],
        disallow: COMMON_DISALLOW,
    },
    RuleGroup {
        agents: &[
            "Googlebot",
            "Googlebot-Mobile",
            "Bingbot",
            "Baiduspider",
            "YandexBot",
            "Applebot",
            "DuckDuckBot",
        ],
        allow: SEARCH_ENGINE_ALLOW,
        disallow: SEARCH_ENGINE_DISALLOW,
    },
    RuleGroup {
        agents: &["Googlebot-Image"],
        allow: &["/images/", "/blog/", "/case/", "/team/", "/service/"],
        disallow: &[],
    },
    RuleGroup {
        agents: &["Googlebot-News"],
        allow: &["/blog/"],
        disallow: &[
            "/api/*", "/_next/*", "/admin/*", "/draft/*", "/preview/*", "/temp/*", "/test/*",
            "/service/", "/team/", "/case/", "/contact/",
        ],
    },
    RuleGroup {
        agents: &["facebookexternalhit", "LinkedInBot", "Twitterbot"],
        allow: SOCIAL_ALLOW,
        disallow: SOCIAL_DISALLOW,
    },
    RuleGroup {
        agents: &["Google-Business-Information"],
        allow: &["/", "/service/*", "/contact/*", "/about/*"],
        disallow: SEARCH_ENGINE_DISALLOW,
    },
    RuleGroup {
        agents: &["GPTBot", "Anthropic-AI", "CCBot", "Omgilibot"],
        allow: AI_ALLOW,
        disallow: AI_DISALLOW,
    },
];

pub(crate) fn render_robots(site: &SiteConfig) -> String {
    let mut out = String::new();
    for group in RULES {
        for agent in group.agents {
            out.push_str(&format!("User-Agent: {agent}\n"));
        }
        for path in group.allow {
            out.push_str(&format!("Allow: {path}\n"));
        }
        for path in group.disallow {
            out.push_str(&format!("Disallow: {path}\n"));
        }
        out.push('\n');
    }

    let origin = site.origin();
    out.push_str(&format!("Host: {origin}\n"));
    out.push_str(&format!("Sitemap: {origin}/sitemap.xml\n"));
    out
}
