//! Best-effort device and OS detection from browser user-agents
//!
//! Only coarse categories are derived; anything unrecognised lands in the
//! `unknown` bucket. Rules are checked in order, most specific first
//! (an Android tablet also says "Linux", an iPhone also says "Mac OS X").

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    Desktop,
    Smartphone,
    Tablet,
    Bot,
    Unknown,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Desktop => "desktop",
            DeviceCategory::Smartphone => "smartphone",
            DeviceCategory::Tablet => "tablet",
            DeviceCategory::Bot => "bot",
            DeviceCategory::Unknown => "unknown",
        }
    }
}

/// Result of parsing one user-agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub category: DeviceCategory,
    /// `None` when the OS is not recognised
    pub os_name: Option<&'static str>,
}

pub const OS_IOS: &str = "iOS";
pub const OS_ANDROID: &str = "Android";

static OS_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\b(iphone|ipad|ipod)\b", OS_IOS),
        (r"(?i)\bandroid\b", OS_ANDROID),
        (r"(?i)windows phone", "Windows Phone"),
        (r"(?i)\bwindows\b", "Windows"),
        (r"(?i)\bcros\b", "Chrome OS"),
        (r"(?i)mac os x|macintosh", "Mac"),
        (r"(?i)\blinux\b|\bx11\b", "GNU/Linux"),
    ]
    .into_iter()
    .map(|(pattern, os)| (Regex::new(pattern).expect("valid OS regex"), os))
    .collect()
});

static BOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)bot\b|crawl|spider|slurp|headless|curl/|wget/").expect("valid bot regex")
});
static TABLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bipad\b|\btablet\b|\bkindle\b|\bsilk/").expect("valid tablet regex")
});
static MOBILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmobile\b|\biphone\b|\bipod\b|windows phone").expect("valid mobile regex")
});

/// Detect device category and OS name
pub fn detect(user_agent: &str) -> DeviceInfo {
    let user_agent = user_agent.trim();
    if user_agent.is_empty() {
        return DeviceInfo {
            category: DeviceCategory::Unknown,
            os_name: None,
        };
    }

    let os_name = OS_RULES
        .iter()
        .find(|(re, _)| re.is_match(user_agent))
        .map(|(_, os)| *os);

    let category = if BOT.is_match(user_agent) {
        DeviceCategory::Bot
    } else if TABLET.is_match(user_agent) {
        DeviceCategory::Tablet
    } else if MOBILE.is_match(user_agent) {
        DeviceCategory::Smartphone
    } else if os_name == Some(OS_ANDROID) {
        // Android browsers omit "Mobile" on tablets
        DeviceCategory::Tablet
    } else if os_name.is_some() {
        DeviceCategory::Desktop
    } else {
        DeviceCategory::Unknown
    };

    DeviceInfo { category, os_name }
}
