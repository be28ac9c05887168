//! Metric catalogue
//!
//! Every series the service exports is declared here. Gauges hold absolute
//! values (content sizes, last highscore); counters only grow.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

#[derive(Debug)]
pub struct MetricDef {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

pub const VERSION: &str = "version";
pub const DIFFICULTIES: &str = "difficulties";
pub const QUESTIONS: &str = "questions";
pub const GAMEMODES: &str = "gamemodes";

pub const ANSWERS_TOTAL: &str = "answers_total";
pub const ANSWERS_RIGHT: &str = "answers_right";
pub const ANSWERS_WRONG: &str = "answers_wrong";

pub const HIGHSCORES_TOTAL: &str = "highscores_total";
pub const HIGHSCORES_BY_DIFFICULTY: &str = "highscores_by_difficulty";
pub const HIGHSCORES_VALUES_TOTAL: &str = "highscores_values_total";
pub const HIGHSCORES_VALUES_BY_DIFFICULTY: &str = "highscores_values_by_difficulty";
pub const LAST_HIGHSCORE_VALUE: &str = "last_highscore_value";

pub const IMPRESSIONS_TOTAL: &str = "impressions_total";
pub const IMPRESSIONS_BY_USERAGENT: &str = "impressions_by_useragent";
pub const IMPRESSIONS_BY_APPTYPE: &str = "impressions_by_apptype";
pub const IMPRESSIONS_BY_DEVICE: &str = "impressions_by_device";
pub const IMPRESSIONS_IOS_NOAPP: &str = "impressions_ios_noapp";
pub const IMPRESSIONS_ANDROID_NOAPP: &str = "impressions_android_noapp";

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

pub const CATALOG: &[MetricDef] = &[
    MetricDef {
        name: VERSION,
        help: "Version of this Service",
        kind: MetricKind::Gauge,
        labels: &["version"],
    },
    MetricDef {
        name: DIFFICULTIES,
        help: "Number of Difficulties in System",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: QUESTIONS,
        help: "Number of Questions in System",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: GAMEMODES,
        help: "Number of Game Modes in System",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: ANSWERS_TOTAL,
        help: "Total Answers",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: ANSWERS_RIGHT,
        help: "Right Answers",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: ANSWERS_WRONG,
        help: "Wrong Answers",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: HIGHSCORES_TOTAL,
        help: "Total Number of Highscores",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: HIGHSCORES_BY_DIFFICULTY,
        help: "Number of Highscores by Difficulty labeled",
        kind: MetricKind::Counter,
        labels: &["difficulty"],
    },
    MetricDef {
        name: HIGHSCORES_VALUES_TOTAL,
        help: "Total Value of Highscores",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: HIGHSCORES_VALUES_BY_DIFFICULTY,
        help: "Value of Highscores by Difficulty labeled",
        kind: MetricKind::Counter,
        labels: &["difficulty"],
    },
    MetricDef {
        name: LAST_HIGHSCORE_VALUE,
        help: "Last Value of Highscores",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: IMPRESSIONS_TOTAL,
        help: "Total Question Impressions",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDef {
        name: IMPRESSIONS_BY_USERAGENT,
        help: "Question Impressions by User-Agent",
        kind: MetricKind::Counter,
        labels: &["useragent"],
    },
    MetricDef {
        name: IMPRESSIONS_BY_APPTYPE,
        help: "Question Impressions by App Type",
        kind: MetricKind::Counter,
        labels: &["apptype"],
    },
    MetricDef {
        name: IMPRESSIONS_BY_DEVICE,
        help: "Question Impressions of Browsers by Device Type",
        kind: MetricKind::Counter,
        labels: &["device"],
    },
    MetricDef {
        name: IMPRESSIONS_IOS_NOAPP,
        help: "Mobile Web Visits on iOS without the App",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: IMPRESSIONS_ANDROID_NOAPP,
        help: "Mobile Web Visits on Android without the App",
        kind: MetricKind::Gauge,
        labels: &[],
    },
    MetricDef {
        name: HTTP_REQUESTS_TOTAL,
        help: "HTTP Requests by Method, Route and Status",
        kind: MetricKind::Counter,
        labels: &["method", "path", "status"],
    },
];

/// Look up a declared metric
pub fn find(name: &str) -> Option<&'static MetricDef> {
    CATALOG.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn find_returns_declared_kind() {
        assert_eq!(find(HIGHSCORES_TOTAL).map(|d| d.kind), Some(MetricKind::Counter));
        assert_eq!(find(LAST_HIGHSCORE_VALUE).map(|d| d.kind), Some(MetricKind::Gauge));
        assert!(find("no_such_metric").is_none());
    }
}
