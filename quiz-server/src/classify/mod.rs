//! Request classification for impression metrics
//!
//! Native clients identify themselves with a reserved user-agent token and
//! skip device parsing. Everything else counts as a web visit and goes
//! through [`device::detect`]. Classification never fails: a missing or
//! garbled user-agent is a web visit from an unknown device.

pub mod device;

use quiz_common::config::{ClassifierConfig, MetricsConfig};
use tracing::trace;

use crate::metrics::{catalog, MetricsAggregator};
use device::{DeviceCategory, OS_ANDROID, OS_IOS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    IosApp,
    AndroidApp,
    Web,
}

/// Outcome of classifying one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub apptype: AppType,
    /// Device category label, web visits only
    pub device: Option<String>,
    /// Parsed OS name, web visits with a recognised OS only
    pub os_name: Option<String>,
}

pub struct RequestClassifier {
    ios_app_token: String,
    android_app_token: String,
    raw_user_agent_label: bool,
}

impl RequestClassifier {
    pub fn new(tokens: &ClassifierConfig, metrics: &MetricsConfig) -> Self {
        Self {
            ios_app_token: tokens.ios_app_token.clone(),
            android_app_token: tokens.android_app_token.clone(),
            raw_user_agent_label: metrics.raw_user_agent_label,
        }
    }

    /// Classify a user-agent header value
    pub fn classify(&self, user_agent: &str) -> Classification {
        if user_agent == self.ios_app_token {
            return Classification {
                apptype: AppType::IosApp,
                device: None,
                os_name: None,
            };
        }
        if user_agent == self.android_app_token {
            return Classification {
                apptype: AppType::AndroidApp,
                device: None,
                os_name: None,
            };
        }

        let info = device::detect(user_agent);
        Classification {
            apptype: AppType::Web,
            device: Some(info.category.as_str().to_string()),
            os_name: info.os_name.map(str::to_string),
        }
    }

    /// Label used for `impressions_by_apptype`
    ///
    /// Native clients are labelled with their token, browsers with `web`.
    pub fn apptype_label(&self, apptype: AppType) -> &str {
        match apptype {
            AppType::IosApp => &self.ios_app_token,
            AppType::AndroidApp => &self.android_app_token,
            AppType::Web => "web",
        }
    }

    /// Classify and count one impression
    pub fn observe(&self, user_agent: &str, metrics: &MetricsAggregator) -> Classification {
        let classification = self.classify(user_agent);
        trace!(?classification, "Classified request");

        metrics.record(catalog::IMPRESSIONS_TOTAL, &[], 1);
        metrics.record(
            catalog::IMPRESSIONS_BY_USERAGENT,
            &[self.user_agent_label(user_agent, classification.apptype)],
            1,
        );
        metrics.record(
            catalog::IMPRESSIONS_BY_APPTYPE,
            &[self.apptype_label(classification.apptype)],
            1,
        );

        if let Some(device) = &classification.device {
            metrics.record(catalog::IMPRESSIONS_BY_DEVICE, &[device.as_str()], 1);
        }
        match classification.os_name.as_deref() {
            Some(OS_IOS) => metrics.record(catalog::IMPRESSIONS_IOS_NOAPP, &[], 1),
            Some(OS_ANDROID) => metrics.record(catalog::IMPRESSIONS_ANDROID_NOAPP, &[], 1),
            _ => {}
        }

        classification
    }

    fn user_agent_label<'a>(&self, user_agent: &'a str, apptype: AppType) -> &'a str {
        if self.raw_user_agent_label {
            return user_agent;
        }
        match apptype {
            AppType::IosApp | AppType::AndroidApp => "native",
            AppType::Web if user_agent.trim().is_empty() => DeviceCategory::Unknown.as_str(),
            AppType::Web => "browser",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::catalog::*;

    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

    fn classifier() -> RequestClassifier {
        RequestClassifier::new(&ClassifierConfig::default(), &MetricsConfig::default())
    }

    fn metrics() -> MetricsAggregator {
        MetricsAggregator::new().expect("catalogue should register")
    }

    #[test]
    fn native_tokens_skip_device_parsing() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("bibelquiz-ios-app"),
            Classification { apptype: AppType::IosApp, device: None, os_name: None }
        );
        assert_eq!(classifier.classify("bibelquiz-android-app").apptype, AppType::AndroidApp);
    }

    #[test]
    fn tokens_must_match_exactly() {
        let classifier = classifier();
        assert_eq!(classifier.classify("bibelquiz-ios-app/2.0").apptype, AppType::Web);
        assert_eq!(classifier.classify(" bibelquiz-ios-app").apptype, AppType::Web);
    }

    #[test]
    fn ios_app_counts_apptype_only() {
        let classifier = classifier();
        let metrics = metrics();

        classifier.observe("bibelquiz-ios-app", &metrics);

        assert_eq!(metrics.value(IMPRESSIONS_TOTAL, &[]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_APPTYPE, &["bibelquiz-ios-app"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_USERAGENT, &["bibelquiz-ios-app"]), Some(1));
        assert!(metrics.snapshot().iter().all(|s| s.name != IMPRESSIONS_BY_DEVICE));
        assert_eq!(metrics.value(IMPRESSIONS_IOS_NOAPP, &[]), Some(0));
    }

    #[test]
    fn ios_browser_counts_as_noapp_visit() {
        let classifier = classifier();
        let metrics = metrics();

        let classification = classifier.observe(IPHONE_SAFARI, &metrics);

        assert_eq!(classification.apptype, AppType::Web);
        assert_eq!(classification.device.as_deref(), Some("smartphone"));
        assert_eq!(classification.os_name.as_deref(), Some("iOS"));
        assert_eq!(metrics.value(IMPRESSIONS_BY_APPTYPE, &["web"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_DEVICE, &["smartphone"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_IOS_NOAPP, &[]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_ANDROID_NOAPP, &[]), Some(0));
    }

    #[test]
    fn android_browser_counts_as_noapp_visit() {
        let classifier = classifier();
        let metrics = metrics();

        classifier.observe(ANDROID_PHONE, &metrics);

        assert_eq!(metrics.value(IMPRESSIONS_ANDROID_NOAPP, &[]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_IOS_NOAPP, &[]), Some(0));
    }

    #[test]
    fn missing_user_agent_falls_back_to_unknown() {
        let classifier = classifier();
        let metrics = metrics();

        let classification = classifier.observe("", &metrics);

        assert_eq!(classification.apptype, AppType::Web);
        assert_eq!(classification.device.as_deref(), Some("unknown"));
        assert_eq!(classification.os_name, None);
        assert_eq!(metrics.value(IMPRESSIONS_BY_DEVICE, &["unknown"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_TOTAL, &[]), Some(1));
    }

    #[test]
    fn bucketed_user_agent_label() {
        let classifier = RequestClassifier::new(
            &ClassifierConfig::default(),
            &MetricsConfig { raw_user_agent_label: false },
        );
        let metrics = metrics();

        classifier.observe(IPHONE_SAFARI, &metrics);
        classifier.observe("bibelquiz-android-app", &metrics);
        classifier.observe("", &metrics);

        assert_eq!(metrics.value(IMPRESSIONS_BY_USERAGENT, &["browser"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_USERAGENT, &["native"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_USERAGENT, &["unknown"]), Some(1));
        assert_eq!(metrics.value(IMPRESSIONS_BY_USERAGENT, &[IPHONE_SAFARI]), None);
    }
}
