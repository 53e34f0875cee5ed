//! Unit tests for the reporting module.


use serde_json::Value;

/// Desktop Safari session on the Automate API.
pub(super) const DESKTOP_REPORT: &str =
    include_str!("../../../tests/fixtures/browserstack_browser_testinformation.json");
/// Mobile browser session on an iPhone.
pub(super) const MOBILE_BROWSER_REPORT: &str =
    include_str!("../../../tests/fixtures/browserstack_appium_browser_testinformation.json");
/// Native app session on a Pixel device.
pub(super) const APP_REPORT: &str =
    include_str!("../../../tests/fixtures/browserstack_appium_app_testinformation.json");

/// External id of the session described by [`APP_REPORT`].
pub(super) const APP_SESSION_ID: &str = "40693fb3fca7b00aac49e72908a648fcfa7af47a";

pub(super) fn document(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture should be valid JSON")
}

pub(super) fn app_automate_url(session_id: &str) -> String {
    format!("https://api-cloud.browserstack.com/app-automate/sessions/{session_id}.json")
}
