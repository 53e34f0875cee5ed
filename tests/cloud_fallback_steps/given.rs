//! Given steps for cloud fallback BDD scenarios.

use std::sync::Arc;

use super::world::{APP_REPORT, GatewayWorld, app_automate_url};
use eyre::WrapErr;
use farmgate::backend::services::default_pool;
use farmgate::config::GatewayConfig;
use mockable::{Clock, DefaultClock};
use rstest_bdd_macros::given;

#[given("the default backend pool")]
fn default_backend_pool(world: &mut GatewayWorld) -> Result<(), eyre::Report> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    world.pool =
        default_pool(&GatewayConfig::default(), clock).wrap_err("default pool should build")?;
    Ok(())
}

#[given(r#"the reporting API has the app report for session "{session_id}""#)]
fn reporting_api_has_app_report(
    world: &mut GatewayWorld,
    session_id: String,
) -> Result<(), eyre::Report> {
    let report = serde_json::from_str(APP_REPORT).wrap_err("fixture should be valid JSON")?;
    world.api = world
        .api
        .clone()
        .with_report(app_automate_url(&session_id), 0, report);
    Ok(())
}
