//! When steps for cloud fallback BDD scenarios.

use std::sync::Arc;

use super::world::{GatewayWorld, run_async};
use eyre::WrapErr;
use farmgate::backend::{
    domain::{CapabilitySet, ExternalSessionId},
    services::BackendOrderingPolicy,
};
use farmgate::forwarding::{ForwardedRequest, HttpMethod, RequestType};
use rstest_bdd_macros::when;

fn select(world: &mut GatewayWorld, requested: &CapabilitySet) -> Result<(), eyre::Report> {
    let (backend, session) = BackendOrderingPolicy
        .select(&world.pool, requested)
        .ok_or_else(|| eyre::eyre!("no backend accepted {requested:?}"))?;
    world.selected = Some((Arc::clone(backend), session));
    Ok(())
}

#[when(r#"a "{browser}" session is requested on "{platform}""#)]
fn browser_session_requested(
    world: &mut GatewayWorld,
    browser: String,
    platform: String,
) -> Result<(), eyre::Report> {
    let requested = CapabilitySet::new()
        .with("browserName", browser)
        .with("platformName", platform);
    select(world, &requested)
}

#[when(r#"the "{app}" app is requested with "{browser}" on "{platform}""#)]
fn app_session_requested(
    world: &mut GatewayWorld,
    app: String,
    browser: String,
    platform: String,
) -> Result<(), eyre::Report> {
    let requested = CapabilitySet::new()
        .with("browserName", browser)
        .with("platformName", platform)
        .with("app", app);
    select(world, &requested)
}

#[when(r#"the backend confirms the session as "{external_id}""#)]
fn backend_confirms_session(
    world: &mut GatewayWorld,
    external_id: String,
) -> Result<(), eyre::Report> {
    let proxy = world.selected_proxy()?;
    let (_, session) = world.selected()?;
    let id = ExternalSessionId::new(external_id).wrap_err("external id should be valid")?;
    proxy
        .on_session_started(session, id)
        .wrap_err("external id should attach")
}

#[when("the client ends the session")]
fn client_ends_session(world: &mut GatewayWorld) -> Result<(), eyre::Report> {
    let proxy = world.selected_proxy()?;
    let (_, session) = world.selected()?;
    let request = ForwardedRequest::new(
        HttpMethod::Delete,
        RequestType::StopSession,
        format!("/wd/hub/session/{}", session.id()),
    );
    let handle = proxy
        .after_command(session, &request)
        .wrap_err("termination should release the session")?
        .ok_or_else(|| eyre::eyre!("termination should trigger retrieval"))?;
    let outcome = run_async(handle).wrap_err("retrieval task should not panic")?;
    world.outcome = Some(outcome);
    Ok(())
}
