use kids_app::capabilities::Capabilities;
use kids_app::config::Config;
use kids_app::logging;
use kids_app::store::SaveStatus;
use kids_core::avatars::avatar_icon;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log);

    tracing::info!(data_dir = %config.data_dir.display(), policy = ?config.unlock_policy, "starting kids-app");

    if let Err(err) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!(data_dir = %config.data_dir.display(), error = %err, "data directory unavailable");
        std::process::exit(1);
    }

    let mut runtime = kids_app::create_runtime(&config, Capabilities::default());
    let session = &mut runtime.session;

    if session.claim_daily_bonus() {
        tracing::info!(coins = session.state().coins, "daily bonus claimed");
    }

    let state = session.state();
    tracing::info!(
        avatar = avatar_icon(&state.current_avatar),
        level = %state.level,
        coins = state.coins,
        stars = state.progress.total_stars,
        streak = state.streak_days,
        unlocked = state.progress.unlocked_units.len(),
        mistakes = state.mistake_count(),
        online = runtime.content.is_online(),
        "learner ready"
    );

    match session.save_status() {
        SaveStatus::Failed { error, .. } => tracing::warn!(%error, "progress not saved"),
        status => tracing::debug!(?status, "save status"),
    }
}
