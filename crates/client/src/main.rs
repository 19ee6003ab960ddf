use std::sync::Arc;

use anyhow::Context;
use dexquest_client::clock::SystemClock;
use dexquest_client::config::ClientConfig;
use dexquest_client::demo;
use dexquest_client::session::Session;
use dexquest_client::state::AppState;
use dexquest_db::{DataStore, PgStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dexquest_client=debug,dexquest_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();

    let (store, default_session): (Arc<dyn DataStore>, Session) = match &config.database_url {
        Some(url) => {
            let pool = dexquest_db::create_pool(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            dexquest_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            dexquest_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            (Arc::new(PgStore::new(pool)), Session::Guest)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using the in-memory demo store");
            (
                Arc::new(demo::demo_store()),
                Session::signed_in(demo::DEMO_USER_ID),
            )
        }
    };
    let session = config
        .user_id
        .clone()
        .map(Session::signed_in)
        .unwrap_or(default_session);

    let state = AppState::new(config, store, session, Arc::new(SystemClock));
    let cancel = CancellationToken::new();
    let listeners = state.spawn_listeners(&cancel);

    run_demo(&state).await;

    tracing::info!("Press Ctrl-C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    cancel.cancel();
    for handle in listeners {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Listener task ended abnormally");
        }
    }
    tracing::info!("Shut down");
    Ok(())
}

/// Walk through one session: browse, catch, claim and shop.
async fn run_demo(state: &AppState) {
    match state.collection.load().await {
        Ok(entities) => tracing::info!(count = entities.len(), "Collection loaded"),
        Err(e) => {
            state.notifier.error(&e);
            tracing::error!(error = %e, "Failed to load collection");
            return;
        }
    }

    if state.session.is_guest() {
        if let Err(e) = state.missions.load().await {
            tracing::error!(error = %e, "Failed to load missions");
        }
        tracing::info!("Browsing as guest; sign in to track progress");
        return;
    }

    if let Err(e) = state.profile.load().await {
        state.notifier.error(&e);
    }

    let first_ids: Vec<_> = state.cache.entities().iter().take(3).map(|p| p.id).collect();
    for id in first_ids {
        if let Err(e) = state.collection.collect(id).await {
            state.notifier.error(&e);
        }
    }

    let board = match state.missions.load().await {
        Ok(board) => board,
        Err(e) => {
            state.notifier.error(&e);
            return;
        }
    };
    for mission in board.partition.claimable() {
        match state.missions.claim_reward(mission.mission.id).await {
            Ok(grant) => {
                state.notifier.show(format!(
                    "{} complete: +{} gold, +{} XP",
                    mission.mission.title, grant.gold_reward, grant.xp_reward
                ));
            }
            Err(e) => {
                state.notifier.error(&e);
            }
        }
    }

    if let Ok(items) = state.shop.list_items().await {
        if let Some(item) = items.first() {
            match state.shop.purchase_item(item.id).await {
                Ok(_) => match state.shop.equip_item(item.category, &item.name).await {
                    Ok(message) => {
                        state.notifier.show(message);
                    }
                    Err(e) => {
                        state.notifier.error(&e);
                    }
                },
                Err(e) => {
                    state.notifier.error(&e);
                }
            }
        }
    }

    if let Some(profile) = state.profile.profile() {
        tracing::info!(
            gold = profile.gold,
            xp = profile.xp,
            level = profile.level,
            colors = ?state.profile.display_colors(),
            "Session summary"
        );
    }
}
