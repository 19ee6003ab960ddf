use std::sync::Arc;

use dexquest_core::shop::{validate_team, Team};
use dexquest_core::types::DbId;
use dexquest_db::DataStore;
use dexquest_events::events::TeamEvent;
use dexquest_events::EventBus;

use crate::error::ClientResult;
use crate::session::Session;

#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn DataStore>,
    bus: Arc<EventBus>,
    session: Session,
}

impl TeamService {
    pub fn new(store: Arc<dyn DataStore>, bus: Arc<EventBus>, session: Session) -> Self {
        Self {
            store,
            bus,
            session,
        }
    }

    /// Validate and store a team of 1-6 distinct members.
    pub async fn create_team(&self, name: &str, member_ids: &[DbId]) -> ClientResult<Team> {
        let user_id = self.session.require_user()?;
        validate_team(name, member_ids)?;

        let team = self
            .store
            .create_team(user_id, name.trim(), member_ids)
            .await?;
        tracing::info!(user_id, team_id = team.id, members = member_ids.len(), "Team created");
        self.bus.publish_team(TeamEvent::Created { team_id: team.id });
        Ok(team)
    }

    pub async fn delete_team(&self, team_id: DbId) -> ClientResult<()> {
        let user_id = self.session.require_user()?;
        self.store.delete_team(user_id, team_id).await?;
        tracing::info!(user_id, team_id, "Team deleted");
        self.bus.publish_team(TeamEvent::Deleted { team_id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use dexquest_core::error::CoreError;
    use dexquest_core::profile::Profile;
    use dexquest_db::MemoryStore;
    use dexquest_events::events::ProgressTrigger;

    use super::*;
    use crate::error::ClientError;

    fn service() -> TeamService {
        let store = MemoryStore::new().with_user(Profile {
            user_id: "ash".into(),
            ..Default::default()
        });
        TeamService::new(
            Arc::new(store),
            Arc::new(EventBus::default()),
            Session::signed_in("ash"),
        )
    }

    #[tokio::test]
    async fn oversized_team_is_rejected_before_the_store() {
        let svc = service();
        let mut teams = svc.bus.teams().subscribe();

        assert_matches!(
            svc.create_team("Too Many", &[1, 2, 3, 4, 5, 6, 7]).await,
            Err(ClientError::Core(CoreError::Validation(_)))
        );
        assert!(teams.try_recv().is_none());
    }

    #[tokio::test]
    async fn creating_a_team_emits_team_and_progress() {
        let svc = service();
        let mut teams = svc.bus.teams().subscribe();
        let mut progress = svc.bus.mission_progress().subscribe();

        let team = svc.create_team("  Starters ", &[1, 4, 7]).await.unwrap();

        assert_eq!(team.name, "Starters");
        assert_eq!(teams.try_recv(), Some(TeamEvent::Created { team_id: team.id }));
        assert_eq!(progress.try_recv().map(|e| e.trigger), Some(ProgressTrigger::Team));
    }
}
