use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{ProgressInput, ProgressRecord, ProgressState, ResetRequest};
use crate::repo::{PathwayRepo, ProgressRepo};
use crate::state::AppState;

/// Progress tracking: one active record per (user, pathway) pair, with
/// monotonic state transitions. Only admins may reset a record.
pub struct ProgressService {
    pathways: Arc<dyn PathwayRepo>,
    progress: Arc<dyn ProgressRepo>,
}

impl ProgressService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pathways: state.pathways.clone(),
            progress: state.progress.clone(),
        }
    }

    /// Upserts the caller's record for a pathway.
    ///
    /// The pathway must exist and be visible to the caller. States only move
    /// forward; a backwards transition is a `Conflict` and requires an
    /// explicit admin reset instead.
    pub async fn mark(
        &self,
        caller: i32,
        input: ProgressInput,
    ) -> Result<ProgressRecord, AppError> {
        let pathway = self
            .pathways
            .find_by_id(input.pathway_id)
            .await?
            .filter(|p| p.visible_to(caller))
            .ok_or_else(|| AppError::NotFound("Pathway not found".into()))?;

        if let Some(existing) = self.progress.find(caller, pathway.id).await? {
            if !existing.state.can_advance_to(input.state) {
                return Err(AppError::Conflict(format!(
                    "Progress cannot move backwards (currently {:?})",
                    existing.state
                )));
            }
        }

        self.progress
            .upsert(ProgressRecord::new(caller, pathway.id, input.state))
            .await
    }

    /// The caller's active records, most recently updated first.
    pub async fn list(&self, caller: i32) -> Result<Vec<ProgressRecord>, AppError> {
        self.progress.list_for_user(caller).await
    }

    /// Admin-only: resets an existing record back to `not_started`.
    pub async fn reset(
        &self,
        caller: CurrentUser,
        request: ResetRequest,
    ) -> Result<ProgressRecord, AppError> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }

        self.progress
            .find(request.user_id, request.pathway_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Progress record not found".into()))?;

        self.progress
            .upsert(ProgressRecord::new(
                request.user_id,
                request.pathway_id,
                ProgressState::NotStarted,
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PathwayInput, UserRole, Visibility};
    use crate::services::PathwayService;
    use uuid::Uuid;

    const ALICE: i32 = 1;
    const BOB: i32 = 2;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: 99,
            role: UserRole::Admin,
        }
    }

    fn member(id: i32) -> CurrentUser {
        CurrentUser {
            id,
            role: UserRole::Member,
        }
    }

    async fn setup() -> (AppState, ProgressService, Uuid) {
        let state = AppState::in_memory();
        let pathway = PathwayService::new(&state)
            .create(
                ALICE,
                PathwayInput {
                    title: "Course".to_string(),
                    description: None,
                    visibility: Some(Visibility::Public),
                },
            )
            .await
            .unwrap();
        let service = ProgressService::new(&state);
        (state, service, pathway.id)
    }

    #[actix_rt::test]
    async fn test_mark_upserts_single_record() {
        let (_, service, pathway_id) = setup().await;

        service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::InProgress,
                },
            )
            .await
            .unwrap();
        let record = service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::Complete,
                },
            )
            .await
            .unwrap();
        assert_eq!(record.state, ProgressState::Complete);

        let records = service.list(BOB).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, ProgressState::Complete);
    }

    #[actix_rt::test]
    async fn test_backwards_transition_conflicts() {
        let (_, service, pathway_id) = setup().await;

        service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::Complete,
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service
                .mark(
                    BOB,
                    ProgressInput {
                        pathway_id,
                        state: ProgressState::InProgress,
                    },
                )
                .await,
            Err(AppError::Conflict(_))
        ));

        // Re-asserting the current state is fine.
        assert!(service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::Complete,
                },
            )
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_mark_unknown_pathway_not_found() {
        let (_, service, _) = setup().await;

        assert!(matches!(
            service
                .mark(
                    BOB,
                    ProgressInput {
                        pathway_id: Uuid::new_v4(),
                        state: ProgressState::InProgress,
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_private_pathway_progress_hidden() {
        let state = AppState::in_memory();
        let pathway = PathwayService::new(&state)
            .create(
                ALICE,
                PathwayInput {
                    title: "Private".to_string(),
                    description: None,
                    visibility: None,
                },
            )
            .await
            .unwrap();
        let service = ProgressService::new(&state);

        // Bob cannot see the pathway, so marking progress reads as NotFound.
        assert!(matches!(
            service
                .mark(
                    BOB,
                    ProgressInput {
                        pathway_id: pathway.id,
                        state: ProgressState::InProgress,
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));

        // The owner can.
        assert!(service
            .mark(
                ALICE,
                ProgressInput {
                    pathway_id: pathway.id,
                    state: ProgressState::InProgress,
                },
            )
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_reset_requires_admin() {
        let (_, service, pathway_id) = setup().await;

        service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::Complete,
                },
            )
            .await
            .unwrap();

        let request = ResetRequest {
            user_id: BOB,
            pathway_id,
        };

        assert!(matches!(
            service
                .reset(
                    member(BOB),
                    ResetRequest {
                        user_id: BOB,
                        pathway_id,
                    },
                )
                .await,
            Err(AppError::Forbidden(_))
        ));

        let record = service.reset(admin(), request).await.unwrap();
        assert_eq!(record.state, ProgressState::NotStarted);

        // After the reset, progress can move forward again.
        assert!(service
            .mark(
                BOB,
                ProgressInput {
                    pathway_id,
                    state: ProgressState::InProgress,
                },
            )
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_reset_missing_record_not_found() {
        let (_, service, pathway_id) = setup().await;

        assert!(matches!(
            service
                .reset(
                    admin(),
                    ResetRequest {
                        user_id: BOB,
                        pathway_id,
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
