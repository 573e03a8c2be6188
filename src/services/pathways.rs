use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    ContentInput, ContentItem, ContentUpdate, Pathway, PathwayInput, PathwayQuery, PathwaySummary,
};
use crate::repo::{ContentRepo, PathwayRepo, ProgressRepo};
use crate::state::AppState;

/// Pathway CRUD plus the ordered content sequence within a pathway.
///
/// Visibility rule throughout: a pathway that does not exist, is soft-deleted,
/// or is private and not owned by the caller reads as `NotFound`; a visible
/// pathway the caller does not own rejects writes with `Forbidden`.
pub struct PathwayService {
    pathways: Arc<dyn PathwayRepo>,
    content: Arc<dyn ContentRepo>,
    progress: Arc<dyn ProgressRepo>,
}

impl PathwayService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pathways: state.pathways.clone(),
            content: state.content.clone(),
            progress: state.progress.clone(),
        }
    }

    pub async fn create(&self, caller: i32, input: PathwayInput) -> Result<Pathway, AppError> {
        let pathway = Pathway::new(input, caller);
        self.pathways.insert(&pathway).await?;
        Ok(pathway)
    }

    /// Fetches a pathway the caller may read.
    pub async fn get(&self, caller: i32, id: Uuid) -> Result<Pathway, AppError> {
        let pathway = self
            .pathways
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pathway not found".into()))?;

        if !pathway.visible_to(caller) {
            // Private pathways of other users are indistinguishable from
            // absent ones.
            return Err(AppError::NotFound("Pathway not found".into()));
        }
        Ok(pathway)
    }

    /// Like `get`, but the caller must also be the owner.
    async fn get_owned(&self, caller: i32, id: Uuid) -> Result<Pathway, AppError> {
        let pathway = self.get(caller, id).await?;
        if pathway.owner_id != caller {
            return Err(AppError::Forbidden("Not the pathway owner".into()));
        }
        Ok(pathway)
    }

    /// Pathways visible to the caller, newest first, each enriched with its
    /// content-item count and the caller's own progress state.
    pub async fn list(
        &self,
        caller: i32,
        query: PathwayQuery,
    ) -> Result<Vec<PathwaySummary>, AppError> {
        let pathways = self.pathways.list(caller, &query).await?;

        let mut summaries = Vec::with_capacity(pathways.len());
        for pathway in pathways {
            let content_count = self.content.count_for_pathway(pathway.id).await?;
            let progress = self
                .progress
                .find(caller, pathway.id)
                .await?
                .map(|record| record.state);
            summaries.push(PathwaySummary {
                pathway,
                content_count,
                progress,
            });
        }
        Ok(summaries)
    }

    pub async fn update(
        &self,
        caller: i32,
        id: Uuid,
        input: PathwayInput,
    ) -> Result<Pathway, AppError> {
        let mut pathway = self.get_owned(caller, id).await?;

        pathway.title = input.title;
        pathway.description = input.description;
        if let Some(visibility) = input.visibility {
            pathway.visibility = visibility;
        }
        pathway.updated_at = chrono::Utc::now();

        self.pathways.update(&pathway).await?;
        Ok(pathway)
    }

    /// Owner-only soft delete; content items and progress records go with it.
    pub async fn delete(&self, caller: i32, id: Uuid) -> Result<(), AppError> {
        let pathway = self.get_owned(caller, id).await?;
        self.pathways.soft_delete(pathway.id).await
    }

    /// Inserts a content item at the requested position; trailing items are
    /// shifted so positions stay contiguous.
    pub async fn add_content(
        &self,
        caller: i32,
        pathway_id: Uuid,
        input: ContentInput,
    ) -> Result<ContentItem, AppError> {
        let pathway = self.get_owned(caller, pathway_id).await?;
        let position = input.position;
        let item = ContentItem::new(input, pathway.id, position);
        self.content.insert_at(item).await
    }

    pub async fn list_content(
        &self,
        caller: i32,
        pathway_id: Uuid,
    ) -> Result<Vec<ContentItem>, AppError> {
        let pathway = self.get(caller, pathway_id).await?;
        self.content.list_for_pathway(pathway.id).await
    }

    pub async fn update_content(
        &self,
        caller: i32,
        pathway_id: Uuid,
        content_id: Uuid,
        update: ContentUpdate,
    ) -> Result<ContentItem, AppError> {
        let pathway = self.get_owned(caller, pathway_id).await?;

        let mut item = self
            .content
            .find_by_id(content_id)
            .await?
            .filter(|item| item.pathway_id == pathway.id)
            .ok_or_else(|| AppError::NotFound("Content item not found".into()))?;

        item.kind = update.kind;
        item.title = update.title;
        item.body = update.body;
        item.url = update.url;

        self.content.update(&item).await?;
        Ok(item)
    }

    pub async fn remove_content(
        &self,
        caller: i32,
        pathway_id: Uuid,
        content_id: Uuid,
    ) -> Result<(), AppError> {
        let pathway = self.get_owned(caller, pathway_id).await?;
        self.content.remove(pathway.id, content_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, ProgressRecord, ProgressState, Visibility};
    use pretty_assertions::assert_eq;

    const ALICE: i32 = 1;
    const BOB: i32 = 2;

    fn service() -> PathwayService {
        PathwayService::new(&AppState::in_memory())
    }

    fn pathway_input(title: &str, visibility: Option<Visibility>) -> PathwayInput {
        PathwayInput {
            title: title.to_string(),
            description: None,
            visibility,
        }
    }

    fn content_input(title: &str, position: i32) -> ContentInput {
        ContentInput {
            kind: ContentKind::Text,
            title: title.to_string(),
            body: Some("Lesson body".to_string()),
            url: None,
            position,
        }
    }

    fn default_query() -> PathwayQuery {
        PathwayQuery {
            owner: None,
            visibility: None,
            search: None,
            limit: None,
            offset: None,
        }
    }

    #[actix_rt::test]
    async fn test_private_pathway_hidden_from_others() {
        let service = service();
        let pathway = service
            .create(ALICE, pathway_input("Secret", None))
            .await
            .unwrap();

        assert!(service.get(ALICE, pathway.id).await.is_ok());
        assert!(matches!(
            service.get(BOB, pathway.id).await,
            Err(AppError::NotFound(_))
        ));

        // Public pathways are readable by anyone but writable only by the owner.
        let public = service
            .create(ALICE, pathway_input("Open", Some(Visibility::Public)))
            .await
            .unwrap();
        assert!(service.get(BOB, public.id).await.is_ok());
        assert!(matches!(
            service.delete(BOB, public.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(service.get(ALICE, public.id).await.is_ok(), "still present");
    }

    #[actix_rt::test]
    async fn test_add_content_positions() {
        let service = service();
        let pathway = service
            .create(ALICE, pathway_input("Course", None))
            .await
            .unwrap();

        service
            .add_content(ALICE, pathway.id, content_input("first", 0))
            .await
            .unwrap();
        service
            .add_content(ALICE, pathway.id, content_input("third", 1))
            .await
            .unwrap();
        // Wedge one in between; "third" shifts to position 2.
        service
            .add_content(ALICE, pathway.id, content_input("second", 1))
            .await
            .unwrap();

        let items = service.list_content(ALICE, pathway.id).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        let positions: Vec<i32> = items.iter().map(|i| i.position).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert_eq!(positions, vec![0, 1, 2]);

        // Out-of-bounds insert is rejected.
        assert!(matches!(
            service
                .add_content(ALICE, pathway.id, content_input("x", 5))
                .await,
            Err(AppError::InvalidPosition(_))
        ));

        // Non-owner cannot add content even to a visible pathway.
        assert!(matches!(
            service
                .add_content(BOB, pathway.id, content_input("y", 0))
                .await,
            Err(AppError::NotFound(_)) | Err(AppError::Forbidden(_))
        ));
    }

    #[actix_rt::test]
    async fn test_remove_content_reindexes() {
        let service = service();
        let pathway = service
            .create(ALICE, pathway_input("Course", None))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (i, title) in ["a", "b", "c"].iter().enumerate() {
            let item = service
                .add_content(ALICE, pathway.id, content_input(title, i as i32))
                .await
                .unwrap();
            ids.push(item.id);
        }

        service
            .remove_content(ALICE, pathway.id, ids[1])
            .await
            .unwrap();

        let items = service.list_content(ALICE, pathway.id).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        let positions: Vec<i32> = items.iter().map(|i| i.position).collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert_eq!(positions, vec![0, 1]);
    }

    #[actix_rt::test]
    async fn test_delete_cascades_and_listing() {
        let state = AppState::in_memory();
        let service = PathwayService::new(&state);

        let keep = service
            .create(ALICE, pathway_input("Keep", None))
            .await
            .unwrap();
        let doomed = service
            .create(ALICE, pathway_input("Doomed", None))
            .await
            .unwrap();
        service
            .add_content(ALICE, doomed.id, content_input("gone", 0))
            .await
            .unwrap();
        state
            .progress
            .upsert(ProgressRecord::new(
                ALICE,
                doomed.id,
                ProgressState::InProgress,
            ))
            .await
            .unwrap();

        service.delete(ALICE, doomed.id).await.unwrap();

        let summaries = service.list(ALICE, default_query()).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pathway.id, keep.id);

        assert!(matches!(
            service.get(ALICE, doomed.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(state.progress.find(ALICE, doomed.id).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_listing_enrichment_and_filters() {
        let state = AppState::in_memory();
        let service = PathwayService::new(&state);

        let course = service
            .create(ALICE, pathway_input("Intro to X", Some(Visibility::Public)))
            .await
            .unwrap();
        service
            .create(BOB, pathway_input("Bob private", None))
            .await
            .unwrap();
        service
            .add_content(ALICE, course.id, content_input("lesson", 0))
            .await
            .unwrap();
        state
            .progress
            .upsert(ProgressRecord::new(
                ALICE,
                course.id,
                ProgressState::InProgress,
            ))
            .await
            .unwrap();

        // Alice sees her own pathway but not Bob's private one.
        let summaries = service.list(ALICE, default_query()).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pathway.title, "Intro to X");
        assert_eq!(summaries[0].content_count, 1);
        assert_eq!(summaries[0].progress, Some(ProgressState::InProgress));

        // Bob sees his own plus the public one, newest first.
        let summaries = service.list(BOB, default_query()).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].pathway.title, "Bob private");
        assert_eq!(summaries[1].pathway.title, "Intro to X");
        assert_eq!(summaries[1].progress, None);

        // Owner filter narrows the listing.
        let mut query = default_query();
        query.owner = Some(ALICE);
        let summaries = service.list(BOB, query).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pathway.owner_id, ALICE);

        // Search matches titles case-insensitively.
        let mut query = default_query();
        query.search = Some("intro".to_string());
        let summaries = service.list(BOB, query).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pathway.title, "Intro to X");
    }

    #[actix_rt::test]
    async fn test_update_is_owner_only() {
        let service = service();
        let pathway = service
            .create(ALICE, pathway_input("Draft", Some(Visibility::Public)))
            .await
            .unwrap();

        let updated = service
            .update(
                ALICE,
                pathway.id,
                PathwayInput {
                    title: "Final".to_string(),
                    description: Some("polished".to_string()),
                    visibility: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.visibility, Visibility::Public, "unchanged");

        assert!(matches!(
            service
                .update(BOB, pathway.id, pathway_input("Hijacked", None))
                .await,
            Err(AppError::Forbidden(_))
        ));
    }
}
