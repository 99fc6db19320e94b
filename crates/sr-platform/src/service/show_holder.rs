//! Show Holder Service
//!
//! Show management scoped to the caller's own shows. A show belongs to the
//! owner of its show-holder horse record; admins may act on any show.

use std::sync::Arc;

use sr_common::ShowRequest;
use tracing::info;

use crate::domain::Show;
use crate::error::{PlatformError, Result};
use crate::repository::{ShowRepository, UserModelObjectRepository};
use crate::service::authorization::AuthContext;

pub struct ShowHolderService {
    show_repo: Arc<ShowRepository>,
    horse_repo: Arc<UserModelObjectRepository>,
}

impl ShowHolderService {
    pub fn new(show_repo: Arc<ShowRepository>, horse_repo: Arc<UserModelObjectRepository>) -> Self {
        Self { show_repo, horse_repo }
    }

    pub async fn my_shows(&self, ctx: &AuthContext) -> Result<Vec<Show>> {
        if ctx.is_admin() {
            self.show_repo.find_all().await
        } else {
            self.show_repo.find_by_show_holder_user_id(&ctx.user_id).await
        }
    }

    pub async fn create(&self, ctx: &AuthContext, req: &ShowRequest) -> Result<Show> {
        self.ensure_show_holder_ownership(ctx, req.show_holder_id).await?;

        let mut show = Show::from_request(req)?;
        show.id = self.show_repo.insert(&show).await?;
        info!(show_id = show.id, user_id = %ctx.user_id, "Show created by show holder");

        self.reload(show.id).await
    }

    pub async fn update(&self, ctx: &AuthContext, id: i64, req: &ShowRequest) -> Result<Show> {
        let mut show = self
            .show_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Show", id.to_string()))?;

        self.ensure_show_holder_ownership(ctx, show.show_holder_id).await?;
        if req.show_holder_id != show.show_holder_id {
            self.ensure_show_holder_ownership(ctx, req.show_holder_id).await?;
        }

        show.apply_request(req)?;
        show.touch();
        if !self.show_repo.update(&show).await? {
            return Err(PlatformError::not_found("Show", id.to_string()));
        }

        self.reload(id).await
    }

    /// Returns false when the show does not exist.
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<bool> {
        let Some(show) = self.show_repo.find_by_id(id).await? else {
            return Ok(false);
        };
        self.ensure_show_holder_ownership(ctx, show.show_holder_id).await?;

        let deleted = self.show_repo.soft_delete(id).await?;
        if deleted {
            info!(show_id = id, user_id = %ctx.user_id, "Show deleted by show holder");
        }
        Ok(deleted)
    }

    /// The show-holder record must exist; non-admins must also own it.
    async fn ensure_show_holder_ownership(&self, ctx: &AuthContext, show_holder_id: i64) -> Result<()> {
        let holder = self
            .horse_repo
            .find_by_id(show_holder_id)
            .await?
            .ok_or_else(|| PlatformError::validation(format!("Show holder {} does not exist", show_holder_id)))?;

        if ctx.is_admin() || holder.is_owned_by(&ctx.user_id) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("You do not own this show holder"))
        }
    }

    async fn reload(&self, id: i64) -> Result<Show> {
        self.show_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Show", id.to_string()))
    }
}
