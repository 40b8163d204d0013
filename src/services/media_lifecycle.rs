use crate::entities::{prelude::*, *};
use crate::services::media_store::MediaStore;
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

/// Row-level cascades for media-bearing entities.
///
/// Row deletions run inside the caller's connection or transaction. Files on
/// disk are only touched by [`MediaLifecycleService::purge_user`], after its
/// own commit, so a crash in between leaves orphaned files rather than
/// dangling rows.
pub struct MediaLifecycleService;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PurgeReport {
    pub videos: usize,
    pub clips: usize,
    pub files_removed: usize,
}

impl MediaLifecycleService {
    /// Deletes a video with its tags, upvotes and comments. Clips cut from it
    /// survive with `parentVideo` cleared.
    pub async fn delete_video_rows(db: &impl ConnectionTrait, video_id: i32) -> Result<()> {
        VideoTags::delete_many()
            .filter(video_tags::Column::VideoId.eq(video_id))
            .exec(db)
            .await?;
        VideoUpvotes::delete_many()
            .filter(video_upvotes::Column::VideoId.eq(video_id))
            .exec(db)
            .await?;
        VideoComments::delete_many()
            .filter(video_comments::Column::VideoId.eq(video_id))
            .exec(db)
            .await?;

        let detached = Clips::update_many()
            .col_expr(clips::Column::ParentVideo, Expr::value(Option::<i32>::None))
            .filter(clips::Column::ParentVideo.eq(video_id))
            .exec(db)
            .await?;
        if detached.rows_affected > 0 {
            tracing::debug!(
                "Detached {} clip(s) from video {}",
                detached.rows_affected,
                video_id
            );
        }

        RecordedVideo::delete_by_id(video_id).exec(db).await?;
        Ok(())
    }

    /// Deletes a clip with its tags and upvotes.
    pub async fn delete_clip_rows(db: &impl ConnectionTrait, clip_id: i32) -> Result<()> {
        ClipTags::delete_many()
            .filter(clip_tags::Column::ClipId.eq(clip_id))
            .exec(db)
            .await?;
        ClipUpvotes::delete_many()
            .filter(clip_upvotes::Column::ClipId.eq(clip_id))
            .exec(db)
            .await?;
        Clips::delete_by_id(clip_id).exec(db).await?;
        Ok(())
    }

    /// Removes an account and everything it owns, then its media files.
    pub async fn purge_user(
        db: &DatabaseConnection,
        media: &MediaStore,
        user_id: i32,
    ) -> Result<PurgeReport> {
        tracing::info!("Purging account {}", user_id);

        let txn = db.begin().await?;

        let owned_clips = Clips::find()
            .filter(clips::Column::OwningUser.eq(user_id))
            .all(&txn)
            .await?;
        let owned_videos = RecordedVideo::find()
            .filter(recorded_video::Column::OwningUser.eq(user_id))
            .all(&txn)
            .await?;

        let mut locations = Vec::new();

        for clip in &owned_clips {
            Self::delete_clip_rows(&txn, clip.id).await?;
            locations.push(clip.video_location.clone());
        }
        for video in &owned_videos {
            Self::delete_video_rows(&txn, video.id).await?;
            locations.push(video.video_location.clone());
        }

        Channel::delete_many()
            .filter(channel::Column::OwningUser.eq(user_id))
            .exec(&txn)
            .await?;
        UserSocial::delete_many()
            .filter(user_social::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        OAuth2Token::delete_many()
            .filter(oauth2_token::Column::User.eq(user_id))
            .exec(&txn)
            .await?;
        RolesUsers::delete_many()
            .filter(roles_users::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        UsersFlaggedForDeletion::delete_many()
            .filter(users_flagged_for_deletion::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        User::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        let mut files_removed = 0;
        for location in &locations {
            files_removed += media.remove_media(location.as_deref()).await.len();
        }

        let report = PurgeReport {
            videos: owned_videos.len(),
            clips: owned_clips.len(),
            files_removed,
        };
        tracing::info!(
            "✅ Account {} purged ({} videos, {} clips, {} files)",
            user_id,
            report.videos,
            report.clips,
            report.files_removed
        );

        Ok(report)
    }
}
