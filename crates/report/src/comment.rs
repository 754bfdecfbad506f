use anyhow::{Context, Result, ensure};
use jobtime_core::{REPORT_MARKER, platform::Platform};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Published {
    Created(u64),
    Updated(u64),
}

/// Post or update the report comment on a pull request.
///
/// The first comment containing the report marker is updated in place; any further ones are
/// deleted. If none exists, a new comment is created. Two invocations racing on the same pull
/// request can still both create a comment; the next run cleans that up.
pub async fn post_pr_comment(
    platform: &dyn Platform,
    pull_request: u64,
    body: &str,
) -> Result<Published> {
    ensure!(body.contains(REPORT_MARKER), "Report body is missing the report marker");
    let comments =
        platform.comments(pull_request).await.context("Failed to fetch existing comments")?;
    let mut existing = comments.iter().filter(|comment| comment.body.contains(REPORT_MARKER));

    let Some(first) = existing.next() else {
        let comment = platform
            .create_comment(pull_request, body)
            .await
            .context("Failed to create comment")?;
        tracing::info!("Created comment {} on #{}", comment.id, pull_request);
        return Ok(Published::Created(comment.id));
    };

    platform.update_comment(first.id, body).await.context("Failed to update existing comment")?;
    tracing::info!("Updated comment {} on #{}", first.id, pull_request);
    for comment in existing {
        if let Err(e) = platform.delete_comment(comment.id).await {
            tracing::warn!("Failed to delete old comment {}: {:?}", comment.id, e);
        }
    }
    Ok(Published::Updated(first.id))
}
