use crate::{
    error::AppError,
    registry::{now_millis, position},
    store::SharedStore,
};

/// Maps a short id to its target and records the visit.
#[derive(Clone)]
pub struct Resolver {
    links: SharedStore,
}

impl Resolver {
    pub fn new(links: SharedStore) -> Self {
        Self { links }
    }

    /// Bump the click counters of `short_id` and return its original URL.
    /// A miss writes nothing.
    pub async fn resolve(&self, short_id: &str) -> Result<String, AppError> {
        let (url, clicks) = self
            .links
            .modify(|links| {
                let index = position(links, short_id).ok_or(AppError::NotFound)?;
                let link = &mut links[index];
                link.total_clicks = link.total_clicks.saturating_add(1);
                // Never move backwards, even if the wall clock does.
                let now = now_millis();
                link.last_clicked_at =
                    Some(link.last_clicked_at.map_or(now, |prev| prev.max(now)));
                Ok((link.original_url.clone(), link.total_clicks))
            })
            .await?;

        tracing::debug!("Resolved {} -> {} ({} click(s))", short_id, url, clicks);
        Ok(url)
    }
}
