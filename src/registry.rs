use crate::{
    error::AppError,
    models::{non_empty, present, NewLink, ShortenedLink},
    store::SharedStore,
};

/// Length of generated short ids.
pub const SHORT_ID_LEN: usize = 8;

/// URL-safe alphabet for generated ids (the nanoid default set).
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// First path segments already taken by fixed routes.
const RESERVED_IDS: &[&str] = &["urls", "login", "health"];

/// Create, list, edit and delete over the link collection.
#[derive(Clone)]
pub struct Registry {
    links: SharedStore,
}

impl Registry {
    pub fn new(links: SharedStore) -> Self {
        Self { links }
    }

    /// Whole collection, newest first.
    pub async fn list_all(&self) -> Result<Vec<ShortenedLink>, AppError> {
        self.links.read().await
    }

    /// Links whose stored credentials match. An empty match is an auth
    /// failure, the same answer a login form gives for a wrong password.
    pub async fn list_owned(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Vec<ShortenedLink>, AppError> {
        let owned: Vec<ShortenedLink> = self
            .links
            .read()
            .await?
            .into_iter()
            .filter(|l| l.is_owned_by(username, password))
            .collect();

        if owned.is_empty() {
            return Err(AppError::Auth);
        }
        Ok(owned)
    }

    /// Prepend a new link and persist. `origin` is the public origin used to
    /// build `short_url`, without a trailing slash.
    pub async fn create(&self, origin: &str, new: NewLink) -> Result<ShortenedLink, AppError> {
        let (link, _) = self.create_listed(origin, new).await?;
        Ok(link)
    }

    /// `create`, also returning the collection as saved.
    pub async fn create_listed(
        &self,
        origin: &str,
        new: NewLink,
    ) -> Result<(ShortenedLink, Vec<ShortenedLink>), AppError> {
        let original_url = new.original_url.trim().to_owned();
        validate_original_url(&original_url)?;

        let custom_id = non_empty(new.custom_id.as_deref());
        if let Some(id) = &custom_id {
            validate_short_id(id)?;
        }

        let username = present(new.username.as_deref());
        let password = present(new.password.as_deref());

        let (link, links) = self
            .links
            .modify_listed(move |links| {
                let short_id = match custom_id {
                    Some(id) => {
                        if contains(links, &id) {
                            return Err(AppError::Conflict(format!(
                                "Short ID '{id}' is already taken"
                            )));
                        }
                        id
                    }
                    None => generate_unique_id(links),
                };

                let link = ShortenedLink {
                    original_url,
                    short_url: short_url(origin, &short_id),
                    short_id,
                    username,
                    password,
                    created_at: now_millis(),
                    total_clicks: 0,
                    last_clicked_at: None,
                };
                links.insert(0, link.clone());
                Ok(link)
            })
            .await?;

        tracing::info!("Created short link {} -> {}", link.short_id, link.original_url);
        Ok((link, links))
    }

    /// Overwrite the whole collection and return it as saved. Rejects
    /// payloads with invalid or duplicate records; nothing is written in
    /// that case.
    pub async fn replace_all(
        &self,
        records: Vec<ShortenedLink>,
    ) -> Result<Vec<ShortenedLink>, AppError> {
        validate_collection(&records)?;

        let ((), links) = self
            .links
            .modify_listed(move |links| {
                *links = records;
                Ok(())
            })
            .await?;

        tracing::info!("Replaced collection with {} link(s)", links.len());
        Ok(links)
    }

    /// Rename a link. A `new_short_id` equal to the current id is a no-op
    /// rename.
    pub async fn edit(
        &self,
        origin: &str,
        short_id: &str,
        username: &str,
        password: &str,
        new_short_id: Option<&str>,
    ) -> Result<ShortenedLink, AppError> {
        let new_short_id = non_empty(new_short_id);
        if let Some(id) = &new_short_id {
            validate_short_id(id)?;
        }

        let edited = self
            .links
            .modify(|links| {
                let index = position(links, short_id).ok_or(AppError::NotFound)?;
                if !links[index].is_owned_by(username, password) {
                    return Err(AppError::Auth);
                }

                if let Some(new_id) = new_short_id.filter(|id| id != short_id) {
                    if contains(links, &new_id) {
                        return Err(AppError::Conflict(format!(
                            "Short ID '{new_id}' is already taken"
                        )));
                    }
                    let link = &mut links[index];
                    link.short_url = short_url(origin, &new_id);
                    link.short_id = new_id;
                }

                Ok(links[index].clone())
            })
            .await?;

        tracing::info!("Edited short link {} (now {})", short_id, edited.short_id);
        Ok(edited)
    }

    /// Permanently delete a link. Returns the remaining collection.
    pub async fn remove(
        &self,
        short_id: &str,
        username: &str,
        password: &str,
    ) -> Result<Vec<ShortenedLink>, AppError> {
        let ((), links) = self
            .links
            .modify_listed(|links| {
                let index = position(links, short_id).ok_or(AppError::NotFound)?;
                if !links[index].is_owned_by(username, password) {
                    return Err(AppError::Auth);
                }
                links.remove(index);
                Ok(())
            })
            .await?;

        tracing::info!("Deleted short link {}", short_id);
        Ok(links)
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn position(links: &[ShortenedLink], short_id: &str) -> Option<usize> {
    links.iter().position(|l| l.short_id == short_id)
}

fn contains(links: &[ShortenedLink], short_id: &str) -> bool {
    position(links, short_id).is_some()
}

fn short_url(origin: &str, short_id: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), short_id)
}

fn validate_collection(records: &[ShortenedLink]) -> Result<(), AppError> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if record.short_id.trim().is_empty() {
            return Err(AppError::Validation("shortId must not be empty".into()));
        }
        validate_short_id(&record.short_id)?;
        validate_original_url(&record.original_url)?;
        if record.total_clicks < 0 {
            return Err(AppError::Validation(format!(
                "totalClicks must not be negative for '{}'",
                record.short_id
            )));
        }
        if !seen.insert(record.short_id.as_str()) {
            return Err(AppError::Conflict(format!(
                "Duplicate short ID '{}' in collection",
                record.short_id
            )));
        }
    }
    Ok(())
}

/// The URL ends up verbatim in a `Location` header, so control characters
/// are refused up front.
fn validate_original_url(url: &str) -> Result<(), AppError> {
    if url.trim().is_empty() {
        return Err(AppError::Validation("originalUrl is required".into()));
    }
    if url.chars().any(char::is_control) {
        return Err(AppError::Validation(
            "originalUrl must not contain control characters".into(),
        ));
    }
    Ok(())
}

fn validate_short_id(id: &str) -> Result<(), AppError> {
    if !id.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(AppError::Validation(
            "Short ID may only contain letters, numbers, '-' and '_'".into(),
        ));
    }
    if RESERVED_IDS.contains(&id) {
        return Err(AppError::Validation(format!("Short ID '{id}' is reserved")));
    }
    Ok(())
}

/// Pick a random id not already in `links`. Gives up after 10 tries and
/// returns a longer id, which is far less likely to collide.
fn generate_unique_id(links: &[ShortenedLink]) -> String {
    for _ in 0..10 {
        let id = random_id(SHORT_ID_LEN);
        if !contains(links, &id) && !RESERVED_IDS.contains(&id.as_str()) {
            return id;
        }
    }
    random_id(SHORT_ID_LEN + 4)
}

fn random_id(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
